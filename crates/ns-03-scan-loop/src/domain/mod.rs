//! # Domain Layer
//!
//! Scan configuration, the phase machine, the commit queue, reports and
//! errors.

pub mod config;
pub mod errors;
pub mod queue;
pub mod report;
pub mod state;
