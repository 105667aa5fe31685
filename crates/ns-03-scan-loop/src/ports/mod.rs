//! # Ports Layer
//!
//! - **Outbound (Driven)**: chain source and report sink

pub mod outbound;
