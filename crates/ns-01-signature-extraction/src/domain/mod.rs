//! # Domain Layer
//!
//! Pure parsing logic with no I/O dependencies.

pub mod decoders;
pub mod der;
pub mod entities;
pub mod errors;
pub mod script;
