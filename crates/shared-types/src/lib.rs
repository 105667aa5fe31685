//! # Shared Types Crate
//!
//! This crate contains the chain entities handed to the scanner by a chain
//! source, the `SignatureRecord` every other crate produces or persists, and
//! the fatal/recoverable error classification used across the workspace.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: All cross-crate types are defined here.
//! - **Immutable Records**: A `SignatureRecord` is created once during
//!   extraction and never mutated afterwards.
//! - **Explicit Error Policy**: Every error type states whether it is fatal to
//!   the current run through [`Classify`].

pub mod entities;
pub mod errors;

pub use entities::*;
pub use errors::*;
