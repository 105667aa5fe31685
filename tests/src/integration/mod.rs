//! Cross-crate integration tests.

pub mod extraction;
pub mod resumability;
pub mod scenarios;
