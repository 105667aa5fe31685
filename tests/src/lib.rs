//! # Nonce-Scan Test Suite
//!
//! Unified test crate containing:
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! ├── fixtures.rs       # Chains and blocks shared by tests and benchmarks
//! └── integration/      # Cross-crate behaviour
//!     ├── scenarios.rs      # Named chain scenarios end to end
//!     ├── resumability.rs   # Interrupted runs against uninterrupted ones
//!     └── extraction.rs     # Decoding real node blocks and signatures
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p ns-tests
//!
//! # By category
//! cargo test -p ns-tests integration::scenarios::
//! cargo test -p ns-tests integration::resumability::
//!
//! # Benchmarks
//! cargo bench -p ns-tests
//! ```

pub mod fixtures;
pub mod integration;
