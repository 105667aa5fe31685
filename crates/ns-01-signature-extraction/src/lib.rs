//! # Signature Extraction (ns-01)
//!
//! Pulls every ECDSA `(R, S)` pair out of the inputs of a transaction.
//!
//! ## Architecture
//!
//! This crate follows hexagonal architecture:
//! - **Domain Layer** (`domain/`): script tokenizer, strict DER parsing and the
//!   two decoding strategies, no I/O
//! - **Ports Layer** (`ports/`): the inbound extraction API
//! - **Service Layer** (`service.rs`): `SignatureExtractor`, which picks a
//!   decoder per input and numbers the results
//!
//! ## Decoding Strategies
//!
//! | Input carries | Decoder | Policy |
//! |---------------|---------|--------|
//! | witness stack | `WitnessDecoder` | second-to-last element is the signature |
//! | script only | `ScriptSigDecoder` | every push of the signature length is a candidate |
//!
//! ## Failure Policy
//!
//! Malformed candidates and malformed scripts never abort extraction. They are
//! reported as [`ExtractionError`]s, logged at `warn`, and skipped.

pub mod domain;
pub mod ports;
pub mod service;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

// Re-export public API
pub use domain::decoders::{ScriptSigDecoder, SignatureDecoder, WitnessDecoder};
pub use domain::der::parse_der_signature;
pub use domain::entities::{
    BlockExtraction, DecodedInput, ExtractionStats, ExtractorConfig, SignaturePair,
    DEFAULT_SIGNATURE_PUSH_LEN,
};
pub use domain::errors::{ExtractionError, ScriptError};
pub use domain::script::{Instruction, ScriptTokenizer};
pub use ports::inbound::SignatureExtractionApi;
pub use service::SignatureExtractor;
