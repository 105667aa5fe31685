//! # Extraction Errors
//!
//! Everything here is recoverable: a blockchain legitimately contains
//! non-standard and malformed scripts, so one bad candidate costs one
//! candidate and nothing more.

use shared_types::{Classify, ErrorClass};
use thiserror::Error;

/// Errors raised while tokenizing a legacy script.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ScriptError {
    /// A PUSHDATA opcode is missing some of its length bytes.
    #[error("truncated push length at offset {offset}: opcode 0x{opcode:02x} needs {needed} length bytes")]
    TruncatedLength {
        offset: usize,
        opcode: u8,
        needed: usize,
    },

    /// A push declares more bytes than remain in the script.
    #[error("truncated push data at offset {offset}: declared {declared} bytes, {available} available")]
    TruncatedPush {
        offset: usize,
        declared: usize,
        available: usize,
    },
}

impl Classify for ScriptError {
    fn class(&self) -> ErrorClass {
        ErrorClass::Recoverable
    }
}

/// A signature candidate or input that yielded no `(R, S)` pair.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ExtractionError {
    /// Candidate is shorter than the smallest possible DER signature.
    #[error("candidate too short for a DER signature: {len} bytes")]
    TooShort { len: usize },

    /// Candidate does not start with a DER SEQUENCE tag.
    #[error("not a DER sequence: leading byte 0x{tag:02x}")]
    NotASequence { tag: u8 },

    /// The SEQUENCE length runs past the end of the candidate.
    #[error("DER length {declared} exceeds candidate body of {available} bytes")]
    LengthMismatch { declared: usize, available: usize },

    /// Strict DER decoding rejected the candidate.
    #[error("invalid DER signature: {0}")]
    InvalidDer(String),

    /// Witness stack has no second-to-last element.
    #[error("witness stack has {elements} element(s), signature slot missing")]
    WitnessTooShort { elements: usize },

    /// The script could not be tokenized past some point.
    #[error("malformed script: {0}")]
    Script(#[from] ScriptError),
}

impl ExtractionError {
    /// Whether this error came from the tokenizer rather than a candidate.
    pub fn is_script_error(&self) -> bool {
        matches!(self, ExtractionError::Script(_))
    }

    /// Whether the input has a normal shape that simply carries no ECDSA
    /// signature: segwit coinbase inputs and taproot key-path spends have a
    /// single witness element.
    pub fn is_expected_shape(&self) -> bool {
        matches!(self, ExtractionError::WitnessTooShort { elements } if *elements <= 1)
    }
}

impl Classify for ExtractionError {
    fn class(&self) -> ErrorClass {
        ErrorClass::Recoverable
    }
}
