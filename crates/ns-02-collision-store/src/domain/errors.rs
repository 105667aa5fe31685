//! # Collision Store Errors
//!
//! All storage errors are fatal to the current run. The scan must not lose a
//! record silently, and a rerun is safe because `put` is idempotent.

use shared_types::{Classify, ErrorClass};
use thiserror::Error;

/// Key-value store errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum KVStoreError {
    /// I/O error during read/write.
    #[error("KV store I/O error: {message}")]
    IOError { message: String },
    /// Data corruption in the store.
    #[error("KV store corruption: {message}")]
    CorruptionError { message: String },
}

impl Classify for KVStoreError {
    fn class(&self) -> ErrorClass {
        ErrorClass::Fatal
    }
}

/// Record (de)serialization error.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("record serialization failed: {message}")]
pub struct SerializationError {
    pub message: String,
}

/// Errors surfaced by `CollisionStore`.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CollisionStoreError {
    /// The underlying store failed.
    #[error(transparent)]
    Storage(#[from] KVStoreError),

    /// A value could not be encoded or decoded.
    #[error(transparent)]
    Serialization(#[from] SerializationError),

    /// A record key has the wrong shape.
    #[error("malformed record key ({len} bytes): {key_hex}")]
    MalformedKey { len: usize, key_hex: String },

    /// The cursor value is not an 8-byte height.
    #[error("malformed cursor value: expected 8 bytes, found {len}")]
    MalformedCursor { len: usize },

    /// A value disagrees with the key it is stored under.
    #[error("record under key {key_hex} does not match its key")]
    KeyMismatch { key_hex: String },
}

impl Classify for CollisionStoreError {
    fn class(&self) -> ErrorClass {
        ErrorClass::Fatal
    }
}
