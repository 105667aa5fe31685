//! # Scan Errors
//!
//! Every error that reaches the scan loop is fatal to the run. Parsing errors
//! never get here: the extractor swallows them.

use ns_02_collision_store::CollisionStoreError;
use shared_types::{BlockHeight, Classify, ErrorClass};
use thiserror::Error;

/// Errors from the chain source.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ChainSourceError {
    /// The node has no block at this height.
    #[error("block {height} not found")]
    NotFound { height: BlockHeight },

    /// The node could not be reached or the call failed.
    #[error("chain source transport error: {0}")]
    Transport(String),

    /// The node answered with something unusable.
    #[error("invalid chain source response: {0}")]
    InvalidResponse(String),

    /// A block could not be decoded.
    #[error("block {height} could not be decoded: {message}")]
    Decode { height: BlockHeight, message: String },
}

impl Classify for ChainSourceError {
    fn class(&self) -> ErrorClass {
        // Skipping a height would leave a silent gap in coverage.
        ErrorClass::Fatal
    }
}

/// Errors from a report sink.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ReportError {
    #[error("report output failed: {0}")]
    Io(String),

    #[error("report encoding failed: {0}")]
    Encode(String),
}

impl Classify for ReportError {
    fn class(&self) -> ErrorClass {
        ErrorClass::Fatal
    }
}

/// Errors that end a scan run.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ScanError {
    #[error(transparent)]
    ChainSource(#[from] ChainSourceError),

    #[error(transparent)]
    Store(#[from] CollisionStoreError),

    #[error(transparent)]
    Report(#[from] ReportError),

    /// The commit consumer went away while the producer was still sending.
    #[error("commit consumer stopped unexpectedly")]
    ConsumerStopped,

    /// The commit consumer task panicked or was aborted.
    #[error("commit consumer failed: {0}")]
    ConsumerFailed(String),
}

impl Classify for ScanError {
    fn class(&self) -> ErrorClass {
        match self {
            ScanError::ChainSource(e) => e.class(),
            ScanError::Store(e) => e.class(),
            ScanError::Report(e) => e.class(),
            ScanError::ConsumerStopped | ScanError::ConsumerFailed(_) => ErrorClass::Fatal,
        }
    }
}
