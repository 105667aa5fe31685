//! # Error Classification
//!
//! Every error raised inside the scanner is either fatal to the current run
//! or recoverable at the granularity of one signature candidate or input.
//!
//! | Class | Examples | Policy |
//! |-------|----------|--------|
//! | Recoverable | bad DER, truncated push data, malformed script | log, skip the candidate, continue |
//! | Fatal | node unreachable, store write failure, report output failure | stop enqueueing, drain, exit |
//! | Configuration | missing certificate, empty credentials | exit before scanning starts |
//!
//! Progress is durable up to the last advanced cursor, so a fatal error never
//! loses committed work and a rerun resumes where the run stopped.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Whether an error ends the current run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorClass {
    /// Skip the offending candidate and keep scanning.
    Recoverable,
    /// Terminate the run with a diagnostic; rerunning is safe.
    Fatal,
    /// Fatal at startup: the process never begins scanning.
    Configuration,
}

impl ErrorClass {
    /// Whether this class terminates the run.
    pub fn is_fatal(self) -> bool {
        matches!(self, ErrorClass::Fatal | ErrorClass::Configuration)
    }
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorClass::Recoverable => write!(f, "recoverable"),
            ErrorClass::Fatal => write!(f, "fatal"),
            ErrorClass::Configuration => write!(f, "configuration"),
        }
    }
}

/// Classification of an error into the fatal/recoverable taxonomy.
///
/// Implemented by every error type in the workspace. The commit consumer
/// decides whether to stop from it, the extractor only ever swallows
/// recoverable errors, and the binary derives its exit code from it.
pub trait Classify {
    /// The class of this error.
    fn class(&self) -> ErrorClass;

    /// Shorthand for `self.class().is_fatal()`.
    fn is_fatal(&self) -> bool {
        self.class().is_fatal()
    }
}
