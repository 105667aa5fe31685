//! # Scan State Machine
//!
//! ```text
//! Bootstrapping ──→ CatchingUp ──→ Draining ──→ Terminated
//!       │                                          ↑
//!       └──────────────(tip query failed)──────────┘
//! ```

use std::fmt;

/// Phase of a scan run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScanPhase {
    /// Store replayed; resume height and tip being determined.
    Bootstrapping,
    /// Fetching, extracting and enqueueing heights.
    CatchingUp,
    /// No more heights; waiting for the consumer to finish the queue.
    Draining,
    /// Run over.
    Terminated,
}

impl ScanPhase {
    /// Whether `next` may follow `self`.
    pub fn can_transition_to(self, next: ScanPhase) -> bool {
        matches!(
            (self, next),
            (ScanPhase::Bootstrapping, ScanPhase::CatchingUp)
                | (ScanPhase::Bootstrapping, ScanPhase::Terminated)
                | (ScanPhase::CatchingUp, ScanPhase::Draining)
                | (ScanPhase::Draining, ScanPhase::Terminated)
        )
    }
}

impl fmt::Display for ScanPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ScanPhase::Bootstrapping => "bootstrapping",
            ScanPhase::CatchingUp => "catching-up",
            ScanPhase::Draining => "draining",
            ScanPhase::Terminated => "terminated",
        };
        f.write_str(name)
    }
}
