//! # Scan Loop (ns-03)
//!
//! Walks the chain from the stored cursor to the tip, extracting signatures
//! and committing them through a single writer that detects R reuse.
//!
//! ## Architecture
//!
//! ```text
//! ChainSource ──→ ScanLoop (producer, async)
//!                    │ fetch block, extract records
//!                    ↓
//!              [bounded commit queue]  Record.. Record Seal(h)
//!                    │
//!                    ↓
//!              CommitConsumer (blocking, single writer)
//!                    │ put + collision check, advance cursor on Seal
//!                    ↓
//!              CollisionStore ──→ ReportSink
//! ```
//!
//! - **Domain Layer** (`domain/`): config, phases, queue, reports, errors
//! - **Ports Layer** (`ports/`): `ChainSource`, `ReportSink`
//! - **Adapters Layer** (`adapters/`): JSON-lines report sink
//! - **Service Layer** (`service.rs`, `consumer.rs`)
//!
//! Only the consumer touches the store and the collision index, so the
//! collision check needs no locks. The producer only reads the resume height
//! before the consumer starts.

pub mod adapters;
pub mod consumer;
pub mod domain;
pub mod ports;
pub mod service;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

// Re-export public API
pub use adapters::JsonLinesReportSink;
pub use consumer::{CommitConsumer, CommitStats};
pub use domain::config::{ScanConfig, DEFAULT_PROGRESS_INTERVAL, DEFAULT_QUEUE_CAPACITY};
pub use domain::errors::{ChainSourceError, ReportError, ScanError};
pub use domain::queue::{commit_queue, CommitMessage, CommitReceiver, CommitSender};
pub use domain::report::{CollisionReport, Occurrence};
pub use domain::state::ScanPhase;
pub use ports::outbound::{ChainSource, ReportSink};
pub use service::{ScanLoop, ScanSummary};
