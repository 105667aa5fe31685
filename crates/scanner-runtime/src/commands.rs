//! # Commands
//!
//! What the binary's subcommands do, independent of argument parsing and
//! process setup, so they run against any chain source and store.

use ns_01_signature_extraction::SignatureExtractor;
use ns_02_collision_store::{
    CollisionStore, CollisionStoreApi, CollisionStoreError, KVStoreError, KeyValueStore,
};
use ns_03_scan_loop::{
    ChainSource, ChainSourceError, Occurrence, ReportSink, ScanError, ScanLoop, ScanSummary,
};
use serde::Serialize;
use shared_types::{u256_to_hex, Classify, ErrorClass};
use std::io::Write;
use tokio::sync::watch;
use tracing::info;

use crate::container::{ConfigError, ScanSection};

/// Process exit codes.
pub mod exit_code {
    pub const OK: u8 = 0;
    pub const FATAL: u8 = 1;
    pub const CONFIG: u8 = 2;
    /// 128 + SIGINT.
    pub const CANCELLED: u8 = 130;
}

/// Class of the first classified error in `error`'s cause chain.
///
/// Errors no scanner type classifies (output I/O, logging setup) are fatal.
pub fn error_class(error: &anyhow::Error) -> ErrorClass {
    error
        .chain()
        .find_map(|cause| {
            cause
                .downcast_ref::<ConfigError>()
                .map(Classify::class)
                .or_else(|| cause.downcast_ref::<ScanError>().map(Classify::class))
                .or_else(|| cause.downcast_ref::<CollisionStoreError>().map(Classify::class))
                .or_else(|| cause.downcast_ref::<KVStoreError>().map(Classify::class))
                .or_else(|| cause.downcast_ref::<ChainSourceError>().map(Classify::class))
        })
        .unwrap_or(ErrorClass::Fatal)
}

/// Exit code of a run that failed with an error of `class`.
pub fn failure_exit_code(class: ErrorClass) -> u8 {
    match class {
        ErrorClass::Configuration => exit_code::CONFIG,
        // A recoverable error reaching the top still failed the run.
        ErrorClass::Fatal | ErrorClass::Recoverable => exit_code::FATAL,
    }
}

/// How a scan ended when it did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Reached the target height.
    Completed,
    /// Interrupted; committed work is durable.
    Cancelled,
}

impl RunOutcome {
    pub fn exit_code(self) -> u8 {
        match self {
            RunOutcome::Completed => exit_code::OK,
            RunOutcome::Cancelled => exit_code::CANCELLED,
        }
    }
}

impl From<&ScanSummary> for RunOutcome {
    fn from(summary: &ScanSummary) -> Self {
        if summary.cancelled {
            RunOutcome::Cancelled
        } else {
            RunOutcome::Completed
        }
    }
}

/// Replay the store behind `kv` and scan from its cursor.
pub async fn run_scan<C, KV, R>(
    source: C,
    kv: KV,
    settings: &ScanSection,
    sink: R,
    shutdown: watch::Receiver<bool>,
) -> Result<ScanSummary, ScanError>
where
    C: ChainSource,
    KV: KeyValueStore + 'static,
    R: ReportSink + 'static,
{
    let store = CollisionStore::open(kv)?;
    let cursor = store.cursor();
    info!(
        "[runtime] Resuming at height {} (cursor {:?})",
        cursor.resume_height(),
        cursor.origin()
    );

    let scan_loop = ScanLoop::new(
        source,
        SignatureExtractor::new(settings.extractor_config()),
        settings.scan_config(),
    );
    scan_loop.run(store, sink, shutdown).await
}

/// One reused R value and everywhere it occurs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CollisionListing {
    pub r: String,
    pub count: usize,
    pub occurrences: Vec<Occurrence>,
}

/// Every reused R in the store, in order of first occurrence.
pub fn collision_listings<KV>(
    store: &CollisionStore<KV>,
) -> Result<Vec<CollisionListing>, CollisionStoreError>
where
    KV: KeyValueStore,
{
    Ok(store
        .collisions()?
        .into_iter()
        .map(|group| CollisionListing {
            r: u256_to_hex(&group.r),
            count: group.occurrences.len(),
            occurrences: group.occurrences.iter().map(Occurrence::from).collect(),
        })
        .collect())
}

/// Print listings as JSON lines or as indented text.
pub fn write_collisions<W: Write>(
    listings: &[CollisionListing],
    json: bool,
    out: &mut W,
) -> std::io::Result<()> {
    for listing in listings {
        if json {
            serde_json::to_writer(&mut *out, listing)?;
            writeln!(out)?;
            continue;
        }
        writeln!(out, "R {} ({} occurrences)", listing.r, listing.count)?;
        for occurrence in &listing.occurrences {
            writeln!(
                out,
                "  height {} tx {} input {} sig {} s {}",
                occurrence.height,
                occurrence.tx_hash,
                occurrence.input_index,
                occurrence.sig_index,
                occurrence.s
            )?;
        }
    }
    out.flush()
}
