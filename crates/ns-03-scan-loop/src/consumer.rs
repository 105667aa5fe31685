//! # Commit Consumer
//!
//! The single writer. Owns the collision store and the report sink for the
//! duration of a run, drains the commit queue in FIFO order, and advances the
//! cursor when a height is sealed.
//!
//! Errors are handled by their class. On the first fatal one it stops and
//! drops its end of the queue, which fails the producer's next send.

use crate::domain::errors::ScanError;
use crate::domain::queue::{CommitMessage, CommitReceiver};
use crate::domain::report::CollisionReport;
use crate::ports::outbound::ReportSink;
use ns_02_collision_store::{CollisionStoreApi, PutOutcome};
use shared_types::{BlockHeight, Classify, ErrorClass, SignatureRecord};
use tracing::{debug, info, warn};

/// Counters kept by the consumer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CommitStats {
    /// Records newly written.
    pub inserted: u64,
    /// Records already present (replayed heights).
    pub already_present: u64,
    /// Collision reports emitted.
    pub reports: u64,
    /// Heights sealed.
    pub heights_sealed: u64,
    /// Last sealed height.
    pub last_sealed: Option<BlockHeight>,
}

/// Drains the commit queue into the store.
pub struct CommitConsumer<S, R> {
    store: S,
    sink: R,
    progress_interval: u64,
    stats: CommitStats,
}

impl<S, R> CommitConsumer<S, R>
where
    S: CollisionStoreApi,
    R: ReportSink,
{
    pub fn new(store: S, sink: R, progress_interval: u64) -> Self {
        Self {
            store,
            sink,
            progress_interval: progress_interval.max(1),
            stats: CommitStats::default(),
        }
    }

    /// Consume until the producer hangs up or a fatal error occurs.
    ///
    /// Blocks the calling thread; run it on a blocking task.
    pub fn run(mut self, mut queue: CommitReceiver) -> (CommitStats, Result<(), ScanError>) {
        let mut result = Ok(());
        while let Some(message) = queue.blocking_recv() {
            let Err(e) = self.handle(message) else {
                continue;
            };
            match e.class() {
                ErrorClass::Recoverable => {
                    warn!("[ns-03] Skipping commit work: {}", e);
                }
                ErrorClass::Fatal | ErrorClass::Configuration => {
                    warn!("[ns-03] Commit consumer stopping ({}): {}", e.class(), e);
                    result = Err(e);
                    break;
                }
            }
        }
        // Hang up before flushing so a blocked producer fails fast.
        drop(queue);

        let flushed = self.sink.flush().map_err(ScanError::from);
        (self.stats, result.and(flushed))
    }

    /// Apply one message.
    pub fn handle(&mut self, message: CommitMessage) -> Result<(), ScanError> {
        match message {
            CommitMessage::Record(record) => self.commit(&record),
            CommitMessage::Seal(height) => self.seal(height),
        }
    }

    fn commit(&mut self, record: &SignatureRecord) -> Result<(), ScanError> {
        match self.store.put(record)? {
            PutOutcome::AlreadyPresent => {
                self.stats.already_present += 1;
            }
            PutOutcome::Inserted { count, prior } => {
                self.stats.inserted += 1;
                if count > 1 {
                    let report = CollisionReport::new(record, prior.as_ref(), count);
                    warn!("[ns-03] ⚠️ Nonce reuse detected: {}", report);
                    self.sink.emit(&report)?;
                    self.stats.reports += 1;
                }
            }
        }
        Ok(())
    }

    fn seal(&mut self, height: BlockHeight) -> Result<(), ScanError> {
        let moved = self.store.advance_cursor(height)?;
        self.stats.heights_sealed += 1;
        self.stats.last_sealed = Some(height);

        if height % self.progress_interval == 0 {
            let summary = self.store.summary();
            info!(
                "[ns-03] 📦 Block height {} committed ({} signatures stored, {} reused R values)",
                height, summary.records, summary.colliding_r
            );
        } else {
            debug!("[ns-03] Sealed height {} (cursor moved: {})", height, moved);
        }
        Ok(())
    }

    pub fn stats(&self) -> CommitStats {
        self.stats
    }
}
