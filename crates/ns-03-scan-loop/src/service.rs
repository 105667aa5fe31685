//! # Scan Loop Service
//!
//! Orchestrates one run:
//!
//! 1. **Bootstrapping**: read the resume height from the (already replayed)
//!    store and the tip from the chain source.
//! 2. **Catching-up**: for each height in order, fetch, extract, enqueue the
//!    records and a seal. The consumer commits them and advances the cursor.
//! 3. **Draining**: hang up the queue and wait for the consumer.
//! 4. **Terminated**.
//!
//! A failed fetch ends the run: heights are never skipped. Cancellation stops
//! enqueueing new heights; everything already enqueued is still committed.

use crate::consumer::{CommitConsumer, CommitStats};
use crate::domain::config::ScanConfig;
use crate::domain::errors::{ChainSourceError, ScanError};
use crate::domain::queue::{commit_queue, CommitSender};
use crate::domain::state::ScanPhase;
use crate::ports::outbound::{ChainSource, ReportSink};
use ns_01_signature_extraction::{ExtractionStats, SignatureExtractionApi};
use ns_02_collision_store::CollisionStoreApi;
use shared_types::BlockHeight;
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// Summary of a finished run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanSummary {
    /// First height this run processed.
    pub start_height: BlockHeight,
    /// Last height this run intended to process.
    pub target_height: BlockHeight,
    /// Whether cancellation stopped the run before the target.
    pub cancelled: bool,
    /// Extraction counters over all processed blocks.
    pub extraction: ExtractionStats,
    /// Commit counters.
    pub commits: CommitStats,
}

impl ScanSummary {
    /// Heights committed in this run.
    pub fn heights_committed(&self) -> u64 {
        self.commits.heights_sealed
    }
}

enum ProducerExit {
    Finished,
    Cancelled,
}

/// The scan loop.
pub struct ScanLoop<C, E>
where
    C: ChainSource,
    E: SignatureExtractionApi,
{
    source: C,
    extractor: E,
    config: ScanConfig,
    phase: watch::Sender<ScanPhase>,
}

impl<C, E> ScanLoop<C, E>
where
    C: ChainSource,
    E: SignatureExtractionApi,
{
    pub fn new(source: C, extractor: E, config: ScanConfig) -> Self {
        let (phase, _) = watch::channel(ScanPhase::Bootstrapping);
        Self {
            source,
            extractor,
            config,
            phase,
        }
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    pub fn source(&self) -> &C {
        &self.source
    }

    /// Follow phase changes.
    pub fn subscribe_phase(&self) -> watch::Receiver<ScanPhase> {
        self.phase.subscribe()
    }

    pub fn phase(&self) -> ScanPhase {
        *self.phase.borrow()
    }

    fn enter(&self, next: ScanPhase) {
        let current = self.phase();
        if !current.can_transition_to(next) {
            warn!("[ns-03] Unexpected phase change {} -> {}", current, next);
        }
        debug!("[ns-03] Phase {} -> {}", current, next);
        self.phase.send_replace(next);
    }

    /// Run from the store's resume height to the tip (or `stop_height`).
    ///
    /// The store and sink move into the commit consumer and are dropped when
    /// the run ends. `shutdown` flipping to `true` cancels the run; a dropped
    /// sender means the run cannot be cancelled.
    pub async fn run<S, R>(
        &self,
        store: S,
        sink: R,
        mut shutdown: watch::Receiver<bool>,
    ) -> Result<ScanSummary, ScanError>
    where
        S: CollisionStoreApi + 'static,
        R: ReportSink + 'static,
    {
        self.phase.send_replace(ScanPhase::Bootstrapping);

        let start_height = store.cursor().resume_height();
        let tip = match self.source.tip_height().await {
            Ok(tip) => tip,
            Err(e) => {
                self.enter(ScanPhase::Terminated);
                return Err(e.into());
            }
        };
        let target_height = self.config.target_height(tip);

        if start_height > target_height {
            info!(
                "[ns-03] Nothing to scan: next height {} is past target {} (tip {})",
                start_height, target_height, tip
            );
        } else {
            info!(
                "[ns-03] 🔍 Scanning heights {}..={} (tip {})",
                start_height, target_height, tip
            );
        }

        let (sender, receiver) = commit_queue(self.config.queue_capacity);
        let consumer = CommitConsumer::new(store, sink, self.config.progress_interval);
        let consumer_task = tokio::task::spawn_blocking(move || consumer.run(receiver));

        self.enter(ScanPhase::CatchingUp);
        let mut extraction = ExtractionStats::default();
        let produced = self
            .produce(
                start_height,
                target_height,
                &sender,
                &mut shutdown,
                &mut extraction,
            )
            .await;

        self.enter(ScanPhase::Draining);
        drop(sender);
        let consumed = consumer_task
            .await
            .map_err(|e| ScanError::ConsumerFailed(e.to_string()));
        self.enter(ScanPhase::Terminated);

        // A consumer error explains a producer's ConsumerStopped, so it wins.
        let (commits, consumer_result) = consumed?;
        consumer_result?;
        let exit = produced?;

        let summary = ScanSummary {
            start_height,
            target_height,
            cancelled: matches!(exit, ProducerExit::Cancelled),
            extraction,
            commits,
        };
        info!(
            "[ns-03] ✅ Run finished: {} heights committed, {} new signatures, {} collision reports{}",
            summary.commits.heights_sealed,
            summary.commits.inserted,
            summary.commits.reports,
            if summary.cancelled { " (cancelled)" } else { "" }
        );
        Ok(summary)
    }

    async fn produce(
        &self,
        start_height: BlockHeight,
        target_height: BlockHeight,
        sender: &CommitSender,
        shutdown: &mut watch::Receiver<bool>,
        extraction: &mut ExtractionStats,
    ) -> Result<ProducerExit, ScanError> {
        for height in start_height..=target_height {
            if *shutdown.borrow() {
                info!("[ns-03] Cancellation requested, stopping before height {}", height);
                return Ok(ProducerExit::Cancelled);
            }

            let block = tokio::select! {
                block = self.source.block_by_height(height) => block?,
                _ = wait_for_cancel(shutdown) => {
                    info!("[ns-03] Cancellation requested while fetching height {}", height);
                    return Ok(ProducerExit::Cancelled);
                }
            };
            if block.height != height {
                return Err(ChainSourceError::InvalidResponse(format!(
                    "asked for height {}, got block at height {}",
                    height, block.height
                ))
                .into());
            }

            let extracted = self.extractor.extract_block(&block);
            extraction.merge(&extracted.stats);
            debug!(
                "[ns-03] Height {}: {} transactions, {} signatures",
                height,
                block.transactions.len(),
                extracted.records.len()
            );

            sender.send_height(height, extracted.records).await?;
        }
        Ok(ProducerExit::Finished)
    }
}

/// Resolve once `shutdown` reads `true`. Never resolves if the sender is gone.
async fn wait_for_cancel(shutdown: &mut watch::Receiver<bool>) {
    loop {
        if *shutdown.borrow_and_update() {
            return;
        }
        if shutdown.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}
