//! # Test Doubles
//!
//! An in-memory chain with failure injection and a report sink that keeps
//! what it receives. Both are `Clone` and share state between clones, so a
//! test keeps a handle while the scan loop owns the other.

use crate::domain::errors::{ChainSourceError, ReportError};
use crate::domain::report::CollisionReport;
use crate::ports::outbound::{ChainSource, ReportSink};
use async_trait::async_trait;
use parking_lot::Mutex;
use shared_types::{BlockHeight, ChainBlock};
use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(Debug, Default)]
struct ChainState {
    blocks: BTreeMap<BlockHeight, ChainBlock>,
    failing: HashSet<BlockHeight>,
    fail_tip: bool,
    fetches: Vec<BlockHeight>,
}

/// In-memory chain. The tip is the highest inserted height.
#[derive(Debug, Clone, Default)]
pub struct InMemoryChainSource {
    state: Arc<Mutex<ChainState>>,
}

impl InMemoryChainSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Chain of empty blocks at heights `0..=tip`.
    pub fn with_empty_chain(tip: BlockHeight) -> Self {
        let source = Self::new();
        for height in 0..=tip {
            source.insert(ChainBlock::empty(height));
        }
        source
    }

    /// Add or replace the block at its own height.
    pub fn insert(&self, block: ChainBlock) {
        self.insert_at(block.height, block);
    }

    /// Serve `block` when `height` is requested.
    pub fn insert_at(&self, height: BlockHeight, block: ChainBlock) {
        self.state.lock().blocks.insert(height, block);
    }

    /// Make fetches of `height` fail with a transport error.
    pub fn fail_at(&self, height: BlockHeight) {
        self.state.lock().failing.insert(height);
    }

    /// Make tip queries fail.
    pub fn fail_tip(&self) {
        self.state.lock().fail_tip = true;
    }

    pub fn clear_failures(&self) {
        let mut state = self.state.lock();
        state.failing.clear();
        state.fail_tip = false;
    }

    /// Heights fetched so far, in order.
    pub fn fetches(&self) -> Vec<BlockHeight> {
        self.state.lock().fetches.clone()
    }
}

#[async_trait]
impl ChainSource for InMemoryChainSource {
    async fn tip_height(&self) -> Result<BlockHeight, ChainSourceError> {
        let state = self.state.lock();
        if state.fail_tip {
            return Err(ChainSourceError::Transport("injected tip failure".into()));
        }
        state
            .blocks
            .keys()
            .next_back()
            .copied()
            .ok_or_else(|| ChainSourceError::InvalidResponse("empty chain".into()))
    }

    async fn block_by_height(&self, height: BlockHeight) -> Result<ChainBlock, ChainSourceError> {
        let mut state = self.state.lock();
        state.fetches.push(height);
        if state.failing.contains(&height) {
            return Err(ChainSourceError::Transport(format!(
                "injected failure at height {height}"
            )));
        }
        state
            .blocks
            .get(&height)
            .cloned()
            .ok_or(ChainSourceError::NotFound { height })
    }
}

#[derive(Debug, Default)]
struct SinkState {
    reports: Vec<CollisionReport>,
    flushed: bool,
}

/// Report sink that records every report.
#[derive(Debug, Clone, Default)]
pub struct CollectingReportSink {
    state: Arc<Mutex<SinkState>>,
    fail: Arc<AtomicBool>,
}

impl CollectingReportSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reports(&self) -> Vec<CollisionReport> {
        self.state.lock().reports.clone()
    }

    /// Whether `flush` was called.
    pub fn flushed(&self) -> bool {
        self.state.lock().flushed
    }

    /// Make every following emit fail.
    pub fn set_fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }
}

impl ReportSink for CollectingReportSink {
    fn emit(&mut self, report: &CollisionReport) -> Result<(), ReportError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(ReportError::Io("injected report failure".into()));
        }
        self.state.lock().reports.push(report.clone());
        Ok(())
    }

    fn flush(&mut self) -> Result<(), ReportError> {
        self.state.lock().flushed = true;
        Ok(())
    }
}
