//! # Outbound Ports (Driven Ports)
//!
//! - `ChainSource`: the node, queried by the producer
//! - `ReportSink`: operator-facing collision output, written by the consumer

use crate::domain::errors::{ChainSourceError, ReportError};
use crate::domain::report::CollisionReport;
use async_trait::async_trait;
use shared_types::{BlockHeight, ChainBlock};

/// Source of blocks by height.
///
/// No timeout is applied by the scan loop. Implementations that talk to a
/// remote node must bound their own calls.
#[async_trait]
pub trait ChainSource: Send + Sync {
    /// Height of the current chain tip.
    async fn tip_height(&self) -> Result<BlockHeight, ChainSourceError>;

    /// The block at `height`.
    async fn block_by_height(&self, height: BlockHeight) -> Result<ChainBlock, ChainSourceError>;
}

/// Destination for collision reports.
///
/// Called from the blocking commit consumer, so implementations may block.
pub trait ReportSink: Send {
    /// Emit one report.
    fn emit(&mut self, report: &CollisionReport) -> Result<(), ReportError>;

    /// Flush buffered output. Called once when the consumer stops.
    fn flush(&mut self) -> Result<(), ReportError> {
        Ok(())
    }
}

impl<T: ReportSink + ?Sized> ReportSink for Box<T> {
    fn emit(&mut self, report: &CollisionReport) -> Result<(), ReportError> {
        (**self).emit(report)
    }

    fn flush(&mut self) -> Result<(), ReportError> {
        (**self).flush()
    }
}
