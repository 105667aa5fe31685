//! # Inbound Ports (Driving Ports / API)
//!
//! The extraction API consumed by the scan loop.

use crate::domain::entities::BlockExtraction;
use shared_types::{BlockHeight, ChainBlock, ChainTransaction, SignatureRecord};

/// Signature extraction API.
///
/// Implementations must be thread-safe (`Send + Sync`) and must never fail:
/// malformed data is logged and skipped.
pub trait SignatureExtractionApi: Send + Sync {
    /// Every signature record found in `tx`, in input order then decoder order.
    fn extract(&self, tx: &ChainTransaction, height: BlockHeight) -> Vec<SignatureRecord>;

    /// Every signature record found in `block`, in transaction order, with
    /// counters.
    fn extract_block(&self, block: &ChainBlock) -> BlockExtraction;
}
