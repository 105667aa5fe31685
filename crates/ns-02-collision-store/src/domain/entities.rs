//! # Stored Entities

use serde::{Deserialize, Serialize};
use shared_types::{u256_to_bytes, BlockHeight, Hash, SignatureRecord, U256};

/// On-disk form of a `SignatureRecord`.
///
/// R and S are fixed 32-byte big-endian arrays so the encoding does not
/// depend on how the integer type serializes itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredSignature {
    pub tx_hash: Hash,
    pub input_index: u32,
    pub sig_index: u32,
    pub height: BlockHeight,
    pub r: [u8; 32],
    pub s: [u8; 32],
}

impl From<&SignatureRecord> for StoredSignature {
    fn from(record: &SignatureRecord) -> Self {
        Self {
            tx_hash: record.tx_hash,
            input_index: record.input_index,
            sig_index: record.sig_index,
            height: record.height,
            r: u256_to_bytes(&record.r),
            s: u256_to_bytes(&record.s),
        }
    }
}

impl From<StoredSignature> for SignatureRecord {
    fn from(stored: StoredSignature) -> Self {
        Self {
            tx_hash: stored.tx_hash,
            input_index: stored.input_index,
            sig_index: stored.sig_index,
            height: stored.height,
            r: U256::from_big_endian(&stored.r),
            s: U256::from_big_endian(&stored.s),
        }
    }
}

/// Result of `CollisionStore::put`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PutOutcome {
    /// The record was new. `count` includes it; `prior` is an earlier record
    /// with the same R, if any.
    Inserted {
        count: u64,
        prior: Option<SignatureRecord>,
    },
    /// The same record was already stored; nothing changed.
    AlreadyPresent,
}

impl PutOutcome {
    /// Whether this insert created a duplicate R.
    pub fn is_collision(&self) -> bool {
        matches!(self, PutOutcome::Inserted { count, .. } if *count > 1)
    }
}

/// Totals over the persisted history.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreSummary {
    /// Distinct records stored.
    pub records: u64,
    /// Distinct R values.
    pub distinct_r: u64,
    /// R values seen more than once.
    pub colliding_r: u64,
    /// Highest height among stored records.
    pub max_height: Option<BlockHeight>,
}

/// Every stored occurrence of one reused R value, in key order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollisionGroup {
    pub r: U256,
    pub occurrences: Vec<SignatureRecord>,
}
