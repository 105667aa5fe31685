//! # Collision Report
//!
//! Emitted once per newly inserted record whose R was already stored.

use serde::{Deserialize, Serialize};
use shared_types::{u256_to_hex, BlockHeight, SignatureRecord};
use std::fmt;

/// Where one signature with the reused R was seen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Occurrence {
    pub height: BlockHeight,
    /// Transaction hash, hex in display order.
    pub tx_hash: String,
    pub input_index: u32,
    pub sig_index: u32,
    /// S of this signature, 64 hex chars.
    pub s: String,
}

impl From<&SignatureRecord> for Occurrence {
    fn from(record: &SignatureRecord) -> Self {
        Self {
            height: record.height,
            tx_hash: hex::encode(record.tx_hash),
            input_index: record.input_index,
            sig_index: record.sig_index,
            s: u256_to_hex(&record.s),
        }
    }
}

/// A reused nonce: the new occurrence and one earlier one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollisionReport {
    /// Shared R, 64 hex chars.
    pub r: String,
    /// S of the new occurrence, 64 hex chars.
    pub s: String,
    /// Records stored with this R, including the new one.
    pub count: u64,
    /// The record whose insertion triggered the report.
    pub current: Occurrence,
    /// An earlier record with the same R.
    pub prior: Option<Occurrence>,
}

impl CollisionReport {
    pub fn new(current: &SignatureRecord, prior: Option<&SignatureRecord>, count: u64) -> Self {
        Self {
            r: u256_to_hex(&current.r),
            s: u256_to_hex(&current.s),
            count,
            current: Occurrence::from(current),
            prior: prior.map(Occurrence::from),
        }
    }
}

impl fmt::Display for CollisionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "R {} seen {} times; new at height {} tx {} input {}",
            self.r, self.count, self.current.height, self.current.tx_hash, self.current.input_index
        )?;
        if let Some(prior) = &self.prior {
            write!(
                f,
                "; prior at height {} tx {} input {}",
                prior.height, prior.tx_hash, prior.input_index
            )?;
        }
        Ok(())
    }
}
