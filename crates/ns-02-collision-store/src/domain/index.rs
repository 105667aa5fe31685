//! # Collision Index
//!
//! In-memory R -> tally map, rebuilt from a full replay of the store when it is
//! opened and updated on every successful insert. It therefore always reflects
//! the whole persisted history, never just the current run.
//!
//! Each entry keeps the count and the earliest position in key order. The
//! full record at that position (tx hash, S) is fetched from the store on
//! demand when a collision is reported, which keeps an entry at the R bytes
//! plus 20 bytes. Key order rather than insertion order makes the reported
//! prior the same whether the history was inserted in this process or
//! replayed from disk.

use super::keys::RecordKey;
use shared_types::{BlockHeight, SignatureRecord};
use std::collections::hash_map::Entry;
use std::collections::HashMap;

/// Position of a record within its R: the key without the R bytes.
///
/// A record under a tx-qualified key shares its position with the plain-key
/// record, which is always stored first and is the one `key` names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Position {
    pub height: BlockHeight,
    pub input_index: u32,
    pub sig_index: u32,
}

impl Position {
    pub fn of(record: &SignatureRecord) -> Self {
        Self {
            height: record.height,
            input_index: record.input_index,
            sig_index: record.sig_index,
        }
    }

    /// Full record key for this position and `r`.
    pub fn key(&self, r: [u8; 32]) -> RecordKey {
        RecordKey {
            height: self.height,
            input_index: self.input_index,
            sig_index: self.sig_index,
            r,
        }
    }
}

/// Count and earliest position of one R value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RTally {
    pub count: u32,
    pub earliest: Position,
}

/// What `observe` saw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Observation {
    /// Records with this R, including the observed one.
    pub count: u32,
    /// Earliest position stored before the observed record, if any.
    pub prior: Option<Position>,
}

/// R -> tally map over every stored record.
#[derive(Debug, Default)]
pub struct CollisionIndex {
    tallies: HashMap<[u8; 32], RTally>,
    records: u64,
    colliding: u64,
}

impl CollisionIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one stored record.
    ///
    /// Must be called exactly once per distinct stored record.
    pub fn observe(&mut self, record: &SignatureRecord) -> Observation {
        self.records += 1;
        let position = Position::of(record);

        match self.tallies.entry(record.r_bytes()) {
            Entry::Vacant(entry) => {
                entry.insert(RTally {
                    count: 1,
                    earliest: position,
                });
                Observation {
                    count: 1,
                    prior: None,
                }
            }
            Entry::Occupied(mut entry) => {
                let tally = entry.get_mut();
                let prior = tally.earliest;
                tally.count = tally.count.saturating_add(1);
                tally.earliest = tally.earliest.min(position);
                if tally.count == 2 {
                    self.colliding += 1;
                }
                Observation {
                    count: tally.count,
                    prior: Some(prior),
                }
            }
        }
    }

    /// Number of stored records with this R.
    pub fn count(&self, r: &[u8; 32]) -> u64 {
        self.tallies.get(r).map_or(0, |t| t.count as u64)
    }

    pub fn tally(&self, r: &[u8; 32]) -> Option<&RTally> {
        self.tallies.get(r)
    }

    /// Number of records counted.
    pub fn records(&self) -> u64 {
        self.records
    }

    /// Number of distinct R values.
    pub fn distinct(&self) -> u64 {
        self.tallies.len() as u64
    }

    /// Number of R values with a count above one.
    pub fn colliding(&self) -> u64 {
        self.colliding
    }
}
