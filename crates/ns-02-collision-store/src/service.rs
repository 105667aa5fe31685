//! # Collision Store Service
//!
//! Durable record store plus the in-memory collision index and cursor.
//!
//! ## Lifecycle
//!
//! 1. `open` replays every stored record in key order, rebuilding the index
//!    and the cursor.
//! 2. The commit consumer calls `put` per record and `advance_cursor` per
//!    sealed height. It is the only writer.
//! 3. `collisions` walks the store again to list every reused R value.

use crate::adapters::serializer::BincodeRecordSerializer;
use crate::domain::cursor::ScanCursor;
use crate::domain::entities::{
    CollisionGroup, PutOutcome, StoreSummary, StoredSignature,
};
use crate::domain::errors::CollisionStoreError;
use crate::domain::index::CollisionIndex;
use crate::domain::keys::{decode_cursor, encode_cursor, RecordKey, CURSOR_KEY, RECORD_PREFIX};
use crate::ports::inbound::CollisionStoreApi;
use crate::ports::outbound::{KeyValueStore, RecordSerializer};
use shared_types::{u256_to_bytes, u256_to_hex, BlockHeight, SignatureRecord, U256};
use std::collections::HashMap;
use tracing::{debug, info};

/// The collision store.
pub struct CollisionStore<KV, RS = BincodeRecordSerializer>
where
    KV: KeyValueStore,
    RS: RecordSerializer,
{
    /// Ordered key-value store for persistence.
    kv: KV,
    /// Record value encoding.
    serializer: RS,
    /// R -> tally over the whole stored history.
    index: CollisionIndex,
    /// Last committed height.
    cursor: ScanCursor,
    /// Highest record height stored.
    max_height: Option<BlockHeight>,
}

impl<KV: KeyValueStore> CollisionStore<KV> {
    /// Open the store with the default bincode encoding and replay it.
    pub fn open(kv: KV) -> Result<Self, CollisionStoreError> {
        Self::open_with_serializer(kv, BincodeRecordSerializer)
    }
}

impl<KV, RS> CollisionStore<KV, RS>
where
    KV: KeyValueStore,
    RS: RecordSerializer,
{
    /// Open the store and replay it.
    pub fn open_with_serializer(kv: KV, serializer: RS) -> Result<Self, CollisionStoreError> {
        let mut store = Self {
            kv,
            serializer,
            index: CollisionIndex::new(),
            cursor: ScanCursor::empty(),
            max_height: None,
        };
        store.replay()?;
        Ok(store)
    }

    /// Rebuild the index and cursor from a full pass over the store.
    fn replay(&mut self) -> Result<(), CollisionStoreError> {
        let stored_cursor = self
            .kv
            .get(CURSOR_KEY)?
            .map(|value| decode_cursor(&value))
            .transpose()?;

        let mut index = CollisionIndex::new();
        let mut max_height = None;
        for record in self.iter_all() {
            let record = record?;
            index.observe(&record);
            max_height = max_height.max(Some(record.height));
        }

        self.index = index;
        self.max_height = max_height;
        self.cursor = ScanCursor::rebuild(stored_cursor, max_height);

        let summary = self.summary();
        if summary.records == 0 && stored_cursor.is_none() {
            info!("[ns-02] No stored signatures, starting from genesis");
        } else {
            info!(
                "[ns-02] 💾 Replayed {} signatures: {} distinct R values, {} already reused; cursor {} ({:?}), resume at {}",
                summary.records,
                summary.distinct_r,
                summary.colliding_r,
                self.cursor.load(),
                self.cursor.origin(),
                self.cursor.resume_height()
            );
        }
        Ok(())
    }

    /// Every stored record in key order: height, input, sig index, R.
    ///
    /// Lazy and restartable; each call is a fresh pass.
    pub fn iter_all(
        &self,
    ) -> impl Iterator<Item = Result<SignatureRecord, CollisionStoreError>> + '_ {
        self.kv.prefix_iter(RECORD_PREFIX).map(move |item| {
            let (key, value) = item?;
            self.decode_entry(&key, &value)
        })
    }

    fn decode_entry(&self, key: &[u8], value: &[u8]) -> Result<SignatureRecord, CollisionStoreError> {
        let (decoded_key, qualifier) = RecordKey::decode_qualified(key)?;
        let stored: StoredSignature = self.serializer.deserialize(value)?;
        let record = SignatureRecord::from(stored);

        let tx_matches = qualifier.map_or(true, |tx_hash| tx_hash == record.tx_hash);
        if RecordKey::for_record(&record) != decoded_key || !tx_matches {
            return Err(CollisionStoreError::KeyMismatch {
                key_hex: hex::encode(key),
            });
        }
        Ok(record)
    }

    /// Point lookup of a stored record.
    pub fn get(&self, key: &RecordKey) -> Result<Option<SignatureRecord>, CollisionStoreError> {
        let encoded = key.encode();
        match self.kv.get(&encoded)? {
            Some(value) => self.decode_entry(&encoded, &value).map(Some),
            None => Ok(None),
        }
    }

    /// Every R value stored more than once, with all of its occurrences.
    ///
    /// Groups are ordered by their first occurrence.
    pub fn collisions(&self) -> Result<Vec<CollisionGroup>, CollisionStoreError> {
        let mut groups: Vec<CollisionGroup> = Vec::new();
        let mut slots: HashMap<[u8; 32], usize> = HashMap::new();

        for record in self.iter_all() {
            let record = record?;
            let r = record.r_bytes();
            if self.index.count(&r) < 2 {
                continue;
            }
            let slot = *slots.entry(r).or_insert_with(|| {
                groups.push(CollisionGroup {
                    r: record.r,
                    occurrences: Vec::new(),
                });
                groups.len() - 1
            });
            groups[slot].occurrences.push(record);
        }
        Ok(groups)
    }

    /// Release the underlying store.
    pub fn into_inner(self) -> KV {
        self.kv
    }
}

impl<KV, RS> CollisionStoreApi for CollisionStore<KV, RS>
where
    KV: KeyValueStore,
    RS: RecordSerializer,
{
    fn put(&mut self, record: &SignatureRecord) -> Result<PutOutcome, CollisionStoreError> {
        let key = RecordKey::for_record(record);
        let encoded = key.encode();

        let target = match self.kv.get(&encoded)? {
            None => encoded.to_vec(),
            Some(value) => {
                let existing = self.decode_entry(&encoded, &value)?;
                if existing == *record {
                    debug!("[ns-02] Record {} already stored", record.location());
                    return Ok(PutOutcome::AlreadyPresent);
                }
                // Another signature of the same block holds the key.
                let qualified = key.qualified(&record.tx_hash);
                if self.kv.exists(&qualified)? {
                    debug!("[ns-02] Record {} already stored", record.location());
                    return Ok(PutOutcome::AlreadyPresent);
                }
                info!(
                    "[ns-02] {} shares its key with tx {}, storing under a tx-qualified key",
                    record.location(),
                    hex::encode(existing.tx_hash)
                );
                qualified.to_vec()
            }
        };

        let value = self.serializer.serialize(&StoredSignature::from(record))?;
        self.kv.put(&target, &value)?;

        // Index only after the write succeeded.
        let seen = self.index.observe(record);
        self.max_height = self.max_height.max(Some(record.height));

        let prior = match seen.prior {
            Some(position) => {
                debug!(
                    "[ns-02] R {} now stored {} times",
                    short_r(&record.r),
                    seen.count
                );
                self.get(&position.key(key.r))?
            }
            None => None,
        };

        Ok(PutOutcome::Inserted {
            count: seen.count as u64,
            prior,
        })
    }

    fn count_by_r(&self, r: &U256) -> u64 {
        self.index.count(&u256_to_bytes(r))
    }

    fn cursor(&self) -> ScanCursor {
        self.cursor
    }

    fn advance_cursor(&mut self, height: BlockHeight) -> Result<bool, CollisionStoreError> {
        if !self.cursor.accepts(height) {
            debug!(
                "[ns-02] Cursor already at {}, ignoring advance to {}",
                self.cursor.load(),
                height
            );
            return Ok(false);
        }

        self.kv.put(CURSOR_KEY, &encode_cursor(height))?;
        self.cursor = ScanCursor::persisted(height);
        Ok(true)
    }

    fn summary(&self) -> StoreSummary {
        StoreSummary {
            records: self.index.records(),
            distinct_r: self.index.distinct(),
            colliding_r: self.index.colliding(),
            max_height: self.max_height,
        }
    }
}

impl<KV, RS> std::fmt::Debug for CollisionStore<KV, RS>
where
    KV: KeyValueStore,
    RS: RecordSerializer,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CollisionStore")
            .field("cursor", &self.cursor)
            .field("summary", &self.summary())
            .finish()
    }
}

/// Render an R value for log lines.
pub(crate) fn short_r(r: &U256) -> String {
    let hex = u256_to_hex(r);
    format!("{}…{}", &hex[..8], &hex[56..])
}
