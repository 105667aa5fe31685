//! # Inbound Ports (Driving Ports / API)
//!
//! The API the commit consumer drives. It takes `&mut self` for writes: the
//! store has a single writer and needs no internal locking.

use crate::domain::cursor::ScanCursor;
use crate::domain::entities::{PutOutcome, StoreSummary};
use crate::domain::errors::CollisionStoreError;
use shared_types::{BlockHeight, SignatureRecord, U256};

/// Collision store API.
pub trait CollisionStoreApi: Send {
    /// Persist `record` under its unique key. Storing the same record again
    /// is a no-op.
    fn put(&mut self, record: &SignatureRecord) -> Result<PutOutcome, CollisionStoreError>;

    /// How many distinct stored records share `r`, across the whole history.
    fn count_by_r(&self, r: &U256) -> u64;

    /// Current cursor.
    fn cursor(&self) -> ScanCursor;

    /// Record that every height up to `height` is committed. Heights the
    /// cursor already covers are absorbed. Returns whether the cursor moved.
    fn advance_cursor(&mut self, height: BlockHeight) -> Result<bool, CollisionStoreError>;

    /// Totals over the stored history.
    fn summary(&self) -> StoreSummary;
}
