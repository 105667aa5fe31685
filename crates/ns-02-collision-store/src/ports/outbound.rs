//! # Outbound Ports (Driven Ports)
//!
//! Dependencies required by the collision store.

use crate::domain::entities::StoredSignature;
use crate::domain::errors::{KVStoreError, SerializationError};

/// One `(key, value)` pair from an iteration.
pub type KVPair = (Vec<u8>, Vec<u8>);

/// Lazy, key-ordered iteration over a prefix.
pub type KVIter<'a> = Box<dyn Iterator<Item = Result<KVPair, KVStoreError>> + 'a>;

/// Abstract interface for an ordered byte-key/byte-value database.
///
/// Production: `RocksDbStore` (scanner-runtime/adapters/storage/rocksdb_adapter.rs)
/// Testing: `InMemoryKVStore` (adapters/storage/memory.rs)
pub trait KeyValueStore: Send + Sync {
    /// Get a value by key.
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, KVStoreError>;

    /// Put a single key-value pair.
    fn put(&mut self, key: &[u8], value: &[u8]) -> Result<(), KVStoreError>;

    /// Check if a key exists.
    fn exists(&self, key: &[u8]) -> Result<bool, KVStoreError>;

    /// Iterate over all keys starting with `prefix`, in ascending byte order.
    ///
    /// Each call starts a fresh pass.
    fn prefix_iter<'a>(&'a self, prefix: &[u8]) -> KVIter<'a>;
}

/// Abstract interface for record value encoding.
pub trait RecordSerializer: Send + Sync {
    fn serialize(&self, record: &StoredSignature) -> Result<Vec<u8>, SerializationError>;

    fn deserialize(&self, data: &[u8]) -> Result<StoredSignature, SerializationError>;
}
