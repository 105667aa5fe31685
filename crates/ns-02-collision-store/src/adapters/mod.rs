//! # Adapters Module
//!
//! - `storage`: in-memory `KeyValueStore` (RocksDB lives in the runtime)
//! - `serializer`: bincode record encoding

pub mod serializer;
pub mod storage;

pub use serializer::BincodeRecordSerializer;
pub use storage::InMemoryKVStore;
