//! Storage adapters.

pub mod rocksdb_adapter;

pub use rocksdb_adapter::{RocksDbConfig, RocksDbStore};
