//! # Adapters
//!
//! Production implementations of the scanner's outbound ports.
//!
//! - `rpc` - `ChainSource` over a bitcoind-compatible JSON-RPC endpoint
//! - `storage` - `KeyValueStore` over RocksDB

pub mod rpc;
pub mod storage;

pub use rpc::BitcoindRpcSource;
pub use storage::{RocksDbConfig, RocksDbStore};
