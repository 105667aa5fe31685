//! # Scanner Runtime
//!
//! Production wiring for the `nonce-scan` binary.
//!
//! ## Modular Structure
//!
//! - `container/` - configuration loading and validation
//! - `adapters/` - RocksDB store and node JSON-RPC chain source
//! - `commands` - the `scan` and `collisions` subcommands
//!
//! ## Startup Sequence
//!
//! 1. Load configuration (file, then environment)
//! 2. Validate it; any problem exits with code 2 before the node is contacted
//! 3. Open the signature store and replay it into the collision index
//! 4. Scan from the cursor to the tip, reports on stdout, logs on stderr
//! 5. On Ctrl-C stop fetching, drain the commit queue, exit with code 130

pub mod adapters;
pub mod commands;
pub mod container;

pub use adapters::{BitcoindRpcSource, RocksDbConfig, RocksDbStore};
pub use commands::{
    collision_listings, error_class, exit_code, failure_exit_code, run_scan, write_collisions,
    CollisionListing, RunOutcome,
};
pub use container::{ConfigError, ScannerConfig};
