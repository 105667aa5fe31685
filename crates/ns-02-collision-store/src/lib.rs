//! # Collision Store (ns-02)
//!
//! Durable store of every observed signature record, the R-value collision
//! index derived from it, and the scan cursor.
//!
//! ## Architecture
//!
//! This crate follows hexagonal architecture:
//! - **Domain Layer** (`domain/`): key layout, stored record form, collision
//!   index, cursor rules
//! - **Ports Layer** (`ports/`): `CollisionStoreApi` (inbound), `KeyValueStore`
//!   and `RecordSerializer` (outbound)
//! - **Adapters Layer** (`adapters/`): in-memory store, bincode serializer
//! - **Service Layer** (`service.rs`): `CollisionStore`
//!
//! ## Guarantees
//!
//! - Records are keyed by `(height, input, sig index, R)`. `put` of a record
//!   already stored is a no-op; a different signature on an occupied key is
//!   kept under the key qualified by its tx hash, so it still counts.
//! - `count_by_r` counts the whole stored history, rebuilt by a full replay on
//!   open, not just the records written by the current process.
//! - The cursor never moves backwards.

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

// Re-export public API
pub use adapters::{BincodeRecordSerializer, InMemoryKVStore};
pub use domain::cursor::{CursorOrigin, ScanCursor};
pub use domain::entities::{CollisionGroup, PutOutcome, StoreSummary, StoredSignature};
pub use domain::errors::{CollisionStoreError, KVStoreError, SerializationError};
pub use domain::index::{CollisionIndex, Observation, Position, RTally};
pub use domain::keys::{
    RecordKey, CURSOR_KEY, QUALIFIED_KEY_LEN, RECORD_KEY_LEN, RECORD_PREFIX,
};
pub use ports::inbound::CollisionStoreApi;
pub use ports::outbound::{KVIter, KVPair, KeyValueStore, RecordSerializer};
pub use service::CollisionStore;
