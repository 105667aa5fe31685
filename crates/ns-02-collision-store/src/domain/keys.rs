//! # Key Layout
//!
//! | Key | Value |
//! |-----|-------|
//! | `sig:` + height (u64 BE) + input (u32 BE) + sig (u32 BE) + R (32 bytes) | serialized `StoredSignature` |
//! | record key + tx hash (32 bytes) | serialized `StoredSignature` |
//! | `meta:cursor` | height (u64 BE) |
//!
//! Big-endian integers make lexicographic byte order equal to
//! `(height, input, sig, R)` order, so a prefix iteration over `sig:` walks
//! the chain in scan order.
//!
//! Two transactions of one block can sign the same input index with the same
//! R. The first keeps the plain key; any other signature on that key is
//! stored under the key qualified by its tx hash, which sorts right after the
//! plain key.

use super::errors::CollisionStoreError;
use shared_types::{BlockHeight, Hash, SignatureRecord};

/// Prefix of every signature record key.
pub const RECORD_PREFIX: &[u8] = b"sig:";

/// Key holding the scan cursor.
pub const CURSOR_KEY: &[u8] = b"meta:cursor";

/// Total length of a record key.
pub const RECORD_KEY_LEN: usize = 4 + 8 + 4 + 4 + 32;

/// Length of a record key qualified by a tx hash.
pub const QUALIFIED_KEY_LEN: usize = RECORD_KEY_LEN + 32;

/// Decoded form of a record key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RecordKey {
    pub height: BlockHeight,
    pub input_index: u32,
    pub sig_index: u32,
    pub r: [u8; 32],
}

impl RecordKey {
    pub fn for_record(record: &SignatureRecord) -> Self {
        Self {
            height: record.height,
            input_index: record.input_index,
            sig_index: record.sig_index,
            r: record.r_bytes(),
        }
    }

    pub fn encode(&self) -> [u8; RECORD_KEY_LEN] {
        let mut key = [0u8; RECORD_KEY_LEN];
        key[..4].copy_from_slice(RECORD_PREFIX);
        key[4..12].copy_from_slice(&self.height.to_be_bytes());
        key[12..16].copy_from_slice(&self.input_index.to_be_bytes());
        key[16..20].copy_from_slice(&self.sig_index.to_be_bytes());
        key[20..52].copy_from_slice(&self.r);
        key
    }

    /// Key for a second signature sharing this key, told apart by its tx.
    pub fn qualified(&self, tx_hash: &Hash) -> [u8; QUALIFIED_KEY_LEN] {
        let mut key = [0u8; QUALIFIED_KEY_LEN];
        key[..RECORD_KEY_LEN].copy_from_slice(&self.encode());
        key[RECORD_KEY_LEN..].copy_from_slice(tx_hash);
        key
    }

    /// Decode a plain or qualified key. The qualifier is returned separately.
    pub fn decode_qualified(key: &[u8]) -> Result<(Self, Option<Hash>), CollisionStoreError> {
        let malformed = || CollisionStoreError::MalformedKey {
            len: key.len(),
            key_hex: hex::encode(key),
        };
        match key.len() {
            RECORD_KEY_LEN => Ok((Self::decode(key)?, None)),
            QUALIFIED_KEY_LEN => {
                let tx_hash: Hash = key[RECORD_KEY_LEN..].try_into().map_err(|_| malformed())?;
                Ok((Self::decode(&key[..RECORD_KEY_LEN])?, Some(tx_hash)))
            }
            _ => Err(malformed()),
        }
    }

    pub fn decode(key: &[u8]) -> Result<Self, CollisionStoreError> {
        let malformed = || CollisionStoreError::MalformedKey {
            len: key.len(),
            key_hex: hex::encode(key),
        };
        if key.len() != RECORD_KEY_LEN || !key.starts_with(RECORD_PREFIX) {
            return Err(malformed());
        }

        let height = u64::from_be_bytes(key[4..12].try_into().map_err(|_| malformed())?);
        let input_index = u32::from_be_bytes(key[12..16].try_into().map_err(|_| malformed())?);
        let sig_index = u32::from_be_bytes(key[16..20].try_into().map_err(|_| malformed())?);
        let r: [u8; 32] = key[20..52].try_into().map_err(|_| malformed())?;

        Ok(Self {
            height,
            input_index,
            sig_index,
            r,
        })
    }
}

pub fn encode_cursor(height: BlockHeight) -> [u8; 8] {
    height.to_be_bytes()
}

pub fn decode_cursor(value: &[u8]) -> Result<BlockHeight, CollisionStoreError> {
    let bytes: [u8; 8] = value
        .try_into()
        .map_err(|_| CollisionStoreError::MalformedCursor { len: value.len() })?;
    Ok(u64::from_be_bytes(bytes))
}
