//! # Core Domain Entities
//!
//! ## Clusters
//!
//! - **Chain**: `ChainBlock`, `ChainTransaction`, `TxInput` as delivered by a
//!   chain source. Decoding the node's wire format is the source's job.
//! - **Signatures**: `SignatureRecord` and its `SignatureLocation`.

use serde::{Deserialize, Serialize};
use std::fmt;

// Re-export U256 from primitive-types for use across all crates
pub use primitive_types::U256;

// =============================================================================
// CLUSTER A: THE CHAIN
// =============================================================================

/// A 32-byte hash (transaction or block identifier).
pub type Hash = [u8; 32];

/// Height of a block in the linear chain.
pub type BlockHeight = u64;

/// A block fetched from the chain source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainBlock {
    /// Height of this block.
    pub height: BlockHeight,
    /// Block hash in display order.
    pub hash: Hash,
    /// Transactions in block order.
    pub transactions: Vec<ChainTransaction>,
}

impl ChainBlock {
    /// Create an empty block at `height`.
    pub fn empty(height: BlockHeight) -> Self {
        Self {
            height,
            hash: [0u8; 32],
            transactions: Vec::new(),
        }
    }

    /// Total number of inputs across all transactions.
    pub fn input_count(&self) -> usize {
        self.transactions.iter().map(|tx| tx.inputs.len()).sum()
    }
}

/// A transaction inside a [`ChainBlock`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainTransaction {
    /// Transaction hash in display order.
    pub tx_hash: Hash,
    /// Inputs in transaction order.
    pub inputs: Vec<TxInput>,
}

/// A transaction input.
///
/// Both fields may be empty: coinbase inputs carry arbitrary script bytes and
/// no witness, native segwit spends carry an empty script and a witness stack.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxInput {
    /// Legacy unlocking script bytes.
    pub script_sig: Vec<u8>,
    /// Witness stack, bottom element first.
    pub witness: Vec<Vec<u8>>,
}

impl TxInput {
    /// Input spending with a legacy unlocking script only.
    pub fn from_script(script_sig: Vec<u8>) -> Self {
        Self {
            script_sig,
            witness: Vec::new(),
        }
    }

    /// Input spending with a witness stack only.
    pub fn from_witness(witness: Vec<Vec<u8>>) -> Self {
        Self {
            script_sig: Vec::new(),
            witness,
        }
    }

    /// Whether this input carries witness data.
    pub fn has_witness(&self) -> bool {
        !self.witness.is_empty()
    }
}

// =============================================================================
// CLUSTER B: SIGNATURES
// =============================================================================

/// Where a signature was observed on chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SignatureLocation {
    /// Block height.
    pub height: BlockHeight,
    /// Transaction hash in display order.
    pub tx_hash: Hash,
    /// Index of the input within the transaction.
    pub input_index: u32,
    /// Index of the signature within the input.
    pub sig_index: u32,
}

impl fmt::Display for SignatureLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}#{} @ {}",
            hex::encode(self.tx_hash),
            self.input_index,
            self.sig_index,
            self.height
        )
    }
}

/// One ECDSA signature occurrence extracted from a transaction input.
///
/// Uniquely identified by `(height, input_index, sig_index, r)`, which is also
/// its storage key. Immutable once created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SignatureRecord {
    /// Transaction hash in display order.
    pub tx_hash: Hash,
    /// Index of the input within the transaction.
    pub input_index: u32,
    /// Index of the signature within the input, in decoder order.
    pub sig_index: u32,
    /// Block height.
    pub height: BlockHeight,
    /// The signature's R value (nonce commitment).
    pub r: U256,
    /// The signature's S value.
    pub s: U256,
}

impl SignatureRecord {
    /// Location of this record on chain.
    pub fn location(&self) -> SignatureLocation {
        SignatureLocation {
            height: self.height,
            tx_hash: self.tx_hash,
            input_index: self.input_index,
            sig_index: self.sig_index,
        }
    }

    /// R as 32 big-endian bytes.
    pub fn r_bytes(&self) -> [u8; 32] {
        u256_to_bytes(&self.r)
    }

    /// S as 32 big-endian bytes.
    pub fn s_bytes(&self) -> [u8; 32] {
        u256_to_bytes(&self.s)
    }
}

/// Encode a `U256` as 32 big-endian bytes.
pub fn u256_to_bytes(value: &U256) -> [u8; 32] {
    let mut bytes = [0u8; 32];
    value.to_big_endian(&mut bytes);
    bytes
}

/// Render a `U256` as 64 lowercase hex characters.
pub fn u256_to_hex(value: &U256) -> String {
    hex::encode(u256_to_bytes(value))
}
