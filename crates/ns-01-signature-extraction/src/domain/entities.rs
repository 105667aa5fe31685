//! # Extraction Entities

use super::errors::ExtractionError;
use shared_types::{SignatureRecord, U256};

/// Canonical push length of a legacy signature: 70-byte DER body with two
/// 32-byte integers plus the sighash byte.
pub const DEFAULT_SIGNATURE_PUSH_LEN: usize = 71;

/// Transactions per block above which extraction fans out across threads.
pub const PARALLEL_THRESHOLD: usize = 64;

/// An `(R, S)` pair produced by a decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SignaturePair {
    pub r: U256,
    pub s: U256,
}

/// Decoder output for a single input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecodedInput {
    /// Pairs in decoder order.
    pub pairs: Vec<SignaturePair>,
    /// Candidates or script sections that yielded nothing.
    pub rejected: Vec<ExtractionError>,
}

impl DecodedInput {
    /// Output with a single rejection and no pairs.
    pub fn rejected(error: ExtractionError) -> Self {
        Self {
            pairs: Vec::new(),
            rejected: vec![error],
        }
    }
}

/// Extractor configuration.
#[derive(Debug, Clone)]
pub struct ExtractorConfig {
    /// Push length that marks a legacy script element as a signature candidate.
    pub signature_push_len: usize,
    /// Transaction count at which block extraction goes parallel.
    pub parallel_threshold: usize,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            signature_push_len: DEFAULT_SIGNATURE_PUSH_LEN,
            parallel_threshold: PARALLEL_THRESHOLD,
        }
    }
}

/// Counters collected while extracting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtractionStats {
    pub transactions: u64,
    pub inputs: u64,
    pub witness_inputs: u64,
    pub signatures: u64,
    pub rejected_candidates: u64,
    pub script_errors: u64,
}

impl ExtractionStats {
    /// Add `other` into `self`.
    pub fn merge(&mut self, other: &ExtractionStats) {
        self.transactions += other.transactions;
        self.inputs += other.inputs;
        self.witness_inputs += other.witness_inputs;
        self.signatures += other.signatures;
        self.rejected_candidates += other.rejected_candidates;
        self.script_errors += other.script_errors;
    }
}

/// Records extracted from a transaction or a whole block, in chain order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlockExtraction {
    pub records: Vec<SignatureRecord>,
    pub stats: ExtractionStats,
}

impl BlockExtraction {
    /// Append `other` after the records already held.
    pub fn append(&mut self, mut other: BlockExtraction) {
        self.records.append(&mut other.records);
        self.stats.merge(&other.stats);
    }
}
