//! # Signature Extraction Service
//!
//! `SignatureExtractor` routes each input to a decoder, numbers the pairs it
//! returns and wraps them into `SignatureRecord`s.

use crate::domain::decoders::{ScriptSigDecoder, SignatureDecoder, WitnessDecoder};
use crate::domain::entities::{BlockExtraction, ExtractionStats, ExtractorConfig};
use crate::ports::inbound::SignatureExtractionApi;
use rayon::prelude::*;
use shared_types::{
    BlockHeight, ChainBlock, ChainTransaction, Classify, SignatureRecord, TxInput,
};
use tracing::{debug, warn};

/// Extracts every ECDSA signature from a transaction's inputs.
#[derive(Debug, Clone)]
pub struct SignatureExtractor {
    config: ExtractorConfig,
    witness: WitnessDecoder,
    script: ScriptSigDecoder,
}

impl Default for SignatureExtractor {
    fn default() -> Self {
        Self::new(ExtractorConfig::default())
    }
}

impl SignatureExtractor {
    pub fn new(config: ExtractorConfig) -> Self {
        Self {
            script: ScriptSigDecoder::new(config.signature_push_len),
            witness: WitnessDecoder::new(),
            config,
        }
    }

    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Witness data present: fixed-slot decoder. Otherwise: script scan.
    fn decoder_for(&self, input: &TxInput) -> &dyn SignatureDecoder {
        if input.has_witness() {
            &self.witness
        } else {
            &self.script
        }
    }

    /// Extract one transaction, collecting counters alongside the records.
    pub fn extract_transaction(
        &self,
        tx: &ChainTransaction,
        height: BlockHeight,
    ) -> BlockExtraction {
        let mut out = BlockExtraction::default();
        out.stats.transactions = 1;

        for (input_index, input) in tx.inputs.iter().enumerate() {
            let input_index = input_index as u32;
            let decoder = self.decoder_for(input);
            let decoded = decoder.decode(input);

            out.stats.inputs += 1;
            if input.has_witness() {
                out.stats.witness_inputs += 1;
            }

            for rejection in &decoded.rejected {
                // Extraction never ends a run; only recoverable errors are dropped.
                debug_assert!(!rejection.is_fatal(), "fatal extraction error: {rejection}");
                if rejection.is_script_error() {
                    out.stats.script_errors += 1;
                } else {
                    out.stats.rejected_candidates += 1;
                }
                if rejection.is_expected_shape() {
                    debug!(
                        height,
                        tx = %hex::encode(tx.tx_hash),
                        input = input_index,
                        "[ns-01] No signature slot in witness: {}",
                        rejection
                    );
                    continue;
                }
                warn!(
                    height,
                    tx = %hex::encode(tx.tx_hash),
                    input = input_index,
                    decoder = decoder.name(),
                    error = %rejection,
                    "[ns-01] Skipping unparseable signature data"
                );
            }

            for (sig_index, pair) in decoded.pairs.into_iter().enumerate() {
                out.records.push(SignatureRecord {
                    tx_hash: tx.tx_hash,
                    input_index,
                    sig_index: sig_index as u32,
                    height,
                    r: pair.r,
                    s: pair.s,
                });
            }
        }

        out.stats.signatures = out.records.len() as u64;
        out
    }
}

impl SignatureExtractionApi for SignatureExtractor {
    fn extract(&self, tx: &ChainTransaction, height: BlockHeight) -> Vec<SignatureRecord> {
        self.extract_transaction(tx, height).records
    }

    fn extract_block(&self, block: &ChainBlock) -> BlockExtraction {
        let height = block.height;

        // Collect per-transaction results first so block order survives the
        // parallel map.
        let per_tx: Vec<BlockExtraction> =
            if block.transactions.len() >= self.config.parallel_threshold {
                block
                    .transactions
                    .par_iter()
                    .map(|tx| self.extract_transaction(tx, height))
                    .collect()
            } else {
                block
                    .transactions
                    .iter()
                    .map(|tx| self.extract_transaction(tx, height))
                    .collect()
            };

        let mut out = BlockExtraction {
            records: Vec::with_capacity(per_tx.iter().map(|e| e.records.len()).sum()),
            stats: ExtractionStats::default(),
        };
        for extraction in per_tx {
            out.append(extraction);
        }
        out
    }
}
