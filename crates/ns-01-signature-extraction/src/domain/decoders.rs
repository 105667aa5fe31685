//! # Decoding Strategies
//!
//! Two strategies behind one capability, chosen per input by whether a witness
//! stack is present.

use super::der::parse_der_signature;
use super::entities::{DecodedInput, DEFAULT_SIGNATURE_PUSH_LEN};
use super::errors::ExtractionError;
use super::script::ScriptTokenizer;
use shared_types::TxInput;

/// Turns one transaction input into zero or more `(R, S)` pairs.
pub trait SignatureDecoder: Send + Sync {
    /// Short name used in diagnostics.
    fn name(&self) -> &'static str;

    /// Decode the input. Never fails: rejections are reported in the output.
    fn decode(&self, input: &TxInput) -> DecodedInput;
}

// =============================================================================
// WITNESS DECODER
// =============================================================================

/// Witness spends: the signature sits in a fixed slot, second-to-last.
///
/// Matches the standard single-signature witness layout `[sig, pubkey]`.
#[derive(Debug, Clone, Copy, Default)]
pub struct WitnessDecoder;

impl WitnessDecoder {
    pub fn new() -> Self {
        Self
    }

    /// Decode a witness stack. Yields at most one pair.
    pub fn decode_stack(&self, stack: &[Vec<u8>]) -> DecodedInput {
        if stack.len() < 2 {
            return DecodedInput::rejected(ExtractionError::WitnessTooShort {
                elements: stack.len(),
            });
        }

        let candidate = &stack[stack.len() - 2];
        match parse_der_signature(candidate) {
            Ok(pair) => DecodedInput {
                pairs: vec![pair],
                rejected: Vec::new(),
            },
            Err(e) => DecodedInput::rejected(e),
        }
    }
}

impl SignatureDecoder for WitnessDecoder {
    fn name(&self) -> &'static str {
        "witness"
    }

    fn decode(&self, input: &TxInput) -> DecodedInput {
        self.decode_stack(&input.witness)
    }
}

// =============================================================================
// SCRIPTSIG DECODER
// =============================================================================

/// Legacy spends: every push whose length equals the signature length is a
/// candidate.
///
/// Legacy scripts mix signatures with public keys and other data, and the
/// length check filters most of them out before the structured parse.
#[derive(Debug, Clone, Copy)]
pub struct ScriptSigDecoder {
    signature_len: usize,
}

impl Default for ScriptSigDecoder {
    fn default() -> Self {
        Self::new(DEFAULT_SIGNATURE_PUSH_LEN)
    }
}

impl ScriptSigDecoder {
    pub fn new(signature_len: usize) -> Self {
        Self { signature_len }
    }

    /// Push length treated as a signature candidate.
    pub fn signature_len(&self) -> usize {
        self.signature_len
    }

    /// Decode a legacy script.
    ///
    /// A tokenizer error ends the walk; pairs found before it are kept.
    pub fn decode_script(&self, script: &[u8]) -> DecodedInput {
        let mut out = DecodedInput::default();

        for instruction in ScriptTokenizer::new(script) {
            let instruction = match instruction {
                Ok(instruction) => instruction,
                Err(e) => {
                    out.rejected.push(e.into());
                    break;
                }
            };

            let Some(data) = instruction.push_data() else {
                continue;
            };
            if data.len() != self.signature_len {
                continue;
            }

            match parse_der_signature(data) {
                Ok(pair) => out.pairs.push(pair),
                Err(e) => out.rejected.push(e),
            }
        }

        out
    }
}

impl SignatureDecoder for ScriptSigDecoder {
    fn name(&self) -> &'static str {
        "script_sig"
    }

    fn decode(&self, input: &TxInput) -> DecodedInput {
        self.decode_script(&input.script_sig)
    }
}
