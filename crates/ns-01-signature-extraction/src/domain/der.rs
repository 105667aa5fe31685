//! # Strict DER Signature Parsing
//!
//! On-chain signatures are a DER `SEQUENCE { INTEGER r, INTEGER s }` followed
//! by a one-byte sighash type. The SEQUENCE header declares the body length,
//! so anything after `2 + declared` bytes is trailing data and is dropped
//! before the strict parse.
//!
//! The strict parse itself is delegated to `k256`, which rejects non-minimal
//! integer encodings, negative integers, and scalars outside `[1, n-1]`.
//! High-S values are accepted: this is a scanner, not a validator.

use super::entities::SignaturePair;
use super::errors::ExtractionError;
use k256::ecdsa::Signature;
use shared_types::U256;

/// DER SEQUENCE tag.
const SEQUENCE_TAG: u8 = 0x30;

/// Smallest possible encoding: `30 06 02 01 r 02 01 s`.
const MIN_DER_LEN: usize = 8;

/// Parse a DER-encoded ECDSA signature, tolerating a trailing sighash byte.
pub fn parse_der_signature(candidate: &[u8]) -> Result<SignaturePair, ExtractionError> {
    if candidate.len() < MIN_DER_LEN {
        return Err(ExtractionError::TooShort {
            len: candidate.len(),
        });
    }
    if candidate[0] != SEQUENCE_TAG {
        return Err(ExtractionError::NotASequence { tag: candidate[0] });
    }

    let declared = candidate[1] as usize;
    let available = candidate.len() - 2;
    if declared > available {
        return Err(ExtractionError::LengthMismatch {
            declared,
            available,
        });
    }

    let der = &candidate[..declared + 2];
    let signature =
        Signature::from_der(der).map_err(|e| ExtractionError::InvalidDer(e.to_string()))?;
    let (r, s) = signature.split_bytes();

    Ok(SignaturePair {
        r: U256::from_big_endian(&r[..]),
        s: U256::from_big_endian(&s[..]),
    })
}
