//! # Test Fixtures
//!
//! Builders for DER signatures, scripts and transactions. Enabled for this
//! crate's tests and, through the `test-utils` feature, for downstream crates.

use shared_types::{ChainTransaction, Hash, TxInput};

/// A compressed public key shaped push (33 bytes, `0x02` prefix).
pub const SAMPLE_PUBKEY: [u8; 33] = [
    0x02, 0x79, 0xbe, 0x66, 0x7e, 0xf9, 0xdc, 0xbb, 0xac, 0x55, 0xa0, 0x62, 0x95, 0xce, 0x87,
    0x0b, 0x07, 0x02, 0x9b, 0xfc, 0xdb, 0x2d, 0xce, 0x28, 0xd9, 0x59, 0xf2, 0x81, 0x5b, 0x16,
    0xf8, 0x17, 0x98,
];

/// SIGHASH_ALL.
pub const SIGHASH_ALL: u8 = 0x01;

fn der_integer(out: &mut Vec<u8>, value: &[u8; 32]) {
    let first = value.iter().position(|b| *b != 0).unwrap_or(31);
    let body = &value[first..];
    let pad = body[0] & 0x80 != 0;

    out.push(0x02);
    out.push((body.len() + pad as usize) as u8);
    if pad {
        out.push(0x00);
    }
    out.extend_from_slice(body);
}

/// Minimal DER encoding of `(r, s)` given as 32-byte big-endian scalars.
pub fn der_encode(r: &[u8; 32], s: &[u8; 32]) -> Vec<u8> {
    let mut body = Vec::with_capacity(70);
    der_integer(&mut body, r);
    der_integer(&mut body, s);

    let mut out = Vec::with_capacity(body.len() + 2);
    out.push(0x30);
    out.push(body.len() as u8);
    out.extend_from_slice(&body);
    out
}

/// DER signature followed by a SIGHASH_ALL byte, as it appears on chain.
pub fn signature_push(r: &[u8; 32], s: &[u8; 32]) -> Vec<u8> {
    let mut out = der_encode(r, s);
    out.push(SIGHASH_ALL);
    out
}

/// Append a push of `data` to `script` using the shortest push opcode.
pub fn push_data(script: &mut Vec<u8>, data: &[u8]) {
    match data.len() {
        0 => script.push(0x00),
        len @ 1..=0x4b => script.push(len as u8),
        len @ 0x4c..=0xff => {
            script.push(0x4c);
            script.push(len as u8);
        }
        len => {
            script.push(0x4d);
            script.extend_from_slice(&(len as u16).to_le_bytes());
        }
    }
    script.extend_from_slice(data);
}

/// `<sig> <pubkey>` unlocking script.
pub fn p2pkh_script_sig(r: &[u8; 32], s: &[u8; 32]) -> Vec<u8> {
    let mut script = Vec::new();
    push_data(&mut script, &signature_push(r, s));
    push_data(&mut script, &SAMPLE_PUBKEY);
    script
}

/// `OP_0 <sig>...` bare multisig unlocking script.
pub fn multisig_script_sig(signatures: &[([u8; 32], [u8; 32])]) -> Vec<u8> {
    let mut script = vec![0x00];
    for (r, s) in signatures {
        push_data(&mut script, &signature_push(r, s));
    }
    script
}

/// `[sig, pubkey]` witness stack.
pub fn p2wpkh_witness(r: &[u8; 32], s: &[u8; 32]) -> Vec<Vec<u8>> {
    vec![signature_push(r, s), SAMPLE_PUBKEY.to_vec()]
}

/// Transaction whose inputs spend with the given legacy scripts.
pub fn legacy_tx(tx_hash: Hash, scripts: Vec<Vec<u8>>) -> ChainTransaction {
    ChainTransaction {
        tx_hash,
        inputs: scripts.into_iter().map(TxInput::from_script).collect(),
    }
}

/// Transaction whose inputs spend with the given witness stacks.
pub fn witness_tx(tx_hash: Hash, stacks: Vec<Vec<Vec<u8>>>) -> ChainTransaction {
    ChainTransaction {
        tx_hash,
        inputs: stacks.into_iter().map(TxInput::from_witness).collect(),
    }
}
