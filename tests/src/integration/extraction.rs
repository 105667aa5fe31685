//! # Extraction Against Real Encodings
//!
//! Signatures produced by `k256`, wrapped in transactions serialized by the
//! `bitcoin` crate, decoded the way the node adapter decodes `getblock`
//! output, then extracted.

#[cfg(test)]
mod tests {
    use bitcoin::absolute::LockTime;
    use bitcoin::block::{Header, Version as BlockVersion};
    use bitcoin::hashes::Hash as _;
    use bitcoin::transaction::Version;
    use bitcoin::{
        Amount, BlockHash, CompactTarget, OutPoint, ScriptBuf, Sequence, Transaction, TxIn,
        TxMerkleNode, TxOut, Witness,
    };
    use k256::ecdsa::signature::Signer;
    use k256::ecdsa::{Signature, SigningKey};
    use ns_01_signature_extraction::test_utils::{push_data, SAMPLE_PUBKEY, SIGHASH_ALL};
    use ns_01_signature_extraction::{SignatureExtractionApi, SignatureExtractor};
    use scanner_runtime::adapters::rpc::decode_block_hex;

    fn sign(key: &SigningKey, message: &[u8]) -> (Signature, Vec<u8>) {
        let signature: Signature = key.sign(message);
        let mut push = signature.to_der().as_bytes().to_vec();
        push.push(SIGHASH_ALL);
        (signature, push)
    }

    fn input(script_sig: Vec<u8>, witness: Vec<Vec<u8>>) -> TxIn {
        TxIn {
            previous_output: OutPoint::null(),
            script_sig: ScriptBuf::from_bytes(script_sig),
            sequence: Sequence::MAX,
            witness: Witness::from_slice(&witness),
        }
    }

    fn transaction(inputs: Vec<TxIn>) -> Transaction {
        Transaction {
            version: Version::TWO,
            lock_time: LockTime::ZERO,
            input: inputs,
            output: vec![TxOut {
                value: Amount::from_sat(5_000),
                script_pubkey: ScriptBuf::new(),
            }],
        }
    }

    fn raw_block(txdata: Vec<Transaction>) -> String {
        let block = bitcoin::Block {
            header: Header {
                version: BlockVersion::TWO,
                prev_blockhash: BlockHash::all_zeros(),
                merkle_root: TxMerkleNode::all_zeros(),
                time: 1_700_000_000,
                bits: CompactTarget::from_consensus(0x1703_a30c),
                nonce: 7,
            },
            txdata,
        };
        hex::encode(bitcoin::consensus::serialize(&block))
    }

    #[test]
    fn test_witness_inputs_yield_one_record_each() {
        let key = SigningKey::random(&mut rand::thread_rng());
        let mut expected = Vec::new();
        let inputs = (0..5u8)
            .map(|i| {
                let (signature, push) = sign(&key, &[i; 16]);
                expected.push(signature.split_bytes());
                input(Vec::new(), vec![push, SAMPLE_PUBKEY.to_vec()])
            })
            .collect();

        let block = decode_block_hex(840_000, &raw_block(vec![transaction(inputs)])).unwrap();
        let extraction = SignatureExtractor::default().extract_block(&block);

        assert_eq!(extraction.records.len(), 5);
        for (i, record) in extraction.records.iter().enumerate() {
            assert_eq!(record.input_index, i as u32);
            assert_eq!(record.sig_index, 0);
            assert_eq!(record.height, 840_000);
            assert_eq!(record.r_bytes().as_slice(), expected[i].0.as_slice());
            assert_eq!(record.s_bytes().as_slice(), expected[i].1.as_slice());
        }
        assert_eq!(extraction.stats.witness_inputs, 5);
    }

    #[test]
    fn test_legacy_signature_of_standard_length() {
        let key = SigningKey::random(&mut rand::thread_rng());
        // Find a signature whose push is exactly 71 bytes.
        let (signature, push) = (0u32..)
            .map(|n| sign(&key, &n.to_le_bytes()))
            .find(|(_, push)| push.len() == 71)
            .unwrap();

        let mut script = Vec::new();
        push_data(&mut script, &push);
        push_data(&mut script, &SAMPLE_PUBKEY);
        let tx = transaction(vec![input(script, Vec::new())]);
        let txid = tx.compute_txid();

        let block = decode_block_hex(1, &raw_block(vec![tx])).unwrap();
        let records = SignatureExtractor::default().extract_block(&block).records;

        assert_eq!(records.len(), 1);
        let (r, s) = signature.split_bytes();
        assert_eq!(records[0].r_bytes().as_slice(), r.as_slice());
        assert_eq!(records[0].s_bytes().as_slice(), s.as_slice());
        assert_eq!(hex::encode(records[0].tx_hash), txid.to_string());
    }

    #[test]
    fn test_malformed_push_yields_nothing_and_does_not_stop_the_block() {
        let key = SigningKey::random(&mut rand::thread_rng());
        let (_, good) = sign(&key, b"after the bad one");

        // 71 bytes that look like a push-sized candidate but are not DER.
        let mut garbage = vec![0x30, 0x44];
        garbage.extend(std::iter::repeat(0xFF).take(69));
        let mut bad_script = Vec::new();
        push_data(&mut bad_script, &garbage);
        push_data(&mut bad_script, &SAMPLE_PUBKEY);

        let block = decode_block_hex(
            2,
            &raw_block(vec![
                transaction(vec![input(bad_script, Vec::new())]),
                transaction(vec![input(Vec::new(), vec![good, SAMPLE_PUBKEY.to_vec()])]),
            ]),
        )
        .unwrap();
        let extraction = SignatureExtractor::default().extract_block(&block);

        assert_eq!(extraction.records.len(), 1);
        assert_eq!(extraction.records[0].tx_hash, block.transactions[1].tx_hash);
        assert_eq!(extraction.stats.rejected_candidates, 1);
    }

    #[test]
    fn test_truncated_script_is_skipped() {
        // Push opcode promising 71 bytes with only 10 present.
        let mut truncated = vec![71u8];
        truncated.extend_from_slice(&[0x30; 10]);

        let block = decode_block_hex(
            3,
            &raw_block(vec![transaction(vec![input(truncated, Vec::new())])]),
        )
        .unwrap();
        let extraction = SignatureExtractor::default().extract_block(&block);

        assert!(extraction.records.is_empty());
        assert_eq!(extraction.stats.script_errors, 1);
    }
}
