//! # Shared Fixtures
//!
//! Chains, blocks and a one-call scan runner over in-memory collaborators.

use ns_01_signature_extraction::test_utils::{
    legacy_tx, multisig_script_sig, p2pkh_script_sig, p2wpkh_witness, witness_tx,
};
use ns_01_signature_extraction::SignatureExtractor;
use ns_02_collision_store::{CollisionStore, InMemoryKVStore};
use ns_03_scan_loop::test_utils::{CollectingReportSink, InMemoryChainSource};
use ns_03_scan_loop::{CollisionReport, ScanConfig, ScanError, ScanLoop, ScanSummary};
use rand::Rng;
use shared_types::{BlockHeight, ChainBlock, ChainTransaction, Hash};
use tokio::sync::watch;

/// R shared by the two signatures of the cross-format scenario.
pub const SCENARIO_R: [u8; 32] = [0xAA; 32];
/// Legacy spend at height 100.
pub const TX_A: Hash = [0x0A; 32];
/// Witness spend at height 250.
pub const TX_B: Hash = [0x0B; 32];

/// An S whose DER integer is 31 bytes.
///
/// Next to an R with the high bit set (33-byte integer) this keeps the
/// legacy push at exactly 71 bytes.
pub fn short_s(fill: u8) -> [u8; 32] {
    let mut s = [fill & 0x7F; 32];
    s[0] = 0x00;
    s
}

/// Empty chain `0..=300`, with a legacy signature at 100 and a witness
/// signature at 250 sharing [`SCENARIO_R`].
pub fn scenario_chain() -> InMemoryChainSource {
    let source = InMemoryChainSource::with_empty_chain(300);
    source.insert(ChainBlock {
        height: 100,
        hash: [0x64; 32],
        transactions: vec![legacy_tx(
            TX_A,
            vec![p2pkh_script_sig(&SCENARIO_R, &short_s(0x3B))],
        )],
    });
    source.insert(ChainBlock {
        height: 250,
        hash: [0xFA; 32],
        transactions: vec![witness_tx(TX_B, vec![p2wpkh_witness(&SCENARIO_R, &[0xBB; 32])])],
    });
    source
}

/// A 32-byte scalar below the curve order whose DER integer needs no pad.
pub fn random_scalar<R: Rng>(rng: &mut R) -> [u8; 32] {
    let mut value: [u8; 32] = rng.gen();
    value[0] = (value[0] & 0x7F) | 0x01;
    value
}

/// Pool of R values to draw from; a small pool forces collisions.
pub fn r_pool<R: Rng>(rng: &mut R, size: usize) -> Vec<[u8; 32]> {
    (0..size).map(|_| random_scalar(rng)).collect()
}

fn random_transaction<R: Rng>(rng: &mut R, pool: &[[u8; 32]]) -> ChainTransaction {
    let tx_hash: Hash = rng.gen();
    let pick = |rng: &mut R| (pool[rng.gen_range(0..pool.len())], random_scalar(rng));

    match rng.gen_range(0..4) {
        0 => {
            let (r, s) = pick(rng);
            legacy_tx(tx_hash, vec![p2pkh_script_sig(&r, &s)])
        }
        1 => {
            let sigs = vec![pick(rng), pick(rng)];
            legacy_tx(tx_hash, vec![multisig_script_sig(&sigs)])
        }
        2 => {
            let inputs = rng.gen_range(1..4);
            let stacks = (0..inputs)
                .map(|_| {
                    let (r, s) = pick(rng);
                    p2wpkh_witness(&r, &s)
                })
                .collect();
            witness_tx(tx_hash, stacks)
        }
        _ => {
            // Coinbase-like input: arbitrary script, no signature.
            let script = (0..rng.gen_range(2..40)).map(|_| rng.gen()).collect();
            legacy_tx(tx_hash, vec![script])
        }
    }
}

/// Block of `tx_count` transactions mixing legacy, multisig, witness and
/// signature-free inputs, with R drawn from `pool`.
pub fn random_block<R: Rng>(
    rng: &mut R,
    height: BlockHeight,
    tx_count: usize,
    pool: &[[u8; 32]],
) -> ChainBlock {
    ChainBlock {
        height,
        hash: rng.gen(),
        transactions: (0..tx_count)
            .map(|_| random_transaction(rng, pool))
            .collect(),
    }
}

/// Chain `0..=tip` of random blocks with up to `max_txs` transactions each.
pub fn random_chain<R: Rng>(
    rng: &mut R,
    tip: BlockHeight,
    max_txs: usize,
    pool: &[[u8; 32]],
) -> InMemoryChainSource {
    let source = InMemoryChainSource::new();
    for height in 0..=tip {
        let tx_count = rng.gen_range(0..=max_txs);
        source.insert(random_block(rng, height, tx_count, pool));
    }
    source
}

/// Small queue so tests exercise backpressure.
pub fn test_config(stop_height: Option<BlockHeight>) -> ScanConfig {
    ScanConfig {
        queue_capacity: 8,
        progress_interval: 50,
        stop_height,
    }
}

/// Run one scan over `kv`, uncancellable, collecting reports.
pub async fn scan(
    source: &InMemoryChainSource,
    kv: &InMemoryKVStore,
    stop_height: Option<BlockHeight>,
) -> (Result<ScanSummary, ScanError>, Vec<CollisionReport>) {
    let sink = CollectingReportSink::new();
    let result = match CollisionStore::open(kv.clone()) {
        Ok(store) => {
            let scan_loop = ScanLoop::new(
                source.clone(),
                SignatureExtractor::default(),
                test_config(stop_height),
            );
            let (_keep, shutdown) = watch::channel(false);
            scan_loop.run(store, sink.clone(), shutdown).await
        }
        Err(e) => Err(e.into()),
    };
    (result, sink.reports())
}
