//! # Chain Scenarios
//!
//! Named scenarios run through the whole pipeline: in-memory chain, real
//! extractor, scan loop, commit consumer and collision store.
//!
//! ## Covered
//!
//! 1. A legacy signature and a later witness signature sharing R
//! 2. Empty blocks still advance the cursor
//! 3. A restart after the cursor reached 75 resumes at 76
//! 4. One report per new duplicate, never for replays
//! 5. Two transactions of one block reusing R on the same input index

#[cfg(test)]
mod tests {
    use crate::fixtures::{scan, scenario_chain, short_s, SCENARIO_R, TX_A, TX_B};
    use ns_01_signature_extraction::test_utils::{
        legacy_tx, p2pkh_script_sig, p2wpkh_witness, witness_tx,
    };
    use ns_02_collision_store::{
        CollisionStore, CollisionStoreApi, CursorOrigin, InMemoryKVStore, KeyValueStore, PutOutcome,
        RECORD_PREFIX,
    };
    use ns_03_scan_loop::test_utils::InMemoryChainSource;
    use ns_03_scan_loop::ScanError;
    use shared_types::{ChainBlock, SignatureRecord, U256};

    fn scenario_r() -> U256 {
        U256::from_big_endian(&SCENARIO_R)
    }

    // =========================================================================
    // LEGACY + WITNESS COLLISION
    // =========================================================================

    #[tokio::test]
    async fn test_reuse_across_legacy_and_witness_inputs() {
        let source = scenario_chain();
        let kv = InMemoryKVStore::new();

        let (result, reports) = scan(&source, &kv, None).await;
        let summary = result.unwrap();
        assert_eq!(summary.target_height, 300);
        assert_eq!(summary.extraction.signatures, 2);

        let store = CollisionStore::open(kv).unwrap();
        assert_eq!(store.count_by_r(&scenario_r()), 2);

        assert_eq!(reports.len(), 1);
        let report = &reports[0];
        assert_eq!(report.r, hex::encode(SCENARIO_R));
        assert_eq!(report.count, 2);
        assert_eq!(report.s, hex::encode([0xBB; 32]));

        assert_eq!(report.current.height, 250);
        assert_eq!(report.current.tx_hash, hex::encode(TX_B));
        assert_eq!(report.current.input_index, 0);

        let prior = report.prior.as_ref().unwrap();
        assert_eq!(prior.height, 100);
        assert_eq!(prior.tx_hash, hex::encode(TX_A));
        assert_eq!(prior.input_index, 0);
        assert_eq!(prior.s, hex::encode(short_s(0x3B)));
    }

    #[tokio::test]
    async fn test_no_report_before_second_occurrence() {
        let source = scenario_chain();
        let kv = InMemoryKVStore::new();

        let (result, reports) = scan(&source, &kv, Some(249)).await;
        result.unwrap();
        assert!(reports.is_empty());

        let store = CollisionStore::open(kv).unwrap();
        assert_eq!(store.count_by_r(&scenario_r()), 1);
        assert_eq!(store.cursor().load(), 249);
    }

    // =========================================================================
    // CURSOR
    // =========================================================================

    #[tokio::test]
    async fn test_empty_block_advances_cursor() {
        let source = InMemoryChainSource::with_empty_chain(50);
        let kv = InMemoryKVStore::new();

        let (result, reports) = scan(&source, &kv, None).await;
        let summary = result.unwrap();
        assert_eq!(summary.extraction.transactions, 0);
        assert!(reports.is_empty());

        let store = CollisionStore::open(kv).unwrap();
        assert_eq!(store.cursor().load(), 50);
        assert_eq!(store.cursor().origin(), CursorOrigin::Persisted);
        assert_eq!(store.summary().records, 0);
    }

    #[tokio::test]
    async fn test_restart_after_cursor_75_resumes_at_76() {
        let source = InMemoryChainSource::with_empty_chain(100);
        let kv = InMemoryKVStore::new();

        let (result, _) = scan(&source, &kv, Some(75)).await;
        result.unwrap();

        // A fresh process sees only what the store holds.
        let restarted = InMemoryChainSource::with_empty_chain(100);
        let (result, _) = scan(&restarted, &kv, None).await;
        let summary = result.unwrap();

        assert_eq!(summary.start_height, 76);
        assert_eq!(restarted.fetches().first(), Some(&76));
        assert_eq!(summary.heights_committed(), 25);
    }

    #[tokio::test]
    async fn test_fetch_failure_at_76_keeps_cursor_at_75() {
        let source = InMemoryChainSource::with_empty_chain(100);
        source.fail_at(76);
        let kv = InMemoryKVStore::new();

        let (result, _) = scan(&source, &kv, None).await;
        assert!(matches!(result, Err(ScanError::ChainSource(_))));

        let store = CollisionStore::open(kv.clone()).unwrap();
        assert_eq!(store.cursor().load(), 75);
        assert_eq!(store.cursor().resume_height(), 76);
        drop(store);

        source.clear_failures();
        let (result, _) = scan(&source, &kv, None).await;
        assert_eq!(result.unwrap().start_height, 76);
    }

    // =========================================================================
    // REPORTING
    // =========================================================================

    #[tokio::test]
    async fn test_one_report_per_new_duplicate() {
        let r = [0x42; 32];
        let source = InMemoryChainSource::with_empty_chain(10);
        for (height, s) in [(2u64, 0x11u8), (4, 0x12), (6, 0x13), (8, 0x14)] {
            source.insert(ChainBlock {
                height,
                hash: [0; 32],
                transactions: vec![legacy_tx([height as u8; 32], vec![p2pkh_script_sig(&r, &[s; 32])])],
            });
        }
        let kv = InMemoryKVStore::new();

        let (result, reports) = scan(&source, &kv, None).await;
        result.unwrap();
        let counts: Vec<u64> = reports.iter().map(|r| r.count).collect();
        assert_eq!(counts, vec![2, 3, 4]);
        // The prior occurrence is always the first one seen.
        assert!(reports
            .iter()
            .all(|r| r.prior.as_ref().map(|p| p.height) == Some(2)));
    }

    #[tokio::test]
    async fn test_reuse_between_two_transactions_of_one_block() {
        let r = [0x5A; 32];
        let source = InMemoryChainSource::with_empty_chain(8);
        source.insert(ChainBlock {
            height: 5,
            hash: [0x05; 32],
            transactions: vec![
                legacy_tx([0x01; 32], vec![p2pkh_script_sig(&r, &[0x11; 32])]),
                legacy_tx([0x02; 32], vec![p2pkh_script_sig(&r, &[0x22; 32])]),
            ],
        });
        let kv = InMemoryKVStore::new();

        let (result, reports) = scan(&source, &kv, None).await;
        assert_eq!(result.unwrap().extraction.signatures, 2);

        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].count, 2);
        assert_eq!(reports[0].current.tx_hash, hex::encode([0x02; 32]));
        assert_eq!(reports[0].s, hex::encode([0x22; 32]));
        let prior = reports[0].prior.as_ref().unwrap();
        assert_eq!(prior.tx_hash, hex::encode([0x01; 32]));
        assert_eq!((prior.height, prior.input_index), (5, 0));

        let store = CollisionStore::open(kv.clone()).unwrap();
        assert_eq!(store.count_by_r(&U256::from_big_endian(&r)), 2);
        drop(store);

        // Without a cursor the height is scanned again: nothing new, no report.
        let mut rescan = InMemoryKVStore::new();
        for (key, value) in kv.snapshot() {
            if key.starts_with(RECORD_PREFIX) {
                rescan.put(&key, &value).unwrap();
            }
        }
        let (result, reports) = scan(&source, &rescan, Some(5)).await;
        assert_eq!(result.unwrap().commits.already_present, 2);
        assert!(reports.is_empty());
    }

    #[tokio::test]
    async fn test_replayed_history_is_not_reported_again() {
        let source = scenario_chain();
        let kv = InMemoryKVStore::new();

        let (result, reports) = scan(&source, &kv, None).await;
        result.unwrap();
        assert_eq!(reports.len(), 1);

        // Extend the chain with a third use of the same R.
        source.insert(ChainBlock {
            height: 301,
            hash: [0; 32],
            transactions: vec![witness_tx(
                [0x0C; 32],
                vec![p2wpkh_witness(&SCENARIO_R, &[0x5C; 32])],
            )],
        });
        let (result, reports) = scan(&source, &kv, None).await;
        assert_eq!(result.unwrap().start_height, 301);
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].count, 3);
        assert_eq!(reports[0].prior.as_ref().unwrap().height, 100);
    }

    // =========================================================================
    // STORE
    // =========================================================================

    #[test]
    fn test_put_is_idempotent() {
        let record = SignatureRecord {
            tx_hash: TX_A,
            input_index: 0,
            sig_index: 0,
            height: 100,
            r: scenario_r(),
            s: U256::from(0xBBu64),
        };
        let kv = InMemoryKVStore::new();
        let mut store = CollisionStore::open(kv.clone()).unwrap();

        assert!(matches!(
            store.put(&record).unwrap(),
            PutOutcome::Inserted { count: 1, .. }
        ));
        let before = kv.snapshot();
        let count = store.count_by_r(&record.r);

        assert_eq!(store.put(&record).unwrap(), PutOutcome::AlreadyPresent);
        assert_eq!(kv.snapshot(), before);
        assert_eq!(store.count_by_r(&record.r), count);
    }
}
