//! # Resumability
//!
//! A scan interrupted any number of times must end with the same store
//! contents, cursor and collision reports as one uninterrupted run.
//! Interruptions covered: a clean stop below the tip, a failed fetch, a crash
//! in the middle of a height, and operator cancellation. Restarts are also
//! run against the on-disk RocksDB store, closed and reopened between runs.

#[cfg(test)]
mod tests {
    use crate::fixtures::{r_pool, random_chain, scan, test_config};
    use ns_01_signature_extraction::{SignatureExtractionApi, SignatureExtractor};
    use ns_02_collision_store::{
        CollisionStore, CollisionStoreApi, CursorOrigin, InMemoryKVStore, KVPair, KeyValueStore,
    };
    use ns_03_scan_loop::test_utils::{CollectingReportSink, InMemoryChainSource};
    use ns_03_scan_loop::{CollisionReport, ScanLoop};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use scanner_runtime::{RocksDbConfig, RocksDbStore};
    use tokio::sync::watch;

    const TIP: u64 = 120;

    fn chain(seed: u64) -> InMemoryChainSource {
        let mut rng = StdRng::seed_from_u64(seed);
        let pool = r_pool(&mut rng, 12);
        random_chain(&mut rng, TIP, 4, &pool)
    }

    async fn uninterrupted(source: &InMemoryChainSource) -> (InMemoryKVStore, Vec<CollisionReport>) {
        let kv = InMemoryKVStore::new();
        let (result, reports) = scan(source, &kv, None).await;
        result.unwrap();
        (kv, reports)
    }

    #[tokio::test]
    async fn test_stops_below_tip_match_one_run() {
        for seed in [1u64, 7, 42] {
            let source = chain(seed);
            let (expected_kv, expected_reports) = uninterrupted(&source).await;
            assert!(!expected_reports.is_empty(), "seed {} has no collisions", seed);

            let kv = InMemoryKVStore::new();
            let mut reports = Vec::new();
            for stop in [Some(0), Some(17), Some(60), Some(61), Some(99), None] {
                let (result, mut partial) = scan(&source, &kv, stop).await;
                result.unwrap();
                reports.append(&mut partial);
            }

            assert_eq!(kv.snapshot(), expected_kv.snapshot(), "seed {}", seed);
            assert_eq!(reports, expected_reports, "seed {}", seed);
        }
    }

    fn contents<KV: KeyValueStore>(kv: &KV) -> Vec<KVPair> {
        kv.prefix_iter(b"").collect::<Result<_, _>>().unwrap()
    }

    #[tokio::test]
    async fn test_rocksdb_restarts_match_one_run() {
        let source = chain(13);
        let (expected_kv, expected_reports) = uninterrupted(&source).await;

        let dir = tempfile::TempDir::new().unwrap();
        let open = || RocksDbStore::open(RocksDbConfig::for_testing(dir.path())).unwrap();

        let mut reports = Vec::new();
        for stop in [Some(30), Some(31), Some(90), None] {
            // Each run opens the database afresh; the consumer drops it at the end.
            let sink = CollectingReportSink::new();
            let scan_loop =
                ScanLoop::new(source.clone(), SignatureExtractor::default(), test_config(stop));
            let (_keep, shutdown) = watch::channel(false);
            scan_loop
                .run(CollisionStore::open(open()).unwrap(), sink.clone(), shutdown)
                .await
                .unwrap();
            reports.extend(sink.reports());
        }

        let on_disk = open();
        assert_eq!(contents(&on_disk), contents(&expected_kv));
        assert_eq!(reports, expected_reports);

        let store = CollisionStore::open(on_disk).unwrap();
        assert_eq!(store.cursor().load(), TIP);
        assert_eq!(store.cursor().origin(), CursorOrigin::Persisted);
    }

    #[tokio::test]
    async fn test_failed_fetches_match_one_run() {
        let source = chain(3);
        let (expected_kv, expected_reports) = uninterrupted(&source).await;

        let kv = InMemoryKVStore::new();
        let mut reports = Vec::new();
        for failing in [30u64, 31, 95] {
            source.fail_at(failing);
            let (result, mut partial) = scan(&source, &kv, None).await;
            assert!(result.is_err());
            reports.append(&mut partial);
            source.clear_failures();
        }
        let (result, mut partial) = scan(&source, &kv, None).await;
        result.unwrap();
        reports.append(&mut partial);

        assert_eq!(kv.snapshot(), expected_kv.snapshot());
        assert_eq!(reports, expected_reports);
    }

    #[tokio::test]
    async fn test_crash_inside_a_height_replays_it() {
        let source = chain(11);
        let (expected_kv, _) = uninterrupted(&source).await;

        // Find a height with at least two signatures after some prefix.
        let extractor = SignatureExtractor::default();
        let mut crash_height = None;
        for height in 40..=TIP {
            let block = ns_03_scan_loop::ChainSource::block_by_height(&source, height)
                .await
                .unwrap();
            let records = extractor.extract_block(&block).records;
            if records.len() >= 2 {
                crash_height = Some((height, records));
                break;
            }
        }
        let (height, records) = crash_height.expect("seeded chain has a busy block");

        let kv = InMemoryKVStore::new();
        let (result, _) = scan(&source, &kv, Some(height - 1)).await;
        result.unwrap();

        // The process died after writing the first record of `height`.
        {
            let mut store = CollisionStore::open(kv.clone()).unwrap();
            store.put(&records[0]).unwrap();
        }

        let store = CollisionStore::open(kv.clone()).unwrap();
        assert_eq!(store.cursor().origin(), CursorOrigin::Replayed);
        assert_eq!(store.cursor().resume_height(), height);
        drop(store);

        let (result, _) = scan(&source, &kv, None).await;
        let summary = result.unwrap();
        assert_eq!(summary.start_height, height);
        assert!(summary.commits.already_present >= 1);
        assert_eq!(kv.snapshot(), expected_kv.snapshot());
    }

    #[tokio::test]
    async fn test_cancelled_run_resumes() {
        let source = chain(5);
        let (expected_kv, _) = uninterrupted(&source).await;

        let kv = InMemoryKVStore::new();
        let (stop, shutdown) = watch::channel(true);
        let scan_loop = ScanLoop::new(source.clone(), SignatureExtractor::default(), test_config(None));
        let summary = scan_loop
            .run(
                CollisionStore::open(kv.clone()).unwrap(),
                CollectingReportSink::new(),
                shutdown,
            )
            .await
            .unwrap();
        drop(stop);
        assert!(summary.cancelled);
        assert_eq!(summary.heights_committed(), 0);

        let (result, _) = scan(&source, &kv, None).await;
        let summary = result.unwrap();
        assert!(!summary.cancelled);
        assert_eq!(summary.start_height, 0);
        assert_eq!(kv.snapshot(), expected_kv.snapshot());
    }

    #[tokio::test]
    async fn test_count_by_r_uses_full_history() {
        let source = chain(9);
        let kv = InMemoryKVStore::new();
        let (result, _) = scan(&source, &kv, Some(60)).await;
        result.unwrap();
        let (result, _) = scan(&source, &kv, None).await;
        result.unwrap();

        let (expected_kv, _) = uninterrupted(&source).await;
        let resumed = CollisionStore::open(kv).unwrap();
        let fresh = CollisionStore::open(expected_kv).unwrap();
        assert_eq!(resumed.summary(), fresh.summary());

        for group in fresh.collisions().unwrap() {
            assert_eq!(resumed.count_by_r(&group.r), group.occurrences.len() as u64);
        }
    }
}
