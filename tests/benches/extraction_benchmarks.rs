//! # Nonce-Scan Benchmarks
//!
//! | Stage | Measured |
//! |-------|----------|
//! | ns-01 Extraction | block extraction, sequential vs parallel threshold |
//! | ns-02 Collision Store | `put` with collision check on the in-memory backend |

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use ns_01_signature_extraction::{ExtractorConfig, SignatureExtractionApi, SignatureExtractor};
use ns_02_collision_store::{CollisionStore, CollisionStoreApi, InMemoryKVStore};
use ns_tests::fixtures::{r_pool, random_block};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::time::Duration;

fn bench_block_extraction(c: &mut Criterion) {
    let mut group = c.benchmark_group("ns-01-extraction");
    group.measurement_time(Duration::from_secs(10));

    let mut rng = StdRng::seed_from_u64(0xB10C);
    let pool = r_pool(&mut rng, 1024);

    for tx_count in [100usize, 1_000, 4_000] {
        let block = random_block(&mut rng, 800_000, tx_count, &pool);
        group.throughput(Throughput::Elements(block.input_count() as u64));

        let parallel = SignatureExtractor::default();
        group.bench_with_input(BenchmarkId::new("parallel", tx_count), &block, |b, block| {
            b.iter(|| black_box(parallel.extract_block(block)))
        });

        let sequential = SignatureExtractor::new(ExtractorConfig {
            parallel_threshold: usize::MAX,
            ..ExtractorConfig::default()
        });
        group.bench_with_input(BenchmarkId::new("sequential", tx_count), &block, |b, block| {
            b.iter(|| black_box(sequential.extract_block(block)))
        });
    }

    group.finish();
}

fn bench_collision_store_put(c: &mut Criterion) {
    let mut group = c.benchmark_group("ns-02-collision-store");

    let mut rng = StdRng::seed_from_u64(0x5EED);
    let pool = r_pool(&mut rng, 256);
    let records: Vec<_> = (0..50u64)
        .flat_map(|height| {
            let block = random_block(&mut rng, height, 40, &pool);
            SignatureExtractor::default().extract_block(&block).records
        })
        .collect();
    group.throughput(Throughput::Elements(records.len() as u64));

    group.bench_function("put_all", |b| {
        b.iter_batched(
            || CollisionStore::open(InMemoryKVStore::new()).unwrap(),
            |mut store| {
                for record in &records {
                    black_box(store.put(record).unwrap());
                }
                store
            },
            criterion::BatchSize::LargeInput,
        )
    });

    group.finish();
}

criterion_group!(benches, bench_block_extraction, bench_collision_store_put);
criterion_main!(benches);
