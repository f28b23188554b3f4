use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use lockbox::services::CryptoEngine;
use std::time::Duration;

const MASTER_KEY: &str = "benchmark-master-pass";

fn bench_encrypt(c: &mut Criterion) {
    let engine = CryptoEngine::new();

    let mut group = c.benchmark_group("crypto_encrypt");
    group.measurement_time(Duration::from_secs(10));

    // Benchmark across typical secret sizes: short API keys up to PEM bundles
    for size in [32usize, 256, 1024, 16 * 1024].iter() {
        let plaintext = vec![0xABu8; *size];
        group.throughput(Throughput::Bytes(*size as u64));
        group.bench_with_input(BenchmarkId::new("encrypt", size), size, |b, &_size| {
            b.iter(|| {
                let blob = engine.encrypt(black_box(&plaintext), black_box(MASTER_KEY)).unwrap();
                black_box(blob)
            });
        });
    }

    group.finish();
}

fn bench_decrypt(c: &mut Criterion) {
    let engine = CryptoEngine::new();

    let mut group = c.benchmark_group("crypto_decrypt");
    group.measurement_time(Duration::from_secs(10));

    for size in [32usize, 256, 1024, 16 * 1024].iter() {
        let plaintext = vec![0xABu8; *size];
        let blob = engine.encrypt(&plaintext, MASTER_KEY).unwrap();

        group.throughput(Throughput::Bytes(*size as u64));
        group.bench_with_input(BenchmarkId::new("decrypt", size), size, |b, &_size| {
            b.iter(|| {
                let value = engine.decrypt(black_box(&blob), black_box(MASTER_KEY)).unwrap();
                black_box(value)
            });
        });
    }

    group.finish();
}

fn bench_key_derivation_overhead(c: &mut Criterion) {
    let engine = CryptoEngine::new();
    let blob = engine.encrypt(b"sk_live_abc123", MASTER_KEY).unwrap();

    // The key is re-derived on every call; this tracks the fixed per-call cost
    c.bench_function("decrypt_short_secret", |b| {
        b.iter(|| {
            let value = engine.decrypt(black_box(&blob), black_box(MASTER_KEY)).unwrap();
            black_box(value)
        });
    });
}

criterion_group!(benches, bench_encrypt, bench_decrypt, bench_key_derivation_overhead);
criterion_main!(benches);
