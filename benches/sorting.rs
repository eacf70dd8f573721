//! Suffix sorting benchmarks over generated inputs.
//!
//! Run with: `cargo bench`
//! Save baseline: `cargo bench -- --save-baseline main`
//! Compare: `cargo bench -- --baseline main`

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use supar::engine::SortEngine;

/// Deterministic pseudo-random bytes in 1..=255 plus the sentinel.
fn xorshift_bytes(len: usize, mut state: u64) -> Vec<u8> {
    let mut text = Vec::with_capacity(len + 1);
    for _ in 0..len {
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        text.push((state % 255 + 1) as u8);
    }
    text.push(0);
    text
}

fn build(text: &[u8], jobs: u32) {
    let mut engine =
        SortEngine::with_diag(text, jobs, Box::new(std::io::sink())).unwrap();
    engine.build_sa().unwrap();
}

fn bench_random(c: &mut Criterion) {
    let text = xorshift_bytes(1 << 20, 0xBEEF);
    let mut group = c.benchmark_group("sort_random_1m");
    group.sample_size(10);
    for jobs in [1u32, 4] {
        group.bench_with_input(BenchmarkId::from_parameter(jobs), &jobs, |b, &jobs| {
            b.iter(|| build(&text, jobs));
        });
    }
    group.finish();
}

fn bench_repetitive(c: &mut Criterion) {
    // two-symbol alphabet: deep doubling, large surviving groups
    let mut text: Vec<u8> = xorshift_bytes(1 << 20, 0xF00D)
        .iter()
        .map(|&b| b % 2 + b'a')
        .collect();
    *text.last_mut().unwrap() = 0;

    let mut group = c.benchmark_group("sort_binary_alphabet_1m");
    group.sample_size(10);
    for jobs in [1u32, 4] {
        group.bench_with_input(BenchmarkId::from_parameter(jobs), &jobs, |b, &jobs| {
            b.iter(|| build(&text, jobs));
        });
    }
    group.finish();
}

fn bench_lcp(c: &mut Criterion) {
    let text = xorshift_bytes(1 << 20, 0xBEEF);
    let mut engine =
        SortEngine::with_diag(&text, 1, Box::new(std::io::sink())).unwrap();
    engine.build_sa().unwrap();
    let sa: Vec<u32> = engine.sa().unwrap().to_vec();
    drop(engine);

    let mut group = c.benchmark_group("lcp_random_1m");
    group.sample_size(10);
    group.bench_function("build", |b| {
        b.iter(|| {
            let mut engine =
                SortEngine::with_diag(&text, 1, Box::new(std::io::sink())).unwrap();
            engine.build_sa().unwrap();
            engine.build_lcp().unwrap();
            assert_eq!(engine.sa().unwrap(), sa.as_slice());
        });
    });
    group.finish();
}

criterion_group!(benches, bench_random, bench_repetitive, bench_lcp);
criterion_main!(benches);
