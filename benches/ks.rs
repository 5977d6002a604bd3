//! KS test benchmark: exact path at the default window size, asymptotic path
//! against a full training-set baseline.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use fraud_drift::drift::ks_2samp;

fn spread(n: usize, lo: f64, hi: f64) -> Vec<f64> {
    (0..n)
        .map(|i| lo + (hi - lo) * ((i * 7919) % n) as f64 / n as f64)
        .collect()
}

fn bench_exact(c: &mut Criterion) {
    let baseline = spread(1000, 0.0, 500.0);
    let window = spread(1000, 10.0, 510.0);
    c.bench_function("ks_exact_1000x1000", |b| {
        b.iter(|| black_box(ks_2samp(black_box(&baseline), black_box(&window))))
    });
}

fn bench_asymptotic(c: &mut Criterion) {
    let baseline = spread(200_000, 0.0, 500.0);
    let window = spread(1000, 10.0, 510.0);
    c.bench_function("ks_asymptotic_200000x1000", |b| {
        b.iter(|| black_box(ks_2samp(black_box(&baseline), black_box(&window))))
    });
}

criterion_group!(benches, bench_exact, bench_asymptotic);
criterion_main!(benches);
