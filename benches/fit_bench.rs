//! Benchmarks for sine fitting.
//!
//! Run with: `cargo bench --bench fit_bench`
//!
//! Compares the iterative and linear solvers on a single profile, then times
//! batch fitting over synthetic tables of increasing size.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use warp_rs::{
    LevenbergMarquardt, LinearLeastSquares, ProfileRecord, ProfileTable, SineFitter, SineModel,
    fit_profiles,
};

/// One noisy-looking profile on 10° bins.
fn generate_profile(n_bins: usize) -> (Vec<f64>, Vec<f64>, Vec<u32>) {
    let step = 360.0 / n_bins as f64;
    let phi: Vec<f64> = (0..n_bins).map(|i| i as f64 * step).collect();
    let values = phi
        .iter()
        .enumerate()
        .map(|(i, &p)| SineModel::evaluate(p, 0.3, 140.0, 0.02) + 1e-3 * ((i * 7) % 5) as f64)
        .collect();
    let counts = (0..n_bins).map(|i| 40 + (i as u32 * 13) % 60).collect();
    (phi, values, counts)
}

/// Profile table with `n_radii` radii and `n_times` snapshots.
fn generate_table(n_radii: usize, n_times: usize) -> ProfileTable {
    let mut records = Vec::with_capacity(n_radii * n_times * 36);
    for r in 0..n_radii {
        let radius = 5.5 + r as f64;
        for t in 0..n_times {
            let time = t as f64 * 0.1;
            let phase = 35.0 * radius + 90.0 * time;
            for bin in 0..36 {
                let phi = bin as f64 * 10.0;
                records.push(ProfileRecord {
                    radius,
                    time,
                    phi,
                    count: 50 + bin,
                    height: SineModel::evaluate(phi, 0.05 * radius, phase, 0.0),
                    velocity: SineModel::evaluate(phi, 40.0, phase - 90.0, 0.0),
                });
            }
        }
    }
    ProfileTable::new(records)
}

/// Benchmark single-profile solvers.
fn bench_solvers(c: &mut Criterion) {
    let mut group = c.benchmark_group("single_profile");
    let (phi, values, counts) = generate_profile(36);

    let lm = LevenbergMarquardt::default();
    group.bench_function("levenberg_marquardt", |b| {
        b.iter(|| lm.fit(black_box(&phi), black_box(&values), black_box(&counts)))
    });

    group.bench_function("linear", |b| {
        b.iter(|| LinearLeastSquares.fit(black_box(&phi), black_box(&values), black_box(&counts)))
    });

    group.finish();
}

/// Benchmark batch fitting as the table grows.
fn bench_batch(c: &mut Criterion) {
    let mut group = c.benchmark_group("batch_fit");
    group.sample_size(20);

    for &n_times in &[10, 50, 100] {
        let table = generate_table(4, n_times);
        let fitter = LevenbergMarquardt::default();

        group.bench_with_input(BenchmarkId::new("sequential", n_times), &table, |b, table| {
            b.iter(|| fit_profiles(black_box(table), &fitter))
        });

        #[cfg(feature = "parallel")]
        group.bench_with_input(BenchmarkId::new("parallel", n_times), &table, |b, table| {
            b.iter(|| warp_rs::fit_profiles_parallel(black_box(table), &fitter))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_solvers, bench_batch);
criterion_main!(benches);
