//! Benchmarks for candidate fitting and feature selection
//!
//! Run with: cargo bench --bench training_benchmark

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use ndarray::{Array1, Array2};
use rand::prelude::*;
use rand::SeedableRng;

use churnsight::models::{CandidateKind, Classifier};
use churnsight::pipeline::f_classif;

/// Encoded-looking matrix: a few informative scaled columns plus one-hot noise
fn generate_encoded(n_rows: usize, n_features: usize, seed: u64) -> (Array2<f64>, Array1<f64>) {
    let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
    let mut x = Array2::<f64>::zeros((n_rows, n_features));
    let mut y = Array1::<f64>::zeros(n_rows);

    for i in 0..n_rows {
        let label = rng.gen_bool(0.27);
        y[i] = if label { 1.0 } else { 0.0 };
        for j in 0..n_features {
            x[[i, j]] = if j < 4 {
                let shift = if label { 0.8 } else { 0.0 };
                rng.gen::<f64>() * 2.0 - 1.0 + shift
            } else if rng.gen_bool(0.5) {
                1.0
            } else {
                0.0
            };
        }
    }

    (x, y)
}

/// Fit each candidate at increasing row counts
fn benchmark_candidate_fit(c: &mut Criterion) {
    let mut group = c.benchmark_group("candidate_fit");
    group.sample_size(10);

    for n_rows in [500, 2_000, 7_000] {
        let (x, y) = generate_encoded(n_rows, 20, 42);
        group.throughput(Throughput::Elements(n_rows as u64));

        for kind in CandidateKind::ALL {
            group.bench_with_input(BenchmarkId::new(kind.name(), n_rows), &(&x, &y), |b, (x, y)| {
                b.iter(|| {
                    let mut model = kind.build(42);
                    let _ = model.fit(black_box(*x), black_box(*y));
                });
            });
        }
    }

    group.finish();
}

/// ANOVA F scoring over the full encoded width
fn benchmark_f_classif(c: &mut Criterion) {
    let mut group = c.benchmark_group("f_classif");
    group.sample_size(30);

    for n_features in [20, 45, 100] {
        let (x, y) = generate_encoded(7_000, n_features, 7);
        let labels: Vec<i32> = y.iter().map(|&v| v as i32).collect();
        group.throughput(Throughput::Elements(n_features as u64));

        group.bench_with_input(
            BenchmarkId::from_parameter(n_features),
            &(&x, &labels),
            |b, (x, labels)| {
                b.iter(|| f_classif(black_box(*x), black_box(labels.as_slice())));
            },
        );
    }

    group.finish();
}

criterion_group!(benches, benchmark_candidate_fit, benchmark_f_classif);
criterion_main!(benches);
