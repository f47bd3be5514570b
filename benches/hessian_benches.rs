use RustedHessian::config::HessianConfig;
use RustedHessian::hessian::orchestrator::{run_classification, run_classification_batch};
use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

const FUNCTIONS: [&str; 5] = [
    "x**2 + y**2",
    "x**3 - 3*x*y + y**2",
    "x^3 - 3*x + y^3 - 12*y",
    "x^4/4 - x^2 + y^2",
    "x**4 + y**4",
];

fn bench_mixed_cubic(c: &mut Criterion) {
    c.bench_function("mixed cubic", |b| {
        b.iter(|| run_classification(black_box("x**3 - 3*x*y + y**2"), ("x", "y")))
    });
}

fn bench_irrational_points(c: &mut Criterion) {
    c.bench_function("irrational critical points", |b| {
        b.iter(|| run_classification(black_box("x^4/4 - x^2 + y^2"), ("x", "y")))
    });
}

fn bench_batch(c: &mut Criterion) {
    let config = HessianConfig::default();
    let mut group = c.benchmark_group("classification");
    group.bench_function("sequential", |b| {
        b.iter(|| {
            FUNCTIONS
                .iter()
                .map(|f| run_classification(black_box(f), ("x", "y")))
                .collect::<Vec<_>>()
        })
    });
    group.bench_function("batch", |b| {
        b.iter(|| run_classification_batch(black_box(&FUNCTIONS), ("x", "y"), &config))
    });
    group.finish();
}

criterion_group!(benches, bench_mixed_cubic, bench_irrational_points, bench_batch);
criterion_main!(benches);
