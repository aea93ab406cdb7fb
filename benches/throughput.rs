//! Throughput benchmarks for parameter grid searches.
//!
//! Run with: `cargo bench --bench throughput`

use chrono::{Duration, TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::{Rng, SeedableRng};
use rand::rngs::StdRng;
use std::sync::Arc;

use backtester::{
    IterativeBacktester, IterativeConfig, ParameterOptimizer, SimpleMovingAverage,
    VectorizedBacktester,
};
use crossover_core::types::{GridRange, PriceObservation, PriceSeries, StrategyParameters};

/// Generate a geometric random walk with a small spread.
fn generate_series(bars: usize) -> Arc<PriceSeries> {
    let mut rng = StdRng::seed_from_u64(7);
    let start = Utc.with_ymd_and_hms(2015, 1, 1, 0, 0, 0).unwrap();
    let mut price = 100.0;

    let observations = (0..bars)
        .map(|i| {
            price *= (rng.gen_range(-0.02..0.02f64)).exp();
            PriceObservation::new(start + Duration::days(i as i64), price)
                .with_spread(rng.gen_range(0.01..0.05))
        })
        .collect();

    Arc::new(PriceSeries::new("SYNTH", observations).unwrap())
}

fn optimizer(long_stop: i64) -> ParameterOptimizer {
    ParameterOptimizer::new(GridRange::new(10, 50, 10), GridRange::new(100, long_stop, 20))
        .unwrap()
}

/// Benchmark sequential grid search on the vectorized engine.
fn bench_vectorized_grid(c: &mut Criterion) {
    let mut group = c.benchmark_group("vectorized_grid");
    group.sample_size(20);
    let series = generate_series(5_000);

    for long_stop in [180, 260, 420].iter() {
        let optimizer = optimizer(*long_stop);
        let points = optimizer.grid().unwrap().len();
        let mut bt = VectorizedBacktester::new(
            Arc::clone(&series),
            Arc::new(SimpleMovingAverage),
            StrategyParameters::new(50, 200),
        )
        .unwrap();

        group.throughput(Throughput::Elements(points as u64));
        group.bench_with_input(BenchmarkId::new("sequential", points), &points, |b, _| {
            b.iter(|| black_box(optimizer.optimize(&mut bt).unwrap()))
        });
        group.bench_with_input(BenchmarkId::new("parallel", points), &points, |b, _| {
            b.iter(|| black_box(optimizer.optimize_parallel(&mut bt).unwrap()))
        });
    }

    group.finish();
}

/// Benchmark parallel grid search on the iterative engine across pool sizes.
fn bench_iterative_grid_threads(c: &mut Criterion) {
    let mut group = c.benchmark_group("iterative_grid_threads");
    group.sample_size(10);
    let series = generate_series(5_000);
    let optimizer = optimizer(260);
    let points = optimizer.grid().unwrap().len();

    for threads in [1, 2, 4, 8].iter() {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(*threads)
            .build()
            .unwrap();
        let mut bt = IterativeBacktester::new(
            Arc::clone(&series),
            Arc::new(SimpleMovingAverage),
            StrategyParameters::new(50, 200),
            IterativeConfig::default(),
        )
        .unwrap();

        group.throughput(Throughput::Elements(points as u64));
        group.bench_with_input(BenchmarkId::new("threads", threads), threads, |b, _| {
            b.iter(|| pool.install(|| black_box(optimizer.optimize_parallel(&mut bt).unwrap())))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_vectorized_grid, bench_iterative_grid_threads);

criterion_main!(benches);
