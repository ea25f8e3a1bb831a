//! Economy batch benchmarks for strategy_core.
//!
//! Run with: `cargo bench -p strategy_core`

// Benchmark binaries don't need docs on macro-generated functions
#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use strategy_core::prelude::*;

const FOOD: WorldResource = WorldResource(1);

fn settlement(count: u32) -> Vec<City> {
    let settlement = strategy_core::data::SettlementData::city();
    (0..count)
        .map(|i| {
            City::found(
                u64::from(i) + 1,
                format!("city-{i}"),
                Vec2::new(i as f32, 0.0),
                &settlement,
            )
        })
        .collect()
}

/// One full batch over a growing number of cities.
pub fn batch_benchmark(c: &mut Criterion) {
    let config = EconomyConfig::default();
    let mut group = c.benchmark_group("economy_batch");

    for count in [100u32, 1_000, 10_000] {
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, &count| {
            let mut cities = settlement(count);
            let mut resources = ResourceContainer::new(1.0e9);
            let mut processor = IntervalProcessor::new(1.0).unwrap();

            b.iter(|| {
                resources.add(FOOD, 1.0e6);
                black_box(processor.process(1.0, cities.iter_mut(), &mut resources, &config))
            });
        });
    }

    group.finish();
}

/// Frames between batches only accumulate time.
pub fn idle_frame_benchmark(c: &mut Criterion) {
    let config = EconomyConfig::default();
    let mut cities = settlement(10_000);
    let mut resources = ResourceContainer::new(1.0e9);
    let mut processor = IntervalProcessor::new(f32::MAX).unwrap();

    c.bench_function("economy_idle_frame", |b| {
        b.iter(|| {
            black_box(processor.process(
                black_box(1.0 / 60.0),
                cities.iter_mut(),
                &mut resources,
                &config,
            ))
        });
    });
}

criterion_group!(benches, batch_benchmark, idle_frame_benchmark);
criterion_main!(benches);
