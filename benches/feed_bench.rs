//! Benchmarks for the Pulseboard live feed
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use pulseboard::feed::*;
use std::time::Duration;

const START_MS: i64 = 1_700_000_000_000;

fn bench_buffer(c: &mut Criterion) {
    let mut group = c.benchmark_group("rolling_buffer");

    for capacity in [10, 20, 1000] {
        group.throughput(Throughput::Elements(1));

        group.bench_function(format!("insert_full_{}", capacity), |b| {
            let mut buffer = RollingBuffer::new(capacity).unwrap();
            buffer.extend(0..capacity as u64);
            let mut next = capacity as u64;

            b.iter(|| {
                next += 1;
                buffer.insert(black_box(next))
            });
        });

        group.bench_function(format!("snapshot_{}", capacity), |b| {
            let mut buffer = RollingBuffer::new(capacity).unwrap();
            buffer.extend(0..capacity as u64);

            b.iter(|| black_box(&buffer).snapshot());
        });
    }

    group.finish();
}

fn bench_generator(c: &mut Criterion) {
    let mut group = c.benchmark_group("generator");

    group.bench_function("next_sample", |b| {
        let mut generator = FeedGenerator::new(GeneratorConfig::default(), Some(1)).unwrap();
        let mut now = START_MS;

        b.iter(|| {
            now += 5_000;
            generator.next_sample(black_box(now))
        });
    });

    group.bench_function("initial_series_20", |b| {
        let mut generator = FeedGenerator::new(GeneratorConfig::default(), Some(1)).unwrap();

        b.iter(|| generator.initial_series(black_box(START_MS), 20));
    });

    group.finish();
}

fn bench_dashboard(c: &mut Criterion) {
    let mut group = c.benchmark_group("dashboard");

    // One virtual hour per iteration: roughly 720 donations and 60 counter ticks
    group.bench_function("advance_one_hour", |b| {
        b.iter(|| {
            let generator = FeedGenerator::new(GeneratorConfig::default(), Some(7)).unwrap();
            let mut dashboard = Dashboard::new(DashboardConfig::default(), generator).unwrap();
            dashboard.mount(START_MS).unwrap();

            let clock = ManualClock::new(START_MS);
            let mut events = 0;
            for _ in 0..3_600 {
                events += dashboard.advance(clock.advance(Duration::from_secs(1))).len();
            }
            dashboard.unmount();
            events
        });
    });

    group.bench_function("snapshot", |b| {
        let generator = FeedGenerator::new(GeneratorConfig::default(), Some(7)).unwrap();
        let mut dashboard = Dashboard::new(DashboardConfig::default(), generator).unwrap();
        dashboard.mount(START_MS).unwrap();
        dashboard.advance(START_MS + 120_000);

        b.iter(|| black_box(&dashboard).snapshot());
    });

    group.finish();
}

criterion_group!(benches, bench_buffer, bench_generator, bench_dashboard);
criterion_main!(benches);
