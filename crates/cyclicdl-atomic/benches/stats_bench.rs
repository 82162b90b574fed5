//! Benchmarks for the worker hot path.

use criterion::{Criterion, criterion_group, criterion_main};
use cyclicdl_atomic::{DEFAULT_HISTORY_CAPACITY, OutlierTracker, WorkerStats};
use std::hint::black_box;

fn bench_record(c: &mut Criterion) {
    let stats = WorkerStats::new();
    c.bench_function("record", |b| {
        b.iter(|| stats.record(black_box(42)));
    });
}

fn bench_record_with_history(c: &mut Criterion) {
    let stats = WorkerStats::with_history(DEFAULT_HISTORY_CAPACITY);
    c.bench_function("record_with_history", |b| {
        b.iter(|| stats.record(black_box(42)));
    });
}

fn bench_drain_full_buffer(c: &mut Criterion) {
    let stats = WorkerStats::with_history(DEFAULT_HISTORY_CAPACITY);
    c.bench_function("drain_16k", |b| {
        b.iter(|| {
            for i in 0..DEFAULT_HISTORY_CAPACITY as u64 {
                stats.record(i);
            }
            let mut tracker = OutlierTracker::new();
            if let Some(history) = stats.history() {
                black_box(history.drain(&mut tracker));
            }
        });
    });
}

criterion_group!(benches, bench_record, bench_record_with_history, bench_drain_full_buffer);
criterion_main!(benches);
