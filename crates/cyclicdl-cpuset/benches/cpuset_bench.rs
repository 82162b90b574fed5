//! Benchmarks for cpu-list parsing and set algebra.

use criterion::{Criterion, criterion_group, criterion_main};
use cyclicdl_cpuset::{CpuInterval, CpuIntervalSet, parse};
use std::hint::black_box;

fn bench_parse(c: &mut Criterion) {
    c.bench_function("parse_cpu_list", |b| {
        b.iter(|| black_box(parse(black_box("0,2-4,5,8-15,17,19-31"), 64)));
    });
}

fn bench_complement(c: &mut Criterion) {
    let set: CpuIntervalSet = (0..512u32)
        .step_by(3)
        .map(CpuInterval::single)
        .collect();

    c.bench_function("complement_512", |b| {
        b.iter(|| black_box(set.complement(black_box(1024))));
    });
}

fn bench_insert_scattered(c: &mut Criterion) {
    c.bench_function("insert_scattered", |b| {
        b.iter(|| {
            let mut set = CpuIntervalSet::new();
            for cpu in (0..256u32).rev().step_by(2) {
                set.insert(CpuInterval::single(black_box(cpu)));
            }
            black_box(set)
        });
    });
}

criterion_group!(benches, bench_parse, bench_complement, bench_insert_scattered);
criterion_main!(benches);
