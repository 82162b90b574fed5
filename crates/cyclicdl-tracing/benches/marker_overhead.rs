//! Emission cost on the measuring thread.

use criterion::{Criterion, criterion_group, criterion_main};
use cyclicdl_tracing::platform::FallbackSink;
use cyclicdl_tracing::{TraceEvent, TraceSink};
use std::hint::black_box;

fn bench_fallback_emit(c: &mut Criterion) {
    let sink = FallbackSink::new();
    c.bench_function("fallback_emit", |b| {
        b.iter(|| {
            sink.emit(black_box(TraceEvent::CycleStart {
                now: 1_000_250,
                offset: 250,
                period: 1_000_000,
                next: 1_001_000,
            }));
        });
    });
}

#[cfg(target_os = "linux")]
fn bench_marker_emit(c: &mut Criterion) {
    use cyclicdl_tracing::platform::TraceMarkerSink;

    let sink = TraceMarkerSink::from_writer(std::io::sink());
    c.bench_function("marker_emit_to_sink", |b| {
        b.iter(|| sink.emit(black_box(TraceEvent::period_adjusted(999_900, 1_000_000, 1_000))));
    });
}

#[cfg(not(target_os = "linux"))]
fn bench_marker_emit(_c: &mut Criterion) {}

criterion_group!(benches, bench_fallback_emit, bench_marker_emit);
criterion_main!(benches);
