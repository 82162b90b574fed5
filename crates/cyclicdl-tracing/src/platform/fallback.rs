//! Structured logging sink

use std::sync::atomic::{AtomicU64, Ordering};

use crate::{TraceEvent, TraceSink, TracingMetrics};

/// Sink that forwards events to the `tracing` subscriber at trace level.
#[derive(Debug, Default)]
pub struct FallbackSink {
    events: AtomicU64,
}

impl FallbackSink {
    /// Create a new sink.
    pub fn new() -> Self {
        Self::default()
    }
}

impl TraceSink for FallbackSink {
    fn emit(&self, event: TraceEvent) {
        tracing::trace!(%event, "worker annotation");
        self.events.fetch_add(1, Ordering::Relaxed);
    }

    fn metrics(&self) -> TracingMetrics {
        TracingMetrics {
            events_emitted: self.events.load(Ordering::Relaxed),
            events_dropped: 0,
        }
    }

    fn is_enabled(&self) -> bool {
        false
    }
}
