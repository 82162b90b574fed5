//! Tracing metrics for observability

/// Counters describing a sink's health. All counters are monotonically
/// increasing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TracingMetrics {
    /// Events written
    pub events_emitted: u64,
    /// Events dropped because the write failed
    pub events_dropped: u64,
}

impl TracingMetrics {
    /// Fraction of events that were dropped, 0.0 if none were offered.
    #[must_use]
    pub fn drop_rate(&self) -> f64 {
        let offered = self.events_emitted.saturating_add(self.events_dropped);
        if offered == 0 {
            return 0.0;
        }
        self.events_dropped as f64 / offered as f64
    }
}
