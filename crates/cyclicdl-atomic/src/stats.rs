//! Per-worker latency statistics.

use core::sync::atomic::{AtomicI32, AtomicU64, Ordering};

use crossbeam::utils::CachePadded;

use crate::history::HistoryBuffer;

/// Point-in-time copy of a worker's statistics. All latencies are in
/// microseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatsSnapshot {
    /// Number of completed cycles
    pub count: u64,
    /// Smallest latency, 0 before the first cycle
    pub min: u64,
    /// Largest latency
    pub max: u64,
    /// Latency of the most recent cycle
    pub current: u64,
    /// Sum of all latencies
    pub total: u64,
}

impl StatsSnapshot {
    /// Integer mean latency, 0 if no cycle completed.
    #[must_use]
    pub fn avg(&self) -> u64 {
        self.total.checked_div(self.count).unwrap_or(0)
    }

    /// Fractional mean latency, 0.0 if no cycle completed.
    #[must_use]
    #[expect(clippy::cast_precision_loss, reason = "report precision is two decimals")]
    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        self.total as f64 / self.count as f64
    }
}

#[derive(Debug)]
struct Counters {
    cycles: AtomicU64,
    min: AtomicU64,
    max: AtomicU64,
    current: AtomicU64,
    total: AtomicU64,
}

/// Latency statistics of one worker.
///
/// Single writer: only the owning worker calls [`WorkerStats::record`].
/// Any thread may call [`WorkerStats::snapshot`].
#[derive(Debug)]
pub struct WorkerStats {
    tid: AtomicI32,
    counters: CachePadded<Counters>,
    history: Option<HistoryBuffer>,
}

impl Default for WorkerStats {
    fn default() -> Self {
        Self::new()
    }
}

impl WorkerStats {
    /// Statistics without a history buffer.
    #[must_use]
    pub fn new() -> Self {
        Self {
            tid: AtomicI32::new(0),
            counters: CachePadded::new(Counters {
                cycles: AtomicU64::new(0),
                min: AtomicU64::new(u64::MAX),
                max: AtomicU64::new(0),
                current: AtomicU64::new(0),
                total: AtomicU64::new(0),
            }),
            history: None,
        }
    }

    /// Statistics that also keep the last `capacity` samples for outlier
    /// tracking.
    #[must_use]
    pub fn with_history(capacity: usize) -> Self {
        Self {
            history: Some(HistoryBuffer::with_capacity(capacity)),
            ..Self::new()
        }
    }

    /// Record one cycle's latency in microseconds.
    #[inline]
    pub fn record(&self, latency: u64) {
        let c = &*self.counters;
        c.min.fetch_min(latency, Ordering::Relaxed);
        c.max.fetch_max(latency, Ordering::Relaxed);
        c.current.store(latency, Ordering::Relaxed);
        c.total.fetch_add(latency, Ordering::Relaxed);
        if let Some(history) = &self.history {
            history.push(latency);
        }
        c.cycles.fetch_add(1, Ordering::Relaxed);
    }

    /// Best-effort copy of the counters.
    #[must_use]
    pub fn snapshot(&self) -> StatsSnapshot {
        let c = &*self.counters;
        let count = c.cycles.load(Ordering::Relaxed);
        let min = c.min.load(Ordering::Relaxed);
        StatsSnapshot {
            count,
            min: if min == u64::MAX { 0 } else { min },
            max: c.max.load(Ordering::Relaxed),
            current: c.current.load(Ordering::Relaxed),
            total: c.total.load(Ordering::Relaxed),
        }
    }

    /// Kernel thread id of the owning worker, 0 until it is known.
    #[must_use]
    pub fn tid(&self) -> i32 {
        self.tid.load(Ordering::Acquire)
    }

    /// Publish the owning worker's thread id.
    pub fn set_tid(&self, tid: i32) {
        self.tid.store(tid, Ordering::Release);
    }

    /// History buffer, if enabled.
    #[must_use]
    pub fn history(&self) -> Option<&HistoryBuffer> {
        self.history.as_ref()
    }
}
