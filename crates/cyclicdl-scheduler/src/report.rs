//! Per-worker results handed to the display and the final report.

use std::time::Duration;

use cyclicdl_atomic::{Outlier, StatsSnapshot};
use cyclicdl_tracing::TracingMetrics;

/// One worker's row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerReport {
    /// Worker index
    pub index: usize,
    /// Kernel thread id, 0 if the thread never ran
    pub tid: i32,
    /// Runtime budget in microseconds
    pub runtime_us: u64,
    /// Period in microseconds
    pub deadline_us: u64,
    /// Latency statistics
    pub stats: StatsSnapshot,
    /// Largest drained sample, history mode only
    pub outlier: Option<Outlier>,
    /// History overwrites, history mode only
    pub overflows: u64,
    /// Why the worker stopped, if not a clean shutdown
    pub exit: Option<String>,
}

/// Result of a completed run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    /// One row per worker, ordered by index
    pub workers: Vec<WorkerReport>,
    /// History mode was on
    pub history: bool,
    /// Trace sink counters
    pub trace: TracingMetrics,
    /// Wall time spent measuring
    pub elapsed: Duration,
}

impl RunReport {
    /// Sum of all workers' cycle counts.
    pub fn total_cycles(&self) -> u64 {
        self.workers.iter().map(|w| w.stats.count).sum()
    }

    /// Largest latency over all workers.
    pub fn worst_latency(&self) -> u64 {
        self.workers.iter().map(|w| w.stats.max).max().unwrap_or(0)
    }
}

/// Receiver of periodic snapshots while the run is in progress.
pub trait LiveView {
    /// Show the latest rows.
    fn refresh(&mut self, rows: &[WorkerReport]);
}

/// View that shows nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullView;

impl LiveView for NullView {
    fn refresh(&mut self, _rows: &[WorkerReport]) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(index: usize, count: u64, max: u64) -> WorkerReport {
        WorkerReport {
            index,
            tid: 100 + i32::try_from(index).unwrap_or(0),
            runtime_us: 600,
            deadline_us: 1_000,
            stats: StatsSnapshot {
                count,
                min: 1,
                max,
                current: 1,
                total: count,
            },
            outlier: None,
            overflows: 0,
            exit: None,
        }
    }

    #[test]
    fn test_totals() {
        let report = RunReport {
            workers: vec![row(0, 10, 7), row(1, 5, 42)],
            history: false,
            trace: TracingMetrics::default(),
            elapsed: Duration::from_secs(1),
        };
        assert_eq!(report.total_cycles(), 15);
        assert_eq!(report.worst_latency(), 42);
    }

    #[test]
    fn test_empty_report() {
        let report = RunReport {
            workers: Vec::new(),
            history: true,
            trace: TracingMetrics::default(),
            elapsed: Duration::ZERO,
        };
        assert_eq!(report.total_cycles(), 0);
        assert_eq!(report.worst_latency(), 0);
    }
}
