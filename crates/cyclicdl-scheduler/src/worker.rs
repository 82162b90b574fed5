//! The deadline worker and its measurement loop.
//!
//! Each worker walks through the startup protocol in lockstep with its
//! peers and the coordinator:
//!
//! 1. read its scheduling attributes, then rendezvous
//! 2. prepare the deadline attributes, then rendezvous
//! 3. apply them with one syscall, then rendezvous
//! 4. wait for the coordinator to finish CPU isolation, then rendezvous
//!
//! A failure at any step requests shutdown, but the worker keeps arriving
//! at every remaining rendezvous so nobody is left waiting. After the last
//! one, a worker enters the loop only if no shutdown was requested.

use std::sync::Arc;

use cyclicdl_atomic::WorkerStats;
use cyclicdl_errors::SchedError;
use cyclicdl_tracing::{TraceEvent, TraceSink};

use crate::backend::SchedBackend;
use crate::barrier::PhaseBarrier;
use crate::clock::TimeSource;
use crate::schedule::WorkerSchedule;
use crate::shutdown::ShutdownFlag;

/// How a worker thread ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkerExit {
    /// Worker index
    pub index: usize,
    /// True if the worker got past startup and measured
    pub entered_loop: bool,
    /// The worker's own failure, if any
    pub error: Option<SchedError>,
}

impl WorkerExit {
    /// True if this exit should abort the run: a failure before the
    /// measuring loop was entered.
    #[must_use]
    pub fn is_startup_failure(&self) -> bool {
        !self.entered_loop && self.error.is_some_and(SchedError::is_fatal)
    }
}

/// One deadline-scheduled measuring thread.
pub struct DeadlineWorker {
    schedule: WorkerSchedule,
    stats: Arc<WorkerStats>,
    clock: Arc<dyn TimeSource>,
    sink: Arc<dyn TraceSink>,
}

impl std::fmt::Debug for DeadlineWorker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeadlineWorker")
            .field("schedule", &self.schedule)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

impl DeadlineWorker {
    /// Create a worker that records into `stats`.
    pub fn new(
        schedule: WorkerSchedule,
        stats: Arc<WorkerStats>,
        clock: Arc<dyn TimeSource>,
        sink: Arc<dyn TraceSink>,
    ) -> Self {
        Self {
            schedule,
            stats,
            clock,
            sink,
        }
    }

    /// The worker's schedule.
    pub fn schedule(&self) -> &WorkerSchedule {
        &self.schedule
    }

    /// The worker's statistics.
    pub fn stats(&self) -> &Arc<WorkerStats> {
        &self.stats
    }

    /// Measure one cycle that was meant to start at `period` and return
    /// the intended start of the next one.
    ///
    /// Waking before the intended start is not negative latency: the
    /// intended start is moved to the wakeup time and the cycle counts as
    /// zero latency.
    #[inline]
    pub fn cycle(&self, period: u64) -> u64 {
        let now = self.clock.now_us();
        let mut period = period;
        if now < period {
            self.sink
                .emit(TraceEvent::period_adjusted(now, period, self.schedule.deadline_us));
            period = now;
        }

        let next = period.saturating_add(self.schedule.deadline_us);
        let latency = now.saturating_sub(period);
        self.sink.emit(TraceEvent::CycleStart {
            now,
            offset: latency,
            period,
            next,
        });
        self.stats.record(latency);
        next
    }

    /// Run the startup protocol and, if it succeeds, the measuring loop
    /// until `shutdown` is requested.
    pub fn run(self, backend: &dyn SchedBackend, barrier: &PhaseBarrier, shutdown: &ShutdownFlag) -> WorkerExit {
        let index = self.schedule.index;
        let tid = backend.current_tid();
        self.stats.set_tid(tid);

        let mut failure = None;
        let mut attr = match backend.get_attr() {
            Ok(attr) => Some(attr),
            Err(e) => {
                tracing::error!(worker = index, tid, code = e.code(), error = %e, "Failed to read scheduling attributes");
                shutdown.request();
                failure = Some(e);
                None
            }
        };
        barrier.wait();

        if !shutdown.is_requested()
            && let Some(attr) = attr.as_mut()
        {
            attr.apply_schedule(&self.schedule);
            tracing::debug!(
                worker = index,
                tid,
                runtime_us = self.schedule.runtime_us,
                deadline_us = self.schedule.deadline_us,
                "Prepared deadline attributes"
            );
        }
        barrier.wait();

        if !shutdown.is_requested()
            && let Some(attr) = &attr
            && let Err(e) = backend.set_attr(attr)
        {
            tracing::error!(worker = index, tid, code = e.code(), error = %e, "Failed to apply deadline attributes");
            shutdown.request();
            failure = Some(e);
        }
        barrier.wait();

        barrier.wait();
        if shutdown.is_requested() {
            return WorkerExit {
                index,
                entered_loop: false,
                error: failure,
            };
        }

        tracing::debug!(worker = index, tid, "Entering measuring loop");
        backend.yield_period();
        let mut period = self.clock.now_us();
        while !shutdown.is_requested() {
            period = self.cycle(period);
            backend.yield_period();
        }

        let error = match backend.get_attr() {
            Ok(_) => None,
            Err(e) => {
                tracing::warn!(worker = index, tid, error = %e, "Scheduling attribute query failed on exit");
                Some(e)
            }
        };
        WorkerExit {
            index,
            entered_loop: true,
            error,
        }
    }
}

#[cfg(test)]
mod tests {
    use cyclicdl_tracing::platform::FallbackSink;

    use super::*;
    use crate::clock::ManualClock;

    fn worker(clock: Arc<ManualClock>, deadline_us: u64) -> DeadlineWorker {
        DeadlineWorker::new(
            WorkerSchedule {
                index: 0,
                runtime_us: deadline_us * 6 / 10,
                deadline_us,
            },
            Arc::new(WorkerStats::new()),
            clock,
            Arc::new(FallbackSink::new()),
        )
    }

    #[test]
    fn test_cycle_measures_lateness() {
        let clock = Arc::new(ManualClock::new(1_030));
        let w = worker(clock.clone(), 1_000);

        let next = w.cycle(1_000);
        assert_eq!(next, 2_000);

        clock.set(2_005);
        assert_eq!(w.cycle(next), 3_000);

        let snap = w.stats().snapshot();
        assert_eq!(snap.count, 2);
        assert_eq!(snap.max, 30);
        assert_eq!(snap.min, 5);
        assert_eq!(snap.current, 5);
    }

    #[test]
    fn test_early_wakeup_resyncs_period() {
        let clock = Arc::new(ManualClock::new(900));
        let w = worker(clock, 1_000);

        // Woke 100us before the intended start: latency is 0 and the next
        // period is measured from the wakeup.
        let next = w.cycle(1_000);
        assert_eq!(next, 1_900);

        let snap = w.stats().snapshot();
        assert_eq!(snap.count, 1);
        assert_eq!(snap.current, 0);
        assert_eq!(snap.max, 0);
    }

    #[test]
    fn test_cycle_emits_trace_events() {
        let clock = Arc::new(ManualClock::new(500));
        let sink = Arc::new(FallbackSink::new());
        let w = DeadlineWorker::new(
            WorkerSchedule {
                index: 0,
                runtime_us: 600,
                deadline_us: 1_000,
            },
            Arc::new(WorkerStats::new()),
            clock,
            sink.clone(),
        );

        w.cycle(400);
        assert_eq!(sink.metrics().events_emitted, 1);
        w.cycle(2_000);
        assert_eq!(sink.metrics().events_emitted, 3);
    }

    #[test]
    fn test_startup_failure_classification() {
        let failed = WorkerExit {
            index: 0,
            entered_loop: false,
            error: Some(SchedError::AttributeApplyFailed { errno: 1 }),
        };
        let late = WorkerExit {
            entered_loop: true,
            ..failed
        };
        let echoed = WorkerExit {
            error: Some(SchedError::StartupAborted),
            ..failed
        };
        assert!(failed.is_startup_failure());
        assert!(!late.is_startup_failure());
        assert!(!echoed.is_startup_failure());
    }
}
