//! The control thread: startup, reporting and shutdown of a run.

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;

use cyclicdl_atomic::{OutlierTracker, WorkerStats};
use cyclicdl_cpuset::{CgroupCpuset, CpuIsolation, CpuPlan, NoIsolation};
use cyclicdl_errors::{CyclicError, SchedError};
use cyclicdl_tracing::{TraceSink, create_platform_sink};

use crate::backend::SchedBackend;
use crate::barrier::PhaseBarrier;
use crate::clock::{MonotonicClock, TimeSource};
use crate::config::RunConfig;
use crate::report::{LiveView, RunReport, WorkerReport};
use crate::rt_setup::RTSetup;
use crate::schedule::{WorkerSchedule, compute_schedules};
use crate::shutdown::{ShutdownFlag, install_signal_handler};
use crate::worker::{DeadlineWorker, WorkerExit};

/// Runs one measurement from schedule computation to final report.
pub struct Coordinator {
    config: RunConfig,
    plan: CpuPlan,
    backend: Arc<dyn SchedBackend>,
    clock: Arc<dyn TimeSource>,
    sink: Arc<dyn TraceSink>,
    isolation: Box<dyn CpuIsolation>,
    shutdown: ShutdownFlag,
}

impl std::fmt::Debug for Coordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Coordinator")
            .field("config", &self.config)
            .field("plan", &self.plan)
            .field("shutdown", &self.shutdown)
            .finish_non_exhaustive()
    }
}

struct Spawned {
    stats: Vec<Arc<WorkerStats>>,
    handles: Vec<(usize, JoinHandle<WorkerExit>)>,
    error: Option<SchedError>,
}

impl Coordinator {
    /// Coordinator using the monotonic clock, the platform trace sink and
    /// cgroup isolation when `plan` selects a subset of CPUs.
    pub fn new(config: RunConfig, plan: CpuPlan, backend: Arc<dyn SchedBackend>) -> Self {
        let isolation: Box<dyn CpuIsolation> = if plan.is_isolated() {
            Box::new(CgroupCpuset::new())
        } else {
            Box::new(NoIsolation)
        };
        Self {
            config,
            plan,
            backend,
            clock: Arc::new(MonotonicClock::new()),
            sink: create_platform_sink(),
            isolation,
            shutdown: ShutdownFlag::new(),
        }
    }

    /// Use a different time source.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn TimeSource>) -> Self {
        self.clock = clock;
        self
    }

    /// Use a different trace sink.
    #[must_use]
    pub fn with_trace_sink(mut self, sink: Arc<dyn TraceSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Use a different CPU isolation mechanism.
    #[must_use]
    pub fn with_isolation(mut self, isolation: Box<dyn CpuIsolation>) -> Self {
        self.isolation = isolation;
        self
    }

    /// Share an existing shutdown flag.
    #[must_use]
    pub fn with_shutdown(mut self, shutdown: ShutdownFlag) -> Self {
        self.shutdown = shutdown;
        self
    }

    /// Handle to this run's shutdown flag.
    pub fn shutdown_flag(&self) -> ShutdownFlag {
        self.shutdown.clone()
    }

    /// Execute the run.
    ///
    /// # Errors
    ///
    /// Configuration errors, a missing short-period timer, a failed
    /// calibration, a failed thread spawn, a worker failing to read or
    /// apply its scheduling attributes, or CPU isolation failing. In every
    /// case all spawned threads have been joined before this returns.
    pub fn run(self, view: &mut dyn LiveView) -> Result<RunReport, CyclicError> {
        self.config.validate()?;

        let cpus = self.plan.available_cpus();
        let workers = self.config.worker_count(1);
        let schedules = compute_schedules(self.config.interval_us, self.config.step_us, workers, cpus);
        if workers > cpus {
            tracing::warn!(workers, cpus, "More workers than CPUs, scaling down runtime budgets");
        }
        tracing::info!(workers, cpus, interval_us = self.config.interval_us, step_us = self.config.step_us, "Starting deadline run");

        check_runtime_budgets(&schedules, workers, cpus)?;

        RTSetup::new().with_lock_memory(self.config.lock_memory).apply();
        self.check_short_periods(&schedules)?;
        self.calibrate(&schedules)?;

        let barrier = Arc::new(PhaseBarrier::new(workers.saturating_add(1)));
        let spawned = self.spawn_workers(&schedules, &barrier);
        let Coordinator {
            config,
            plan,
            clock: _,
            sink,
            mut isolation,
            shutdown,
            backend: _,
        } = self;

        // Attributes read
        barrier.wait();
        for schedule in &schedules {
            tracing::info!(
                worker = schedule.index,
                runtime_us = schedule.runtime_us,
                deadline_us = schedule.deadline_us,
                "Worker schedule"
            );
        }
        // Attributes prepared
        barrier.wait();
        // Attributes applied
        barrier.wait();

        let mut abort = shutdown.is_requested();
        let mut isolation_error = None;
        if !abort {
            if let CpuPlan::Isolated { selected, others, .. } = &plan {
                let tids: Vec<i32> = spawned.stats.iter().map(|s| s.tid()).collect();
                if let Err(e) = isolation.isolate(&selected.render(), &others.render(), &tids) {
                    tracing::error!(error = %e, "CPU isolation failed");
                    shutdown.request();
                    isolation_error = Some(e);
                    abort = true;
                }
            }
            if config.install_signals
                && let Err(e) = install_signal_handler(&shutdown)
            {
                tracing::warn!(error = %e, "Signal handler not installed");
            }
        }
        // Setup complete
        barrier.wait();

        if abort {
            let exits = join_workers(spawned.handles);
            isolation.teardown();
            if let Some(e) = isolation_error {
                return Err(e.into());
            }
            let cause = spawned
                .error
                .or_else(|| exits.iter().flatten().filter(|x| x.is_startup_failure()).find_map(|x| x.error))
                .unwrap_or(SchedError::StartupAborted);
            tracing::error!(error = %cause, "Startup aborted");
            return Err(cause.into());
        }

        tracing::info!("All workers running");
        let started = Instant::now();
        let stop_at = config.duration.and_then(|d| started.checked_add(d));
        let mut trackers = vec![OutlierTracker::new(); schedules.len()];
        let no_exits = vec![None; schedules.len()];

        while !shutdown.is_requested() {
            if config.history {
                drain_histories(&spawned.stats, &mut trackers);
            }
            if !config.quiet {
                view.refresh(&build_rows(&schedules, &spawned.stats, &trackers, &no_exits));
            }
            if stop_at.is_some_and(|t| Instant::now() >= t) {
                tracing::info!("Run duration elapsed");
                shutdown.request();
                break;
            }
            thread::sleep(config.refresh);
        }
        let elapsed = started.elapsed();

        let exits = join_workers(spawned.handles);
        isolation.teardown();
        if config.history {
            drain_histories(&spawned.stats, &mut trackers);
        }

        let reasons: Vec<Option<String>> = (0..schedules.len())
            .map(|index| match exits.get(index) {
                Some(Some(exit)) => exit.error.map(|e| e.to_string()),
                _ => Some("worker thread panicked".to_string()),
            })
            .collect();

        Ok(RunReport {
            workers: build_rows(&schedules, &spawned.stats, &trackers, &reasons),
            history: config.history,
            trace: sink.metrics(),
            elapsed,
        })
    }

    fn check_short_periods(&self, schedules: &[WorkerSchedule]) -> Result<(), CyclicError> {
        let Some(shortest) = schedules
            .iter()
            .filter(|s| s.needs_hrtick())
            .map(|s| s.runtime_us)
            .min()
        else {
            return Ok(());
        };
        if self.backend.enable_hrtick() {
            return Ok(());
        }
        tracing::error!(runtime_us = shortest, "Runtime below 2ms requires HRTICK");
        Err(SchedError::ShortPeriodUnsupported { runtime_us: shortest }.into())
    }

    /// Time one cycle per schedule on scratch statistics.
    fn calibrate(&self, schedules: &[WorkerSchedule]) -> Result<(), CyclicError> {
        for schedule in schedules {
            let worker = DeadlineWorker::new(
                *schedule,
                Arc::new(WorkerStats::new()),
                Arc::clone(&self.clock),
                Arc::clone(&self.sink),
            );
            let start = self.clock.now_us();
            worker.cycle(start);
            let elapsed = self.clock.now_us().saturating_sub(start);
            if elapsed > schedule.runtime_us {
                let missed_by_us = elapsed.saturating_sub(schedule.runtime_us);
                tracing::error!(
                    worker = schedule.index,
                    elapsed_us = elapsed,
                    runtime_us = schedule.runtime_us,
                    "Calibration cycle exceeded the runtime budget"
                );
                return Err(SchedError::RuntimeBudgetExceeded { missed_by_us }.into());
            }
            tracing::info!(
                worker = schedule.index,
                elapsed_us = elapsed,
                runtime_us = schedule.runtime_us,
                "Calibration cycle within budget"
            );
        }
        Ok(())
    }

    fn spawn_workers(&self, schedules: &[WorkerSchedule], barrier: &Arc<PhaseBarrier>) -> Spawned {
        let mut spawned = Spawned {
            stats: Vec::with_capacity(schedules.len()),
            handles: Vec::with_capacity(schedules.len()),
            error: None,
        };

        for schedule in schedules {
            let stats = Arc::new(if self.config.history {
                WorkerStats::with_history(self.config.history_capacity)
            } else {
                WorkerStats::new()
            });
            spawned.stats.push(Arc::clone(&stats));

            if spawned.error.is_some() {
                barrier.leave();
                continue;
            }

            let worker = DeadlineWorker::new(*schedule, stats, Arc::clone(&self.clock), Arc::clone(&self.sink));
            let backend = Arc::clone(&self.backend);
            let worker_barrier = Arc::clone(barrier);
            let shutdown = self.shutdown.clone();
            let result = thread::Builder::new()
                .name(format!("deadline-{}", schedule.index))
                .spawn(move || worker.run(backend.as_ref(), &worker_barrier, &shutdown));

            match result {
                Ok(handle) => spawned.handles.push((schedule.index, handle)),
                Err(e) => {
                    tracing::error!(worker = schedule.index, error = %e, "Failed to create worker thread");
                    self.shutdown.request();
                    spawned.error = Some(SchedError::ThreadCreationFailed { worker: schedule.index });
                    barrier.leave();
                }
            }
        }
        spawned
    }
}

/// Join every worker. The result is indexed by worker; `None` marks a
/// worker that panicked or was never spawned.
fn join_workers(handles: Vec<(usize, JoinHandle<WorkerExit>)>) -> Vec<Option<WorkerExit>> {
    let mut exits = Vec::new();
    for (index, handle) in handles {
        if exits.len() <= index {
            exits.resize(index.saturating_add(1), None);
        }
        match handle.join() {
            Ok(exit) => {
                if let Some(slot) = exits.get_mut(index) {
                    *slot = Some(exit);
                }
            }
            Err(_) => tracing::error!(worker = index, "Worker thread panicked"),
        }
    }
    exits
}

fn drain_histories(stats: &[Arc<WorkerStats>], trackers: &mut [OutlierTracker]) {
    for (worker, (stats, tracker)) in stats.iter().zip(trackers.iter_mut()).enumerate() {
        if let Some(history) = stats.history() {
            let summary = history.drain(tracker);
            if summary.lost > 0 {
                tracing::debug!(worker, lost = summary.lost, "History samples overwritten before drain");
            }
        }
    }
}

fn build_rows(
    schedules: &[WorkerSchedule],
    stats: &[Arc<WorkerStats>],
    trackers: &[OutlierTracker],
    exits: &[Option<String>],
) -> Vec<WorkerReport> {
    schedules
        .iter()
        .zip(stats)
        .zip(trackers)
        .zip(exits)
        .map(|(((schedule, stats), tracker), exit)| WorkerReport {
            index: schedule.index,
            tid: stats.tid(),
            runtime_us: schedule.runtime_us,
            deadline_us: schedule.deadline_us,
            stats: stats.snapshot(),
            outlier: tracker.outlier(),
            overflows: stats.history().map_or(0, |h| h.overflows()),
            exit: exit.clone(),
        })
        .collect()
}

/// Reject schedules whose runtime budget rounds down to zero.
fn check_runtime_budgets(schedules: &[WorkerSchedule], workers: usize, cpus: usize) -> Result<(), CyclicError> {
    match schedules.iter().find(|s| s.runtime_us == 0) {
        Some(schedule) => Err(CyclicError::config(format!(
            "runtime budget rounds to zero for worker {} (period {}us, {workers} workers on {cpus} CPUs)",
            schedule.index, schedule.deadline_us
        ))),
        None => Ok(()),
    }
}
