//! Per-worker runtime and deadline computation.
//!
//! Worker `i` gets a period of `base_interval + i * step` microseconds and
//! a runtime budget of `duty_percent` of that period.

/// Duty cycle used while every worker has a CPU to itself.
pub const DEFAULT_DUTY_PERCENT: u64 = 60;

/// Ceiling on the summed utilization when workers outnumber CPUs.
pub const OVERCOMMIT_UTILIZATION_PERCENT: u64 = 80;

/// Runtimes below this need high resolution scheduler ticks.
pub const SHORT_RUNTIME_US: u64 = 2_000;

/// Runtime budget and period of one worker, fixed before threads start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkerSchedule {
    /// Zero-based worker index
    pub index: usize,
    /// Compute budget per period in microseconds
    pub runtime_us: u64,
    /// Period length in microseconds
    pub deadline_us: u64,
}

impl WorkerSchedule {
    /// True if the runtime is short enough to require HRTICK.
    #[must_use]
    pub fn needs_hrtick(&self) -> bool {
        self.runtime_us < SHORT_RUNTIME_US
    }
}

/// Duty cycle in percent for `workers` sharing `cpus`.
///
/// With more workers than CPUs the percentage is scaled down linearly so
/// that the summed utilization stays at or below 80% of the CPUs. This is
/// a heuristic, not a schedulability proof.
#[must_use]
pub fn duty_percent(workers: usize, cpus: usize) -> u64 {
    if workers <= cpus || workers == 0 {
        return DEFAULT_DUTY_PERCENT;
    }
    let cpus = cpus as u64;
    let workers = workers as u64;
    cpus.saturating_mul(OVERCOMMIT_UTILIZATION_PERCENT) / workers
}

/// Compute one schedule per worker.
///
/// # Example
///
/// ```
/// use cyclicdl_scheduler::schedule::compute_schedules;
///
/// let schedules = compute_schedules(1000, 500, 3, 4);
/// let deadlines: Vec<u64> = schedules.iter().map(|s| s.deadline_us).collect();
/// let runtimes: Vec<u64> = schedules.iter().map(|s| s.runtime_us).collect();
/// assert_eq!(deadlines, [1000, 1500, 2000]);
/// assert_eq!(runtimes, [600, 900, 1200]);
/// ```
#[must_use]
pub fn compute_schedules(base_interval_us: u64, step_us: u64, workers: usize, cpus: usize) -> Vec<WorkerSchedule> {
    let percent = duty_percent(workers, cpus);
    (0..workers)
        .map(|index| {
            let deadline_us = base_interval_us.saturating_add(step_us.saturating_mul(index as u64));
            WorkerSchedule {
                index,
                runtime_us: deadline_us.saturating_mul(percent) / 100,
                deadline_us,
            }
        })
        .collect()
}
