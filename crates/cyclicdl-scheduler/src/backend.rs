//! Seam between the workers and the OS scheduler.

use std::sync::Arc;

use cyclicdl_errors::SchedResult;

use crate::schedule::WorkerSchedule;

/// Linux `SCHED_DEADLINE` policy number.
pub const SCHED_DEADLINE: u32 = 6;

/// Scheduling attributes of one thread, in kernel units (nanoseconds).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SchedAttr {
    /// Scheduling policy
    pub policy: u32,
    /// Policy flags
    pub flags: u64,
    /// Nice value for fair policies
    pub nice: i32,
    /// Static priority for real-time policies
    pub priority: u32,
    /// Deadline runtime budget
    pub runtime_ns: u64,
    /// Relative deadline
    pub deadline_ns: u64,
    /// Period, 0 meaning equal to the deadline
    pub period_ns: u64,
}

impl SchedAttr {
    /// Switch these attributes to the deadline policy for `schedule`.
    pub fn apply_schedule(&mut self, schedule: &WorkerSchedule) {
        self.policy = SCHED_DEADLINE;
        self.runtime_ns = schedule.runtime_us.saturating_mul(1_000);
        self.deadline_ns = schedule.deadline_us.saturating_mul(1_000);
    }

    /// True if the policy is `SCHED_DEADLINE`.
    #[must_use]
    pub fn is_deadline(&self) -> bool {
        self.policy == SCHED_DEADLINE
    }
}

/// Operations the workers and coordinator need from the OS.
///
/// Attribute calls act on the calling thread.
pub trait SchedBackend: Send + Sync {
    /// Kernel thread id of the calling thread.
    fn current_tid(&self) -> i32;

    /// Read the calling thread's scheduling attributes.
    ///
    /// # Errors
    ///
    /// `AttributeQueryFailed` with the OS error number.
    fn get_attr(&self) -> SchedResult<SchedAttr>;

    /// Apply scheduling attributes to the calling thread in one call.
    ///
    /// # Errors
    ///
    /// `AttributeApplyFailed` with the OS error number.
    fn set_attr(&self, attr: &SchedAttr) -> SchedResult;

    /// Give up the rest of the current period.
    fn yield_period(&self);

    /// Number of CPUs the system is configured with.
    fn cpu_count(&self) -> usize;

    /// Make sure high resolution ticks are on for deadline tasks.
    /// Returns false if they could not be enabled.
    fn enable_hrtick(&self) -> bool;
}

/// The backend for the platform this binary was built for.
pub fn platform_backend() -> Arc<dyn SchedBackend> {
    #[cfg(target_os = "linux")]
    {
        Arc::new(crate::linux::LinuxBackend::new())
    }

    #[cfg(not(target_os = "linux"))]
    {
        Arc::new(crate::fallback::FallbackBackend::new())
    }
}
