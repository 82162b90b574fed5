//! Scheduling errors raised by worker threads and the coordinator.
//!
//! These error types are safe to construct on a worker's measurement path:
//! - `Copy` semantics (no heap allocations)
//! - OS failures keep only the raw `errno`
//! - Fixed numeric codes for compact reporting

use core::fmt;

/// Scheduling error codes.
///
/// # Examples
///
/// ```
/// use cyclicdl_errors::SchedError;
///
/// let err = SchedError::AttributeApplyFailed { errno: 1 };
///
/// assert_eq!(err.code(), 2);
/// assert!(err.is_fatal());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchedError {
    /// Reading the thread's current scheduling attributes failed
    AttributeQueryFailed {
        /// OS error number reported by the query
        errno: i32,
    },
    /// Applying the deadline scheduling attributes failed
    AttributeApplyFailed {
        /// OS error number reported by the apply call
        errno: i32,
    },
    /// A runtime budget below 2ms was requested but high resolution
    /// scheduler ticks could not be enabled
    ShortPeriodUnsupported {
        /// The offending runtime budget in microseconds
        runtime_us: u64,
    },
    /// The OS refused to create a worker thread
    ThreadCreationFailed {
        /// Index of the worker that could not be spawned
        worker: usize,
    },
    /// A calibration cycle took longer than the worker's runtime budget
    RuntimeBudgetExceeded {
        /// Amount by which the budget was missed, in microseconds
        missed_by_us: u64,
    },
    /// The startup protocol was cancelled because a peer failed
    StartupAborted,
    /// Deadline scheduling is not available on this platform
    Unsupported,
}

impl SchedError {
    /// Get the numeric error code.
    ///
    /// # Examples
    ///
    /// ```
    /// use cyclicdl_errors::SchedError;
    ///
    /// assert_eq!(SchedError::AttributeQueryFailed { errno: 22 }.code(), 1);
    /// assert_eq!(SchedError::StartupAborted.code(), 6);
    /// ```
    pub fn code(self) -> u8 {
        match self {
            SchedError::AttributeQueryFailed { .. } => 1,
            SchedError::AttributeApplyFailed { .. } => 2,
            SchedError::ShortPeriodUnsupported { .. } => 3,
            SchedError::ThreadCreationFailed { .. } => 4,
            SchedError::RuntimeBudgetExceeded { .. } => 5,
            SchedError::StartupAborted => 6,
            SchedError::Unsupported => 7,
        }
    }

    /// Check if this error ends the whole run when seen during startup.
    ///
    /// `StartupAborted` is the echo of some other worker's failure and is
    /// not itself a root cause.
    pub fn is_fatal(self) -> bool {
        !matches!(self, SchedError::StartupAborted)
    }
}

impl fmt::Display for SchedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchedError::AttributeQueryFailed { errno } => write!(
                f,
                "Failed to query scheduling attributes: {}",
                std::io::Error::from_raw_os_error(*errno)
            ),
            SchedError::AttributeApplyFailed { errno } => write!(
                f,
                "Failed to apply deadline scheduling attributes: {}",
                std::io::Error::from_raw_os_error(*errno)
            ),
            SchedError::ShortPeriodUnsupported { runtime_us } => write!(
                f,
                "Runtime of {runtime_us}us is below 2ms and HRTICK is not enabled in sched_features"
            ),
            SchedError::ThreadCreationFailed { worker } => {
                write!(f, "Failed to create worker thread {worker}")
            }
            SchedError::RuntimeBudgetExceeded { missed_by_us } => write!(
                f,
                "Failed to perform task within runtime: missed by {missed_by_us}us"
            ),
            SchedError::StartupAborted => write!(f, "Startup aborted by a failing peer"),
            SchedError::Unsupported => {
                write!(f, "Deadline scheduling is not supported on this platform")
            }
        }
    }
}

impl std::error::Error for SchedError {}
