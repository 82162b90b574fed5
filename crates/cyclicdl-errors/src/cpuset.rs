//! CPU set parsing and isolation errors.

/// Errors from CPU range expressions and CPU-isolation setup.
#[derive(Debug, thiserror::Error)]
pub enum CpuSetError {
    /// A token of the range expression is malformed
    #[error("Invalid CPU range '{token}': {reason}")]
    InvalidRangeSyntax {
        /// The offending token
        token: String,
        /// Why it was rejected
        reason: String,
    },

    /// A CPU index lies outside `[0, cpu_count)`
    #[error("CPU {cpu} is out of range (system has {cpu_count} CPUs)")]
    CpuOutOfRange {
        /// Highest CPU index of the offending interval
        cpu: u32,
        /// Number of CPUs in the system
        cpu_count: usize,
    },

    /// The selection names more CPUs than the system has
    #[error("Selected {requested} CPUs but the system has {cpu_count}")]
    TooManyCpus {
        /// Number of selected CPUs
        requested: usize,
        /// Number of CPUs in the system
        cpu_count: usize,
    },

    /// A cpuset filesystem operation failed
    #[error("CPU isolation failed to {operation} '{path}': {source}")]
    Isolation {
        /// What was being attempted
        operation: &'static str,
        /// Path involved in the failure
        path: String,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

impl CpuSetError {
    /// Create a syntax error for a token.
    pub fn syntax(token: impl Into<String>, reason: impl Into<String>) -> Self {
        CpuSetError::InvalidRangeSyntax {
            token: token.into(),
            reason: reason.into(),
        }
    }

    /// Create an isolation error from an I/O failure.
    pub fn isolation(
        operation: &'static str,
        path: impl Into<String>,
        source: std::io::Error,
    ) -> Self {
        CpuSetError::Isolation {
            operation,
            path: path.into(),
            source,
        }
    }
}
