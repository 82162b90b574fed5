//! Error types for cyclicdeadline

use cyclicdl_errors::{CyclicError, ErrorCategory};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Invalid duration '{input}': {reason}")]
    InvalidDuration { input: String, reason: &'static str },

    #[error("Failed to write JSON report to {path}: {source}")]
    ReportWrite {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Process exit status for a failed run.
pub fn exit_code(error: &anyhow::Error) -> u8 {
    if let Some(e) = error.downcast_ref::<CyclicError>() {
        return match e.category() {
            ErrorCategory::CpuSet | ErrorCategory::Config => 2,
            ErrorCategory::Sched => 3,
            ErrorCategory::Isolation => 4,
            ErrorCategory::IO => 5,
            ErrorCategory::Other => 1,
        };
    }
    match error.downcast_ref::<CliError>() {
        Some(CliError::InvalidDuration { .. }) => 2,
        Some(CliError::ReportWrite { .. }) | Some(CliError::JsonError(_)) => 5,
        None => 1,
    }
}
