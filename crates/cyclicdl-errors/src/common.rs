//! Common error types and utilities used across all cyclicdl crates.
//!
//! This module provides the top-level error enum that can wrap all sub-errors,
//! along with the category the binary maps to an exit status.

use core::fmt;

use crate::{CpuSetError, SchedError};

/// Top-level error type that can wrap all cyclicdl sub-errors.
#[derive(Debug, thiserror::Error)]
pub enum CyclicError {
    /// CPU range and isolation errors
    #[error("CPU set error: {0}")]
    Cpu(#[from] CpuSetError),

    /// Scheduling errors
    #[error("Scheduling error: {0}")]
    Sched(#[from] SchedError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[source] std::io::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl CyclicError {
    /// Get the error category for classification.
    pub fn category(&self) -> ErrorCategory {
        match self {
            CyclicError::Cpu(CpuSetError::Isolation { .. }) => ErrorCategory::Isolation,
            CyclicError::Cpu(_) => ErrorCategory::CpuSet,
            CyclicError::Sched(_) => ErrorCategory::Sched,
            CyclicError::Io(_) => ErrorCategory::IO,
            CyclicError::Config(_) => ErrorCategory::Config,
            CyclicError::Other(_) => ErrorCategory::Other,
        }
    }

    /// Create a configuration error with a message.
    pub fn config(msg: impl Into<String>) -> Self {
        CyclicError::Config(msg.into())
    }

    /// Create a generic error with a message.
    pub fn other(msg: impl Into<String>) -> Self {
        CyclicError::Other(msg.into())
    }
}

impl From<std::io::Error> for CyclicError {
    fn from(e: std::io::Error) -> Self {
        CyclicError::Io(e)
    }
}

/// Error category for classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ErrorCategory {
    /// CPU range parsing errors
    CpuSet = 0,
    /// Scheduling attribute and startup errors
    Sched = 1,
    /// CPU-isolation (cpuset filesystem) errors
    Isolation = 2,
    /// Configuration errors
    Config = 3,
    /// I/O errors
    IO = 4,
    /// Other errors
    Other = 255,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorCategory::CpuSet => write!(f, "CpuSet"),
            ErrorCategory::Sched => write!(f, "Sched"),
            ErrorCategory::Isolation => write!(f, "Isolation"),
            ErrorCategory::Config => write!(f, "Config"),
            ErrorCategory::IO => write!(f, "IO"),
            ErrorCategory::Other => write!(f, "Other"),
        }
    }
}
