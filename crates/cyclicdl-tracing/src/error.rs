//! Tracing error types

use std::path::PathBuf;

/// Tracing errors
#[derive(Debug, thiserror::Error)]
pub enum TracingError {
    /// Platform has no trace_marker interface
    #[error("Platform not supported for native tracing")]
    PlatformNotSupported,

    /// debugfs is not mounted
    #[error("debugfs is not mounted")]
    DebugfsNotMounted,

    /// Opening or writing a tracing file failed
    #[error("Tracing file '{path}': {source}")]
    Io {
        /// File involved
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },
}

impl TracingError {
    /// Check if this error indicates a missing platform feature
    pub fn is_platform_missing(&self) -> bool {
        matches!(self, TracingError::PlatformNotSupported | TracingError::DebugfsNotMounted)
    }

    /// Create an I/O error for a path.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        TracingError::Io {
            path: path.into(),
            source,
        }
    }
}
