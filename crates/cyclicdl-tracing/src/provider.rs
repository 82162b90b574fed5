//! Trace sink trait definition

use std::sync::Arc;

use crate::{TraceEvent, TracingMetrics};

/// Destination for worker annotations.
///
/// [`emit`](TraceSink::emit) is called from the measuring loop. It must
/// not allocate, must not block, and must finish in bounded time.
/// Implementations drop events rather than wait.
pub trait TraceSink: Send + Sync {
    /// Emit one event.
    fn emit(&self, event: TraceEvent);

    /// Current counters.
    fn metrics(&self) -> TracingMetrics;

    /// True if events reach a kernel trace buffer.
    fn is_enabled(&self) -> bool {
        true
    }
}

/// Create the best sink for this platform.
///
/// On Linux this is a [`TraceMarkerSink`](crate::platform::TraceMarkerSink)
/// when debugfs is mounted and the marker is writable; otherwise a
/// [`FallbackSink`](crate::platform::FallbackSink).
pub fn create_platform_sink() -> Arc<dyn TraceSink> {
    #[cfg(target_os = "linux")]
    {
        match crate::platform::TraceMarkerSink::open_default() {
            Ok(sink) => {
                tracing::info!("Writing annotations to trace_marker");
                return Arc::new(sink);
            }
            Err(e) => {
                tracing::debug!(error = %e, "trace_marker unavailable, falling back to structured logging");
            }
        }
    }

    Arc::new(crate::platform::FallbackSink::new())
}
