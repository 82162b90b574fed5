//! Prelude for cyclicdl-tracing.

pub use crate::debugfs::find_debugfs;
pub use crate::error::TracingError;
pub use crate::events::TraceEvent;
pub use crate::metrics::TracingMetrics;
pub use crate::platform::FallbackSink;
pub use crate::provider::{TraceSink, create_platform_sink};

#[cfg(target_os = "linux")]
pub use crate::platform::TraceMarkerSink;
