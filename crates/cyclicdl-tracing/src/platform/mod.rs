//! Platform-specific trace sinks

mod fallback;

#[cfg(target_os = "linux")]
mod linux;

pub use fallback::FallbackSink;

#[cfg(target_os = "linux")]
pub use linux::TraceMarkerSink;
