//! Trace annotations for deadline workers.
//!
//! Workers describe each cycle with a [`TraceEvent`] and hand it to a
//! [`TraceSink`]. On Linux the default sink appends one line per event to
//! the ftrace `trace_marker` file, so the annotations interleave with
//! kernel scheduler events in the trace buffer. Everywhere else, or when
//! debugfs is not mounted, events go to the `tracing` subscriber at trace
//! level.
//!
//! Workers never wait on each other to emit: each event is one unlocked
//! write, and a write that fails is dropped and counted.
//!
//! # Example
//!
//! ```rust
//! use cyclicdl_tracing::{TraceEvent, TraceSink, platform::FallbackSink};
//!
//! let sink = FallbackSink::new();
//! sink.emit(TraceEvent::CycleStart { now: 1_000, offset: 3, period: 997, next: 1_997 });
//! assert_eq!(sink.metrics().events_emitted, 1);
//! ```

#![deny(unsafe_op_in_unsafe_fn, clippy::unwrap_used)]
#![warn(missing_docs, missing_debug_implementations)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod debugfs;
pub mod error;
pub mod events;
pub mod metrics;
pub mod platform;
pub mod prelude;
pub mod provider;

pub use error::TracingError;
pub use events::TraceEvent;
pub use metrics::TracingMetrics;
pub use provider::{TraceSink, create_platform_sink};
