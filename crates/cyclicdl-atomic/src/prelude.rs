//! Prelude for cyclicdl-atomic.
//!
//! # Example
//!
//! ```rust
//! use cyclicdl_atomic::prelude::*;
//!
//! let stats = WorkerStats::with_history(DEFAULT_HISTORY_CAPACITY);
//! stats.record(5);
//!
//! let mut tracker = OutlierTracker::new();
//! if let Some(history) = stats.history() {
//!     history.drain(&mut tracker);
//! }
//! assert_eq!(tracker.outlier(), Some(Outlier { latency: 5, cycle: 0 }));
//! ```

pub use crate::history::{DEFAULT_HISTORY_CAPACITY, DrainSummary, HistoryBuffer, Outlier, OutlierTracker};
pub use crate::stats::{StatsSnapshot, WorkerStats};
