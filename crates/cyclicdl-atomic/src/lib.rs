//! # cyclicdl-atomic
//!
//! Lock-free latency statistics for deadline worker threads.
//!
//! Each worker owns one [`WorkerStats`] and is its only writer. The
//! reporting thread reads it concurrently through [`WorkerStats::snapshot`]
//! without any lock. Every field is an independent relaxed atomic, so a
//! snapshot taken mid-cycle may mix values from two adjacent cycles; it is
//! never torn within a field and never blocks the writer.
//!
//! ## Hot path guarantees
//!
//! - No heap allocations after construction
//! - No blocking and no syscalls in [`WorkerStats::record`]
//! - Bounded execution time
//!
//! ## Usage
//!
//! ```rust
//! use cyclicdl_atomic::WorkerStats;
//!
//! let stats = WorkerStats::new();
//! for latency in [10, 20, 30] {
//!     stats.record(latency);
//! }
//!
//! let snap = stats.snapshot();
//! assert_eq!((snap.count, snap.min, snap.max, snap.avg()), (3, 10, 30, 20));
//! ```

#![no_std]
#![deny(
    unsafe_op_in_unsafe_fn,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic_in_result_fn,
    clippy::panic,
    missing_docs,
    missing_debug_implementations
)]
#![warn(clippy::pedantic)]
#![cfg_attr(docsrs, feature(doc_cfg))]

extern crate alloc;

pub mod history;
pub mod prelude;
pub mod stats;

pub use history::{DEFAULT_HISTORY_CAPACITY, DrainSummary, HistoryBuffer, Outlier, OutlierTracker};
pub use stats::{StatsSnapshot, WorkerStats};
