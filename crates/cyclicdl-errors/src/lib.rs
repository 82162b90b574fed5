//! Centralized error types for cyclicdl
//!
//! The harness has two error families with different lifetimes:
//!
//! - [`cpuset`]: CPU range parsing and CPU-isolation errors. These are raised
//!   before any worker thread exists, so they carry owned context strings.
//! - [`sched`]: scheduling errors raised from worker threads. These are `Copy`
//!   and allocation-free so a worker can hand one back from its hot path.
//!
//! [`common`] wraps both into [`CyclicError`] with a category so the binary
//! can pick an exit status.
//!
//! # Example
//!
//! ```
//! use cyclicdl_errors::prelude::*;
//!
//! fn check_interval(interval_us: u64) -> Result<u64> {
//!     if interval_us == 0 {
//!         return Err(CyclicError::config("interval must be non-zero"));
//!     }
//!     Ok(interval_us)
//! }
//!
//! assert!(check_interval(0).is_err());
//! ```

#![deny(unsafe_op_in_unsafe_fn, clippy::unwrap_used)]
#![warn(missing_docs, rust_2018_idioms)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod common;
pub mod cpuset;
pub mod prelude;
pub mod sched;

pub use common::{CyclicError, ErrorCategory};
pub use cpuset::CpuSetError;
pub use sched::SchedError;

/// A specialized `Result` type for cyclicdl operations.
pub type Result<T> = std::result::Result<T, CyclicError>;

/// A specialized `Result` type for scheduling operations on worker threads.
pub type SchedResult<T = ()> = std::result::Result<T, SchedError>;
