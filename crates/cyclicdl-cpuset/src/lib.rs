//! CPU range expressions and cpuset isolation for deadline scheduling tests.
//!
//! This crate turns a user-supplied CPU list such as `"0,2-4"` into a
//! normalized [`CpuIntervalSet`], computes the complementary set over
//! `[0, cpu_count)`, and renders either back to the canonical kernel
//! cpu-list syntax. It also provides the [`CpuIsolation`] collaborator that
//! moves tasks off the selected CPUs and pins the deadline workers there.
//!
//! # Example
//!
//! ```
//! use cyclicdl_cpuset::parse;
//!
//! let selected = parse("0,2-4,5", 8)?;
//! assert_eq!(selected.to_string(), "0,2-5");
//! assert_eq!(selected.complement(8).to_string(), "1,6-7");
//! # Ok::<(), cyclicdl_cpuset::CpuSetError>(())
//! ```

#![deny(unsafe_op_in_unsafe_fn, clippy::unwrap_used)]
#![warn(missing_docs, missing_debug_implementations)]

pub mod interval;
pub mod isolation;
pub mod parse;
pub mod plan;
pub mod prelude;

pub use cyclicdl_errors::CpuSetError;
pub use interval::{CpuInterval, CpuIntervalSet};
pub use isolation::{CgroupCpuset, CpuIsolation, NoIsolation};
pub use parse::parse;
pub use plan::{AffinitySelection, CpuPlan};
