//! Prelude module for convenient error handling imports.
//!
//! # Example
//!
//! ```
//! use cyclicdl_errors::prelude::*;
//!
//! fn apply() -> SchedResult {
//!     Err(SchedError::AttributeApplyFailed { errno: 1 })
//! }
//!
//! fn run() -> Result<()> {
//!     apply()?;
//!     Ok(())
//! }
//!
//! assert!(run().is_err());
//! ```

pub use crate::{
    Result, SchedResult,
    common::{CyclicError, ErrorCategory},
    cpuset::CpuSetError,
    sched::SchedError,
};
