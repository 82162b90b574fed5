//! Prelude module for common cpuset types.

pub use crate::interval::{CpuInterval, CpuIntervalSet};
pub use crate::isolation::{CgroupCpuset, CpuIsolation, NoIsolation};
pub use crate::parse::parse;
pub use crate::plan::{AffinitySelection, CpuPlan};
pub use cyclicdl_errors::CpuSetError;
