//! Common imports for driving a run.

pub use crate::backend::{SchedAttr, SchedBackend, platform_backend};
pub use crate::clock::{MonotonicClock, TimeSource};
pub use crate::config::RunConfig;
pub use crate::coordinator::Coordinator;
pub use crate::report::{LiveView, NullView, RunReport, WorkerReport};
pub use crate::shutdown::ShutdownFlag;
pub use cyclicdl_cpuset::{AffinitySelection, CpuPlan};
pub use cyclicdl_errors::{CyclicError, SchedError};
