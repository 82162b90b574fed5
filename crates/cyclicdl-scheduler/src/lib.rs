//! SCHED_DEADLINE latency measurement.
//!
//! A [`Coordinator`] computes one [`WorkerSchedule`] per worker, spawns a
//! [`DeadlineWorker`] thread for each and walks all of them through a
//! barrier-sequenced startup: read attributes, prepare, apply, isolate.
//! No worker starts measuring until every worker runs under the deadline
//! policy; a single failure aborts the whole cohort without stranding any
//! thread at a barrier.
//!
//! Once running, each worker measures how late it starts relative to its
//! intended period boundary and records the result in its own lock-free
//! [`WorkerStats`](cyclicdl_atomic::WorkerStats). The coordinator polls
//! those for a live view and collects them into a [`RunReport`].
//!
//! OS access goes through [`SchedBackend`] and time through
//! [`TimeSource`], so the protocol can be driven by a scripted backend and
//! a manual clock in tests.

#![deny(unsafe_op_in_unsafe_fn, clippy::unwrap_used)]
#![warn(missing_docs, missing_debug_implementations)]

pub mod backend;
pub mod barrier;
pub mod clock;
pub mod config;
pub mod coordinator;
pub mod hrtick;
pub mod prelude;
pub mod report;
pub mod rt_setup;
pub mod schedule;
pub mod shutdown;
pub mod worker;

pub mod fallback;
#[cfg(target_os = "linux")]
pub mod linux;

pub use backend::{SCHED_DEADLINE, SchedAttr, SchedBackend, platform_backend};
pub use barrier::PhaseBarrier;
pub use clock::{ManualClock, MonotonicClock, TimeSource};
pub use config::RunConfig;
pub use coordinator::Coordinator;
pub use report::{LiveView, NullView, RunReport, WorkerReport};
pub use rt_setup::RTSetup;
pub use schedule::{WorkerSchedule, compute_schedules, duty_percent};
pub use shutdown::{ShutdownFlag, install_signal_handler};
pub use worker::{DeadlineWorker, WorkerExit};
