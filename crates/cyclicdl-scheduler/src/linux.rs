//! Linux system calls for deadline scheduling.
#![expect(unsafe_code, reason = "raw sched_{get,set}attr and clock syscalls")]

use std::io;
use std::mem::{MaybeUninit, size_of};

use cyclicdl_errors::{SchedError, SchedResult};
use cyclicdl_tracing::debugfs;

use crate::backend::{SchedAttr, SchedBackend};
use crate::hrtick::{HrtickPlan, enable_hrtick_at};

/// Kernel `struct sched_attr`, first published layout.
#[repr(C)]
#[derive(Debug, Default, Clone, Copy)]
struct RawSchedAttr {
    size: u32,
    sched_policy: u32,
    sched_flags: u64,
    sched_nice: i32,
    sched_priority: u32,
    sched_runtime: u64,
    sched_deadline: u64,
    sched_period: u64,
}

#[expect(clippy::cast_possible_truncation, reason = "struct is 48 bytes")]
const RAW_SCHED_ATTR_SIZE: u32 = size_of::<RawSchedAttr>() as u32;

impl From<RawSchedAttr> for SchedAttr {
    fn from(raw: RawSchedAttr) -> Self {
        Self {
            policy: raw.sched_policy,
            flags: raw.sched_flags,
            nice: raw.sched_nice,
            priority: raw.sched_priority,
            runtime_ns: raw.sched_runtime,
            deadline_ns: raw.sched_deadline,
            period_ns: raw.sched_period,
        }
    }
}

impl From<&SchedAttr> for RawSchedAttr {
    fn from(attr: &SchedAttr) -> Self {
        Self {
            size: RAW_SCHED_ATTR_SIZE,
            sched_policy: attr.policy,
            sched_flags: attr.flags,
            sched_nice: attr.nice,
            sched_priority: attr.priority,
            sched_runtime: attr.runtime_ns,
            sched_deadline: attr.deadline_ns,
            sched_period: attr.period_ns,
        }
    }
}

fn last_errno() -> i32 {
    io::Error::last_os_error().raw_os_error().unwrap_or(0)
}

/// `CLOCK_MONOTONIC_RAW` in microseconds.
#[inline]
pub(crate) fn monotonic_raw_us() -> u64 {
    let mut ts = MaybeUninit::<libc::timespec>::zeroed();
    // SAFETY: `ts` is valid for writes and the clock id is a constant.
    let ret = unsafe { libc::clock_gettime(libc::CLOCK_MONOTONIC_RAW, ts.as_mut_ptr()) };
    if ret != 0 {
        return 0;
    }
    // SAFETY: clock_gettime succeeded and filled the struct.
    let ts = unsafe { ts.assume_init() };
    let secs = u64::try_from(ts.tv_sec).unwrap_or(0);
    let nanos = u64::try_from(ts.tv_nsec).unwrap_or(0);
    secs.saturating_mul(1_000_000).saturating_add(nanos / 1_000)
}

/// Lock every current and future page of the process.
pub(crate) fn lock_all_memory() -> io::Result<()> {
    // SAFETY: mlockall takes only flags.
    let ret = unsafe { libc::mlockall(libc::MCL_CURRENT | libc::MCL_FUTURE) };
    if ret != 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}

/// Backend issuing the real syscalls.
#[derive(Debug, Default, Clone, Copy)]
pub struct LinuxBackend;

impl LinuxBackend {
    /// Create the backend.
    pub const fn new() -> Self {
        Self
    }
}

impl SchedBackend for LinuxBackend {
    fn current_tid(&self) -> i32 {
        // SAFETY: gettid has no arguments and cannot fail.
        let tid = unsafe { libc::syscall(libc::SYS_gettid) };
        i32::try_from(tid).unwrap_or(0)
    }

    fn get_attr(&self) -> SchedResult<SchedAttr> {
        let mut raw = RawSchedAttr::default();
        // SAFETY: `raw` is a live, correctly sized sched_attr for the
        // calling thread (pid 0).
        let ret = unsafe {
            libc::syscall(
                libc::SYS_sched_getattr,
                0,
                &raw mut raw,
                RAW_SCHED_ATTR_SIZE,
                0,
            )
        };
        if ret != 0 {
            return Err(SchedError::AttributeQueryFailed { errno: last_errno() });
        }
        Ok(raw.into())
    }

    fn set_attr(&self, attr: &SchedAttr) -> SchedResult {
        let raw = RawSchedAttr::from(attr);
        // SAFETY: `raw` is a live sched_attr whose size field matches its
        // layout; the kernel only reads it.
        let ret = unsafe { libc::syscall(libc::SYS_sched_setattr, 0, &raw const raw, 0) };
        if ret != 0 {
            return Err(SchedError::AttributeApplyFailed { errno: last_errno() });
        }
        Ok(())
    }

    fn yield_period(&self) {
        // SAFETY: sched_yield has no arguments.
        let ret = unsafe { libc::sched_yield() };
        if ret != 0 {
            tracing::trace!(errno = last_errno(), "sched_yield failed");
        }
    }

    fn cpu_count(&self) -> usize {
        // SAFETY: sysconf only reads a constant.
        let configured = unsafe { libc::sysconf(libc::_SC_NPROCESSORS_CONF) };
        usize::try_from(configured)
            .ok()
            .filter(|&n| n > 0)
            .unwrap_or_else(num_cpus::get)
    }

    fn enable_hrtick(&self) -> bool {
        let Some(features) = debugfs::find_debugfs().and_then(debugfs::sched_features_path) else {
            tracing::error!("debugfs is not mounted, cannot enable HRTICK");
            return false;
        };
        match enable_hrtick_at(&features) {
            Ok(HrtickPlan::Enable(name)) => {
                tracing::info!(feature = name, "Enabled high resolution ticks");
                true
            }
            Ok(HrtickPlan::AlreadyEnabled) => true,
            Ok(HrtickPlan::NotPresent) => {
                tracing::debug!(path = %features.display(), "No HRTICK feature toggle in kernel");
                true
            }
            Err(e) => {
                tracing::error!(path = %features.display(), error = %e, "Failed to enable HRTICK");
                false
            }
        }
    }
}
