//! Fallback backend for platforms without `SCHED_DEADLINE`.

use std::sync::atomic::{AtomicI32, Ordering};

use cyclicdl_errors::{SchedError, SchedResult};

use crate::backend::{SchedAttr, SchedBackend};

/// Backend whose attribute calls always report [`SchedError::Unsupported`].
#[derive(Debug)]
pub struct FallbackBackend {
    next_tid: AtomicI32,
}

impl Default for FallbackBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl FallbackBackend {
    /// Create a new fallback backend.
    pub fn new() -> Self {
        Self {
            next_tid: AtomicI32::new(1),
        }
    }
}

thread_local! {
    static TID: std::cell::Cell<i32> = const { std::cell::Cell::new(0) };
}

impl SchedBackend for FallbackBackend {
    fn current_tid(&self) -> i32 {
        TID.with(|tid| {
            if tid.get() == 0 {
                tid.set(self.next_tid.fetch_add(1, Ordering::Relaxed));
            }
            tid.get()
        })
    }

    fn get_attr(&self) -> SchedResult<SchedAttr> {
        Err(SchedError::Unsupported)
    }

    fn set_attr(&self, _attr: &SchedAttr) -> SchedResult {
        Err(SchedError::Unsupported)
    }

    fn yield_period(&self) {
        std::thread::yield_now();
    }

    fn cpu_count(&self) -> usize {
        num_cpus::get()
    }

    fn enable_hrtick(&self) -> bool {
        false
    }
}
