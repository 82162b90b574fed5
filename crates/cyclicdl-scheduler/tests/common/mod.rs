//! Scripted scheduling backend and helpers shared by the integration tests.
//!
//! Workers are told apart by their thread name (`deadline-<index>`), which
//! the coordinator assigns when spawning them.

#![expect(dead_code, reason = "each test binary uses a different subset")]

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use cyclicdl_cpuset::{CpuIsolation, CpuSetError};
use cyclicdl_errors::{SchedError, SchedResult};
use cyclicdl_scheduler::{LiveView, SchedAttr, SchedBackend, WorkerReport};
use parking_lot::Mutex;

pub const EPERM: i32 = 1;
pub const EINVAL: i32 = 22;
pub const TID_BASE: i32 = 1_000;

pub fn worker_index() -> Option<usize> {
    thread::current().name()?.strip_prefix("deadline-")?.parse().ok()
}

#[derive(Debug, Default)]
pub struct ScriptedBackend {
    pub cpus: usize,
    pub hrtick: bool,
    pub fail_query: Option<usize>,
    pub fail_apply: Option<usize>,
    pub fail_exit_query: Option<usize>,
    queries: Mutex<HashMap<usize, usize>>,
    applied: Mutex<Vec<(usize, SchedAttr)>>,
    yields: AtomicUsize,
    hrtick_calls: AtomicUsize,
}

impl ScriptedBackend {
    pub fn new(cpus: usize) -> Self {
        Self {
            cpus,
            hrtick: true,
            ..Self::default()
        }
    }

    pub fn without_hrtick(mut self) -> Self {
        self.hrtick = false;
        self
    }

    pub fn failing_query(mut self, worker: usize) -> Self {
        self.fail_query = Some(worker);
        self
    }

    pub fn failing_apply(mut self, worker: usize) -> Self {
        self.fail_apply = Some(worker);
        self
    }

    pub fn failing_exit_query(mut self, worker: usize) -> Self {
        self.fail_exit_query = Some(worker);
        self
    }

    pub fn applied(&self) -> Vec<(usize, SchedAttr)> {
        let mut applied = self.applied.lock().clone();
        applied.sort_by_key(|(index, _)| *index);
        applied
    }

    pub fn yields(&self) -> usize {
        self.yields.load(Ordering::SeqCst)
    }

    pub fn hrtick_calls(&self) -> usize {
        self.hrtick_calls.load(Ordering::SeqCst)
    }
}

impl SchedBackend for ScriptedBackend {
    fn current_tid(&self) -> i32 {
        let index = worker_index().and_then(|i| i32::try_from(i).ok()).unwrap_or(-1);
        TID_BASE + index
    }

    fn get_attr(&self) -> SchedResult<SchedAttr> {
        let index = worker_index();
        let call = {
            let mut queries = self.queries.lock();
            let count = queries.entry(index.unwrap_or(usize::MAX)).or_insert(0);
            *count += 1;
            *count
        };
        let failing = if call == 1 { self.fail_query } else { self.fail_exit_query };
        if index.is_some() && index == failing {
            return Err(SchedError::AttributeQueryFailed { errno: EINVAL });
        }
        Ok(SchedAttr::default())
    }

    fn set_attr(&self, attr: &SchedAttr) -> SchedResult {
        let index = worker_index();
        if index.is_some() && index == self.fail_apply {
            return Err(SchedError::AttributeApplyFailed { errno: EPERM });
        }
        self.applied.lock().push((index.unwrap_or(usize::MAX), *attr));
        Ok(())
    }

    fn yield_period(&self) {
        self.yields.fetch_add(1, Ordering::SeqCst);
        thread::sleep(Duration::from_micros(200));
    }

    fn cpu_count(&self) -> usize {
        self.cpus
    }

    fn enable_hrtick(&self) -> bool {
        self.hrtick_calls.fetch_add(1, Ordering::SeqCst);
        self.hrtick
    }
}

#[derive(Debug, Default)]
pub struct IsolationLog {
    pub isolated: Mutex<Vec<(String, String, Vec<i32>)>>,
    pub torn_down: AtomicBool,
}

#[derive(Debug)]
pub struct RecordingIsolation {
    pub log: Arc<IsolationLog>,
    pub fail: bool,
}

impl CpuIsolation for RecordingIsolation {
    fn isolate(&mut self, selected: &str, others: &str, tids: &[i32]) -> Result<(), CpuSetError> {
        self.log
            .isolated
            .lock()
            .push((selected.to_string(), others.to_string(), tids.to_vec()));
        if self.fail {
            return Err(CpuSetError::isolation(
                "create cpuset",
                "/sys/fs/cgroup/cpuset/my_cpuset",
                std::io::Error::from_raw_os_error(EPERM),
            ));
        }
        Ok(())
    }

    fn teardown(&mut self) {
        self.log.torn_down.store(true, Ordering::SeqCst);
    }
}

#[derive(Debug, Default)]
pub struct CountingView {
    pub refreshes: usize,
    pub last: Vec<WorkerReport>,
}

impl LiveView for CountingView {
    fn refresh(&mut self, rows: &[WorkerReport]) {
        self.refreshes += 1;
        self.last = rows.to_vec();
    }
}

/// Run `f` on its own thread and fail instead of hanging forever.
pub fn within<T: Send + 'static>(limit: Duration, f: impl FnOnce() -> T + Send + 'static) -> Option<T> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        if tx.send(f()).is_err() {
            eprintln!("test receiver went away");
        }
    });
    rx.recv_timeout(limit).ok()
}
