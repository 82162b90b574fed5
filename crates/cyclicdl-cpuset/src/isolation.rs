//! CPU isolation through the cgroup v1 cpuset controller.
//!
//! [`CgroupCpuset`] creates two cpusets below `<root>/cpuset`:
//!
//! - `my_cpuset_all` on the non-selected CPUs, receiving every task of the
//!   root cpuset
//! - `my_cpuset` on the selected CPUs, exclusive, receiving only the
//!   deadline workers
//!
//! and clears load balancing on the root cpuset so the selected CPUs form
//! their own root domain. [`CpuIsolation::teardown`] undoes all of it.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use cyclicdl_errors::CpuSetError;

/// Name of the cpuset holding every task except the workers.
pub const CPUSET_ALL: &str = "my_cpuset_all";
/// Name of the cpuset holding the deadline workers.
pub const CPUSET_LOCAL: &str = "my_cpuset";

const DEFAULT_CGROUP_ROOT: &str = "/sys/fs/cgroup";
const DESTROY_RETRIES: u32 = 5;

/// Confines the deadline workers to a set of CPUs.
pub trait CpuIsolation: Send {
    /// Move every task off `selected` and pin `tids` there.
    ///
    /// `selected` and `others` are canonical cpu-list strings.
    fn isolate(&mut self, selected: &str, others: &str, tids: &[i32]) -> Result<(), CpuSetError>;

    /// Undo [`CpuIsolation::isolate`]. Best effort; never fails.
    fn teardown(&mut self);
}

/// Isolation that does nothing, used when all CPUs are in play.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoIsolation;

impl CpuIsolation for NoIsolation {
    fn isolate(&mut self, _selected: &str, _others: &str, _tids: &[i32]) -> Result<(), CpuSetError> {
        Ok(())
    }

    fn teardown(&mut self) {}
}

/// cgroup v1 cpuset isolation.
#[derive(Debug, Clone)]
pub struct CgroupCpuset {
    root: PathBuf,
    mount: bool,
    retry_delay: Duration,
    active: bool,
}

impl Default for CgroupCpuset {
    fn default() -> Self {
        Self::new()
    }
}

impl CgroupCpuset {
    /// Isolation below `/sys/fs/cgroup`, mounting the hierarchy if needed.
    pub fn new() -> Self {
        Self {
            root: PathBuf::from(DEFAULT_CGROUP_ROOT),
            mount: true,
            retry_delay: Duration::from_secs(1),
            active: false,
        }
    }

    /// Use a different cgroup root.
    #[must_use]
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = root.into();
        self
    }

    /// Enable or disable mounting tmpfs and the cpuset controller.
    #[must_use]
    pub fn with_mount(mut self, mount: bool) -> Self {
        self.mount = mount;
        self
    }

    /// Delay between moving tasks out and removing a cpuset directory.
    #[must_use]
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// Path of the cpuset controller hierarchy.
    pub fn cpuset_path(&self) -> PathBuf {
        self.root.join("cpuset")
    }

    fn prepare_root(&self) -> Result<(), CpuSetError> {
        let cpuset = self.cpuset_path();
        if self.mount {
            mount_hierarchy(&self.root, &cpuset)?;
        } else if !cpuset.exists() {
            fs::create_dir(&cpuset)
                .map_err(|e| CpuSetError::isolation("mkdir", cpuset.display().to_string(), e))?;
        }

        write_control(&cpuset, "cpuset.cpu_exclusive", "1")?;
        write_control(&cpuset, "cpuset.sched_load_balance", "0")?;
        Ok(())
    }

    fn make_cpuset(&self, name: &str, cpus: &str, flags: CpusetFlags<'_>) -> Result<(), CpuSetError> {
        tracing::info!(cpuset = name, cpus, "Creating cpuset");
        let cpuset = self.cpuset_path();
        let path = cpuset.join(name);

        if !path.exists() {
            fs::create_dir(&path)
                .map_err(|e| CpuSetError::isolation("mkdir", path.display().to_string(), e))?;
        }

        write_control(&path, "cpuset.cpus", cpus)?;
        write_control(&path, "cpuset.mems", "0")?;
        if flags.cpu_exclusive {
            write_control(&path, "cpuset.cpu_exclusive", "1")?;
        }
        write_control(&path, "cpuset.sched_load_balance", "1")?;
        write_control(&path, "cgroup.clone_children", "1")?;

        match flags.tasks {
            TaskMove::All => move_all_tasks(&cpuset.join("tasks"), &path.join("tasks")),
            TaskMove::Only(tids) => {
                let tasks = path.join("tasks");
                let mut file = open_control(&tasks)?;
                for tid in tids {
                    write_pid(&mut file, *tid).map_err(|e| {
                        CpuSetError::isolation("move task into", tasks.display().to_string(), e)
                    })?;
                }
                Ok(())
            }
        }
    }

    fn destroy_cpuset(&self, name: &str, announce: bool) {
        let cpuset = self.cpuset_path();
        let path = cpuset.join(name);
        if !path.exists() {
            return;
        }
        tracing::info!(cpuset = name, "Removing cpuset");

        let mut retry = 0;
        loop {
            let pids = match read_pids(&path.join("tasks")) {
                Ok(pids) => pids,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Failed to read cpuset tasks");
                    return;
                }
            };
            let root_tasks = cpuset.join("tasks");
            let mut file = match OpenOptions::new().write(true).open(&root_tasks) {
                Ok(file) => file,
                Err(e) => {
                    tracing::warn!(path = %root_tasks.display(), error = %e, "Failed to open root tasks");
                    return;
                }
            };
            for pid in pids {
                if announce {
                    tracing::info!(pid, cpuset = name, "Moving task out of cpuset");
                }
                // Tasks may have exited since the read.
                if let Err(e) = write_pid(&mut file, pid) {
                    tracing::trace!(pid, error = %e, "Task not moved");
                }
            }
            drop(file);

            std::thread::sleep(self.retry_delay);
            match fs::remove_dir(&path) {
                Ok(()) => return,
                Err(e) if retry < DESTROY_RETRIES => {
                    retry += 1;
                    tracing::debug!(cpuset = name, attempt = retry, error = %e, "Retrying cpuset removal");
                }
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Failed to remove cpuset");
                    return;
                }
            }
        }
    }
}

impl CpuIsolation for CgroupCpuset {
    fn isolate(&mut self, selected: &str, others: &str, tids: &[i32]) -> Result<(), CpuSetError> {
        self.active = true;
        self.prepare_root()?;
        self.make_cpuset(
            CPUSET_ALL,
            others,
            CpusetFlags {
                cpu_exclusive: false,
                tasks: TaskMove::All,
            },
        )?;
        self.make_cpuset(
            CPUSET_LOCAL,
            selected,
            CpusetFlags {
                cpu_exclusive: true,
                tasks: TaskMove::Only(tids),
            },
        )
    }

    fn teardown(&mut self) {
        if !std::mem::take(&mut self.active) {
            return;
        }
        let cpuset = self.cpuset_path();
        for (control, value) in [("cpuset.cpu_exclusive", "0"), ("cpuset.sched_load_balance", "1")] {
            if let Err(e) = write_control(&cpuset, control, value) {
                tracing::warn!(error = %e, "Failed to restore root cpuset");
            }
        }
        self.destroy_cpuset(CPUSET_ALL, false);
        self.destroy_cpuset(CPUSET_LOCAL, true);
    }
}

struct CpusetFlags<'a> {
    cpu_exclusive: bool,
    tasks: TaskMove<'a>,
}

enum TaskMove<'a> {
    All,
    Only(&'a [i32]),
}

/// Control files must already exist; the kernel creates them with the
/// directory.
fn open_control(path: &Path) -> Result<File, CpuSetError> {
    OpenOptions::new()
        .write(true)
        .open(path)
        .map_err(|e| CpuSetError::isolation("open", path.display().to_string(), e))
}

fn write_control(dir: &Path, name: &str, value: &str) -> Result<(), CpuSetError> {
    let path = dir.join(name);
    let mut file = open_control(&path)?;
    file.write_all(value.as_bytes())
        .map_err(|e| CpuSetError::isolation("write", path.display().to_string(), e))
}

/// One pid per write; the kernel rejects a lone newline.
fn write_pid(file: &mut File, pid: i32) -> io::Result<()> {
    file.write_all(format!("{pid}\n").as_bytes())
}

fn read_pids(path: &Path) -> io::Result<Vec<i32>> {
    let contents = fs::read_to_string(path)?;
    Ok(contents
        .split_ascii_whitespace()
        .map_while(|pid| pid.parse().ok())
        .collect())
}

fn move_all_tasks(from: &Path, to: &Path) -> Result<(), CpuSetError> {
    let pids = read_pids(from)
        .map_err(|e| CpuSetError::isolation("read", from.display().to_string(), e))?;
    let mut file = open_control(to)?;
    for pid in pids {
        match write_pid(&mut file, pid) {
            Ok(()) => {}
            // Anything but a full cpuset means the task went away or is pinned.
            Err(e) if e.kind() == io::ErrorKind::StorageFull => {
                return Err(CpuSetError::isolation("move tasks into", to.display().to_string(), e));
            }
            Err(e) => tracing::trace!(pid, error = %e, "Skipping task"),
        }
    }
    Ok(())
}

#[cfg(target_os = "linux")]
fn mount_hierarchy(root: &Path, cpuset: &Path) -> Result<(), CpuSetError> {
    let mounted = |path: &Path, magic| {
        sys::fs_magic(path)
            .map(|found| found == magic)
            .map_err(|e| CpuSetError::isolation("statfs", path.display().to_string(), e))
    };

    if !mounted(root, sys::TMPFS_MAGIC)? {
        sys::mount("cgroup_root", root, "tmpfs", None)
            .map_err(|e| CpuSetError::isolation("mount", root.display().to_string(), e))?;
    }
    if !cpuset.exists() {
        fs::create_dir(cpuset)
            .map_err(|e| CpuSetError::isolation("mkdir", cpuset.display().to_string(), e))?;
    }
    if !mounted(cpuset, sys::CGROUP_SUPER_MAGIC)? {
        sys::mount("cpuset", cpuset, "cgroup", Some("cpuset"))
            .map_err(|e| CpuSetError::isolation("mount", cpuset.display().to_string(), e))?;
    }
    Ok(())
}

#[cfg(not(target_os = "linux"))]
fn mount_hierarchy(root: &Path, _cpuset: &Path) -> Result<(), CpuSetError> {
    Err(CpuSetError::isolation(
        "mount",
        root.display().to_string(),
        io::Error::from(io::ErrorKind::Unsupported),
    ))
}

#[cfg(target_os = "linux")]
#[expect(unsafe_code, reason = "statfs(2) and mount(2) have no safe std wrapper")]
mod sys {
    use std::ffi::CString;
    use std::io;
    use std::mem::MaybeUninit;
    use std::os::unix::ffi::OsStrExt;
    use std::path::Path;

    pub(super) const TMPFS_MAGIC: i64 = 0x0102_1994;
    pub(super) const CGROUP_SUPER_MAGIC: i64 = 0x0027_e0eb;

    fn c_path(path: &Path) -> io::Result<CString> {
        CString::new(path.as_os_str().as_bytes()).map_err(io::Error::other)
    }

    fn c_str(s: &str) -> io::Result<CString> {
        CString::new(s).map_err(io::Error::other)
    }

    pub(super) fn fs_magic(path: &Path) -> io::Result<i64> {
        let path = c_path(path)?;
        let mut st = MaybeUninit::<libc::statfs>::zeroed();
        // SAFETY: `path` is NUL-terminated and `st` is valid for writes.
        let ret = unsafe { libc::statfs(path.as_ptr(), st.as_mut_ptr()) };
        if ret < 0 {
            return Err(io::Error::last_os_error());
        }
        // SAFETY: statfs succeeded and filled the struct.
        let st = unsafe { st.assume_init() };
        Ok(i64::from(st.f_type))
    }

    pub(super) fn mount(source: &str, target: &Path, fstype: &str, data: Option<&str>) -> io::Result<()> {
        let source = c_str(source)?;
        let target = c_path(target)?;
        let fstype = c_str(fstype)?;
        let data = data.map(c_str).transpose()?;
        let data_ptr = data
            .as_ref()
            .map_or(std::ptr::null(), |d| d.as_ptr().cast::<libc::c_void>());
        // SAFETY: every pointer is either null or a live NUL-terminated string.
        let ret = unsafe { libc::mount(source.as_ptr(), target.as_ptr(), fstype.as_ptr(), 0, data_ptr) };
        if ret < 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(())
    }
}
