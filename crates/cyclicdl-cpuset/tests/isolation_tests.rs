//! Cpuset isolation against a fake cgroup tree.
//!
//! The kernel creates control files together with a cpuset directory; a
//! temporary directory does not, so every file the isolation writes is
//! created up front.

use std::fs;
use std::path::Path;
use std::time::Duration;

use cyclicdl_cpuset::{CgroupCpuset, CpuIsolation, CpuSetError};
use tempfile::TempDir;

type TestResult = Result<(), Box<dyn std::error::Error>>;

const CHILD_FILES: &[&str] = &[
    "cpuset.cpus",
    "cpuset.mems",
    "cpuset.cpu_exclusive",
    "cpuset.sched_load_balance",
    "cgroup.clone_children",
    "tasks",
];

fn fake_root(with_children: bool) -> Result<TempDir, std::io::Error> {
    let dir = tempfile::tempdir()?;
    let cpuset = dir.path().join("cpuset");
    fs::create_dir(&cpuset)?;
    fs::write(cpuset.join("cpuset.cpu_exclusive"), "")?;
    fs::write(cpuset.join("cpuset.sched_load_balance"), "")?;
    fs::write(cpuset.join("tasks"), "100\n200\n")?;

    if with_children {
        for child in ["my_cpuset_all", "my_cpuset"] {
            let path = cpuset.join(child);
            fs::create_dir(&path)?;
            for file in CHILD_FILES {
                fs::write(path.join(file), "")?;
            }
        }
    }
    Ok(dir)
}

fn isolation(root: &Path) -> CgroupCpuset {
    CgroupCpuset::new()
        .with_root(root)
        .with_mount(false)
        .with_retry_delay(Duration::ZERO)
}

fn read(root: &Path, rel: &str) -> Result<String, std::io::Error> {
    fs::read_to_string(root.join("cpuset").join(rel))
}

#[test]
fn test_isolate_writes_both_cpusets() -> TestResult {
    let dir = fake_root(true)?;
    let mut iso = isolation(dir.path());

    iso.isolate("2-3", "0-1", &[11, 12])?;

    assert_eq!(read(dir.path(), "cpuset.cpu_exclusive")?, "1");
    assert_eq!(read(dir.path(), "cpuset.sched_load_balance")?, "0");

    assert_eq!(read(dir.path(), "my_cpuset_all/cpuset.cpus")?, "0-1");
    assert_eq!(read(dir.path(), "my_cpuset_all/cpuset.mems")?, "0");
    assert_eq!(read(dir.path(), "my_cpuset_all/cpuset.cpu_exclusive")?, "");
    assert_eq!(read(dir.path(), "my_cpuset_all/cpuset.sched_load_balance")?, "1");
    assert_eq!(read(dir.path(), "my_cpuset_all/cgroup.clone_children")?, "1");
    assert_eq!(read(dir.path(), "my_cpuset_all/tasks")?, "100\n200\n");

    assert_eq!(read(dir.path(), "my_cpuset/cpuset.cpus")?, "2-3");
    assert_eq!(read(dir.path(), "my_cpuset/cpuset.cpu_exclusive")?, "1");
    assert_eq!(read(dir.path(), "my_cpuset/tasks")?, "11\n12\n");
    Ok(())
}

#[test]
fn test_missing_control_file_is_reported() -> TestResult {
    let dir = fake_root(false)?;
    let mut iso = isolation(dir.path());

    match iso.isolate("1", "0", &[7]) {
        Err(CpuSetError::Isolation { operation, path, .. }) => {
            assert_eq!(operation, "open");
            assert!(path.ends_with("my_cpuset_all/cpuset.cpus"), "path was {path}");
        }
        other => panic!("expected isolation error, got {other:?}"),
    }
    iso.teardown();
    Ok(())
}

#[test]
fn test_missing_root_controls_fail_before_creating_cpusets() -> TestResult {
    let dir = tempfile::tempdir()?;
    let mut iso = isolation(dir.path());

    let result = iso.isolate("1", "0", &[7]);
    assert!(matches!(result, Err(CpuSetError::Isolation { operation: "open", .. })));
    assert!(!dir.path().join("cpuset").join("my_cpuset").exists());
    Ok(())
}

#[test]
fn test_teardown_restores_root_flags() -> TestResult {
    let dir = fake_root(true)?;
    let mut iso = isolation(dir.path());
    iso.isolate("1", "0", &[7])?;

    iso.teardown();

    assert_eq!(read(dir.path(), "cpuset.cpu_exclusive")?, "0");
    assert_eq!(read(dir.path(), "cpuset.sched_load_balance")?, "1");
    // Regular files keep the fake directories non-empty, so removal gives up.
    assert!(dir.path().join("cpuset").join("my_cpuset").exists());
    Ok(())
}

#[test]
fn test_teardown_is_idempotent() -> TestResult {
    let dir = fake_root(true)?;
    let mut iso = isolation(dir.path());
    iso.isolate("1", "0", &[7])?;
    iso.teardown();

    fs::write(dir.path().join("cpuset").join("cpuset.cpu_exclusive"), "x")?;
    iso.teardown();
    assert_eq!(read(dir.path(), "cpuset.cpu_exclusive")?, "x");
    Ok(())
}
