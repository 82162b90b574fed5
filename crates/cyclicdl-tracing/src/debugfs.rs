//! Locating debugfs.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Mount point of the first filesystem of type `fstype` in a
/// `/proc/mounts`-formatted table.
pub fn find_mount(mounts: &str, fstype: &str) -> Option<PathBuf> {
    mounts.lines().find_map(|line| {
        let mut fields = line.split_ascii_whitespace();
        let _source = fields.next()?;
        let target = fields.next()?;
        let kind = fields.next()?;
        (kind == fstype).then(|| PathBuf::from(target))
    })
}

/// Mount point of debugfs, looked up once per process.
pub fn find_debugfs() -> Option<&'static Path> {
    static DEBUGFS: OnceLock<Option<PathBuf>> = OnceLock::new();
    DEBUGFS
        .get_or_init(|| {
            let mounts = std::fs::read_to_string("/proc/mounts").ok()?;
            find_mount(&mounts, "debugfs")
        })
        .as_deref()
}

/// Path of the ftrace marker below a debugfs mount.
pub fn trace_marker_path(debugfs: &Path) -> PathBuf {
    debugfs.join("tracing").join("trace_marker")
}

/// Scheduler feature file below a debugfs mount: `sched/features` on
/// current kernels, `sched_features` on older ones.
pub fn sched_features_path(debugfs: &Path) -> Option<PathBuf> {
    [debugfs.join("sched").join("features"), debugfs.join("sched_features")]
        .into_iter()
        .find(|path| path.exists())
}

#[cfg(test)]
mod tests {
    use super::*;

    const MOUNTS: &str = "\
sysfs /sys sysfs rw,nosuid,nodev,noexec,relatime 0 0
proc /proc proc rw,nosuid,nodev,noexec,relatime 0 0
debugfs /sys/kernel/debug debugfs rw,nosuid,nodev,noexec,relatime 0 0
tracefs /sys/kernel/tracing tracefs rw,nosuid,nodev,noexec,relatime 0 0
";

    #[test]
    fn test_find_mount() {
        assert_eq!(find_mount(MOUNTS, "debugfs"), Some(PathBuf::from("/sys/kernel/debug")));
        assert_eq!(find_mount(MOUNTS, "tracefs"), Some(PathBuf::from("/sys/kernel/tracing")));
        assert_eq!(find_mount(MOUNTS, "cgroup"), None);
    }

    #[test]
    fn test_find_mount_skips_short_lines() {
        assert_eq!(find_mount("garbage\n\ndebugfs /d debugfs rw 0 0\n", "debugfs"), Some(PathBuf::from("/d")));
    }

    #[test]
    fn test_sched_features_prefers_new_layout() -> std::io::Result<()> {
        let dir = tempfile::tempdir()?;
        assert_eq!(sched_features_path(dir.path()), None);

        std::fs::write(dir.path().join("sched_features"), "")?;
        assert_eq!(sched_features_path(dir.path()), Some(dir.path().join("sched_features")));

        std::fs::create_dir(dir.path().join("sched"))?;
        std::fs::write(dir.path().join("sched").join("features"), "")?;
        assert_eq!(
            sched_features_path(dir.path()),
            Some(dir.path().join("sched").join("features"))
        );
        Ok(())
    }
}
