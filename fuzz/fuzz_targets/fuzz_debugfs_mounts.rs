//! Fuzzes the /proc/mounts scanner used to locate debugfs.
//!
//! Run with:
//!   cargo +nightly fuzz run fuzz_debugfs_mounts

#![deny(static_mut_refs)]
#![no_main]

use cyclicdl_tracing::debugfs::find_mount;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Must never panic on arbitrary mount tables.
    let mounts = String::from_utf8_lossy(data);
    if let Some(path) = find_mount(&mounts, "debugfs") {
        assert!(!path.as_os_str().is_empty());
    }
});
