//! High resolution tick support for short deadline runtimes.
//!
//! The kernel exposes scheduler feature toggles as a whitespace-separated
//! list where a disabled feature is prefixed with `NO_`. Writing the bare
//! name enables it. Kernels with `HRTICK_DL` use it for deadline tasks;
//! older ones only have `HRTICK`.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

const FEATURES: [(&str, &str); 2] = [("HRTICK_DL", "NO_HRTICK_DL"), ("HRTICK", "NO_HRTICK")];

/// What has to happen to get high resolution ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HrtickPlan {
    /// The feature is already on
    AlreadyEnabled,
    /// The named feature must be written to enable it
    Enable(&'static str),
    /// The kernel has no such toggle
    NotPresent,
}

/// Decide from the contents of the features file.
pub fn plan_hrtick(features: &str) -> HrtickPlan {
    let has = |name: &str| features.split_ascii_whitespace().any(|f| f == name);
    for (on, off) in FEATURES {
        if has(on) {
            return HrtickPlan::AlreadyEnabled;
        }
        if has(off) {
            return HrtickPlan::Enable(on);
        }
    }
    HrtickPlan::NotPresent
}

/// Enable high resolution ticks through the features file at `path`.
///
/// # Errors
///
/// Fails if the file cannot be read or the feature cannot be written.
pub fn enable_hrtick_at(path: &Path) -> io::Result<HrtickPlan> {
    let features = fs::read_to_string(path)?;
    let plan = plan_hrtick(&features);
    if let HrtickPlan::Enable(name) = plan {
        OpenOptions::new().write(true).open(path)?.write_all(name.as_bytes())?;
    }
    Ok(plan)
}
