//! Fuzzes the HRTICK decision over arbitrary sched_features contents.
//!
//! Run with:
//!   cargo +nightly fuzz run fuzz_sched_features

#![deny(static_mut_refs)]
#![no_main]

use cyclicdl_scheduler::hrtick::{HrtickPlan, plan_hrtick};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let features = String::from_utf8_lossy(data);
    if let HrtickPlan::Enable(name) = plan_hrtick(&features) {
        // Only ever asks to enable a feature the kernel listed as disabled.
        let disabled = format!("NO_{name}");
        assert!(features.split_ascii_whitespace().any(|f| f == disabled));
    }
});
