//! Fuzzes the cpu-list parser and the interval set it builds.
//!
//! Run with:
//!   cargo +nightly fuzz run fuzz_cpuset_parse

#![deny(static_mut_refs)]
#![no_main]

use cyclicdl_cpuset::CpuIntervalSet;
use libfuzzer_sys::fuzz_target;

const CPU_COUNT: usize = 4096;

fuzz_target!(|data: &[u8]| {
    let Ok(expr) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(set) = cyclicdl_cpuset::parse(expr, CPU_COUNT) else {
        return;
    };

    // Rendering is canonical: parsing it back yields the same set.
    let rendered = set.render();
    let reparsed: CpuIntervalSet = match rendered.parse() {
        Ok(set) => set,
        Err(e) => panic!("rendered set {rendered:?} does not parse: {e}"),
    };
    assert_eq!(reparsed, set);

    // The complement partitions the CPU range.
    let complement = set.complement(CPU_COUNT);
    assert_eq!(complement.complement(CPU_COUNT), set);
    let selected = set.total_cpus(CPU_COUNT).unwrap_or(0);
    let others = complement.total_cpus(CPU_COUNT).unwrap_or(0);
    assert_eq!(selected + others, CPU_COUNT);
});
