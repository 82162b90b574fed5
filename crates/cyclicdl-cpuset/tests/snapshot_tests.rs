//! Snapshot tests for rendered CPU lists and parse error messages.

use cyclicdl_cpuset::{AffinitySelection, CpuPlan, CpuSetError, parse};
use insta::assert_snapshot;

fn parse_error(expr: &str) -> String {
    match parse(expr, 8) {
        Err(e) => e.to_string(),
        Ok(set) => format!("unexpectedly parsed as {set}"),
    }
}

mod render_snapshots {
    use super::*;

    #[test]
    fn test_adjacent_and_overlapping_ranges_merge() -> Result<(), CpuSetError> {
        assert_snapshot!(parse("0,2-4,5", 8)?.render(), @"0,2-5");
        assert_snapshot!(parse("6,1-3,3-4,0", 8)?.render(), @"0-4,6");
        Ok(())
    }

    #[test]
    fn test_complement_render() -> Result<(), CpuSetError> {
        assert_snapshot!(parse("0,2-5", 8)?.complement(8).render(), @"1,6-7");
        assert_snapshot!(parse("3", 8)?.complement(8).render(), @"0-2,4-7");
        Ok(())
    }

    #[test]
    fn test_isolated_plan_strings() -> Result<(), CpuSetError> {
        let plan = CpuPlan::resolve(&AffinitySelection::Cpus("1-2".into()), 4)?;
        let rendered = match plan {
            CpuPlan::Isolated { selected, others, .. } => format!("{selected} | {others}"),
            CpuPlan::All { cpu_count } => format!("all {cpu_count}"),
        };
        assert_snapshot!(rendered, @"1-2 | 0,3");
        Ok(())
    }
}

mod error_snapshots {
    use super::*;

    #[test]
    fn test_reversed_range() {
        assert_snapshot!(parse_error("3-1"), @"Invalid CPU range '3-1': end is below start");
    }

    #[test]
    fn test_non_numeric_token() {
        assert_snapshot!(parse_error("0,x"), @"Invalid CPU range 'x': not a non-negative integer");
    }

    #[test]
    fn test_cpu_beyond_system() {
        assert_snapshot!(parse_error("2-9"), @"CPU 9 is out of range (system has 8 CPUs)");
    }
}
