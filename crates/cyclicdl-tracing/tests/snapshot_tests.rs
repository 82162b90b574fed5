//! Snapshot tests for trace annotation formats

use cyclicdl_tracing::TraceEvent;

#[test]
fn test_cycle_start_snapshot() {
    let event = TraceEvent::CycleStart {
        now: 1_000_250,
        offset: 250,
        period: 1_000_000,
        next: 1_001_000,
    };
    insta::assert_snapshot!(event.to_string(), @"cycle start: now=1000250 offset=250 period=1000000 next=1001000");
}

#[test]
fn test_period_adjusted_snapshot() {
    let event = TraceEvent::period_adjusted(999_900, 1_000_000, 1_000);
    insta::assert_snapshot!(event.to_string(), @"period adjusted: now=999900 period=1000000 delta=100");
}

#[test]
fn test_huge_period_adjustment_snapshot() {
    let event = TraceEvent::period_adjusted(999_000, 1_000_000, 1_000);
    insta::assert_snapshot!(event.to_string(), @"period adjusted: now=999000 period=1000000 delta=1000 HUGE ADJUSTMENT");
}
