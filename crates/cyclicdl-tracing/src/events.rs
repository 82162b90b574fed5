//! Trace event definitions
//!
//! All timestamps are monotonic microseconds.

use core::fmt;

/// One annotation from a deadline worker's cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraceEvent {
    /// A cycle began measuring.
    CycleStart {
        /// Time the cycle started
        now: u64,
        /// `now - period`, the latency recorded for the cycle
        offset: u64,
        /// Intended period boundary
        period: u64,
        /// Next intended period boundary
        next: u64,
    },
    /// The worker woke before its intended boundary and resynced to `now`.
    PeriodAdjusted {
        /// Time the worker woke
        now: u64,
        /// Boundary it was expecting
        period: u64,
        /// `period - now`
        delta: u64,
        /// The adjustment exceeds half the deadline
        huge: bool,
    },
}

impl TraceEvent {
    /// Build a [`TraceEvent::PeriodAdjusted`], flagging deltas over half
    /// of `deadline_us`.
    #[must_use]
    pub fn period_adjusted(now: u64, period: u64, deadline_us: u64) -> Self {
        let delta = period.saturating_sub(now);
        TraceEvent::PeriodAdjusted {
            now,
            period,
            delta,
            huge: delta > deadline_us / 2,
        }
    }
}

impl fmt::Display for TraceEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            TraceEvent::CycleStart {
                now,
                offset,
                period,
                next,
            } => write!(f, "cycle start: now={now} offset={offset} period={period} next={next}"),
            TraceEvent::PeriodAdjusted {
                now,
                period,
                delta,
                huge,
            } => {
                write!(f, "period adjusted: now={now} period={period} delta={delta}")?;
                if huge {
                    f.write_str(" HUGE ADJUSTMENT")?;
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_huge_threshold_is_half_deadline() {
        assert_eq!(
            TraceEvent::period_adjusted(1_000, 1_500, 1_000),
            TraceEvent::PeriodAdjusted {
                now: 1_000,
                period: 1_500,
                delta: 500,
                huge: false
            }
        );
        assert!(matches!(
            TraceEvent::period_adjusted(1_000, 1_501, 1_000),
            TraceEvent::PeriodAdjusted { huge: true, .. }
        ));
    }
}
