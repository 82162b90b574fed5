//! Monotonic time sources in microseconds.

use std::sync::atomic::{AtomicU64, Ordering};

/// Source of monotonic microsecond timestamps.
pub trait TimeSource: Send + Sync {
    /// Current time in microseconds. Never decreases.
    fn now_us(&self) -> u64;
}

/// The OS monotonic clock.
///
/// On Linux this reads `CLOCK_MONOTONIC_RAW`, which is not slewed by NTP.
/// Elsewhere it counts from the first call in the process.
#[derive(Debug, Default, Clone, Copy)]
pub struct MonotonicClock;

impl MonotonicClock {
    /// Create a clock handle.
    pub const fn new() -> Self {
        Self
    }
}

#[cfg(target_os = "linux")]
impl TimeSource for MonotonicClock {
    #[inline]
    fn now_us(&self) -> u64 {
        crate::linux::monotonic_raw_us()
    }
}

#[cfg(not(target_os = "linux"))]
impl TimeSource for MonotonicClock {
    fn now_us(&self) -> u64 {
        use std::sync::OnceLock;
        use std::time::Instant;

        static EPOCH: OnceLock<Instant> = OnceLock::new();
        let epoch = *EPOCH.get_or_init(Instant::now);
        u64::try_from(epoch.elapsed().as_micros()).unwrap_or(u64::MAX)
    }
}

/// A clock that only moves when told to.
///
/// Every read advances the clock by `step` after returning the current
/// value, which lets a test give each cycle a known duration.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicU64,
    step: u64,
}

impl ManualClock {
    /// Clock frozen at `start`.
    pub const fn new(start: u64) -> Self {
        Self {
            now: AtomicU64::new(start),
            step: 0,
        }
    }

    /// Clock at `start` that advances `step` microseconds per read.
    pub const fn with_step(start: u64, step: u64) -> Self {
        Self {
            now: AtomicU64::new(start),
            step,
        }
    }

    /// Jump to `now`.
    pub fn set(&self, now: u64) {
        self.now.store(now, Ordering::SeqCst);
    }

    /// Move forward by `delta`.
    pub fn advance(&self, delta: u64) {
        self.now.fetch_add(delta, Ordering::SeqCst);
    }
}

impl TimeSource for ManualClock {
    fn now_us(&self) -> u64 {
        self.now.fetch_add(self.step, Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_monotonic_clock_never_goes_back() {
        let clock = MonotonicClock::new();
        let mut last = clock.now_us();
        for _ in 0..1_000 {
            let now = clock.now_us();
            assert!(now >= last);
            last = now;
        }
    }

    #[test]
    fn test_manual_clock_steps() {
        let clock = ManualClock::with_step(100, 10);
        assert_eq!(clock.now_us(), 100);
        assert_eq!(clock.now_us(), 110);
        clock.set(5);
        assert_eq!(clock.now_us(), 5);
    }

    #[test]
    fn test_manual_clock_frozen() {
        let clock = ManualClock::new(42);
        assert_eq!(clock.now_us(), 42);
        clock.advance(8);
        assert_eq!(clock.now_us(), 50);
        assert_eq!(clock.now_us(), 50);
    }
}
