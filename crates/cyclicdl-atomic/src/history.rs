//! Fixed-capacity latency history for outlier tracking.
//!
//! [`HistoryBuffer`] is a single-producer, single-consumer ring of latency
//! samples. The worker pushes one sample per cycle; the reporting thread
//! drains the backlog into an [`OutlierTracker`] that remembers the largest
//! latency and the cycle it happened in.
//!
//! # Overflow
//!
//! The producer never waits. When it laps the consumer, the oldest unread
//! sample is overwritten and the overflow counter is bumped, so a slow
//! consumer shows up as a metric instead of as lost data nobody noticed.

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::sync::atomic::{AtomicU64, Ordering};

use crossbeam::utils::CachePadded;

/// Default number of history slots.
pub const DEFAULT_HISTORY_CAPACITY: usize = 16_384;

/// Ring buffer of per-cycle latencies.
#[derive(Debug)]
pub struct HistoryBuffer {
    samples: Box<[AtomicU64]>,
    mask: u64,
    write: CachePadded<AtomicU64>,
    read: CachePadded<AtomicU64>,
    overflows: AtomicU64,
}

impl HistoryBuffer {
    /// Create a buffer with at least `capacity` slots, rounded up to a
    /// power of two (minimum 2).
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(2).next_power_of_two();
        let samples: Vec<AtomicU64> = (0..capacity).map(|_| AtomicU64::new(0)).collect();
        Self {
            samples: samples.into_boxed_slice(),
            mask: capacity as u64 - 1,
            write: CachePadded::new(AtomicU64::new(0)),
            read: CachePadded::new(AtomicU64::new(0)),
            overflows: AtomicU64::new(0),
        }
    }

    /// Number of slots.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.samples.len()
    }

    /// Append a sample. Producer side only.
    pub fn push(&self, latency: u64) {
        let write = self.write.load(Ordering::Relaxed);
        let read = self.read.load(Ordering::Acquire);
        if write.wrapping_sub(read) >= self.mask + 1 {
            self.overflows.fetch_add(1, Ordering::Relaxed);
        }
        if let Some(slot) = self.slot(write) {
            slot.store(latency, Ordering::Relaxed);
        }
        self.write.store(write.wrapping_add(1), Ordering::Release);
    }

    /// Total samples pushed so far.
    #[must_use]
    pub fn written(&self) -> u64 {
        self.write.load(Ordering::Acquire)
    }

    /// Number of pushes that overwrote an unread sample.
    #[must_use]
    pub fn overflows(&self) -> u64 {
        self.overflows.load(Ordering::Relaxed)
    }

    /// Feed every unread sample into `tracker`. Consumer side only.
    ///
    /// Samples the producer already overwrote are skipped and reported as
    /// `lost`. A sample that is overwritten while being drained is read
    /// as whatever the slot holds at that moment.
    pub fn drain(&self, tracker: &mut OutlierTracker) -> DrainSummary {
        let write = self.write.load(Ordering::Acquire);
        let mut read = self.read.load(Ordering::Relaxed);
        let capacity = self.mask + 1;

        let mut lost = 0;
        let backlog = write.wrapping_sub(read);
        if backlog > capacity {
            lost = backlog - capacity;
            read = write.wrapping_sub(capacity);
        }

        let mut drained = 0;
        while read != write {
            if let Some(slot) = self.slot(read) {
                tracker.observe(read, slot.load(Ordering::Relaxed));
            }
            read = read.wrapping_add(1);
            drained += 1;
        }
        self.read.store(write, Ordering::Release);

        DrainSummary { drained, lost }
    }

    #[expect(
        clippy::cast_possible_truncation,
        reason = "masked index is always below the slice length"
    )]
    fn slot(&self, position: u64) -> Option<&AtomicU64> {
        self.samples.get((position & self.mask) as usize)
    }
}

/// Result of one [`HistoryBuffer::drain`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DrainSummary {
    /// Samples handed to the tracker
    pub drained: u64,
    /// Samples overwritten before they could be read
    pub lost: u64,
}

/// The largest latency seen and the cycle it occurred in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Outlier {
    /// Latency in microseconds
    pub latency: u64,
    /// Zero-based cycle index
    pub cycle: u64,
}

/// Running maximum over drained history samples.
#[derive(Debug, Clone, Copy, Default)]
pub struct OutlierTracker {
    outlier: Option<Outlier>,
}

impl OutlierTracker {
    /// Create an empty tracker.
    #[must_use]
    pub const fn new() -> Self {
        Self { outlier: None }
    }

    /// Consider one sample.
    pub fn observe(&mut self, cycle: u64, latency: u64) {
        match self.outlier {
            Some(current) if current.latency >= latency => {}
            _ => self.outlier = Some(Outlier { latency, cycle }),
        }
    }

    /// The outlier so far, if any sample was observed.
    #[must_use]
    pub const fn outlier(&self) -> Option<Outlier> {
        self.outlier
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capacity_rounds_up_to_power_of_two() {
        assert_eq!(HistoryBuffer::with_capacity(0).capacity(), 2);
        assert_eq!(HistoryBuffer::with_capacity(5).capacity(), 8);
        assert_eq!(HistoryBuffer::with_capacity(16).capacity(), 16);
        assert_eq!(HistoryBuffer::with_capacity(DEFAULT_HISTORY_CAPACITY).capacity(), 16_384);
    }

    #[test]
    fn test_drain_tracks_outlier_and_cycle() {
        let history = HistoryBuffer::with_capacity(8);
        for latency in [3, 9, 4, 9, 1] {
            history.push(latency);
        }

        let mut tracker = OutlierTracker::new();
        let summary = history.drain(&mut tracker);

        assert_eq!(summary, DrainSummary { drained: 5, lost: 0 });
        // First occurrence of the maximum wins.
        assert_eq!(tracker.outlier(), Some(Outlier { latency: 9, cycle: 1 }));
        assert_eq!(history.overflows(), 0);
    }

    #[test]
    fn test_drain_is_incremental() {
        let history = HistoryBuffer::with_capacity(4);
        let mut tracker = OutlierTracker::new();

        history.push(7);
        assert_eq!(history.drain(&mut tracker).drained, 1);
        assert_eq!(history.drain(&mut tracker).drained, 0);

        history.push(2);
        history.push(8);
        assert_eq!(history.drain(&mut tracker).drained, 2);
        assert_eq!(tracker.outlier(), Some(Outlier { latency: 8, cycle: 2 }));
    }

    #[test]
    fn test_overflow_is_counted_and_lost_samples_skipped() {
        let history = HistoryBuffer::with_capacity(4);
        for latency in 0..10u64 {
            history.push(latency * 10);
        }

        // Pushes 4..10 each overwrote an unread slot.
        assert_eq!(history.overflows(), 6);

        let mut tracker = OutlierTracker::new();
        let summary = history.drain(&mut tracker);
        assert_eq!(summary, DrainSummary { drained: 4, lost: 6 });
        assert_eq!(tracker.outlier(), Some(Outlier { latency: 90, cycle: 9 }));
    }

    #[test]
    fn test_empty_tracker_has_no_outlier() {
        assert_eq!(OutlierTracker::new().outlier(), None);
    }
}
