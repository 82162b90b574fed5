//! Inclusive CPU intervals and the merged, ordered interval set.
//!
//! A [`CpuIntervalSet`] keeps its intervals sorted by start, non-overlapping
//! and non-adjacent: between two consecutive intervals there is always at
//! least one CPU that belongs to neither. Insertion merges eagerly, so the
//! set is canonical after every call and two sets holding the same CPUs
//! compare equal regardless of insertion order.

use core::fmt;

use cyclicdl_errors::CpuSetError;

/// An inclusive range of CPU indices, `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CpuInterval {
    start: u32,
    end: u32,
}

impl CpuInterval {
    /// Create an interval, or `None` if `end < start`.
    #[must_use]
    pub const fn new(start: u32, end: u32) -> Option<Self> {
        if end < start {
            return None;
        }
        Some(Self { start, end })
    }

    /// Create the degenerate interval holding one CPU.
    #[must_use]
    pub const fn single(cpu: u32) -> Self {
        Self {
            start: cpu,
            end: cpu,
        }
    }

    /// First CPU in the interval.
    #[must_use]
    pub const fn start(&self) -> u32 {
        self.start
    }

    /// Last CPU in the interval.
    #[must_use]
    pub const fn end(&self) -> u32 {
        self.end
    }

    /// Number of CPUs covered.
    #[must_use]
    pub fn len(&self) -> usize {
        // u32 -> usize is lossless on every target with std threads
        (self.end - self.start) as usize + 1
    }

    /// Intervals are never empty; provided for API symmetry with `len`.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        false
    }

    /// Check whether `cpu` lies inside the interval.
    #[must_use]
    pub const fn contains(&self, cpu: u32) -> bool {
        self.start <= cpu && cpu <= self.end
    }

    /// True if `self` and `other` overlap or touch (`a-b` and `b+1-c`).
    #[must_use]
    pub const fn touches(&self, other: &Self) -> bool {
        other.start <= self.end.saturating_add(1) && other.end.saturating_add(1) >= self.start
    }
}

impl fmt::Display for CpuInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start == self.end {
            write!(f, "{}", self.start)
        } else {
            write!(f, "{}-{}", self.start, self.end)
        }
    }
}

/// Ordered, merged set of CPU intervals.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct CpuIntervalSet {
    intervals: Vec<CpuInterval>,
}

impl CpuIntervalSet {
    /// Create an empty set.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            intervals: Vec::new(),
        }
    }

    /// The canonical intervals in ascending order.
    #[must_use]
    pub fn intervals(&self) -> &[CpuInterval] {
        &self.intervals
    }

    /// Iterate over the intervals in ascending order.
    pub fn iter(&self) -> core::slice::Iter<'_, CpuInterval> {
        self.intervals.iter()
    }

    /// True if the set holds no CPU.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    /// Check whether `cpu` is in the set.
    #[must_use]
    pub fn contains(&self, cpu: u32) -> bool {
        let idx = self.intervals.partition_point(|iv| iv.end < cpu);
        self.intervals.get(idx).is_some_and(|iv| iv.contains(cpu))
    }

    /// Insert an interval, merging it with every interval it overlaps or
    /// touches.
    ///
    /// The search position is the first interval whose end is not more than
    /// one below `new.start`; everything before it is strictly left of `new`
    /// with a gap. From there the new interval either stands alone (inserted
    /// before that position) or absorbs that interval and any followers that
    /// start at or before the growing end plus one.
    pub fn insert(&mut self, new: CpuInterval) {
        let idx = self
            .intervals
            .partition_point(|iv| iv.end.saturating_add(1) < new.start);

        let Some(existing) = self.intervals.get(idx).copied() else {
            self.intervals.push(new);
            return;
        };

        if !existing.touches(&new) {
            self.intervals.insert(idx, new);
            return;
        }

        let mut merged = CpuInterval {
            start: existing.start.min(new.start),
            end: existing.end.max(new.end),
        };
        let mut next = idx + 1;
        while let Some(follower) = self.intervals.get(next) {
            if follower.start > merged.end.saturating_add(1) {
                break;
            }
            merged.end = merged.end.max(follower.end);
            next += 1;
        }

        self.intervals.drain(idx + 1..next);
        if let Some(slot) = self.intervals.get_mut(idx) {
            *slot = merged;
        }
    }

    /// The set covering `[0, cpu_count)` minus `self`.
    ///
    /// Intervals reaching past `cpu_count - 1` are clipped.
    #[must_use]
    pub fn complement(&self, cpu_count: usize) -> Self {
        let limit = u64::try_from(cpu_count)
            .unwrap_or(u64::MAX)
            .min(u64::from(u32::MAX) + 1);
        let mut out = Self::new();
        let mut next: u64 = 0;

        for iv in &self.intervals {
            let start = u64::from(iv.start);
            if start >= limit {
                break;
            }
            if start > next {
                out.intervals.push(clamped(next, start - 1));
            }
            next = u64::from(iv.end) + 1;
        }

        if next < limit {
            out.intervals.push(clamped(next, limit - 1));
        }
        out
    }

    /// Number of CPUs in the set.
    ///
    /// # Errors
    ///
    /// Returns [`CpuSetError::CpuOutOfRange`] if any interval ends at or
    /// beyond `cpu_count`.
    pub fn total_cpus(&self, cpu_count: usize) -> Result<usize, CpuSetError> {
        let mut total = 0usize;
        for iv in &self.intervals {
            if iv.end as usize >= cpu_count {
                return Err(CpuSetError::CpuOutOfRange {
                    cpu: iv.end,
                    cpu_count,
                });
            }
            total += iv.len();
        }
        Ok(total)
    }

    /// Canonical cpu-list text, e.g. `"0,2-5"`. Empty for an empty set.
    #[must_use]
    pub fn render(&self) -> String {
        self.to_string()
    }
}

fn clamped(start: u64, end: u64) -> CpuInterval {
    let start = u32::try_from(start).unwrap_or(u32::MAX);
    let end = u32::try_from(end).unwrap_or(u32::MAX);
    CpuInterval { start, end }
}

impl fmt::Display for CpuIntervalSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut comma = "";
        for iv in &self.intervals {
            write!(f, "{comma}{iv}")?;
            comma = ",";
        }
        Ok(())
    }
}

impl FromIterator<CpuInterval> for CpuIntervalSet {
    fn from_iter<I: IntoIterator<Item = CpuInterval>>(iter: I) -> Self {
        let mut set = Self::new();
        for iv in iter {
            set.insert(iv);
        }
        set
    }
}

impl Extend<CpuInterval> for CpuIntervalSet {
    fn extend<I: IntoIterator<Item = CpuInterval>>(&mut self, iter: I) {
        for iv in iter {
            self.insert(iv);
        }
    }
}

impl<'a> IntoIterator for &'a CpuIntervalSet {
    type Item = &'a CpuInterval;
    type IntoIter = core::slice::Iter<'a, CpuInterval>;

    fn into_iter(self) -> Self::IntoIter {
        self.intervals.iter()
    }
}
