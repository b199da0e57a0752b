//! Half-open integer intervals `[start, end)` and the subtraction operation
//! feasibility-window maintenance is built on.

use std::fmt::Display;

/// A half-open integer range `[start, end)`.
///
/// Two intervals that merely touch (`a.end == b.start`) do not overlap; this
/// is the convention the feasibility-window arithmetic throughout this crate
/// relies on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Interval {
    start: i64,
    end: i64,
}

impl Interval {
    /// Creates `[start, end)`.
    ///
    /// # Panics
    ///
    /// Panics if `start > end`.
    pub const fn new(start: i64, end: i64) -> Self {
        assert!(start <= end, "interval start must be <= end");
        Self { start, end }
    }

    pub const fn start(&self) -> i64 {
        self.start
    }

    pub const fn end(&self) -> i64 {
        self.end
    }

    pub const fn width(&self) -> i64 {
        self.end - self.start
    }

    pub const fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    pub const fn contains(&self, point: i64) -> bool {
        self.start <= point && point < self.end
    }

    /// True iff the two half-open ranges share at least one integer point.
    pub const fn overlaps(&self, other: &Interval) -> bool {
        self.start < other.end && other.start < self.end
    }

    pub fn intersection(&self, other: &Interval) -> Option<Interval> {
        if !self.overlaps(other) {
            return None;
        }
        let start = self.start.max(other.start);
        let end = self.end.min(other.end);
        (start < end).then(|| Interval::new(start, end))
    }

    /// Subtracts `blocked` from `self`, returning the (at most two) leftover
    /// pieces. Degenerate (empty) pieces are never returned.
    ///
    /// This implements the four-way split feasibility-window maintenance
    /// needs: strictly-to-one-side (unchanged, one piece), right-truncated,
    /// left-truncated, split-in-two, and fully-covered (no pieces).
    pub fn subtract(&self, blocked: &Interval) -> SubtractResult {
        if !self.overlaps(blocked) {
            return SubtractResult::one(*self);
        }
        let left = (self.start < blocked.start)
            .then(|| Interval::new(self.start, blocked.start));
        let right = (blocked.end < self.end)
            .then(|| Interval::new(blocked.end, self.end));
        match (left, right) {
            (Some(l), Some(r)) => SubtractResult::two(l, r),
            (Some(l), None) => SubtractResult::one(l),
            (None, Some(r)) => SubtractResult::one(r),
            (None, None) => SubtractResult::none(),
        }
    }
}

impl Display for Interval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}

/// Result of [`Interval::subtract`]: zero, one, or two pieces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubtractResult {
    pieces: [Option<Interval>; 2],
}

impl SubtractResult {
    fn none() -> Self {
        Self { pieces: [None, None] }
    }

    fn one(a: Interval) -> Self {
        Self { pieces: [Some(a), None] }
    }

    fn two(a: Interval, b: Interval) -> Self {
        Self { pieces: [Some(a), Some(b)] }
    }

    pub fn iter(&self) -> impl Iterator<Item = Interval> + '_ {
        self.pieces.iter().filter_map(|p| *p)
    }
}

/// Removes `blocked` from every interval in `intervals`, keeping the list
/// sorted and free of empty pieces. `intervals` must already be sorted and
/// pairwise disjoint.
pub fn subtract_from_list(intervals: &[Interval], blocked: &Interval) -> Vec<Interval> {
    let mut out = Vec::with_capacity(intervals.len());
    for iv in intervals {
        out.extend(iv.subtract(blocked).iter());
    }
    out
}

/// Total width of a disjoint interval list.
pub fn total_width(intervals: &[Interval]) -> i64 {
    intervals.iter().map(Interval::width).sum()
}

/// Stand-ins for -infinity/+infinity when clipping a feasibility window to
/// one side of a precedence bound. Halved so intersecting twice in sequence
/// never overflows.
pub(crate) const NEG_INFINITY: i64 = i64::MIN / 2;
pub(crate) const POS_INFINITY: i64 = i64::MAX / 2;

/// Keeps only the parts of `intervals` strictly before `bound_exclusive`.
pub fn clip_before(intervals: &[Interval], bound_exclusive: i64) -> Vec<Interval> {
    let clip = Interval::new(NEG_INFINITY, bound_exclusive.max(NEG_INFINITY));
    intervals.iter().filter_map(|iv| iv.intersection(&clip)).collect()
}

/// Keeps only the parts of `intervals` at or after `bound_inclusive`.
pub fn clip_after(intervals: &[Interval], bound_inclusive: i64) -> Vec<Interval> {
    let clip = Interval::new(bound_inclusive.min(POS_INFINITY), POS_INFINITY);
    intervals.iter().filter_map(|iv| iv.intersection(&clip)).collect()
}
