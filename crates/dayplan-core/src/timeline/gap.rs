//! Free-time detection inside a day window.
//!
//! Busy intervals are clamped to the window, merged, and the spaces between
//! them are reported as gaps. Gaps shorter than the minimum are dropped as
//! noise.

use serde::{Deserialize, Serialize};

/// Default minimum gap used by the scheduler (minutes).
pub const DEFAULT_MIN_GAP_MINUTES: u32 = 5;

/// Half-open `[start, end)` interval in minutes from midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Interval {
    pub start: u32,
    pub end: u32,
}

impl Interval {
    pub fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    /// Length in minutes (zero for inverted intervals)
    pub fn duration_minutes(&self) -> u32 {
        self.end.saturating_sub(self.start)
    }

    /// Whether two intervals share at least one minute
    pub fn overlaps(&self, other: &Self) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Intersection with `[lo, hi)`, if non-empty
    pub fn clamp(&self, lo: u32, hi: u32) -> Option<Self> {
        let start = self.start.max(lo);
        let end = self.end.min(hi);
        (start < end).then_some(Self { start, end })
    }
}

/// A free interval within the day window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Gap {
    pub start: u32,
    pub end: u32,
    pub duration: u32,
}

impl Gap {
    pub fn new(start: u32, end: u32) -> Self {
        Self {
            start,
            end,
            duration: end.saturating_sub(start),
        }
    }

    /// Check if this gap can fit a task of given duration
    pub fn can_fit(&self, minutes: u32) -> bool {
        self.duration >= minutes
    }

    pub fn as_interval(&self) -> Interval {
        Interval::new(self.start, self.end)
    }
}

/// Detector for finding gaps in a day
#[derive(Debug, Clone)]
pub struct GapDetector {
    min_gap_minutes: u32,
}

impl GapDetector {
    /// Create a new detector with the default 5 minute minimum
    pub fn new() -> Self {
        Self {
            min_gap_minutes: DEFAULT_MIN_GAP_MINUTES,
        }
    }

    /// Set the minimum gap duration
    pub fn with_min_gap(mut self, minutes: u32) -> Self {
        self.min_gap_minutes = minutes;
        self
    }

    /// Find gaps between busy intervals inside `[window_start, window_end)`.
    ///
    /// # Returns
    /// Gaps sorted by start time, each at least the minimum length.
    pub fn find_gaps(&self, busy: &[Interval], window_start: u32, window_end: u32) -> Vec<Gap> {
        if window_end <= window_start {
            return Vec::new();
        }

        let merged = merge_intervals(busy, window_start, window_end);

        let mut gaps = Vec::new();
        let mut cursor = window_start;

        for interval in &merged {
            if interval.start > cursor && interval.start - cursor >= self.min_gap_minutes {
                gaps.push(Gap::new(cursor, interval.start));
            }
            cursor = cursor.max(interval.end);
        }

        if window_end > cursor && window_end - cursor >= self.min_gap_minutes {
            gaps.push(Gap::new(cursor, window_end));
        }

        gaps
    }
}

impl Default for GapDetector {
    fn default() -> Self {
        Self::new()
    }
}

/// Clamp to the window, drop empties, sort, and merge overlapping or
/// touching intervals.
fn merge_intervals(busy: &[Interval], window_start: u32, window_end: u32) -> Vec<Interval> {
    let mut clamped: Vec<Interval> = busy
        .iter()
        .filter_map(|i| i.clamp(window_start, window_end))
        .collect();
    clamped.sort_by_key(|i| (i.start, i.end));

    let mut merged: Vec<Interval> = Vec::with_capacity(clamped.len());
    for interval in clamped {
        if let Some(last) = merged.last_mut() {
            if interval.start <= last.end {
                last.end = last.end.max(interval.end);
                continue;
            }
        }
        merged.push(interval);
    }
    merged
}

/// Convenience function mirroring [`GapDetector::find_gaps`]
pub fn detect_gaps(
    busy: &[Interval],
    window_start: u32,
    window_end: u32,
    min_gap_minutes: u32,
) -> Vec<Gap> {
    GapDetector::new()
        .with_min_gap(min_gap_minutes)
        .find_gaps(busy, window_start, window_end)
}

#[cfg(test)]
mod tests {
    use super::*;

    const H: u32 = 60;

    #[test]
    fn single_busy_interval_splits_the_day() {
        let gaps = detect_gaps(&[Interval::new(8 * H, 9 * H)], 6 * H, 23 * H, 5);
        assert_eq!(
            gaps,
            vec![Gap::new(6 * H, 8 * H), Gap::new(9 * H, 23 * H)]
        );
        assert_eq!(gaps[0].duration, 120);
        assert_eq!(gaps[1].duration, 840);
    }

    #[test]
    fn overlapping_intervals_merge_first() {
        let busy = [Interval::new(8 * H, 9 * H), Interval::new(8 * H + 30, 10 * H)];
        let gaps = detect_gaps(&busy, 6 * H, 23 * H, 5);
        assert_eq!(gaps, vec![Gap::new(6 * H, 8 * H), Gap::new(10 * H, 23 * H)]);
    }

    #[test]
    fn adjacent_intervals_merge() {
        let busy = [Interval::new(9 * H, 10 * H), Interval::new(10 * H, 11 * H)];
        let gaps = detect_gaps(&busy, 9 * H, 12 * H, 5);
        assert_eq!(gaps, vec![Gap::new(11 * H, 12 * H)]);
    }

    #[test]
    fn short_gaps_are_dropped() {
        let busy = [Interval::new(9 * H, 10 * H), Interval::new(10 * H + 3, 11 * H)];
        let gaps = detect_gaps(&busy, 9 * H, 11 * H, 5);
        assert!(gaps.is_empty());
    }

    #[test]
    fn intervals_outside_window_are_clamped_or_ignored() {
        let busy = [
            Interval::new(4 * H, 7 * H),
            Interval::new(22 * H, 24 * H),
            Interval::new(H, 2 * H),
        ];
        let gaps = detect_gaps(&busy, 6 * H, 23 * H, 5);
        assert_eq!(gaps, vec![Gap::new(7 * H, 22 * H)]);
    }

    #[test]
    fn inverted_input_intervals_are_discarded() {
        let gaps = detect_gaps(&[Interval::new(10 * H, 9 * H)], 6 * H, 12 * H, 5);
        assert_eq!(gaps, vec![Gap::new(6 * H, 12 * H)]);
    }

    #[test]
    fn empty_window_yields_nothing() {
        assert!(detect_gaps(&[], 12 * H, 12 * H, 5).is_empty());
        assert!(detect_gaps(&[], 13 * H, 12 * H, 5).is_empty());
    }

    #[test]
    fn no_busy_time_is_one_gap() {
        assert_eq!(detect_gaps(&[], 6 * H, 23 * H, 5), vec![Gap::new(6 * H, 23 * H)]);
    }

    #[test]
    fn interval_helpers() {
        let a = Interval::new(60, 120);
        assert_eq!(a.duration_minutes(), 60);
        assert!(a.overlaps(&Interval::new(119, 130)));
        assert!(!a.overlaps(&Interval::new(120, 130)));
        assert_eq!(a.clamp(90, 200), Some(Interval::new(90, 120)));
        assert_eq!(a.clamp(120, 200), None);
    }
}
