//! Greedy first-fit placement of flexible tasks into free gaps.
//!
//! Each task takes the earliest gap that holds it at full length; a gap
//! is only shortened into once no full-length gap remains. Nothing is moved
//! once placed. This is not optimal interval scheduling, which a single person's
//! daily task count does not need.

use crate::timeline::{Gap, Interval};

/// Where a flexible task ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Slot {
    pub start: u32,
    pub end: u32,
    /// Shorter than the nominal duration
    pub compressed: bool,
}

/// Remaining free time for the day, kept sorted by start.
#[derive(Debug, Clone)]
pub(crate) struct GapPool {
    gaps: Vec<Gap>,
    min_gap_minutes: u32,
}

impl GapPool {
    pub fn new(gaps: Vec<Gap>, min_gap_minutes: u32) -> Self {
        Self {
            gaps,
            min_gap_minutes,
        }
    }

    fn clipped(&self, range: Interval) -> impl Iterator<Item = Interval> + '_ {
        self.gaps
            .iter()
            .filter_map(move |g| g.as_interval().clamp(range.start, range.end))
    }

    /// First slot within `range` that holds the full `duration`.
    pub fn find_full(&self, range: Interval, duration: u32) -> Option<Slot> {
        self.clipped(range)
            .find(|free| free.duration_minutes() >= duration)
            .map(|free| Slot {
                start: free.start,
                end: free.start + duration,
                compressed: false,
            })
    }

    /// First gap within `range` of at least `min_duration` minutes, taken
    /// whole. Only meaningful when the minimum is below the nominal duration.
    pub fn find_compressed(
        &self,
        range: Interval,
        duration: u32,
        min_duration: Option<u32>,
    ) -> Option<Slot> {
        let min = min_duration.filter(|m| *m > 0 && *m < duration)?;
        self.clipped(range)
            .find(|free| free.duration_minutes() >= min)
            .map(|free| Slot {
                start: free.start,
                end: free.end.min(free.start + duration),
                compressed: true,
            })
    }

    /// Remove `slot` from the pool, splitting the gap it came from.
    /// Leftovers shorter than the minimum gap are discarded.
    pub fn reserve(&mut self, slot: Slot) {
        let Some(pos) = self
            .gaps
            .iter()
            .position(|g| g.start <= slot.start && slot.end <= g.end)
        else {
            return;
        };

        let gap = self.gaps.remove(pos);
        let pieces = [Gap::new(gap.start, slot.start), Gap::new(slot.end, gap.end)];
        let keep: Vec<Gap> = pieces
            .into_iter()
            .filter(|p| p.duration > 0 && p.duration >= self.min_gap_minutes)
            .collect();
        for (offset, piece) in keep.into_iter().enumerate() {
            self.gaps.insert(pos + offset, piece);
        }
    }

    #[cfg(test)]
    pub fn gaps(&self) -> &[Gap] {
        &self.gaps
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const H: u32 = 60;

    fn pool(gaps: &[(u32, u32)]) -> GapPool {
        GapPool::new(gaps.iter().map(|&(s, e)| Gap::new(s, e)).collect(), 5)
    }

    #[test]
    fn first_gap_that_fits_wins() {
        let p = pool(&[(6 * H, 6 * H + 20), (8 * H, 10 * H)]);
        let slot = p.find_full(Interval::new(0, 24 * H), 30).unwrap();
        assert_eq!(slot, Slot { start: 8 * H, end: 8 * H + 30, compressed: false });
    }

    #[test]
    fn compresses_into_gap_when_allowed() {
        let p = pool(&[(6 * H, 6 * H + 20), (8 * H, 8 * H + 40)]);
        let day = Interval::new(0, 24 * H);
        assert!(p.find_full(day, 60).is_none());
        let slot = p.find_compressed(day, 60, Some(15)).unwrap();
        assert_eq!(slot, Slot { start: 6 * H, end: 6 * H + 20, compressed: true });
        assert!(p.find_compressed(day, 60, Some(45)).is_none());
        assert!(p.find_compressed(day, 60, None).is_none());
        assert!(p.find_compressed(day, 60, Some(60)).is_none());
    }

    #[test]
    fn range_clips_candidate_gaps() {
        let p = pool(&[(6 * H, 14 * H)]);
        let slot = p.find_full(Interval::new(12 * H, 17 * H), 60).unwrap();
        assert_eq!(slot.start, 12 * H);
    }

    #[test]
    fn reserve_splits_and_drops_slivers() {
        let mut p = pool(&[(6 * H, 8 * H), (9 * H, 12 * H)]);
        p.reserve(Slot { start: 10 * H, end: 11 * H, compressed: false });
        assert_eq!(
            p.gaps(),
            &[Gap::new(6 * H, 8 * H), Gap::new(9 * H, 10 * H), Gap::new(11 * H, 12 * H)]
        );

        p.reserve(Slot { start: 6 * H, end: 8 * H - 3, compressed: false });
        assert_eq!(p.gaps()[0], Gap::new(9 * H, 10 * H));
    }
}
