//! Lane assignment for rendering overlapping blocks side by side.
//!
//! This is greedy interval colouring: blocks are visited by start time and
//! take the first free lane. It does not search for the minimum lane count;
//! the goal is bounded visual stacking for a single day's handful of blocks.

use serde::{Deserialize, Serialize};

use crate::clock::parse_hhmm;
use crate::error::ScheduleError;
use crate::schedule::ScheduleBlock;

/// A block to lay out on the timeline (minutes from midnight).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineBlock {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub start: u32,
    pub end: u32,
}

impl TimelineBlock {
    pub fn new(start: u32, end: u32) -> Self {
        Self {
            id: None,
            start,
            end,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn duration_minutes(&self) -> u32 {
        self.end.saturating_sub(self.start)
    }

    /// Convert a placed schedule block, keyed by its template id.
    ///
    /// An end at or before the start is read as the next day. Blocks last
    /// at most one day, so a single wrap recovers every length.
    pub fn from_schedule_block(block: &ScheduleBlock) -> Result<Self, ScheduleError> {
        let start = parse_hhmm(&block.start_time)?;
        let mut end = parse_hhmm(&block.end_time)?;
        if end <= start {
            end += crate::clock::MINUTES_PER_DAY;
        }
        Ok(Self::new(start, end).with_id(block.template_id.clone()))
    }
}

/// Lane for the block at the same position in the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LaneAssignment {
    pub lane_index: Option<usize>,
    pub hidden: bool,
}

impl LaneAssignment {
    fn lane(index: usize) -> Self {
        Self {
            lane_index: Some(index),
            hidden: false,
        }
    }

    fn hidden() -> Self {
        Self {
            lane_index: None,
            hidden: true,
        }
    }
}

/// Assign lanes to `blocks`, hiding whatever does not fit in `max_lanes`.
///
/// The output is aligned with the input. Ordering: start ascending, longer
/// blocks first on ties, input order last.
pub fn assign_lanes(blocks: &[TimelineBlock], max_lanes: usize) -> Vec<LaneAssignment> {
    let max_lanes = max_lanes.max(1);

    let mut order: Vec<usize> = (0..blocks.len()).collect();
    order.sort_by(|&a, &b| {
        let (x, y) = (&blocks[a], &blocks[b]);
        x.start
            .cmp(&y.start)
            .then_with(|| y.duration_minutes().cmp(&x.duration_minutes()))
            .then_with(|| a.cmp(&b))
    });

    let mut lane_ends: Vec<u32> = Vec::with_capacity(max_lanes);
    let mut assignments = vec![LaneAssignment::hidden(); blocks.len()];

    for index in order {
        let block = &blocks[index];
        let end = block.end.max(block.start);

        if let Some(lane) = lane_ends.iter().position(|&lane_end| lane_end <= block.start) {
            lane_ends[lane] = end;
            assignments[index] = LaneAssignment::lane(lane);
        } else if lane_ends.len() < max_lanes {
            lane_ends.push(end);
            assignments[index] = LaneAssignment::lane(lane_ends.len() - 1);
        }
    }

    assignments
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(start: u32, end: u32) -> TimelineBlock {
        TimelineBlock::new(start, end)
    }

    #[test]
    fn disjoint_blocks_share_lane_zero() {
        let lanes = assign_lanes(&[block(0, 60), block(60, 120), block(200, 260)], 3);
        assert!(lanes.iter().all(|l| l.lane_index == Some(0) && !l.hidden));
    }

    #[test]
    fn pairwise_overlap_hides_beyond_cap() {
        let blocks = [block(0, 100), block(10, 90), block(20, 80)];
        let two = assign_lanes(&blocks, 2);
        assert_eq!(two.iter().filter(|l| l.hidden).count(), 1);
        assert_eq!(two[2], LaneAssignment::hidden());

        let three = assign_lanes(&blocks, 3);
        assert_eq!(three.iter().filter(|l| l.hidden).count(), 0);
    }

    #[test]
    fn longer_block_wins_tie_on_start() {
        let blocks = [block(0, 30), block(0, 90)];
        let lanes = assign_lanes(&blocks, 1);
        assert_eq!(lanes[1], LaneAssignment::lane(0));
        assert_eq!(lanes[0], LaneAssignment::hidden());
    }

    #[test]
    fn output_is_aligned_with_unsorted_input() {
        let blocks = [block(120, 180), block(0, 60), block(30, 150)];
        let lanes = assign_lanes(&blocks, 2);
        assert_eq!(lanes[1].lane_index, Some(0));
        assert_eq!(lanes[2].lane_index, Some(1));
        // Lane 0 frees at 60, so the 120 block reuses it.
        assert_eq!(lanes[0].lane_index, Some(0));
    }

    #[test]
    fn zero_max_lanes_is_floored_to_one() {
        let lanes = assign_lanes(&[block(0, 60), block(30, 90)], 0);
        assert_eq!(lanes[0].lane_index, Some(0));
        assert!(lanes[1].hidden);
    }

    #[test]
    fn empty_input() {
        assert!(assign_lanes(&[], 2).is_empty());
    }

    #[test]
    fn from_schedule_block_parses_times() {
        let sb = ScheduleBlock {
            template_id: "t".into(),
            task_name: "Task".into(),
            start_time: "23:30".into(),
            end_time: "00:30".into(),
            status: Default::default(),
            compressed: false,
        };
        let block = TimelineBlock::from_schedule_block(&sb).unwrap();
        assert_eq!((block.start, block.end), (1410, 1470));
        assert_eq!(block.id.as_deref(), Some("t"));
    }

    #[test]
    fn scheduled_blocks_keep_their_length_across_midnight() {
        use crate::schedule::{Settings, TaskTemplate};

        let date = chrono::NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        let templates = vec![
            TaskTemplate::fixed("late", "Late", "23:30", 90),
            TaskTemplate::fixed("all", "All day", "09:00", 1440),
        ];
        let result = crate::scheduler::build_schedule(date, &templates, &[], &Settings::default());
        assert!(result.success, "{:?}", result.error);

        let lengths: Vec<(String, u32)> = result
            .schedule
            .iter()
            .map(|b| {
                let block = TimelineBlock::from_schedule_block(b).unwrap();
                (b.template_id.clone(), block.duration_minutes())
            })
            .collect();
        assert_eq!(lengths, vec![("all".to_string(), 1440), ("late".to_string(), 90)]);
    }
}
