//! Property-based tests for gap detection, lane assignment and recurrence.

use chrono::{Duration, NaiveDate};
use dayplan_core::recurrence::{expand, is_due};
use dayplan_core::{
    assign_lanes, detect_gaps, CustomPattern, DayOfMonth, Frequency, Interval, RecurrenceRule,
    TimelineBlock,
};
use proptest::prelude::*;

// ---------------------------------------------------------------------------
// Strategies
// ---------------------------------------------------------------------------

fn arb_interval() -> impl Strategy<Value = Interval> {
    (0u32..1440, 1u32..240).prop_map(|(start, len)| Interval::new(start, (start + len).min(1440)))
}

fn arb_window() -> impl Strategy<Value = (u32, u32)> {
    (0u32..720, 60u32..720).prop_map(|(start, len)| (start, start + len))
}

fn arb_block() -> impl Strategy<Value = TimelineBlock> {
    (0u32..1440, 1u32..180).prop_map(|(start, len)| TimelineBlock::new(start, start + len))
}

fn arb_frequency() -> impl Strategy<Value = Frequency> {
    prop_oneof![
        Just(Frequency::Daily),
        prop::collection::btree_set(0u8..7, 1..4)
            .prop_map(|days_of_week| Frequency::Weekly { days_of_week }),
        prop_oneof![(1u32..=31).prop_map(DayOfMonth::Day), Just(DayOfMonth::Last)]
            .prop_map(|dom| Frequency::Monthly { day_of_month: Some(dom) }),
        Just(Frequency::Custom { custom_pattern: CustomPattern::Weekdays }),
        Just(Frequency::Custom { custom_pattern: CustomPattern::Weekends }),
        (1u8..=5, 0u8..7).prop_map(|(n, weekday)| Frequency::Custom {
            custom_pattern: CustomPattern::NthWeekday { n, weekday }
        }),
        (0u8..7).prop_map(|weekday| Frequency::Custom {
            custom_pattern: CustomPattern::LastWeekday { weekday }
        }),
    ]
}

fn arb_date() -> impl Strategy<Value = NaiveDate> {
    (0i64..730).prop_map(|offset| {
        NaiveDate::from_ymd_opt(2025, 1, 1).unwrap() + Duration::days(offset)
    })
}

fn arb_rule() -> impl Strategy<Value = RecurrenceRule> {
    (
        arb_frequency(),
        1u32..=4,
        prop::option::of(arb_date()),
        prop::option::of(1u32..=20),
    )
        .prop_map(|(frequency, interval, start, count)| RecurrenceRule {
            frequency,
            interval,
            start_date: start,
            end_date: None,
            end_after_occurrences: count,
        })
}

// ---------------------------------------------------------------------------
// Gap detection
// ---------------------------------------------------------------------------

proptest! {
    /// Busy time and gaps never overlap, and with no minimum they cover the
    /// window exactly.
    #[test]
    fn gaps_and_busy_partition_the_window(
        busy in prop::collection::vec(arb_interval(), 0..12),
        (ws, we) in arb_window(),
    ) {
        let gaps = detect_gaps(&busy, ws, we, 0);

        for gap in &gaps {
            prop_assert!(gap.start >= ws && gap.end <= we);
            prop_assert!(gap.start < gap.end);
            for b in &busy {
                prop_assert!(!gap.as_interval().overlaps(b), "gap {:?} overlaps {:?}", gap, b);
            }
        }
        for pair in gaps.windows(2) {
            prop_assert!(pair[0].end < pair[1].start);
        }

        let busy_minutes = (ws..we)
            .filter(|m| busy.iter().any(|b| b.start <= *m && *m < b.end))
            .count() as u32;
        let gap_minutes: u32 = gaps.iter().map(|g| g.duration).sum();
        prop_assert_eq!(busy_minutes + gap_minutes, we - ws);
    }

    /// Every reported gap respects the minimum length.
    #[test]
    fn gaps_respect_minimum(
        busy in prop::collection::vec(arb_interval(), 0..12),
        (ws, we) in arb_window(),
        min_gap in 0u32..90,
    ) {
        for gap in detect_gaps(&busy, ws, we, min_gap) {
            prop_assert!(gap.duration >= min_gap);
        }
    }
}

// ---------------------------------------------------------------------------
// Lane assignment
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn lanes_are_bounded_and_disjoint(
        blocks in prop::collection::vec(arb_block(), 0..20),
        max_lanes in 1usize..5,
    ) {
        let lanes = assign_lanes(&blocks, max_lanes);
        prop_assert_eq!(lanes.len(), blocks.len());

        for (i, a) in lanes.iter().enumerate() {
            prop_assert_eq!(a.hidden, a.lane_index.is_none());
            if let Some(lane) = a.lane_index {
                prop_assert!(lane < max_lanes);
                for (j, b) in lanes.iter().enumerate().skip(i + 1) {
                    if b.lane_index == Some(lane) {
                        let (x, y) = (&blocks[i], &blocks[j]);
                        prop_assert!(
                            x.end <= y.start || y.end <= x.start,
                            "blocks {:?} and {:?} share lane {}", x, y, lane
                        );
                    }
                }
            }
        }
    }

    /// Blocks that overlap nothing are never hidden.
    #[test]
    fn isolated_blocks_stay_visible(blocks in prop::collection::vec(arb_block(), 0..20)) {
        let lanes = assign_lanes(&blocks, 1);
        for (i, block) in blocks.iter().enumerate() {
            let overlaps_other = blocks.iter().enumerate().any(|(j, other)| {
                j != i && block.start < other.end && other.start < block.end
            });
            if !overlaps_other {
                prop_assert!(!lanes[i].hidden, "isolated block {:?} hidden", block);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Recurrence
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// `expand` returns exactly the dates for which `is_due` holds.
    #[test]
    fn expand_agrees_with_is_due(
        rule in arb_rule(),
        anchor in prop::option::of(arb_date()),
        from in arb_date(),
        span in 0i64..120,
    ) {
        let to = from + Duration::days(span);
        let expanded = expand(&rule, from, to, anchor);

        for pair in expanded.windows(2) {
            prop_assert!(pair[0] < pair[1]);
        }
        let mut day = from;
        while day <= to {
            prop_assert_eq!(
                expanded.contains(&day),
                is_due(&rule, day, anchor),
                "rule {:?} disagrees on {}", rule, day
            );
            day += Duration::days(1);
        }
    }

    /// An occurrence limit caps the total number of occurrences.
    #[test]
    fn occurrence_limit_caps_expansion(rule in arb_rule()) {
        if let (Some(limit), Some(start)) = (rule.end_after_occurrences, rule.start_date) {
            let all = expand(&rule, start, start + Duration::days(3 * 366), None);
            prop_assert!(all.len() <= limit as usize);
        }
    }
}
