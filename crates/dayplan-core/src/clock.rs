//! Wall-clock `HH:MM` helpers.
//!
//! Times of day travel as strings in the data model and are converted to
//! minutes from midnight for every computation. There is no time zone
//! handling; `"24:00"` is accepted as the end of the day.

use chrono::{NaiveTime, Timelike};

use crate::error::ScheduleError;

/// Minutes in a day.
pub const MINUTES_PER_DAY: u32 = 24 * 60;

/// Parse `HH:MM` into minutes from midnight.
pub fn parse_hhmm(value: &str) -> Result<u32, ScheduleError> {
    let trimmed = value.trim();
    if trimmed == "24:00" {
        return Ok(MINUTES_PER_DAY);
    }
    NaiveTime::parse_from_str(trimmed, "%H:%M")
        .map(|t| t.hour() * 60 + t.minute())
        .map_err(|_| ScheduleError::InvalidTime {
            value: value.to_string(),
        })
}

/// Format minutes from midnight as `HH:MM`, wrapping past midnight.
///
/// Exactly 1440 prints as `24:00`. Later values lose whole days, which
/// [`crate::timeline::TimelineBlock::from_schedule_block`] can only restore
/// for spans of up to one day.
pub fn format_hhmm(minutes: u32) -> String {
    if minutes == MINUTES_PER_DAY {
        return "24:00".to_string();
    }
    let wrapped = minutes % MINUTES_PER_DAY;
    format!("{:02}:{:02}", wrapped / 60, wrapped % 60)
}
