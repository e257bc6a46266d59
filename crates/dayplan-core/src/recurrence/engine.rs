//! Due-date evaluation and range expansion for recurrence rules.
//!
//! `is_due` and `expand` share a single predicate, so `expand(rule, d, d)`
//! is non-empty exactly when `is_due(rule, d)` holds.

use std::collections::{BTreeSet, HashSet};

use chrono::{Datelike, NaiveDate, Weekday};

use super::rule::{CustomPattern, DayOfMonth, Frequency, RecurrenceRule};

/// Source of non-working days for the `business_days` pattern.
pub trait HolidayCalendar: Send + Sync {
    fn is_holiday(&self, date: NaiveDate) -> bool;
}

impl HolidayCalendar for BTreeSet<NaiveDate> {
    fn is_holiday(&self, date: NaiveDate) -> bool {
        self.contains(&date)
    }
}

impl HolidayCalendar for HashSet<NaiveDate> {
    fn is_holiday(&self, date: NaiveDate) -> bool {
        self.contains(&date)
    }
}

impl HolidayCalendar for Vec<NaiveDate> {
    fn is_holiday(&self, date: NaiveDate) -> bool {
        self.contains(&date)
    }
}

/// Evaluates recurrence rules against dates.
///
/// Without a holiday calendar `business_days` behaves like `weekdays`.
#[derive(Clone, Copy, Default)]
pub struct RecurrenceEngine<'a> {
    holidays: Option<&'a dyn HolidayCalendar>,
}

impl<'a> RecurrenceEngine<'a> {
    pub fn new() -> Self {
        Self { holidays: None }
    }

    pub fn with_holidays(holidays: &'a dyn HolidayCalendar) -> Self {
        Self {
            holidays: Some(holidays),
        }
    }

    /// Whether `rule` has an occurrence on `candidate`.
    ///
    /// `anchor` is the caller's fallback start (typically the template's
    /// creation date); the rule's own `startDate` takes precedence.
    pub fn is_due(
        &self,
        rule: &RecurrenceRule,
        candidate: NaiveDate,
        anchor: Option<NaiveDate>,
    ) -> bool {
        let base = match resolve_base(rule, anchor) {
            Base::Fixed(date) => date,
            Base::Free => candidate,
            Base::Missing => return false,
        };

        if candidate < base || rule.end_date.is_some_and(|end| candidate > end) {
            return false;
        }
        if !self.matches(rule, candidate, base) {
            return false;
        }
        match rule.end_after_occurrences {
            // `candidate` matches, so the filtered walk always reaches it.
            Some(limit) => base
                .iter_days()
                .filter(|d| self.matches(rule, *d, base))
                .take(limit as usize)
                .take_while(|d| *d <= candidate)
                .any(|d| d == candidate),
            None => true,
        }
    }

    /// All occurrences of `rule` in `[range_start, range_end]`, ascending.
    pub fn expand(
        &self,
        rule: &RecurrenceRule,
        range_start: NaiveDate,
        range_end: NaiveDate,
        anchor: Option<NaiveDate>,
    ) -> Vec<NaiveDate> {
        if range_end < range_start {
            return Vec::new();
        }
        let base = match resolve_base(rule, anchor) {
            Base::Fixed(date) => date,
            Base::Free => range_start,
            Base::Missing => return Vec::new(),
        };

        let first = range_start.max(base);
        let last = match rule.end_date {
            Some(end) => range_end.min(end),
            None => range_end,
        };
        if first > last {
            return Vec::new();
        }

        match rule.end_after_occurrences {
            // Occurrences before the range still count towards the limit.
            Some(limit) => base
                .iter_days()
                .take_while(|d| *d <= last)
                .filter(|d| self.matches(rule, *d, base))
                .take(limit as usize)
                .filter(|d| *d >= first)
                .collect(),
            None => first
                .iter_days()
                .take_while(|d| *d <= last)
                .filter(|d| self.matches(rule, *d, base))
                .collect(),
        }
    }

    /// Pattern and interval check for a date on or after `base`.
    fn matches(&self, rule: &RecurrenceRule, date: NaiveDate, base: NaiveDate) -> bool {
        let interval = rule.interval;
        match &rule.frequency {
            Frequency::None => date == base,
            Frequency::Daily => aligned((date - base).num_days(), interval),
            Frequency::Weekly { days_of_week } => {
                days_of_week.contains(&weekday_index(date))
                    && aligned(week_offset(base, date), interval)
            }
            Frequency::Monthly { day_of_month } => {
                day_of_month.is_some_and(|dom| day_matches(date, dom))
                    && aligned(month_offset(base, date), interval)
            }
            Frequency::Yearly {
                day_of_month,
                month,
            } => {
                *month == Some(date.month())
                    && day_of_month.is_some_and(|dom| day_matches(date, dom))
                    && aligned(i64::from(date.year() - base.year()), interval)
            }
            Frequency::Custom { custom_pattern } => match custom_pattern {
                CustomPattern::Weekdays => {
                    is_weekday(date) && aligned(week_offset(base, date), interval)
                }
                CustomPattern::Weekends => {
                    !is_weekday(date) && aligned(week_offset(base, date), interval)
                }
                CustomPattern::BusinessDays => {
                    is_weekday(date)
                        && !self.holidays.is_some_and(|h| h.is_holiday(date))
                        && aligned(week_offset(base, date), interval)
                }
                CustomPattern::NthWeekday { n, weekday } => {
                    weekday_index(date) == *weekday
                        && (date.day() - 1) / 7 + 1 == u32::from(*n)
                        && aligned(month_offset(base, date), interval)
                }
                CustomPattern::LastWeekday { weekday } => {
                    weekday_index(date) == *weekday
                        && date.day() + 7 > days_in_month(date.year(), date.month())
                        && aligned(month_offset(base, date), interval)
                }
            },
        }
    }
}

/// Convenience wrapper using an engine without holidays.
pub fn is_due(rule: &RecurrenceRule, candidate: NaiveDate, anchor: Option<NaiveDate>) -> bool {
    RecurrenceEngine::new().is_due(rule, candidate, anchor)
}

/// Convenience wrapper using an engine without holidays.
pub fn expand(
    rule: &RecurrenceRule,
    range_start: NaiveDate,
    range_end: NaiveDate,
    anchor: Option<NaiveDate>,
) -> Vec<NaiveDate> {
    RecurrenceEngine::new().expand(rule, range_start, range_end, anchor)
}

/// Where interval alignment and occurrence counting start.
enum Base {
    Fixed(NaiveDate),
    /// Interval one with no cap: every date on or after any base aligns,
    /// so the caller may pick whichever date it is looking at.
    Free,
    /// The rule needs a start and none was given; it is never due.
    Missing,
}

fn resolve_base(rule: &RecurrenceRule, anchor: Option<NaiveDate>) -> Base {
    match rule.start_date.or(anchor) {
        Some(date) => Base::Fixed(date),
        None if rule.needs_anchor() => Base::Missing,
        None => Base::Free,
    }
}

fn aligned(offset: i64, interval: u32) -> bool {
    interval >= 1 && offset >= 0 && offset % i64::from(interval) == 0
}

/// 0 = Sunday ... 6 = Saturday
fn weekday_index(date: NaiveDate) -> u8 {
    date.weekday().num_days_from_sunday() as u8
}

fn is_weekday(date: NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Whole weeks between the Sunday-start weeks containing `base` and `date`.
fn week_offset(base: NaiveDate, date: NaiveDate) -> i64 {
    let week_start = |d: NaiveDate| d - chrono::Duration::days(i64::from(weekday_index(d)));
    (week_start(date) - week_start(base)).num_days() / 7
}

fn month_offset(base: NaiveDate, date: NaiveDate) -> i64 {
    let months = |d: NaiveDate| i64::from(d.year()) * 12 + i64::from(d.month0());
    months(date) - months(base)
}

fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|d| d.pred_opt())
        .map_or(31, |d| d.day())
}

/// Days past the end of a short month clamp to its last day.
fn day_matches(date: NaiveDate, dom: DayOfMonth) -> bool {
    let last = days_in_month(date.year(), date.month());
    match dom {
        DayOfMonth::Last => date.day() == last,
        DayOfMonth::Day(day) => date.day() == day.min(last),
    }
}
