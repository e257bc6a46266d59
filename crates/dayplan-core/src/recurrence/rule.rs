//! Recurrence rule types and structural validation.

use std::collections::BTreeSet;
use std::fmt;

use chrono::NaiveDate;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A recurrence rule attached to a task template.
///
/// The frequency-specific fields live inside [`Frequency`], so a weekly
/// rule cannot carry a month and a daily rule cannot carry a day set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecurrenceRule {
    #[serde(flatten)]
    pub frequency: Frequency,
    /// Every Nth occurrence (days, weeks, months or years depending on frequency).
    #[serde(default = "default_interval")]
    pub interval: u32,
    /// First date an occurrence may fall on (inclusive).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    /// Last date an occurrence may fall on (inclusive).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_after_occurrences: Option<u32>,
}

fn default_interval() -> u32 {
    1
}

impl RecurrenceRule {
    /// Whether occurrences depend on where counting starts.
    ///
    /// An interval above one, an occurrence cap, or a one-off rule all need
    /// a start date (the rule's own or a caller fallback) to be evaluated.
    pub fn needs_anchor(&self) -> bool {
        matches!(self.frequency, Frequency::None)
            || self.interval != 1
            || self.end_after_occurrences.is_some()
    }
}

/// Recurrence frequency with its variant-specific payload.
///
/// Weekday numbers run 0..=6 with 0 = Sunday.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    tag = "frequency",
    rename_all = "snake_case",
    rename_all_fields = "camelCase"
)]
pub enum Frequency {
    None,
    Daily,
    Weekly {
        #[serde(default)]
        days_of_week: BTreeSet<u8>,
    },
    Monthly {
        #[serde(default)]
        day_of_month: Option<DayOfMonth>,
    },
    Yearly {
        #[serde(default)]
        day_of_month: Option<DayOfMonth>,
        #[serde(default)]
        month: Option<u32>,
    },
    Custom {
        custom_pattern: CustomPattern,
    },
}

impl Frequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Daily => "daily",
            Self::Weekly { .. } => "weekly",
            Self::Monthly { .. } => "monthly",
            Self::Yearly { .. } => "yearly",
            Self::Custom { .. } => "custom",
        }
    }
}

/// Named patterns for the `custom` frequency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "pattern", rename_all = "snake_case")]
pub enum CustomPattern {
    /// Monday through Friday
    Weekdays,
    /// Saturday and Sunday
    Weekends,
    /// The n-th (1..=5) given weekday of each month
    NthWeekday { n: u8, weekday: u8 },
    /// The final given weekday of each month
    LastWeekday { weekday: u8 },
    /// Weekdays that are not holidays
    BusinessDays,
}

/// Day-of-month selector for monthly and yearly rules.
///
/// Serialized as a number (`1..=31`) or the string `"last"`; `-1` is also
/// read as the last day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayOfMonth {
    Day(u32),
    Last,
}

impl Serialize for DayOfMonth {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Self::Day(day) => serializer.serialize_u32(*day),
            Self::Last => serializer.serialize_str("last"),
        }
    }
}

struct DayOfMonthVisitor;

impl<'de> Visitor<'de> for DayOfMonthVisitor {
    type Value = DayOfMonth;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a day number, -1, or \"last\"")
    }

    fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        u32::try_from(value)
            .map(DayOfMonth::Day)
            .map_err(|_| E::custom(format!("day of month out of range: {value}")))
    }

    fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        if value == -1 {
            return Ok(DayOfMonth::Last);
        }
        u64::try_from(value)
            .map_err(|_| E::custom(format!("day of month out of range: {value}")))
            .and_then(|v| self.visit_u64(v))
    }

    fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        if value.eq_ignore_ascii_case("last") {
            return Ok(DayOfMonth::Last);
        }
        value
            .parse::<u32>()
            .map(DayOfMonth::Day)
            .map_err(|_| E::custom(format!("invalid day of month: {value}")))
    }
}

impl<'de> Deserialize<'de> for DayOfMonth {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(DayOfMonthVisitor)
    }
}

/// Outcome of [`validate_rule`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleValidation {
    pub is_valid: bool,
    pub errors: Vec<String>,
}

impl RuleValidation {
    fn from_errors(errors: Vec<String>) -> Self {
        Self {
            is_valid: errors.is_empty(),
            errors,
        }
    }
}

/// Structural validation of a rule. Never guesses intent: every problem is
/// reported and nothing is corrected.
pub fn validate_rule(rule: &RecurrenceRule) -> RuleValidation {
    let mut errors = Vec::new();

    if rule.interval < 1 {
        errors.push("interval must be at least 1".to_string());
    }
    if rule.end_after_occurrences == Some(0) {
        errors.push("endAfterOccurrences must be at least 1".to_string());
    }
    if let (Some(start), Some(end)) = (rule.start_date, rule.end_date) {
        if end < start {
            errors.push(format!("endDate ({end}) is before startDate ({start})"));
        }
    }

    match &rule.frequency {
        Frequency::None | Frequency::Daily => {}
        Frequency::Weekly { days_of_week } => {
            if days_of_week.is_empty() {
                errors.push("weekly rule needs at least one day of week".to_string());
            }
            for day in days_of_week.iter().filter(|d| **d > 6) {
                errors.push(format!("day of week {day} is out of range 0..6"));
            }
        }
        Frequency::Monthly { day_of_month } => {
            check_day_of_month(*day_of_month, "monthly", &mut errors);
        }
        Frequency::Yearly {
            day_of_month,
            month,
        } => {
            check_day_of_month(*day_of_month, "yearly", &mut errors);
            match month {
                None => errors.push("yearly rule needs a month".to_string()),
                Some(m) if !(1..=12).contains(m) => {
                    errors.push(format!("month {m} is out of range 1..12"));
                }
                Some(_) => {}
            }
        }
        Frequency::Custom { custom_pattern } => match custom_pattern {
            CustomPattern::NthWeekday { n, weekday } => {
                if !(1..=5).contains(n) {
                    errors.push(format!("nth_weekday position {n} is out of range 1..5"));
                }
                if *weekday > 6 {
                    errors.push(format!("weekday {weekday} is out of range 0..6"));
                }
            }
            CustomPattern::LastWeekday { weekday } => {
                if *weekday > 6 {
                    errors.push(format!("weekday {weekday} is out of range 0..6"));
                }
            }
            CustomPattern::Weekdays | CustomPattern::Weekends | CustomPattern::BusinessDays => {}
        },
    }

    RuleValidation::from_errors(errors)
}

fn check_day_of_month(day: Option<DayOfMonth>, kind: &str, errors: &mut Vec<String>) {
    match day {
        None => errors.push(format!("{kind} rule needs a dayOfMonth")),
        Some(DayOfMonth::Day(d)) if !(1..=31).contains(&d) => {
            errors.push(format!("dayOfMonth {d} is out of range 1..31"));
        }
        Some(_) => {}
    }
}
