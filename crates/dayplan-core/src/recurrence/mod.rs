//! Recurrence rules: which dates a recurring template is due on.
//!
//! This module provides:
//! - The rule data model, one payload shape per frequency
//! - Structural validation with a full list of reasons
//! - Single-date evaluation and range expansion over the same predicate

mod engine;
mod rule;

pub use engine::{expand, is_due, HolidayCalendar, RecurrenceEngine};
pub use rule::{validate_rule, CustomPattern, DayOfMonth, Frequency, RecurrenceRule, RuleValidation};
