//! Task templates: reusable task definitions, possibly recurring.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::clock::{parse_hhmm, MINUTES_PER_DAY};
use crate::recurrence::{validate_rule, RecurrenceRule};

/// Part of the waking day a flexible task prefers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeWindow {
    Morning,
    Afternoon,
    Evening,
    #[default]
    Anytime,
}

impl TimeWindow {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Morning => "morning",
            Self::Afternoon => "afternoon",
            Self::Evening => "evening",
            Self::Anytime => "anytime",
        }
    }
}

/// How a template is placed on the day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    tag = "schedulingType",
    rename_all = "lowercase",
    rename_all_fields = "camelCase"
)]
pub enum Scheduling {
    /// At an exact time of day (`HH:MM`)
    Fixed { default_time: String },
    /// Into any free gap, preferably inside the window
    Flexible {
        #[serde(default)]
        time_window: TimeWindow,
    },
}

impl Scheduling {
    pub fn is_fixed(&self) -> bool {
        matches!(self, Self::Fixed { .. })
    }
}

/// A reusable task definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskTemplate {
    pub id: String,
    pub task_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub is_mandatory: bool,
    /// 1 (lowest) ..= 5 (highest)
    #[serde(default = "default_priority")]
    pub priority: u8,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(flatten)]
    pub scheduling: Scheduling,
    pub duration_minutes: u32,
    /// Shortest acceptable length when squeezed into a smaller gap
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_duration_minutes: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub depends_on: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurrence_rule: Option<RecurrenceRule>,
    /// Recurrence anchor when the rule has no start date
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_on: Option<NaiveDate>,
}

fn default_priority() -> u8 {
    3
}

fn default_true() -> bool {
    true
}

impl TaskTemplate {
    fn with_scheduling(
        id: impl Into<String>,
        task_name: impl Into<String>,
        scheduling: Scheduling,
        duration_minutes: u32,
    ) -> Self {
        Self {
            id: id.into(),
            task_name: task_name.into(),
            description: String::new(),
            is_mandatory: false,
            priority: default_priority(),
            is_active: true,
            scheduling,
            duration_minutes,
            min_duration_minutes: None,
            depends_on: None,
            recurrence_rule: None,
            created_on: None,
        }
    }

    /// A template pinned to `default_time` (`HH:MM`).
    pub fn fixed(
        id: impl Into<String>,
        task_name: impl Into<String>,
        default_time: impl Into<String>,
        duration_minutes: u32,
    ) -> Self {
        Self::with_scheduling(
            id,
            task_name,
            Scheduling::Fixed {
                default_time: default_time.into(),
            },
            duration_minutes,
        )
    }

    /// A template placed into free time.
    pub fn flexible(
        id: impl Into<String>,
        task_name: impl Into<String>,
        time_window: TimeWindow,
        duration_minutes: u32,
    ) -> Self {
        Self::with_scheduling(
            id,
            task_name,
            Scheduling::Flexible { time_window },
            duration_minutes,
        )
    }

    pub fn with_priority(mut self, priority: u8) -> Self {
        self.priority = priority;
        self
    }

    pub fn mandatory(mut self) -> Self {
        self.is_mandatory = true;
        self
    }

    pub fn inactive(mut self) -> Self {
        self.is_active = false;
        self
    }

    pub fn with_min_duration(mut self, minutes: u32) -> Self {
        self.min_duration_minutes = Some(minutes);
        self
    }

    pub fn depending_on(mut self, id: impl Into<String>) -> Self {
        self.depends_on = Some(id.into());
        self
    }

    pub fn with_rule(mut self, rule: RecurrenceRule) -> Self {
        self.recurrence_rule = Some(rule);
        self
    }

    pub fn created_on(mut self, date: NaiveDate) -> Self {
        self.created_on = Some(date);
        self
    }

    /// Structural problems with this template, empty when it is schedulable.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if !(1..=5).contains(&self.priority) {
            errors.push(format!("priority {} is out of range 1..5", self.priority));
        }
        if self.duration_minutes == 0 {
            errors.push("durationMinutes must be greater than 0".to_string());
        } else if self.duration_minutes > MINUTES_PER_DAY {
            errors.push(format!(
                "durationMinutes {} exceeds one day ({MINUTES_PER_DAY})",
                self.duration_minutes
            ));
        }
        if let Some(min) = self.min_duration_minutes {
            if min == 0 || min > self.duration_minutes {
                errors.push(format!(
                    "minDurationMinutes {min} must be between 1 and durationMinutes ({})",
                    self.duration_minutes
                ));
            }
        }
        if let Scheduling::Fixed { default_time } = &self.scheduling {
            if let Err(e) = parse_hhmm(default_time) {
                errors.push(format!("defaultTime: {e}"));
            }
        }
        if let Some(rule) = &self.recurrence_rule {
            let validation = validate_rule(rule);
            errors.extend(
                validation
                    .errors
                    .into_iter()
                    .map(|e| format!("recurrenceRule: {e}")),
            );
            let unanchored = rule.start_date.is_none() && self.created_on.is_none();
            if validation.is_valid && unanchored && rule.needs_anchor() {
                errors.push(format!(
                    "recurrenceRule: {} rule needs startDate or createdOn to count from",
                    rule.frequency.as_str()
                ));
            }
        }

        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn fixed_template_from_json() {
        let t: TaskTemplate = serde_json::from_value(json!({
            "id": "standup",
            "taskName": "Standup",
            "schedulingType": "fixed",
            "defaultTime": "09:00",
            "durationMinutes": 15,
            "isMandatory": true,
            "priority": 4
        }))
        .unwrap();
        assert!(t.scheduling.is_fixed());
        assert!(t.is_active);
        assert_eq!(
            t.scheduling,
            Scheduling::Fixed {
                default_time: "09:00".into()
            }
        );
        assert!(t.validate().is_empty());
    }

    #[test]
    fn flexible_window_defaults_to_anytime() {
        let t: TaskTemplate = serde_json::from_value(json!({
            "id": "read",
            "taskName": "Read",
            "schedulingType": "flexible",
            "durationMinutes": 30
        }))
        .unwrap();
        assert_eq!(
            t.scheduling,
            Scheduling::Flexible {
                time_window: TimeWindow::Anytime
            }
        );
        assert_eq!(t.priority, 3);
    }

    #[test]
    fn template_serializes_with_camel_case_keys() {
        let t = TaskTemplate::flexible("a", "A", TimeWindow::Evening, 20).with_min_duration(10);
        let v = serde_json::to_value(&t).unwrap();
        assert_eq!(v["schedulingType"], "flexible");
        assert_eq!(v["timeWindow"], "evening");
        assert_eq!(v["minDurationMinutes"], 10);
        assert!(v.get("dependsOn").is_none());
    }

    #[test]
    fn validate_reports_each_problem() {
        let t = TaskTemplate::fixed("x", "X", "9am", 0)
            .with_priority(9)
            .with_min_duration(5);
        let errors = t.validate();
        assert_eq!(errors.len(), 4, "{errors:?}");
    }

    #[test]
    fn duration_is_capped_at_one_day() {
        assert!(TaskTemplate::fixed("x", "X", "09:00", 1440).validate().is_empty());
        let errors = TaskTemplate::fixed("x", "X", "09:00", u32::MAX).validate();
        assert_eq!(errors, vec!["durationMinutes 4294967295 exceeds one day (1440)"]);
    }

    #[test]
    fn interval_rule_needs_somewhere_to_count_from() {
        let rule: RecurrenceRule = serde_json::from_value(json!({
            "frequency": "weekly",
            "daysOfWeek": [1],
            "interval": 2
        }))
        .unwrap();
        let t = TaskTemplate::flexible("x", "X", TimeWindow::Anytime, 30).with_rule(rule.clone());
        let errors = t.validate();
        assert_eq!(errors.len(), 1, "{errors:?}");
        assert_eq!(
            errors[0],
            "recurrenceRule: weekly rule needs startDate or createdOn to count from"
        );

        let created = NaiveDate::from_ymd_opt(2026, 10, 5).unwrap();
        let t = TaskTemplate::flexible("x", "X", TimeWindow::Anytime, 30)
            .with_rule(rule)
            .created_on(created);
        assert!(t.validate().is_empty());
    }
}
