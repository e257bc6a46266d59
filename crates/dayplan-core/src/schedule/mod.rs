//! Schedule data model: templates, per-day instances, settings and results.
//!
//! Everything here is plain data that travels as camelCase JSON between the
//! stores, the engine and the timeline.

mod template;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

pub use template::{Scheduling, TaskTemplate, TimeWindow};

/// Status of one day's occurrence of a template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstanceStatus {
    #[default]
    Pending,
    Completed,
    Skipped,
    Postponed,
}

impl InstanceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Skipped => "skipped",
            Self::Postponed => "postponed",
        }
    }

    /// Skipped and postponed occurrences give their time back to the day.
    pub fn releases_slot(&self) -> bool {
        matches!(self, Self::Skipped | Self::Postponed)
    }
}

/// A date-specific record of a template's occurrence.
///
/// Absence of an instance means "template defaults, pending".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskInstance {
    pub id: String,
    pub template_id: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub status: InstanceStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified_start_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skipped_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl TaskInstance {
    pub fn new(id: impl Into<String>, template_id: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            id: id.into(),
            template_id: template_id.into(),
            date,
            status: InstanceStatus::Pending,
            modified_start_time: None,
            completed_at: None,
            skipped_reason: None,
            note: None,
        }
    }

    pub fn with_status(mut self, status: InstanceStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_start_time(mut self, start: impl Into<String>) -> Self {
        self.modified_start_time = Some(start.into());
        self
    }
}

/// User-level sleep settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// Desired sleep in minutes
    #[serde(default = "default_desired_sleep")]
    pub desired_sleep_duration: u32,
    #[serde(default = "default_wake_time")]
    pub default_wake_time: String,
    #[serde(default = "default_sleep_time")]
    pub default_sleep_time: String,
}

fn default_desired_sleep() -> u32 {
    8 * 60
}
fn default_wake_time() -> String {
    "07:00".into()
}
fn default_sleep_time() -> String {
    "23:00".into()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            desired_sleep_duration: default_desired_sleep(),
            default_wake_time: default_wake_time(),
            default_sleep_time: default_sleep_time(),
        }
    }
}

/// Per-day wake/sleep override from the daily-schedule store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SleepOverride {
    pub date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wake_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sleep_time: Option<String>,
}

/// A placed occurrence on the day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleBlock {
    pub template_id: String,
    pub task_name: String,
    pub start_time: String,
    pub end_time: String,
    #[serde(default)]
    pub status: InstanceStatus,
    /// Placed below its nominal duration
    #[serde(default)]
    pub compressed: bool,
}

/// The sleep window surrounding the scheduled day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SleepSchedule {
    pub wake_time: String,
    pub sleep_time: String,
    /// Minutes from sleep time to the next wake time
    pub duration: u32,
}

/// Output of one scheduling run. Always a fresh snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleResult {
    pub success: bool,
    pub schedule: Vec<ScheduleBlock>,
    pub sleep_schedule: SleepSchedule,
    pub total_tasks: usize,
    pub scheduled_tasks: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub advisories: Vec<String>,
}

impl ScheduleResult {
    /// A failed run: empty schedule, `error` set.
    pub fn failure(sleep_schedule: SleepSchedule, error: impl Into<String>) -> Self {
        Self {
            success: false,
            schedule: Vec::new(),
            sleep_schedule,
            total_tasks: 0,
            scheduled_tasks: 0,
            message: None,
            error: Some(error.into()),
            advisories: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn instance_defaults_to_pending() {
        let inst: TaskInstance = serde_json::from_value(json!({
            "id": "i1",
            "templateId": "t1",
            "date": "2026-10-18"
        }))
        .unwrap();
        assert_eq!(inst.status, InstanceStatus::Pending);
        assert!(!inst.status.releases_slot());
    }

    #[test]
    fn skipped_and_postponed_release_their_slot() {
        assert!(InstanceStatus::Skipped.releases_slot());
        assert!(InstanceStatus::Postponed.releases_slot());
        assert!(!InstanceStatus::Completed.releases_slot());
    }

    #[test]
    fn settings_fill_missing_fields() {
        let s: Settings = serde_json::from_value(json!({ "defaultWakeTime": "06:00" })).unwrap();
        assert_eq!(s.default_wake_time, "06:00");
        assert_eq!(s.default_sleep_time, "23:00");
        assert_eq!(s.desired_sleep_duration, 480);
    }

    #[test]
    fn failure_result_omits_empty_advisories() {
        let sleep = SleepSchedule {
            wake_time: "07:00".into(),
            sleep_time: "07:00".into(),
            duration: 0,
        };
        let v = serde_json::to_value(ScheduleResult::failure(sleep, "boom")).unwrap();
        assert_eq!(v["success"], false);
        assert_eq!(v["error"], "boom");
        assert!(v.get("advisories").is_none());
        assert_eq!(v["sleepSchedule"]["wakeTime"], "07:00");
    }
}
