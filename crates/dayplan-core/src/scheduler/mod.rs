//! Daily scheduler.
//!
//! Turns templates, per-day instances and settings into a placed day:
//! - Expands recurrence to find which templates are due
//! - Drops dependents whose prerequisite is not usable
//! - Anchors fixed-time tasks, then fills the remaining gaps with flexible
//!   tasks by priority
//!
//! Recoverable problems become advisories on the result. Only a malformed
//! day window or template fails the run.

mod placement;

use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::clock::{format_hhmm, parse_hhmm, MINUTES_PER_DAY};
use crate::dependency::DependencyResolver;
use crate::error::ScheduleError;
use crate::recurrence::{HolidayCalendar, RecurrenceEngine};
use crate::schedule::{
    InstanceStatus, ScheduleBlock, ScheduleResult, Scheduling, Settings, SleepOverride,
    SleepSchedule, TaskInstance, TaskTemplate, TimeWindow,
};
use crate::timeline::{GapDetector, Interval, DEFAULT_MIN_GAP_MINUTES};

use placement::{GapPool, Slot};

/// Scheduler configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Gaps shorter than this are ignored (minutes)
    #[serde(default = "default_min_gap")]
    pub min_gap_minutes: u32,
    /// End of the morning window (`HH:MM`)
    #[serde(default = "default_morning_end")]
    pub morning_end: String,
    /// End of the afternoon window (`HH:MM`)
    #[serde(default = "default_afternoon_end")]
    pub afternoon_end: String,
}

fn default_min_gap() -> u32 {
    DEFAULT_MIN_GAP_MINUTES
}
fn default_morning_end() -> String {
    "12:00".into()
}
fn default_afternoon_end() -> String {
    "17:00".into()
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            min_gap_minutes: default_min_gap(),
            morning_end: default_morning_end(),
            afternoon_end: default_afternoon_end(),
        }
    }
}

/// A task with a start and end on the day.
struct Placement<'t> {
    template: &'t TaskTemplate,
    order: usize,
    start: u32,
    end: u32,
    compressed: bool,
}

impl Placement<'_> {
    fn interval(&self) -> Interval {
        Interval::new(self.start, self.end)
    }

    fn span(&self) -> String {
        format!("{}-{}", format_hhmm(self.start), format_hhmm(self.end))
    }
}

/// Builds the schedule for one date.
#[derive(Clone, Default)]
pub struct SchedulingEngine {
    config: SchedulerConfig,
    holidays: Option<Arc<dyn HolidayCalendar>>,
}

impl SchedulingEngine {
    /// Create a new engine with default config
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with custom config
    pub fn with_config(config: SchedulerConfig) -> Self {
        Self {
            config,
            holidays: None,
        }
    }

    /// Wire a holiday calendar for `business_days` rules
    pub fn with_holidays(mut self, holidays: Arc<dyn HolidayCalendar>) -> Self {
        self.holidays = Some(holidays);
        self
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Build the schedule for `date` from the default wake/sleep settings.
    pub fn build_schedule(
        &self,
        date: NaiveDate,
        templates: &[TaskTemplate],
        instances: &[TaskInstance],
        settings: &Settings,
    ) -> ScheduleResult {
        self.build_schedule_with_override(date, templates, instances, settings, None)
    }

    /// Build the schedule for `date`, honouring a per-day sleep override
    /// when its date matches.
    pub fn build_schedule_with_override(
        &self,
        date: NaiveDate,
        templates: &[TaskTemplate],
        instances: &[TaskInstance],
        settings: &Settings,
        sleep_override: Option<&SleepOverride>,
    ) -> ScheduleResult {
        let day_override = sleep_override.filter(|o| o.date == date);
        let wake = day_override
            .and_then(|o| o.wake_time.clone())
            .unwrap_or_else(|| settings.default_wake_time.clone());
        let sleep = day_override
            .and_then(|o| o.sleep_time.clone())
            .unwrap_or_else(|| settings.default_sleep_time.clone());

        match self.plan_day(date, templates, instances, settings, &wake, &sleep) {
            Ok(result) => result,
            Err(err) => {
                warn!(%date, error = %err, "schedule build failed");
                let sleep_schedule = SleepSchedule {
                    wake_time: wake,
                    sleep_time: sleep,
                    duration: 0,
                };
                ScheduleResult::failure(sleep_schedule, err.to_string())
            }
        }
    }

    fn plan_day(
        &self,
        date: NaiveDate,
        templates: &[TaskTemplate],
        instances: &[TaskInstance],
        settings: &Settings,
        wake: &str,
        sleep: &str,
    ) -> Result<ScheduleResult, ScheduleError> {
        // 1. Day window
        let window = day_window(wake, sleep)?;
        let sleep_duration = window.start + MINUTES_PER_DAY - window.end;
        let mut advisories = Vec::new();
        if sleep_duration < settings.desired_sleep_duration {
            advisories.push(format!(
                "Sleep window of {sleep_duration} minutes is shorter than the desired {} minutes",
                settings.desired_sleep_duration
            ));
        }

        // 2. Recurrence
        let due = self.due_templates(date, templates)?;
        let total_tasks = due.len();

        // 3. Dependencies
        let resolver = DependencyResolver::new(templates);
        let mut candidates = Vec::with_capacity(due.len());
        for (order, template) in due {
            match resolver.resolve(template) {
                Some(info) if !info.is_ok() => {
                    debug!(template = %template.id, status = %info.status, "dependency not satisfied");
                    advisories.push(info.describe(template));
                }
                _ => candidates.push((order, template)),
            }
        }

        // 9 (first half). Released instances give their time back before placement.
        let by_template: HashMap<&str, &TaskInstance> = instances
            .iter()
            .filter(|i| i.date == date)
            .rev()
            .map(|i| (i.template_id.as_str(), i))
            .collect();
        candidates.retain(|(_, t)| match by_template.get(t.id.as_str()) {
            Some(inst) if inst.status.releases_slot() => {
                debug!(template = %t.id, status = inst.status.as_str(), "slot released");
                false
            }
            _ => true,
        });

        // 4 + 5. Anchor fixed tasks and instance-pinned tasks
        let mut anchored: Vec<Placement> = Vec::new();
        let mut flexible: Vec<(usize, &TaskTemplate)> = Vec::new();
        for (order, template) in candidates {
            let pinned = by_template
                .get(template.id.as_str())
                .and_then(|i| i.modified_start_time.as_deref())
                .and_then(|value| match parse_hhmm(value) {
                    Ok(start) => Some(start),
                    Err(e) => {
                        advisories.push(format!(
                            "'{}' kept its default time: modified start time ignored ({e})",
                            template.task_name
                        ));
                        None
                    }
                });

            let start = match (&template.scheduling, pinned) {
                (_, Some(start)) => start,
                (Scheduling::Fixed { default_time }, None) => parse_hhmm(default_time)?,
                (Scheduling::Flexible { .. }, None) => {
                    flexible.push((order, template));
                    continue;
                }
            };
            // Both terms are at most one day once the template validates.
            anchored.push(Placement {
                template,
                order,
                start,
                end: start + template.duration_minutes,
                compressed: false,
            });
        }
        anchored.sort_by_key(|p| (p.start, p.order));
        advisories.extend(anchored_advisories(&anchored, window));

        // 6. Free gaps around the anchored tasks
        let busy: Vec<Interval> = anchored.iter().map(Placement::interval).collect();
        let gaps = GapDetector::new()
            .with_min_gap(self.config.min_gap_minutes)
            .find_gaps(&busy, window.start, window.end);
        let mut pool = GapPool::new(gaps, self.config.min_gap_minutes);

        // 7. Placement order; sort_by is stable so template order breaks ties
        flexible.sort_by(|(_, a), (_, b)| {
            b.priority
                .cmp(&a.priority)
                .then_with(|| b.is_mandatory.cmp(&a.is_mandatory))
                .then_with(|| b.duration_minutes.cmp(&a.duration_minutes))
        });

        // 8. Greedy gap filling
        let mut placed = anchored;
        for (order, template) in flexible {
            match self.place_flexible(template, window, &mut pool, &mut advisories)? {
                Some(slot) => {
                    debug!(
                        template = %template.id,
                        start = %format_hhmm(slot.start),
                        end = %format_hhmm(slot.end),
                        compressed = slot.compressed,
                        "flexible task placed"
                    );
                    placed.push(Placement {
                        template,
                        order,
                        start: slot.start,
                        end: slot.end,
                        compressed: slot.compressed,
                    });
                }
                None => advisories.push(format!(
                    "'{}' could not be scheduled: no free gap of {} minutes",
                    template.task_name, template.duration_minutes
                )),
            }
        }

        // 9 (second half) + 10. Attach instance status and emit in time order
        placed.sort_by_key(|p| (p.start, p.order));
        let schedule: Vec<ScheduleBlock> = placed
            .iter()
            .map(|p| ScheduleBlock {
                template_id: p.template.id.clone(),
                task_name: p.template.task_name.clone(),
                start_time: format_hhmm(p.start),
                end_time: format_hhmm(p.end),
                status: by_template
                    .get(p.template.id.as_str())
                    .map_or(InstanceStatus::Pending, |i| i.status),
                compressed: p.compressed,
            })
            .collect();

        let scheduled_tasks = schedule.len();
        info!(
            %date,
            total = total_tasks,
            scheduled = scheduled_tasks,
            advisories = advisories.len(),
            "schedule built"
        );

        Ok(ScheduleResult {
            success: true,
            schedule,
            sleep_schedule: SleepSchedule {
                wake_time: wake.to_string(),
                sleep_time: sleep.to_string(),
                duration: sleep_duration,
            },
            total_tasks,
            scheduled_tasks,
            message: Some(format!("Scheduled {scheduled_tasks} of {total_tasks} tasks")),
            error: None,
            advisories,
        })
    }

    /// Active templates due on `date`, paired with their input position.
    /// Any active template that fails validation aborts the run.
    fn due_templates<'t>(
        &self,
        date: NaiveDate,
        templates: &'t [TaskTemplate],
    ) -> Result<Vec<(usize, &'t TaskTemplate)>, ScheduleError> {
        let recurrence = match &self.holidays {
            Some(holidays) => RecurrenceEngine::with_holidays(holidays.as_ref()),
            None => RecurrenceEngine::new(),
        };

        let mut due = Vec::new();
        for (order, template) in templates.iter().enumerate().filter(|(_, t)| t.is_active) {
            let reasons = template.validate();
            if !reasons.is_empty() {
                return Err(ScheduleError::InvalidTemplate {
                    template_id: template.id.clone(),
                    reasons,
                });
            }
            let is_due = template
                .recurrence_rule
                .as_ref()
                .map_or(true, |rule| recurrence.is_due(rule, date, template.created_on));
            if is_due {
                due.push((order, template));
            }
        }
        Ok(due)
    }

    /// Place one flexible task, preferring its time window.
    fn place_flexible(
        &self,
        template: &TaskTemplate,
        window: Interval,
        pool: &mut GapPool,
        advisories: &mut Vec<String>,
    ) -> Result<Option<Slot>, ScheduleError> {
        let preferred = match &template.scheduling {
            Scheduling::Flexible { time_window } => *time_window,
            Scheduling::Fixed { .. } => TimeWindow::Anytime,
        };
        let range = self.window_range(preferred, window)?;
        let duration = template.duration_minutes;
        let min = template.min_duration_minutes;

        // Full length anywhere beats compressing; the preferred window wins
        // within each pass.
        let search = |find: &dyn Fn(Interval) -> Option<Slot>| {
            if let Some(slot) = range.and_then(find) {
                return Some((slot, false));
            }
            if range == Some(window) {
                return None;
            }
            find(window).map(|slot| (slot, true))
        };
        let placed = search(&|r: Interval| pool.find_full(r, duration))
            .or_else(|| search(&|r: Interval| pool.find_compressed(r, duration, min)));

        let Some((slot, outside)) = placed else {
            return Ok(None);
        };
        if outside {
            advisories.push(format!(
                "'{}' placed outside its preferred {} window",
                template.task_name,
                preferred.as_str()
            ));
        }
        if slot.compressed {
            advisories.push(format!(
                "'{}' compressed from {duration} to {} minutes to fit {}-{}",
                template.task_name,
                slot.end - slot.start,
                format_hhmm(slot.start),
                format_hhmm(slot.end)
            ));
        }
        pool.reserve(slot);
        Ok(Some(slot))
    }

    /// The part of the waking day covered by `time_window`, if any.
    fn window_range(
        &self,
        time_window: TimeWindow,
        day: Interval,
    ) -> Result<Option<Interval>, ScheduleError> {
        let morning_end = parse_hhmm(&self.config.morning_end)?;
        let afternoon_end = parse_hhmm(&self.config.afternoon_end)?;
        let raw = match time_window {
            TimeWindow::Morning => Interval::new(day.start, morning_end),
            TimeWindow::Afternoon => Interval::new(morning_end, afternoon_end),
            TimeWindow::Evening => Interval::new(afternoon_end, day.end),
            TimeWindow::Anytime => day,
        };
        Ok(raw.clamp(day.start, day.end))
    }
}

/// Convenience function using an engine with default config
pub fn build_schedule(
    date: NaiveDate,
    templates: &[TaskTemplate],
    instances: &[TaskInstance],
    settings: &Settings,
) -> ScheduleResult {
    SchedulingEngine::new().build_schedule(date, templates, instances, settings)
}

/// Waking window for the day; sleep must come after wake.
fn day_window(wake: &str, sleep: &str) -> Result<Interval, ScheduleError> {
    let start = parse_hhmm(wake)?;
    let end = parse_hhmm(sleep)?;
    if end <= start {
        return Err(ScheduleError::EmptyWindow {
            wake: wake.to_string(),
            sleep: sleep.to_string(),
        });
    }
    Ok(Interval::new(start, end))
}

/// Overlaps and out-of-window notes for anchored tasks, which are placed
/// as given rather than corrected. Expects `anchored` sorted by start.
fn anchored_advisories(anchored: &[Placement], window: Interval) -> Vec<String> {
    let mut notes = Vec::new();
    for (i, a) in anchored.iter().enumerate() {
        if a.start < window.start || a.end > window.end {
            notes.push(format!(
                "'{}' ({}) falls outside the waking window {}-{}",
                a.template.task_name,
                a.span(),
                format_hhmm(window.start),
                format_hhmm(window.end)
            ));
        }
        for b in anchored[i + 1..].iter().take_while(|b| b.start < a.end) {
            if a.interval().overlaps(&b.interval()) {
                notes.push(format!(
                    "'{}' ({}) overlaps '{}' ({})",
                    a.template.task_name,
                    a.span(),
                    b.template.task_name,
                    b.span()
                ));
            }
        }
    }
    notes
}
