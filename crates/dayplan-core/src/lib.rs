//! # dayplan Core Library
//!
//! Scheduling core for a personal daily planner. Given task templates, the
//! day's task instances and the user's sleep settings, it decides which tasks
//! occur on a date and where they sit inside the waking window.
//!
//! ## Architecture
//!
//! - **Recurrence**: pure date predicates over closed rule types
//! - **Dependencies**: one-hop prerequisite checks with 2-cycle detection
//! - **Timeline**: gap detection and lane assignment over minute intervals
//! - **Scheduler**: fixed-task anchoring plus greedy gap filling
//! - **Storage**: TOML configuration and JSON input files
//!
//! The core never reads the wall clock; every operation takes its date as
//! input and returns a fresh value.
//!
//! ## Key Components
//!
//! - [`RecurrenceEngine`]: due-date checks and range expansion
//! - [`DependencyResolver`]: prerequisite status per template
//! - [`GapDetector`]: free time inside the day window
//! - [`SchedulingEngine`]: builds a [`ScheduleResult`] for one date
//! - [`assign_lanes`]: side-by-side layout for overlapping blocks
//! - [`Config`]: application configuration

pub mod clock;
pub mod dependency;
pub mod error;
pub mod recurrence;
pub mod schedule;
pub mod scheduler;
pub mod storage;
pub mod timeline;

pub use dependency::{resolve_dependency, DependencyInfo, DependencyResolver, DependencyStatus};
pub use error::{ConfigError, CoreError, ScheduleError};
pub use recurrence::{
    validate_rule, CustomPattern, DayOfMonth, Frequency, HolidayCalendar, RecurrenceEngine,
    RecurrenceRule, RuleValidation,
};
pub use schedule::{
    InstanceStatus, ScheduleBlock, ScheduleResult, Scheduling, Settings, SleepOverride,
    SleepSchedule, TaskInstance, TaskTemplate, TimeWindow,
};
pub use scheduler::{build_schedule, SchedulerConfig, SchedulingEngine};
pub use storage::Config;
pub use timeline::{assign_lanes, detect_gaps, Gap, GapDetector, Interval, LaneAssignment, TimelineBlock};
