use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::NaiveDate;
use clap::Subcommand;
use dayplan_core::storage::read_json;
use dayplan_core::{
    assign_lanes, Config, InstanceStatus, ScheduleBlock, ScheduleResult, SchedulingEngine,
    SleepOverride, TaskInstance, TaskTemplate, TimelineBlock,
};
use serde::Serialize;
use serde_json::Value;

#[derive(Subcommand)]
pub enum ScheduleAction {
    /// Build the schedule for one date
    Build {
        /// Target date (YYYY-MM-DD)
        #[arg(long)]
        date: NaiveDate,
        /// JSON file with an array of task templates
        #[arg(long)]
        templates: PathBuf,
        /// JSON file with an array of task instances
        #[arg(long)]
        instances: Option<PathBuf>,
        /// JSON file with a sleep override for the date
        #[arg(long = "override")]
        sleep_override: Option<PathBuf>,
        /// Print the full result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Assign timeline lanes to placed blocks
    Lanes {
        /// JSON file with a schedule result or an array of schedule blocks
        #[arg(long)]
        blocks: PathBuf,
        /// Lanes before blocks are hidden (defaults to timeline.max_lanes)
        #[arg(long)]
        max_lanes: Option<usize>,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LaneRow<'a> {
    template_id: &'a str,
    start_time: &'a str,
    end_time: &'a str,
    lane_index: Option<usize>,
    hidden: bool,
}

pub fn run(action: ScheduleAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ScheduleAction::Build {
            date,
            templates,
            instances,
            sleep_override,
            json,
        } => {
            let config = Config::load()?;
            let templates: Vec<TaskTemplate> = read_json(&templates)?;
            let instances: Vec<TaskInstance> = match instances {
                Some(path) => read_json(&path)?,
                None => Vec::new(),
            };
            let sleep_override: Option<SleepOverride> = match sleep_override {
                Some(path) => Some(read_json(&path)?),
                None => None,
            };

            tracing::debug!(
                templates = templates.len(),
                instances = instances.len(),
                has_override = sleep_override.is_some(),
                "inputs loaded"
            );

            let engine = SchedulingEngine::with_config(config.scheduler.clone())
                .with_holidays(Arc::new(config.holiday_calendar()));
            let result = engine.build_schedule_with_override(
                date,
                &templates,
                &instances,
                &config.sleep_settings(),
                sleep_override.as_ref(),
            );

            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                print_result(date, &result);
            }
            if let Some(error) = result.error.filter(|_| !result.success) {
                return Err(error.into());
            }
        }
        ScheduleAction::Lanes { blocks, max_lanes } => {
            let blocks = load_blocks(&blocks)?;
            let max_lanes = match max_lanes {
                Some(n) => n,
                None => Config::load()?.timeline.max_lanes,
            };

            let timeline = blocks
                .iter()
                .map(TimelineBlock::from_schedule_block)
                .collect::<Result<Vec<_>, _>>()?;
            let lanes = assign_lanes(&timeline, max_lanes);

            let rows: Vec<LaneRow> = blocks
                .iter()
                .zip(&lanes)
                .map(|(block, lane)| LaneRow {
                    template_id: &block.template_id,
                    start_time: &block.start_time,
                    end_time: &block.end_time,
                    lane_index: lane.lane_index,
                    hidden: lane.hidden,
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&rows)?);
        }
    }
    Ok(())
}

fn print_result(date: NaiveDate, result: &ScheduleResult) {
    if !result.success {
        return;
    }
    println!("{date}: {}", result.message.as_deref().unwrap_or_default());
    for block in &result.schedule {
        let mut line = format!("{}-{}  {}", block.start_time, block.end_time, block.task_name);
        if block.status != InstanceStatus::Pending {
            line.push_str(&format!(" [{}]", block.status.as_str()));
        }
        if block.compressed {
            line.push_str(" (compressed)");
        }
        println!("{line}");
    }
    let sleep = &result.sleep_schedule;
    println!(
        "sleep {} -> {} ({} min)",
        sleep.sleep_time, sleep.wake_time, sleep.duration
    );
    for note in &result.advisories {
        println!("note: {note}");
    }
}

/// Blocks from either a full schedule result or a bare array.
fn load_blocks(path: &Path) -> Result<Vec<ScheduleBlock>, Box<dyn std::error::Error>> {
    let value: Value = read_json(path)?;
    let blocks = match value {
        Value::Object(mut map) => map
            .remove("schedule")
            .ok_or("expected a schedule result or an array of blocks")?,
        other => other,
    };
    Ok(serde_json::from_value(blocks)?)
}
