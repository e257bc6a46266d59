//! TOML-based application configuration.
//!
//! Stores:
//! - Sleep settings (default wake/sleep time, desired sleep)
//! - Scheduler tuning (minimum gap, time-window boundaries)
//! - Timeline lane limit
//! - Holidays skipped by `business_days` rules
//!
//! Configuration is stored at `~/.config/dayplan/config.toml`.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::data_dir;
use crate::clock::parse_hhmm;
use crate::error::ConfigError;
use crate::schedule::Settings;
use crate::scheduler::SchedulerConfig;

/// Lanes drawn side by side before blocks are hidden.
pub const DEFAULT_MAX_LANES: usize = 2;

/// Timeline rendering configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineConfig {
    #[serde(default = "default_max_lanes")]
    pub max_lanes: usize,
}

fn default_max_lanes() -> usize {
    DEFAULT_MAX_LANES
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            max_lanes: default_max_lanes(),
        }
    }
}

/// Sleep settings as stored in `[settings]`.
///
/// Mirrors [`Settings`] with the snake_case keys every other table uses.
/// Templates and results keep camelCase on the JSON side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SleepConfig {
    #[serde(default = "default_desired_sleep")]
    pub desired_sleep_duration: u32,
    #[serde(default = "default_wake_time")]
    pub default_wake_time: String,
    #[serde(default = "default_sleep_time")]
    pub default_sleep_time: String,
}

fn default_desired_sleep() -> u32 {
    Settings::default().desired_sleep_duration
}
fn default_wake_time() -> String {
    Settings::default().default_wake_time
}
fn default_sleep_time() -> String {
    Settings::default().default_sleep_time
}

impl Default for SleepConfig {
    fn default() -> Self {
        Self::from(Settings::default())
    }
}

impl From<Settings> for SleepConfig {
    fn from(settings: Settings) -> Self {
        Self {
            desired_sleep_duration: settings.desired_sleep_duration,
            default_wake_time: settings.default_wake_time,
            default_sleep_time: settings.default_sleep_time,
        }
    }
}

impl From<&SleepConfig> for Settings {
    fn from(config: &SleepConfig) -> Self {
        Self {
            desired_sleep_duration: config.desired_sleep_duration,
            default_wake_time: config.default_wake_time.clone(),
            default_sleep_time: config.default_sleep_time.clone(),
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Dates skipped by `business_days` rules
    #[serde(default)]
    pub holidays: Vec<NaiveDate>,
    #[serde(default)]
    pub settings: SleepConfig,
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    #[serde(default)]
    pub timeline: TimelineConfig,
}

impl Config {
    fn get_json_value_by_path<'a>(root: &'a Value, key: &str) -> Option<&'a Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(root: &mut Value, key: &str, value: &str) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let (parent_path, leaf) = match key.rsplit_once('.') {
            Some((parent, leaf)) => (Some(parent), leaf),
            None => (None, key),
        };
        if leaf.is_empty() {
            return Err(unknown());
        }

        let mut current = root;
        if let Some(parent_path) = parent_path {
            for part in parent_path.split('.') {
                current = current.get_mut(part).ok_or_else(unknown)?;
            }
        }
        let obj = current.as_object_mut().ok_or_else(unknown)?;
        let existing = obj.get(leaf).ok_or_else(unknown)?;

        let new_value = match existing {
            Value::Bool(_) => Value::Bool(
                value
                    .parse::<bool>()
                    .map_err(|e| invalid(e.to_string()))?,
            ),
            Value::Number(_) => {
                let n = value
                    .parse::<u64>()
                    .map_err(|_| invalid(format!("cannot parse '{value}' as a whole number")))?;
                Value::Number(n.into())
            }
            Value::Object(_) | Value::Array(_) => {
                serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
            }
            _ => Value::String(value.into()),
        };

        obj.insert(leaf.to_string(), new_value);
        Ok(())
    }

    fn flatten_into(prefix: &str, value: &Value, out: &mut Vec<(String, String)>) {
        match value {
            Value::Object(map) => {
                for (k, v) in map {
                    let key = if prefix.is_empty() {
                        k.clone()
                    } else {
                        format!("{prefix}.{k}")
                    };
                    Self::flatten_into(&key, v, out);
                }
            }
            Value::String(s) => out.push((prefix.to_string(), s.clone())),
            other => out.push((prefix.to_string(), other.to_string())),
        }
    }

    fn path() -> Result<PathBuf, ConfigError> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from the data directory, writing defaults if no file exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
    }

    /// Load from an explicit path, writing defaults if the file is missing.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let cfg: Config = toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                })?;
                cfg.validate()?;
                Ok(cfg)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
            Err(e) => Err(ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
        }
    }

    /// Persist to the data directory.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    /// Persist to an explicit path.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))
    }

    /// Load from disk, returning default on error.
    /// This is a convenience method that never fails.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_default()
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by dot-separated key. Does not save.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value does not fit the
    /// field; the config is left unchanged in that case.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };
        let mut json = serde_json::to_value(&*self).map_err(|e| invalid(e.to_string()))?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Config = serde_json::from_value(json).map_err(|e| invalid(e.to_string()))?;
        updated.validate().map_err(|e| invalid(e.to_string()))?;
        *self = updated;
        Ok(())
    }

    /// Every leaf value as `(dot.path, value)`, sorted by key.
    pub fn entries(&self) -> Vec<(String, String)> {
        let mut out = Vec::new();
        if let Ok(json) = serde_json::to_value(self) {
            Self::flatten_into("", &json, &mut out);
        }
        out.sort();
        out
    }

    /// Check that every time of day in the config parses and the window
    /// boundaries are in order.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let time = |key: &str, value: &str| {
            parse_hhmm(value).map_err(|e| ConfigError::InvalidValue {
                key: key.to_string(),
                message: e.to_string(),
            })
        };
        time("settings.default_wake_time", &self.settings.default_wake_time)?;
        time("settings.default_sleep_time", &self.settings.default_sleep_time)?;
        let morning_end = time("scheduler.morning_end", &self.scheduler.morning_end)?;
        let afternoon_end = time("scheduler.afternoon_end", &self.scheduler.afternoon_end)?;
        if afternoon_end < morning_end {
            return Err(ConfigError::InvalidValue {
                key: "scheduler.afternoon_end".to_string(),
                message: format!(
                    "must not be before scheduler.morning_end ({})",
                    self.scheduler.morning_end
                ),
            });
        }
        Ok(())
    }

    /// Sleep settings in the form the scheduler takes.
    pub fn sleep_settings(&self) -> Settings {
        Settings::from(&self.settings)
    }

    /// Holidays as a lookup set for recurrence.
    pub fn holiday_calendar(&self) -> BTreeSet<NaiveDate> {
        self.holidays.iter().copied().collect()
    }
}
