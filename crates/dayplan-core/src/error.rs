//! Core error types for dayplan-core.
//!
//! Recoverable scheduling outcomes (unplaceable tasks, dropped dependents,
//! overlapping fixed tasks) are not errors; they surface as advisories on
//! [`ScheduleResult`](crate::schedule::ScheduleResult). The types here cover
//! structural failures and the configuration layer.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for dayplan-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Scheduling input errors
    #[error("Schedule error: {0}")]
    Schedule(#[from] ScheduleError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parse errors
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Structural problems that make a day impossible to schedule.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScheduleError {
    /// A time of day that is not `HH:MM`
    #[error("Invalid time '{value}': expected HH:MM")]
    InvalidTime { value: String },

    /// Sleep time at or before wake time
    #[error("Invalid day window: sleep time ({sleep}) must be after wake time ({wake})")]
    EmptyWindow { wake: String, sleep: String },

    /// A template whose definition cannot be scheduled as written
    #[error("Invalid template '{template_id}': {}", reasons.join("; "))]
    InvalidTemplate {
        template_id: String,
        reasons: Vec<String>,
    },
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Could not determine or create the config directory
    #[error("Config directory unavailable: {0}")]
    DirUnavailable(String),

    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Unknown dot-path key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_template_lists_every_reason() {
        let err = ScheduleError::InvalidTemplate {
            template_id: "t1".to_string(),
            reasons: vec!["priority must be 1..5".into(), "duration must be > 0".into()],
        };
        assert_eq!(
            err.to_string(),
            "Invalid template 't1': priority must be 1..5; duration must be > 0"
        );
    }

    #[test]
    fn schedule_error_converts_into_core_error() {
        let err: CoreError = ScheduleError::InvalidTime {
            value: "25:99".into(),
        }
        .into();
        assert!(matches!(err, CoreError::Schedule(_)));
    }
}
