//! On-disk configuration and JSON input files.

mod config;

pub use config::{Config, SleepConfig, TimelineConfig, DEFAULT_MAX_LANES};

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;

use crate::error::{ConfigError, Result};

/// Returns `~/.config/dayplan[-dev]/` based on DAYPLAN_ENV.
///
/// Set DAYPLAN_ENV=dev to use the development directory. DAYPLAN_CONFIG_DIR
/// replaces the directory entirely.
///
/// # Errors
/// Returns an error if creating the config directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let dir = match std::env::var_os("DAYPLAN_CONFIG_DIR") {
        Some(dir) => PathBuf::from(dir),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("DAYPLAN_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("dayplan-dev")
            } else {
                base_dir.join("dayplan")
            }
        }
    };

    std::fs::create_dir_all(&dir)
        .map_err(|e| ConfigError::DirUnavailable(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}

/// Read a JSON document (templates, instances, override) from `path`.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::TaskTemplate;

    #[test]
    fn read_json_parses_templates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("templates.json");
        std::fs::write(
            &path,
            r#"[{"id":"a","taskName":"A","schedulingType":"flexible","durationMinutes":30}]"#,
        )
        .unwrap();
        let templates: Vec<TaskTemplate> = read_json(&path).unwrap();
        assert_eq!(templates.len(), 1);
        assert_eq!(templates[0].id, "a");
    }

    #[test]
    fn read_json_reports_missing_file_and_bad_json() {
        let dir = tempfile::tempdir().unwrap();
        let missing = read_json::<Vec<TaskTemplate>>(&dir.path().join("nope.json"));
        assert!(matches!(missing, Err(crate::error::CoreError::Io(_))));

        let bad = dir.path().join("bad.json");
        std::fs::write(&bad, "{not json").unwrap();
        let parsed = read_json::<Vec<TaskTemplate>>(&bad);
        assert!(matches!(parsed, Err(crate::error::CoreError::Json(_))));
    }
}
