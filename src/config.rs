use std::path::PathBuf;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::db::{queries, Database, DbError};
use crate::toast::{ToastLevel, DEFAULT_CAPACITY};

pub const STUDIO_CONFIG_SETTING_KEY: &str = "studio_config";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid configuration: {0}")]
    Invalid(String),
    #[error("{0}")]
    Db(#[from] DbError),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToastConfig {
    #[serde(default = "default_toast_capacity")]
    pub capacity: usize,
    #[serde(default = "default_success_ms")]
    pub success_ms: u64,
    #[serde(default = "default_error_ms")]
    pub error_ms: u64,
    #[serde(default = "default_warning_ms")]
    pub warning_ms: u64,
    #[serde(default = "default_info_ms")]
    pub info_ms: u64,
}

impl Default for ToastConfig {
    fn default() -> Self {
        Self {
            capacity: default_toast_capacity(),
            success_ms: default_success_ms(),
            error_ms: default_error_ms(),
            warning_ms: default_warning_ms(),
            info_ms: default_info_ms(),
        }
    }
}

impl ToastConfig {
    pub fn default_duration_ms(&self, level: ToastLevel) -> u64 {
        match level {
            ToastLevel::Success => self.success_ms,
            ToastLevel::Error => self.error_ms,
            ToastLevel::Warning => self.warning_ms,
            ToastLevel::Info => self.info_ms,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudioConfig {
    #[serde(default)]
    pub toast: ToastConfig,
    #[serde(default)]
    pub data_dir: Option<String>,
    #[serde(default = "default_env_file")]
    pub env_file: String,
}

impl Default for StudioConfig {
    fn default() -> Self {
        Self {
            toast: ToastConfig::default(),
            data_dir: None,
            env_file: default_env_file(),
        }
    }
}

impl StudioConfig {
    pub fn apply_env_overrides(&mut self) {
        if let Ok(value) = std::env::var("STUDIO_DATA_DIR") {
            if !value.trim().is_empty() {
                self.data_dir = Some(value.trim().to_string());
            }
        }

        if let Ok(value) = std::env::var("STUDIO_ENV_FILE") {
            if !value.trim().is_empty() {
                self.env_file = value.trim().to_string();
            }
        } else if let Ok(value) = std::env::var("ENV_FILE") {
            if !value.trim().is_empty() {
                self.env_file = value.trim().to_string();
            }
        }

        if let Ok(value) = std::env::var("STUDIO_TOAST_CAPACITY") {
            match value.trim().parse::<usize>() {
                Ok(capacity) => self.toast.capacity = capacity,
                Err(error) => {
                    tracing::warn!("ignoring STUDIO_TOAST_CAPACITY={value:?}: {error}");
                }
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.toast.capacity == 0 {
            return Err(ConfigError::Invalid(
                "toast capacity must be greater than 0".to_string(),
            ));
        }
        if self.env_file.trim().is_empty() {
            return Err(ConfigError::Invalid("env file path cannot be empty".to_string()));
        }
        Ok(())
    }

    /// Directory holding the studio database.
    pub fn data_dir(&self) -> PathBuf {
        if let Some(path) = self.data_dir.as_deref() {
            let trimmed = path.trim();
            if !trimmed.is_empty() {
                return PathBuf::from(trimmed);
            }
        }

        #[cfg(target_os = "windows")]
        {
            if let Ok(app_data) = std::env::var("APPDATA") {
                return PathBuf::from(app_data).join("Studio");
            }
        }

        if let Ok(home) = std::env::var("HOME") {
            return PathBuf::from(home).join(".studio");
        }

        if let Ok(home) = std::env::var("USERPROFILE") {
            return PathBuf::from(home).join(".studio");
        }

        PathBuf::from(".studio")
    }

    pub fn db_path(&self) -> PathBuf {
        self.data_dir().join("studio.db")
    }

    pub fn env_file_path(&self) -> PathBuf {
        PathBuf::from(&self.env_file)
    }
}

/// Read the stored config (defaults when absent), then apply env overrides.
pub fn load_studio_config(db: &Database) -> Result<StudioConfig, ConfigError> {
    let raw = queries::get_setting(db, STUDIO_CONFIG_SETTING_KEY)?;

    let mut config = match raw {
        Some(raw) => serde_json::from_str::<StudioConfig>(&raw).map_err(|error| {
            ConfigError::Invalid(format!("invalid studio configuration in settings: {error}"))
        })?,
        None => StudioConfig::default(),
    };

    config.apply_env_overrides();
    config.validate()?;
    Ok(config)
}

pub fn save_studio_config(db: &Database, config: &StudioConfig) -> Result<(), ConfigError> {
    config.validate()?;
    let value = serde_json::to_string(config)
        .map_err(|error| ConfigError::Invalid(format!("failed to serialize config: {error}")))?;
    queries::upsert_setting(db, STUDIO_CONFIG_SETTING_KEY, &value, &Utc::now().to_rfc3339())?;
    Ok(())
}

fn default_toast_capacity() -> usize {
    DEFAULT_CAPACITY
}

fn default_success_ms() -> u64 {
    3_000
}

fn default_error_ms() -> u64 {
    5_000
}

fn default_warning_ms() -> u64 {
    4_000
}

fn default_info_ms() -> u64 {
    3_000
}

fn default_env_file() -> String {
    ".env".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toast_defaults_match_documented_durations() {
        let config = ToastConfig::default();
        assert_eq!(config.capacity, 5);
        assert_eq!(config.default_duration_ms(ToastLevel::Success), 3_000);
        assert_eq!(config.default_duration_ms(ToastLevel::Error), 5_000);
        assert_eq!(config.default_duration_ms(ToastLevel::Warning), 4_000);
        assert_eq!(config.default_duration_ms(ToastLevel::Info), 3_000);
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config: StudioConfig =
            serde_json::from_str(r#"{"toast":{"error_ms":8000}}"#).unwrap();
        assert_eq!(config.toast.error_ms, 8_000);
        assert_eq!(config.toast.success_ms, 3_000);
        assert_eq!(config.env_file, ".env");
    }

    #[test]
    fn zero_capacity_is_rejected() {
        let mut config = StudioConfig::default();
        config.toast.capacity = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn explicit_data_dir_wins() {
        let config = StudioConfig {
            data_dir: Some("/tmp/studio-data".to_string()),
            ..StudioConfig::default()
        };
        assert_eq!(config.db_path(), PathBuf::from("/tmp/studio-data/studio.db"));
    }

    #[test]
    fn stored_config_round_trips_through_settings() {
        let db = Database::open_in_memory().unwrap();
        let mut config = StudioConfig::default();
        config.toast.warning_ms = 4_500;
        config.env_file = "deploy/.env".to_string();
        save_studio_config(&db, &config).unwrap();

        let raw = queries::get_setting(&db, STUDIO_CONFIG_SETTING_KEY).unwrap().unwrap();
        let stored: StudioConfig = serde_json::from_str(&raw).unwrap();
        assert_eq!(stored.toast.warning_ms, 4_500);
        assert_eq!(stored.env_file, "deploy/.env");
    }
}
