//! TOML-based application configuration.
//!
//! Stores user preferences:
//! - Reminder interval and message
//! - Daily goal
//! - Which notification channels to use
//!
//! Configuration is stored at `~/.config/hydrate/config.toml`. Session
//! progress is never written here.

use std::num::NonZeroU32;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::data_dir;
use crate::error::ConfigError;
use crate::reminder::{DEFAULT_MESSAGE, MAX_INTERVAL_MINUTES, MIN_INTERVAL_MINUTES};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReminderConfig {
    #[serde(default = "default_interval_minutes")]
    pub interval_minutes: u64,
    #[serde(default = "default_message")]
    pub message: String,
    /// Tick cadence of the countdown driver.
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressConfig {
    #[serde(default = "default_goal")]
    pub goal: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationsConfig {
    /// Audio cue on every reminder.
    #[serde(default = "default_true")]
    pub sound: bool,
    /// System notification, once permission is granted.
    #[serde(default = "default_true")]
    pub system: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub reminder: ReminderConfig,
    #[serde(default)]
    pub progress: ProgressConfig,
    #[serde(default)]
    pub notifications: NotificationsConfig,
}

fn default_interval_minutes() -> u64 {
    60
}
fn default_message() -> String {
    DEFAULT_MESSAGE.into()
}
fn default_tick_ms() -> u64 {
    1000
}
fn default_goal() -> u32 {
    crate::progress::DEFAULT_GOAL.get()
}
fn default_true() -> bool {
    true
}

impl Default for ReminderConfig {
    fn default() -> Self {
        Self {
            interval_minutes: default_interval_minutes(),
            message: default_message(),
            tick_ms: default_tick_ms(),
        }
    }
}

impl Default for ProgressConfig {
    fn default() -> Self {
        Self {
            goal: default_goal(),
        }
    }
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self {
            sound: true,
            system: true,
        }
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
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
        if let Some(parent) = parent_path {
            for part in parent.split('.') {
                current = current.get_mut(part).ok_or_else(unknown)?;
            }
        }

        let obj = current.as_object_mut().ok_or_else(unknown)?;
        let existing = obj.get(leaf).ok_or_else(unknown)?;

        let new_value = match existing {
            serde_json::Value::Bool(_) => serde_json::Value::Bool(
                value
                    .parse::<bool>()
                    .map_err(|_| invalid(format!("cannot parse '{value}' as bool")))?,
            ),
            serde_json::Value::Number(_) => value
                .parse::<u64>()
                .map(|n| serde_json::Value::Number(n.into()))
                .map_err(|_| invalid(format!("cannot parse '{value}' as number")))?,
            serde_json::Value::Object(_) => return Err(unknown()),
            _ => serde_json::Value::String(value.into()),
        };

        obj.insert(leaf.to_string(), new_value);
        Ok(())
    }

    fn path() -> Result<PathBuf, ConfigError> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from the default location, writing defaults if missing.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
    }

    /// Load from `path`, writing defaults there if the file is missing.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, fails
    /// validation, or the defaults cannot be written.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let cfg: Config = toml::from_str(&content)?;
                cfg.validate()?;
                Ok(cfg)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "writing default config");
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

    /// Persist to the default location.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    /// Persist to `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
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
        Self::load().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "falling back to default config");
            Self::default()
        })
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by dot-separated key, in memory only.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown, the value cannot be parsed,
    /// or the result fails validation. `self` is unchanged on error.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json =
            serde_json::to_value(&*self).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Config =
            serde_json::from_value(json).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `InvalidValue` naming the first out-of-range field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let minutes = self.reminder.interval_minutes;
        if !(MIN_INTERVAL_MINUTES..=MAX_INTERVAL_MINUTES).contains(&minutes) {
            return Err(ConfigError::InvalidValue {
                key: "reminder.interval_minutes".into(),
                message: format!(
                    "{minutes} is outside {MIN_INTERVAL_MINUTES}..={MAX_INTERVAL_MINUTES}"
                ),
            });
        }
        if self.reminder.tick_ms == 0 {
            return Err(ConfigError::InvalidValue {
                key: "reminder.tick_ms".into(),
                message: "must be at least 1".into(),
            });
        }
        if self.progress.goal == 0 {
            return Err(ConfigError::InvalidValue {
                key: "progress.goal".into(),
                message: "must be at least 1".into(),
            });
        }
        Ok(())
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.reminder.interval_minutes.saturating_mul(60))
    }

    pub fn tick_period(&self) -> Duration {
        Duration::from_millis(self.reminder.tick_ms.max(1))
    }

    pub fn goal(&self) -> NonZeroU32 {
        NonZeroU32::new(self.progress.goal).unwrap_or(crate::progress::DEFAULT_GOAL)
    }
}
