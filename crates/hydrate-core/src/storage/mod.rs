mod config;

pub use config::{Config, NotificationsConfig, ProgressConfig, ReminderConfig};

use std::path::PathBuf;

use crate::error::ConfigError;

/// Returns `~/.config/hydrate[-dev]/` based on HYDRATE_ENV.
///
/// Set HYDRATE_ENV=dev to use development data directory.
///
/// # Errors
/// Returns `NoDataDir` without a home directory, or an error if creating
/// the config directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let home = dirs::home_dir().ok_or(ConfigError::NoDataDir)?;
    let dir = home.join(".config").join(dir_name(std::env::var("HYDRATE_ENV").ok().as_deref()));

    std::fs::create_dir_all(&dir).map_err(|e| ConfigError::SaveFailed {
        path: dir.clone(),
        message: e.to_string(),
    })?;
    Ok(dir)
}

fn dir_name(env: Option<&str>) -> &'static str {
    match env {
        Some("dev") => "hydrate-dev",
        _ => "hydrate",
    }
}
