//! Error types for hydrate-core.
//!
//! Nothing in the reminder subsystem is fatal: every [`ReminderError`] is a
//! rejected command that leaves state unchanged. Callers may surface it
//! (e.g. by disabling a control) or ignore it.

use std::path::PathBuf;
use thiserror::Error;

/// Commands rejected by the reminder scheduler or progress tracker.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReminderError {
    /// Interval or message edited while reminders are running
    #[error("Reminder settings are locked while reminders are active")]
    ConfigurationLocked,

    /// Interval outside the accepted range
    #[error("Invalid interval: {minutes} minutes (expected {min}..={max})")]
    InvalidInterval { minutes: u64, min: u64, max: u64 },

    /// Drink logged after the goal was already reached
    #[error("Goal of {goal} already reached; reset to start again")]
    GoalAlreadyReached { goal: u32 },

    /// Drink logged while reminders are stopped
    #[error("Drinks can only be logged while reminders are active")]
    RemindersInactive,

    /// System notification permission not granted
    #[error("Notification permission denied")]
    PermissionDenied,
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Unknown configuration key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),

    /// Home directory could not be resolved
    #[error("Could not determine configuration directory")]
    NoDataDir,
}

/// Notification delivery failures. Never propagated past the dispatcher.
#[derive(Error, Debug)]
pub enum DispatchError {
    /// Audio cue could not be played
    #[error("Audio playback failed: {0}")]
    Playback(String),

    /// System notification could not be shown
    #[error("Notification delivery failed: {0}")]
    Delivery(String),

    /// No notification backend on this platform
    #[error("System notifications are not supported on this platform")]
    Unsupported,
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::ParseFailed(err.to_string())
    }
}
