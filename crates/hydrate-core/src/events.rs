use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Every state change in a session produces an Event.
/// The presentation layer renders from them; the session consumes the
/// tracker's events to keep the scheduler in step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    RemindersStarted {
        interval_secs: u64,
        next_trigger_at: DateTime<Utc>,
        at: DateTime<Utc>,
    },
    RemindersStopped {
        at: DateTime<Utc>,
    },
    /// The configured interval elapsed; a notification was attempted.
    ReminderTriggered {
        message: String,
        next_trigger_at: DateTime<Utc>,
        at: DateTime<Utc>,
    },
    IntervalChanged {
        interval_secs: u64,
        at: DateTime<Utc>,
    },
    MessageChanged {
        message: String,
        at: DateTime<Utc>,
    },
    DrinkLogged {
        completed_count: u32,
        goal: u32,
        at: DateTime<Utc>,
    },
    GoalReached {
        goal: u32,
        at: DateTime<Utc>,
    },
    ProgressReset {
        at: DateTime<Utc>,
    },
    StateSnapshot {
        is_active: bool,
        remaining_display: String,
        completed_count: u32,
        goal: u32,
        is_complete: bool,
        fill_level: f64,
        at: DateTime<Utc>,
    },
}
