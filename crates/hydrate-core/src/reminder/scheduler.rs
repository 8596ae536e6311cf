//! Reminder scheduler.
//!
//! Like the rest of the core, the scheduler has no internal thread. The
//! caller hands it `now` on every `tick()`; a trigger fires once `now`
//! reaches `next_trigger_at`.
//!
//! ## State Transitions
//!
//! ```text
//! Idle --start--> Running --stop--> Idle
//! Running --tick (trigger)--> Running
//! ```
//!
//! Triggers are rescheduled from the previous trigger time, not from the
//! tick that observed them, so late ticks never push the schedule back. A
//! tick that arrives several intervals late fires one missed trigger; the
//! following ticks fire the rest until the schedule is ahead of `now`.

use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use super::countdown::{format_remaining, remaining_ms, INACTIVE_DISPLAY};
use crate::error::ReminderError;
use crate::events::Event;
use crate::notify::Notifier;

pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(60 * 60);
pub const DEFAULT_MESSAGE: &str = "Time to drink water!";
pub const MIN_INTERVAL_MINUTES: u64 = 1;
pub const MAX_INTERVAL_MINUTES: u64 = 120;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchedulerState {
    Idle,
    Running,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "SchedulerRecord")]
pub struct ReminderScheduler {
    interval_ms: u64,
    message: String,
    state: SchedulerState,
    /// Set iff `state` is `Running`.
    next_trigger_at: Option<DateTime<Utc>>,
    /// Countdown computed by the last `start()` or `tick()`.
    remaining_ms: Option<u64>,
}

/// Unvalidated serialized form of [`ReminderScheduler`].
#[derive(Deserialize)]
struct SchedulerRecord {
    interval_ms: u64,
    message: String,
    state: SchedulerState,
    next_trigger_at: Option<DateTime<Utc>>,
    remaining_ms: Option<u64>,
}

impl TryFrom<SchedulerRecord> for ReminderScheduler {
    type Error = String;

    fn try_from(record: SchedulerRecord) -> Result<Self, Self::Error> {
        let interval_ms = validate_interval(Duration::from_millis(record.interval_ms))
            .map_err(|e| e.to_string())?;
        let running = record.state == SchedulerState::Running;
        // next_trigger_at is set iff running.
        let next_trigger_at = if running {
            Some(
                record
                    .next_trigger_at
                    .ok_or("running scheduler has no next trigger time")?,
            )
        } else {
            None
        };
        Ok(Self {
            interval_ms,
            message: record.message,
            state: record.state,
            next_trigger_at,
            remaining_ms: if running { record.remaining_ms } else { None },
        })
    }
}

impl Default for ReminderScheduler {
    fn default() -> Self {
        Self {
            interval_ms: DEFAULT_INTERVAL.as_millis() as u64,
            message: DEFAULT_MESSAGE.to_string(),
            state: SchedulerState::Idle,
            next_trigger_at: None,
            remaining_ms: None,
        }
    }
}

impl ReminderScheduler {
    /// Create an idle scheduler.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInterval` if `interval` is zero or longer than
    /// [`MAX_INTERVAL_MINUTES`].
    pub fn new(interval: Duration, message: impl Into<String>) -> Result<Self, ReminderError> {
        Ok(Self {
            interval_ms: validate_interval(interval)?,
            message: message.into(),
            ..Self::default()
        })
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state == SchedulerState::Running
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn next_trigger_at(&self) -> Option<DateTime<Utc>> {
        self.next_trigger_at
    }

    pub fn remaining_ms(&self) -> Option<u64> {
        self.remaining_ms
    }

    /// `MM:SS` countdown, or `--:--` while idle.
    pub fn remaining_display(&self) -> String {
        match (self.state, self.remaining_ms) {
            (SchedulerState::Running, Some(ms)) => format_remaining(ms),
            _ => INACTIVE_DISPLAY.to_string(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Start with the configured interval and message. No-op while running.
    pub fn start(&mut self, now: DateTime<Utc>) -> Option<Event> {
        if self.is_active() {
            return None;
        }
        let next = now + self.interval_delta();
        self.state = SchedulerState::Running;
        self.next_trigger_at = Some(next);
        self.remaining_ms = Some(self.interval_ms);
        tracing::info!(interval_ms = self.interval_ms, %next, "reminders started");
        Some(Event::RemindersStarted {
            interval_secs: self.interval_ms / 1000,
            next_trigger_at: next,
            at: now,
        })
    }

    /// Apply `interval` and `message`, then start. Running schedulers keep
    /// their settings and return `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInterval` for an out-of-range interval.
    pub fn start_with(
        &mut self,
        interval: Duration,
        message: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Result<Option<Event>, ReminderError> {
        if self.is_active() {
            return Ok(None);
        }
        self.interval_ms = validate_interval(interval)?;
        self.message = message.into();
        Ok(self.start(now))
    }

    /// Stop reminders. Idempotent; only the first call reports an event.
    pub fn stop(&mut self, now: DateTime<Utc>) -> Option<Event> {
        let was_active = self.is_active();
        self.state = SchedulerState::Idle;
        self.next_trigger_at = None;
        self.remaining_ms = None;
        if !was_active {
            return None;
        }
        tracing::info!("reminders stopped");
        Some(Event::RemindersStopped { at: now })
    }

    /// Change the interval while idle.
    ///
    /// # Errors
    ///
    /// `ConfigurationLocked` while running; `InvalidInterval` when out of range.
    pub fn set_interval(
        &mut self,
        interval: Duration,
        now: DateTime<Utc>,
    ) -> Result<Event, ReminderError> {
        if self.is_active() {
            return Err(ReminderError::ConfigurationLocked);
        }
        self.interval_ms = validate_interval(interval)?;
        Ok(Event::IntervalChanged {
            interval_secs: self.interval_ms / 1000,
            at: now,
        })
    }

    /// Change the reminder message while idle.
    ///
    /// # Errors
    ///
    /// `ConfigurationLocked` while running.
    pub fn set_message(
        &mut self,
        message: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Result<Event, ReminderError> {
        if self.is_active() {
            return Err(ReminderError::ConfigurationLocked);
        }
        self.message = message.into();
        Ok(Event::MessageChanged {
            message: self.message.clone(),
            at: now,
        })
    }

    /// Call periodically. Returns `Some(Event::ReminderTriggered)` when the
    /// interval has elapsed, after handing the message to `notifier`.
    pub fn tick(&mut self, now: DateTime<Utc>, notifier: &dyn Notifier) -> Option<Event> {
        if !self.is_active() {
            return None;
        }
        let next = self.next_trigger_at?;
        if now < next {
            self.remaining_ms = Some(remaining_ms(next, now));
            return None;
        }

        let upcoming = next + self.interval_delta();
        self.next_trigger_at = Some(upcoming);
        self.remaining_ms = Some(remaining_ms(upcoming, now));

        tracing::debug!(due = %next, %upcoming, "reminder triggered");
        notifier.notify(&self.message);

        Some(Event::ReminderTriggered {
            message: self.message.clone(),
            next_trigger_at: upcoming,
            at: now,
        })
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn interval_delta(&self) -> TimeDelta {
        TimeDelta::milliseconds(self.interval_ms as i64)
    }
}

fn validate_interval(interval: Duration) -> Result<u64, ReminderError> {
    let max = Duration::from_secs(MAX_INTERVAL_MINUTES * 60);
    if interval.is_zero() || interval > max {
        return Err(ReminderError::InvalidInterval {
            minutes: interval.as_secs() / 60,
            min: MIN_INTERVAL_MINUTES,
            max: MAX_INTERVAL_MINUTES,
        });
    }
    Ok(interval.as_millis() as u64)
}
