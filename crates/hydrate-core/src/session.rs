//! A hydration session: one scheduler, one tracker, one notifier.
//!
//! The session is the only place where the two state machines meet. The
//! tracker's `GoalReached` and `ProgressReset` events are turned into a
//! scheduler stop here, so each component stays testable on its own.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::clock::Clock;
use crate::error::ReminderError;
use crate::events::Event;
use crate::notify::{Notifier, Permission};
use crate::progress::ProgressTracker;
use crate::reminder::{ReminderScheduler, MAX_INTERVAL_MINUTES, MIN_INTERVAL_MINUTES};
use crate::storage::Config;

/// Shown once the goal is reached.
pub const COMPLETION_MESSAGE: &str = "Great work! You're now hydrated.";

/// State feed for the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionView {
    pub is_active: bool,
    /// `MM:SS`, or `--:--` while inactive.
    pub remaining_display: String,
    pub completed_count: u32,
    pub goal: u32,
    pub is_complete: bool,
    /// 0.0 .. 1.0 share of the goal.
    pub fill_level: f64,
    pub interval_minutes: u64,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completion_message: Option<String>,
}

/// Commands the presentation layer can issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start,
    Stop,
    Toggle,
    SetInterval(u64),
    SetMessage(String),
    LogDrink,
    Reset,
    TestNotification,
    RequestPermission,
}

pub struct HydrationSession<N, C> {
    scheduler: ReminderScheduler,
    tracker: ProgressTracker,
    notifier: N,
    clock: C,
}

impl<N: Notifier, C: Clock> HydrationSession<N, C> {
    pub fn new(scheduler: ReminderScheduler, tracker: ProgressTracker, notifier: N, clock: C) -> Self {
        Self {
            scheduler,
            tracker,
            notifier,
            clock,
        }
    }

    /// Session seeded from user preferences.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInterval` if the configured interval is out of range.
    pub fn from_config(config: &Config, notifier: N, clock: C) -> Result<Self, ReminderError> {
        let scheduler = ReminderScheduler::new(config.interval(), config.reminder.message.clone())?;
        Ok(Self::new(
            scheduler,
            ProgressTracker::new(config.goal()),
            notifier,
            clock,
        ))
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn scheduler(&self) -> &ReminderScheduler {
        &self.scheduler
    }

    pub fn tracker(&self) -> &ProgressTracker {
        &self.tracker
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    pub fn is_active(&self) -> bool {
        self.scheduler.is_active()
    }

    pub fn view(&self) -> SessionView {
        let is_complete = self.tracker.is_complete();
        SessionView {
            is_active: self.scheduler.is_active(),
            remaining_display: self.scheduler.remaining_display(),
            completed_count: self.tracker.completed_count(),
            goal: self.tracker.goal(),
            is_complete,
            fill_level: self.tracker.fill_level(),
            interval_minutes: self.scheduler.interval().as_secs() / 60,
            message: self.scheduler.message().to_string(),
            completion_message: is_complete.then(|| COMPLETION_MESSAGE.to_string()),
        }
    }

    /// Build a full state snapshot event.
    pub fn snapshot(&self) -> Event {
        let view = self.view();
        Event::StateSnapshot {
            is_active: view.is_active,
            remaining_display: view.remaining_display,
            completed_count: view.completed_count,
            goal: view.goal,
            is_complete: view.is_complete,
            fill_level: view.fill_level,
            at: self.clock.now(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Run one presentation-layer command.
    ///
    /// # Errors
    ///
    /// Returns the rejection for commands that leave state unchanged.
    pub fn apply(&mut self, command: Command) -> Result<Vec<Event>, ReminderError> {
        tracing::debug!(?command, "applying command");
        let result = self.dispatch(command);
        if let Err(e) = &result {
            tracing::debug!(error = %e, "command rejected");
        }
        result
    }

    fn dispatch(&mut self, command: Command) -> Result<Vec<Event>, ReminderError> {
        match command {
            Command::Start => Ok(self.start_reminders()),
            Command::Stop => Ok(self.stop_reminders()),
            Command::Toggle => Ok(self.toggle_reminders()),
            Command::SetInterval(minutes) => self.set_interval(minutes),
            Command::SetMessage(text) => self.set_message(text),
            Command::LogDrink => self.log_drink(),
            Command::Reset => Ok(self.reset_all()),
            Command::TestNotification => {
                self.test_notification();
                Ok(Vec::new())
            }
            Command::RequestPermission => match self.request_permission() {
                Permission::Granted => Ok(Vec::new()),
                _ => Err(ReminderError::PermissionDenied),
            },
        }
    }

    pub fn start_reminders(&mut self) -> Vec<Event> {
        self.scheduler.start(self.clock.now()).into_iter().collect()
    }

    pub fn stop_reminders(&mut self) -> Vec<Event> {
        self.scheduler.stop(self.clock.now()).into_iter().collect()
    }

    pub fn toggle_reminders(&mut self) -> Vec<Event> {
        if self.scheduler.is_active() {
            self.stop_reminders()
        } else {
            self.start_reminders()
        }
    }

    /// # Errors
    ///
    /// `InvalidInterval` outside 1..=120 minutes; `ConfigurationLocked`
    /// while reminders are running.
    pub fn set_interval(&mut self, minutes: u64) -> Result<Vec<Event>, ReminderError> {
        if !(MIN_INTERVAL_MINUTES..=MAX_INTERVAL_MINUTES).contains(&minutes) {
            return Err(ReminderError::InvalidInterval {
                minutes,
                min: MIN_INTERVAL_MINUTES,
                max: MAX_INTERVAL_MINUTES,
            });
        }
        let event = self
            .scheduler
            .set_interval(Duration::from_secs(minutes * 60), self.clock.now())?;
        Ok(vec![event])
    }

    /// # Errors
    ///
    /// `ConfigurationLocked` while reminders are running.
    pub fn set_message(&mut self, text: impl Into<String>) -> Result<Vec<Event>, ReminderError> {
        let event = self.scheduler.set_message(text, self.clock.now())?;
        Ok(vec![event])
    }

    /// Log a drink. Reaching the goal stops reminders.
    ///
    /// # Errors
    ///
    /// `GoalAlreadyReached` or `RemindersInactive`; state is unchanged.
    pub fn log_drink(&mut self) -> Result<Vec<Event>, ReminderError> {
        let now = self.clock.now();
        let mut events = self.tracker.increment(self.scheduler.is_active(), now)?;

        let goal_reached = events
            .iter()
            .any(|e| matches!(e, Event::GoalReached { .. }));
        if goal_reached {
            events.extend(self.scheduler.stop(now));
        }
        Ok(events)
    }

    /// Clear progress and stop reminders. Always succeeds.
    pub fn reset_all(&mut self) -> Vec<Event> {
        let now = self.clock.now();
        let mut events = vec![self.tracker.reset(now)];
        events.extend(self.scheduler.stop(now));
        events
    }

    /// Deliver the current message right away, outside the schedule.
    pub fn test_notification(&self) {
        self.notifier.notify(self.scheduler.message());
    }

    pub fn request_permission(&mut self) -> Permission {
        self.notifier.request_permission()
    }

    /// Advance the countdown to the clock's current time.
    pub fn tick(&mut self) -> Option<Event> {
        let now = self.clock.now();
        self.scheduler.tick(now, &self.notifier)
    }
}
