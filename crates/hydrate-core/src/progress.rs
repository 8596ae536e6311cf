//! Daily hydration progress.
//!
//! ```text
//! InProgress --increment (below goal)--> InProgress
//! InProgress --increment (reaches goal)--> Complete
//! Complete --reset--> InProgress
//! ```
//!
//! The tracker never touches the scheduler. Reaching the goal and resetting
//! both emit events; the session reacts to them by stopping reminders.

use std::num::NonZeroU32;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ReminderError;
use crate::events::Event;

pub const DEFAULT_GOAL: NonZeroU32 = match NonZeroU32::new(9) {
    Some(goal) => goal,
    None => unreachable!(),
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressState {
    InProgress,
    Complete,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressTracker {
    completed_count: u32,
    goal: NonZeroU32,
}

impl Default for ProgressTracker {
    fn default() -> Self {
        Self::new(DEFAULT_GOAL)
    }
}

impl ProgressTracker {
    pub fn new(goal: NonZeroU32) -> Self {
        Self {
            completed_count: 0,
            goal,
        }
    }

    pub fn completed_count(&self) -> u32 {
        self.completed_count
    }

    pub fn goal(&self) -> u32 {
        self.goal.get()
    }

    pub fn is_complete(&self) -> bool {
        self.completed_count == self.goal.get()
    }

    pub fn state(&self) -> ProgressState {
        if self.is_complete() {
            ProgressState::Complete
        } else {
            ProgressState::InProgress
        }
    }

    /// 0.0 .. 1.0 share of the goal, for fill-level rendering.
    pub fn fill_level(&self) -> f64 {
        f64::from(self.completed_count) / f64::from(self.goal.get())
    }

    /// Log one drink. `reminders_active` is the gate: drinks only count
    /// while reminders are running.
    ///
    /// Returns `DrinkLogged`, followed by `GoalReached` when this drink
    /// completes the goal.
    ///
    /// # Errors
    ///
    /// `GoalAlreadyReached` once complete; `RemindersInactive` when the
    /// gate is closed. State is unchanged in both cases.
    pub fn increment(
        &mut self,
        reminders_active: bool,
        now: DateTime<Utc>,
    ) -> Result<Vec<Event>, ReminderError> {
        if self.is_complete() {
            return Err(ReminderError::GoalAlreadyReached { goal: self.goal() });
        }
        if !reminders_active {
            return Err(ReminderError::RemindersInactive);
        }

        self.completed_count += 1;
        let mut events = vec![Event::DrinkLogged {
            completed_count: self.completed_count,
            goal: self.goal(),
            at: now,
        }];
        if self.is_complete() {
            tracing::info!(goal = self.goal(), "hydration goal reached");
            events.push(Event::GoalReached {
                goal: self.goal(),
                at: now,
            });
        }
        Ok(events)
    }

    pub fn reset(&mut self, now: DateTime<Utc>) -> Event {
        self.completed_count = 0;
        Event::ProgressReset { at: now }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracker_at(count: u32) -> ProgressTracker {
        let mut tracker = ProgressTracker::default();
        for _ in 0..count {
            tracker.increment(true, Utc::now()).unwrap();
        }
        tracker
    }

    #[test]
    fn increments_below_goal() {
        let mut tracker = ProgressTracker::default();
        let events = tracker.increment(true, Utc::now()).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(tracker.completed_count(), 1);
        assert_eq!(tracker.state(), ProgressState::InProgress);
    }

    #[test]
    fn reaching_goal_emits_goal_reached() {
        let mut tracker = tracker_at(8);
        let events = tracker.increment(true, Utc::now()).unwrap();
        assert!(matches!(events.last(), Some(Event::GoalReached { goal: 9, .. })));
        assert_eq!(tracker.completed_count(), 9);
        assert!(tracker.is_complete());
        assert_eq!(tracker.fill_level(), 1.0);
    }

    #[test]
    fn rejects_increment_past_goal() {
        let mut tracker = tracker_at(9);
        let err = tracker.increment(true, Utc::now()).unwrap_err();
        assert_eq!(err, ReminderError::GoalAlreadyReached { goal: 9 });
        assert_eq!(tracker.completed_count(), 9);
    }

    #[test]
    fn gate_blocks_increment_while_inactive() {
        let mut tracker = tracker_at(3);
        let err = tracker.increment(false, Utc::now()).unwrap_err();
        assert_eq!(err, ReminderError::RemindersInactive);
        assert_eq!(tracker.completed_count(), 3);
    }

    #[test]
    fn reset_returns_to_in_progress() {
        let mut tracker = tracker_at(9);
        tracker.reset(Utc::now());
        assert_eq!(tracker.completed_count(), 0);
        assert!(!tracker.is_complete());
        assert_eq!(tracker.fill_level(), 0.0);
    }

    #[test]
    fn custom_goal() {
        let mut tracker = ProgressTracker::new(NonZeroU32::new(2).unwrap());
        tracker.increment(true, Utc::now()).unwrap();
        let events = tracker.increment(true, Utc::now()).unwrap();
        assert_eq!(events.len(), 2);
        assert!(tracker.is_complete());
    }
}
