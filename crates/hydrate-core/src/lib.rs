//! # Hydrate Core Library
//!
//! Core logic for the Hydrate water reminder. A session pairs a reminder
//! scheduler with a progress tracker; front ends (the CLI today) render its
//! state and forward user intents as commands.
//!
//! ## Architecture
//!
//! - **Reminder Scheduler**: A wall-clock state machine; the caller passes
//!   `now` to `tick()` and gets a trigger event when the interval elapses
//! - **Progress Tracker**: Counts drinks toward a fixed daily goal
//! - **Session**: Orchestrates both and turns goal/reset events into a stop
//! - **Runtime**: Owns the periodic ticker task for an active session
//! - **Notifications**: Best-effort audio cue and desktop notification
//! - **Storage**: TOML-based preferences
//!
//! ## Key Components
//!
//! - [`ReminderScheduler`]: Interval timer state machine
//! - [`ProgressTracker`]: Goal state machine
//! - [`HydrationSession`]: Command surface and state feed
//! - [`ReminderRuntime`]: Tick driver
//! - [`Config`]: Application configuration management

pub mod clock;
pub mod error;
pub mod events;
pub mod notify;
pub mod progress;
pub mod reminder;
pub mod session;
pub mod storage;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{ConfigError, DispatchError, ReminderError};
pub use events::Event;
pub use notify::{NotificationDispatcher, Notifier, NoopNotifier, Permission};
pub use progress::{ProgressState, ProgressTracker};
pub use reminder::{ReminderRuntime, ReminderScheduler, SchedulerState};
pub use session::{Command, HydrationSession, SessionView};
pub use storage::Config;
