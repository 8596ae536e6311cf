mod countdown;
mod runtime;
mod scheduler;

pub use countdown::{format_remaining, remaining_ms, INACTIVE_DISPLAY};
pub use runtime::{spawn_ticker, ReminderRuntime, SharedSession, TickerHandle};
pub use scheduler::{
    ReminderScheduler, SchedulerState, DEFAULT_INTERVAL, DEFAULT_MESSAGE, MAX_INTERVAL_MINUTES,
    MIN_INTERVAL_MINUTES,
};
