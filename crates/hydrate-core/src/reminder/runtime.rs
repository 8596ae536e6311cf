//! Periodic tick driver for a session.
//!
//! The runtime owns the only ticker task. A ticker exists exactly while
//! the session's reminders are active: it is spawned when a command starts
//! reminders and aborted when a command (or reaching the goal) stops them.
//! Dropping the runtime aborts the ticker too, so no task outlives the
//! session.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::clock::Clock;
use crate::error::ReminderError;
use crate::events::Event;
use crate::notify::Notifier;
use crate::session::{Command, HydrationSession, SessionView};

pub type SharedSession<N, C> = Arc<Mutex<HydrationSession<N, C>>>;

/// Handle to a running ticker. Aborts the task on drop.
#[derive(Debug)]
pub struct TickerHandle {
    handle: JoinHandle<()>,
}

impl Drop for TickerHandle {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Spawn a task that ticks `session` every `period` and forwards the
/// resulting events, followed by a fresh snapshot, to `feed`.
///
/// Ticks are sequential: each one holds the session lock for the whole
/// state update and notification. Notifier backends may block, so every
/// step runs on the blocking pool. The task ends when `feed` closes.
pub fn spawn_ticker<N, C>(
    session: SharedSession<N, C>,
    period: Duration,
    feed: mpsc::UnboundedSender<Event>,
) -> TickerHandle
where
    N: Notifier + 'static,
    C: Clock + 'static,
{
    let handle = tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            let step = Arc::clone(&session);
            let (trigger, snapshot) = match tokio::task::spawn_blocking(move || {
                let mut session = step.blocking_lock();
                let trigger = session.tick();
                (trigger, session.snapshot())
            })
            .await
            {
                Ok(out) => out,
                Err(e) => {
                    tracing::warn!(error = %e, "tick failed, ticker exiting");
                    break;
                }
            };
            let delivered = trigger
                .into_iter()
                .chain(std::iter::once(snapshot))
                .all(|event| feed.send(event).is_ok());
            if !delivered {
                tracing::debug!("state feed closed, ticker exiting");
                break;
            }
        }
    });
    TickerHandle { handle }
}

pub struct ReminderRuntime<N, C> {
    session: SharedSession<N, C>,
    period: Duration,
    feed: mpsc::UnboundedSender<Event>,
    ticker: Option<TickerHandle>,
}

impl<N, C> ReminderRuntime<N, C>
where
    N: Notifier + 'static,
    C: Clock + 'static,
{
    pub fn new(
        session: HydrationSession<N, C>,
        period: Duration,
        feed: mpsc::UnboundedSender<Event>,
    ) -> Self {
        Self {
            session: Arc::new(Mutex::new(session)),
            period,
            feed,
            ticker: None,
        }
    }

    pub fn session(&self) -> SharedSession<N, C> {
        Arc::clone(&self.session)
    }

    pub fn is_ticking(&self) -> bool {
        self.ticker.is_some()
    }

    pub async fn view(&self) -> SessionView {
        self.session.lock().await.view()
    }

    /// Run `command` against the session, then start or release the ticker
    /// to match the new active state.
    ///
    /// # Errors
    ///
    /// Returns the session's rejection; the ticker is still reconciled.
    pub async fn apply(&mut self, command: Command) -> Result<Vec<Event>, ReminderError> {
        let (result, active) = {
            let mut session = self.session.lock().await;
            let result = session.apply(command);
            (result, session.is_active())
        };
        self.sync_ticker(active);
        result
    }

    /// Stop reminders and release the ticker.
    pub async fn shutdown(mut self) -> Vec<Event> {
        let events = self.session.lock().await.stop_reminders();
        self.ticker = None;
        events
    }

    fn sync_ticker(&mut self, active: bool) {
        match (active, self.ticker.is_some()) {
            (true, false) => {
                tracing::debug!(period_ms = self.period.as_millis() as u64, "spawning ticker");
                self.ticker = Some(spawn_ticker(
                    Arc::clone(&self.session),
                    self.period,
                    self.feed.clone(),
                ));
            }
            (false, true) => {
                tracing::debug!("releasing ticker");
                self.ticker = None;
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, TimeDelta};

    use super::*;
    use crate::clock::ManualClock;
    use crate::notify::testing::RecordingNotifier;
    use crate::storage::Config;

    type TestRuntime = ReminderRuntime<RecordingNotifier, ManualClock>;

    fn runtime() -> (
        TestRuntime,
        ManualClock,
        RecordingNotifier,
        mpsc::UnboundedReceiver<Event>,
    ) {
        let clock = ManualClock::new(DateTime::from_timestamp(0, 0).unwrap());
        let notifier = RecordingNotifier::default();
        let mut config = Config::default();
        config.reminder.interval_minutes = 1;
        let session =
            HydrationSession::from_config(&config, notifier.clone(), clock.clone()).unwrap();
        let (tx, rx) = mpsc::unbounded_channel();
        let rt = ReminderRuntime::new(session, Duration::from_secs(1), tx);
        (rt, clock, notifier, rx)
    }

    #[tokio::test(start_paused = true)]
    async fn ticker_follows_active_state() {
        let (mut rt, _, _, _rx) = runtime();
        assert!(!rt.is_ticking());
        rt.apply(Command::Start).await.unwrap();
        assert!(rt.is_ticking());
        rt.apply(Command::Stop).await.unwrap();
        assert!(!rt.is_ticking());
    }

    #[tokio::test(start_paused = true)]
    async fn ticker_delivers_triggers_until_stopped() {
        let (mut rt, clock, notifier, mut rx) = runtime();
        rt.apply(Command::Start).await.unwrap();

        let first = rx.recv().await.unwrap();
        assert!(matches!(first, Event::StateSnapshot { .. }));

        clock.advance(TimeDelta::seconds(60));
        loop {
            if let Event::ReminderTriggered { message, .. } = rx.recv().await.unwrap() {
                assert_eq!(message, "Time to drink water!");
                break;
            }
        }
        assert_eq!(notifier.messages().len(), 1);

        rt.apply(Command::Stop).await.unwrap();
        while rx.try_recv().is_ok() {}

        clock.advance(TimeDelta::seconds(600));
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert!(rx.try_recv().is_err());
        assert_eq!(notifier.messages().len(), 1);
    }

    #[derive(Clone, Default)]
    struct ThreadRecorder(Arc<std::sync::Mutex<Vec<std::thread::ThreadId>>>);

    impl Notifier for ThreadRecorder {
        fn notify(&self, _message: &str) {
            self.0.lock().unwrap().push(std::thread::current().id());
        }

        fn request_permission(&mut self) -> crate::notify::Permission {
            crate::notify::Permission::Denied
        }

        fn permission(&self) -> crate::notify::Permission {
            crate::notify::Permission::Denied
        }
    }

    #[tokio::test(start_paused = true)]
    async fn scheduled_delivery_runs_off_the_async_worker() {
        let clock = ManualClock::new(DateTime::from_timestamp(0, 0).unwrap());
        let notifier = ThreadRecorder::default();
        let mut config = Config::default();
        config.reminder.interval_minutes = 1;
        let session = HydrationSession::from_config(&config, notifier.clone(), clock.clone()).unwrap();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut rt = ReminderRuntime::new(session, Duration::from_secs(1), tx);

        rt.apply(Command::Start).await.unwrap();
        clock.advance(TimeDelta::seconds(60));
        while !matches!(rx.recv().await.unwrap(), Event::ReminderTriggered { .. }) {}

        let threads = notifier.0.lock().unwrap().clone();
        assert_eq!(threads.len(), 1);
        assert_ne!(threads[0], std::thread::current().id());
    }

    #[tokio::test(start_paused = true)]
    async fn goal_reached_releases_ticker() {
        let (mut rt, _, _, _rx) = runtime();
        rt.apply(Command::Start).await.unwrap();
        for _ in 0..9 {
            rt.apply(Command::LogDrink).await.unwrap();
        }
        assert!(!rt.is_ticking());
        assert!(rt.view().await.is_complete);
    }

    #[tokio::test(start_paused = true)]
    async fn rejected_command_keeps_ticker() {
        let (mut rt, _, _, _rx) = runtime();
        rt.apply(Command::Start).await.unwrap();
        let err = rt.apply(Command::SetInterval(5)).await.unwrap_err();
        assert_eq!(err, ReminderError::ConfigurationLocked);
        assert!(rt.is_ticking());
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_runtime_aborts_ticker() {
        let (mut rt, _, _, _rx) = runtime();
        rt.apply(Command::Start).await.unwrap();
        let session = rt.session();
        assert!(Arc::strong_count(&session) >= 3);

        drop(rt);
        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(Arc::strong_count(&session), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_stops_reminders() {
        let (mut rt, _, _, _rx) = runtime();
        rt.apply(Command::Start).await.unwrap();
        let session = rt.session();
        let events = rt.shutdown().await;
        assert!(matches!(events.as_slice(), [Event::RemindersStopped { .. }]));
        assert!(!session.lock().await.is_active());
    }
}
