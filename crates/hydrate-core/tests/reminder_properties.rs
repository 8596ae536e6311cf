//! Property tests for the scheduler and tracker invariants.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use hydrate_core::notify::{Notifier, Permission};
use hydrate_core::{
    Command, Event, HydrationSession, ManualClock, ProgressTracker, ReminderScheduler,
};
use proptest::prelude::*;

#[derive(Clone, Default)]
struct Recorder(Arc<Mutex<Vec<String>>>);

impl Notifier for Recorder {
    fn notify(&self, message: &str) {
        self.0.lock().unwrap().push(message.to_string());
    }

    fn request_permission(&mut self) -> Permission {
        Permission::Denied
    }

    fn permission(&self) -> Permission {
        Permission::Denied
    }
}

fn epoch() -> DateTime<Utc> {
    DateTime::from_timestamp(1_700_000_000, 0).unwrap()
}

fn display_secs(display: &str) -> u64 {
    let (m, s) = display.split_once(':').expect("MM:SS");
    assert!(m.len() >= 2 && s.len() == 2, "not zero padded: {display}");
    m.parse::<u64>().unwrap() * 60 + s.parse::<u64>().unwrap()
}

fn command_strategy() -> impl Strategy<Value = Command> {
    prop_oneof![
        Just(Command::Start),
        Just(Command::Stop),
        Just(Command::Toggle),
        Just(Command::LogDrink),
        Just(Command::LogDrink),
        Just(Command::Reset),
        (0u64..130).prop_map(Command::SetInterval),
        "[a-z ]{0,12}".prop_map(Command::SetMessage),
    ]
}

proptest! {
    #[test]
    fn start_schedules_exactly_one_interval(secs in 1u64..=7200, later in 0i64..100_000) {
        let mut s = ReminderScheduler::new(Duration::from_secs(secs), "x").unwrap();
        s.start(epoch());
        let expected = epoch() + TimeDelta::seconds(secs as i64);
        prop_assert_eq!(s.next_trigger_at(), Some(expected));

        prop_assert!(s.start(epoch() + TimeDelta::milliseconds(later)).is_none());
        prop_assert_eq!(s.next_trigger_at(), Some(expected));
    }

    #[test]
    fn countdown_only_rises_after_trigger(
        secs in 1u64..=600,
        steps in prop::collection::vec(0i64..90_000, 1..60),
    ) {
        let notifier = Recorder::default();
        let mut s = ReminderScheduler::new(Duration::from_secs(secs), "drink").unwrap();
        s.start(epoch());

        let interval = TimeDelta::seconds(secs as i64);
        let mut now = epoch();
        let mut previous = display_secs(&s.remaining_display());
        let mut triggers = 0;
        for step in steps {
            now += TimeDelta::milliseconds(step);
            let due = s.next_trigger_at().unwrap();
            let triggered = s.tick(now, &notifier).is_some();
            let current = display_secs(&s.remaining_display());
            prop_assert!(current <= secs);
            prop_assert_eq!(triggered, now >= due);
            if triggered {
                triggers += 1;
                // Rescheduled from the previous trigger time, not from now.
                prop_assert_eq!(s.next_trigger_at(), Some(due + interval));
            } else {
                prop_assert!(current <= previous, "{} -> {} without trigger", previous, current);
                prop_assert_eq!(s.next_trigger_at(), Some(due));
            }
            prop_assert_eq!(s.next_trigger_at(), Some(epoch() + interval * (triggers + 1)));
            previous = current;
        }
    }

    #[test]
    fn goal_is_never_exceeded(goal in 1u32..20, gates in prop::collection::vec(any::<bool>(), 0..60)) {
        let mut tracker = ProgressTracker::new(std::num::NonZeroU32::new(goal).unwrap());
        for gate in gates {
            let before = tracker.completed_count();
            let result = tracker.increment(gate, epoch());
            if result.is_err() {
                prop_assert_eq!(tracker.completed_count(), before);
            }
            prop_assert!(tracker.completed_count() <= tracker.goal());
            prop_assert_eq!(tracker.is_complete(), tracker.completed_count() == goal);
        }
    }

    #[test]
    fn reset_always_yields_idle_empty_session(
        commands in prop::collection::vec(command_strategy(), 0..40),
    ) {
        let clock = ManualClock::new(epoch());
        let mut session = HydrationSession::new(
            ReminderScheduler::default(),
            ProgressTracker::default(),
            Recorder::default(),
            clock.clone(),
        );
        for command in commands {
            let _ = session.apply(command);
            clock.advance(TimeDelta::seconds(17));
            session.tick();

            let view = session.view();
            prop_assert!(view.completed_count <= view.goal);
            prop_assert_eq!(view.is_complete, view.completed_count == view.goal);
            prop_assert_eq!(view.is_active, session.scheduler().next_trigger_at().is_some());
        }

        session.reset_all();
        let view = session.view();
        prop_assert_eq!(view.completed_count, 0);
        prop_assert!(!view.is_complete);
        prop_assert!(!view.is_active);
        prop_assert_eq!(view.remaining_display, "--:--");
    }

    #[test]
    fn stop_twice_matches_stop_once(run_for in 0i64..10_000) {
        let notifier = Recorder::default();
        let mut once = ReminderScheduler::default();
        once.start(epoch());
        once.tick(epoch() + TimeDelta::seconds(run_for), &notifier);
        let mut twice = once.clone();

        once.stop(epoch());
        twice.stop(epoch());
        twice.stop(epoch());
        prop_assert_eq!(once.is_active(), twice.is_active());
        prop_assert_eq!(once.next_trigger_at(), twice.next_trigger_at());
        prop_assert_eq!(twice.next_trigger_at(), None);
    }
}

#[test]
fn locked_message_edit_is_rejected() {
    let mut s = ReminderScheduler::default();
    s.start(epoch());
    assert!(s.set_message("x", epoch()).is_err());
    assert_eq!(s.message(), "Time to drink water!");
}

#[test]
fn late_trigger_event_carries_next_interval_point() {
    let notifier = Recorder::default();
    let mut s = ReminderScheduler::new(Duration::from_secs(60), "drink").unwrap();
    s.start(epoch());
    match s.tick(epoch() + TimeDelta::seconds(61), &notifier) {
        Some(Event::ReminderTriggered {
            next_trigger_at, ..
        }) => assert_eq!(next_trigger_at, epoch() + TimeDelta::seconds(120)),
        other => panic!("Expected ReminderTriggered, got {other:?}"),
    }
}
