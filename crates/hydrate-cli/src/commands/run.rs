//! Interactive reminder session.
//!
//! Reads one command per line from stdin and writes a JSON line per event
//! to stdout, followed by the current state after every command.

use clap::Args;
use hydrate_core::notify::notifier_from_env;
use hydrate_core::{Command, Config, Event, HydrationSession, ReminderRuntime, SystemClock};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

const HELP: &str = "commands: start | stop | toggle | drink | reset | interval <1-120> | \
message <text> | test | permission | status | help | quit";

#[derive(Args)]
pub struct RunArgs {
    /// Reminder interval in minutes (overrides config)
    #[arg(long)]
    interval: Option<u64>,
    /// Reminder message (overrides config)
    #[arg(long)]
    message: Option<String>,
    /// Start reminders immediately
    #[arg(long)]
    start: bool,
    /// Print a state snapshot on every tick
    #[arg(long)]
    follow: bool,
}

/// A parsed input line.
#[derive(Debug, PartialEq, Eq)]
pub enum Input {
    Session(Command),
    Status,
    Help,
    Quit,
}

pub fn parse_line(line: &str) -> Result<Input, String> {
    let line = line.trim();
    let (word, rest) = line
        .split_once(char::is_whitespace)
        .map(|(w, r)| (w, r.trim()))
        .unwrap_or((line, ""));

    let input = match word.to_ascii_lowercase().as_str() {
        "start" => Input::Session(Command::Start),
        "stop" => Input::Session(Command::Stop),
        "toggle" => Input::Session(Command::Toggle),
        "drink" => Input::Session(Command::LogDrink),
        "reset" => Input::Session(Command::Reset),
        "test" => Input::Session(Command::TestNotification),
        "permission" => Input::Session(Command::RequestPermission),
        "interval" => {
            let minutes = rest
                .parse::<u64>()
                .map_err(|_| format!("interval expects minutes, got '{rest}'"))?;
            Input::Session(Command::SetInterval(minutes))
        }
        "message" => {
            if rest.is_empty() {
                return Err("message expects text".into());
            }
            Input::Session(Command::SetMessage(rest.to_string()))
        }
        "status" => Input::Status,
        "help" | "?" => Input::Help,
        "quit" | "exit" => Input::Quit,
        other => return Err(format!("unknown command: {other}")),
    };
    Ok(input)
}

pub fn run(args: RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    let runtime = tokio::runtime::Runtime::new()?;
    let result = runtime.block_on(session_loop(args));
    // A pending stdin read would otherwise hold shutdown until the next line.
    runtime.shutdown_background();
    result
}

async fn session_loop(args: RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = Config::load_or_default();
    if let Some(minutes) = args.interval {
        config.set("reminder.interval_minutes", &minutes.to_string())?;
    }
    if let Some(message) = args.message {
        config.reminder.message = message;
    }

    let notifier = notifier_from_env(&config.notifications);
    let session = HydrationSession::from_config(&config, notifier, SystemClock)?;
    let (tx, mut feed) = mpsc::unbounded_channel();
    let mut runtime = ReminderRuntime::new(session, config.tick_period(), tx);
    tracing::info!(
        interval_minutes = config.reminder.interval_minutes,
        goal = config.progress.goal,
        "session ready"
    );

    if args.start {
        emit_all(&runtime.apply(Command::Start).await?)?;
    }
    emit(&runtime.view().await)?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            Some(event) = feed.recv() => {
                if args.follow || !matches!(event, Event::StateSnapshot { .. }) {
                    emit(&event)?;
                }
            }
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                if line.trim().is_empty() {
                    continue;
                }
                match parse_line(&line) {
                    Ok(Input::Session(command)) => {
                        match runtime.apply(command).await {
                            Ok(events) => emit_all(&events)?,
                            Err(e) => emit(&serde_json::json!({
                                "type": "CommandRejected",
                                "reason": e.to_string(),
                            }))?,
                        }
                        emit(&runtime.view().await)?;
                    }
                    Ok(Input::Status) => emit(&runtime.view().await)?,
                    Ok(Input::Help) => eprintln!("{HELP}"),
                    Ok(Input::Quit) => break,
                    Err(e) => eprintln!("{e}\n{HELP}"),
                }
            }
        }
    }

    emit_all(&runtime.shutdown().await)?;
    Ok(())
}

fn emit<T: serde::Serialize>(value: &T) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string(value)?);
    Ok(())
}

fn emit_all(events: &[Event]) -> Result<(), serde_json::Error> {
    events.iter().try_for_each(emit)
}
