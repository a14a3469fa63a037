use std::io::Write;
use std::sync::Arc;

use clap::Subcommand;
use deepwork_core::format::format_countdown;
use deepwork_core::{
    Config, CountdownEngine, CountdownSnapshot, Event, PollLoop, SqliteStore, SystemClock,
};
use serde::Serialize;
use tokio::sync::Mutex;

use super::{print_json, runtime};
use crate::hooks;

type Engine = CountdownEngine<SqliteStore, SystemClock>;

#[derive(Subcommand)]
pub enum TimerAction {
    /// Start or resume the focus countdown
    Start,
    /// Pause the countdown
    Pause,
    /// Reset to the default session length
    Reset,
    /// Add minutes, up to the cap
    Extend {
        #[arg(default_value = "5", allow_negative_numbers = true)]
        minutes: f64,
    },
    /// Set the session length (stops a running countdown)
    Set {
        #[arg(allow_negative_numbers = true)]
        minutes: f64,
    },
    /// Print current countdown state as JSON
    Status,
    /// Follow the running countdown until it completes
    Watch,
}

#[derive(Serialize)]
struct TimerReport<'a> {
    /// Completion observed while reconciling on load.
    #[serde(skip_serializing_if = "Option::is_none")]
    completed: Option<&'a Event>,
    #[serde(skip_serializing_if = "Option::is_none")]
    event: Option<&'a Event>,
    countdown: CountdownSnapshot,
    clock: String,
}

fn open_engine(config: &Config) -> Result<Engine, Box<dyn std::error::Error>> {
    let store = SqliteStore::open()?;
    let mut engine = CountdownEngine::new(store, SystemClock, config.countdown_settings());
    for hook in hooks::from_config(&config.notifications) {
        engine.add_hook(hook);
    }
    Ok(engine)
}

fn report(
    engine: &Engine,
    completed: Option<&Event>,
    event: Option<&Event>,
) -> Result<(), Box<dyn std::error::Error>> {
    let countdown = engine.snapshot();
    let clock = format_countdown(countdown.remaining_secs);
    print_json(&TimerReport {
        completed,
        event,
        countdown,
        clock,
    })
}

pub fn run(action: TimerAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let mut engine = open_engine(&config)?;

    // Apply a completion that came due while no process was polling.
    let completed = engine.poll();

    let event = match action {
        TimerAction::Start => engine.start(),
        TimerAction::Pause => engine.pause(),
        TimerAction::Reset => engine.reset(),
        TimerAction::Extend { minutes } => engine.extend(minutes),
        TimerAction::Set { minutes } => engine.set_duration(minutes),
        TimerAction::Status => None,
        TimerAction::Watch => {
            if let Some(done) = &completed {
                print_json(done)?;
            }
            return watch(engine, &config);
        }
    };

    report(&engine, completed.as_ref(), event.as_ref())
}

fn watch(engine: Engine, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    if !engine.is_running() {
        return report(&engine, None, None);
    }

    let rt = runtime()?;
    let interval = config.poll_interval();
    rt.block_on(async move {
        let engine = Arc::new(Mutex::new(engine));
        let mut last_shown = None;
        let poll_loop = PollLoop::spawn(engine.clone(), interval, move |cd: &Engine, event| {
            let remaining = cd.remaining_secs();
            if last_shown != Some(remaining) {
                last_shown = Some(remaining);
                let mut stderr = std::io::stderr();
                let _ = write!(stderr, "\r{}", format_countdown(remaining));
                let _ = stderr.flush();
            }
            if let Some(event) = event {
                eprintln!();
                if let Ok(json) = serde_json::to_string_pretty(&event) {
                    println!("{json}");
                }
            }
        });

        tokio::select! {
            _ = poll_loop.join() => {}
            _ = tokio::signal::ctrl_c() => {
                eprintln!();
                tracing::debug!("watch interrupted");
            }
        }

        let engine = engine.lock().await;
        report(&engine, None, None)
    })
}
