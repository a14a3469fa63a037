use std::io::Write;
use std::sync::Arc;

use clap::Subcommand;
use deepwork_core::format::format_stopwatch;
use deepwork_core::{
    Config, Event, PollLoop, SqliteStore, StopwatchEngine, StopwatchSnapshot, SystemClock,
};
use serde::Serialize;
use tokio::sync::Mutex;

use super::{print_json, runtime};

type Engine = StopwatchEngine<SqliteStore, SystemClock>;

#[derive(Subcommand)]
pub enum StopwatchAction {
    /// Start or resume deep-work tracking
    Start,
    /// Pause tracking
    Pause,
    /// Print current stopwatch state as JSON
    Status,
    /// Add today's whole minutes to the ledger and zero the stopwatch
    Commit,
    /// Show the running stopwatch until interrupted
    Watch,
}

#[derive(Serialize)]
struct StopwatchReport<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    event: Option<&'a Event>,
    stopwatch: StopwatchSnapshot,
    clock: String,
}

fn report(engine: &Engine, event: Option<&Event>) -> Result<(), Box<dyn std::error::Error>> {
    let stopwatch = engine.snapshot();
    let clock = format_stopwatch(stopwatch.elapsed_secs);
    print_json(&StopwatchReport {
        event,
        stopwatch,
        clock,
    })
}

pub fn run(action: StopwatchAction) -> Result<(), Box<dyn std::error::Error>> {
    let store = SqliteStore::open()?;
    let mut engine = StopwatchEngine::new(store, SystemClock);

    let event = match action {
        StopwatchAction::Start => engine.start(),
        StopwatchAction::Pause => engine.pause(),
        StopwatchAction::Status => None,
        StopwatchAction::Commit => {
            let event = engine.commit_day();
            if event.is_none() {
                return Err("could not write the daily ledger; stopwatch left unchanged".into());
            }
            event
        }
        StopwatchAction::Watch => return watch(engine),
    };

    report(&engine, event.as_ref())
}

fn watch(engine: Engine) -> Result<(), Box<dyn std::error::Error>> {
    if !engine.is_running() {
        return report(&engine, None);
    }

    let interval = Config::load_or_default().poll_interval();
    let rt = runtime()?;
    rt.block_on(async move {
        let engine = Arc::new(Mutex::new(engine));
        let mut last_shown = None;
        let poll_loop = PollLoop::spawn(engine.clone(), interval, move |sw: &Engine, _| {
            let elapsed = sw.elapsed_secs();
            if last_shown != Some(elapsed) {
                last_shown = Some(elapsed);
                let mut stderr = std::io::stderr();
                let _ = write!(stderr, "\r{}", format_stopwatch(elapsed));
                let _ = stderr.flush();
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
        report(&engine, None)
    })
}
