//! Integration tests for restart recovery.
//!
//! Each test drops its engines and rebuilds them over the same SQLite file,
//! the way a reloaded process would, and checks that elapsed time is
//! reconstructed from stored instants plus a fresh clock read.

use chrono::NaiveDate;
use deepwork_core::store::{COUNTDOWN_KEY, LEDGER_KEY, STOPWATCH_KEY};
use deepwork_core::{
    Clock, CountdownEngine, CountdownSettings, CountingHook, DailyLedger, Event, ManualClock,
    SqliteStore, StateStore, StopwatchEngine, TimerState,
};

fn wednesday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 10, 9).unwrap()
}

fn open(dir: &tempfile::TempDir) -> SqliteStore {
    SqliteStore::open_at(&dir.path().join("deepwork.db")).unwrap()
}

fn countdown(
    dir: &tempfile::TempDir,
    clock: &ManualClock,
) -> CountdownEngine<SqliteStore, ManualClock> {
    CountdownEngine::new(open(dir), clock.clone(), CountdownSettings::default())
}

#[test]
fn countdown_finishes_while_process_is_gone() {
    let dir = tempfile::tempdir().unwrap();
    let clock = ManualClock::at_date(wednesday());

    {
        let mut engine = countdown(&dir, &clock);
        engine.start();
    }

    clock.advance_secs(3600 + 120);

    let hook = CountingHook::new();
    let mut engine = countdown(&dir, &clock)
        .with_hook(hook.clone());
    assert!(engine.is_running());
    assert!(matches!(engine.poll(), Some(Event::CountdownCompleted { .. })));
    assert!(engine.poll().is_none());
    assert_eq!(hook.count(), 1);

    // The finished state is durable: a second reload does not fire again.
    let hook_again = CountingHook::new();
    let mut reloaded = countdown(&dir, &clock)
        .with_hook(hook_again.clone());
    assert_eq!(reloaded.state(), TimerState::Finished);
    assert!(reloaded.poll().is_none());
    assert_eq!(hook_again.count(), 0);
}

#[test]
fn paused_countdown_ignores_time_away() {
    let dir = tempfile::tempdir().unwrap();
    let clock = ManualClock::at_date(wednesday());
    {
        let mut engine = countdown(&dir, &clock);
        engine.start();
        clock.advance_secs(1000);
        engine.pause();
    }
    clock.advance_secs(86_400);
    let engine = countdown(&dir, &clock);
    assert_eq!(engine.state(), TimerState::Paused);
    assert_eq!(engine.remaining_secs(), 2600);
}

#[test]
fn lowered_cap_applies_on_reload() {
    let dir = tempfile::tempdir().unwrap();
    let clock = ManualClock::at_date(wednesday());
    {
        let mut engine = countdown(&dir, &clock);
        engine.set_duration(50.0);
    }
    let settings = CountdownSettings::from_minutes(25, None);
    let engine = CountdownEngine::new(open(&dir), clock, settings);
    assert_eq!(engine.remaining_secs(), 25 * 60);
}

#[test]
fn stopwatch_resumes_counting_across_reload() {
    let dir = tempfile::tempdir().unwrap();
    let clock = ManualClock::at_date(wednesday());
    clock.advance_secs(8 * 3600);

    {
        let mut sw = StopwatchEngine::new(open(&dir), clock.clone());
        sw.start();
        clock.advance_secs(600);
        sw.pause();
        sw.start();
        clock.advance_secs(300);
    }

    // Closed for 20 minutes with the stopwatch running.
    clock.advance_secs(1200);

    let mut sw = StopwatchEngine::new(open(&dir), clock.clone());
    assert!(sw.is_running());
    assert_eq!(sw.elapsed_secs(), 600 + 300 + 1200);

    let event = sw.commit_day();
    assert!(matches!(event, Some(Event::DayCommitted { minutes: 35, .. })));

    let ledger = DailyLedger::load(&open(&dir));
    assert_eq!(ledger.minutes_on(wednesday()), 35);
    let week = ledger.weekly_total(clock.today());
    assert_eq!(week.total_minutes, 35);
    assert_eq!(week.days[2].minutes, 35);
}

#[test]
fn corrupt_records_fall_back_to_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let store = open(&dir);
    store.set_raw(COUNTDOWN_KEY, "not json").unwrap();
    store.set_raw(STOPWATCH_KEY, "{\"accumulated_secs\": -5}").unwrap();
    store.set_raw(LEDGER_KEY, "42").unwrap();

    let clock = ManualClock::at_date(wednesday());
    let timer = countdown(&dir, &clock);
    assert_eq!(timer.state(), TimerState::Idle);
    assert_eq!(timer.remaining_secs(), 3600);

    let sw = StopwatchEngine::new(open(&dir), clock);
    assert_eq!(sw.accumulated_secs(), 0);
    assert!(!sw.is_running());
    assert!(sw.ledger().is_empty());
}

#[test]
fn engines_keep_disjoint_keys() {
    let dir = tempfile::tempdir().unwrap();
    let clock = ManualClock::at_date(wednesday());
    let mut timer = countdown(&dir, &clock);
    let mut sw = StopwatchEngine::new(open(&dir), clock.clone());

    timer.start();
    sw.start();
    clock.advance_secs(120);
    sw.commit_day();
    timer.reset();

    let store = open(&dir);
    assert!(store.get_raw(COUNTDOWN_KEY).unwrap().is_some());
    assert!(store.get_raw(STOPWATCH_KEY).unwrap().is_some());
    assert_eq!(DailyLedger::load(&store).minutes_on(wednesday()), 2);
}

#[test]
fn watcher_follows_pause_from_another_process() {
    let dir = tempfile::tempdir().unwrap();
    let clock = ManualClock::at_date(wednesday());
    let hook = CountingHook::new();
    let mut watcher = countdown(&dir, &clock).with_hook(hook.clone());
    watcher.start();

    clock.advance_secs(600);
    countdown(&dir, &clock).pause();

    clock.advance_secs(3600);
    assert!(watcher.poll().is_none());
    assert!(!watcher.is_running());
    assert_eq!(hook.count(), 0);

    let reloaded = countdown(&dir, &clock);
    assert_eq!(reloaded.state(), TimerState::Paused);
    assert_eq!(reloaded.remaining_secs(), 3000);
}
