//! Basic CLI E2E tests.
//!
//! Each test runs the built binary against its own temporary data directory.

use std::path::Path;
use std::process::Command;

use serde_json::Value;

/// Run a CLI command and return (exit code, stdout, stderr).
fn run_cli(data_dir: &Path, args: &[&str]) -> (i32, String, String) {
    let output = Command::new(env!("CARGO_BIN_EXE_deepwork"))
        .args(args)
        .env("DEEPWORK_DATA_DIR", data_dir)
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (code, stdout, stderr)
}

fn run_json(data_dir: &Path, args: &[&str]) -> Value {
    let (code, stdout, stderr) = run_cli(data_dir, args);
    assert_eq!(code, 0, "{args:?} failed: {stderr}");
    serde_json::from_str(&stdout).expect("stdout is JSON")
}

#[test]
fn test_timer_status_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let status = run_json(dir.path(), &["timer", "status"]);
    assert_eq!(status["countdown"]["state"], "idle");
    assert_eq!(status["countdown"]["remaining_secs"], 3600);
    assert_eq!(status["clock"], "60:00");
    assert!(status.get("event").is_none());
}

#[test]
fn test_timer_start_then_pause() {
    let dir = tempfile::tempdir().unwrap();
    let started = run_json(dir.path(), &["timer", "start"]);
    assert_eq!(started["event"]["type"], "CountdownStarted");
    assert_eq!(started["countdown"]["state"], "running");

    let status = run_json(dir.path(), &["timer", "status"]);
    assert_eq!(status["countdown"]["running"], true);

    let paused = run_json(dir.path(), &["timer", "pause"]);
    assert_eq!(paused["event"]["type"], "CountdownPaused");
    assert_eq!(paused["countdown"]["state"], "paused");
    let remaining = paused["countdown"]["remaining_secs"].as_u64().unwrap();
    assert!(remaining > 3500 && remaining <= 3600);
}

#[test]
fn test_timer_extend_stops_at_cap() {
    let dir = tempfile::tempdir().unwrap();
    let extended = run_json(dir.path(), &["timer", "extend", "10"]);
    assert_eq!(extended["countdown"]["remaining_secs"], 3600);
}

#[test]
fn test_timer_set_duration() {
    let dir = tempfile::tempdir().unwrap();
    let set = run_json(dir.path(), &["timer", "set", "25"]);
    assert_eq!(set["event"]["type"], "CountdownDurationSet");
    assert_eq!(set["countdown"]["remaining_secs"], 1500);
    assert_eq!(set["clock"], "25:00");

    let extended = run_json(dir.path(), &["timer", "extend", "5"]);
    assert_eq!(extended["countdown"]["remaining_secs"], 1800);
}

#[test]
fn test_timer_reset() {
    let dir = tempfile::tempdir().unwrap();
    run_json(dir.path(), &["timer", "set", "10"]);
    let reset = run_json(dir.path(), &["timer", "reset"]);
    assert_eq!(reset["countdown"]["remaining_secs"], 3600);
    assert_eq!(reset["countdown"]["state"], "idle");
}

#[test]
fn test_stopwatch_start_and_commit() {
    let dir = tempfile::tempdir().unwrap();
    let started = run_json(dir.path(), &["stopwatch", "start"]);
    assert_eq!(started["event"]["type"], "StopwatchStarted");
    assert_eq!(started["stopwatch"]["running"], true);

    let committed = run_json(dir.path(), &["stopwatch", "commit"]);
    assert_eq!(committed["event"]["type"], "DayCommitted");
    assert_eq!(committed["event"]["minutes"], 0);
    assert_eq!(committed["stopwatch"]["running"], false);
    assert_eq!(committed["stopwatch"]["elapsed_secs"], 0);
    assert_eq!(committed["clock"], "00:00:00");
}

#[test]
fn test_week_has_seven_days() {
    let dir = tempfile::tempdir().unwrap();
    let week = run_json(dir.path(), &["week", "--date", "2024-10-09"]);
    let days = week["days"].as_array().unwrap();
    assert_eq!(days.len(), 7);
    assert_eq!(days[0]["date"], "2024-10-07");
    assert_eq!(days[0]["weekday"], "Mon");
    assert_eq!(days[6]["date"], "2024-10-13");
    assert_eq!(week["total_minutes"], 0);
    assert_eq!(week["total"], "0h 0m");
    assert!(week["busiest_day"].is_null());
}

#[test]
fn test_week_rejects_bad_date() {
    let dir = tempfile::tempdir().unwrap();
    let (code, _, stderr) = run_cli(dir.path(), &["week", "--date", "10/09/2024"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("invalid date"));
}

#[test]
fn test_ledger_empty() {
    let dir = tempfile::tempdir().unwrap();
    let ledger = run_json(dir.path(), &["ledger"]);
    assert_eq!(ledger, serde_json::json!({}));
}

#[test]
fn test_config_get_default() {
    let dir = tempfile::tempdir().unwrap();
    let value = run_json(dir.path(), &["config", "get", "countdown.default_minutes"]);
    assert_eq!(value["key"], "countdown.default_minutes");
    assert_eq!(value["value"], "60");
}

#[test]
fn test_config_set_changes_session_length() {
    let dir = tempfile::tempdir().unwrap();
    let set = run_json(dir.path(), &["config", "set", "countdown.default_minutes", "45"]);
    assert_eq!(set["value"], "45");

    let status = run_json(dir.path(), &["timer", "status"]);
    assert_eq!(status["countdown"]["default_secs"], 2700);
}

#[test]
fn test_config_unknown_key() {
    let dir = tempfile::tempdir().unwrap();
    let (code, _, _) = run_cli(dir.path(), &["config", "get", "nonexistent.key"]);
    assert_ne!(code, 0);
}

#[test]
fn test_config_cap_can_be_cleared() {
    let dir = tempfile::tempdir().unwrap();
    let set = run_json(dir.path(), &["config", "set", "countdown.cap_minutes", "90"]);
    assert_eq!(set["value"], "90");
    let cleared = run_json(dir.path(), &["config", "set", "countdown.cap_minutes", "none"]);
    assert_eq!(cleared["value"], "null");

    let status = run_json(dir.path(), &["timer", "status"]);
    assert_eq!(status["countdown"]["cap_secs"], 3600);
}
