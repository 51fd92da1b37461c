//! Basic CLI E2E tests.
//!
//! Each test runs the built binary against its own data directory.

use std::path::Path;
use std::process::Command;

/// Run a CLI command and return (stdout, stderr, exit code).
fn run_cli(home: &Path, args: &[&str]) -> (String, String, i32) {
    let output = Command::new(env!("CARGO_BIN_EXE_tasktide"))
        .env("TASKTIDE_HOME", home)
        .env_remove("RUST_LOG")
        .args(args)
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

fn run_ok(home: &Path, args: &[&str]) -> String {
    let (stdout, stderr, code) = run_cli(home, args);
    assert_eq!(code, 0, "{args:?} failed: {stderr}");
    stdout
}

fn create_task(home: &Path, args: &[&str]) -> String {
    let mut full = vec!["task", "create"];
    full.extend_from_slice(args);
    let out = run_ok(home, &full);
    let task: serde_json::Value = serde_json::from_str(&out).unwrap();
    task["id"].as_str().unwrap().to_string()
}

#[test]
fn test_task_create_and_list() {
    let home = tempfile::tempdir().unwrap();
    create_task(home.path(), &["Write report", "--kind", "backlog", "--plan", "2024-03-10"]);

    let out = run_ok(home.path(), &["task", "list"]);
    let tasks: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(tasks.as_array().unwrap().len(), 1);
    assert_eq!(tasks[0]["recurrence"]["type"], "backlog");
}

#[test]
fn test_overdue_and_today() {
    let home = tempfile::tempdir().unwrap();
    create_task(home.path(), &["Report", "--kind", "backlog", "--plan", "2024-03-10"]);
    create_task(home.path(), &["Gym", "--kind", "scheduled", "--days", "1,5"]);

    let out = run_ok(home.path(), &["overdue", "--date", "2024-03-15"]);
    let rows: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(rows.as_array().unwrap().len(), 1);
    assert_eq!(rows[0]["title"], "Report");

    // 2024-03-15 is a Friday.
    let out = run_ok(home.path(), &["today", "--date", "2024-03-15"]);
    let rows: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(rows.as_array().unwrap().len(), 1);
    assert_eq!(rows[0]["task"]["title"], "Gym");
}

#[test]
fn test_layout_columns() {
    let home = tempfile::tempdir().unwrap();
    let a = create_task(home.path(), &["A"]);
    let b = create_task(home.path(), &["B"]);
    run_ok(home.path(), &["task", "slot", &a, "2024-03-15", "09:00", "10:00"]);
    run_ok(home.path(), &["task", "slot", &b, "2024-03-15", "09:30", "10:30"]);

    let out = run_ok(home.path(), &["layout", "--date", "2024-03-15"]);
    let layout: serde_json::Value = serde_json::from_str(&out).unwrap();
    let layout = layout.as_array().unwrap();
    assert_eq!(layout.len(), 2);
    assert!(layout.iter().all(|a| a["total_columns"] == 2));
}

#[test]
fn test_queue_and_timer_start() {
    let home = tempfile::tempdir().unwrap();
    let id = create_task(home.path(), &["Deep work", "--work-duration", "600"]);
    run_ok(home.path(), &["queue", "add", &id]);

    let out = run_ok(home.path(), &["timer", "start"]);
    assert!(out.contains("\"timer_started\""));
    assert!(out.contains("\"seconds_left\": 600"));

    let out = run_ok(home.path(), &["timer", "stop"]);
    assert!(out.contains("\"timer_stopped\""));
}

#[test]
fn test_unknown_task_fails() {
    let home = tempfile::tempdir().unwrap();
    let (_, stderr, code) = run_cli(home.path(), &["queue", "add", "missing"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("error:"));
}

#[test]
fn test_config_set_persists() {
    let home = tempfile::tempdir().unwrap();
    run_ok(home.path(), &["config", "set", "timer.work_duration_sec", "1800"]);
    let out = run_ok(home.path(), &["config", "get", "timer.work_duration_sec"]);
    assert_eq!(out.trim(), "1800");
    assert!(run_cli(home.path(), &["config", "set", "timer.nope", "1"]).2 != 0);
}

#[test]
fn test_config_durations_reach_persisted_timer() {
    let home = tempfile::tempdir().unwrap();
    // Writes state.json with the default durations.
    let out = run_ok(home.path(), &["timer", "status"]);
    assert!(out.contains("\"seconds_left\": 1500"));

    run_ok(home.path(), &["config", "set", "timer.work_duration_sec", "1800"]);
    let out = run_ok(home.path(), &["timer", "reset"]);
    assert!(out.contains("\"timer_reset\""));
    assert!(out.contains("\"seconds_left\": 1800"));
    assert!(!out.contains("\"seconds_left\": 1500"));
}

#[test]
fn test_timer_settings_saved_to_config() {
    let home = tempfile::tempdir().unwrap();
    run_ok(home.path(), &["timer", "settings", "--short-break", "240"]);
    let out = run_ok(home.path(), &["config", "get", "timer.short_break_sec"]);
    assert_eq!(out.trim(), "240");
}
