//! Basic CLI E2E tests.
//!
//! Tests invoke CLI commands via cargo run against a throwaway HOME so the
//! real user config is never touched.

use std::path::Path;
use std::process::Command;

/// Run a CLI command with config rooted at `home`, returning output.
fn run_cli(home: &Path, args: &[&str]) -> (String, String, i32) {
    let output = Command::new("cargo")
        .args(["run", "-p", "tomatina-cli", "--"])
        .args(args)
        .env("HOME", home)
        .env("TOMATINA_ENV", "dev")
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

#[test]
fn config_list_defaults_to_empty() {
    let home = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli(home.path(), &["config", "list"]);
    assert_eq!(code, 0);
    let parsed: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert!(parsed.get("timer_duration").is_none());
}

#[test]
fn config_set_then_get_round_trips() {
    let home = tempfile::tempdir().unwrap();

    let (_, _, code) = run_cli(home.path(), &["config", "set", "timer_duration", "25"]);
    assert_eq!(code, 0);

    let (stdout, _, code) = run_cli(home.path(), &["config", "get", "timer_duration"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "25");
}

#[test]
fn config_set_rejects_garbage() {
    let home = tempfile::tempdir().unwrap();
    let (_, stderr, code) = run_cli(home.path(), &["config", "set", "timer_duration", "soon"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("timer_duration"));
}

#[test]
fn config_reset_clears_duration() {
    let home = tempfile::tempdir().unwrap();
    run_cli(home.path(), &["config", "set", "timer_duration", "15"]);
    let (_, _, code) = run_cli(home.path(), &["config", "reset"]);
    assert_eq!(code, 0);

    let (_, _, code) = run_cli(home.path(), &["config", "get", "timer_duration"]);
    assert_ne!(code, 0);
}

#[test]
fn timer_run_without_duration_fails_fast() {
    let home = tempfile::tempdir().unwrap();
    let (_, stderr, code) = run_cli(home.path(), &["timer", "run"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("no timer duration configured"));
}
