//! Basic CLI E2E tests.
//!
//! Tests invoke CLI commands via cargo run against a throwaway config
//! directory and verify outputs.

use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};

use tempfile::TempDir;

fn cli(dir: &Path) -> Command {
    let mut cmd = Command::new("cargo");
    cmd.args(["run", "-q", "-p", "facedown-cli", "--"])
        .env("FACEDOWN_CONFIG_DIR", dir)
        .env_remove("FACEDOWN_LOG");
    cmd
}

/// Run a CLI command and return (stdout, stderr, exit code).
fn run_cli(dir: &Path, args: &[&str]) -> (String, String, i32) {
    let output = cli(dir)
        .args(args)
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

/// Run `facedown-cli run` with the given stdin script.
fn run_session(dir: &Path, args: &[&str], script: &str) -> (String, i32) {
    let mut child = cli(dir)
        .arg("run")
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to spawn CLI");
    child
        .stdin
        .take()
        .unwrap()
        .write_all(script.as_bytes())
        .unwrap();
    let output = child.wait_with_output().unwrap();
    (
        String::from_utf8_lossy(&output.stdout).to_string(),
        output.status.code().unwrap_or(-1),
    )
}

fn event_types(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .filter_map(|line| serde_json::from_str::<serde_json::Value>(line).ok())
        .filter_map(|v| v["type"].as_str().map(str::to_string))
        .collect()
}

#[test]
fn test_config_list_shows_defaults() {
    let dir = TempDir::new().unwrap();
    let (stdout, _, code) = run_cli(dir.path(), &["config", "list"]);
    assert_eq!(code, 0);

    let parsed: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(parsed["timer"]["work_minutes"], 25);
    assert_eq!(parsed["timer"]["require_face_down"], true);
    assert_eq!(parsed["alert"]["cooldown_secs"], 3);
    assert!(dir.path().join("config.toml").exists());
}

#[test]
fn test_config_set_then_get() {
    let dir = TempDir::new().unwrap();
    let (_, _, code) = run_cli(dir.path(), &["config", "set", "timer.work_minutes", "40"]);
    assert_eq!(code, 0);

    let (stdout, _, code) = run_cli(dir.path(), &["config", "get", "timer.work_minutes"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "40");
}

#[test]
fn test_config_unknown_key_fails() {
    let dir = TempDir::new().unwrap();
    let (_, stderr, code) = run_cli(dir.path(), &["config", "set", "timer.nope", "1"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("error:"));

    let (_, _, code) = run_cli(dir.path(), &["config", "get", "timer.nope"]);
    assert_eq!(code, 1);
}

#[test]
fn test_config_reset() {
    let dir = TempDir::new().unwrap();
    run_cli(dir.path(), &["config", "set", "timer.break_minutes", "12"]);
    let (_, _, code) = run_cli(dir.path(), &["config", "reset"]);
    assert_eq!(code, 0);

    let (stdout, _, _) = run_cli(dir.path(), &["config", "get", "timer.break_minutes"]);
    assert_eq!(stdout.trim(), "5");
}

#[test]
fn test_status_json_uses_config() {
    let dir = TempDir::new().unwrap();
    run_cli(dir.path(), &["config", "set", "timer.work_minutes", "45"]);

    let (stdout, _, code) = run_cli(dir.path(), &["status", "--json"]);
    assert_eq!(code, 0);
    let parsed: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(parsed["phase"], "work");
    assert_eq!(parsed["running"], false);
    assert_eq!(parsed["remaining_secs"], 45 * 60);
}

#[test]
fn test_status_human() {
    let dir = TempDir::new().unwrap();
    let (stdout, _, code) = run_cli(dir.path(), &["status"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("25:00"));
    assert!(stdout.contains("Press Start"));
}

#[test]
fn test_run_arms_when_face_down() {
    let dir = TempDir::new().unwrap();
    let (stdout, code) = run_session(dir.path(), &["--json"], "d\ns\nq\n");
    assert_eq!(code, 0);

    let types = event_types(&stdout);
    assert!(types.iter().any(|t| t == "TimerStarted"), "{stdout}");
    assert!(types.iter().any(|t| t == "EnforcementArmed"), "{stdout}");
    assert_eq!(types.last().map(String::as_str), Some("TimerPaused"));
}

#[test]
fn test_run_without_face_down_never_arms() {
    let dir = TempDir::new().unwrap();
    let (stdout, code) = run_session(dir.path(), &["--json", "--no-face-down"], "d\ns\n");
    assert_eq!(code, 0);

    let types = event_types(&stdout);
    assert!(types.iter().any(|t| t == "TimerStarted"), "{stdout}");
    assert!(!types.iter().any(|t| t == "EnforcementArmed"), "{stdout}");
}

#[test]
fn test_run_classifies_gravity_with_configured_threshold() {
    let dir = TempDir::new().unwrap();
    let (stdout, code) = run_session(dir.path(), &["--json"], "g 0.95\ns\nq\n");
    assert_eq!(code, 0);
    assert!(event_types(&stdout).iter().any(|t| t == "EnforcementArmed"), "{stdout}");

    run_cli(dir.path(), &["config", "set", "sensor.face_down_threshold", "0.99"]);
    let (stdout, code) = run_session(dir.path(), &["--json"], "g 0.95\ns\nq\n");
    assert_eq!(code, 0);
    assert!(!event_types(&stdout).iter().any(|t| t == "EnforcementArmed"), "{stdout}");
}

#[test]
fn test_onboard_yes_completes_without_prompt() {
    let dir = TempDir::new().unwrap();
    let (stdout, _, code) = run_cli(dir.path(), &["onboard", "--yes"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("ready."));

    let (stdout, _, _) = run_cli(dir.path(), &["config", "get", "onboarding_completed"]);
    assert_eq!(stdout.trim(), "true");

    let (stdout, _, code) = run_cli(dir.path(), &["onboard", "--yes"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("already completed"));
}
