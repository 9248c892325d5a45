//! Command-line tests for the pomocycle binary.
//!
//! Only paths that need no running daemon are exercised here: help,
//! listings, completions, argument validation and connection failures.

use assert_cmd::Command;
use predicates::prelude::*;

/// Builds the binary command with a socket path nothing listens on.
fn pomocycle() -> Command {
    let dir = tempfile::tempdir().unwrap();
    let socket = dir.path().join("absent.sock");
    // Keep the directory so the path stays valid
    std::mem::forget(dir);

    let mut cmd = Command::cargo_bin("pomocycle").unwrap();
    cmd.env("POMOCYCLE_SOCKET", socket)
        .env_remove("POMOCYCLE_POLL_MS")
        .env_remove("POMOCYCLE_ALARM")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_help() {
    pomocycle()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("作業フェーズと休憩フェーズ"))
        .stdout(predicate::str::contains("daemon"));
}

#[test]
fn test_version() {
    pomocycle()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_methods_lists_presets() {
    pomocycle()
        .arg("methods")
        .assert()
        .success()
        .stdout(predicate::str::contains("pomodoro"))
        .stdout(predicate::str::contains("50分作業 / 10分休憩 x 4サイクル"))
        .stdout(predicate::str::contains("custom"));
}

#[test]
fn test_completions_bash() {
    pomocycle()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("pomocycle"));
}

#[test]
fn test_status_without_daemon_fails() {
    pomocycle()
        .arg("status")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("エラー"))
        .stderr(predicate::str::contains("pomocycle daemon"));
}

#[test]
fn test_method_values_for_preset_fail() {
    pomocycle()
        .args(["method", "pomodoro", "--work", "30"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("custom を指定してください"));
}

#[test]
fn test_unknown_method_is_usage_error() {
    pomocycle()
        .args(["method", "hourly"])
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("不明なメソッドです"));
}

#[test]
fn test_poll_ms_out_of_range_is_usage_error() {
    pomocycle()
        .args(["run", "--poll-ms", "5"])
        .assert()
        .failure()
        .code(2);
}

#[test]
fn test_run_with_missing_alarm_file_fails() {
    pomocycle()
        .args(["run", "--no-sound", "--alarm", "/nonexistent/alarm.wav"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("アラームファイル"));
}
