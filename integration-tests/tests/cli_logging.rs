use assert_cmd::Command;
use predicates::prelude::*;
use std::path::Path;

fn countdown(home: &Path) -> Command {
    let mut cmd = Command::new("cargo");
    cmd.arg("run")
        .arg("--quiet")
        .arg("-p")
        .arg("countdown")
        .arg("--bin")
        .arg("countdown")
        .arg("--")
        .env("COUNTDOWN_HOME", home)
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_default_logging_is_human_readable() {
    let temp = tempfile::TempDir::new().unwrap();
    countdown(temp.path())
        .arg("once")
        .arg("--target")
        .arg("not a date")
        .assert()
        .failure()
        .stderr(predicate::str::contains("ERROR"))
        .stderr(predicate::str::contains("Command failed"))
        .stderr(predicate::str::contains("\"level\":").not());
}

#[test]
fn test_json_logging_flag_emits_json() {
    let temp = tempfile::TempDir::new().unwrap();
    countdown(temp.path())
        .arg("--log-json")
        .arg("once")
        .arg("--config")
        .arg("/nonexistent/countdown.yaml")
        .assert()
        .failure()
        .stderr(predicate::str::contains("\"level\":"))
        .stderr(predicate::str::contains("Failed to read config file"));
}

#[test]
fn test_pretty_logging_is_formatted() {
    let temp = tempfile::TempDir::new().unwrap();
    countdown(temp.path())
        .arg("--log-json")
        .arg("--pretty")
        .arg("once")
        .arg("--target")
        .arg("soon")
        .assert()
        .failure()
        .stderr(predicate::str::contains("{\n"))
        .stderr(predicate::str::contains("  \"message\": \"Command failed:"));
}

#[test]
fn test_verbose_logging_adds_timestamps() {
    let temp = tempfile::TempDir::new().unwrap();
    countdown(temp.path())
        .arg("-v")
        .arg("run")
        .arg("--target")
        .arg("2999-01-01T00:00:00Z")
        .arg("--tick-ms")
        .arg("10")
        .arg("--ticks")
        .arg("1")
        .arg("--lines")
        .assert()
        .success()
        .stderr(predicate::str::contains(" INFO "))
        .stderr(predicate::str::contains("countdown ticker started"));
}

#[test]
fn test_file_logging_captures_run_events() {
    let temp = tempfile::TempDir::new().unwrap();
    countdown(temp.path())
        .arg("run")
        .arg("--target")
        .arg("2999-01-01T00:00:00Z")
        .arg("--tick-ms")
        .arg("10")
        .arg("--ticks")
        .arg("2")
        .arg("--lines")
        .assert()
        .success();

    let logs_dir = temp.path().join(".countdown").join("logs");
    assert!(
        logs_dir.exists(),
        "Logs directory should be created at {logs_dir:?}"
    );

    let mut found_log = false;
    for entry in std::fs::read_dir(logs_dir).unwrap() {
        let path = entry.unwrap().path();
        if path.extension().and_then(|s| s.to_str()) == Some("log") {
            found_log = true;
            let content = std::fs::read_to_string(&path).unwrap();
            assert!(
                content.contains("\"level\":"),
                "Log file should be in JSON format"
            );
            assert!(
                content.contains("countdown updated"),
                "Log file should capture debug-level update events"
            );
        }
    }
    assert!(found_log, "Should have found a run log file");
}
