use std::fs;
use std::path::Path;
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::str::contains;
use serde_json::json;
use tempfile::TempDir;

fn herald_cmd(home: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("herald"));
    cmd.env("HOME", home)
        .env("USERPROFILE", home)
        .env_remove("HERALD_ACCESS_TOKEN")
        .env_remove("GOOGLE_OAUTH_ACCESS_TOKEN")
        .env_remove("GOOGLE_CLOUD_PROJECT")
        .env_remove("HERALD_API_BASE");
    cmd
}

fn schedule_day(date: &str, isha_iqamah: &str) -> serde_json::Value {
    json!({
        "date": date,
        "prayers": {
            "fajr":    {"begin": "06:20", "iqamah": "06:45"},
            "dhuhr":   {"begin": "12:35", "iqamah": "13:30"},
            "asr":     {"begin": "15:40", "iqamah": "16:15"},
            "maghrib": {"begin": "17:30", "iqamah": "17:35"},
            "isha":    {"begin": "18:50", "iqamah": isha_iqamah}
        }
    })
}

#[test]
fn schedule_validate_passes_clean_file() {
    let home = TempDir::new().expect("home");
    let path = home.path().join("prayer_times_2026.json");
    let doc = json!([schedule_day("2026-01-01", "20:00"), schedule_day("2026-12-31", "20:00")]);
    fs::write(&path, doc.to_string()).expect("schedule");

    herald_cmd(home.path())
        .args(["schedule", "validate"])
        .arg(&path)
        .assert()
        .success()
        .stdout(contains("0 error(s), 0 warning(s)"))
        .stdout(contains("schedule validation passed"));
}

#[test]
fn schedule_validate_blocks_empty_iqamah_when_asked() {
    let home = TempDir::new().expect("home");
    let path = home.path().join("prayer_times_2026.json");
    let doc = json!([schedule_day("2026-01-01", ""), schedule_day("2026-12-31", "20:00")]);
    fs::write(&path, doc.to_string()).expect("schedule");

    herald_cmd(home.path())
        .args(["schedule", "validate"])
        .arg(&path)
        .assert()
        .success()
        .stdout(contains("WARN"));

    herald_cmd(home.path())
        .args(["schedule", "validate", "--no-empty-iqamah"])
        .arg(&path)
        .assert()
        .code(1)
        .stdout(contains("FAIL"));
}

#[test]
fn schedule_validate_counts_missing_file_as_failure() {
    let home = TempDir::new().expect("home");

    herald_cmd(home.path())
        .args(["schedule", "validate"])
        .arg(home.path().join("missing.json"))
        .assert()
        .code(1)
        .stdout(contains("schedule validation failed"));
}

#[test]
fn partial_remote_arguments_only_warn() {
    let home = TempDir::new().expect("home");

    herald_cmd(home.path())
        .args(["schedule", "validate", "--year", "2026"])
        .assert()
        .success()
        .stdout(contains("remote check skipped"));
}

#[test]
fn on_publish_without_token_is_an_input_error() {
    let home = TempDir::new().expect("home");
    let event = home.path().join("event.json");
    fs::write(&event, r#"{"versionNumber": "12", "updateType": "INCREMENTAL_UPDATE"}"#)
        .expect("event");

    herald_cmd(home.path())
        .args(["--project", "demo", "on-publish", "--event"])
        .arg(&event)
        .assert()
        .code(2)
        .stderr(contains("access token"));
}

#[test]
fn ping_without_project_is_an_input_error() {
    let home = TempDir::new().expect("home");

    herald_cmd(home.path())
        .arg("ping")
        .env("HERALD_ACCESS_TOKEN", "token")
        .assert()
        .code(2)
        .stderr(contains("project id"));
}
