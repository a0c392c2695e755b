//! Integration tests for the `domoplug` CLI binary.
//!
//! These tests validate argument parsing, help output, and error
//! handling — all without requiring a live Domoticz controller.
#![allow(clippy::unwrap_used)]

use std::io::Write;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::NamedTempFile;

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `domoplug` binary with env isolation.
///
/// Clears all `DOMOPLUG_*` env vars and points config directories at a
/// nonexistent path so tests never touch the user's real configuration.
fn domoplug_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("domoplug");
    cmd.env("HOME", "/tmp/domoplug-cli-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/domoplug-cli-test-nonexistent")
        .env_remove("DOMOPLUG_CONFIG")
        .env_remove("DOMOPLUG_INSECURE")
        .env_remove("DOMOPLUG_TIMEOUT");
    cmd
}

/// Write a config file that lives for the duration of a test.
fn config_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = domoplug_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(
        text.contains("Usage"),
        "Expected 'Usage' in output:\n{text}"
    );
}

#[test]
fn test_help_flag() {
    domoplug_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("Domoticz")
            .and(predicate::str::contains("on"))
            .and(predicate::str::contains("off"))
            .and(predicate::str::contains("status"))
            .and(predicate::str::contains("plugs"))
            .and(predicate::str::contains("gcode")),
    );
}

#[test]
fn test_version_flag() {
    domoplug_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("domoplug"));
}

// ── Error cases ─────────────────────────────────────────────────────

#[test]
fn test_invalid_subcommand() {
    let output = domoplug_cmd().arg("frobnicate").output().unwrap();
    assert!(
        !output.status.success(),
        "Expected failure for invalid subcommand"
    );
    let text = combined_output(&output);
    assert!(
        text.contains("invalid") || text.contains("unrecognized") || text.contains("frobnicate"),
        "Expected error mentioning invalid subcommand:\n{text}"
    );
}

#[test]
fn test_on_unconfigured_plug_is_not_found() {
    let config = config_file("");
    let output = domoplug_cmd()
        .args(["on", "10.9.9.9", "4"])
        .arg("--config")
        .arg(config.path())
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(4), "Expected exit code 4");
    let text = combined_output(&output);
    assert!(
        text.contains("No plug configured"),
        "Expected not-found diagnostic:\n{text}"
    );
}

#[test]
fn test_missing_config_file_is_usage_error() {
    let output = domoplug_cmd()
        .args(["plugs", "--config", "/tmp/domoplug-cli-test-nonexistent/nope.toml"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(
        text.contains("Config file not found"),
        "Expected missing-config diagnostic:\n{text}"
    );
}

#[test]
fn test_invalid_config_credentials_rejected() {
    // username without any password source fails validation at load.
    let config = config_file(
        r#"
        [[plugs]]
        address = "10.0.0.5"
        idx = "1"
        username = "admin"
        "#,
    );
    let output = domoplug_cmd()
        .args(["plugs"])
        .arg("--config")
        .arg(config.path())
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
}

// ── Plug listing ────────────────────────────────────────────────────

#[test]
fn test_plugs_empty_config() {
    let config = config_file("");
    domoplug_cmd()
        .args(["plugs"])
        .arg("--config")
        .arg(config.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("no plugs configured"));
}

#[test]
fn test_plugs_lists_configured_entries() {
    let config = config_file(
        r#"
        [[plugs]]
        address = "10.0.0.5:8080"
        idx = "2"
        label = "Printer PSU"
        gcode_enabled = true

        [[plugs]]
        address = "10.0.0.6"
        idx = "7"
        "#,
    );
    domoplug_cmd()
        .args(["plugs"])
        .arg("--config")
        .arg(config.path())
        .assert()
        .success()
        .stdout(
            predicate::str::contains("Printer PSU")
                .and(predicate::str::contains("10.0.0.5:8080"))
                .and(predicate::str::contains("10.0.0.6")),
        );
}

// ── G-code replay ───────────────────────────────────────────────────

#[test]
fn test_gcode_dry_run_reports_triggers() {
    let config = config_file(
        r#"
        [[plugs]]
        address = "10.0.0.5"
        idx = "2"
        gcode_enabled = true
        "#,
    );
    let gcode = config_file("G28\nM80 10.0.0.5 2\nG1 X10\n@DOMOTICZOFF 2\n");
    domoplug_cmd()
        .args(["gcode", "--dry-run"])
        .arg(gcode.path())
        .arg("--config")
        .arg(config.path())
        .assert()
        .success()
        .stdout(
            predicate::str::contains("power on")
                .and(predicate::str::contains("power off")),
        );
}

#[test]
fn test_gcode_dry_run_ignores_unknown_plugs() {
    let config = config_file("");
    let gcode = config_file("M80 10.0.0.5 2\n");
    domoplug_cmd()
        .args(["gcode", "--dry-run"])
        .arg(gcode.path())
        .arg("--config")
        .arg(config.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("ignored"));
}

#[test]
fn test_gcode_missing_file() {
    let config = config_file("");
    let output = domoplug_cmd()
        .args(["gcode", "/tmp/domoplug-cli-test-nonexistent/print.gcode"])
        .arg("--config")
        .arg(config.path())
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1), "Expected exit code 1");
    let text = combined_output(&output);
    assert!(
        text.contains("Could not read"),
        "Expected read-failure diagnostic:\n{text}"
    );
}
