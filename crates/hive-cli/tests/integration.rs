//! End-to-end CLI integration tests for the `hive` binary.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Build a `Command` targeting the cargo-built `hive` binary, scoped to a
/// fresh database path in `tmp`.
fn hive(tmp: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("hive").unwrap();
    cmd.env("HIVE_CONFIG", tmp.path().join("absent.toml"));
    cmd.arg("--path").arg(tmp.path().join("hive.db"));
    cmd
}

#[test]
fn edit_then_get_round_trips_a_value() {
    let tmp = TempDir::new().unwrap();
    hive(&tmp).args(["edit", "svc/replicas", "3"]).assert().success();
    hive(&tmp).args(["get", "svc/replicas"]).assert().success().stdout(predicate::str::contains("3"));
}

#[test]
fn get_on_missing_path_reports_not_present() {
    let tmp = TempDir::new().unwrap();
    hive(&tmp).args(["get", "nope"]).assert().success().stdout(predicate::str::contains("not present"));
}

#[test]
fn rm_on_missing_path_fails() {
    let tmp = TempDir::new().unwrap();
    hive(&tmp).args(["rm", "nope"]).assert().failure();
}

#[test]
fn ls_lists_first_segment_of_every_key() {
    let tmp = TempDir::new().unwrap();
    hive(&tmp).args(["edit", "cortex/views/main", "1"]).assert().success();
    hive(&tmp).args(["edit", "axon/bus", "2"]).assert().success();
    let output = hive(&tmp).args(["ls"]).output().unwrap();
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("cortex"));
    assert!(stdout.contains("axon"));
}

#[test]
fn rm_then_get_reports_not_present() {
    let tmp = TempDir::new().unwrap();
    hive(&tmp).args(["edit", "k", "\"v\""]).assert().success();
    hive(&tmp).args(["rm", "k"]).assert().success();
    hive(&tmp).args(["get", "k"]).assert().success().stdout(predicate::str::contains("not present"));
}

#[test]
fn edit_rejects_malformed_json_value() {
    let tmp = TempDir::new().unwrap();
    hive(&tmp).args(["edit", "k", "not-json"]).assert().failure();
}
