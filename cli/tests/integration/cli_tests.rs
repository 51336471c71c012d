//! CLI structure and argument-surface tests.

#![allow(clippy::expect_used)]

use assert_cmd::Command;
use predicates::prelude::*;

fn flotilla() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("flotilla"));
    cmd.env("NO_COLOR", "1");
    cmd
}

// --- Help and version tests ---

#[test]
fn test_cli_no_args_shows_help_and_exits_two() {
    // clap with arg_required_else_help shows help on stderr and exits 2
    flotilla().assert().code(2).stderr(predicate::str::contains(
        "Manifest-driven bootstrap for compute fleets",
    ));
}

#[test]
fn test_cli_help_flag_shows_help() {
    flotilla()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage:"))
        .stdout(predicate::str::contains("Commands:"))
        .stdout(predicate::str::contains("bootstrap"))
        .stdout(predicate::str::contains("wait"));
}

#[test]
fn test_cli_version_flag_shows_version() {
    flotilla()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("flotilla"));
}

#[test]
fn test_version_command_shows_version() {
    flotilla()
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_unknown_subcommand_is_rejected() {
    flotilla().arg("launch").assert().code(2);
}

// --- Required-argument tests ---

#[test]
fn test_bootstrap_requires_all_arguments() {
    flotilla()
        .arg("bootstrap")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("--bucket"))
        .stderr(predicate::str::contains("--manifest-key"))
        .stderr(predicate::str::contains("--instance-id"))
        .stderr(predicate::str::contains("--work-dir"));
}

#[test]
fn test_publish_requires_manifest_arguments() {
    flotilla()
        .arg("publish")
        .arg("--bucket")
        .arg("/tmp/store")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("--manifest"));
}

#[test]
fn test_wait_requires_bucket_and_key() {
    flotilla()
        .arg("wait")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("--bucket"));
}

#[test]
fn test_instance_id_must_be_numeric() {
    flotilla()
        .args([
            "bootstrap",
            "--bucket",
            "/tmp/store",
            "--manifest-key",
            "runs/x/manifest.json",
            "--instance-id",
            "first",
            "--work-dir",
            "/tmp/work",
        ])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("invalid value"));
}

// --- Store-error surface tests ---

#[test]
fn test_status_against_empty_store_reports_missing_manifest() {
    let store = tempfile::tempdir().expect("tempdir");
    flotilla()
        .args([
            "status",
            "--bucket",
            store.path().to_str().expect("utf-8 path"),
            "--manifest-key",
            "runs/x/manifest.json",
        ])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("no manifest"));
}
