//! Integration tests for the CLI skeleton: help, version and global flags.

#![allow(clippy::expect_used)]

use assert_cmd::Command;
use predicates::prelude::*;

fn loader_bootstrap() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("loader-bootstrap"));
    cmd.env("NO_COLOR", "1");
    cmd
}

#[test]
fn test_cli_no_args_shows_help() {
    // clap with arg_required_else_help prints help on stderr and exits 2
    loader_bootstrap()
        .assert()
        .code(2)
        .stderr(predicate::str::contains(
            "First-boot provisioning for bucket-loader worker nodes",
        ));
}

#[test]
fn test_cli_help_lists_subcommands() {
    loader_bootstrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage:"))
        .stdout(predicate::str::contains("run"))
        .stdout(predicate::str::contains("plan"))
        .stdout(predicate::str::contains("validate"));
}

#[test]
fn test_run_help_mentions_strict_and_credentials() {
    loader_bootstrap()
        .args(["run", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--strict"))
        .stdout(predicate::str::contains("--access-key"))
        .stdout(predicate::str::contains("--secret-key"));
}

#[test]
fn test_cli_version_flag_shows_version() {
    loader_bootstrap()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("loader-bootstrap"));
}

#[test]
fn test_version_command_shows_version() {
    loader_bootstrap()
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains(concat!(
            "loader-bootstrap ",
            env!("CARGO_PKG_VERSION")
        )));
}

#[test]
fn test_version_command_json_outputs_valid_json() {
    let output = loader_bootstrap()
        .args(["version", "--json"])
        .output()
        .expect("binary runs");
    assert!(output.status.success());
    let value: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout is JSON");
    assert_eq!(value["version"], env!("CARGO_PKG_VERSION"));
}

#[test]
fn test_unknown_subcommand_is_rejected() {
    loader_bootstrap()
        .arg("master")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("unrecognized subcommand"));
}
