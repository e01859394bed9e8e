//! Integration tests for the `petkit` CLI binary.
//!
//! Covers argument parsing, help output, shell completions, the offline
//! action catalogue and credential errors, without a PetKit account.
#![allow(clippy::unwrap_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `petkit` binary with env isolation.
///
/// Clears all `PETKIT_*` env vars and points config directories at a
/// nonexistent path so tests never touch the user's real configuration.
fn petkit_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("petkit");
    cmd.env("HOME", "/tmp/petkit-cli-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/petkit-cli-test-nonexistent")
        .env_remove("PETKIT_PROFILE")
        .env_remove("PETKIT_USERNAME")
        .env_remove("PETKIT_PASSWORD")
        .env_remove("PETKIT_REGION")
        .env_remove("PETKIT_OUTPUT")
        .env_remove("PETKIT_TIMEOUT");
    cmd
}

fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = petkit_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    petkit_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("PetKit")
            .and(predicate::str::contains("devices"))
            .and(predicate::str::contains("control"))
            .and(predicate::str::contains("actions")),
    );
}

#[test]
fn test_version_flag() {
    petkit_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("petkit"));
}

// ── Shell completions ───────────────────────────────────────────────

#[test]
fn test_completions_bash() {
    petkit_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

#[test]
fn test_completions_zsh() {
    petkit_cmd()
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef"));
}

// ── Action catalogue ────────────────────────────────────────────────

#[test]
fn test_actions_for_litter_box() {
    petkit_cmd()
        .args(["--output", "plain", "actions", "t4"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("clean")
                .and(predicate::str::contains("dump"))
                .and(predicate::str::contains("feed").not()),
        );
}

#[test]
fn test_actions_type_code_is_case_insensitive() {
    petkit_cmd()
        .args(["--output", "plain", "actions", "D4S"])
        .assert()
        .success()
        .stdout(predicate::str::contains("feed"));
}

#[test]
fn test_actions_unknown_type() {
    petkit_cmd()
        .args(["actions", "zz9"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("zz9"));
}

#[test]
fn test_actions_json_lists_types() {
    petkit_cmd()
        .args(["--output", "json", "actions"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"types\""));
}

// ── Error cases ─────────────────────────────────────────────────────

#[test]
fn test_invalid_subcommand() {
    let output = petkit_cmd().arg("foobar").output().unwrap();
    assert!(!output.status.success());
    let text = combined_output(&output);
    assert!(text.contains("foobar"), "Expected error mentioning foobar:\n{text}");
}

#[test]
fn test_devices_list_without_credentials() {
    petkit_cmd()
        .args(["devices", "list"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("credentials"));
}

#[test]
fn test_invalid_output_format() {
    let output = petkit_cmd()
        .args(["--output", "invalid", "devices", "list"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    let text = combined_output(&output);
    assert!(
        text.contains("invalid") || text.contains("possible values"),
        "Expected error about valid output formats:\n{text}"
    );
}

#[test]
fn test_control_requires_numeric_id() {
    petkit_cmd()
        .args(["control", "litter", "clean"])
        .assert()
        .code(2);
}

#[test]
fn test_config_show_no_config() {
    petkit_cmd().args(["config", "show"]).assert().success();
}

#[test]
fn test_config_use_unknown_profile() {
    petkit_cmd()
        .args(["config", "use", "nowhere"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("nowhere"));
}

// ── Subcommand help discovery ───────────────────────────────────────

#[test]
fn test_devices_subcommands_exist() {
    petkit_cmd()
        .args(["devices", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("list").and(predicate::str::contains("get")));
}

#[test]
fn test_config_subcommands_exist() {
    petkit_cmd()
        .args(["config", "--help"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("show")
                .and(predicate::str::contains("add"))
                .and(predicate::str::contains("set-password")),
        );
}
