//! Binary-level smoke tests for the CLI surface.
//!
//! These never reach the network: they exercise the argument/configuration
//! layer, which fails before any client is built.

use assert_cmd::Command;
use predicates::prelude::*;

fn cmd() -> Command {
    let mut cmd = Command::cargo_bin("cf-mirror").expect("binary builds");
    // Isolate from the invoking environment.
    cmd.env_remove("ADDON_NAME")
        .env_remove("ADDON_ID")
        .env_remove("CF_API_KEY")
        .env_remove("PROXY_API_KEY")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_missing_addon_name_exits_nonzero() {
    cmd()
        .assert()
        .failure()
        .stderr(predicate::str::contains("no add-on name configured"));
}

#[test]
fn test_help_shows_about() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Mirror the latest CurseForge files"));
}

#[test]
fn test_version_prints_crate_version() {
    cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_invalid_max_attempts_rejected() {
    cmd()
        .args(["some-addon", "--max-attempts", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value"));
}
