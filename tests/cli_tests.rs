//! CLI smoke tests for hackeros-builder.
//!
//! None of these reach live-build: they stop at argument parsing,
//! descriptor validation, or read-only commands.

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

const ENV_KEYS: &[&str] = &[
    "HACKEROS_LB",
    "HACKEROS_ARCH",
    "HACKEROS_BUILD_DIR",
    "HACKEROS_STEP_TIMEOUT",
    "HACKEROS_NONINTERACTIVE",
];

/// Command for the binary, run in `dir` with a clean configuration.
fn builder_cmd(dir: &TempDir) -> Command {
    let mut cmd = cargo_bin_cmd!("hackeros-builder");
    cmd.current_dir(dir.path());
    for key in ENV_KEYS {
        cmd.env_remove(key);
    }
    cmd
}

/// Project directory with the given descriptor and an empty `config/`.
fn project(descriptor: &str) -> TempDir {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("build.json"), descriptor).unwrap();
    fs::create_dir(temp.path().join("config")).unwrap();
    temp
}

// =============================================================================
// Help
// =============================================================================

#[test]
fn help_flag_works() {
    let temp = TempDir::new().unwrap();
    builder_cmd(&temp)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage"))
        .stdout(predicate::str::contains("profile"));
}

#[test]
fn unknown_subcommand_fails() {
    let temp = TempDir::new().unwrap();
    builder_cmd(&temp).arg("frobnicate").assert().failure();
}

// =============================================================================
// Descriptor validation
// =============================================================================

#[test]
fn build_without_descriptor_fails() {
    let temp = TempDir::new().unwrap();
    builder_cmd(&temp)
        .arg("build")
        .assert()
        .failure()
        .stderr(predicate::str::contains("build descriptor not found"));
}

#[test]
fn build_without_config_dir_fails() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("build.json"), r#"["lts"]"#).unwrap();
    builder_cmd(&temp)
        .arg("build")
        .assert()
        .failure()
        .stderr(predicate::str::contains("configuration directory not found"));
}

#[test]
fn build_with_unsupported_version_fails() {
    let temp = project(r#"["sid"]"#);
    builder_cmd(&temp)
        .arg("build")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unsupported version 'sid'"));
}

#[test]
fn build_with_object_descriptor_fails() {
    let temp = project(r#"{"version": "lts"}"#);
    builder_cmd(&temp)
        .arg("build")
        .assert()
        .failure()
        .stderr(predicate::str::contains("must be a list"));
}

// =============================================================================
// Show
// =============================================================================

#[test]
fn show_config_json_reflects_environment() {
    let temp = TempDir::new().unwrap();
    builder_cmd(&temp)
        .args(["show", "config", "--json"])
        .env("HACKEROS_ARCH", "arm64")
        .env("HACKEROS_STEP_TIMEOUT", "90")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"arch\": \"arm64\""))
        .stdout(predicate::str::contains("\"step_timeout_secs\": 90"));
}

#[test]
fn show_config_reads_dotenv() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join(".env"), "HACKEROS_LB=sudo lb\n").unwrap();
    builder_cmd(&temp)
        .args(["show", "config"])
        .assert()
        .success()
        .stdout(predicate::str::contains("HACKEROS_LB: sudo lb"));
}

#[test]
fn show_project_lists_track_and_profiles() {
    let temp = project(r#"["normal"]"#);
    fs::write(temp.path().join("tools.profile"), "[packages]\na = nmap\n").unwrap();
    builder_cmd(&temp)
        .args(["show", "project"])
        .assert()
        .success()
        .stdout(predicate::str::contains("rolling (forky)"))
        .stdout(predicate::str::contains("tools.profile"));
}

// =============================================================================
// Preflight
// =============================================================================

#[test]
fn preflight_without_strict_succeeds() {
    let temp = TempDir::new().unwrap();
    builder_cmd(&temp)
        .arg("preflight")
        .env("HACKEROS_LB", "definitely-not-installed-lb")
        .assert()
        .success()
        .stdout(predicate::str::contains("definitely-not-installed-lb"));
}

#[test]
fn preflight_strict_fails_when_lb_missing() {
    let temp = TempDir::new().unwrap();
    builder_cmd(&temp)
        .args(["preflight", "--strict"])
        .env("HACKEROS_LB", "definitely-not-installed-lb")
        .assert()
        .failure();
}
