//! Smoke tests for the plotcheck CLI
//!
//! These tests run the built binary against small summaries on disk.

#![allow(deprecated)] // Allow deprecated Command::cargo_bin until assert_cmd is updated
#![allow(clippy::expect_used, clippy::unwrap_used)]

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// Get a command for the plotcheck binary
fn plotcheck() -> Command {
    let mut cmd = Command::cargo_bin("plotcheck").expect("plotcheck binary should exist");
    cmd.args(["--color", "never"]);
    cmd
}

fn write(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).unwrap();
    path
}

// ============================================================================
// Basic CLI Tests
// ============================================================================

#[test]
fn test_version_flag() {
    plotcheck()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("0.4.0"));
}

#[test]
fn test_help_flag() {
    plotcheck()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("diff"))
        .stdout(predicate::str::contains("patch"))
        .stdout(predicate::str::contains("check-images"))
        .stdout(predicate::str::contains("subtest"));
}

#[test]
fn test_no_args_fails() {
    plotcheck().assert().failure(); // Requires a subcommand
}

// ============================================================================
// Diff Tests
// ============================================================================

#[test]
fn test_diff_matching_summaries() {
    let dir = TempDir::new().unwrap();
    let baseline = write(
        &dir,
        "baseline.json",
        r#"{"t1": {"status": "passed", "rms": "REGEX:[0-9.]+"}}"#,
    );
    let result = write(
        &dir,
        "result.json",
        r#"{"t1": {"status": "passed", "rms": "12.5"}}"#,
    );

    plotcheck()
        .args(["diff"])
        .arg(&baseline)
        .arg(&result)
        .assert()
        .success()
        .stderr(predicate::str::contains("PASS"));
}

#[test]
fn test_diff_mismatch_exits_nonzero() {
    let dir = TempDir::new().unwrap();
    let baseline = write(&dir, "baseline.json", r#"{"t1": {"status": "passed"}}"#);
    let result = write(&dir, "result.json", r#"{"t1": {"status": "failed"}}"#);

    plotcheck()
        .args(["diff"])
        .arg(&baseline)
        .arg(&result)
        .assert()
        .failure()
        .stderr(predicate::str::contains("FAIL"))
        .stderr(predicate::str::contains("Summary item status for t1 does not match."));
}

#[test]
fn test_diff_json_output() {
    let dir = TempDir::new().unwrap();
    let baseline = write(&dir, "baseline.json", r#"{"t1": {"a": 1}, "t2": {"a": 1}}"#);
    let result = write(&dir, "result.json", r#"{"t1": {"a": 1}}"#);

    plotcheck()
        .args(["diff", "--format", "json"])
        .arg(&baseline)
        .arg(&result)
        .assert()
        .failure()
        .stdout(predicate::str::contains("\"mismatches\""))
        .stdout(predicate::str::contains("t2"));
}

#[test]
fn test_diff_with_patch() {
    let dir = TempDir::new().unwrap();
    let baseline = write(&dir, "baseline.json", r#"{"t1": {"a": 1}}"#);
    let result = write(&dir, "result.json", r#"{"t1": {"a": 2}}"#);
    let patch = write(&dir, "baseline_mpl38_ft261.patch.json", r#"{"t1": {"a": 2}}"#);

    plotcheck()
        .args(["diff", "--patch"])
        .arg(&patch)
        .arg(&baseline)
        .arg(&result)
        .assert()
        .success();
}

#[test]
fn test_diff_missing_file() {
    let dir = TempDir::new().unwrap();
    let result = write(&dir, "result.json", "{}");

    plotcheck()
        .args(["diff"])
        .arg(dir.path().join("missing.json"))
        .arg(&result)
        .assert()
        .failure()
        .stderr(predicate::str::contains("File not found"));
}

// ============================================================================
// Patch Tests
// ============================================================================

#[test]
fn test_patch_to_stdout() {
    let dir = TempDir::new().unwrap();
    let summary = write(&dir, "summary.json", r#"{"t1": {"a": 1, "b": "x"}}"#);
    let patch = write(&dir, "fix.patch.json", r#"{"t1": {"b": "y"}}"#);

    plotcheck()
        .args(["patch"])
        .arg(&summary)
        .arg(&patch)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"y\""));
}

#[test]
fn test_patch_unknown_test_fails() {
    let dir = TempDir::new().unwrap();
    let summary = write(&dir, "summary.json", r#"{"t1": {"a": 1}}"#);
    let patch = write(&dir, "fix.patch.json", r#"{"t9": {"a": 2}}"#);

    plotcheck()
        .args(["patch"])
        .arg(&summary)
        .arg(&patch)
        .assert()
        .failure()
        .stderr(predicate::str::contains("t9"));
}

// ============================================================================
// Check-Images Tests
// ============================================================================

#[test]
fn test_check_images_present_and_missing() {
    let dir = TempDir::new().unwrap();
    fs::create_dir_all(dir.path().join("t1")).unwrap();
    fs::write(dir.path().join("t1/result.png"), b"png").unwrap();
    let ok = write(
        &dir,
        "ok.json",
        r#"{"t1": {"result_image": "t1/result.png", "diff_image": null}}"#,
    );
    let missing = write(
        &dir,
        "missing.json",
        r#"{"t1": {"result_image": "t1/nope.png"}}"#,
    );

    plotcheck()
        .args(["check-images", "-p"])
        .arg(dir.path())
        .arg(&ok)
        .assert()
        .success();

    plotcheck()
        .args(["check-images", "-p"])
        .arg(dir.path())
        .arg(&missing)
        .assert()
        .failure()
        .stderr(predicate::str::contains("nope.png"));
}

// ============================================================================
// Version-Id Tests
// ============================================================================

#[test]
fn test_version_id_explicit() {
    plotcheck()
        .args(["version-id", "--matplotlib", "3.8.2", "--freetype", "2.6.1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("mpl38_ft261"));
}

#[test]
fn test_version_id_requires_both_versions() {
    plotcheck()
        .args(["version-id", "--matplotlib", "3.8.2"])
        .assert()
        .failure();
}

// ============================================================================
// Subtest Tests
// ============================================================================

#[test]
fn test_subtest_missing_config() {
    let dir = TempDir::new().unwrap();

    plotcheck()
        .args(["subtest", "test_default", "--config"])
        .arg(dir.path().join("absent.yaml"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("pass --config"));
}
