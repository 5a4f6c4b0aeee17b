//! CLI integration tests
//!
//! These tests verify that the CLI works correctly with various options.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// Get the path to the site fixture
fn site_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/site")
}

fn cssprune() -> Command {
    Command::cargo_bin("cssprune").expect("binary is built")
}

/// A project whose inventory is not the expected document
fn broken_project() -> TempDir {
    let temp = TempDir::new().unwrap();
    fs::write(
        temp.path().join("cssprune.toml"),
        "input = \"main.css\"\noutput = \"dist/main.css\"\nplugins = [\"purge\"]\n\n[purge]\ninventory = \"hugo_stats.json\"\n",
    )
    .unwrap();
    fs::write(temp.path().join("main.css"), ".a { color: red; }").unwrap();
    fs::write(temp.path().join("hugo_stats.json"), r#"{"htmlElements": "none"}"#).unwrap();
    temp
}

/// A project that sets both content sources but does not purge
fn minify_only_project() -> TempDir {
    let temp = TempDir::new().unwrap();
    fs::write(
        temp.path().join("cssprune.toml"),
        "input = \"main.css\"\nplugins = [\"minify\"]\n\n[purge]\ninventory = \"hugo_stats.json\"\ncontent = [\"**/*.html\"]\n",
    )
    .unwrap();
    fs::write(temp.path().join("main.css"), ".a { color: red; }").unwrap();
    temp
}

// ============================================================================
// Basic CLI Tests
// ============================================================================

#[test]
fn test_cli_help() {
    cssprune()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("cssprune"))
        .stdout(predicate::str::contains("--inventory"))
        .stdout(predicate::str::contains("--content"))
        .stdout(predicate::str::contains("--safelist"));
}

#[test]
fn test_cli_version() {
    cssprune()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_cli_inventory_and_content_conflict() {
    cssprune()
        .arg(site_path())
        .args(["--inventory", "hugo_stats.json", "--content", "**/*.html"])
        .assert()
        .failure();
}

// ============================================================================
// Build Tests
// ============================================================================

#[test]
fn test_cli_fixture_build_to_stdout() {
    cssprune()
        .arg(site_path())
        .arg("--quiet")
        .assert()
        .success()
        .stdout(predicate::str::contains(".nav-link"))
        .stdout(predicate::str::contains("blockquote"))
        .stdout(predicate::str::contains(".sidebar").not());
}

#[test]
fn test_cli_content_globs_override_inventory() {
    cssprune()
        .arg(site_path())
        .args(["--quiet", "--content", "**/*.html"])
        .assert()
        .success()
        .stdout(predicate::str::contains(".sidebar"));
}

#[test]
fn test_cli_minify_flag() {
    let output = cssprune()
        .arg(site_path())
        .args(["--quiet", "--minify"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let css = String::from_utf8_lossy(&output.stdout);
    assert!(css.contains(".nav-link"));
    assert!(!css.trim_end().contains('\n'));
}

#[test]
fn test_cli_report_stays_off_stdout() {
    cssprune()
        .arg(site_path())
        .args(["--format", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"version\"").not())
        .stderr(predicate::str::contains("\"version\": \"1.0\""));
}

#[test]
fn test_cli_json_report_file() {
    let temp = TempDir::new().unwrap();
    let report = temp.path().join("report.json");

    cssprune()
        .arg(site_path())
        .args(["--quiet", "--format", "json", "--report"])
        .arg(&report)
        .assert()
        .success();

    let json = fs::read_to_string(&report).unwrap();
    assert!(json.contains("\"inventory\""));
    assert!(json.contains("\"removed\""));
}

#[test]
fn test_cli_output_file() {
    let temp = TempDir::new().unwrap();
    let out = temp.path().join("site.css");

    cssprune()
        .arg(site_path())
        .arg("--quiet")
        .arg("--output")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    let css = fs::read_to_string(&out).unwrap();
    assert!(css.contains(".post-title"));
}

// ============================================================================
// Token Listing
// ============================================================================

#[test]
fn test_cli_tokens_from_inventory() {
    let output = cssprune()
        .arg(site_path())
        .args(["--quiet", "--tokens"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let tokens: Vec<&str> = stdout.lines().collect();
    assert_eq!(tokens.first(), Some(&"a"));
    assert_eq!(tokens.last(), Some(&"content"));
    assert!(tokens.contains(&"nav-link"));
}

#[test]
fn test_cli_tokens_from_globs() {
    cssprune()
        .arg(site_path())
        .args(["--quiet", "--tokens", "--content", "**/*.html"])
        .assert()
        .success()
        .stdout(predicate::str::contains("sidebar"));
}

// ============================================================================
// Failures
// ============================================================================

#[test]
fn test_cli_malformed_inventory_fails_without_output() {
    let temp = broken_project();

    cssprune()
        .arg(temp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Malformed markup inventory"));

    assert!(!temp.path().join("dist/main.css").exists());
}

#[test]
fn test_cli_missing_input_fails() {
    let temp = TempDir::new().unwrap();

    cssprune()
        .arg(temp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("No input style sheet configured"));
}

#[test]
fn test_cli_content_source_ignored_without_purge() {
    let temp = minify_only_project();

    cssprune()
        .arg(temp.path())
        .arg("--quiet")
        .assert()
        .success()
        .stdout(predicate::str::contains(".a{color:red}"));
}

#[test]
fn test_cli_tokens_still_need_one_content_source() {
    let temp = minify_only_project();

    cssprune()
        .arg(temp.path())
        .arg("--tokens")
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be used together"));
}
