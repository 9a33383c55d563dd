//! Integration tests for `simpleenvs check`.
//!
//! Responsibilities:
//! - Prove valid files pass and required keys are enforced.
//! - Prove invalid files fail with the documented exit codes.
//! - Prove error output never echoes values from the file.

mod common;

use common::{env_dir, simpleenvs_cmd};
use predicates::prelude::*;
use std::fs;

#[test]
fn test_check_valid_file() {
    let dir = env_dir("APP_NAME=MyApp\nDEBUG=true\nPORT=8080\n");

    simpleenvs_cmd(&dir)
        .arg("check")
        .assert()
        .success()
        .stdout(predicate::str::contains("Variables: 3"))
        .stdout(predicate::str::contains("OK"));
}

#[test]
fn test_check_missing_required_keys() {
    let dir = env_dir("PORT=8080\n");

    simpleenvs_cmd(&dir)
        .args(["check", "--require", "PORT", "--require", "DATABASE_URL"])
        .assert()
        .code(5)
        .stdout(predicate::str::contains("Missing: DATABASE_URL"))
        .stderr(predicate::str::contains("DATABASE_URL"));
}

#[test]
fn test_check_dangerous_value_strict_and_lenient() {
    let dir = env_dir("BAD=$(rm -rf /)\n");

    simpleenvs_cmd(&dir)
        .arg("check")
        .assert()
        .code(5)
        .stderr(predicate::str::contains("line 1"))
        .stderr(predicate::str::contains("rm -rf").not());

    simpleenvs_cmd(&dir)
        .args(["--strict", "false", "check"])
        .assert()
        .success();
}

#[test]
fn test_check_strict_from_environment() {
    let dir = env_dir("BAD=$(whoami)\n");

    simpleenvs_cmd(&dir)
        .env("SIMPLEENVS_STRICT", "false")
        .arg("check")
        .assert()
        .success();
}

#[test]
fn test_check_parse_error_does_not_leak_secrets() {
    let dir = env_dir("API_TOKEN=supersecret_token_12345\nINVALID_LINE\n");

    simpleenvs_cmd(&dir)
        .arg("check")
        .assert()
        .code(5)
        .stderr(predicate::str::contains("line 2"))
        .stderr(predicate::str::contains("supersecret_token_12345").not());
}

#[test]
fn test_check_traversal_is_security_violation() {
    let dir = env_dir("A=1\n");

    simpleenvs_cmd(&dir)
        .args(["--path", "../outside.env", "check"])
        .assert()
        .code(6)
        .stderr(predicate::str::contains("Path traversal"));
}

#[test]
fn test_check_production_hides_details() {
    let dir = env_dir("A=1\n");

    simpleenvs_cmd(&dir)
        .env("ENVIRONMENT", "production")
        .args(["--path", "../outside.env", "check"])
        .assert()
        .code(6)
        .stderr(predicate::str::contains("Error code: SE101"))
        .stderr(predicate::str::contains("outside.env").not());
}

#[test]
fn test_check_without_file_is_not_found() {
    let dir = tempfile::TempDir::new().unwrap();

    simpleenvs_cmd(&dir).arg("check").assert().code(4);
}

#[test]
fn test_check_discovers_nested_file() {
    let dir = tempfile::TempDir::new().unwrap();
    fs::create_dir_all(dir.path().join("config")).unwrap();
    fs::write(dir.path().join("config/.env"), "NESTED=yes\n").unwrap();

    simpleenvs_cmd(&dir)
        .arg("check")
        .assert()
        .success()
        .stdout(predicate::str::contains("config"));

    simpleenvs_cmd(&dir)
        .args(["--max-depth", "0", "check"])
        .assert()
        .code(4);
}

#[test]
fn test_check_with_missing_root_is_configuration_error() {
    let dir = env_dir("A=1\n");

    simpleenvs_cmd(&dir)
        .args(["--root", "no-such-root", "check"])
        .assert()
        .code(5)
        .stderr(predicate::str::contains("not a directory"));
}
