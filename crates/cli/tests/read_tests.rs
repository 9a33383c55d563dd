//! Integration tests for `get`, `keys`, `info` and `export`.
//!
//! Invariants:
//! - Every command loads into an isolated store; the child's environment never
//!   gains keys from the file, so output comes only from the file.

mod common;

use common::{env_dir, simpleenvs_cmd};
use predicates::prelude::*;

#[test]
fn test_get_prints_canonical_values() {
    let dir = env_dir("DEBUG=yes\nPORT=8080\nNAME=\"My App\"\n");

    simpleenvs_cmd(&dir)
        .args(["get", "DEBUG"])
        .assert()
        .success()
        .stdout("True\n");
    simpleenvs_cmd(&dir)
        .args(["get", "NAME"])
        .assert()
        .success()
        .stdout("My App\n");
}

#[test]
fn test_get_json_includes_type() {
    let dir = env_dir("PORT=8080\n");

    let output = simpleenvs_cmd(&dir)
        .args(["-o", "json", "get", "PORT"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["type"], "integer");
    assert_eq!(json["value"], 8080);
}

#[test]
fn test_get_missing_key() {
    let dir = env_dir("PORT=8080\n");

    simpleenvs_cmd(&dir)
        .args(["get", "HOST"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("HOST"));
    simpleenvs_cmd(&dir)
        .args(["get", "HOST", "--default", "localhost"])
        .assert()
        .success()
        .stdout("localhost\n");
}

#[test]
fn test_keys_sorted() {
    let dir = env_dir("ZED=1\nALPHA=2\nMID=3\n");

    simpleenvs_cmd(&dir)
        .arg("keys")
        .assert()
        .success()
        .stdout("ALPHA\nMID\nZED\n");
}

#[test]
fn test_explicit_path_flag_and_env() {
    let dir = env_dir("FROM_DEFAULT=1\n");
    std::fs::write(dir.path().join("other.env"), "FROM_OTHER=1\n").unwrap();

    simpleenvs_cmd(&dir)
        .args(["--path", "other.env", "keys"])
        .assert()
        .success()
        .stdout("FROM_OTHER\n");
    simpleenvs_cmd(&dir)
        .env("SIMPLEENVS_PATH", "other.env")
        .arg("keys")
        .assert()
        .success()
        .stdout("FROM_OTHER\n");
}

#[test]
fn test_info_reports_session_and_integrity() {
    let dir = env_dir("A=1\nB=2\n");

    let output = simpleenvs_cmd(&dir)
        .args(["-o", "json", "info"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["integrity_verified"], true);
    assert_eq!(json["security"]["env_count"], 2);
    assert_eq!(json["security"]["state"], "loaded");
    assert_eq!(json["security"]["session_id"].as_str().unwrap().len(), 16);
    assert_eq!(json["profile"], "development");
}

#[test]
fn test_export_env_and_shell() {
    let dir = env_dir("NAME=My App\nQUOTE=it's\nPORT=80\n");

    simpleenvs_cmd(&dir)
        .arg("export")
        .assert()
        .success()
        .stdout("NAME=\"My App\"\nPORT=80\nQUOTE=\"it's\"\n");
    simpleenvs_cmd(&dir)
        .args(["--strict", "false", "export", "--format", "shell"])
        .assert()
        .success()
        .stdout(predicate::str::contains("export QUOTE='it'\\''s'"));
}

#[test]
fn test_invalid_output_format() {
    let dir = env_dir("A=1\n");

    simpleenvs_cmd(&dir)
        .args(["-o", "yaml", "keys"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid output format"));
}
