//! End-to-end load scenarios for both stores.
//!
//! Responsibilities:
//! - Prove typed reads after a simple load.
//! - Prove secure loads never reach the ambient table.
//! - Prove strict and size failures leave no partial state behind.
//!
//! Invariants:
//! - Simple-store tests run against `MemoryEnv`; secure-store tests use keys unique
//!   to this file so a parallel test cannot observe them.

use std::fs;
use std::sync::Arc;

use simpleenvs::{
    AmbientEnv, EnvError, LoadOptions, MemoryEnv, PathPolicy, SecureStore, SimpleStore,
    StoreState, TypedValue,
};
use tempfile::TempDir;

fn fixture(content: &str) -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join(".env"), content).unwrap();
    dir
}

#[test]
fn test_simple_store_typed_reads() {
    let dir = fixture("APP_NAME=MyApp\nDEBUG=true\nPORT=8080\n");
    let ambient = Arc::new(MemoryEnv::new());
    let store = SimpleStore::with_ambient(ambient.clone())
        .with_path_policy(PathPolicy::rooted(dir.path()));

    store.load(Some(&dir.path().join(".env")), 2).unwrap();

    assert_eq!(store.get_str("APP_NAME", ""), "MyApp");
    assert!(store.get_bool("DEBUG", false));
    assert_eq!(store.get_int("PORT", 0), 8080);
    assert_eq!(ambient.get("DEBUG").as_deref(), Some("True"));
}

#[test]
fn test_secure_store_is_isolated_from_ambient_table() {
    let dir = fixture("SIMPLEENVS_SCENARIO_SECRET=abc123\n");
    let store = SecureStore::with_policy(PathPolicy::rooted(dir.path()));

    store
        .load_secure(&LoadOptions::for_path(dir.path().join(".env")))
        .unwrap();

    assert_eq!(
        store.get_secure("SIMPLEENVS_SCENARIO_SECRET"),
        Some(TypedValue::String("abc123".to_string()))
    );
    assert!(std::env::var("SIMPLEENVS_SCENARIO_SECRET").is_err());
}

#[test]
fn test_strict_secure_load_rejects_command_substitution() {
    let dir = fixture("BAD=$(rm -rf /)\n");
    let store = SecureStore::with_policy(PathPolicy::rooted(dir.path()));

    let err = store
        .load_secure(&LoadOptions::for_path(dir.path().join(".env")))
        .unwrap_err();

    assert!(matches!(err, EnvError::InvalidInput { .. }), "got {err:?}");
    assert!(store.is_empty());
    let log = store.get_access_log();
    assert_eq!(log.iter().filter(|e| !e.success).count(), 1);
}

#[test]
fn test_oversized_file_rejected_by_both_stores() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(".env");
    let file = fs::File::create(&path).unwrap();
    file.set_len(15 * 1024 * 1024).unwrap();
    drop(file);

    let ambient = Arc::new(MemoryEnv::new());
    let simple = SimpleStore::with_ambient(ambient.clone())
        .with_path_policy(PathPolicy::rooted(dir.path()));
    let err = simple.load(Some(&path), 0).unwrap_err();
    assert!(matches!(err, EnvError::FileSize { .. }), "got {err:?}");
    assert!(ambient.is_empty());
    assert!(!simple.is_loaded());

    let secure = SecureStore::with_policy(PathPolicy::rooted(dir.path()));
    let err = secure
        .load_secure(&LoadOptions::for_path(&path))
        .unwrap_err();
    assert!(matches!(err, EnvError::FileSize { .. }), "got {err:?}");
    assert!(secure.is_empty());
    assert_eq!(secure.state(), StoreState::Unloaded);
}

#[tokio::test]
async fn test_oversized_file_rejected_on_async_path() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(".env");
    let file = fs::File::create(&path).unwrap();
    file.set_len(15 * 1024 * 1024).unwrap();
    drop(file);

    let secure = SecureStore::with_policy(PathPolicy::rooted(dir.path()));
    let err = secure
        .load_secure_async(&LoadOptions::for_path(&path))
        .await
        .unwrap_err();
    assert!(matches!(err, EnvError::FileSize { .. }), "got {err:?}");
}

#[test]
fn test_streaming_read_matches_small_read() {
    let dir = TempDir::new().unwrap();
    let mut content = String::new();
    for i in 0..9000 {
        content.push_str(&format!("KEY_{i}={}\n", "x".repeat(120)));
    }
    assert!(content.len() > 1024 * 1024);
    fs::write(dir.path().join(".env"), &content).unwrap();

    let store = SecureStore::with_policy(PathPolicy::rooted(dir.path()));
    store
        .load_secure(&LoadOptions::for_path(dir.path().join(".env")))
        .unwrap();

    assert_eq!(store.len(), 9000);
    assert_eq!(store.get_str_secure("KEY_8999", ""), "x".repeat(120));
}

#[test]
fn test_traversal_path_is_logged_as_security_failure() {
    let dir = fixture("A=1\n");
    let store = SecureStore::with_policy(PathPolicy::rooted(dir.path()));

    let err = store
        .load_secure(&LoadOptions::for_path("../../etc/passwd"))
        .unwrap_err();

    assert!(matches!(err, EnvError::PathTraversal { .. }));
    assert!(err.is_security());
    let log = store.get_access_log();
    assert_eq!(log.len(), 1);
    assert_eq!(log[0].error_code, Some(err.code()));
}

#[test]
fn test_absolute_path_rejected_under_default_policy() {
    let dir = fixture("A=1\n");
    let store = SimpleStore::with_ambient(Arc::new(MemoryEnv::new()));

    let err = store.load(Some(&dir.path().join(".env")), 0).unwrap_err();
    assert!(matches!(err, EnvError::PathTraversal { .. }));
}
