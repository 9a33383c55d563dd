//! Static checks over workspace sources.
//!
//! Responsibilities:
//! - Keep process environment mutation confined to the ambient module.
//! - Keep the secure store independent of the ambient table.
//! - Keep temp files in tests on the tempfile crate's RAII types.
//!
//! Does NOT handle:
//! - Runtime behavior; sources are read as text.
//!
//! Invariants:
//! - Only non-test code (before the first `#[cfg(test)]`) is checked for the
//!   environment rules; test modules may set variables through `temp-env`.

use std::fs;
use std::path::{Path, PathBuf};

const AMBIENT_MODULE: &str = "simpleenvs/src/ambient.rs";

fn crates_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("crates"))
}

fn rust_files(under: &Path) -> Vec<PathBuf> {
    walkdir::WalkDir::new(under)
        .into_iter()
        .filter_entry(|e| e.file_name() != "target")
        .filter_map(|e| e.ok())
        .filter(|e| e.path().extension().is_some_and(|ext| ext == "rs"))
        .map(|e| e.into_path())
        .collect()
}

fn non_test_source(content: &str) -> &str {
    match content.find("#[cfg(test)]") {
        Some(idx) => &content[..idx],
        None => content,
    }
}

fn is_test_file(path: &Path) -> bool {
    let path = path.to_string_lossy();
    path.contains("/tests/") || path.contains("/benches/") || path.ends_with("_tests.rs")
}

#[test]
fn test_process_env_mutation_only_in_ambient_module() {
    let mut violations = Vec::new();

    for path in rust_files(&crates_dir()) {
        if is_test_file(&path) || path.ends_with(AMBIENT_MODULE) {
            continue;
        }
        let content = fs::read_to_string(&path).unwrap_or_default();
        let source = non_test_source(&content);
        for (i, line) in source.lines().enumerate() {
            if line.contains("env::set_var") || line.contains("env::remove_var") {
                violations.push(format!("{}:{}: {}", path.display(), i + 1, line.trim()));
            }
        }
    }

    assert!(
        violations.is_empty(),
        "Process environment mutated outside {}:\n{}",
        AMBIENT_MODULE,
        violations.join("\n")
    );
}

#[test]
fn test_secure_store_never_touches_ambient_table() {
    let secure = crates_dir().join("simpleenvs/src/secure");
    let mut violations = Vec::new();

    for path in rust_files(&secure) {
        let content = fs::read_to_string(&path).unwrap_or_default();
        for needle in ["AmbientEnv", "ProcessEnv", "std::env::var", "set_var"] {
            if non_test_source(&content).contains(needle) {
                violations.push(format!("{}: references {}", path.display(), needle));
            }
        }
    }

    assert!(
        rust_files(&secure).iter().any(|p| p.ends_with("mod.rs")),
        "secure module not found under {}",
        secure.display()
    );
    assert!(
        violations.is_empty(),
        "Secure store reaches the ambient table:\n{}",
        violations.join("\n")
    );
}

#[test]
fn test_tests_use_tempfile_for_scratch_files() {
    let mut violations = Vec::new();

    for path in rust_files(&crates_dir()) {
        if path.ends_with("source_hygiene_tests.rs") {
            continue;
        }
        let content = fs::read_to_string(&path).unwrap_or_default();
        if !content.contains("#[test]") && !content.contains("#[tokio::test]") {
            continue;
        }
        if content.contains("std::env::temp_dir()") {
            violations.push(format!(
                "{}: uses std::env::temp_dir(), use tempfile::tempdir()",
                path.display()
            ));
        }
        if content.contains("\"/tmp/") {
            violations.push(format!("{}: hardcoded /tmp path", path.display()));
        }
        for (i, line) in content.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.starts_with("let _ = tempfile::") || trimmed.starts_with("let _ = TempDir") {
                violations.push(format!(
                    "{}:{}: temp dir bound to `_` is dropped immediately",
                    path.display(),
                    i + 1
                ));
            }
        }
    }

    assert!(
        violations.is_empty(),
        "Temp file hygiene violations:\n{}",
        violations.join("\n")
    );
}

#[test]
fn test_non_test_source_stops_at_test_module() {
    let content = "fn a() {}\n#[cfg(test)]\nmod tests { fn b() { std::env::set_var(\"X\", \"1\"); } }\n";
    assert_eq!(non_test_source(content), "fn a() {}\n");
    assert_eq!(non_test_source("fn a() {}\n"), "fn a() {}\n");
}
