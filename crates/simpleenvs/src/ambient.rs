//! Access to the process-wide ambient environment table.
//!
//! Responsibilities:
//! - Define the `AmbientEnv` collaborator the simple store reads and writes.
//! - Provide the real process-backed table and an in-memory test double.
//! - Provide `env_var_or_none` for reading optional settings.
//!
//! Does NOT handle:
//! - Parsing or type coercion (see `parser` and `value`).
//!
//! Invariants:
//! - Callers only hand keys that are non-empty and free of `=` and NUL, and
//!   values free of NUL; the parser and validator guarantee this for loaded data.

use std::collections::HashMap;
use std::sync::Mutex;

/// Process-wide string key/value table (get/set/delete by key).
pub trait AmbientEnv: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    fn remove(&self, key: &str);
}

/// The real process environment.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessEnv;

impl AmbientEnv for ProcessEnv {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }

    fn set(&self, key: &str, value: &str) {
        // SAFETY: mutating the environment is unsound only when other threads read
        // it concurrently through libc; loads are expected to run during startup
        // and tests serialize access.
        unsafe {
            std::env::set_var(key, value);
        }
    }

    fn remove(&self, key: &str) {
        // SAFETY: see `set`.
        unsafe {
            std::env::remove_var(key);
        }
    }
}

/// In-memory table for tests and sandboxed callers.
#[derive(Debug, Default)]
pub struct MemoryEnv {
    vars: Mutex<HashMap<String, String>>,
}

impl MemoryEnv {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a table pre-populated with `vars`.
    pub fn with_vars<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let vars = vars
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self {
            vars: Mutex::new(vars),
        }
    }

    /// Number of entries currently present.
    pub fn len(&self) -> usize {
        self.vars.lock().map(|vars| vars.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl AmbientEnv for MemoryEnv {
    fn get(&self, key: &str) -> Option<String> {
        self.vars.lock().ok()?.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        if let Ok(mut vars) = self.vars.lock() {
            vars.insert(key.to_string(), value.to_string());
        }
    }

    fn remove(&self, key: &str) {
        if let Ok(mut vars) = self.vars.lock() {
            vars.remove(key);
        }
    }
}

/// Read an environment variable, returning None if unset, empty, or whitespace-only.
/// Returns the trimmed value if present.
pub fn env_var_or_none(key: &str) -> Option<String> {
    std::env::var(key).ok().and_then(|s| {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            None
        } else if trimmed.len() == s.len() {
            Some(s)
        } else {
            Some(trimmed.to_string())
        }
    })
}
