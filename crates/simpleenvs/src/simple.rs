//! The simple store: `.env` values synced into the ambient environment table.
//!
//! Responsibilities:
//! - Load a file and write every pair into the ambient table as text.
//! - Read values back from the ambient table with typed, defaulting accessors.
//! - Undo exactly what this instance wrote on `clear`.
//!
//! Does NOT handle:
//! - Isolation or auditing (see `secure`).
//!
//! Invariants:
//! - Getters read the ambient table, not the parsed map, so values set by any means
//!   remain visible.
//! - A failed load writes nothing.
//! - `clear` only touches keys this instance introduced, and restores any value it
//!   overwrote when the ambient value is still the one it wrote.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::ambient::{AmbientEnv, ProcessEnv};
use crate::constants::MAX_SCAN_DEPTH;
use crate::error::EnvError;
use crate::loader::{LoadRequest, LoadedFile};
use crate::resolver::{DirectoryScanner, PathResolver};
use crate::validator::PathPolicy;
use crate::value::{EnvironmentMap, TypedValue};

/// A value this instance wrote, and what the ambient table held before.
#[derive(Debug, Clone)]
struct Written {
    value: String,
    previous: Option<String>,
}

#[derive(Debug, Default)]
struct SimpleState {
    written: BTreeMap<String, Written>,
    loaded: bool,
    source: Option<PathBuf>,
}

/// Loads `.env` files into the ambient environment table.
pub struct SimpleStore {
    ambient: Arc<dyn AmbientEnv>,
    policy: PathPolicy,
    resolver: Arc<dyn PathResolver>,
    strict: bool,
    state: Mutex<SimpleState>,
}

impl Default for SimpleStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SimpleStore {
    /// Store backed by the process environment, relaxed validation, cwd-relative paths.
    pub fn new() -> Self {
        Self::with_ambient(Arc::new(ProcessEnv))
    }

    /// Store backed by the given ambient table.
    pub fn with_ambient(ambient: Arc<dyn AmbientEnv>) -> Self {
        Self {
            ambient,
            policy: PathPolicy::default(),
            resolver: Arc::new(DirectoryScanner::new()),
            strict: false,
            state: Mutex::new(SimpleState::default()),
        }
    }

    pub fn with_path_policy(mut self, policy: PathPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_resolver(mut self, resolver: Arc<dyn PathResolver>) -> Self {
        self.resolver = resolver;
        self
    }

    /// Apply strict key grammar and dangerous-pattern screening on load.
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    fn state(&self) -> MutexGuard<'_, SimpleState> {
        // State is plain data; a panic while holding the lock cannot leave it torn.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn request<'a>(&'a self, path: Option<&'a Path>, max_depth: usize) -> LoadRequest<'a> {
        LoadRequest {
            path,
            max_depth,
            strict: self.strict,
            policy: &self.policy,
            resolver: self.resolver.as_ref(),
        }
    }

    fn check_depth(max_depth: usize) -> Result<(), EnvError> {
        if max_depth > MAX_SCAN_DEPTH {
            return Err(EnvError::invalid_input(format!(
                "max_depth must be between 0 and {} (got {})",
                MAX_SCAN_DEPTH, max_depth
            )));
        }
        Ok(())
    }

    /// Load a file (or discover one when `path` is `None`) and sync it into the
    /// ambient table.
    ///
    /// # Errors
    ///
    /// Any validation, read or parse failure; the ambient table is untouched then.
    pub fn load(&self, path: Option<&Path>, max_depth: usize) -> Result<(), EnvError> {
        Self::check_depth(max_depth)?;
        let loaded = self.request(path, max_depth).run()?;
        self.commit(loaded);
        Ok(())
    }

    /// Async counterpart of [`SimpleStore::load`].
    pub async fn load_async(&self, path: Option<&Path>, max_depth: usize) -> Result<(), EnvError> {
        Self::check_depth(max_depth)?;
        let loaded = self.request(path, max_depth).run_async().await?;
        self.commit(loaded);
        Ok(())
    }

    fn commit(&self, loaded: LoadedFile) {
        let mut state = self.state();
        self.revert(&mut state);

        for (key, value) in &loaded.map {
            let rendered = value.to_ambient();
            let previous = self.ambient.get(key);
            self.ambient.set(key, &rendered);
            state.written.insert(
                key.clone(),
                Written {
                    value: rendered,
                    previous,
                },
            );
        }
        state.loaded = true;
        tracing::info!(
            path = %loaded.path.display(),
            keys = loaded.map.len(),
            "Loaded .env file into process environment"
        );
        state.source = Some(loaded.path);
    }

    fn revert(&self, state: &mut SimpleState) {
        for (key, written) in std::mem::take(&mut state.written) {
            if self.ambient.get(&key).as_deref() != Some(written.value.as_str()) {
                continue;
            }
            match written.previous {
                Some(previous) => self.ambient.set(&key, &previous),
                None => self.ambient.remove(&key),
            }
        }
    }

    /// Read a key from the ambient table and coerce it.
    pub fn get(&self, key: &str) -> Option<TypedValue> {
        self.ambient.get(key).map(|raw| TypedValue::coerce(&raw))
    }

    pub fn get_str(&self, key: &str, default: &str) -> String {
        self.ambient.get(key).unwrap_or_else(|| default.to_string())
    }

    pub fn get_int(&self, key: &str, default: i64) -> i64 {
        self.get(key).and_then(|v| v.as_int()).unwrap_or(default)
    }

    pub fn get_bool(&self, key: &str, default: bool) -> bool {
        self.get(key).and_then(|v| v.as_bool()).unwrap_or(default)
    }

    /// Like [`SimpleStore::get`], but refuses to default.
    ///
    /// # Errors
    ///
    /// `EnvNotLoaded` before a successful load, `KeyNotFound` when the key is absent.
    pub fn require(&self, key: &str) -> Result<TypedValue, EnvError> {
        if !self.is_loaded() {
            return Err(EnvError::EnvNotLoaded {
                operation: format!("require({})", key),
            });
        }
        self.get(key).ok_or_else(|| EnvError::KeyNotFound {
            key: key.to_string(),
            available_keys: self.keys(),
        })
    }

    /// Like [`SimpleStore::get_int`], but refuses to default.
    pub fn require_int(&self, key: &str) -> Result<i64, EnvError> {
        self.require(key)?
            .as_int()
            .ok_or_else(|| EnvError::TypeConversion {
                key: key.to_string(),
                target_type: "integer",
            })
    }

    /// Like [`SimpleStore::get_bool`], but refuses to default.
    pub fn require_bool(&self, key: &str) -> Result<bool, EnvError> {
        self.require(key)?
            .as_bool()
            .ok_or_else(|| EnvError::TypeConversion {
                key: key.to_string(),
                target_type: "boolean",
            })
    }

    /// True once a load has succeeded and until `clear`.
    pub fn is_loaded(&self) -> bool {
        self.state().loaded
    }

    /// Keys this instance wrote, sorted.
    pub fn keys(&self) -> Vec<String> {
        self.state().written.keys().cloned().collect()
    }

    /// Current ambient values of the keys this instance wrote.
    pub fn get_all(&self) -> EnvironmentMap {
        self.keys()
            .into_iter()
            .filter_map(|key| self.get(&key).map(|value| (key, value)))
            .collect()
    }

    /// File the current data came from.
    pub fn source(&self) -> Option<PathBuf> {
        self.state().source.clone()
    }

    /// Remove what this instance wrote and reset to the unloaded state.
    pub fn clear(&self) {
        let mut state = self.state();
        let count = state.written.len();
        self.revert(&mut state);
        state.loaded = false;
        state.source = None;
        tracing::debug!(keys = count, "Cleared simple store");
    }
}
