//! The secure store: an isolated, audited key/value table.
//!
//! Responsibilities:
//! - Load a file through the shared pipeline into a private map.
//! - Record every operation in a bounded access log tied to a session.
//! - Verify the loaded file's integrity and wipe all secret material on demand.
//!
//! Does NOT handle:
//! - The ambient environment table; nothing here reads or writes it.
//! - Finding stores without a reference (see `discovery`).
//!
//! Invariants:
//! - A load either replaces the whole map or leaves the previous one untouched.
//! - Every getter appends exactly one access-log entry and bumps the access count.
//! - Replaced and dropped maps are wiped before their memory is released.

mod session;
mod wipe;

pub use session::{AccessLog, AccessLogEntry, Operation, SecureSession, generate_session_id};

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use secrecy::SecretString;
use serde::Serialize;

use crate::constants::{DEFAULT_MAX_DEPTH, MAX_SCAN_DEPTH, MAX_SESSION_ID_LENGTH};
use crate::discovery::registry;
use crate::error::EnvError;
use crate::loader::{LoadRequest, LoadedFile};
use crate::reader::hash_file;
use crate::resolver::{DirectoryScanner, PathResolver};
use crate::validator::PathPolicy;
use crate::value::{EnvironmentMap, TypedValue};

use wipe::wipe_map;

/// Options for [`SecureStore::load_secure`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadOptions {
    /// File to load; `None` discovers one under the policy root.
    pub path: Option<PathBuf>,
    /// Discovery depth, clamped to the scan limit.
    pub max_depth: usize,
    pub strict_validation: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            path: None,
            max_depth: DEFAULT_MAX_DEPTH,
            strict_validation: true,
        }
    }
}

impl LoadOptions {
    pub fn for_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            ..Self::default()
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_strict_validation(mut self, strict: bool) -> Self {
        self.strict_validation = strict;
        self
    }
}

/// Lifecycle of a secure store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreState {
    Unloaded,
    Loaded,
    Wiped,
}

impl fmt::Display for StoreState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Unloaded => "unloaded",
            Self::Loaded => "loaded",
            Self::Wiped => "wiped",
        };
        f.write_str(name)
    }
}

/// Point-in-time snapshot of a store's session. Contains no values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SecurityInfo {
    pub session_id: String,
    pub creation_time: DateTime<Utc>,
    pub access_count: u64,
    pub env_count: usize,
    pub file_hash: Option<String>,
    pub log_entries: usize,
    pub state: StoreState,
    pub source: Option<PathBuf>,
}

#[derive(Debug)]
struct Inner {
    env: EnvironmentMap,
    session: SecureSession,
    log: AccessLog,
    state: StoreState,
    source: Option<PathBuf>,
}

impl Inner {
    fn new(session: SecureSession) -> Self {
        Self {
            env: EnvironmentMap::new(),
            session,
            log: AccessLog::default(),
            state: StoreState::Unloaded,
            source: None,
        }
    }

    fn record(
        &mut self,
        operation: Operation,
        key: Option<&str>,
        success: bool,
        error_code: Option<&'static str>,
    ) {
        self.session.access_count += 1;
        let entry = AccessLogEntry {
            timestamp: Utc::now(),
            session_id: self.session.session_id.clone(),
            operation,
            key: key.map(str::to_string),
            success,
            access_count: self.session.access_count,
            error_code,
        };
        self.log.push(entry);
    }
}

/// Builder for [`SecureStore`]; `build` registers the store for discovery.
pub struct SecureStoreBuilder {
    policy: PathPolicy,
    resolver: Arc<dyn PathResolver>,
    session_id: Option<String>,
}

impl Default for SecureStoreBuilder {
    fn default() -> Self {
        Self {
            policy: PathPolicy::default(),
            resolver: Arc::new(DirectoryScanner::new()),
            session_id: None,
        }
    }
}

impl SecureStoreBuilder {
    pub fn path_policy(mut self, policy: PathPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn resolver(mut self, resolver: Arc<dyn PathResolver>) -> Self {
        self.resolver = resolver;
        self
    }

    /// Use a caller-chosen session id instead of a generated one.
    pub fn session_id(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    /// Create and register the store.
    ///
    /// # Errors
    ///
    /// `Session` when a caller-chosen session id is empty, longer than 64
    /// characters, or contains characters other than ASCII alphanumerics, `-` and `_`.
    pub fn build(self) -> Result<Arc<SecureStore>, EnvError> {
        let session = match self.session_id {
            Some(id) => {
                validate_session_id(&id)?;
                SecureSession::with_id(id)
            }
            None => SecureSession::new(),
        };
        Ok(SecureStore::register(self.policy, self.resolver, session))
    }
}

fn validate_session_id(id: &str) -> Result<(), EnvError> {
    let issue = if id.is_empty() {
        "session id is empty"
    } else if id.len() > MAX_SESSION_ID_LENGTH {
        "session id is too long"
    } else if !id
        .bytes()
        .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
    {
        "session id contains invalid characters"
    } else {
        return Ok(());
    };
    Err(EnvError::Session {
        session_id: id.chars().take(MAX_SESSION_ID_LENGTH).collect(),
        issue: issue.to_string(),
    })
}

/// Isolated `.env` store with access auditing.
///
/// Instances are always handed out as `Arc` so the discovery registry can track
/// them weakly; dropping the last `Arc` wipes the map and unregisters the store.
pub struct SecureStore {
    id: u64,
    policy: PathPolicy,
    resolver: Arc<dyn PathResolver>,
    inner: Mutex<Inner>,
}

impl fmt::Debug for SecureStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.lock();
        f.debug_struct("SecureStore")
            .field("session_id", &inner.session.session_id)
            .field("state", &inner.state)
            .field("keys", &inner.env.len())
            .finish_non_exhaustive()
    }
}

impl SecureStore {
    /// Store with the default cwd-rooted policy.
    pub fn new() -> Arc<Self> {
        Self::with_policy(PathPolicy::default())
    }

    pub fn with_policy(policy: PathPolicy) -> Arc<Self> {
        Self::register(policy, Arc::new(DirectoryScanner::new()), SecureSession::new())
    }

    fn register(
        policy: PathPolicy,
        resolver: Arc<dyn PathResolver>,
        session: SecureSession,
    ) -> Arc<Self> {
        let store = Arc::new(Self {
            id: registry::next_id(),
            policy,
            resolver,
            inner: Mutex::new(Inner::new(session)),
        });
        registry::register(&store);
        tracing::debug!(session_id = %store.session_id(), "Created secure store");
        store
    }

    pub fn builder() -> SecureStoreBuilder {
        SecureStoreBuilder::default()
    }

    pub(crate) fn registry_id(&self) -> u64 {
        self.id
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn request<'a>(&'a self, options: &'a LoadOptions) -> LoadRequest<'a> {
        LoadRequest {
            path: options.path.as_deref(),
            max_depth: options.max_depth.min(MAX_SCAN_DEPTH),
            strict: options.strict_validation,
            policy: &self.policy,
            resolver: self.resolver.as_ref(),
        }
    }

    /// Validate, read and parse a file into this store.
    ///
    /// # Errors
    ///
    /// The specific validation, read or parse error. The previous map is kept and
    /// the failure is recorded in the access log.
    pub fn load_secure(&self, options: &LoadOptions) -> Result<(), EnvError> {
        let result = self.request(options).run();
        self.apply(result)
    }

    /// Async counterpart of [`SecureStore::load_secure`].
    pub async fn load_secure_async(&self, options: &LoadOptions) -> Result<(), EnvError> {
        let result = self.request(options).run_async().await;
        self.apply(result)
    }

    fn apply(&self, result: Result<LoadedFile, EnvError>) -> Result<(), EnvError> {
        let mut inner = self.lock();
        match result {
            Ok(loaded) => {
                let previous = std::mem::replace(&mut inner.env, loaded.map);
                wipe_map(previous);
                inner.session.file_hash = Some(loaded.hash);
                inner.state = StoreState::Loaded;
                inner.record(Operation::Load, None, true, None);
                tracing::info!(
                    session_id = %inner.session.session_id,
                    path = %loaded.path.display(),
                    keys = inner.env.len(),
                    "Loaded .env file into secure store"
                );
                inner.source = Some(loaded.path);
                Ok(())
            }
            Err(err) => {
                inner.record(Operation::Load, None, false, Some(err.code()));
                if err.is_security() {
                    tracing::warn!(
                        session_id = %inner.session.session_id,
                        code = err.code(),
                        error = %err,
                        "Security violation during secure load"
                    );
                } else {
                    tracing::debug!(
                        session_id = %inner.session.session_id,
                        code = err.code(),
                        error = %err,
                        "Secure load failed"
                    );
                }
                Err(err)
            }
        }
    }

    /// Look a key up in the private map.
    pub fn get_secure(&self, key: &str) -> Option<TypedValue> {
        let mut inner = self.lock();
        let value = inner.env.get(key).cloned();
        inner.record(Operation::Get, Some(key), value.is_some(), None);
        value
    }

    pub fn get_str_secure(&self, key: &str, default: &str) -> String {
        self.get_secure(key)
            .map(|v| v.to_string())
            .unwrap_or_else(|| default.to_string())
    }

    pub fn get_int_secure(&self, key: &str, default: i64) -> i64 {
        self.get_secure(key)
            .and_then(|v| v.as_int())
            .unwrap_or(default)
    }

    pub fn get_bool_secure(&self, key: &str, default: bool) -> bool {
        self.get_secure(key)
            .and_then(|v| v.as_bool())
            .unwrap_or(default)
    }

    /// The value as a [`SecretString`], for callers that must not log it.
    pub fn get_secret(&self, key: &str) -> Option<SecretString> {
        self.get_secure(key)
            .map(|v| SecretString::new(v.to_string().into()))
    }

    /// Like [`SecureStore::get_secure`], but refuses to default.
    ///
    /// # Errors
    ///
    /// `EnvNotLoaded` before a successful load, `KeyNotFound` when the key is absent.
    pub fn require_secure(&self, key: &str) -> Result<TypedValue, EnvError> {
        let mut inner = self.lock();
        if inner.state != StoreState::Loaded {
            let err = EnvError::EnvNotLoaded {
                operation: format!("require_secure({})", key),
            };
            inner.record(Operation::Get, Some(key), false, Some(err.code()));
            return Err(err);
        }
        match inner.env.get(key).cloned() {
            Some(value) => {
                inner.record(Operation::Get, Some(key), true, None);
                Ok(value)
            }
            None => {
                let err = EnvError::KeyNotFound {
                    key: key.to_string(),
                    available_keys: inner.env.keys().cloned().collect(),
                };
                inner.record(Operation::Get, Some(key), false, Some(err.code()));
                Err(err)
            }
        }
    }

    /// Keys in the private map, sorted.
    pub fn get_all_keys(&self) -> Vec<String> {
        let mut inner = self.lock();
        let keys: Vec<String> = inner.env.keys().cloned().collect();
        inner.record(Operation::GetKeys, None, true, None);
        keys
    }

    /// Copy of the private map.
    pub fn get_all(&self) -> EnvironmentMap {
        let mut inner = self.lock();
        let map = inner.env.clone();
        inner.record(Operation::GetAll, None, true, None);
        map
    }

    pub fn len(&self) -> usize {
        self.lock().env.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().env.is_empty()
    }

    /// Whether the last successful load is still in effect.
    pub fn is_loaded(&self) -> bool {
        self.lock().state == StoreState::Loaded
    }

    /// Loaded and holding at least one key; what discovery looks for.
    pub(crate) fn has_data(&self) -> bool {
        let inner = self.lock();
        inner.state == StoreState::Loaded && !inner.env.is_empty()
    }

    pub(crate) fn contains_key(&self, key: &str) -> bool {
        self.lock().env.contains_key(key)
    }

    pub fn state(&self) -> StoreState {
        self.lock().state
    }

    pub fn session_id(&self) -> String {
        self.lock().session.session_id.clone()
    }

    /// Path of the most recently loaded file.
    pub fn source(&self) -> Option<PathBuf> {
        self.lock().source.clone()
    }

    /// Rehash `path` and compare with the hash recorded by the last load.
    ///
    /// Returns `Ok(false)` on mismatch, when nothing has been loaded, or when `path`
    /// is not the file the last load read.
    ///
    /// # Errors
    ///
    /// `Integrity` when the file cannot be read.
    pub fn verify_file_integrity(&self, path: &Path) -> Result<bool, EnvError> {
        let (expected, source) = {
            let inner = self.lock();
            (inner.session.file_hash.clone(), inner.source.clone())
        };
        let (Some(expected), Some(source)) = (expected, source) else {
            self.lock()
                .record(Operation::IntegrityCheck, None, false, None);
            return Ok(false);
        };

        let integrity_error = |e: std::io::Error| EnvError::Integrity {
            path: path.to_path_buf(),
            kind: e.kind(),
        };
        let actual = match path
            .canonicalize()
            .map_err(integrity_error)
            .and_then(|canonical| {
                if canonical == source {
                    hash_file(&canonical).map(Some).map_err(integrity_error)
                } else {
                    Ok(None)
                }
            }) {
            Ok(Some(hash)) => hash,
            Ok(None) => {
                self.lock()
                    .record(Operation::IntegrityCheck, None, false, None);
                tracing::debug!(
                    path = %path.display(),
                    "Integrity check requested for a file that was not loaded"
                );
                return Ok(false);
            }
            Err(err) => {
                self.lock()
                    .record(Operation::IntegrityCheck, None, false, Some(err.code()));
                return Err(err);
            }
        };

        let matches = actual == expected;
        let mut inner = self.lock();
        inner.record(Operation::IntegrityCheck, None, matches, None);
        if !matches {
            tracing::warn!(
                session_id = %inner.session.session_id,
                path = %path.display(),
                "File changed since it was loaded"
            );
        }
        Ok(matches)
    }

    pub fn get_security_info(&self) -> SecurityInfo {
        let inner = self.lock();
        SecurityInfo {
            session_id: inner.session.session_id.clone(),
            creation_time: inner.session.creation_time,
            access_count: inner.session.access_count,
            env_count: inner.env.len(),
            file_hash: inner.session.file_hash.clone(),
            log_entries: inner.log.len(),
            state: inner.state,
            source: inner.source.clone(),
        }
    }

    /// Access log entries, oldest first.
    pub fn get_access_log(&self) -> Vec<AccessLogEntry> {
        self.lock().log.snapshot()
    }

    /// Overwrite and release every key and value, then start a fresh session.
    ///
    /// # Errors
    ///
    /// `MemorySecurity` when the store lock was poisoned. The wipe still runs in
    /// that case; the error reports that a holder panicked mid-operation.
    pub fn secure_wipe(&self) -> Result<(), EnvError> {
        let (mut inner, poisoned) = match self.inner.lock() {
            Ok(guard) => (guard, false),
            Err(poisoned) => (poisoned.into_inner(), true),
        };

        let wiped = inner.env.len();
        wipe_map(std::mem::take(&mut inner.env));
        let old_session = std::mem::replace(&mut inner.session, SecureSession::new());
        inner.log.clear();
        inner.state = StoreState::Wiped;
        inner.source = None;
        let new_session = inner.session.session_id.clone();
        drop(inner);

        if poisoned {
            self.inner.clear_poison();
            return Err(EnvError::MemorySecurity {
                operation: "secure_wipe".to_string(),
                reason: "store lock was poisoned by a panicking holder".to_string(),
            });
        }

        tracing::info!(
            old_session = %old_session.session_id,
            new_session = %new_session,
            keys = wiped,
            "Secure store wiped"
        );
        Ok(())
    }
}

impl Drop for SecureStore {
    fn drop(&mut self) {
        let inner = self.inner.get_mut().unwrap_or_else(PoisonError::into_inner);
        wipe_map(std::mem::take(&mut inner.env));
        registry::unregister(self.id);
    }
}
