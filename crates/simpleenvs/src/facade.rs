//! Process-wide convenience API over one simple store and one secure store.
//!
//! Responsibilities:
//! - Lazily create the process-wide stores and route calls to them.
//! - Register the facade's secure store as the active store after a load.
//! - Resolve secure reads through discovery so code without a reference still
//!   finds loaded data.
//!
//! Invariants:
//! - Secure getters return the caller's default when no loaded store exists.
//! - No facade lock is held across an `.await`.

use std::collections::BTreeSet;
use std::path::Path;
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

use serde::Serialize;

use crate::constants::{LIBRARY_NAME, VERSION};
use crate::discovery::{self, LoaderManager};
use crate::error::EnvError;
use crate::profile::Profile;
use crate::secure::{LoadOptions, SecureStore, SecurityInfo};
use crate::simple::SimpleStore;
use crate::value::TypedValue;

fn simple() -> &'static SimpleStore {
    static SIMPLE: OnceLock<SimpleStore> = OnceLock::new();
    SIMPLE.get_or_init(SimpleStore::new)
}

fn secure_slot() -> &'static Mutex<Option<Arc<SecureStore>>> {
    static SECURE: OnceLock<Mutex<Option<Arc<SecureStore>>>> = OnceLock::new();
    SECURE.get_or_init(|| Mutex::new(None))
}

fn facade_secure_store() -> Arc<SecureStore> {
    let mut slot = secure_slot().lock().unwrap_or_else(PoisonError::into_inner);
    Arc::clone(slot.get_or_insert_with(SecureStore::new))
}

// =============================================================================
// Simple API (ambient environment table)
// =============================================================================

/// Load a `.env` file into the process environment.
pub async fn load(path: Option<&Path>, max_depth: usize) -> Result<(), EnvError> {
    simple().load_async(path, max_depth).await
}

/// Blocking counterpart of [`load`].
pub fn load_sync(path: Option<&Path>, max_depth: usize) -> Result<(), EnvError> {
    simple().load(path, max_depth)
}

pub fn get(key: &str) -> Option<TypedValue> {
    simple().get(key)
}

pub fn get_str(key: &str, default: &str) -> String {
    simple().get_str(key, default)
}

pub fn get_int(key: &str, default: i64) -> i64 {
    simple().get_int(key, default)
}

pub fn get_bool(key: &str, default: bool) -> bool {
    simple().get_bool(key, default)
}

pub fn is_loaded() -> bool {
    simple().is_loaded()
}

// =============================================================================
// Secure API (memory-isolated)
// =============================================================================

/// Load a `.env` file into the process-wide secure store and make it the
/// active store for discovery.
pub async fn load_secure(
    path: Option<&Path>,
    strict: bool,
    max_depth: usize,
) -> Result<(), EnvError> {
    let store = facade_secure_store();
    let options = secure_options(path, strict, max_depth);
    store.load_secure_async(&options).await?;
    discovery::register_active(&store);
    Ok(())
}

/// Blocking counterpart of [`load_secure`].
pub fn load_secure_sync(path: Option<&Path>, strict: bool, max_depth: usize) -> Result<(), EnvError> {
    let store = facade_secure_store();
    store.load_secure(&secure_options(path, strict, max_depth))?;
    discovery::register_active(&store);
    Ok(())
}

fn secure_options(path: Option<&Path>, strict: bool, max_depth: usize) -> LoadOptions {
    LoadOptions {
        path: path.map(Path::to_path_buf),
        max_depth,
        strict_validation: strict,
    }
}

pub fn get_secure(key: &str) -> Option<TypedValue> {
    discovery::get_active_loader().and_then(|store| store.get_secure(key))
}

pub fn get_str_secure(key: &str, default: &str) -> String {
    match discovery::get_active_loader() {
        Some(store) => store.get_str_secure(key, default),
        None => default.to_string(),
    }
}

pub fn get_int_secure(key: &str, default: i64) -> i64 {
    discovery::get_active_loader().map_or(default, |store| store.get_int_secure(key, default))
}

pub fn get_bool_secure(key: &str, default: bool) -> bool {
    discovery::get_active_loader().map_or(default, |store| store.get_bool_secure(key, default))
}

/// Whether any loaded secure store can be found.
pub fn is_loaded_secure() -> bool {
    discovery::get_active_loader().is_some()
}

pub fn security_info() -> Option<SecurityInfo> {
    discovery::get_active_loader().map(|store| store.get_security_info())
}

// =============================================================================
// Utilities
// =============================================================================

/// Sorted union of the simple store's keys and the resolved secure store's keys.
pub fn get_all_keys() -> Vec<String> {
    let mut keys: BTreeSet<String> = BTreeSet::new();
    if simple().is_loaded() {
        keys.extend(simple().keys());
    }
    if let Some(store) = discovery::get_active_loader() {
        keys.extend(store.get_all_keys());
    }
    keys.into_iter().collect()
}

/// Undo the simple load and wipe the process-wide secure store.
///
/// # Errors
///
/// `MemorySecurity` if the secure store's lock was poisoned; the wipe still ran.
pub fn clear() -> Result<(), EnvError> {
    simple().clear();

    let store = secure_slot()
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .take();
    discovery::clear_active();
    match store {
        Some(store) => store.secure_wipe(),
        None => Ok(()),
    }
}

/// Read-only view over discovery.
pub fn manager() -> LoaderManager {
    LoaderManager::new()
}

/// Status snapshot of the facade.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LibraryInfo {
    pub name: &'static str,
    pub version: &'static str,
    pub profile: Profile,
    pub simple_loaded: bool,
    pub secure_loaded: bool,
    pub total_keys: usize,
    pub secure_loaders_in_memory: usize,
}

pub fn info() -> LibraryInfo {
    LibraryInfo {
        name: LIBRARY_NAME,
        version: VERSION,
        profile: Profile::detect(),
        simple_loaded: is_loaded(),
        secure_loaded: is_loaded_secure(),
        total_keys: get_all_keys().len(),
        secure_loaders_in_memory: discovery::get_all_loaders().len(),
    }
}
