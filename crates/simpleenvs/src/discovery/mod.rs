//! Locating a loaded secure store without an explicit reference.
//!
//! Responsibilities:
//! - Track an optional "active" store that facade-level loads register.
//! - Scan the registry of live stores for one that holds data.
//! - Offer `LoaderManager`, a read-only view over both.
//!
//! `get_all_loaders`, `len` and `contains` cover every live store, loaded or not;
//! resolution and key reads only consider stores holding data.
//!
//! Does NOT handle:
//! - Creating, loading or merging stores.
//!
//! Invariants:
//! - Resolution order: the active store if alive and loaded, then the first loaded
//!   store in creation order, then nothing.
//! - Absence is never an error; callers fall back to their defaults.

pub(crate) mod registry;

use std::fmt;
use std::sync::Arc;

use crate::secure::SecureStore;
use crate::value::TypedValue;

/// Make `store` the first candidate for discovery.
pub fn register_active(store: &Arc<SecureStore>) {
    registry::set_active(store);
    tracing::debug!(session_id = %store.session_id(), "Registered active secure store");
}

/// Forget the active store. The store itself is left untouched.
pub fn clear_active() {
    // Bound so a last reference drops here, outside the registry lock.
    let _previous = registry::take_active();
}

/// The explicitly registered store, if it is still alive.
pub fn registered_active() -> Option<Arc<SecureStore>> {
    registry::active()
}

/// First live store, in creation order, that holds loaded data.
pub fn find_in_memory() -> Option<Arc<SecureStore>> {
    registry::live_stores().into_iter().find(|store| store.has_data())
}

/// Resolve the store getters should consult.
pub fn get_active_loader() -> Option<Arc<SecureStore>> {
    if let Some(active) = registry::active().filter(|store| store.has_data()) {
        return Some(active);
    }
    let found = find_in_memory();
    if let Some(store) = &found {
        tracing::debug!(session_id = %store.session_id(), "Discovered secure store in registry");
    }
    found
}

/// Every live store, in creation order.
pub fn get_all_loaders() -> Vec<Arc<SecureStore>> {
    registry::live_stores()
}

/// Read-only view over the discovery registry.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoaderManager;

impl LoaderManager {
    pub fn new() -> Self {
        Self
    }

    pub fn get_active_loader(&self) -> Option<Arc<SecureStore>> {
        get_active_loader()
    }

    pub fn registered_active(&self) -> Option<Arc<SecureStore>> {
        registered_active()
    }

    pub fn find_in_memory(&self) -> Option<Arc<SecureStore>> {
        find_in_memory()
    }

    pub fn get_all_loaders(&self) -> Vec<Arc<SecureStore>> {
        get_all_loaders()
    }

    pub fn has_active(&self) -> bool {
        get_active_loader().is_some()
    }

    /// Number of live stores.
    pub fn len(&self) -> usize {
        get_all_loaders().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> std::vec::IntoIter<Arc<SecureStore>> {
        get_all_loaders().into_iter()
    }

    /// Whether `store` is one of the live stores.
    pub fn contains(&self, store: &Arc<SecureStore>) -> bool {
        get_all_loaders().iter().any(|s| Arc::ptr_eq(s, store))
    }

    /// Whether the resolved store holds `key`. Not recorded in its access log.
    pub fn contains_key(&self, key: &str) -> bool {
        get_active_loader().is_some_and(|store| store.contains_key(key))
    }

    /// Read `key` through the resolved store.
    pub fn get(&self, key: &str) -> Option<TypedValue> {
        get_active_loader().and_then(|store| store.get_secure(key))
    }
}

impl IntoIterator for &LoaderManager {
    type Item = Arc<SecureStore>;
    type IntoIter = std::vec::IntoIter<Arc<SecureStore>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl fmt::Display for LoaderManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let loaders = get_all_loaders();
        match get_active_loader() {
            Some(active) => write!(
                f,
                "LoaderManager(active: {}, loaders: {})",
                active.session_id(),
                loaders.len()
            ),
            None => write!(f, "LoaderManager(active: none, loaders: {})", loaders.len()),
        }
    }
}
