//! Process-wide table of live secure stores.
//!
//! Invariants:
//! - Holds only `Weak` references; the registry never keeps a store alive.
//! - Locks are released before any upgraded `Arc` can be dropped, so a store's
//!   `Drop` (which unregisters) never runs while a registry lock is held.
//! - Poisoned locks are recovered; discovery is best-effort.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock, PoisonError, RwLock, Weak};

use crate::secure::SecureStore;

#[derive(Default)]
struct Registry {
    stores: RwLock<Vec<(u64, Weak<SecureStore>)>>,
    active: RwLock<Option<Weak<SecureStore>>>,
}

static REGISTRY: OnceLock<Registry> = OnceLock::new();
static NEXT_ID: AtomicU64 = AtomicU64::new(1);

fn registry() -> &'static Registry {
    REGISTRY.get_or_init(Registry::default)
}

pub(crate) fn next_id() -> u64 {
    NEXT_ID.fetch_add(1, Ordering::Relaxed)
}

pub(crate) fn register(store: &Arc<SecureStore>) {
    let mut stores = registry()
        .stores
        .write()
        .unwrap_or_else(PoisonError::into_inner);
    stores.retain(|(_, weak)| weak.strong_count() > 0);
    stores.push((store.registry_id(), Arc::downgrade(store)));
}

pub(crate) fn unregister(id: u64) {
    let mut stores = registry()
        .stores
        .write()
        .unwrap_or_else(PoisonError::into_inner);
    stores.retain(|(entry, weak)| *entry != id && weak.strong_count() > 0);
}

/// Every live store, in creation order.
pub(crate) fn live_stores() -> Vec<Arc<SecureStore>> {
    let stores = registry()
        .stores
        .read()
        .unwrap_or_else(PoisonError::into_inner);
    stores.iter().filter_map(|(_, weak)| weak.upgrade()).collect()
}

pub(crate) fn set_active(store: &Arc<SecureStore>) {
    let mut active = registry()
        .active
        .write()
        .unwrap_or_else(PoisonError::into_inner);
    *active = Some(Arc::downgrade(store));
}

/// Clear the active pointer, returning the store it pointed at if still alive.
pub(crate) fn take_active() -> Option<Arc<SecureStore>> {
    let previous = registry()
        .active
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .take();
    previous.and_then(|weak| weak.upgrade())
}

pub(crate) fn active() -> Option<Arc<SecureStore>> {
    let active = registry()
        .active
        .read()
        .unwrap_or_else(PoisonError::into_inner);
    active.as_ref().and_then(Weak::upgrade)
}
