//! Observer interfaces and the registry that holds them.

use super::types::{Extras, Location, ProviderError};
use std::sync::Arc;

/// Receives fixes and provider errors.
pub trait LocationListener: Send + Sync {
    /// Called when the tracker has found a location.
    fn on_location_found(&self, location: &Location);

    /// Called when a requested provider cannot be used.
    fn on_provider_error(&self, error: &ProviderError);
}

/// Receives provider status changes, forwarded verbatim from the platform.
pub trait BehaviorListener: Send + Sync {
    fn on_provider_disabled(&self, _provider: &str) {}

    fn on_provider_enabled(&self, _provider: &str) {}

    fn on_status_changed(&self, _provider: &str, _status: i32, _extras: &Extras) {}
}

/// A set of listeners keyed by object identity.
///
/// The same `Arc` (or a clone of it) can only be held once. Iteration order is
/// not part of the contract.
pub struct ListenerSet<T: ?Sized> {
    items: Vec<Arc<T>>,
}

impl<T: ?Sized> Default for ListenerSet<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T: ?Sized> ListenerSet<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if the listener was not already present.
    pub fn insert(&mut self, listener: Arc<T>) -> bool {
        if self.contains(&listener) {
            return false;
        }
        self.items.push(listener);
        true
    }

    /// Returns `true` if the listener was present.
    pub fn remove(&mut self, listener: &Arc<T>) -> bool {
        let before = self.items.len();
        self.items.retain(|l| !same(l, listener));
        self.items.len() != before
    }

    pub fn contains(&self, listener: &Arc<T>) -> bool {
        self.items.iter().any(|l| same(l, listener))
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<T>> {
        self.items.iter()
    }
}

// Compare data pointers only; vtable pointers of the same object may differ
// across codegen units.
fn same<T: ?Sized>(a: &Arc<T>, b: &Arc<T>) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}
