//! The process-wide (global) hook registry.

use std::sync::Arc;

use parking_lot::RwLock;

use crate::hooks::{HookBundle, HookSet};

/// Global hook bundles, applied to every instance of a
/// [`Conductor`](crate::Conductor) until removed.
///
/// Bundles are only ever added by [`add`](Self::add) and dropped by
/// [`remove`](Self::remove) or [`clear`](Self::clear). There is no expiry and
/// no scoping to particular instances.
///
/// # Thread Safety
///
/// Interior mutability via [`RwLock`]. Lifecycle operations take a
/// [`snapshot`](Self::snapshot) when they start, so registry changes made
/// while an operation runs apply from the next operation on.
#[derive(Debug, Default)]
pub struct HookRegistry {
    bundles: RwLock<HookSet>,
}

impl HookRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `bundle` under `key`, replacing any bundle already there.
    ///
    /// Returns the replaced bundle.
    pub fn add(&self, key: impl Into<String>, bundle: HookBundle) -> Option<Arc<HookBundle>> {
        let key = key.into();
        tracing::debug!(extension = %key, points = bundle.len(), "registering global hooks");
        self.bundles.write().insert(key, bundle)
    }

    /// Removes the bundle under `key`.
    pub fn remove(&self, key: &str) -> Option<Arc<HookBundle>> {
        let removed = self.bundles.write().remove(key);
        if removed.is_some() {
            tracing::debug!(extension = %key, "removed global hooks");
        }
        removed
    }

    /// Removes every bundle.
    pub fn clear(&self) {
        self.bundles.write().clear();
        tracing::debug!("cleared global hooks");
    }

    /// Returns `true` if a bundle is registered under `key`.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.bundles.read().contains(key)
    }

    /// Returns the number of registered bundles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bundles.read().len()
    }

    /// Returns `true` if no bundles are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bundles.read().is_empty()
    }

    /// Returns the registered keys in registration order.
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        self.bundles
            .read()
            .names()
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    /// Returns a copy of the current bundles.
    #[must_use]
    pub fn snapshot(&self) -> HookSet {
        self.bundles.read().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_remove_clear() {
        let registry = HookRegistry::new();
        assert!(registry.is_empty());

        registry.add("audit", HookBundle::new());
        registry.add("metrics", HookBundle::new());
        assert_eq!(registry.keys(), vec!["audit", "metrics"]);

        assert!(registry.remove("audit").is_some());
        assert!(registry.remove("audit").is_none());
        assert!(!registry.contains("audit"));
        assert_eq!(registry.len(), 1);

        registry.clear();
        assert!(registry.is_empty());
    }

    #[test]
    fn add_replaces_existing_key() {
        let registry = HookRegistry::new();
        assert!(registry.add("audit", HookBundle::new()).is_none());

        let replaced = registry.add("audit", HookBundle::new().on_stop(|_, _| Ok(())));
        assert!(replaced.is_some_and(|bundle| bundle.is_empty()));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn snapshot_is_detached() {
        let registry = HookRegistry::new();
        registry.add("audit", HookBundle::new());

        let snapshot = registry.snapshot();
        registry.clear();

        assert!(snapshot.contains("audit"));
    }
}
