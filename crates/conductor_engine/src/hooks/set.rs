//! Named collections of hook bundles and their composition.

use std::sync::Arc;

use conductor_registry::InstanceId;
use indexmap::IndexMap;

use crate::error::LifecycleError;
use crate::handle::EngineHandle;
use crate::hooks::{HookBundle, HookContext, HookPoint};
use crate::options::LifecycleOptions;

/// Hook bundles keyed by extension name, in insertion order.
///
/// Used both for the bundles local to one instance and for snapshots of the
/// global [`HookRegistry`](crate::hooks::HookRegistry).
#[derive(Debug, Clone, Default)]
pub struct HookSet {
    bundles: IndexMap<String, Arc<HookBundle>>,
}

impl HookSet {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a bundle, builder style.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, bundle: HookBundle) -> Self {
        self.insert(name, bundle);
        self
    }

    /// Adds or replaces the bundle under `name`.
    ///
    /// A replaced bundle keeps its original position.
    pub fn insert(&mut self, name: impl Into<String>, bundle: HookBundle) -> Option<Arc<HookBundle>> {
        self.insert_shared(name.into(), Arc::new(bundle))
    }

    pub(crate) fn insert_shared(
        &mut self,
        name: String,
        bundle: Arc<HookBundle>,
    ) -> Option<Arc<HookBundle>> {
        self.bundles.insert(name, bundle)
    }

    /// Removes the bundle under `name`, keeping the order of the others.
    pub fn remove(&mut self, name: &str) -> Option<Arc<HookBundle>> {
        self.bundles.shift_remove(name)
    }

    /// Removes every bundle.
    pub fn clear(&mut self) {
        self.bundles.clear();
    }

    /// Returns the bundle under `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Arc<HookBundle>> {
        self.bundles.get(name)
    }

    /// Returns `true` if a bundle is registered under `name`.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.bundles.contains_key(name)
    }

    /// Returns the number of bundles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bundles.len()
    }

    /// Returns `true` if there are no bundles.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bundles.is_empty()
    }

    /// Returns the bundle names in order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.bundles.keys().map(String::as_str).collect()
    }

    /// Iterates over `(name, bundle)` pairs in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Arc<HookBundle>)> {
        self.bundles.iter().map(|(name, bundle)| (name.as_str(), bundle))
    }

    /// Composes the effective hooks for one operation.
    ///
    /// Starts from `global` and applies `local` on top: a local bundle
    /// replaces the global one of the same name in place, and local-only
    /// bundles follow the global ones.
    #[must_use]
    pub fn merged(global: &HookSet, local: &HookSet) -> HookSet {
        let mut merged = global.clone();
        for (name, bundle) in &local.bundles {
            merged.insert_shared(name.clone(), Arc::clone(bundle));
        }
        merged
    }

    /// Runs every bundle's hook for `point`, in order.
    ///
    /// # Errors
    ///
    /// Stops at the first failing hook and returns
    /// [`LifecycleError::Hook`]; later hooks do not run.
    pub fn run(
        &self,
        point: HookPoint,
        instance_id: &InstanceId,
        engine: Option<&EngineHandle>,
        options: &mut LifecycleOptions,
    ) -> Result<(), LifecycleError> {
        for (extension, bundle) in &self.bundles {
            let Some(hook) = bundle.get(point) else {
                continue;
            };

            let ctx = HookContext {
                point,
                extension,
                instance_id,
                engine,
            };
            tracing::trace!(%instance_id, %extension, %point, "running hook");

            if let Err(source) = hook(&ctx, options) {
                tracing::warn!(%instance_id, %extension, %point, error = %source, "hook failed");
                return Err(LifecycleError::Hook {
                    extension: extension.clone(),
                    point,
                    source,
                });
            }
        }
        Ok(())
    }
}

impl FromIterator<(String, HookBundle)> for HookSet {
    fn from_iter<I: IntoIterator<Item = (String, HookBundle)>>(iter: I) -> Self {
        let mut set = HookSet::new();
        for (name, bundle) in iter {
            set.insert(name, bundle);
        }
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hooks::HookError;
    use parking_lot::Mutex;

    fn recorder(log: &Arc<Mutex<Vec<String>>>, label: &'static str) -> HookBundle {
        let log = Arc::clone(log);
        HookBundle::new().on_execute_before(move |ctx, _| {
            log.lock().push(format!("{label}:{}", ctx.extension()));
            Ok(())
        })
    }

    #[test]
    fn local_bundle_overrides_global_in_place() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let global = HookSet::new()
            .with("audit", recorder(&log, "global"))
            .with("metrics", recorder(&log, "global"));
        let local = HookSet::new()
            .with("extra", recorder(&log, "local"))
            .with("audit", recorder(&log, "local"));

        let merged = HookSet::merged(&global, &local);
        assert_eq!(merged.names(), vec!["audit", "metrics", "extra"]);

        merged
            .run(
                HookPoint::EXECUTE_BEFORE,
                &InstanceId::from("I1"),
                None,
                &mut LifecycleOptions::new(),
            )
            .unwrap();

        assert_eq!(
            *log.lock(),
            vec!["local:audit", "global:metrics", "local:extra"]
        );
    }

    #[test]
    fn merging_does_not_touch_inputs() {
        let global = HookSet::new().with("audit", HookBundle::new());
        let local = HookSet::new().with("local", HookBundle::new());

        let _ = HookSet::merged(&global, &local);

        assert_eq!(global.names(), vec!["audit"]);
        assert_eq!(local.names(), vec!["local"]);
    }

    #[test]
    fn failing_hook_skips_the_rest() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let set = HookSet::new()
            .with(
                "broken",
                HookBundle::new().on_stop_before(|_, _| Err(HookError::new("refused"))),
            )
            .with(
                "after",
                HookBundle::new().on_stop_before({
                    let log = Arc::clone(&log);
                    move |_, _| {
                        log.lock().push("ran".to_string());
                        Ok(())
                    }
                }),
            );

        let err = set
            .run(
                HookPoint::STOP_BEFORE,
                &InstanceId::from("I1"),
                None,
                &mut LifecycleOptions::new(),
            )
            .unwrap_err();

        match err {
            LifecycleError::Hook {
                extension, point, ..
            } => {
                assert_eq!(extension, "broken");
                assert_eq!(point, HookPoint::STOP_BEFORE);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(log.lock().is_empty());
    }

    #[test]
    fn hooks_share_one_options_value() {
        let set = HookSet::new()
            .with(
                "first",
                HookBundle::new().on_execute_before(|_, options| {
                    options.variables.insert("count".into(), 1.into());
                    Ok(())
                }),
            )
            .with(
                "second",
                HookBundle::new().on_execute_before(|_, options| {
                    let count = options.variables["count"].as_i64().unwrap_or_default();
                    options.variables.insert("count".into(), (count + 1).into());
                    Ok(())
                }),
            );

        let mut options = LifecycleOptions::new();
        set.run(
            HookPoint::EXECUTE_BEFORE,
            &InstanceId::from("I1"),
            None,
            &mut options,
        )
        .unwrap();

        assert_eq!(options.variables["count"], 2);
    }

    #[test]
    fn points_without_hooks_are_skipped() {
        let set = HookSet::new().with("audit", HookBundle::new().on_stop(|_, _| Err("no".into())));
        set.run(
            HookPoint::EXECUTE,
            &InstanceId::from("I1"),
            None,
            &mut LifecycleOptions::new(),
        )
        .unwrap();
    }
}
