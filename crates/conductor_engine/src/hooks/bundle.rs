//! Hook bundles: one extension's callbacks, keyed by hook point.

use core::fmt;
use std::sync::Arc;

use hashbrown::HashMap;

use crate::hooks::{HookContext, HookError, HookPoint};
use crate::options::LifecycleOptions;

/// Type-erased hook callback.
///
/// Hooks may mutate the options before the engine sees them. Returning an
/// error aborts the operation.
pub type HookFn =
    Arc<dyn Fn(&HookContext<'_>, &mut LifecycleOptions) -> Result<(), HookError> + Send + Sync>;

/// A named extension's hooks: at most one callback per [`HookPoint`].
///
/// # Example
///
/// ```
/// use conductor_engine::hooks::{HookBundle, HookPoint};
///
/// let audit = HookBundle::new()
///     .on_execute_before(|ctx, options| {
///         options.extra.insert("audited".into(), ctx.instance_id().as_str().into());
///         Ok(())
///     })
///     .on_stop_after(|ctx, _| {
///         tracing::info!(instance_id = %ctx.instance_id(), "stopped");
///         Ok(())
///     });
///
/// assert!(audit.contains(HookPoint::EXECUTE_BEFORE));
/// assert!(!audit.contains(HookPoint::RESUME));
/// ```
#[derive(Clone, Default)]
pub struct HookBundle {
    hooks: HashMap<HookPoint, HookFn>,
}

impl HookBundle {
    /// Creates an empty bundle.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the hook for `point`, replacing any previous one.
    #[must_use]
    pub fn on<F>(mut self, point: HookPoint, hook: F) -> Self
    where
        F: Fn(&HookContext<'_>, &mut LifecycleOptions) -> Result<(), HookError>
            + Send
            + Sync
            + 'static,
    {
        self.insert(point, Arc::new(hook));
        self
    }

    /// Sets an already type-erased hook for `point`.
    ///
    /// Returns the hook it replaced, if any.
    pub fn insert(&mut self, point: HookPoint, hook: HookFn) -> Option<HookFn> {
        self.hooks.insert(point, hook)
    }

    /// Returns the hook for `point`.
    #[must_use]
    pub fn get(&self, point: HookPoint) -> Option<&HookFn> {
        self.hooks.get(&point)
    }

    /// Returns `true` if the bundle has a hook for `point`.
    #[must_use]
    pub fn contains(&self, point: HookPoint) -> bool {
        self.hooks.contains_key(&point)
    }

    /// Returns the number of hooks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    /// Returns `true` if the bundle has no hooks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }

    /// Returns the points this bundle hooks, in [`HookPoint::ALL`] order.
    #[must_use]
    pub fn points(&self) -> Vec<HookPoint> {
        HookPoint::ALL
            .into_iter()
            .filter(|point| self.contains(*point))
            .collect()
    }
}

macro_rules! hook_builders {
    ($($(#[$doc:meta])* $method:ident => $point:ident;)*) => {
        impl HookBundle {
            $(
                $(#[$doc])*
                #[must_use]
                pub fn $method<F>(self, hook: F) -> Self
                where
                    F: Fn(&HookContext<'_>, &mut LifecycleOptions) -> Result<(), HookError>
                        + Send
                        + Sync
                        + 'static,
                {
                    self.on(HookPoint::$point, hook)
                }
            )*
        }
    };
}

hook_builders! {
    /// Sets the `onExecuteBefore` hook.
    on_execute_before => EXECUTE_BEFORE;
    /// Sets the `onExecute` hook.
    on_execute => EXECUTE;
    /// Sets the `onExecuteAfter` hook.
    on_execute_after => EXECUTE_AFTER;
    /// Sets the `onStopBefore` hook.
    on_stop_before => STOP_BEFORE;
    /// Sets the `onStop` hook.
    on_stop => STOP;
    /// Sets the `onStopAfter` hook.
    on_stop_after => STOP_AFTER;
    /// Sets the `onResumeBefore` hook.
    on_resume_before => RESUME_BEFORE;
    /// Sets the `onResume` hook.
    on_resume => RESUME;
    /// Sets the `onResumeAfter` hook.
    on_resume_after => RESUME_AFTER;
}

impl fmt::Debug for HookBundle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set()
            .entries(self.points().iter().map(HookPoint::name))
            .finish()
    }
}
