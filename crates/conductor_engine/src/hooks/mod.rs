//! Lifecycle hooks for process instances.
//!
//! Extensions observe and influence the `execute`, `stop` and `resume`
//! operations through named [`HookBundle`]s. Each bundle holds at most one
//! callback per [`HookPoint`] (`onExecuteBefore`, `onStop`, `onResumeAfter`,
//! ...).
//!
//! # Global vs Local
//!
//! - **Global** bundles live in the [`HookRegistry`] and apply to every
//!   instance.
//! - **Local** bundles are supplied when an instance is created or resumed
//!   and apply to that instance only.
//!
//! For each operation the effective set is [`HookSet::merged`]: global
//! bundles in registration order, a local bundle replacing the global one of
//! the same name, then local-only bundles.
//!
//! # Failure
//!
//! Hooks are trusted. A hook returning an error aborts the operation at that
//! point and the error is returned to the caller as
//! [`LifecycleError::Hook`](crate::LifecycleError::Hook).
//!
//! # Example
//!
//! ```
//! use conductor_engine::hooks::{HookBundle, HookRegistry};
//!
//! let hooks = HookRegistry::new();
//! hooks.add(
//!     "audit",
//!     HookBundle::new().on_execute_after(|ctx, _| {
//!         tracing::info!(instance_id = %ctx.instance_id(), "execution acknowledged");
//!         Ok(())
//!     }),
//! );
//!
//! assert!(hooks.contains("audit"));
//! hooks.clear();
//! ```

mod bundle;
mod context;
mod error;
mod point;
mod registry;
mod set;

pub use bundle::{HookBundle, HookFn};
pub use context::HookContext;
pub use error::HookError;
pub use point::{HookPoint, LifecycleOp, Phase, UnknownHookPoint};
pub use registry::HookRegistry;
pub use set::HookSet;
