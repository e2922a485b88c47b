//! Lifecycle instrumentation for process engines.
//!
//! This crate wraps an opaque process engine so that many concurrently
//! running, individually identified and resumable instances can be tracked
//! and extended:
//!
//! - [`Conductor`] - Creates and resumes instances, composing hooks and
//!   keeping each instance's process record current
//! - [`EngineHandle`] - A wrapped engine with its instance id, local hooks
//!   and stop flag; intercepts `execute` and `stop`
//! - [`hooks`] - Global and local hook bundles run before, during and after
//!   each operation
//! - [`ProcessEngine`] / [`EngineFactory`] - The engine capability consumed
//!   by the layer
//! - [`scripted`] - A small scripted engine implementing that capability
//!
//! # State Machine
//!
//! ```text
//! started → running → waiting ⇄ running → complete
//!           running | waiting → stopped → running (resume)
//!           * → error
//! ```
//!
//! `running` is recorded when the engine acknowledges a start or resume,
//! `waiting` when the engine emits `wait`, `complete` on `end` unless the
//! instance was stopped on purpose, `error` on `error`.
//!
//! # Example
//!
//! ```
//! use conductor_engine::hooks::HookBundle;
//! use conductor_engine::scripted::{ScriptedEngine, ScriptedEngineFactory};
//! use conductor_engine::{Conductor, CreateOptions, LifecycleOptions};
//! use conductor_registry::ProcessState;
//!
//! # futures::executor::block_on(async {
//! let conductor = Conductor::new(ScriptedEngineFactory);
//! conductor.hooks().add(
//!     "audit",
//!     HookBundle::new().on_stop_before(|ctx, _| {
//!         tracing::info!(instance_id = %ctx.instance_id(), "stopping");
//!         Ok(())
//!     }),
//! );
//!
//! let handle = conductor
//!     .create(CreateOptions::new("start -> user:approve -> end").with_instance_id("I2"))
//!     .unwrap();
//! handle.execute(LifecycleOptions::new()).await.unwrap();
//! handle.engine_as::<ScriptedEngine>().unwrap().run().unwrap();
//!
//! handle.stop(LifecycleOptions::new()).unwrap();
//! assert_eq!(handle.state().unwrap(), Some(ProcessState::Stopped));
//! # });
//! ```

mod conductor;
mod engine;
mod error;
mod handle;
pub mod hooks;
mod options;
mod resume;
pub mod scripted;
mod status;

pub use conductor::{Conductor, ConductorBuilder};
pub use engine::{Acknowledgement, EngineFactory, EngineSnapshot, ProcessEngine, Resumption};
pub use error::{EngineError, LifecycleError};
pub use handle::EngineHandle;
pub use options::{CreateOptions, EngineOptions, LifecycleOptions, ResumeOptions};
pub use resume::PendingResume;
