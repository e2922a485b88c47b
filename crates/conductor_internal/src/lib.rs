//! # Conductor Internal Library
//!
//! Re-exports the core Conductor crates for convenience.

/// Layer 1: Engine events and listener sets.
pub use conductor_listeners;

/// Layer 1: Process records and their stores.
pub use conductor_registry;

/// Layer 1: Configuration and logging setup.
pub use conductor_core;

/// Layer 2: Hooks, engine handles and lifecycle tracking.
pub use conductor_engine;

/// Re-export all common types for easy access.
pub mod prelude {
    pub use conductor_core::{ConductorConfig, StoreConfig, TracingConfig, TracingFormat};
    pub use conductor_engine::hooks::{HookBundle, HookContext, HookError, HookPoint, HookSet};
    pub use conductor_engine::{
        Conductor, CreateOptions, EngineFactory, EngineHandle, EngineSnapshot, LifecycleError,
        LifecycleOptions, ProcessEngine, ResumeOptions,
    };
    pub use conductor_listeners::{
        EngineEvent, EventKind, ListenerSet, create_listeners, merge_listeners,
    };
    pub use conductor_registry::{InstanceId, ProcessRecord, ProcessRegistry, ProcessState};
}
