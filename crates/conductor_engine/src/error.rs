//! Error types for engines and lifecycle operations.

use conductor_listeners::ListenerError;
use conductor_registry::StoreError;

use crate::hooks::{HookError, HookPoint};

/// Failure reported by a [`ProcessEngine`](crate::ProcessEngine) implementation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    /// The process definition could not be loaded.
    #[error("invalid process definition: {0}")]
    Definition(String),

    /// A snapshot could not be produced or restored.
    #[error("invalid engine snapshot: {0}")]
    Snapshot(String),

    /// A signal did not match any waiting activity.
    #[error("no waiting activity '{0}'")]
    InvalidSignal(String),

    /// The engine refused the request in its current state.
    #[error("engine rejected request: {0}")]
    Rejected(String),
}

/// Errors raised by the intercepted lifecycle operations.
#[derive(Debug, thiserror::Error)]
pub enum LifecycleError {
    /// `resume` was called without an instance id.
    #[error("instanceId is required to resume")]
    MissingInstanceId,

    /// A hook returned an error, aborting the operation.
    #[error("hook '{point}' of extension '{extension}' failed: {source}")]
    Hook {
        /// Name of the bundle whose hook failed.
        extension: String,
        /// The hook point being run.
        point: HookPoint,
        /// The error returned by the hook.
        #[source]
        source: HookError,
    },

    /// The wrapped engine reported a failure.
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// Reading or writing a process record failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The status listener could not be attached.
    #[error(transparent)]
    Listener(#[from] ListenerError),

    /// The resume snapshot could not be serialized for the process record.
    #[error("failed to serialize snapshot: {0}")]
    Snapshot(#[from] serde_json::Error),
}
