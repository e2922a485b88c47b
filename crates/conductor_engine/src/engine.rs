//! The process engine capability consumed by the lifecycle layer.
//!
//! Conductor never interprets process definitions itself. It drives an
//! engine through [`ProcessEngine`] and builds new ones through an
//! [`EngineFactory`]. Engines report progress as named events on the
//! listener passed in [`EngineOptions`] and on their own
//! [`events`](ProcessEngine::events) set.

use core::fmt;

use conductor_listeners::ListenerSet;
use downcast_rs::{DowncastSync, impl_downcast};
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::options::EngineOptions;

/// Resolves once the engine has acknowledged a start or resume request.
pub type Acknowledgement = BoxFuture<'static, Result<(), EngineError>>;

// ─────────────────────────────────────────────────────────────────────────────
// EngineSnapshot
// ─────────────────────────────────────────────────────────────────────────────

/// Serialized engine state, opaque to Conductor.
///
/// Produced by [`ProcessEngine::snapshot`] and consumed by
/// [`EngineFactory::resume`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EngineSnapshot(serde_json::Value);

impl EngineSnapshot {
    /// Wraps a JSON value.
    #[must_use]
    pub fn new(value: serde_json::Value) -> Self {
        Self(value)
    }

    /// Returns the JSON value.
    #[must_use]
    pub fn as_value(&self) -> &serde_json::Value {
        &self.0
    }

    /// Consumes the snapshot, returning the JSON value.
    #[must_use]
    pub fn into_value(self) -> serde_json::Value {
        self.0
    }

    /// Serializes the snapshot to a JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if the value cannot be serialized.
    pub fn to_json_string(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.0)
    }

    /// Parses a snapshot from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if `json` is not valid JSON.
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json).map(Self)
    }
}

impl From<serde_json::Value> for EngineSnapshot {
    fn from(value: serde_json::Value) -> Self {
        Self(value)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// ProcessEngine
// ─────────────────────────────────────────────────────────────────────────────

/// One executing process, as seen by the lifecycle layer.
///
/// Implementations must emit at least the [`EventKind`] names on the
/// listener supplied to [`execute`](Self::execute) (or to
/// [`EngineFactory::resume`]) and on [`events`](Self::events). `end` and
/// `error` on [`events`](Self::events) drive the instance's process record.
///
/// Concrete engines can be recovered from a `dyn ProcessEngine` with
/// `downcast_ref`.
///
/// [`EventKind`]: conductor_listeners::EventKind
pub trait ProcessEngine: DowncastSync {
    /// Starts execution.
    ///
    /// Returns as soon as the request is issued; the returned future resolves
    /// with the engine's acknowledgement.
    ///
    /// # Errors
    ///
    /// Returns an error if the request cannot be issued at all.
    fn execute(&self, options: EngineOptions) -> Result<Acknowledgement, EngineError>;

    /// Stops execution.
    ///
    /// # Errors
    ///
    /// Returns an error if the engine refuses to stop.
    fn stop(&self) -> Result<(), EngineError>;

    /// Serializes the current state for a later resume.
    ///
    /// # Errors
    ///
    /// Returns an error if the state cannot be captured.
    fn snapshot(&self) -> Result<EngineSnapshot, EngineError>;

    /// Returns the engine-level event set.
    fn events(&self) -> &ListenerSet;
}

impl_downcast!(sync ProcessEngine);

impl fmt::Debug for dyn ProcessEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcessEngine")
            .field("events", self.events())
            .finish_non_exhaustive()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// EngineFactory
// ─────────────────────────────────────────────────────────────────────────────

/// An engine rebuilt from a snapshot, together with its acknowledgement.
pub struct Resumption {
    /// The resumed engine.
    pub engine: Box<dyn ProcessEngine>,
    /// Resolves once the engine has acknowledged the resume.
    pub acknowledged: Acknowledgement,
}

impl fmt::Debug for Resumption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resumption")
            .field("engine", &self.engine)
            .finish_non_exhaustive()
    }
}

/// Builds engines from definitions and snapshots.
pub trait EngineFactory: Send + Sync + 'static {
    /// Constructs an engine for a process definition.
    ///
    /// # Errors
    ///
    /// Returns an error if the definition cannot be loaded.
    fn create(&self, source: &str) -> Result<Box<dyn ProcessEngine>, EngineError>;

    /// Rebuilds an engine from `snapshot` and continues execution.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot cannot be restored.
    fn resume(
        &self,
        snapshot: &EngineSnapshot,
        options: EngineOptions,
    ) -> Result<Resumption, EngineError>;
}
