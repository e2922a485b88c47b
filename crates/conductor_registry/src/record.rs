//! Record types: identities, states, and the per-instance status row.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

// ─────────────────────────────────────────────────────────────────────────────
// Identifiers
// ─────────────────────────────────────────────────────────────────────────────

/// Opaque identity of one process instance.
///
/// Either supplied by the caller or generated with [`InstanceId::generate`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InstanceId(String);

impl InstanceId {
    /// Length of generated ids.
    pub const DEFAULT_LENGTH: usize = 21;

    /// Creates an id from an existing string.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generates a random id of [`Self::DEFAULT_LENGTH`] characters.
    #[must_use]
    pub fn generate() -> Self {
        Self::generate_with_length(Self::DEFAULT_LENGTH)
    }

    /// Generates a random id of `length` characters.
    ///
    /// A length of 0 falls back to [`Self::DEFAULT_LENGTH`].
    #[must_use]
    pub fn generate_with_length(length: usize) -> Self {
        let length = if length == 0 {
            Self::DEFAULT_LENGTH
        } else {
            length
        };
        Self(nanoid::nanoid!(length))
    }

    /// Returns the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for InstanceId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for InstanceId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl AsRef<str> for InstanceId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Store-assigned identity of a [`ProcessRecord`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    /// Generates a new random record id.
    #[must_use]
    pub fn generate() -> Self {
        Self(nanoid::nanoid!())
    }

    /// Returns the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// ProcessState
// ─────────────────────────────────────────────────────────────────────────────

/// Lifecycle state of a process instance.
///
/// ```text
/// started → running → waiting ⇄ running → complete
///           running | waiting → stopped → running (resume)
///           * → error
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessState {
    /// Registered but not yet acknowledged by the engine.
    Started,
    /// Acknowledged by the engine and executing.
    Running,
    /// Paused on an activity awaiting an external signal.
    Waiting,
    /// Finished naturally.
    Complete,
    /// Stopped on request; may be resumed.
    Stopped,
    /// Cancelled.
    Cancelled,
    /// The engine reported a failure.
    Error,
}

impl ProcessState {
    /// Every state.
    pub const ALL: [ProcessState; 7] = [
        ProcessState::Started,
        ProcessState::Running,
        ProcessState::Waiting,
        ProcessState::Complete,
        ProcessState::Stopped,
        ProcessState::Cancelled,
        ProcessState::Error,
    ];

    /// Returns the persisted string form.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            ProcessState::Started => "started",
            ProcessState::Running => "running",
            ProcessState::Waiting => "waiting",
            ProcessState::Complete => "complete",
            ProcessState::Stopped => "stopped",
            ProcessState::Cancelled => "cancelled",
            ProcessState::Error => "error",
        }
    }

    /// Returns `true` while the engine may still emit events for the instance.
    #[must_use]
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            ProcessState::Started | ProcessState::Running | ProcessState::Waiting
        )
    }
}

impl fmt::Display for ProcessState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown state name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown process state '{0}'")]
pub struct UnknownProcessState(pub String);

impl FromStr for ProcessState {
    type Err = UnknownProcessState;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ProcessState::ALL
            .into_iter()
            .find(|state| state.as_str() == s)
            .ok_or_else(|| UnknownProcessState(s.to_string()))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// ProcessRecord
// ─────────────────────────────────────────────────────────────────────────────

/// The durable status row for one process instance.
///
/// Serialized as `{"_id", "instanceId", "source", "isResume", "state"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessRecord {
    /// Store-assigned identity.
    #[serde(rename = "_id")]
    pub id: RecordId,
    /// Identity of the process instance.
    pub instance_id: InstanceId,
    /// Definition source, or the serialized snapshot for resumed instances.
    pub source: String,
    /// Whether the record was created by a resume.
    pub is_resume: bool,
    /// Current lifecycle state.
    pub state: ProcessState,
}

/// Input for [`ProcessRegistry::register`](crate::ProcessRegistry::register).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    /// Identity of the process instance.
    pub instance_id: InstanceId,
    /// Definition source or resume snapshot.
    pub source: String,
    /// Whether the registration originates from a resume.
    pub is_resume: bool,
}

impl Registration {
    /// Registration for a freshly constructed instance.
    #[must_use]
    pub fn new(instance_id: InstanceId, source: impl Into<String>) -> Self {
        Self {
            instance_id,
            source: source.into(),
            is_resume: false,
        }
    }

    /// Registration for an instance resumed from `snapshot`.
    #[must_use]
    pub fn resumed(instance_id: InstanceId, snapshot: impl Into<String>) -> Self {
        Self {
            instance_id,
            source: snapshot.into(),
            is_resume: true,
        }
    }

    /// Builds the initial record in [`ProcessState::Started`].
    #[must_use]
    pub fn into_record(self) -> ProcessRecord {
        ProcessRecord {
            id: RecordId::generate(),
            instance_id: self.instance_id,
            source: self.source,
            is_resume: self.is_resume,
            state: ProcessState::Started,
        }
    }
}
