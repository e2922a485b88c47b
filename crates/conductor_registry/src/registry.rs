//! The process registry: idempotent registration and state transitions.

use core::fmt;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::StoreError;
use crate::record::{InstanceId, ProcessRecord, ProcessState, RecordId, Registration};
use crate::store::{MemoryStore, RecordPatch, RecordStore};

/// Registry of per-instance status records.
///
/// # Invariants
///
/// - At most one record exists per [`InstanceId`]. Registering an id twice
///   returns the existing record's id and changes nothing.
/// - Records are only mutated through [`update_state`](Self::update_state)
///   and are never deleted here.
///
/// # Thread Safety
///
/// Registrations are serialized by an internal lock so that concurrent
/// registrations of one id cannot both insert. State updates go straight to
/// the store.
pub struct ProcessRegistry {
    store: Arc<dyn RecordStore>,
    registration: Mutex<()>,
}

impl fmt::Debug for ProcessRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcessRegistry").finish_non_exhaustive()
    }
}

impl Default for ProcessRegistry {
    fn default() -> Self {
        Self::in_memory()
    }
}

impl ProcessRegistry {
    /// Creates a registry backed by `store`.
    #[must_use]
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self {
            store,
            registration: Mutex::new(()),
        }
    }

    /// Creates a registry backed by a fresh [`MemoryStore`].
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    /// Returns the backing store.
    #[must_use]
    pub fn store(&self) -> &Arc<dyn RecordStore> {
        &self.store
    }

    /// Returns the record for `instance_id` if it is registered.
    ///
    /// # Errors
    ///
    /// Propagates store failures.
    pub fn is_registered(
        &self,
        instance_id: &InstanceId,
    ) -> Result<Option<ProcessRecord>, StoreError> {
        self.store.find_one(instance_id)
    }

    /// Creates the record for an instance in [`ProcessState::Started`].
    ///
    /// If a record already exists for the id, nothing changes and the
    /// existing record's id is returned.
    ///
    /// # Errors
    ///
    /// Propagates store failures.
    pub fn register(&self, registration: Registration) -> Result<RecordId, StoreError> {
        let _guard = self.registration.lock();

        if let Some(existing) = self.store.find_one(&registration.instance_id)? {
            tracing::debug!(
                instance_id = %registration.instance_id,
                "instance already registered"
            );
            return Ok(existing.id);
        }

        let instance_id = registration.instance_id.clone();
        let is_resume = registration.is_resume;
        let id = self.store.insert(registration.into_record())?;
        tracing::debug!(%instance_id, is_resume, "registered process instance");
        Ok(id)
    }

    /// Moves the record for `instance_id` to `state`.
    ///
    /// Returns `false` if no record exists for the id.
    ///
    /// # Errors
    ///
    /// Propagates store failures.
    pub fn update_state(
        &self,
        instance_id: &InstanceId,
        state: ProcessState,
    ) -> Result<bool, StoreError> {
        let matched = self.store.update(instance_id, RecordPatch::state(state))?;
        if matched {
            tracing::debug!(%instance_id, %state, "process state updated");
        } else {
            tracing::warn!(%instance_id, %state, "state update for unregistered instance");
        }
        Ok(matched)
    }

    /// Returns the current state of `instance_id`, if registered.
    ///
    /// # Errors
    ///
    /// Propagates store failures.
    pub fn state(&self, instance_id: &InstanceId) -> Result<Option<ProcessState>, StoreError> {
        Ok(self.store.find_one(instance_id)?.map(|record| record.state))
    }

    /// Returns every record.
    ///
    /// # Errors
    ///
    /// Propagates store failures.
    pub fn records(&self) -> Result<Vec<ProcessRecord>, StoreError> {
        self.store.find_all()
    }
}
