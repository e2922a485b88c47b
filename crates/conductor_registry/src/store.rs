//! The keyed record store capability and its in-memory implementation.

use indexmap::IndexMap;
use parking_lot::RwLock;

use crate::error::StoreError;
use crate::record::{InstanceId, ProcessRecord, ProcessState, RecordId};

/// Partial update applied to a stored record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecordPatch {
    /// New lifecycle state, if changing.
    pub state: Option<ProcessState>,
}

impl RecordPatch {
    /// Patch that only sets the state.
    #[must_use]
    pub fn state(state: ProcessState) -> Self {
        Self { state: Some(state) }
    }

    /// Applies the patch to `record`.
    pub fn apply(&self, record: &mut ProcessRecord) {
        if let Some(state) = self.state {
            record.state = state;
        }
    }
}

/// Backing storage for process records.
///
/// Records are always addressed by [`InstanceId`]. Implementations must
/// reject a second insert for the same instance with
/// [`StoreError::DuplicateInstance`].
pub trait RecordStore: Send + Sync + 'static {
    /// Inserts a new record and returns its id.
    fn insert(&self, record: ProcessRecord) -> Result<RecordId, StoreError>;

    /// Returns the record for `instance_id`, if any.
    fn find_one(&self, instance_id: &InstanceId) -> Result<Option<ProcessRecord>, StoreError>;

    /// Applies `patch` to the record for `instance_id`.
    ///
    /// Returns `false` if no record matched.
    fn update(&self, instance_id: &InstanceId, patch: RecordPatch) -> Result<bool, StoreError>;

    /// Returns every record in insertion order.
    fn find_all(&self) -> Result<Vec<ProcessRecord>, StoreError>;
}

/// In-process [`RecordStore`].
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RwLock<IndexMap<InstanceId, ProcessRecord>>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl RecordStore for MemoryStore {
    fn insert(&self, record: ProcessRecord) -> Result<RecordId, StoreError> {
        let mut records = self.records.write();
        if records.contains_key(&record.instance_id) {
            return Err(StoreError::DuplicateInstance(record.instance_id));
        }
        let id = record.id.clone();
        records.insert(record.instance_id.clone(), record);
        Ok(id)
    }

    fn find_one(&self, instance_id: &InstanceId) -> Result<Option<ProcessRecord>, StoreError> {
        Ok(self.records.read().get(instance_id).cloned())
    }

    fn update(&self, instance_id: &InstanceId, patch: RecordPatch) -> Result<bool, StoreError> {
        let mut records = self.records.write();
        match records.get_mut(instance_id) {
            Some(record) => {
                patch.apply(record);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn find_all(&self) -> Result<Vec<ProcessRecord>, StoreError> {
        Ok(self.records.read().values().cloned().collect())
    }
}
