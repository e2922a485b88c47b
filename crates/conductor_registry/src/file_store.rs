//! A [`RecordStore`] persisted to a JSON file.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use parking_lot::Mutex;

use crate::error::StoreError;
use crate::record::{InstanceId, ProcessRecord, RecordId};
use crate::store::{RecordPatch, RecordStore};

/// Durable [`RecordStore`] keeping all records in one JSON file.
///
/// The file holds a JSON array of records. Every write rewrites the file
/// through a temporary sibling and an atomic rename, so a crash leaves
/// either the previous or the new contents.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    records: Mutex<IndexMap<InstanceId, ProcessRecord>>,
}

impl JsonFileStore {
    /// Opens the store at `path`, loading existing records if the file exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let records = if path.exists() {
            let contents = fs::read_to_string(&path)?;
            if contents.trim().is_empty() {
                IndexMap::new()
            } else {
                let loaded: Vec<ProcessRecord> = serde_json::from_str(&contents)?;
                loaded
                    .into_iter()
                    .map(|record| (record.instance_id.clone(), record))
                    .collect()
            }
        } else {
            IndexMap::new()
        };

        tracing::debug!(path = %path.display(), records = records.len(), "opened record file");
        Ok(Self {
            path,
            records: Mutex::new(records),
        })
    }

    /// Returns the backing file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, records: &IndexMap<InstanceId, ProcessRecord>) -> Result<(), StoreError> {
        let rows: Vec<&ProcessRecord> = records.values().collect();
        let encoded = serde_json::to_vec_pretty(&rows)?;

        let tmp = self.path.with_extension("tmp");
        let mut file = fs::File::create(&tmp)?;
        file.write_all(&encoded)?;
        file.sync_all()?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl RecordStore for JsonFileStore {
    fn insert(&self, record: ProcessRecord) -> Result<RecordId, StoreError> {
        let mut records = self.records.lock();
        if records.contains_key(&record.instance_id) {
            return Err(StoreError::DuplicateInstance(record.instance_id));
        }
        let id = record.id.clone();
        let instance_id = record.instance_id.clone();
        records.insert(instance_id.clone(), record);

        if let Err(err) = self.persist(&records) {
            records.shift_remove(&instance_id);
            return Err(err);
        }
        Ok(id)
    }

    fn find_one(&self, instance_id: &InstanceId) -> Result<Option<ProcessRecord>, StoreError> {
        Ok(self.records.lock().get(instance_id).cloned())
    }

    fn update(&self, instance_id: &InstanceId, patch: RecordPatch) -> Result<bool, StoreError> {
        let mut records = self.records.lock();
        let Some(record) = records.get_mut(instance_id) else {
            return Ok(false);
        };
        let previous = record.clone();
        patch.apply(record);

        if let Err(err) = self.persist(&records) {
            records.insert(instance_id.clone(), previous);
            return Err(err);
        }
        Ok(true)
    }

    fn find_all(&self) -> Result<Vec<ProcessRecord>, StoreError> {
        Ok(self.records.lock().values().cloned().collect())
    }
}
