//! Durable status tracking for process instances.
//!
//! Every process instance owns exactly one [`ProcessRecord`], keyed by its
//! [`InstanceId`]. The [`ProcessRegistry`] creates records idempotently and
//! moves them through [`ProcessState`]s; the records themselves live in a
//! pluggable [`RecordStore`].
//!
//! - [`MemoryStore`] - In-process store, the default
//! - [`JsonFileStore`] - Durable store backed by a JSON file
//!
//! # Example
//!
//! ```
//! use conductor_registry::{InstanceId, ProcessRegistry, ProcessState, Registration};
//!
//! let registry = ProcessRegistry::in_memory();
//! let id = InstanceId::from("order-42");
//!
//! registry.register(Registration::new(id.clone(), "<definitions/>")).unwrap();
//! registry.update_state(&id, ProcessState::Running).unwrap();
//!
//! assert_eq!(registry.state(&id).unwrap(), Some(ProcessState::Running));
//! ```

mod error;
mod file_store;
mod record;
mod registry;
mod store;

pub use error::StoreError;
pub use file_store::JsonFileStore;
pub use record::{
    InstanceId, ProcessRecord, ProcessState, RecordId, Registration, UnknownProcessState,
};
pub use registry::ProcessRegistry;
pub use store::{MemoryStore, RecordPatch, RecordStore};
