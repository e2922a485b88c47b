//! Error type for record store operations.

use crate::record::InstanceId;

/// Error type for record store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Reading or writing the backing file failed.
    #[error("store i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// Encoding or decoding records failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A record for the instance already exists.
    #[error("a record for instance '{0}' already exists")]
    DuplicateInstance(InstanceId),
}
