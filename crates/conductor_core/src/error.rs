//! Configuration errors.

use conductor_registry::StoreError;

/// Errors raised while loading configuration or opening the configured store.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A log level name was not recognized.
    #[error("invalid log level '{0}'")]
    InvalidLevel(String),
    /// A log format name was not recognized.
    #[error("invalid log format '{0}' (expected pretty, compact or json)")]
    InvalidFormat(String),
    /// The instance id length was not a positive integer.
    #[error("invalid instance id length '{0}'")]
    InvalidIdLength(String),
    /// The configuration document could not be parsed.
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),
    /// The configured record store could not be opened.
    #[error("failed to open record store: {0}")]
    Store(#[from] StoreError),
}
