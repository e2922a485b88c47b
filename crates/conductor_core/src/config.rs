//! Conductor configuration.
//!
//! Configuration comes from a JSON document ([`ConductorConfig::from_json_str`])
//! or from environment variables ([`ConductorConfig::from_env`]):
//!
//! | Variable | Meaning |
//! |----------|---------|
//! | `CONDUCTOR_LOG` | log level (`debug`) or filter directives (`conductor_engine=debug`) |
//! | `CONDUCTOR_LOG_FORMAT` | `pretty`, `compact` or `json` |
//! | `CONDUCTOR_STORE_PATH` | switches to a [`JsonFileStore`] at this path |
//! | `CONDUCTOR_ID_LENGTH` | length of generated instance ids |

use std::path::PathBuf;
use std::sync::Arc;

use conductor_registry::{InstanceId, JsonFileStore, MemoryStore, RecordStore};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::logging::{TracingConfig, TracingFormat, parse_level};

/// Environment variable holding the log level or filter directives.
pub const ENV_LOG: &str = "CONDUCTOR_LOG";
/// Environment variable holding the log format.
pub const ENV_LOG_FORMAT: &str = "CONDUCTOR_LOG_FORMAT";
/// Environment variable holding the record file path.
pub const ENV_STORE_PATH: &str = "CONDUCTOR_STORE_PATH";
/// Environment variable holding the generated instance id length.
pub const ENV_ID_LENGTH: &str = "CONDUCTOR_ID_LENGTH";

// ─────────────────────────────────────────────────────────────────────────────
// StoreConfig
// ─────────────────────────────────────────────────────────────────────────────

/// Which record store backs the process registry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum StoreConfig {
    /// Records live in memory and are lost on exit.
    #[default]
    Memory,
    /// Records are persisted to a JSON file.
    File {
        /// Path of the record file.
        path: PathBuf,
    },
}

impl StoreConfig {
    /// Opens the configured store.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Store`] if a file store cannot be loaded.
    pub fn open(&self) -> Result<Arc<dyn RecordStore>, ConfigError> {
        match self {
            StoreConfig::Memory => Ok(Arc::new(MemoryStore::new())),
            StoreConfig::File { path } => Ok(Arc::new(JsonFileStore::open(path.clone())?)),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// ConductorConfig
// ─────────────────────────────────────────────────────────────────────────────

/// Top-level configuration.
///
/// # Example
///
/// ```
/// use conductor_core::{ConductorConfig, StoreConfig};
///
/// let config = ConductorConfig::from_json_str(
///     r#"{
///         "tracing": { "level": "debug", "format": "json" },
///         "store": { "kind": "memory" },
///         "instance_id_length": 12
///     }"#,
/// )
/// .unwrap();
///
/// assert_eq!(config.store, StoreConfig::Memory);
/// assert_eq!(config.instance_id_length, 12);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConductorConfig {
    /// Logging settings.
    pub tracing: TracingConfig,
    /// Record store settings.
    pub store: StoreConfig,
    /// Length of generated instance ids.
    pub instance_id_length: usize,
}

impl Default for ConductorConfig {
    fn default() -> Self {
        Self {
            tracing: TracingConfig::default(),
            store: StoreConfig::default(),
            instance_id_length: InstanceId::DEFAULT_LENGTH,
        }
    }
}

impl ConductorConfig {
    /// Parses a JSON configuration document. Missing fields take defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed JSON and
    /// [`ConfigError::InvalidIdLength`] for a zero id length.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from the process environment.
    ///
    /// A `.env` file in the working directory (or a parent) is read first
    /// if present.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable holds an unparsable value.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds configuration from a variable lookup, starting from defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable holds an unparsable value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(log) = lookup(ENV_LOG) {
            match parse_level(&log) {
                Ok(level) => config.tracing.level = level,
                Err(_) if log.contains('=') => config.tracing.env_filter = Some(log),
                Err(err) => return Err(err),
            }
        }

        if let Some(format) = lookup(ENV_LOG_FORMAT) {
            config.tracing.format = format.parse::<TracingFormat>()?;
        }

        if let Some(path) = lookup(ENV_STORE_PATH) {
            config.store = StoreConfig::File { path: path.into() };
        }

        if let Some(length) = lookup(ENV_ID_LENGTH) {
            config.instance_id_length = length
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidIdLength(length.clone()))?;
        }

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.instance_id_length == 0 {
            return Err(ConfigError::InvalidIdLength(
                self.instance_id_length.to_string(),
            ));
        }
        Ok(())
    }
}
