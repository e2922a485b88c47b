//! Logging and configuration infrastructure for Conductor.
//!
//! - [`TracingConfig`] installs a `tracing-subscriber` registry with an
//!   `EnvFilter` and one of three output formats.
//! - [`ConductorConfig`] gathers logging, record store and id generation
//!   settings from JSON or the environment.
//!
//! # Example
//!
//! ```no_run
//! use conductor_core::ConductorConfig;
//!
//! let config = ConductorConfig::from_env().unwrap();
//! config.tracing.init();
//! let store = config.store.open().unwrap();
//! # let _ = store;
//! ```

mod config;
mod error;
mod logging;

pub use config::{
    ConductorConfig, ENV_ID_LENGTH, ENV_LOG, ENV_LOG_FORMAT, ENV_STORE_PATH, StoreConfig,
};
pub use error::ConfigError;
pub use logging::{TracingConfig, TracingFormat, parse_level};
