//! Tracing subscriber configuration.
//!
//! [`TracingConfig`] describes how log output is filtered and formatted and
//! installs a `tracing-subscriber` registry with [`TracingConfig::init`].
//!
//! # Example
//!
//! ```
//! use conductor_core::{TracingConfig, TracingFormat};
//! use tracing::Level;
//!
//! // Development: pretty output with span enter/exit events
//! TracingConfig::default()
//!     .with_level(Level::DEBUG)
//!     .with_format(TracingFormat::Pretty)
//!     .with_span_events(true)
//!     .init();
//!
//! // Production: JSON output for log aggregation
//! let prod = TracingConfig::default()
//!     .with_format(TracingFormat::Json)
//!     .with_env_filter("conductor_engine=info,conductor_registry=warn");
//! # let _ = prod;
//! ```

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::Level;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::error::ConfigError;

// ─────────────────────────────────────────────────────────────────────────────
// TracingFormat
// ─────────────────────────────────────────────────────────────────────────────

/// Tracing output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TracingFormat {
    /// Human-readable colored output (default).
    #[default]
    Pretty,
    /// Compact single-line output.
    Compact,
    /// JSON structured output for log aggregation.
    Json,
}

impl fmt::Display for TracingFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TracingFormat::Pretty => "pretty",
            TracingFormat::Compact => "compact",
            TracingFormat::Json => "json",
        })
    }
}

impl FromStr for TracingFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" => Ok(TracingFormat::Pretty),
            "compact" => Ok(TracingFormat::Compact),
            "json" => Ok(TracingFormat::Json),
            _ => Err(ConfigError::InvalidFormat(s.to_string())),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// TracingConfig
// ─────────────────────────────────────────────────────────────────────────────

/// Log filtering and formatting settings.
///
/// Deserializes from `{"level": "debug", "format": "json", "env_filter":
/// "...", "span_events": true}`; every field is optional.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TracingConfig {
    /// Maximum log level, used when no env filter is set or it fails to parse.
    #[serde(with = "level_name")]
    pub level: Level,
    /// Output format.
    pub format: TracingFormat,
    /// Target-specific filter directives (e.g. `conductor_engine=debug`).
    pub env_filter: Option<String>,
    /// Whether to include span enter/exit events.
    pub span_events: bool,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            format: TracingFormat::Pretty,
            env_filter: None,
            span_events: false,
        }
    }
}

impl TracingConfig {
    /// Creates a configuration with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the maximum log level.
    #[must_use]
    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Sets the output format.
    #[must_use]
    pub fn with_format(mut self, format: TracingFormat) -> Self {
        self.format = format;
        self
    }

    /// Sets a custom environment filter string.
    ///
    /// Format: `target=level,target=level,...`
    #[must_use]
    pub fn with_env_filter(mut self, filter: impl Into<String>) -> Self {
        self.env_filter = Some(filter.into());
        self
    }

    /// Enables span enter/exit events in output.
    #[must_use]
    pub fn with_span_events(mut self, enabled: bool) -> Self {
        self.span_events = enabled;
        self
    }

    /// Builds the filter for this configuration.
    ///
    /// An env filter that fails to parse falls back to the plain level.
    #[must_use]
    pub fn filter(&self) -> EnvFilter {
        match &self.env_filter {
            Some(filter) => {
                EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new(self.level.as_str()))
            }
            None => EnvFilter::new(self.level.as_str()),
        }
    }

    /// Installs the global subscriber.
    ///
    /// Does nothing if a global subscriber is already installed, so calling
    /// this more than once is harmless.
    pub fn init(&self) {
        let env_filter = self.filter();

        let span_events = if self.span_events {
            FmtSpan::ENTER | FmtSpan::EXIT
        } else {
            FmtSpan::NONE
        };

        // try_init().ok() ignores errors if already initialized
        match self.format {
            TracingFormat::Pretty => {
                tracing_subscriber::registry()
                    .with(env_filter)
                    .with(
                        tracing_subscriber::fmt::layer()
                            .pretty()
                            .with_span_events(span_events),
                    )
                    .try_init()
                    .ok();
            }
            TracingFormat::Compact => {
                tracing_subscriber::registry()
                    .with(env_filter)
                    .with(
                        tracing_subscriber::fmt::layer()
                            .compact()
                            .with_span_events(span_events),
                    )
                    .try_init()
                    .ok();
            }
            TracingFormat::Json => {
                tracing_subscriber::registry()
                    .with(env_filter)
                    .with(
                        tracing_subscriber::fmt::layer()
                            .json()
                            .with_span_events(span_events),
                    )
                    .try_init()
                    .ok();
            }
        }

        tracing::info!(
            level = %self.level,
            format = %self.format,
            "tracing initialized"
        );
    }
}

/// Parses a level name such as `"debug"` or `"WARN"`.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidLevel`] for unknown names.
pub fn parse_level(name: &str) -> Result<Level, ConfigError> {
    Level::from_str(name.trim()).map_err(|_| ConfigError::InvalidLevel(name.to_string()))
}

mod level_name {
    use serde::{Deserialize, Deserializer, Serializer};
    use tracing::Level;

    pub(super) fn serialize<S: Serializer>(level: &Level, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&level.as_str().to_ascii_lowercase())
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Level, D::Error> {
        let name = String::deserialize(deserializer)?;
        super::parse_level(&name).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracing_format_default_is_pretty() {
        assert_eq!(TracingFormat::default(), TracingFormat::Pretty);
    }

    #[test]
    fn tracing_config_default_level_is_info() {
        let config = TracingConfig::default();
        assert_eq!(config.level, Level::INFO);
        assert!(!config.span_events);
    }

    #[test]
    fn builders_set_fields() {
        let config = TracingConfig::new()
            .with_level(Level::DEBUG)
            .with_format(TracingFormat::Json)
            .with_env_filter("conductor_engine=debug")
            .with_span_events(true);

        assert_eq!(config.level, Level::DEBUG);
        assert_eq!(config.format, TracingFormat::Json);
        assert_eq!(config.env_filter.as_deref(), Some("conductor_engine=debug"));
        assert!(config.span_events);
    }

    #[test]
    fn format_parses_case_insensitively() {
        assert_eq!("JSON".parse::<TracingFormat>().unwrap(), TracingFormat::Json);
        assert_eq!(" compact ".parse::<TracingFormat>().unwrap(), TracingFormat::Compact);
        assert!(matches!(
            "xml".parse::<TracingFormat>(),
            Err(ConfigError::InvalidFormat(_))
        ));
    }

    #[test]
    fn deserializes_partial_json() {
        let config: TracingConfig =
            serde_json::from_str(r#"{"level": "warn", "format": "compact"}"#).unwrap();

        assert_eq!(config.level, Level::WARN);
        assert_eq!(config.format, TracingFormat::Compact);
        assert_eq!(config.env_filter, None);
    }

    #[test]
    fn rejects_unknown_level() {
        let result = serde_json::from_str::<TracingConfig>(r#"{"level": "loud"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn level_serializes_lowercase() {
        let json = serde_json::to_value(TracingConfig::default()).unwrap();
        assert_eq!(json["level"], "info");
        assert_eq!(json["format"], "pretty");
    }

    #[test]
    fn init_twice_is_harmless() {
        let config = TracingConfig::default().with_format(TracingFormat::Compact);
        config.init();
        config.init();
    }
}
