//! Tracing/logging initialization.
//!
//! Filtering follows `RUST_LOG`; the output format follows `BINDY_LOG_FORMAT`
//! (`json`, the default, or `pretty`).

use thiserror::Error;
use tracing_subscriber::EnvFilter;

pub const FORMAT_ENV: &str = "BINDY_LOG_FORMAT";

#[derive(Debug, Error)]
pub enum ObservabilityError {
    #[error("invalid log filter `{directive}`: {reason}")]
    InvalidFilter { directive: String, reason: String },
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Json,
    Pretty,
}

impl LogFormat {
    /// Unknown values fall back to JSON.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "pretty" | "text" => LogFormat::Pretty,
            _ => LogFormat::Json,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObservabilityConfig {
    /// `EnvFilter` directive, e.g. `info` or `bindy=trace`.
    pub filter: String,
    pub format: LogFormat,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            format: LogFormat::Json,
        }
    }
}

impl ObservabilityConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            filter: std::env::var(EnvFilter::DEFAULT_ENV).unwrap_or(defaults.filter),
            format: std::env::var(FORMAT_ENV)
                .map(|v| LogFormat::parse(&v))
                .unwrap_or(defaults.format),
        }
    }
}

/// Initialize tracing/logging for the process from the environment.
///
/// Safe to call multiple times (subsequent calls are no-ops). A malformed
/// `RUST_LOG` falls back to `info`.
pub fn init() {
    let config = ObservabilityConfig::from_env();
    if init_with(&config).is_err() {
        let _ = init_with(&ObservabilityConfig {
            format: config.format,
            ..ObservabilityConfig::default()
        });
    }
}

/// Initialize tracing/logging with an explicit configuration.
///
/// Returns an error only for a filter that does not parse; a subscriber that
/// is already installed is left in place.
pub fn init_with(config: &ObservabilityConfig) -> Result<(), ObservabilityError> {
    let filter = EnvFilter::try_new(&config.filter).map_err(|e| ObservabilityError::InvalidFilter {
        directive: config.filter.clone(),
        reason: e.to_string(),
    })?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_timer(tracing_subscriber::fmt::time::SystemTime)
        .with_target(false);

    let _ = match config.format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
    };
    Ok(())
}
