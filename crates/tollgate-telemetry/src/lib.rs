//! Logging for tollgate.
//!
//! Installs a `tracing-subscriber` that writes pretty or JSON lines to
//! stderr, and defines the standard conversion events together with one
//! logging macro per event.
//!
//! ```ignore
//! use tollgate_telemetry::{LogFormat, TelemetryConfig};
//!
//! tollgate_telemetry::init(
//!     &TelemetryConfig::new()
//!         .with_log_level("info")
//!         .with_log_format(LogFormat::Json),
//! )?;
//! tollgate_telemetry::log_conversion_started!(proxy = "Petstore", endpoints = 1);
//! ```

pub mod config;
pub mod logging;

pub use config::{LogFormat, TelemetryConfig};
pub use logging::{events, parse_filter};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TelemetryError {
    /// The level string is not a valid filter.
    #[error("invalid log filter `{directives}`: {reason}")]
    InvalidFilter { directives: String, reason: String },

    /// A global subscriber is already installed.
    #[error("logging setup failed: {0}")]
    LoggingInit(String),
}

/// Initialize logging. Fails if a global subscriber is already installed.
pub fn init(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    logging::init_logging(config)
}
