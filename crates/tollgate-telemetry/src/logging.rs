//! Structured logging.
//!
//! Every layer writes to stderr: stdout carries the converted document.

use tracing_subscriber::{
    fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer, Registry,
};

use crate::{LogFormat, TelemetryConfig, TelemetryError};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Install the global subscriber.
///
/// `RUST_LOG`, when set and non-empty, replaces `config.log_level`.
pub fn init_logging(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    let directives = match std::env::var(EnvFilter::DEFAULT_ENV) {
        Ok(env) if !env.trim().is_empty() => env,
        _ => config.log_level.clone(),
    };
    let filter = parse_filter(&directives)?;

    let layer = match config.log_format {
        LogFormat::Json => json_layer(),
        LogFormat::Pretty => pretty_layer(config.ansi),
    };

    tracing_subscriber::registry()
        .with(layer.with_filter(filter))
        .try_init()
        .map_err(|e| TelemetryError::LoggingInit(e.to_string()))
}

/// Parse `EnvFilter` directives (`"info"`, `"warn,tollgate_compiler=debug"`).
pub fn parse_filter(directives: &str) -> Result<EnvFilter, TelemetryError> {
    EnvFilter::try_new(directives).map_err(|e| TelemetryError::InvalidFilter {
        directives: directives.to_string(),
        reason: e.to_string(),
    })
}

/// One flat JSON object per event.
fn json_layer() -> BoxedLayer {
    fmt::layer()
        .json()
        .with_writer(std::io::stderr)
        .flatten_event(true)
        .with_current_span(false)
        .with_span_list(false)
        .boxed()
}

/// Compact single-line output without timestamps.
fn pretty_layer(ansi: bool) -> BoxedLayer {
    fmt::layer()
        .compact()
        .with_writer(std::io::stderr)
        .with_ansi(ansi)
        .with_target(false)
        .without_time()
        .boxed()
}

/// Standard log event names.
pub mod events {
    /// A bundle conversion is starting.
    pub const CONVERSION_STARTED: &str = "conversion_started";

    /// A proxy endpoint is being folded into the route table.
    pub const ENDPOINT_LOADED: &str = "endpoint_loaded";

    /// A flow contributed no route because its condition names no path.
    pub const FLOW_SKIPPED: &str = "flow_skipped";

    /// A flow matched a path but names no method, so the path stays unrouted.
    pub const FLOW_UNROUTED: &str = "flow_unrouted";

    /// A flow was rejected because its condition or path is invalid.
    pub const FLOW_REJECTED: &str = "flow_rejected";

    /// A later flow replaced an earlier one at the same path and method.
    pub const ROUTE_REPLACED: &str = "route_replaced";

    /// A flow routed to a method the document has no slot for.
    pub const ROUTE_DROPPED: &str = "route_dropped";

    /// A bundle conversion finished.
    pub const CONVERSION_COMPLETED: &str = "conversion_completed";
}

// One macro per event keeps the `event` field and level consistent at
// every call site.

#[macro_export]
macro_rules! log_conversion_started {
    ($($field:tt)*) => {
        tracing::info!(event = $crate::logging::events::CONVERSION_STARTED, $($field)*)
    };
}

#[macro_export]
macro_rules! log_endpoint_loaded {
    ($($field:tt)*) => {
        tracing::debug!(event = $crate::logging::events::ENDPOINT_LOADED, $($field)*)
    };
}

#[macro_export]
macro_rules! log_flow_skipped {
    ($($field:tt)*) => {
        tracing::debug!(event = $crate::logging::events::FLOW_SKIPPED, $($field)*)
    };
}

#[macro_export]
macro_rules! log_flow_unrouted {
    ($($field:tt)*) => {
        tracing::info!(event = $crate::logging::events::FLOW_UNROUTED, $($field)*)
    };
}

#[macro_export]
macro_rules! log_flow_rejected {
    ($($field:tt)*) => {
        tracing::warn!(event = $crate::logging::events::FLOW_REJECTED, $($field)*)
    };
}

#[macro_export]
macro_rules! log_route_replaced {
    ($($field:tt)*) => {
        tracing::info!(event = $crate::logging::events::ROUTE_REPLACED, $($field)*)
    };
}

#[macro_export]
macro_rules! log_route_dropped {
    ($($field:tt)*) => {
        tracing::info!(event = $crate::logging::events::ROUTE_DROPPED, $($field)*)
    };
}

#[macro_export]
macro_rules! log_conversion_completed {
    ($($field:tt)*) => {
        tracing::info!(event = $crate::logging::events::CONVERSION_COMPLETED, $($field)*)
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_accepts_levels_and_targets() {
        assert!(parse_filter("warn").is_ok());
        assert!(parse_filter("info,tollgate_compiler=debug").is_ok());
    }

    #[test]
    fn filter_rejects_unknown_level() {
        let err = parse_filter("tollgate_compiler=loud").unwrap_err();
        assert!(matches!(err, TelemetryError::InvalidFilter { .. }));
        assert!(err.to_string().contains("tollgate_compiler=loud"));
    }

    #[test]
    fn event_names_are_snake_case() {
        for name in [
            events::CONVERSION_STARTED,
            events::ENDPOINT_LOADED,
            events::FLOW_SKIPPED,
            events::FLOW_UNROUTED,
            events::FLOW_REJECTED,
            events::ROUTE_REPLACED,
            events::ROUTE_DROPPED,
            events::CONVERSION_COMPLETED,
        ] {
            assert!(name.chars().all(|c| c.is_ascii_lowercase() || c == '_'));
        }
    }
}
