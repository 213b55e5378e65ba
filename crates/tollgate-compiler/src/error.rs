use thiserror::Error;

/// Errors that abort a conversion.
///
/// Problems confined to a single flow are not errors here; they are
/// recorded in the conversion report instead.
#[derive(Debug, Error)]
pub enum ConvertError {
    /// The bundle could not be read or decoded.
    #[error(transparent)]
    Decode(#[from] tollgate_proxy::DecodeError),

    /// E3010: Configuration file parsing or loading error.
    #[error("E3010: config error: {0}")]
    Config(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML serialization error.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}
