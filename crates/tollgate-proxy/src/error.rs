use std::path::PathBuf;

use thiserror::Error;

/// Errors produced while reading an APIGEE bundle (E3001–E3004).
#[derive(Debug, Error)]
pub enum DecodeError {
    /// E3001: A bundle document could not be read.
    #[error("E3001: cannot read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// E3002: A bundle document is not well-formed or has an unexpected shape.
    #[error("E3002: malformed document {document}: {source}")]
    Xml {
        document: String,
        #[source]
        source: quick_xml::DeError,
    },

    /// E3003: No proxy descriptor was found in the bundle directory.
    #[error("E3003: no proxy descriptor found: {0}")]
    ProxyNotFound(String),

    /// E3004: Several proxy descriptors were found and none was selected.
    #[error("E3004: bundle holds several proxy descriptors ({}); pick one with --proxy", .0.join(", "))]
    AmbiguousProxy(Vec<String>),
}
