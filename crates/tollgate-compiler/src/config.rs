//! Conversion settings (`tollgate.yaml`).

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConvertError;

/// Serialization format of the output document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Json,
    Yaml,
}

impl OutputFormat {
    /// Parse from string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "json" => Some(Self::Json),
            "yaml" | "yml" => Some(Self::Yaml),
            _ => None,
        }
    }
}

/// What to convert and how to render it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConvertConfig {
    /// The `apiproxy/` directory, or the directory containing it.
    pub bundle_dir: PathBuf,
    /// Proxy descriptor to use (file stem). Required when the bundle holds
    /// more than one descriptor.
    pub proxy_name: Option<String>,
    pub output_format: OutputFormat,
    /// Pretty-print JSON output.
    pub pretty: bool,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            bundle_dir: PathBuf::from("apiproxy"),
            proxy_name: None,
            output_format: OutputFormat::Json,
            pretty: true,
        }
    }
}

impl ConvertConfig {
    /// Create a config for the given bundle directory.
    pub fn new(bundle_dir: impl Into<PathBuf>) -> Self {
        Self {
            bundle_dir: bundle_dir.into(),
            ..Self::default()
        }
    }

    /// Set the proxy name.
    pub fn with_proxy_name(mut self, name: impl Into<String>) -> Self {
        self.proxy_name = Some(name.into());
        self
    }

    /// Set the output format.
    pub fn with_output_format(mut self, format: OutputFormat) -> Self {
        self.output_format = format;
        self
    }

    /// Enable or disable pretty-printing.
    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    /// Parse a config from YAML.
    ///
    /// A relative `bundle_dir` is resolved against the directory of `path`.
    pub fn parse(content: &str, path: &Path) -> Result<Self, ConvertError> {
        let mut config: ConvertConfig = serde_yaml::from_str(content).map_err(|e| {
            ConvertError::Config(format!("failed to parse {}: {}", path.display(), e))
        })?;

        if config.bundle_dir.is_relative() {
            if let Some(base) = path.parent() {
                config.bundle_dir = base.join(&config.bundle_dir);
            }
        }

        Ok(config)
    }

    /// Load a config file from disk.
    pub fn load(path: &Path) -> Result<Self, ConvertError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ConvertError::Config(format!("failed to read {}: {}", path.display(), e))
        })?;
        Self::parse(&content, path)
    }
}
