use std::path::{Path, PathBuf};

use crate::error::DecodeError;
use crate::model::{ApiProxy, ProxyEndpoint};

/// Directory (inside the bundle) holding the proxy endpoint files.
const PROXIES_DIR: &str = "proxies";

/// Name of the directory an APIGEE export wraps the bundle in.
const BUNDLE_DIR: &str = "apiproxy";

/// Decode a proxy descriptor from its XML text.
///
/// `document` names the source in error messages.
pub fn parse_proxy(input: &str, document: &str) -> Result<ApiProxy, DecodeError> {
    let mut proxy: ApiProxy = quick_xml::de::from_str(input).map_err(|source| DecodeError::Xml {
        document: document.to_string(),
        source,
    })?;

    proxy.basepaths = proxy.basepaths.trim().to_string();
    for name in &mut proxy.proxy_endpoints.names {
        *name = name.trim().to_string();
    }
    proxy.proxy_endpoints.names.retain(|n| !n.is_empty());

    Ok(proxy)
}

/// Decode a proxy endpoint from its XML text.
///
/// Flow conditions are kept verbatim apart from surrounding whitespace.
pub fn parse_endpoint(input: &str, document: &str) -> Result<ProxyEndpoint, DecodeError> {
    let mut endpoint: ProxyEndpoint =
        quick_xml::de::from_str(input).map_err(|source| DecodeError::Xml {
            document: document.to_string(),
            source,
        })?;

    for flow in &mut endpoint.flows.flows {
        flow.name = flow.name.trim().to_string();
        flow.description = flow.description.trim().to_string();
        if let Some(condition) = flow.condition.as_mut() {
            *condition = condition.trim().to_string();
        }
    }

    Ok(endpoint)
}

fn read_document(path: &Path) -> Result<String, DecodeError> {
    std::fs::read_to_string(path).map_err(|source| DecodeError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// A fully decoded bundle: the proxy descriptor and every endpoint it lists.
#[derive(Debug, Clone)]
pub struct Bundle {
    root: PathBuf,
    descriptor: PathBuf,
    proxy: ApiProxy,
    endpoints: Vec<ProxyEndpoint>,
}

impl Bundle {
    /// Load a bundle from disk.
    ///
    /// `dir` is either the `apiproxy/` directory itself or a directory that
    /// contains it. With `proxy_name` unset the bundle must hold exactly one
    /// top-level `*.xml` descriptor. Any unreadable or malformed document
    /// aborts the load.
    pub fn load(dir: &Path, proxy_name: Option<&str>) -> Result<Self, DecodeError> {
        let root = resolve_root(dir);
        let descriptor = locate_descriptor(&root, proxy_name)?;
        let document = descriptor.display().to_string();
        let proxy = parse_proxy(&read_document(&descriptor)?, &document)?;

        tracing::debug!(
            proxy = %proxy.name,
            endpoints = proxy.endpoint_names().len(),
            "decoded proxy descriptor"
        );

        let mut endpoints = Vec::with_capacity(proxy.endpoint_names().len());
        for name in proxy.endpoint_names() {
            let path = root.join(PROXIES_DIR).join(format!("{}.xml", name));
            let document = path.display().to_string();
            let endpoint = parse_endpoint(&read_document(&path)?, &document)?;
            tracing::debug!(
                endpoint = %name,
                flows = endpoint.flows().len(),
                "decoded proxy endpoint"
            );
            endpoints.push(endpoint);
        }

        Ok(Self {
            root,
            descriptor,
            proxy,
            endpoints,
        })
    }

    /// Build a bundle from already-decoded parts.
    pub fn from_parts(proxy: ApiProxy, endpoints: Vec<ProxyEndpoint>) -> Self {
        Self {
            root: PathBuf::new(),
            descriptor: PathBuf::new(),
            proxy,
            endpoints,
        }
    }

    /// The bundle directory the documents were read from.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the proxy descriptor.
    pub fn descriptor(&self) -> &Path {
        &self.descriptor
    }

    pub fn proxy(&self) -> &ApiProxy {
        &self.proxy
    }

    /// Endpoints in the order the descriptor lists them.
    pub fn endpoints(&self) -> &[ProxyEndpoint] {
        &self.endpoints
    }
}

/// Descend into `apiproxy/` when handed the export directory.
fn resolve_root(dir: &Path) -> PathBuf {
    let nested = dir.join(BUNDLE_DIR);
    if nested.is_dir() {
        nested
    } else {
        dir.to_path_buf()
    }
}

/// Find the proxy descriptor in the bundle root.
fn locate_descriptor(root: &Path, proxy_name: Option<&str>) -> Result<PathBuf, DecodeError> {
    if let Some(name) = proxy_name {
        let path = root.join(format!("{}.xml", name));
        if path.is_file() {
            return Ok(path);
        }
        return Err(DecodeError::ProxyNotFound(path.display().to_string()));
    }

    let entries = std::fs::read_dir(root).map_err(|source| DecodeError::Io {
        path: root.to_path_buf(),
        source,
    })?;

    let mut candidates = Vec::new();
    for entry in entries {
        let path = entry
            .map_err(|source| DecodeError::Io {
                path: root.to_path_buf(),
                source,
            })?
            .path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "xml") {
            candidates.push(path);
        }
    }
    candidates.sort();

    match candidates.len() {
        0 => Err(DecodeError::ProxyNotFound(format!(
            "no *.xml descriptor in {}",
            root.display()
        ))),
        1 => Ok(candidates.remove(0)),
        _ => Err(DecodeError::AmbiguousProxy(
            candidates
                .iter()
                .filter_map(|p| p.file_stem().and_then(|s| s.to_str()))
                .map(|s| s.to_string())
                .collect(),
        )),
    }
}
