//! TestBundle: writes throwaway APIGEE bundles to disk.

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use thiserror::Error;

use tollgate_compiler::{convert, Conversion, ConvertConfig};

/// Errors from TestBundle operations.
#[derive(Debug, Error)]
pub enum TestError {
    #[error("conversion failed: {0}")]
    Convert(#[from] tollgate_compiler::ConvertError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

struct TestFlow {
    name: String,
    description: String,
    condition: Option<String>,
}

/// Builder for a single-proxy bundle.
///
/// Endpoints are listed in the descriptor in the order they are first
/// mentioned.
pub struct TestBundle {
    proxy: String,
    base_path: String,
    endpoints: Vec<(String, Vec<TestFlow>)>,
}

impl TestBundle {
    pub fn new(proxy: impl Into<String>) -> Self {
        Self {
            proxy: proxy.into(),
            base_path: String::new(),
            endpoints: Vec::new(),
        }
    }

    pub fn base_path(mut self, base_path: impl Into<String>) -> Self {
        self.base_path = base_path.into();
        self
    }

    /// Add a flow to `endpoint`. `None` leaves out the `<Condition>` element.
    pub fn flow(
        mut self,
        endpoint: &str,
        name: &str,
        description: &str,
        condition: Option<&str>,
    ) -> Self {
        let flow = TestFlow {
            name: name.to_string(),
            description: description.to_string(),
            condition: condition.map(str::to_string),
        };
        match self.endpoints.iter_mut().find(|(n, _)| n == endpoint) {
            Some((_, flows)) => flows.push(flow),
            None => self.endpoints.push((endpoint.to_string(), vec![flow])),
        }
        self
    }

    /// Write `<tmp>/apiproxy/<Proxy>.xml` and one `proxies/<endpoint>.xml`
    /// per endpoint.
    pub fn write(&self) -> Result<WrittenBundle, TestError> {
        let temp_dir = TempDir::new()?;
        let root = temp_dir.path().join("apiproxy");
        fs::create_dir_all(root.join("proxies"))?;

        fs::write(
            root.join(format!("{}.xml", self.proxy)),
            self.descriptor_xml(),
        )?;
        for (name, flows) in &self.endpoints {
            fs::write(
                root.join("proxies").join(format!("{}.xml", name)),
                endpoint_xml(name, flows),
            )?;
        }

        Ok(WrittenBundle {
            root,
            _temp_dir: temp_dir,
        })
    }

    fn descriptor_xml(&self) -> String {
        let mut xml = format!(
            "<APIProxy name=\"{}\">\n  <Basepaths>{}</Basepaths>\n  \
             <ConfigurationVersion majorVersion=\"1\" minorVersion=\"0\"/>\n  <ProxyEndpoints>\n",
            escape(&self.proxy),
            escape(&self.base_path)
        );
        for (name, _) in &self.endpoints {
            let _ = writeln!(xml, "    <ProxyEndpoint>{}</ProxyEndpoint>", escape(name));
        }
        xml.push_str("  </ProxyEndpoints>\n</APIProxy>\n");
        xml
    }
}

fn endpoint_xml(name: &str, flows: &[TestFlow]) -> String {
    let mut xml = format!("<ProxyEndpoint name=\"{}\">\n  <Flows>\n", escape(name));
    for flow in flows {
        let _ = writeln!(xml, "    <Flow name=\"{}\">", escape(&flow.name));
        let _ = writeln!(
            xml,
            "      <Description>{}</Description>",
            escape(&flow.description)
        );
        if let Some(condition) = &flow.condition {
            let _ = writeln!(xml, "      <Condition>{}</Condition>", escape(condition));
        }
        xml.push_str("    </Flow>\n");
    }
    xml.push_str("  </Flows>\n</ProxyEndpoint>\n");
    xml
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// A bundle on disk, removed when dropped.
pub struct WrittenBundle {
    root: PathBuf,
    _temp_dir: TempDir,
}

impl WrittenBundle {
    /// The `apiproxy/` directory.
    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Convert the bundle with default settings.
    pub fn convert(&self) -> Result<Conversion, TestError> {
        Ok(convert(&ConvertConfig::new(&self.root))?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tollgate_compiler::{FlowOutcome, HttpVerb, SkipReason};

    #[test]
    fn written_bundle_round_trips_through_conversion() {
        let bundle = TestBundle::new("Shop")
            .base_path("/shop")
            .flow(
                "default",
                "GetItem",
                "Fetch an item",
                Some(r#"(proxy.pathsuffix MatchesPath "/items/*") and (request.verb = "GET")"#),
            )
            .flow("default", "Fallback", "", None)
            .write()
            .unwrap();

        let conversion = bundle.convert().unwrap();
        assert_eq!(conversion.document.base_path, "/shop");
        assert!(conversion
            .table
            .get("/items/{itemsId}", &HttpVerb::Get)
            .is_some());
        assert_eq!(
            conversion.report.flows[1].outcome,
            FlowOutcome::Skipped(SkipReason::MissingPath)
        );
    }

    #[test]
    fn conditions_with_markup_characters_are_escaped() {
        let bundle = TestBundle::new("Shop")
            .flow(
                "default",
                "Either",
                "A & B",
                Some(r#"(proxy.pathsuffix MatchesPath "/a") && (request.verb = "GET")"#),
            )
            .write()
            .unwrap();

        let conversion = bundle.convert().unwrap();
        let op = conversion.document.paths["/a"].get.as_ref().unwrap();
        assert_eq!(op.description, "A & B");
    }

    #[test]
    fn endpoints_keep_first_mention_order() {
        let bundle = TestBundle::new("Shop")
            .flow("b", "One", "", Some(r#"(proxy.pathsuffix MatchesPath "/x") and (request.verb = "GET")"#))
            .flow("a", "Two", "", Some(r#"(proxy.pathsuffix MatchesPath "/x") and (request.verb = "GET")"#))
            .write()
            .unwrap();

        let conversion = bundle.convert().unwrap();
        let endpoints: Vec<&str> = conversion
            .report
            .flows
            .iter()
            .map(|f| f.endpoint.as_str())
            .collect();
        assert_eq!(endpoints, ["b", "a"]);
        let op = conversion.document.paths["/x"].get.as_ref().unwrap();
        assert_eq!(op.operation_id, "Two");
    }
}
