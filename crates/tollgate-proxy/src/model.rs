use serde::Deserialize;

/// The proxy descriptor (`apiproxy/<ProxyName>.xml`).
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ApiProxy {
    /// The proxy name attribute.
    #[serde(rename = "@name")]
    pub name: String,
    /// The exported revision number.
    #[serde(rename = "@revision")]
    pub revision: Option<String>,
    /// Base path(s) the proxy is mounted on (e.g. "/v1/petstore").
    #[serde(rename = "Basepaths")]
    pub basepaths: String,
    #[serde(rename = "ConfigurationVersion")]
    pub version: ConfigurationVersion,
    /// Creation time in epoch milliseconds.
    #[serde(rename = "CreatedAt")]
    pub created_at: Option<u64>,
    #[serde(rename = "CreatedBy")]
    pub created_by: Option<String>,
    #[serde(rename = "Description")]
    pub description: String,
    #[serde(rename = "DisplayName")]
    pub display_name: String,
    /// Last modification time in epoch milliseconds.
    #[serde(rename = "LastModifiedAt")]
    pub last_modified_at: Option<u64>,
    #[serde(rename = "LastModifiedBy")]
    pub last_modified_by: Option<String>,
    #[serde(rename = "ManifestVersion")]
    pub manifest_version: Option<String>,
    #[serde(rename = "Policies")]
    pub policies: PolicyList,
    #[serde(rename = "ProxyEndpoints")]
    pub proxy_endpoints: ProxyEndpointList,
    #[serde(rename = "Resources")]
    pub resources: ResourceList,
    #[serde(rename = "Spec")]
    pub spec: Option<String>,
    #[serde(rename = "TargetServers")]
    pub target_servers: TargetServerList,
    #[serde(rename = "TargetEndpoints")]
    pub target_endpoints: TargetEndpointList,
}

impl ApiProxy {
    /// Names of the proxy endpoint files (without the `.xml` suffix).
    pub fn endpoint_names(&self) -> &[String] {
        &self.proxy_endpoints.names
    }

    /// Names of the policies attached to this proxy.
    pub fn policy_names(&self) -> &[String] {
        &self.policies.names
    }

    /// The API version as `"<major>.<minor>"`.
    pub fn version_string(&self) -> String {
        format!("{}.{}", self.version.major, self.version.minor)
    }

    /// A human-readable title: the display name, falling back to the proxy name.
    pub fn title(&self) -> &str {
        if self.display_name.trim().is_empty() {
            &self.name
        } else {
            &self.display_name
        }
    }
}

/// The `ConfigurationVersion` element.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ConfigurationVersion {
    #[serde(rename = "@majorVersion")]
    pub major: String,
    #[serde(rename = "@minorVersion")]
    pub minor: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct PolicyList {
    #[serde(rename = "Policy")]
    pub names: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ProxyEndpointList {
    #[serde(rename = "ProxyEndpoint")]
    pub names: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ResourceList {
    #[serde(rename = "Resource")]
    pub names: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct TargetServerList {
    #[serde(rename = "TargetServer")]
    pub names: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct TargetEndpointList {
    #[serde(rename = "TargetEndpoint")]
    pub names: Vec<String>,
}

/// A proxy endpoint file (`apiproxy/proxies/<endpoint>.xml`).
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ProxyEndpoint {
    #[serde(rename = "@name")]
    pub name: String,
    #[serde(rename = "Description")]
    pub description: Option<String>,
    #[serde(rename = "PreFlow")]
    pub pre_flow: Option<FlowStage>,
    #[serde(rename = "PostFlow")]
    pub post_flow: Option<FlowStage>,
    #[serde(rename = "Flows")]
    pub flows: FlowList,
}

impl ProxyEndpoint {
    /// The conditional flows of this endpoint, in document order.
    pub fn flows(&self) -> &[Flow] {
        &self.flows.flows
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct FlowList {
    #[serde(rename = "Flow")]
    pub flows: Vec<Flow>,
}

/// An unconditional stage (`PreFlow` / `PostFlow`).
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct FlowStage {
    #[serde(rename = "@name")]
    pub name: String,
    #[serde(rename = "Request")]
    pub request: StepList,
    #[serde(rename = "Response")]
    pub response: StepList,
}

/// A named, conditional flow.
///
/// `condition` is the raw condition text exactly as found in the document
/// (minus surrounding whitespace). `None` means the element was absent.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Flow {
    #[serde(rename = "@name")]
    pub name: String,
    #[serde(rename = "Description")]
    pub description: String,
    #[serde(rename = "Request")]
    pub request: StepList,
    #[serde(rename = "Response")]
    pub response: StepList,
    #[serde(rename = "Condition")]
    pub condition: Option<String>,
}

impl Flow {
    /// Create a flow with a name, description and raw condition.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        condition: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            condition: Some(condition.into()),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct StepList {
    #[serde(rename = "Step")]
    pub steps: Vec<Step>,
}

impl StepList {
    /// Step (policy) names in execution order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.steps.iter().map(|s| s.name.as_str())
    }
}

/// A policy execution step.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Step {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Condition")]
    pub condition: Option<String>,
}
