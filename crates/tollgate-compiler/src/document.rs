//! The output document: a Swagger 2.0 shaped API description.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tollgate_proxy::ApiProxy;

use crate::config::OutputFormat;
use crate::error::ConvertError;
use crate::flow::RouteEntry;
use crate::table::{PathOperations, RouteTable};

/// Value of the root `swagger` field.
pub const SWAGGER_VERSION: &str = "2.0";

/// The converted API description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiDocument {
    pub swagger: String,
    pub info: Info,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub base_path: String,
    #[serde(default)]
    pub paths: BTreeMap<String, PathItem>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Info {
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default)]
    pub version: String,
}

/// The operations of one path.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PathItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub get: Option<Operation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub put: Option<Operation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post: Option<Operation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delete: Option<Operation>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub operation_id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub summary: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<Parameter>,
}

/// A path parameter declared for a template placeholder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    #[serde(rename = "in")]
    pub location: String,
    pub required: bool,
    #[serde(rename = "type")]
    pub param_type: String,
}

impl Parameter {
    fn path(name: &str) -> Self {
        Self {
            name: name.to_string(),
            location: "path".to_string(),
            required: true,
            param_type: "string".to_string(),
        }
    }
}

impl Operation {
    fn from_entry(entry: &RouteEntry) -> Self {
        Self {
            operation_id: entry.operation.operation_id.clone(),
            summary: entry.operation.summary.clone(),
            description: entry.operation.description.clone(),
            parameters: entry
                .path
                .parameters()
                .into_iter()
                .map(Parameter::path)
                .collect(),
        }
    }
}

impl PathItem {
    fn from_operations(ops: &PathOperations) -> Self {
        Self {
            get: ops.get.as_ref().map(Operation::from_entry),
            put: ops.put.as_ref().map(Operation::from_entry),
            post: ops.post.as_ref().map(Operation::from_entry),
            delete: ops.delete.as_ref().map(Operation::from_entry),
        }
    }
}

impl ApiDocument {
    /// Build the document for a proxy from its route table.
    pub fn build(proxy: &ApiProxy, table: &RouteTable) -> Self {
        let paths = table
            .paths()
            .map(|(key, ops)| (key.to_string(), PathItem::from_operations(ops)))
            .collect();

        Self {
            swagger: SWAGGER_VERSION.to_string(),
            info: Info {
                title: proxy.title().to_string(),
                description: proxy.description.trim().to_string(),
                version: proxy.version_string(),
            },
            base_path: proxy.basepaths.clone(),
            paths,
        }
    }

    /// Serialize as JSON.
    pub fn to_json(&self, pretty: bool) -> Result<String, ConvertError> {
        let json = if pretty {
            serde_json::to_string_pretty(self)?
        } else {
            serde_json::to_string(self)?
        };
        Ok(json)
    }

    /// Serialize as YAML.
    pub fn to_yaml(&self) -> Result<String, ConvertError> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Serialize in the requested format. `pretty` only affects JSON.
    pub fn render(&self, format: OutputFormat, pretty: bool) -> Result<String, ConvertError> {
        match format {
            OutputFormat::Json => self.to_json(pretty),
            OutputFormat::Yaml => self.to_yaml(),
        }
    }
}
