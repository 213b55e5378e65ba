//! Converts APIGEE proxy bundles into Swagger 2.0 documents.
//!
//! Each conditional flow of each proxy endpoint is parsed into condition
//! clauses, its path-match clause is turned into a path template, and the
//! resulting (path, method) pairs are collected into a route table that
//! becomes the `paths` of the output document.

pub mod condition;
pub mod config;
pub mod convert;
pub mod document;
pub mod error;
pub mod flow;
pub mod table;
pub mod template;

pub use condition::{parse_conditions, ConditionClause, ConditionError, ConditionErrorKind};
pub use config::{ConvertConfig, OutputFormat};
pub use convert::{
    convert, convert_bundle, Conversion, ConversionReport, FlowOutcome, FlowReport, ReportSummary,
};
pub use document::{ApiDocument, Info, Operation, Parameter, PathItem, SWAGGER_VERSION};
pub use error::ConvertError;
pub use flow::{route_flow, HttpVerb, OperationMeta, RouteEntry, RouteOutcome, SkipReason};
pub use table::{InsertOutcome, PathOperations, RouteTable};
pub use template::{template_path, RouteKey, TemplateError};
// Re-export the bundle reader so callers need only this crate
pub use tollgate_proxy::{Bundle, DecodeError};
