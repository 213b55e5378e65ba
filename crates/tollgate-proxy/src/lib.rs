//! APIGEE proxy bundle reader.
//!
//! Decodes the proxy descriptor (`<ProxyName>.xml`) and the proxy endpoint
//! files (`proxies/<endpoint>.xml`) of an exported `apiproxy/` bundle into
//! plain structs. Flow conditions are kept as opaque strings; interpreting
//! them is the compiler's job.

pub mod error;
pub mod model;
pub mod parser;

pub use error::DecodeError;
pub use model::{
    ApiProxy, ConfigurationVersion, Flow, FlowList, FlowStage, ProxyEndpoint, Step, StepList,
};
pub use parser::{parse_endpoint, parse_proxy, Bundle};
