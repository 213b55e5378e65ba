//! Bundle conversion: flows to routes to document.

use serde::Serialize;
use tollgate_proxy::Bundle;
use tollgate_telemetry::{
    log_conversion_completed, log_conversion_started, log_endpoint_loaded, log_flow_rejected,
    log_flow_skipped, log_flow_unrouted, log_route_dropped, log_route_replaced,
};

use crate::config::ConvertConfig;
use crate::document::ApiDocument;
use crate::error::ConvertError;
use crate::flow::{route_flow, RouteOutcome, SkipReason};
use crate::table::{InsertOutcome, RouteTable};

/// What happened to one flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowOutcome {
    /// Stored in an empty (path, method) slot.
    Routed { method: String, path: String },
    /// Stored, evicting the operation of an earlier flow.
    Replaced {
        method: String,
        path: String,
        previous: String,
    },
    /// Routed to a method the document has no slot for.
    Dropped { method: String, path: String },
    /// Contributed no route.
    Skipped(SkipReason),
}

impl FlowOutcome {
    /// Short machine-readable status.
    pub fn status(&self) -> &'static str {
        match self {
            Self::Routed { .. } => "routed",
            Self::Replaced { .. } => "replaced",
            Self::Dropped { .. } => "dropped",
            Self::Skipped(_) => "skipped",
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Skipped(reason) if reason.is_error())
    }

    /// Human-readable detail for reports.
    pub fn detail(&self) -> String {
        match self {
            Self::Routed { method, path } => format!("{} {}", method, path),
            Self::Replaced {
                method,
                path,
                previous,
            } => format!("{} {} (replaces {})", method, path, previous),
            Self::Dropped { method, path } => {
                format!("{} {} (unsupported method)", method, path)
            }
            Self::Skipped(reason) => reason.to_string(),
        }
    }
}

/// Per-flow record of a conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowReport {
    pub endpoint: String,
    pub flow: String,
    /// Raw condition text, as found in the endpoint file.
    pub condition: Option<String>,
    pub outcome: FlowOutcome,
}

/// Summary counts for a [`ConversionReport`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReportSummary {
    pub total: usize,
    pub routed: usize,
    pub dropped: usize,
    pub skipped: usize,
    pub errors: usize,
}

/// Every flow of the bundle, in file order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversionReport {
    pub flows: Vec<FlowReport>,
}

impl ConversionReport {
    pub fn summary(&self) -> ReportSummary {
        let mut summary = ReportSummary {
            total: self.flows.len(),
            ..ReportSummary::default()
        };
        for report in &self.flows {
            match &report.outcome {
                FlowOutcome::Routed { .. } | FlowOutcome::Replaced { .. } => summary.routed += 1,
                FlowOutcome::Dropped { .. } => summary.dropped += 1,
                FlowOutcome::Skipped(reason) => {
                    summary.skipped += 1;
                    if reason.is_error() {
                        summary.errors += 1;
                    }
                }
            }
        }
        summary
    }

    /// True when any flow had an invalid condition or path.
    pub fn has_errors(&self) -> bool {
        self.flows.iter().any(|r| r.outcome.is_error())
    }
}

/// Result of converting a bundle.
#[derive(Debug, Clone)]
pub struct Conversion {
    pub document: ApiDocument,
    pub table: RouteTable,
    pub report: ConversionReport,
}

/// Convert a loaded bundle.
///
/// Endpoints are visited in descriptor order and flows in file order, so
/// when two flows share a (path, method) the later one wins.
pub fn convert_bundle(bundle: &Bundle) -> Conversion {
    let proxy = bundle.proxy();
    log_conversion_started!(
        proxy = %proxy.name,
        endpoints = bundle.endpoints().len()
    );

    let mut table = RouteTable::new();
    let mut report = ConversionReport::default();

    for endpoint in bundle.endpoints() {
        log_endpoint_loaded!(endpoint = %endpoint.name, flows = endpoint.flows().len());

        for flow in endpoint.flows() {
            let outcome = match route_flow(flow) {
                RouteOutcome::Routed(entry) => {
                    let method = entry.verb.to_string();
                    let path = entry.path.to_string();
                    let operation_id = entry.operation.operation_id.clone();
                    match table.insert(entry) {
                        InsertOutcome::Inserted => FlowOutcome::Routed { method, path },
                        InsertOutcome::Replaced(previous) => {
                            log_route_replaced!(
                                method = %method,
                                path = %path,
                                operation_id = %operation_id,
                                previous = %previous.operation.operation_id
                            );
                            FlowOutcome::Replaced {
                                method,
                                path,
                                previous: previous.operation.operation_id,
                            }
                        }
                        InsertOutcome::Dropped(_) => {
                            log_route_dropped!(
                                method = %method,
                                path = %path,
                                flow = %flow.name
                            );
                            FlowOutcome::Dropped { method, path }
                        }
                    }
                }
                RouteOutcome::Skipped(reason) => {
                    let condition = flow.condition.as_deref().unwrap_or_default();
                    match &reason {
                        reason if reason.is_error() => log_flow_rejected!(
                            endpoint = %endpoint.name,
                            flow = %flow.name,
                            condition = %condition,
                            error = %reason
                        ),
                        SkipReason::MissingVerb { path } => log_flow_unrouted!(
                            endpoint = %endpoint.name,
                            flow = %flow.name,
                            path = %path
                        ),
                        reason => log_flow_skipped!(
                            endpoint = %endpoint.name,
                            flow = %flow.name,
                            reason = reason.code()
                        ),
                    }
                    FlowOutcome::Skipped(reason)
                }
            };

            report.flows.push(FlowReport {
                endpoint: endpoint.name.clone(),
                flow: flow.name.clone(),
                condition: flow.condition.clone(),
                outcome,
            });
        }
    }

    let document = ApiDocument::build(proxy, &table);
    let summary = report.summary();
    log_conversion_completed!(
        proxy = %proxy.name,
        paths = table.len(),
        operations = table.operation_count(),
        skipped = summary.skipped,
        errors = summary.errors
    );

    Conversion {
        document,
        table,
        report,
    }
}

/// Load the bundle named by `config` and convert it.
pub fn convert(config: &ConvertConfig) -> Result<Conversion, ConvertError> {
    let bundle = Bundle::load(&config.bundle_dir, config.proxy_name.as_deref())?;
    Ok(convert_bundle(&bundle))
}
