//! Flow → route mapping.
//!
//! Reads the routing facts out of a flow's condition: the path-suffix
//! pattern and the request verb. Everything else in the condition is
//! ignored.

use std::fmt;

use thiserror::Error;
use tollgate_proxy::Flow;

use crate::condition::{parse_conditions, ConditionError, NULL_CONDITION};
use crate::template::{template_path, RouteKey, TemplateError};

/// Variable holding the request path below the proxy base path.
pub const PATH_SUFFIX_VARIABLE: &str = "proxy.pathsuffix";

/// Variable holding the request method.
pub const VERB_VARIABLE: &str = "request.verb";

/// `MatchesPath` and its APIGEE aliases (compared case-insensitively).
const PATH_MATCH_OPERATORS: &[&str] = &["MatchesPath", "~/", "LikePath"];

/// Equality operators accepted on the verb clause (compared case-insensitively).
const EQUALITY_OPERATORS: &[&str] = &["=", "==", "equal", "equals", "is"];

/// An HTTP method named by a verb clause.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum HttpVerb {
    Get,
    Put,
    Post,
    Delete,
    Patch,
    Head,
    Options,
    Other(String),
}

impl HttpVerb {
    /// Parse a verb, normalizing to upper case.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_uppercase().as_str() {
            "GET" => Self::Get,
            "PUT" => Self::Put,
            "POST" => Self::Post,
            "DELETE" => Self::Delete,
            "PATCH" => Self::Patch,
            "HEAD" => Self::Head,
            "OPTIONS" => Self::Options,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Get => "GET",
            Self::Put => "PUT",
            Self::Post => "POST",
            Self::Delete => "DELETE",
            Self::Patch => "PATCH",
            Self::Head => "HEAD",
            Self::Options => "OPTIONS",
            Self::Other(verb) => verb,
        }
    }

    /// Whether the route table has a slot for this verb.
    pub fn is_supported(&self) -> bool {
        matches!(self, Self::Get | Self::Put | Self::Post | Self::Delete)
    }
}

impl fmt::Display for HttpVerb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Operation metadata taken from a flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationMeta {
    pub operation_id: String,
    pub summary: String,
    pub description: String,
}

impl OperationMeta {
    /// The flow name is the operation id; the description fills both
    /// `summary` and `description`.
    pub fn from_flow(flow: &Flow) -> Self {
        Self {
            operation_id: flow.name.clone(),
            summary: flow.description.clone(),
            description: flow.description.clone(),
        }
    }
}

/// A routed flow: one operation at one (path, verb).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteEntry {
    pub verb: HttpVerb,
    pub path: RouteKey,
    pub operation: OperationMeta,
}

/// Why a flow contributed no route.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SkipReason {
    /// The condition text does not parse.
    #[error("{0}")]
    InvalidCondition(ConditionError),

    /// No `proxy.pathsuffix MatchesPath` clause.
    #[error("no `proxy.pathsuffix MatchesPath` clause")]
    MissingPath,

    /// The path pattern cannot be templated.
    #[error("{0}")]
    InvalidPath(TemplateError),

    /// A path was found but no `request.verb` clause.
    #[error("no `request.verb` clause for {path}")]
    MissingVerb { path: RouteKey },
}

impl SkipReason {
    /// Invalid input (as opposed to a flow that simply is not a route).
    pub fn is_error(&self) -> bool {
        matches!(self, Self::InvalidCondition(_) | Self::InvalidPath(_))
    }

    /// Short machine-readable tag.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidCondition(_) => "invalid_condition",
            Self::MissingPath => "missing_path",
            Self::InvalidPath(_) => "invalid_path",
            Self::MissingVerb { .. } => "missing_verb",
        }
    }
}

/// Result of routing a single flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteOutcome {
    Routed(RouteEntry),
    Skipped(SkipReason),
}

/// Derive the route of a flow from its condition.
///
/// When several path or verb clauses appear, the last one wins. A flow
/// without a path is skipped before its verb is looked at.
pub fn route_flow(flow: &Flow) -> RouteOutcome {
    let raw = flow.condition.as_deref().unwrap_or(NULL_CONDITION);
    let clauses = match parse_conditions(raw) {
        Ok(clauses) => clauses,
        Err(e) => return RouteOutcome::Skipped(SkipReason::InvalidCondition(e)),
    };

    let mut pattern = None;
    let mut verb = None;
    for clause in &clauses {
        if clause.variable == PATH_SUFFIX_VARIABLE
            && is_one_of(&clause.operator, PATH_MATCH_OPERATORS)
        {
            pattern = Some(clause.value.as_str());
        } else if clause.variable == VERB_VARIABLE
            && is_one_of(&clause.operator, EQUALITY_OPERATORS)
        {
            verb = Some(HttpVerb::parse(&clause.value));
        }
    }

    let Some(pattern) = pattern else {
        return RouteOutcome::Skipped(SkipReason::MissingPath);
    };
    let path = match template_path(pattern) {
        Ok(path) => path,
        Err(e) => return RouteOutcome::Skipped(SkipReason::InvalidPath(e)),
    };
    let Some(verb) = verb else {
        return RouteOutcome::Skipped(SkipReason::MissingVerb { path });
    };

    RouteOutcome::Routed(RouteEntry {
        verb,
        path,
        operation: OperationMeta::from_flow(flow),
    })
}

fn is_one_of(operator: &str, accepted: &[&str]) -> bool {
    accepted.iter().any(|a| a.eq_ignore_ascii_case(operator))
}
