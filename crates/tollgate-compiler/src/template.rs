//! Wildcard path → route template conversion.
//!
//! APIGEE matches path suffixes with `*` segments (`/pets/*`). OpenAPI wants
//! named parameters, so each `*` becomes `{<previous segment>Id}`.

use std::borrow::Borrow;
use std::collections::HashSet;
use std::fmt;

use thiserror::Error;

/// A single-segment wildcard.
pub const WILDCARD: &str = "*";

/// Parameter name used when a wildcard has no usable predecessor.
pub const FALLBACK_PARAM: &str = "id";

/// E2002: a path pattern cannot be expressed as a route template.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    #[error("E2002: unsupported wildcard segment `{segment}` in `{path}`")]
    UnsupportedWildcard { path: String, segment: String },
}

/// A path template with `{name}` placeholders.
///
/// Only [`template_path`] builds one, so a `RouteKey` never holds a `*`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RouteKey(String);

impl RouteKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Placeholder names, in path order.
    pub fn parameters(&self) -> Vec<&str> {
        self.0.split('/').filter_map(placeholder_name).collect()
    }
}

impl fmt::Display for RouteKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for RouteKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for RouteKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Convert a `MatchesPath` pattern into a route template.
///
/// Every `*` segment is named after the raw segment right before it
/// (`/pets/*/toys/*` → `/pets/{petsId}/toys/{toysId}`). A wildcard with no
/// predecessor, an empty one, or one that is itself a wildcard or a
/// placeholder is named `id`. Names already taken in the template get a
/// numeric suffix (`id2`, `id3`, ...). Any other segment containing `*`
/// (such as APIGEE's multi-segment `**`) is rejected.
pub fn template_path(pattern: &str) -> Result<RouteKey, TemplateError> {
    let pattern = pattern.trim();
    let segments: Vec<&str> = pattern.split('/').collect();

    let mut used: HashSet<String> = segments
        .iter()
        .filter_map(|s| placeholder_name(s))
        .map(|s| s.to_string())
        .collect();

    let mut templated = Vec::with_capacity(segments.len());
    for (i, segment) in segments.iter().enumerate() {
        if *segment == WILDCARD {
            let previous = i.checked_sub(1).map(|p| segments[p]);
            let base = match previous {
                Some(prev) if is_nameable(prev) => format!("{}Id", prev),
                _ => FALLBACK_PARAM.to_string(),
            };
            templated.push(format!("{{{}}}", unique_name(base, &mut used)));
        } else if segment.contains('*') {
            return Err(TemplateError::UnsupportedWildcard {
                path: pattern.to_string(),
                segment: segment.to_string(),
            });
        } else {
            templated.push(segment.to_string());
        }
    }

    Ok(RouteKey(templated.join("/")))
}

fn is_nameable(segment: &str) -> bool {
    !segment.is_empty() && !segment.contains('*') && placeholder_name(segment).is_none()
}

fn placeholder_name(segment: &str) -> Option<&str> {
    segment
        .strip_prefix('{')
        .and_then(|s| s.strip_suffix('}'))
}

fn unique_name(base: String, used: &mut HashSet<String>) -> String {
    if used.insert(base.clone()) {
        return base;
    }
    let mut n = 2;
    loop {
        let candidate = format!("{}{}", base, n);
        if used.insert(candidate.clone()) {
            return candidate;
        }
        n += 1;
    }
}
