//! Path → method → operation table.

use std::collections::BTreeMap;

use crate::flow::{HttpVerb, RouteEntry};
use crate::template::RouteKey;

/// The operations registered on one path, one slot per supported verb.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathOperations {
    pub get: Option<RouteEntry>,
    pub put: Option<RouteEntry>,
    pub post: Option<RouteEntry>,
    pub delete: Option<RouteEntry>,
}

impl PathOperations {
    fn slot_mut(&mut self, verb: &HttpVerb) -> Option<&mut Option<RouteEntry>> {
        match verb {
            HttpVerb::Get => Some(&mut self.get),
            HttpVerb::Put => Some(&mut self.put),
            HttpVerb::Post => Some(&mut self.post),
            HttpVerb::Delete => Some(&mut self.delete),
            _ => None,
        }
    }

    /// The entry registered for `verb`, if any.
    pub fn for_verb(&self, verb: &HttpVerb) -> Option<&RouteEntry> {
        match verb {
            HttpVerb::Get => self.get.as_ref(),
            HttpVerb::Put => self.put.as_ref(),
            HttpVerb::Post => self.post.as_ref(),
            HttpVerb::Delete => self.delete.as_ref(),
            _ => None,
        }
    }

    /// Registered entries in GET, PUT, POST, DELETE order.
    pub fn iter(&self) -> impl Iterator<Item = &RouteEntry> {
        [&self.get, &self.put, &self.post, &self.delete]
            .into_iter()
            .flatten()
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// What [`RouteTable::insert`] did with an entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertOutcome {
    /// The (path, verb) slot was empty.
    Inserted,
    /// The slot held an entry; it was replaced and is returned here.
    Replaced(RouteEntry),
    /// The verb has no slot; the entry is handed back unstored.
    Dropped(RouteEntry),
}

/// Route table for a whole proxy, ordered by path.
///
/// Paths only exist with at least one operation, and keys are
/// [`RouteKey`]s, so no key holds a wildcard.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteTable {
    paths: BTreeMap<RouteKey, PathOperations>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an entry at its (path, verb). Last write wins.
    pub fn insert(&mut self, entry: RouteEntry) -> InsertOutcome {
        if !entry.verb.is_supported() {
            return InsertOutcome::Dropped(entry);
        }

        let operations = self.paths.entry(entry.path.clone()).or_default();
        match operations.slot_mut(&entry.verb) {
            Some(slot) => match slot.replace(entry) {
                Some(previous) => InsertOutcome::Replaced(previous),
                None => InsertOutcome::Inserted,
            },
            None => InsertOutcome::Dropped(entry),
        }
    }

    /// Look up the entry at (path, verb).
    pub fn get(&self, path: &str, verb: &HttpVerb) -> Option<&RouteEntry> {
        self.paths.get(path).and_then(|ops| ops.for_verb(verb))
    }

    /// Paths with their operations, in path order.
    pub fn paths(&self) -> impl Iterator<Item = (&RouteKey, &PathOperations)> {
        self.paths.iter()
    }

    /// Number of distinct paths.
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Number of stored operations across all paths.
    pub fn operation_count(&self) -> usize {
        self.paths.values().map(PathOperations::len).sum()
    }
}
