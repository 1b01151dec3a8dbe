//! Fragments
//!
//! A fragment is a scoped script plus its parent container. Collection
//! turns each one into a `PendingFragment` that waits for its claim.

use std::collections::BTreeMap;
use std::fmt;

use islet_dom::NodeId;
use islet_handler::{HandlerError, Program};

use crate::ScopeError;

/// Stable fragment identifier, assigned in collection order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FragmentId(pub u32);

impl fmt::Display for FragmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Name-to-element mapping handed to a scoped script when it claims
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NamedElements(BTreeMap<String, NodeId>);

impl NamedElements {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a name; a later element with the same name replaces an earlier one
    pub fn insert(&mut self, name: &str, element: NodeId) -> Option<NodeId> {
        self.0.insert(name.to_string(), element)
    }

    pub fn get(&self, name: &str) -> Option<NodeId> {
        self.0.get(name).copied()
    }

    /// Like `get`, for scripts that cannot work without the element
    pub fn require(&self, name: &str) -> Result<NodeId, ScopeError> {
        self.get(name).ok_or_else(|| ScopeError::MissingName(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, NodeId)> {
        self.0.iter().map(|(k, &v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl IntoIterator for NamedElements {
    type Item = (String, NodeId);
    type IntoIter = std::collections::btree_map::IntoIter<String, NodeId>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// A collected fragment waiting for its script to claim it
#[derive(Debug, Clone)]
pub struct PendingFragment {
    pub id: FragmentId,
    /// The `<script scoped>` element
    pub script: NodeId,
    /// The script's parent element
    pub container: NodeId,
    pub named: NamedElements,
    /// Event-bound elements in document order
    pub event_bound: Vec<NodeId>,
}

/// One `on*` attribute of an event-bound element, parsed at collection
#[derive(Debug, Clone)]
pub struct CompiledHandler {
    /// Event name ("click" for `onclick`)
    pub event: String,
    /// Attribute the source came from
    pub attribute: String,
    /// Parsed program, or why the source did not parse
    pub program: Result<Program, HandlerError>,
}

impl CompiledHandler {
    pub fn is_valid(&self) -> bool {
        self.program.is_ok()
    }
}
