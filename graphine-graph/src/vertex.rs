//! Vertex identifiers, vertex payloads and borrowed vertex views.
//!
//! A vertex never owns its neighbours. Connections live in the owning
//! [`DependencyGraph`] as edges between node indexes, so a [`Vertex`] is just
//! its identifier plus an opaque metadata bag.

use crate::error::{GraphError, GraphResult};
use crate::graph::DependencyGraph;
use petgraph::graph::NodeIndex;
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// Handle to a vertex inside one graph.
///
/// A handle records which graph returned it; other graphs reject it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VertexIndex {
    graph_id: u64,
    node: NodeIndex,
}

impl VertexIndex {
    pub(crate) fn new(graph_id: u64, node: NodeIndex) -> Self {
        Self { graph_id, node }
    }

    pub(crate) fn graph_id(&self) -> u64 {
        self.graph_id
    }

    pub(crate) fn node(&self) -> NodeIndex {
        self.node
    }

    /// Position of the vertex in insertion order.
    pub fn index(&self) -> usize {
        self.node.index()
    }
}

impl fmt::Display for VertexIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@graph{}", self.node.index(), self.graph_id)
    }
}

/// Opaque key/value bag attached to a vertex. Never read by the resolver.
pub type Metadata = serde_json::Map<String, serde_json::Value>;

/// Validated, non-empty vertex identifier.
///
/// # Examples
///
/// ```
/// use graphine_graph::VertexId;
///
/// let id = VertexId::new("parser").unwrap();
/// assert_eq!(id.as_str(), "parser");
/// assert!(VertexId::new("").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct VertexId(String);

impl VertexId {
    /// Creates an identifier, rejecting the empty string.
    pub fn new(id: impl Into<String>) -> GraphResult<Self> {
        let id = id.into();
        if id.is_empty() {
            return Err(GraphError::invalid_argument("vertex id must not be empty"));
        }
        Ok(Self(id))
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VertexId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for VertexId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for VertexId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl TryFrom<&str> for VertexId {
    type Error = GraphError;

    fn try_from(s: &str) -> GraphResult<Self> {
        Self::new(s)
    }
}

impl TryFrom<String> for VertexId {
    type Error = GraphError;

    fn try_from(s: String) -> GraphResult<Self> {
        Self::new(s)
    }
}

impl From<VertexId> for String {
    fn from(id: VertexId) -> Self {
        id.0
    }
}

/// A named vertex stored in a [`DependencyGraph`].
#[derive(Debug, Clone, PartialEq)]
pub struct Vertex {
    id: VertexId,
    metadata: Metadata,
}

impl Vertex {
    /// Creates a vertex with empty metadata.
    pub fn new(id: VertexId) -> Self {
        Self {
            id,
            metadata: Metadata::new(),
        }
    }

    /// Creates a vertex carrying metadata.
    pub fn with_metadata(id: VertexId, metadata: Metadata) -> Self {
        Self { id, metadata }
    }

    pub fn id(&self) -> &VertexId {
        &self.id
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }
}

/// Borrowed view of a vertex together with the graph that owns it.
///
/// This is what the resolver walks from. Holding one keeps the graph
/// immutably borrowed, so the graph cannot change mid-traversal.
#[derive(Clone, Copy)]
pub struct VertexRef<'g> {
    graph: &'g DependencyGraph,
    index: VertexIndex,
    vertex: &'g Vertex,
}

impl<'g> VertexRef<'g> {
    pub(crate) fn new(graph: &'g DependencyGraph, index: VertexIndex, vertex: &'g Vertex) -> Self {
        Self {
            graph,
            index,
            vertex,
        }
    }

    pub fn id(&self) -> &'g VertexId {
        self.vertex.id()
    }

    pub fn metadata(&self) -> &'g Metadata {
        self.vertex.metadata()
    }

    /// Returns the handle of this vertex within its graph.
    pub fn index(&self) -> VertexIndex {
        self.index
    }

    /// Returns a snapshot of the outgoing connections in insertion order.
    pub fn connections(&self) -> Vec<VertexRef<'g>> {
        self.graph
            .connection_nodes(self.index.node())
            .into_iter()
            .filter_map(|node| self.graph.vertex_ref(node))
            .collect()
    }
}

impl fmt::Debug for VertexRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VertexRef")
            .field("id", self.id())
            .field("index", &self.index.index())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_id_rejected() {
        let result = VertexId::new("");
        assert!(matches!(result, Err(GraphError::InvalidArgument { .. })));
    }

    #[test]
    fn test_id_conversions() {
        let id: VertexId = "lexer".try_into().unwrap();
        assert_eq!(id.as_str(), "lexer");
        assert_eq!(format!("{}", id), "lexer");

        let owned: String = id.clone().into();
        assert_eq!(owned, "lexer");

        assert!(VertexId::try_from(String::new()).is_err());
    }

    #[test]
    fn test_ids_are_case_sensitive() {
        assert_ne!(VertexId::new("a").unwrap(), VertexId::new("A").unwrap());
    }

    #[test]
    fn test_deserialize_validates() {
        let id: VertexId = serde_json::from_str("\"core\"").unwrap();
        assert_eq!(id.as_str(), "core");

        let err = serde_json::from_str::<VertexId>("\"\"");
        assert!(err.is_err());
    }

    #[test]
    fn test_vertex_metadata_defaults_empty() {
        let vertex = Vertex::new(VertexId::new("a").unwrap());
        assert!(vertex.metadata().is_empty());

        let mut metadata = Metadata::new();
        metadata.insert("version".to_string(), serde_json::json!("1.2.0"));
        let vertex = Vertex::with_metadata(VertexId::new("b").unwrap(), metadata);
        assert_eq!(vertex.metadata()["version"], "1.2.0");
    }
}
