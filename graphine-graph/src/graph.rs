//! Core graph data structure.
//!
//! `DependencyGraph` wraps a petgraph `DiGraph` and adds an identifier index
//! so vertices can be looked up by name. It is the sole owner of every
//! vertex; edges are stored as node-index pairs, never as references between
//! vertices.
//!
//! Each graph gets a process-unique id when created, and every
//! [`VertexIndex`] it hands out carries that id, so a handle from one graph is
//! rejected by another even when the node positions overlap.
//!
//! Mutation requires `&mut self`, so a graph cannot change while a resolver
//! holds a [`VertexRef`] into it.

use crate::edge::Edge;
use crate::error::{GraphError, GraphResult};
use crate::vertex::{Metadata, Vertex, VertexId, VertexIndex, VertexRef};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::trace;

static NEXT_GRAPH_ID: AtomicU64 = AtomicU64::new(0);

fn next_graph_id() -> u64 {
    NEXT_GRAPH_ID.fetch_add(1, Ordering::Relaxed)
}

/// A directed graph where an edge `a -> b` means "a depends on b".
///
/// # Example
///
/// ```
/// use graphine_graph::DependencyGraph;
///
/// let mut graph = DependencyGraph::new();
/// graph.add_edge("app", "http").unwrap();
/// graph.add_edge("app", "log").unwrap();
///
/// assert_eq!(graph.len(), 3);
/// let deps = graph.connections("app").unwrap();
/// assert_eq!(deps[0].as_str(), "http");
/// assert_eq!(deps[1].as_str(), "log");
/// assert!(graph.vertex("missing").is_none());
/// ```
#[derive(Debug)]
pub struct DependencyGraph {
    /// Identity stamped into every handle this graph returns.
    graph_id: u64,

    /// The underlying petgraph graph. Node and edge indexes only grow.
    graph: DiGraph<Vertex, ()>,

    /// Maps identifiers to graph node indexes.
    id_index: HashMap<VertexId, NodeIndex>,
}

impl Default for DependencyGraph {
    fn default() -> Self {
        Self::new()
    }
}

/// A clone is a separate graph: handles from the original do not apply to it.
impl Clone for DependencyGraph {
    fn clone(&self) -> Self {
        Self {
            graph_id: next_graph_id(),
            graph: self.graph.clone(),
            id_index: self.id_index.clone(),
        }
    }
}

impl DependencyGraph {
    /// Creates a new empty graph.
    pub fn new() -> Self {
        Self {
            graph_id: next_graph_id(),
            graph: DiGraph::new(),
            id_index: HashMap::new(),
        }
    }

    /// Builds a graph from `(start, end)` identifier pairs.
    pub fn from_edges<I, S>(edges: I) -> GraphResult<Self>
    where
        I: IntoIterator<Item = (S, S)>,
        S: AsRef<str>,
    {
        let mut graph = Self::new();
        for (start, end) in edges {
            graph.add_edge(start.as_ref(), end.as_ref())?;
        }
        Ok(graph)
    }

    /// Registers a vertex.
    ///
    /// Idempotent: an existing vertex is left untouched and its handle
    /// returned.
    pub fn add_vertex(&mut self, id: &str) -> GraphResult<VertexIndex> {
        if let Some(&node) = self.id_index.get(id) {
            return Ok(self.handle(node));
        }
        let node = self.insert(Vertex::new(VertexId::new(id)?));
        Ok(self.handle(node))
    }

    /// Registers a vertex carrying metadata.
    ///
    /// If the id is already registered the existing vertex, including its
    /// metadata, is kept.
    pub fn add_vertex_with_metadata(
        &mut self,
        id: &str,
        metadata: Metadata,
    ) -> GraphResult<VertexIndex> {
        if let Some(&node) = self.id_index.get(id) {
            return Ok(self.handle(node));
        }
        let node = self.insert(Vertex::with_metadata(VertexId::new(id)?, metadata));
        Ok(self.handle(node))
    }

    fn handle(&self, node: NodeIndex) -> VertexIndex {
        VertexIndex::new(self.graph_id, node)
    }

    /// Maps a handle back to a node, or `None` if it belongs to another graph.
    fn node(&self, index: VertexIndex) -> Option<NodeIndex> {
        if index.graph_id() != self.graph_id {
            return None;
        }
        let node = index.node();
        self.graph.node_weight(node).map(|_| node)
    }

    fn owned_node(&self, index: VertexIndex) -> GraphResult<NodeIndex> {
        self.node(index).ok_or_else(|| {
            GraphError::invalid_argument(format!(
                "vertex handle {} does not belong to this graph",
                index
            ))
        })
    }

    fn ensure_vertex(&mut self, id: VertexId) -> NodeIndex {
        match self.id_index.get(&id) {
            Some(&node) => node,
            None => self.insert(Vertex::new(id)),
        }
    }

    fn insert(&mut self, vertex: Vertex) -> NodeIndex {
        let id = vertex.id().clone();
        let node = self.graph.add_node(vertex);
        trace!(id = %id, index = node.index(), "registered vertex");
        self.id_index.insert(id, node);
        node
    }

    /// Adds the dependency `start -> end`, creating either endpoint if needed.
    ///
    /// Both identifiers are validated before the graph is touched. Returns
    /// `false` when the edge already existed.
    pub fn add_edge(&mut self, start: &str, end: &str) -> GraphResult<bool> {
        let start = VertexId::new(start)?;
        let end = VertexId::new(end)?;
        Ok(self.link(start, end))
    }

    fn link(&mut self, start: VertexId, end: VertexId) -> bool {
        let from = self.ensure_vertex(start);
        let to = self.ensure_vertex(end);
        self.connect(from, to)
    }

    /// Connects two existing vertices by handle.
    ///
    /// Fails with `InvalidArgument` if either handle does not belong to this
    /// graph. Returns `false` when the connection was already present.
    pub fn add_connection(&mut self, from: VertexIndex, to: VertexIndex) -> GraphResult<bool> {
        let from = self.owned_node(from)?;
        let to = self.owned_node(to)?;
        Ok(self.connect(from, to))
    }

    fn connect(&mut self, from: NodeIndex, to: NodeIndex) -> bool {
        if self.graph.find_edge(from, to).is_some() {
            return false;
        }
        self.graph.add_edge(from, to, ());
        true
    }

    /// Gets a vertex by its identifier.
    pub fn vertex(&self, id: &str) -> Option<VertexRef<'_>> {
        let node = self.id_index.get(id)?;
        self.vertex_ref(*node)
    }

    /// Gets a vertex by its graph handle. Handles from other graphs yield
    /// `None`.
    pub fn vertex_at(&self, index: VertexIndex) -> Option<VertexRef<'_>> {
        self.vertex_ref(self.node(index)?)
    }

    pub(crate) fn vertex_ref(&self, node: NodeIndex) -> Option<VertexRef<'_>> {
        self.graph
            .node_weight(node)
            .map(|vertex| VertexRef::new(self, self.handle(node), vertex))
    }

    /// Gets the handle for an identifier.
    pub fn index_of(&self, id: &str) -> Option<VertexIndex> {
        self.id_index.get(id).map(|&node| self.handle(node))
    }

    /// Returns the identifiers `id` depends on, in insertion order, or `None`
    /// if `id` is not registered.
    pub fn connections(&self, id: &str) -> Option<Vec<VertexId>> {
        let node = *self.id_index.get(id)?;
        Some(
            self.connection_nodes(node)
                .into_iter()
                .map(|target| self.graph[target].id().clone())
                .collect(),
        )
    }

    /// Outgoing neighbours of `node` in insertion order.
    ///
    /// petgraph walks adjacency lists newest-first; edges are never removed,
    /// so sorting by edge index restores insertion order.
    pub(crate) fn connection_nodes(&self, node: NodeIndex) -> Vec<NodeIndex> {
        let mut edges: Vec<_> = self
            .graph
            .edges_directed(node, Direction::Outgoing)
            .map(|edge| (edge.id(), edge.target()))
            .collect();
        edges.sort_by_key(|(edge, _)| *edge);
        edges.into_iter().map(|(_, target)| target).collect()
    }

    /// Returns true if the identifier is registered.
    pub fn contains(&self, id: &str) -> bool {
        self.id_index.contains_key(id)
    }

    /// Returns the number of vertices.
    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    /// Returns true if the graph has no vertices.
    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Returns the number of edges.
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Iterates over all identifiers in insertion order.
    pub fn vertex_ids(&self) -> impl Iterator<Item = &VertexId> {
        self.graph.node_weights().map(Vertex::id)
    }

    /// Iterates over all vertices in insertion order.
    pub fn vertices(&self) -> impl Iterator<Item = VertexRef<'_>> + '_ {
        self.graph
            .node_indices()
            .map(move |node| VertexRef::new(self, self.handle(node), &self.graph[node]))
    }

    /// Returns every edge in insertion order.
    pub fn edges(&self) -> Vec<Edge> {
        self.graph
            .edge_references()
            .map(|edge| {
                Edge::new(
                    self.graph[edge.source()].id().clone(),
                    self.graph[edge.target()].id().clone(),
                )
            })
            .collect()
    }

    /// Returns vertices nothing depends on (no incoming edges).
    pub fn roots(&self) -> Vec<VertexId> {
        self.ids_without(Direction::Incoming)
    }

    /// Returns vertices that depend on nothing (no outgoing edges).
    pub fn leaves(&self) -> Vec<VertexId> {
        self.ids_without(Direction::Outgoing)
    }

    fn ids_without(&self, direction: Direction) -> Vec<VertexId> {
        self.graph
            .node_indices()
            .filter(|&node| {
                self.graph
                    .neighbors_directed(node, direction)
                    .next()
                    .is_none()
            })
            .map(|node| self.graph[node].id().clone())
            .collect()
    }

    /// Returns true if any cycle exists anywhere in the graph.
    pub fn has_cycle(&self) -> bool {
        petgraph::algo::is_cyclic_directed(&self.graph)
    }
}

impl Extend<(VertexId, VertexId)> for DependencyGraph {
    fn extend<I: IntoIterator<Item = (VertexId, VertexId)>>(&mut self, iter: I) {
        for (start, end) in iter {
            self.link(start, end);
        }
    }
}

impl FromIterator<(VertexId, VertexId)> for DependencyGraph {
    fn from_iter<I: IntoIterator<Item = (VertexId, VertexId)>>(iter: I) -> Self {
        let mut graph = Self::new();
        graph.extend(iter);
        graph
    }
}
