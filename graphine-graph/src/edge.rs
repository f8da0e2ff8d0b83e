//! Edge export type.
//!
//! Inside the graph an edge carries no weight; it only means "the source
//! depends on the target". This type is the identifier-level view handed to
//! callers that want to list or export the edge set.

use crate::vertex::VertexId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A directed dependency `from -> to`: `from` depends on `to`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Edge {
    pub from: VertexId,
    pub to: VertexId,
}

impl Edge {
    /// Creates a new edge.
    pub fn new(from: VertexId, to: VertexId) -> Self {
        Self { from, to }
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.from, self.to)
    }
}
