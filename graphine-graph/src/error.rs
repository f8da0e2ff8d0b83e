//! Error types for graph construction and resolution.

use crate::vertex::VertexId;
use thiserror::Error;

/// Result type for graph operations.
pub type GraphResult<T> = Result<T, GraphError>;

/// Errors that can occur while building or resolving a graph.
///
/// Lookups of unknown identifiers are not errors: `vertex` and `connections`
/// return `None` instead, since callers routinely probe for existence.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum GraphError {
    /// A malformed identifier or a handle that does not belong to the graph.
    #[error("Invalid argument: {reason}")]
    InvalidArgument {
        /// What was wrong with the argument
        reason: String,
    },

    /// Resolution was requested for an identifier the graph does not know.
    #[error("Vertex not found: {id}")]
    VertexNotFound {
        /// The identifier that was requested
        id: String,
    },

    /// The resolver reached a vertex that is still on its active path.
    #[error("Cycle detected through edge {from} -> {to}: {path}")]
    CycleDetected {
        /// Vertex whose connection closes the cycle
        from: VertexId,
        /// Ancestor the connection points back to
        to: VertexId,
        /// Human-readable cycle, e.g. `X -> Y -> X`
        path: String,
    },
}

impl GraphError {
    /// Creates an invalid argument error.
    pub fn invalid_argument(reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            reason: reason.into(),
        }
    }

    /// Creates a vertex not found error.
    pub fn vertex_not_found(id: impl Into<String>) -> Self {
        Self::VertexNotFound { id: id.into() }
    }

    /// Creates a cycle error for the edge `from -> to`.
    pub fn cycle(from: VertexId, to: VertexId, path: impl Into<String>) -> Self {
        Self::CycleDetected {
            from,
            to,
            path: path.into(),
        }
    }

    /// Returns true if this error reports a dependency cycle.
    pub fn is_cycle(&self) -> bool {
        matches!(self, Self::CycleDetected { .. })
    }
}
