//! Graphine Graph - Directed dependency graphs and resolution order
//!
//! This crate stores a directed graph where an edge `a -> b` means "a depends
//! on b", and resolves a starting vertex into an order in which every
//! dependency appears before its dependents.
//!
//! # Architecture
//!
//! The graph uses petgraph internally. The [`DependencyGraph`] owns every
//! vertex and keeps an identifier index next to it; edges are node-index
//! pairs, so vertices never reference each other directly. The [`Resolver`]
//! only reads the graph.
//!
//! Building a graph is single-writer: mutation takes `&mut self`, and any
//! [`VertexRef`] handed to the resolver keeps the graph borrowed for the
//! duration of the walk. Separate graphs can be resolved in parallel.
//!
//! # Example
//!
//! ```
//! use graphine_graph::{resolve, DependencyGraph};
//!
//! let mut graph = DependencyGraph::new();
//! graph.add_vertex("A").unwrap();
//! graph.add_edge("A", "B").unwrap();
//! graph.add_edge("A", "C").unwrap();
//! graph.add_edge("B", "C").unwrap();
//! graph.add_edge("B", "D").unwrap();
//!
//! let order = resolve(graph.vertex("A").unwrap()).unwrap();
//! let order: Vec<&str> = order.iter().map(|id| id.as_str()).collect();
//! assert_eq!(order, ["C", "D", "B", "A"]);
//! ```

mod edge;
mod error;
mod graph;
mod options;
mod resolver;
mod vertex;

pub use edge::Edge;
pub use error::{GraphError, GraphResult};
pub use graph::DependencyGraph;
pub use options::{CyclePolicy, ResolveOptions};
pub use resolver::{resolve, Resolver};
pub use vertex::{Metadata, Vertex, VertexId, VertexIndex, VertexRef};
