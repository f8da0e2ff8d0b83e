//! Dependency-order resolution.
//!
//! Produces a reverse-postorder depth-first walk from a starting vertex:
//! every vertex appears after everything it depends on. The walk keeps its
//! own heap-allocated stack of frames, so chain depth is bounded by memory
//! rather than by the native call stack.
//!
//! Cycle detection is scoped to the active path. A connection to a vertex
//! that is already resolved is skipped; a connection to a vertex still on
//! the path is a cycle and is handled per [`CyclePolicy`].

use crate::error::{GraphError, GraphResult};
use crate::graph::DependencyGraph;
use crate::options::{CyclePolicy, ResolveOptions};
use crate::vertex::{VertexId, VertexIndex, VertexRef};
use std::collections::HashSet;
use tracing::{debug, trace, warn};

/// Resolves vertices into dependency order.
///
/// A resolver holds configuration only; every call starts from fresh state,
/// so one resolver can be reused across graphs.
///
/// # Example
///
/// ```
/// use graphine_graph::{CyclePolicy, DependencyGraph, ResolveOptions, Resolver};
///
/// let graph = DependencyGraph::from_edges([("x", "y"), ("y", "x")]).unwrap();
///
/// let strict = Resolver::default();
/// assert!(strict.resolve_id(&graph, "x").unwrap_err().is_cycle());
///
/// let lenient = Resolver::new(ResolveOptions::default().with_cycle_policy(CyclePolicy::Skip));
/// let order = lenient.resolve_id(&graph, "x").unwrap();
/// assert_eq!(order.len(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Resolver {
    options: ResolveOptions,
}

impl Resolver {
    pub fn new(options: ResolveOptions) -> Self {
        Self { options }
    }

    /// Resolves everything reachable from `start`, ending with `start` itself.
    pub fn resolve(&self, start: VertexRef<'_>) -> GraphResult<Vec<VertexId>> {
        debug!(start = %start.id(), policy = %self.options.cycle_policy, "resolving");

        let mut walk = Walk::new(self.options.cycle_policy);
        walk.visit(start)?;

        debug!(start = %start.id(), resolved = walk.resolved.len(), "resolved");
        Ok(walk.resolved)
    }

    /// Looks up `id` in `graph` and resolves from it.
    ///
    /// Unlike plain lookups, an unknown id is an error here: the caller asked
    /// for that vertex specifically.
    pub fn resolve_id(&self, graph: &DependencyGraph, id: &str) -> GraphResult<Vec<VertexId>> {
        let id = VertexId::new(id)?;
        let start = graph
            .vertex(id.as_str())
            .ok_or_else(|| GraphError::vertex_not_found(id.as_str()))?;
        self.resolve(start)
    }

    /// Resolves every vertex in `graph` into one dependency order.
    ///
    /// Walks start from each vertex in insertion order and share their
    /// resolved set, so each vertex appears exactly once.
    pub fn resolve_all(&self, graph: &DependencyGraph) -> GraphResult<Vec<VertexId>> {
        debug!(vertices = graph.len(), policy = %self.options.cycle_policy, "resolving graph");

        let mut walk = Walk::new(self.options.cycle_policy);
        for vertex in graph.vertices() {
            if !walk.done.contains(&vertex.index()) {
                walk.visit(vertex)?;
            }
        }

        debug!(resolved = walk.resolved.len(), "resolved graph");
        Ok(walk.resolved)
    }
}

/// Resolves from `vertex` with the default options (cycles are errors).
pub fn resolve(vertex: VertexRef<'_>) -> GraphResult<Vec<VertexId>> {
    Resolver::default().resolve(vertex)
}

/// A vertex on the active path and the position of its next connection.
struct Frame<'g> {
    vertex: VertexRef<'g>,
    connections: Vec<VertexRef<'g>>,
    next: usize,
}

impl<'g> Frame<'g> {
    fn new(vertex: VertexRef<'g>) -> Self {
        Self {
            vertex,
            connections: vertex.connections(),
            next: 0,
        }
    }

    fn advance(&mut self) -> Option<VertexRef<'g>> {
        let next = self.connections.get(self.next).copied();
        if next.is_some() {
            self.next += 1;
        }
        next
    }
}

/// State shared by the walks of one resolution call.
struct Walk {
    policy: CyclePolicy,
    resolved: Vec<VertexId>,
    done: HashSet<VertexIndex>,
}

impl Walk {
    fn new(policy: CyclePolicy) -> Self {
        Self {
            policy,
            resolved: Vec::new(),
            done: HashSet::new(),
        }
    }

    fn visit(&mut self, start: VertexRef<'_>) -> GraphResult<()> {
        let mut stack = vec![Frame::new(start)];
        let mut on_path: HashSet<VertexIndex> = HashSet::from([start.index()]);

        while let Some(frame) = stack.last_mut() {
            let from = frame.vertex;
            let next = match frame.advance() {
                Some(next) => next,
                None => {
                    // All connections handled: finalize and backtrack.
                    stack.pop();
                    on_path.remove(&from.index());
                    self.done.insert(from.index());
                    self.resolved.push(from.id().clone());
                    trace!(id = %from.id(), position = self.resolved.len() - 1, "finalized");
                    continue;
                }
            };

            if self.done.contains(&next.index()) {
                continue;
            }

            if on_path.contains(&next.index()) {
                let path = cycle_path(&stack, next);
                match self.policy {
                    CyclePolicy::Error => {
                        debug!(from = %from.id(), to = %next.id(), %path, "cycle detected");
                        return Err(GraphError::cycle(
                            from.id().clone(),
                            next.id().clone(),
                            path,
                        ));
                    }
                    CyclePolicy::Skip => {
                        warn!(from = %from.id(), to = %next.id(), %path, "skipping cyclic edge");
                        continue;
                    }
                }
            }

            on_path.insert(next.index());
            stack.push(Frame::new(next));
        }

        Ok(())
    }
}

/// Renders the active path from `to` down to the top of the stack, closed by
/// `to` again, e.g. `X -> Y -> X`.
fn cycle_path(stack: &[Frame<'_>], to: VertexRef<'_>) -> String {
    let start = stack
        .iter()
        .position(|frame| frame.vertex.index() == to.index())
        .unwrap_or(0);

    let mut parts: Vec<&str> = stack[start..]
        .iter()
        .map(|frame| frame.vertex.id().as_str())
        .collect();
    parts.push(to.id().as_str());
    parts.join(" -> ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(order: &[VertexId]) -> Vec<&str> {
        order.iter().map(VertexId::as_str).collect()
    }

    fn position(order: &[VertexId], id: &str) -> usize {
        order.iter().position(|v| v.as_str() == id).unwrap()
    }

    fn skipping() -> Resolver {
        Resolver::new(ResolveOptions::default().with_cycle_policy(CyclePolicy::Skip))
    }

    #[test]
    fn test_resolve_worked_example() {
        let mut graph = DependencyGraph::new();
        graph.add_vertex("A").unwrap();
        graph.add_edge("A", "B").unwrap();
        graph.add_edge("A", "C").unwrap();
        graph.add_edge("B", "C").unwrap();
        graph.add_edge("B", "D").unwrap();

        let order = resolve(graph.vertex("A").unwrap()).unwrap();
        assert_eq!(ids(&order), vec!["C", "D", "B", "A"]);
    }

    #[test]
    fn test_resolve_isolated_vertex() {
        let mut graph = DependencyGraph::new();
        graph.add_vertex("X").unwrap();

        let order = resolve(graph.vertex("X").unwrap()).unwrap();
        assert_eq!(ids(&order), vec!["X"]);
    }

    #[test]
    fn test_resolve_leaf_ignores_dependents() {
        let graph = DependencyGraph::from_edges([("A", "B"), ("B", "C")]).unwrap();

        let order = resolve(graph.vertex("C").unwrap()).unwrap();
        assert_eq!(ids(&order), vec!["C"]);

        let order = resolve(graph.vertex("B").unwrap()).unwrap();
        assert_eq!(ids(&order), vec!["C", "B"]);
    }

    #[test]
    fn test_resolve_is_repeatable() {
        let graph =
            DependencyGraph::from_edges([("A", "B"), ("A", "C"), ("B", "C"), ("B", "D")]).unwrap();
        let resolver = Resolver::default();

        let first = resolver.resolve_id(&graph, "A").unwrap();
        let second = resolver.resolve_id(&graph, "A").unwrap();
        assert_eq!(first, second);
        assert_eq!(graph.edge_count(), 4);
    }

    #[test]
    fn test_resolve_diamond_visits_shared_dependency_once() {
        let graph =
            DependencyGraph::from_edges([("top", "left"), ("top", "right"), ("left", "base"), ("right", "base")])
                .unwrap();

        let order = resolve(graph.vertex("top").unwrap()).unwrap();
        assert_eq!(ids(&order), vec!["base", "left", "right", "top"]);
    }

    #[test]
    fn test_dependencies_precede_dependents() {
        // Layered DAG: each vertex i depends on a few lower-numbered vertices.
        let mut graph = DependencyGraph::new();
        for i in 1..60usize {
            for j in [i / 2, i - 1, (i * 7) % 11] {
                if j < i {
                    graph.add_edge(&format!("v{}", i), &format!("v{}", j)).unwrap();
                }
            }
        }

        let order = resolve(graph.vertex("v59").unwrap()).unwrap();
        let unique: HashSet<_> = order.iter().collect();
        assert_eq!(unique.len(), order.len());

        for edge in graph.edges() {
            let reachable = order.contains(&edge.from);
            if reachable {
                assert!(
                    position(&order, edge.to.as_str()) < position(&order, edge.from.as_str()),
                    "{} must precede {}",
                    edge.to,
                    edge.from
                );
            }
        }
        assert_eq!(order.last().map(VertexId::as_str), Some("v59"));
    }

    #[test]
    fn test_two_vertex_cycle_is_error() {
        let graph = DependencyGraph::from_edges([("X", "Y"), ("Y", "X")]).unwrap();

        let err = resolve(graph.vertex("X").unwrap()).unwrap_err();
        match err {
            GraphError::CycleDetected { from, to, path } => {
                assert_eq!(from.as_str(), "Y");
                assert_eq!(to.as_str(), "X");
                assert_eq!(path, "X -> Y -> X");
            }
            other => panic!("expected cycle, got {:?}", other),
        }
    }

    #[test]
    fn test_self_loop_is_error() {
        let graph = DependencyGraph::from_edges([("A", "A")]).unwrap();

        let err = resolve(graph.vertex("A").unwrap()).unwrap_err();
        assert_eq!(
            err,
            GraphError::cycle(
                VertexId::new("A").unwrap(),
                VertexId::new("A").unwrap(),
                "A -> A"
            )
        );
    }

    #[test]
    fn test_cycle_path_starts_at_reentered_ancestor() {
        let graph =
            DependencyGraph::from_edges([("root", "a"), ("a", "b"), ("b", "c"), ("c", "a")]).unwrap();

        let err = resolve(graph.vertex("root").unwrap()).unwrap_err();
        assert!(matches!(
            err,
            GraphError::CycleDetected { ref path, .. } if path == "a -> b -> c -> a"
        ));
    }

    #[test]
    fn test_unreachable_cycle_does_not_fail() {
        let graph =
            DependencyGraph::from_edges([("A", "B"), ("X", "Y"), ("Y", "X")]).unwrap();

        let order = resolve(graph.vertex("A").unwrap()).unwrap();
        assert_eq!(ids(&order), vec!["B", "A"]);
    }

    #[test]
    fn test_skip_policy_breaks_cycle() {
        let graph = DependencyGraph::from_edges([("X", "Y"), ("Y", "X")]).unwrap();

        let order = skipping().resolve(graph.vertex("X").unwrap()).unwrap();
        assert_eq!(ids(&order), vec!["Y", "X"]);
    }

    #[test]
    fn test_skip_policy_keeps_acyclic_part_ordered() {
        let graph = DependencyGraph::from_edges([
            ("app", "db"),
            ("db", "pool"),
            ("pool", "db"),
            ("app", "log"),
            ("db", "log"),
        ])
        .unwrap();

        let order = skipping().resolve(graph.vertex("app").unwrap()).unwrap();
        assert_eq!(ids(&order), vec!["pool", "log", "db", "app"]);
    }

    #[test]
    fn test_deep_chain_does_not_overflow() {
        let depth = 100_000;
        let mut graph = DependencyGraph::new();
        for i in 0..depth {
            graph
                .add_edge(&format!("n{}", i), &format!("n{}", i + 1))
                .unwrap();
        }

        let order = resolve(graph.vertex("n0").unwrap()).unwrap();
        assert_eq!(order.len(), depth + 1);
        assert_eq!(order[0].as_str(), format!("n{}", depth));
        assert_eq!(order[depth].as_str(), "n0");
    }

    #[test]
    fn test_resolve_id_missing_and_empty() {
        let graph = DependencyGraph::from_edges([("A", "B")]).unwrap();
        let resolver = Resolver::default();

        let missing = resolver.resolve_id(&graph, "missing");
        assert!(matches!(missing, Err(GraphError::VertexNotFound { .. })));

        let empty = resolver.resolve_id(&graph, "");
        assert!(matches!(empty, Err(GraphError::InvalidArgument { .. })));
    }

    #[test]
    fn test_resolve_all_covers_every_vertex() {
        let graph = DependencyGraph::from_edges([
            ("B", "D"),
            ("A", "B"),
            ("A", "C"),
            ("E", "C"),
        ])
        .unwrap();

        let order = Resolver::default().resolve_all(&graph).unwrap();
        assert_eq!(ids(&order), vec!["D", "B", "C", "A", "E"]);
    }

    #[test]
    fn test_resolve_all_empty_graph() {
        let order = Resolver::default()
            .resolve_all(&DependencyGraph::new())
            .unwrap();
        assert!(order.is_empty());
    }

    #[test]
    fn test_resolve_all_reports_cycle() {
        let graph = DependencyGraph::from_edges([("A", "B"), ("C", "D"), ("D", "C")]).unwrap();

        let err = Resolver::default().resolve_all(&graph).unwrap_err();
        assert!(err.is_cycle());

        let order = skipping().resolve_all(&graph).unwrap();
        assert_eq!(ids(&order), vec!["B", "A", "D", "C"]);
    }
}
