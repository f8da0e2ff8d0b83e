//! CLI command implementations.

use crate::manifest::Manifest;
use colored::Colorize;
use graphine_graph::{CyclePolicy, DependencyGraph, ResolveOptions, Resolver, VertexId};
use std::path::PathBuf;
use tracing::info;

type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

/// Where a command gets its graph from.
#[derive(Debug, Default)]
pub struct GraphSource {
    pub manifest: Option<PathBuf>,
    pub edges: Vec<String>,
    pub allow_cycles: bool,
}

impl GraphSource {
    /// Builds the graph and resolver options from the manifest and flags.
    ///
    /// `--allow-cycles` wins over the manifest's cycle policy.
    pub fn load(&self) -> Result<(DependencyGraph, ResolveOptions)> {
        let mut manifest = match &self.manifest {
            Some(path) => Manifest::load(path)?,
            None => Manifest::default(),
        };
        manifest.add_edge_flags(&self.edges)?;

        let graph = manifest.build_graph()?;
        let mut options = manifest.options.unwrap_or_default();
        if self.allow_cycles {
            options.cycle_policy = CyclePolicy::Skip;
        }

        info!(
            "Loaded graph: {} vertices, {} edges",
            graph.len(),
            graph.edge_count()
        );
        Ok((graph, options))
    }
}

/// Resolve the dependency order for one vertex.
pub fn resolve(start: &str, source: &GraphSource, json: bool) -> Result<()> {
    let (graph, options) = source.load()?;
    let order = Resolver::new(options).resolve_id(&graph, start)?;
    print_order(&order, json)
}

/// Resolve the dependency order for the whole graph.
pub fn order(source: &GraphSource, json: bool) -> Result<()> {
    let (graph, options) = source.load()?;
    let order = Resolver::new(options).resolve_all(&graph)?;
    print_order(&order, json)
}

/// Report graph statistics and whether it contains a cycle.
pub fn check(source: &GraphSource) -> Result<()> {
    let (graph, _) = source.load()?;

    println!(
        "{} vertices, {} edges",
        graph.len().to_string().cyan(),
        graph.edge_count().to_string().cyan()
    );

    if graph.has_cycle() {
        // Report the first cycle the strict resolver runs into.
        if let Err(e) = Resolver::default().resolve_all(&graph) {
            println!("{} {}", "✗".red(), e);
        }
        return Err("graph contains a cycle".into());
    }

    println!("{} No cycles", "✓".green());
    Ok(())
}

fn print_order(order: &[VertexId], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(order)?);
    } else {
        for id in order {
            println!("{}", id);
        }
    }
    Ok(())
}
