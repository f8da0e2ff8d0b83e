//! Graph manifests: the JSON file and `--edge` flags a graph is built from.

use graphine_graph::{DependencyGraph, GraphError, Metadata, ResolveOptions};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("Invalid edge '{0}': expected FROM=TO")]
    InvalidEdge(String),
    #[error(transparent)]
    Graph(#[from] GraphError),
}

/// A vertex declared up front, optionally with metadata.
#[derive(Debug, Deserialize)]
pub struct VertexSpec {
    pub id: String,
    #[serde(default, deserialize_with = "object_or_empty")]
    pub metadata: Metadata,
}

/// Accepts any JSON value for metadata; anything but an object becomes an
/// empty bag.
fn object_or_empty<'de, D>(deserializer: D) -> Result<Metadata, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Object(map) => Ok(map),
        Value::Null => Ok(Metadata::new()),
        other => {
            debug!("Ignoring non-object vertex metadata: {}", other);
            Ok(Metadata::new())
        }
    }
}

/// Contents of a manifest file. Every field is optional.
///
/// ```json
/// {
///   "vertices": [{ "id": "app", "metadata": { "version": "1.0" } }],
///   "edges": [["app", "http"], ["http", "tls"]],
///   "options": { "cycle_policy": "skip" }
/// }
/// ```
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Manifest {
    pub vertices: Vec<VertexSpec>,
    pub edges: Vec<(String, String)>,
    pub options: Option<ResolveOptions>,
}

impl Manifest {
    /// Reads and parses a manifest file.
    pub fn load(path: &Path) -> Result<Self, ManifestError> {
        let text = fs::read_to_string(path).map_err(|source| ManifestError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let manifest: Manifest =
            serde_json::from_str(&text).map_err(|source| ManifestError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        debug!(
            "Loaded manifest {} ({} vertices, {} edges)",
            path.display(),
            manifest.vertices.len(),
            manifest.edges.len()
        );
        Ok(manifest)
    }

    /// Appends edges given as `FROM=TO` flags.
    pub fn add_edge_flags(&mut self, flags: &[String]) -> Result<(), ManifestError> {
        for flag in flags {
            self.edges.push(parse_edge_flag(flag)?);
        }
        Ok(())
    }

    /// Builds the graph: declared vertices first, then edges in order.
    pub fn build_graph(&self) -> Result<DependencyGraph, ManifestError> {
        let mut graph = DependencyGraph::new();
        for vertex in &self.vertices {
            graph.add_vertex_with_metadata(&vertex.id, vertex.metadata.clone())?;
        }
        for (from, to) in &self.edges {
            graph.add_edge(from, to)?;
        }
        Ok(graph)
    }
}

/// Parses a `FROM=TO` edge flag.
pub fn parse_edge_flag(flag: &str) -> Result<(String, String), ManifestError> {
    match flag.split_once('=') {
        Some((from, to)) if !from.trim().is_empty() && !to.trim().is_empty() => {
            Ok((from.trim().to_string(), to.trim().to_string()))
        }
        _ => Err(ManifestError::InvalidEdge(flag.to_string())),
    }
}
