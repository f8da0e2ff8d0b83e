//! Graphine CLI - Command-line interface for Graphine
//!
//! Builds a dependency graph from a manifest file and/or `--edge` flags and
//! prints the order in which its vertices can be resolved.

use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod manifest;

use commands::GraphSource;

#[derive(Parser)]
#[command(name = "graphine")]
#[command(author = "Graphine Contributors")]
#[command(version)]
#[command(about = "Resolve dependency order over a directed graph", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct SourceArgs {
    /// JSON manifest with vertices, edges and options
    #[arg(short, long)]
    manifest: Option<PathBuf>,

    /// Dependency edge FROM=TO (FROM depends on TO); repeatable
    #[arg(short, long = "edge")]
    edges: Vec<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the dependency order for one vertex
    Resolve {
        /// Vertex to resolve
        start: String,

        #[command(flatten)]
        source: SourceArgs,

        /// Skip cyclic edges instead of failing
        #[arg(long)]
        allow_cycles: bool,

        /// Output as JSON instead of one id per line
        #[arg(long)]
        json: bool,
    },

    /// Print the dependency order for the whole graph
    Order {
        #[command(flatten)]
        source: SourceArgs,

        /// Skip cyclic edges instead of failing
        #[arg(long)]
        allow_cycles: bool,

        /// Output as JSON instead of one id per line
        #[arg(long)]
        json: bool,
    },

    /// Show graph statistics and fail if it contains a cycle
    Check {
        #[command(flatten)]
        source: SourceArgs,
    },
}

impl SourceArgs {
    fn into_source(self, allow_cycles: bool) -> GraphSource {
        GraphSource {
            manifest: self.manifest,
            edges: self.edges,
            allow_cycles,
        }
    }
}

fn main() {
    let cli = Cli::parse();

    // Set up logging
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .with(tracing_subscriber::EnvFilter::new(filter))
        .init();

    let result = match cli.command {
        Commands::Resolve {
            start,
            source,
            allow_cycles,
            json,
        } => commands::resolve(&start, &source.into_source(allow_cycles), json),
        Commands::Order {
            source,
            allow_cycles,
            json,
        } => commands::order(&source.into_source(allow_cycles), json),
        Commands::Check { source } => commands::check(&source.into_source(false)),
    };

    if let Err(e) = result {
        eprintln!("{} {}", "error:".red().bold(), e);
        std::process::exit(1);
    }
}
