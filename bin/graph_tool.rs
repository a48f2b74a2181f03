//! Graph inspection tool
//!
//! Loads a graph file, reports its size and χ², and optionally writes it back
//! in normalized form (nodes by id, then parameter links, then edges).
//!
//! # Usage
//! ```bash
//! cargo run --bin graph_tool -- path/to/graph.g2o
//! cargo run --bin graph_tool -- graph.g2o --output normalized.g2o --verbose
//! ```

use clap::Parser;
use slamkit::core::{EdgeKind, NodeKind};
use slamkit::io::{GraphLoader, TextLoader};
use slamkit::{init_logger_with_level, Graph};
use std::collections::BTreeMap;
use std::error::Error;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{info, warn, Level};

/// Inspect and normalize pose-graph files
#[derive(Parser)]
#[command(name = "graph_tool")]
#[command(about = "Inspect and normalize pose-graph files")]
struct Args {
    /// Graph file path (required, positional)
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// Write the normalized graph to this file
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Verbose output (per-kind counts and per-edge χ²)
    #[arg(short, long)]
    verbose: bool,
}

fn node_label(kind: NodeKind) -> String {
    match kind {
        NodeKind::Parameter(..) => format!("{kind}"),
        _ => format!("{kind} node"),
    }
}

fn edge_label(kind: EdgeKind) -> &'static str {
    match kind {
        EdgeKind::Pose2 => "SE2 odometry",
        EdgeKind::Pose3 => "SE3 odometry",
        EdgeKind::Pose2Point2 => "SE2 landmark",
        EdgeKind::Pose3Point3 => "SE3 landmark",
    }
}

fn report_counts(graph: &Graph) {
    let mut nodes: BTreeMap<String, usize> = BTreeMap::new();
    for node in graph.nodes() {
        *nodes.entry(node_label(node.kind())).or_default() += 1;
    }
    let mut edges: BTreeMap<&str, usize> = BTreeMap::new();
    for edge in graph.edges() {
        *edges.entry(edge_label(edge.kind())).or_default() += 1;
    }
    for (label, count) in nodes {
        info!("  {:<24} {}", label, count);
    }
    for (label, count) in edges {
        info!("  {:<24} {}", label, count);
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let level = if args.verbose { Level::DEBUG } else { Level::INFO };
    init_logger_with_level(level);

    if !args.file.exists() {
        return Err(format!("File not found: {}", args.file.display()).into());
    }

    info!("Loading graph: {}", args.file.display());
    let start = Instant::now();
    let graph = TextLoader::load(&args.file)?;
    info!(
        "Loaded {} nodes and {} edges in {:?}",
        graph.node_count(),
        graph.edge_count(),
        start.elapsed()
    );
    for warning in graph.warnings() {
        warn!("{}", warning);
    }

    if args.verbose {
        report_counts(&graph);
    }

    let mut total = 0.0;
    for (index, edge) in graph.edges().iter().enumerate() {
        match edge.chi2(&graph) {
            Ok(chi2) => {
                total += chi2;
                if args.verbose {
                    info!("  edge {:>6} {:<24} chi2 = {:.6}", index, edge.tag(), chi2);
                }
            }
            Err(e) => warn!("Cannot evaluate edge {}: {}", index, e),
        }
    }
    info!("Total chi2: {:.6}", total);

    if let Some(output) = &args.output {
        TextLoader::write(&graph, output)?;
        info!("Wrote normalized graph to {}", output.display());
    }

    Ok(())
}
