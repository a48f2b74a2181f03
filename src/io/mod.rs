//! Text file input and output.
//!
//! Files hold one [`record`] per line. Loading memory-maps the file; files
//! above [`PARALLEL_THRESHOLD`] lines are parsed in parallel and the records
//! are then inserted in file order, so both paths build the same graph.

use crate::core::{Graph, GraphError};
use memmap2::Mmap;
use rayon::prelude::*;
use std::fs::File;
use std::io::{BufRead, BufWriter, Write};
use std::path::Path;
use thiserror::Error;
use tracing::debug;

pub mod record;

pub use crate::core::{format_float, PRECISION};
pub use record::{format_edge, format_link, format_node, parse_record, Record};

/// Line count above which records are parsed with rayon.
pub const PARALLEL_THRESHOLD: usize = 5000;

/// Errors that can occur while reading or writing graph files
#[derive(Error, Debug)]
pub enum IoError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error at line {line}: {source}")]
    Parse { line: usize, source: GraphError },

    #[error("Invalid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    #[error(transparent)]
    Graph(#[from] GraphError),
}

pub type IoResult<T> = Result<T, IoError>;

/// Trait for graph file loaders and writers
pub trait GraphLoader {
    /// Load a graph from a file
    fn load<P: AsRef<Path>>(path: P) -> IoResult<Graph>;

    /// Write a graph to a file
    fn write<P: AsRef<Path>>(graph: &Graph, path: P) -> IoResult<()>;
}

/// Loader for the record format.
pub struct TextLoader;

impl GraphLoader for TextLoader {
    fn load<P: AsRef<Path>>(path: P) -> IoResult<Graph> {
        let path = path.as_ref();
        let file = File::open(path)?;
        if file.metadata()?.len() == 0 {
            return Ok(Graph::new());
        }
        // SAFETY: the map is read-only and dropped before this function returns.
        let mmap = unsafe { Mmap::map(&file)? };
        let content = std::str::from_utf8(&mmap)?;
        let graph = parse_graph(content)?;
        debug!(
            "Loaded {} nodes and {} edges from {}",
            graph.node_count(),
            graph.edge_count(),
            path.display()
        );
        Ok(graph)
    }

    fn write<P: AsRef<Path>>(graph: &Graph, path: P) -> IoResult<()> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        write_graph(graph, &mut writer)?;
        writer.flush()?;
        Ok(())
    }
}

/// Build a graph from the text of a whole file.
pub fn parse_graph(content: &str) -> IoResult<Graph> {
    let lines: Vec<&str> = content.lines().collect();
    let records = if lines.len() > PARALLEL_THRESHOLD {
        lines
            .par_iter()
            .enumerate()
            .map(|(index, line)| parse_line(line, index + 1))
            .collect::<IoResult<Vec<_>>>()?
    } else {
        lines
            .iter()
            .enumerate()
            .map(|(index, line)| parse_line(line, index + 1))
            .collect::<IoResult<Vec<_>>>()?
    };

    let mut graph = Graph::new();
    for (line, record) in records.into_iter().flatten() {
        insert_record(&mut graph, record, line)?;
    }
    Ok(graph)
}

/// Build a graph line by line from a reader.
pub fn read_graph<R: BufRead>(reader: R) -> IoResult<Graph> {
    let mut graph = Graph::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        if let Some((number, record)) = parse_line(&line, index + 1)? {
            insert_record(&mut graph, record, number)?;
        }
    }
    Ok(graph)
}

/// Write nodes (id order), then parameter links, then edges (insertion order).
pub fn write_graph<W: Write>(graph: &Graph, mut writer: W) -> IoResult<()> {
    for node in graph.nodes() {
        writeln!(writer, "{}", format_node(node)?)?;
    }
    for (prev, next) in graph.links() {
        writeln!(writer, "{}", format_link(prev, next))?;
    }
    for edge in graph.edges() {
        writeln!(writer, "{}", format_edge(edge)?)?;
    }
    Ok(())
}

fn parse_line(line: &str, number: usize) -> IoResult<Option<(usize, Record)>> {
    parse_record(line)
        .map(|record| record.map(|record| (number, record)))
        .map_err(|source| IoError::Parse {
            line: number,
            source,
        })
}

fn insert_record(graph: &mut Graph, record: Record, line: usize) -> IoResult<()> {
    let result = match record {
        Record::Node(node) => {
            graph.add_node(node);
            Ok(())
        }
        Record::Edge(edge) => graph.add_edge(edge).map(|_| ()),
        Record::Link { prev, next } => graph.set_next(prev, next),
    };
    result.map_err(|source| IoError::Parse { line, source })
}
