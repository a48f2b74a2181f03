//! One-line text records.
//!
//! A record is a tag word, the ids, the value words and optionally the packed
//! upper triangle of an information matrix:
//!
//! ```text
//! VERTEX_SE2 5 1 2 0.50000
//! EDGE_SE2 0 1 1 0 0.10000 10 0 0 10 0 20
//! PARAM_NEXT 10 11
//! ```

use crate::core::attribute::{read_symmetric, write_symmetric};
use crate::core::{Edge, GraphError, GraphResult, Node, NodeId, RecordTag};

/// A parsed line.
#[derive(Debug, Clone, PartialEq)]
pub enum Record {
    Node(Node),
    Edge(Edge),
    /// `PARAM_NEXT prev next`
    Link { prev: NodeId, next: NodeId },
}

fn parse_id(word: &str) -> GraphResult<NodeId> {
    word.parse::<NodeId>()
        .map_err(|_| GraphError::MalformedRecord(format!("'{word}' is not a node id")))
}

fn parse_ids(words: &[&str], count: usize, tag: RecordTag) -> GraphResult<Vec<NodeId>> {
    if words.len() < count {
        return Err(GraphError::MalformedRecord(format!(
            "{tag} expects {count} ids, got {}",
            words.len()
        )));
    }
    words[..count].iter().map(|word| parse_id(word)).collect()
}

/// Parse one line. Blank lines and `#` comments give `None`.
pub fn parse_record(line: &str) -> GraphResult<Option<Record>> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }
    let words: Vec<&str> = line.split_whitespace().collect();
    let tag: RecordTag = words[0].parse()?;
    let words = &words[1..];

    if tag == RecordTag::ParamNext {
        if words.len() != 2 {
            return Err(GraphError::MalformedRecord(format!(
                "{tag} expects 2 ids, got {} words",
                words.len()
            )));
        }
        let ids = parse_ids(words, 2, tag)?;
        return Ok(Some(Record::Link {
            prev: ids[0],
            next: ids[1],
        }));
    }

    if let Some(kind) = tag.node_kind() {
        let id = parse_ids(words, 1, tag)?[0];
        let mut node = Node::new(id, kind);
        let rest = node.attribute_mut().read_rest(&words[1..])?;
        if !rest.is_empty() {
            let information = read_symmetric(rest)?;
            node = node.with_information(information)?;
        }
        return Ok(Some(Record::Node(node)));
    }

    let (kind, calibrated) = tag
        .edge_kind()
        .ok_or_else(|| GraphError::UnsupportedType(tag.to_string()))?;
    let count = kind.arity() + usize::from(calibrated);
    let ids = parse_ids(words, count, tag)?;
    let mut edge = Edge::untyped(kind, ids[..kind.arity()].to_vec())?;
    if calibrated {
        edge = edge.with_parameter(ids[kind.arity()])?;
    }
    let rest = edge.measurement_mut().read_rest(&words[count..])?;
    if !rest.is_empty() {
        let information = read_symmetric(rest)?;
        edge.set_information(Some(information))?;
    }
    Ok(Some(Record::Edge(edge)))
}

/// Text line for a node.
pub fn format_node(node: &Node) -> GraphResult<String> {
    let mut words = vec![node.tag().to_string(), node.id().to_string()];
    words.extend(node.attribute().write()?);
    if let Some(information) = node.information() {
        words.extend(write_symmetric(information));
    }
    Ok(words.join(" "))
}

/// Text line for an edge.
pub fn format_edge(edge: &Edge) -> GraphResult<String> {
    let mut words = vec![edge.tag().to_string()];
    words.extend(edge.nodes().iter().map(NodeId::to_string));
    if let Some(parameter) = edge.parameter() {
        words.push(parameter.to_string());
    }
    words.extend(edge.measurement_attribute().write()?);
    if let Some(information) = edge.information() {
        words.extend(write_symmetric(information));
    }
    Ok(words.join(" "))
}

/// Text line for a parameter chain link.
pub fn format_link(prev: NodeId, next: NodeId) -> String {
    format!("{} {prev} {next}", RecordTag::ParamNext)
}
