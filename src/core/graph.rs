use crate::core::{Edge, GraphError, GraphResult, Node, NodeId, Value};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use tracing::{debug, warn};

/// Non-fatal insertion events recorded by the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphWarning {
    /// A node was replaced by a later node with the same id
    DuplicateNode(NodeId),
    /// An edge equal to the edge at this index was skipped
    DuplicateEdge(usize),
}

impl fmt::Display for GraphWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GraphWarning::DuplicateNode(id) => write!(f, "node {id} replaced by a duplicate"),
            GraphWarning::DuplicateEdge(index) => {
                write!(f, "duplicate of edge {index} skipped")
            }
        }
    }
}

/// Factor graph owning its nodes (by id) and edges (in insertion order).
#[derive(Debug, Clone, Default)]
pub struct Graph {
    nodes: BTreeMap<NodeId, Node>,
    edges: Vec<Edge>,
    // edge positions keyed by their node ids, for duplicate lookup
    edges_by_nodes: HashMap<Vec<NodeId>, Vec<usize>>,
    warnings: Vec<GraphWarning>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a node, replacing any node with the same id.
    ///
    /// Returns the replaced node. Replacing is not an error, but it is logged
    /// and recorded in [`Graph::warnings`].
    pub fn add_node(&mut self, node: Node) -> Option<Node> {
        let id = node.id();
        let replaced = self.nodes.insert(id, node);
        if replaced.is_some() {
            warn!("Node {} already in the graph, replacing it", id);
            self.warnings.push(GraphWarning::DuplicateNode(id));
        }
        replaced
    }

    /// Insert an edge whose nodes are already in the graph.
    ///
    /// Returns `Ok(false)` when an identical edge is present; the edge is then
    /// skipped with a warning.
    pub fn add_edge(&mut self, edge: Edge) -> GraphResult<bool> {
        for (&id, expected) in edge.nodes().iter().zip(edge.kind().node_kinds()) {
            let node = self
                .nodes
                .get(&id)
                .ok_or(GraphError::MissingNode { node: id })?;
            if node.kind() != expected {
                return Err(GraphError::NodeKindMismatch {
                    node: id,
                    expected: expected.to_string(),
                    actual: node.kind().to_string(),
                });
            }
        }

        if let Some(id) = edge.parameter() {
            let node = self
                .nodes
                .get(&id)
                .ok_or(GraphError::MissingNode { node: id })?;
            let measurement_kind = edge.kind().measurement_kind();
            let accepted = node
                .calibration()
                .and_then(|calibration| calibration.parameter_kind(measurement_kind));
            if accepted != Some(node.kind().value_kind()) {
                return Err(GraphError::ParameterMismatch(format!(
                    "node {id} ({}) cannot correct a {measurement_kind} measurement",
                    node.kind()
                )));
            }
        }

        let same_nodes = self.edges_by_nodes.entry(edge.nodes().to_vec()).or_default();
        if let Some(&index) = same_nodes.iter().find(|&&i| self.edges[i] == edge) {
            warn!("Edge {} already in the graph, skipping it", edge);
            self.warnings.push(GraphWarning::DuplicateEdge(index));
            return Ok(false);
        }
        same_nodes.push(self.edges.len());
        self.edges.push(edge);
        Ok(true)
    }

    pub fn node(&self, id: NodeId) -> GraphResult<&Node> {
        self.nodes.get(&id).ok_or(GraphError::NodeNotFound(id))
    }

    pub fn contains_node(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Nodes in ascending id order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// Edges in insertion order.
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn edge(&self, index: usize) -> GraphResult<&Edge> {
        self.edges.get(index).ok_or(GraphError::EdgeNotFound(index))
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }

    /// Duplicate insertions seen so far, oldest first.
    pub fn warnings(&self) -> &[GraphWarning] {
        &self.warnings
    }

    /// Update the value of a node; the kind must match.
    pub fn set_node_value(&mut self, id: NodeId, value: Value) -> GraphResult<()> {
        self.nodes
            .get_mut(&id)
            .ok_or(GraphError::NodeNotFound(id))?
            .set_value(value)
    }

    /// Make `next` the successor of parameter node `prev`.
    ///
    /// Both nodes must be parameters of the same kind. A node gets at most one
    /// successor and one predecessor, and the chain never closes a cycle.
    pub fn set_next(&mut self, prev: NodeId, next: NodeId) -> GraphResult<()> {
        let prev_node = self.node(prev)?;
        let next_node = self.node(next)?;
        for node in [prev_node, next_node] {
            if !node.is_parameter() {
                return Err(GraphError::NodeKindMismatch {
                    node: node.id(),
                    expected: "calibration parameter".to_string(),
                    actual: node.kind().to_string(),
                });
            }
        }
        if prev_node.kind() != next_node.kind() {
            return Err(GraphError::ParameterMismatch(format!(
                "cannot chain a {} node to a {} node",
                next_node.kind(),
                prev_node.kind()
            )));
        }
        if let Some(existing) = prev_node.next() {
            return Err(GraphError::ParameterAlreadyLinked { id: prev, next: existing });
        }
        if let Some(other) = self.nodes.values().find(|node| node.next() == Some(next)) {
            return Err(GraphError::ParameterMismatch(format!(
                "node {next} already follows node {}",
                other.id()
            )));
        }
        if self.parameter_chain(next)?.contains(&prev) {
            return Err(GraphError::ParameterMismatch(format!(
                "linking {prev} -> {next} would close a cycle"
            )));
        }

        debug!("Linking parameter {} -> {}", prev, next);
        self.nodes
            .get_mut(&prev)
            .ok_or(GraphError::NodeNotFound(prev))?
            .set_next(next)
    }

    /// Ids from `id` following the `next` links, `id` first.
    pub fn parameter_chain(&self, id: NodeId) -> GraphResult<Vec<NodeId>> {
        let mut chain = vec![id];
        let mut current = self.node(id)?;
        while let Some(next) = current.next() {
            if chain.contains(&next) {
                break;
            }
            chain.push(next);
            current = self.node(next)?;
        }
        Ok(chain)
    }

    /// Last parameter node of the chain starting at `id`.
    pub fn latest_parameter(&self, id: NodeId) -> GraphResult<&Node> {
        let chain = self.parameter_chain(id)?;
        let last = chain.last().copied().unwrap_or(id);
        self.node(last)
    }

    /// All `(prev, next)` parameter links in ascending `prev` order.
    pub fn links(&self) -> impl Iterator<Item = (NodeId, NodeId)> + '_ {
        self.nodes
            .values()
            .filter_map(|node| node.next().map(|next| (node.id(), next)))
    }

    /// Give node `old` the id `new`, rewriting every reference to it.
    pub fn reassign_node_id(&mut self, old: NodeId, new: NodeId) -> GraphResult<()> {
        if old == new {
            return self.node(old).map(|_| ());
        }
        if self.nodes.contains_key(&new) {
            return Err(GraphError::IdInUse(new));
        }
        let mut node = self.nodes.remove(&old).ok_or(GraphError::NodeNotFound(old))?;
        node.set_id(new);
        self.nodes.insert(new, node);

        for node in self.nodes.values_mut() {
            let next = node.next_mut();
            if *next == Some(old) {
                *next = Some(new);
            }
        }
        for edge in &mut self.edges {
            for id in edge.nodes_mut() {
                if *id == old {
                    *id = new;
                }
            }
            let parameter = edge.parameter_mut();
            if *parameter == Some(old) {
                *parameter = Some(new);
            }
        }
        self.edges_by_nodes.clear();
        for (index, edge) in self.edges.iter().enumerate() {
            self.edges_by_nodes
                .entry(edge.nodes().to_vec())
                .or_default()
                .push(index);
        }
        debug!("Reassigned node {} to id {}", old, new);
        Ok(())
    }

    /// χ² of the edge at `index`.
    pub fn edge_chi2(&self, index: usize) -> GraphResult<f64> {
        self.edge(index)?.chi2(self)
    }

    /// Sum of the χ² of all edges.
    pub fn total_chi2(&self) -> GraphResult<f64> {
        self.edges.iter().map(|edge| edge.chi2(self)).sum()
    }
}

impl fmt::Display for Graph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Graph: {} nodes, {} edges",
            self.node_count(),
            self.edge_count()
        )?;
        for node in self.nodes() {
            writeln!(f, "  {node}")?;
        }
        for edge in &self.edges {
            writeln!(f, "  {edge}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Calibration, EdgeKind, NodeKind};
    use crate::manifold::se2::SE2;
    use crate::manifold::LieGroup;
    use nalgebra::{DMatrix, Vector2};

    fn pose_graph() -> Graph {
        let mut graph = Graph::new();
        graph.add_node(Node::pose2(0, SE2::identity()));
        graph.add_node(Node::pose2(1, SE2::from_elements(1.0, 0.0, 0.0)));
        graph.add_node(Node::point2(2, Vector2::new(2.0, 1.0)));
        graph
    }

    fn odometry(from: NodeId, to: NodeId) -> Edge {
        Edge::new(
            EdgeKind::Pose2,
            vec![from, to],
            Value::SE2(SE2::from_elements(1.0, 0.0, 0.0)),
        )
        .unwrap()
    }

    fn bias(id: NodeId, angle: f64) -> Node {
        Node::parameter(id, Calibration::Bias, Value::SE2(SE2::from_elements(0.0, 0.0, angle)))
            .unwrap()
    }

    #[test]
    fn test_duplicate_node_replaces() {
        let mut graph = Graph::new();
        assert!(graph.add_node(Node::point2(4, Vector2::new(1.0, 1.0))).is_none());
        let replaced = graph.add_node(Node::point2(4, Vector2::new(2.0, 2.0)));
        assert!(replaced.is_some());
        assert_eq!(graph.node_count(), 1);
        assert_eq!(
            graph.node(4).unwrap().value().unwrap(),
            &Value::Vector2(Vector2::new(2.0, 2.0))
        );
        assert_eq!(graph.warnings(), &[GraphWarning::DuplicateNode(4)]);
    }

    #[test]
    fn test_edge_requires_nodes() {
        let mut graph = pose_graph();
        assert_eq!(
            graph.add_edge(odometry(0, 7)),
            Err(GraphError::MissingNode { node: 7 })
        );
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn test_edge_checks_node_kinds() {
        let mut graph = pose_graph();
        assert!(matches!(
            graph.add_edge(odometry(0, 2)),
            Err(GraphError::NodeKindMismatch { node: 2, .. })
        ));
    }

    #[test]
    fn test_duplicate_edge_skipped() {
        let mut graph = pose_graph();
        assert_eq!(graph.add_edge(odometry(0, 1)), Ok(true));
        assert_eq!(graph.add_edge(odometry(0, 1)), Ok(false));
        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph.warnings(), &[GraphWarning::DuplicateEdge(0)]);
    }

    #[test]
    fn test_node_lookup() {
        let graph = pose_graph();
        assert_eq!(graph.node(9).unwrap_err(), GraphError::NodeNotFound(9));
        let ids: Vec<_> = graph.nodes().map(Node::id).collect();
        assert_eq!(ids, vec![0, 1, 2]);
    }

    #[test]
    fn test_set_node_value() {
        let mut graph = pose_graph();
        graph
            .set_node_value(1, Value::SE2(SE2::from_elements(0.0, 1.0, 0.0)))
            .unwrap();
        assert!(graph
            .set_node_value(1, Value::Vector2(Vector2::zeros()))
            .is_err());
        assert!(graph.set_node_value(5, Value::SE2(SE2::identity())).is_err());
    }

    #[test]
    fn test_parameter_chain() {
        let mut graph = pose_graph();
        graph.add_node(bias(10, 0.1));
        graph.add_node(bias(11, 0.2));
        graph.add_node(bias(12, 0.3));
        graph.set_next(10, 11).unwrap();
        graph.set_next(11, 12).unwrap();

        assert_eq!(graph.parameter_chain(10).unwrap(), vec![10, 11, 12]);
        assert_eq!(graph.latest_parameter(10).unwrap().id(), 12);
        assert_eq!(graph.latest_parameter(12).unwrap().id(), 12);
        assert_eq!(graph.links().collect::<Vec<_>>(), vec![(10, 11), (11, 12)]);

        assert_eq!(
            graph.set_next(10, 12),
            Err(GraphError::ParameterAlreadyLinked { id: 10, next: 11 })
        );
        assert!(matches!(
            graph.set_next(12, 10),
            Err(GraphError::ParameterMismatch(_))
        ));
    }

    #[test]
    fn test_chain_rejects_mixed_kinds() {
        let mut graph = pose_graph();
        graph.add_node(bias(10, 0.1));
        graph.add_node(
            Node::parameter(11, Calibration::Offset, Value::SE2(SE2::identity())).unwrap(),
        );
        assert!(matches!(
            graph.set_next(10, 11),
            Err(GraphError::ParameterMismatch(_))
        ));
        assert!(matches!(
            graph.set_next(0, 10),
            Err(GraphError::NodeKindMismatch { node: 0, .. })
        ));
    }

    #[test]
    fn test_calibrated_edge_needs_matching_parameter() {
        let mut graph = pose_graph();
        graph.add_node(Node::new(
            20,
            NodeKind::Parameter(Calibration::Scale, crate::core::Group::SE3),
        ));
        let edge = odometry(0, 1).with_parameter(20).unwrap();
        assert!(matches!(
            graph.add_edge(edge),
            Err(GraphError::ParameterMismatch(_))
        ));

        graph.add_node(bias(21, 0.0));
        let edge = odometry(0, 1).with_parameter(21).unwrap();
        assert_eq!(graph.add_edge(edge), Ok(true));
    }

    #[test]
    fn test_reassign_node_id() {
        let mut graph = pose_graph();
        graph.add_node(bias(10, 0.0));
        graph.add_node(bias(11, 0.0));
        graph.set_next(10, 11).unwrap();
        graph
            .add_edge(odometry(0, 1).with_parameter(11).unwrap())
            .unwrap();

        assert_eq!(graph.reassign_node_id(0, 2), Err(GraphError::IdInUse(2)));
        graph.reassign_node_id(1, 5).unwrap();
        graph.reassign_node_id(11, 15).unwrap();

        assert!(!graph.contains_node(1));
        assert_eq!(graph.node(5).unwrap().id(), 5);
        assert_eq!(graph.edges()[0].nodes(), &[0, 5]);
        assert_eq!(graph.edges()[0].parameter(), Some(15));
        assert_eq!(graph.node(10).unwrap().next(), Some(15));
    }

    #[test]
    fn test_total_chi2() {
        let mut graph = pose_graph();
        graph.add_edge(odometry(0, 1)).unwrap();
        assert!(graph.total_chi2().unwrap() < 1e-12);

        let off = Edge::new(
            EdgeKind::Pose2Point2,
            vec![1, 2],
            Value::Vector2(Vector2::new(1.0, 2.0)),
        )
        .unwrap()
        .with_information(DMatrix::identity(2, 2) * 4.0)
        .unwrap();
        graph.add_edge(off).unwrap();
        // the point is seen at (1, 1) from pose 1
        assert!((graph.edge_chi2(1).unwrap() - 4.0).abs() < 1e-12);
        assert!((graph.total_chi2().unwrap() - 4.0).abs() < 1e-12);
        assert!(graph.edge_chi2(2).is_err());
    }
}
