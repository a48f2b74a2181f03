//! Measurement edges.
//!
//! An edge never owns its nodes. It stores their ids and resolves them through
//! the [`Graph`] whenever the estimate, error or χ² is needed, so it can never
//! point at a node the graph no longer holds.

use crate::core::attribute::check_information;
use crate::core::{
    Attribute, Graph, GraphError, GraphResult, NodeId, NodeKind, RecordTag, Value, ValueKind,
};
use crate::linalg::{invert, sub_block, Block};
use crate::manifold::LieGroup;
use nalgebra::{DMatrix, DVector};
use std::fmt;
use std::ops::Range;

/// Closed set of supported measurement types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EdgeKind {
    /// Relative SE(2) transformation between two 2D poses
    Pose2,
    /// Relative SE(3) transformation between two 3D poses
    Pose3,
    /// 2D landmark observed in the frame of a 2D pose
    Pose2Point2,
    /// 3D landmark observed in the frame of a 3D pose
    Pose3Point3,
}

impl EdgeKind {
    pub const fn measurement_kind(self) -> ValueKind {
        match self {
            EdgeKind::Pose2 => ValueKind::SE2,
            EdgeKind::Pose3 => ValueKind::SE3,
            EdgeKind::Pose2Point2 => ValueKind::Vector2,
            EdgeKind::Pose3Point3 => ValueKind::Vector3,
        }
    }

    /// Kinds of the connected nodes, in order.
    pub const fn node_kinds(self) -> [NodeKind; 2] {
        match self {
            EdgeKind::Pose2 => [NodeKind::Pose2, NodeKind::Pose2],
            EdgeKind::Pose3 => [NodeKind::Pose3, NodeKind::Pose3],
            EdgeKind::Pose2Point2 => [NodeKind::Pose2, NodeKind::Point2],
            EdgeKind::Pose3Point3 => [NodeKind::Pose3, NodeKind::Point3],
        }
    }

    pub const fn arity(self) -> usize {
        self.node_kinds().len()
    }

    /// Size of the error vector and of the information matrix.
    pub const fn error_dimension(self) -> usize {
        self.measurement_kind().error_dimension()
    }

    /// Only transformation measurements can be corrected by a parameter.
    pub const fn accepts_parameter(self) -> bool {
        matches!(self, EdgeKind::Pose2 | EdgeKind::Pose3)
    }
}

/// A measurement connecting two or more nodes.
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    kind: EdgeKind,
    nodes: Vec<NodeId>,
    measurement: Attribute,
    information: Option<DMatrix<f64>>,
    parameter: Option<NodeId>,
}

impl Edge {
    /// Edge of `kind` between `nodes` carrying `measurement`.
    pub fn new(kind: EdgeKind, nodes: Vec<NodeId>, measurement: Value) -> GraphResult<Self> {
        let mut edge = Edge::untyped(kind, nodes)?;
        edge.set_measurement(measurement)?;
        Ok(edge)
    }

    /// Edge whose measurement is not set yet.
    pub fn untyped(kind: EdgeKind, nodes: Vec<NodeId>) -> GraphResult<Self> {
        if nodes.len() < 2 {
            return Err(GraphError::InvalidEdge(format!(
                "an edge needs at least two nodes, got {}",
                nodes.len()
            )));
        }
        if nodes.len() != kind.arity() {
            return Err(GraphError::InvalidEdge(format!(
                "{kind:?} edge connects {} nodes, got {}",
                kind.arity(),
                nodes.len()
            )));
        }
        Ok(Edge {
            kind,
            nodes,
            measurement: Attribute::new(kind.measurement_kind()),
            information: None,
            parameter: None,
        })
    }

    /// Attach an information matrix, checking size and symmetry.
    pub fn with_information(mut self, information: DMatrix<f64>) -> GraphResult<Self> {
        self.set_information(Some(information))?;
        Ok(self)
    }

    /// Correct the measurement through the parameter node `parameter`.
    pub fn with_parameter(mut self, parameter: NodeId) -> GraphResult<Self> {
        if !self.kind.accepts_parameter() {
            return Err(GraphError::InvalidEdge(format!(
                "{:?} edges cannot carry a calibration parameter",
                self.kind
            )));
        }
        self.parameter = Some(parameter);
        Ok(self)
    }

    pub fn kind(&self) -> EdgeKind {
        self.kind
    }

    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    pub(crate) fn nodes_mut(&mut self) -> &mut [NodeId] {
        &mut self.nodes
    }

    pub fn measurement(&self) -> GraphResult<&Value> {
        self.measurement.value()
    }

    pub fn set_measurement(&mut self, measurement: Value) -> GraphResult<()> {
        self.measurement.set(measurement)
    }

    pub fn measurement_attribute(&self) -> &Attribute {
        &self.measurement
    }

    pub(crate) fn measurement_mut(&mut self) -> &mut Attribute {
        &mut self.measurement
    }

    /// `None` means the edge is unweighted.
    pub fn information(&self) -> Option<&DMatrix<f64>> {
        self.information.as_ref()
    }

    pub fn set_information(&mut self, information: Option<DMatrix<f64>>) -> GraphResult<()> {
        if let Some(m) = &information {
            check_information(m, self.kind.error_dimension())?;
        }
        self.information = information;
        Ok(())
    }

    /// Sub-block of the information matrix; square blocks stay matrices.
    pub fn information_block(
        &self,
        rows: Range<usize>,
        cols: Range<usize>,
    ) -> GraphResult<Option<Block>> {
        match &self.information {
            Some(m) => Ok(Some(sub_block(m, rows, cols)?)),
            None => Ok(None),
        }
    }

    /// Inverse of the information matrix.
    pub fn covariance(&self) -> GraphResult<Option<DMatrix<f64>>> {
        match &self.information {
            Some(m) => Ok(Some(invert(m)?)),
            None => Ok(None),
        }
    }

    pub fn parameter(&self) -> Option<NodeId> {
        self.parameter
    }

    pub(crate) fn parameter_mut(&mut self) -> &mut Option<NodeId> {
        &mut self.parameter
    }

    /// Record tag used for this edge in text files.
    pub fn tag(&self) -> &'static str {
        RecordTag::for_edge(self.kind, self.parameter.is_some()).as_str()
    }

    /// Measurement corrected by the attached parameter node, if any.
    pub fn estimate(&self, graph: &Graph) -> GraphResult<Value> {
        let measurement = self.measurement()?;
        let Some(id) = self.parameter else {
            return Ok(measurement.clone());
        };
        let node = graph.node(id)?;
        let calibration = node.calibration().ok_or_else(|| GraphError::NodeKindMismatch {
            node: id,
            expected: "calibration parameter".to_string(),
            actual: node.kind().to_string(),
        })?;
        calibration.compose_transformation(node.value()?, measurement, false)
    }

    /// What the current node states predict for the measurement.
    pub fn actual(&self, graph: &Graph) -> GraphResult<Value> {
        let from = graph.node(self.nodes[0])?.value()?;
        let to = graph.node(self.nodes[1])?.value()?;
        let value = match (from, to) {
            (Value::SE2(a), Value::SE2(b)) => Value::SE2(a.between(b)),
            (Value::SE3(a), Value::SE3(b)) => Value::SE3(a.between(b)),
            (Value::SE2(pose), Value::Vector2(point)) => {
                Value::Vector2(pose.inverse().act(point))
            }
            (Value::SE3(pose), Value::Vector3(point)) => {
                Value::Vector3(pose.inverse().act(point))
            }
            (a, b) => {
                return Err(GraphError::InvalidEdge(format!(
                    "{:?} edge cannot relate {} and {} values",
                    self.kind,
                    a.kind(),
                    b.kind()
                )))
            }
        };
        Ok(value)
    }

    /// Error vector, estimate − actual.
    ///
    /// Transformations are compared in the tangent space of the actual value
    /// (`estimate.minus(actual)`), points by plain difference.
    pub fn error(&self, graph: &Graph) -> GraphResult<DVector<f64>> {
        let estimate = self.estimate(graph)?;
        let actual = self.actual(graph)?;
        let error = match (&estimate, &actual) {
            (Value::SE2(e), Value::SE2(a)) => DVector::from_column_slice(e.minus(a).as_slice()),
            (Value::SE3(e), Value::SE3(a)) => DVector::from_column_slice(e.minus(a).as_slice()),
            (Value::Vector2(e), Value::Vector2(a)) => DVector::from_column_slice((e - a).as_slice()),
            (Value::Vector3(e), Value::Vector3(a)) => DVector::from_column_slice((e - a).as_slice()),
            _ => {
                return Err(GraphError::TypeMismatch {
                    expected: actual.kind(),
                    actual: estimate.kind(),
                })
            }
        };
        Ok(error)
    }

    /// Weighted squared error eᵀ Ω e; unweighted edges use Ω = I.
    pub fn chi2(&self, graph: &Graph) -> GraphResult<f64> {
        let error = self.error(graph)?;
        Ok(match &self.information {
            Some(omega) => error.dot(&(omega * &error)),
            None => error.norm_squared(),
        })
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {:?}", self.tag(), self.nodes)?;
        if let Some(parameter) = self.parameter {
            write!(f, " param {parameter}")?;
        }
        match self.measurement.value() {
            Ok(value) => write!(f, " {value}"),
            Err(_) => f.write_str(" unset"),
        }
    }
}
