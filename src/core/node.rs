use crate::core::attribute::check_information;
use crate::core::{Attribute, Calibration, GraphError, GraphResult, RecordTag, Value, ValueKind};
use nalgebra::{DMatrix, Vector2, Vector3};
use std::fmt;

use crate::manifold::se2::SE2;
use crate::manifold::se3::SE3;

/// Graph-scoped node identifier.
pub type NodeId = usize;

/// Transformation group a calibration parameter applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Group {
    SE2,
    SE3,
}

impl Group {
    /// Value kind of the transformations in this group.
    pub const fn transformation_kind(self) -> ValueKind {
        match self {
            Group::SE2 => ValueKind::SE2,
            Group::SE3 => ValueKind::SE3,
        }
    }
}

/// What a node stands for. Fixes the kind of value it holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Pose2,
    Pose3,
    Point2,
    Point3,
    /// Calibration parameter correcting measurements of the given group
    Parameter(Calibration, Group),
}

impl NodeKind {
    /// Kind of value a node of this kind holds.
    pub fn value_kind(self) -> ValueKind {
        match self {
            NodeKind::Pose2 => ValueKind::SE2,
            NodeKind::Pose3 => ValueKind::SE3,
            NodeKind::Point2 => ValueKind::Vector2,
            NodeKind::Point3 => ValueKind::Vector3,
            NodeKind::Parameter(Calibration::Scale, Group::SE2) => ValueKind::Vector3,
            NodeKind::Parameter(Calibration::Scale, Group::SE3) => ValueKind::Vector6,
            NodeKind::Parameter(_, group) => group.transformation_kind(),
        }
    }

    pub fn is_parameter(self) -> bool {
        matches!(self, NodeKind::Parameter(..))
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKind::Pose2 => f.write_str("pose2"),
            NodeKind::Pose3 => f.write_str("pose3"),
            NodeKind::Point2 => f.write_str("point2"),
            NodeKind::Point3 => f.write_str("point3"),
            NodeKind::Parameter(calibration, group) => {
                write!(f, "{group:?} {} parameter", calibration.name().to_lowercase())
            }
        }
    }
}

/// A graph vertex: pose, landmark or calibration parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    id: NodeId,
    kind: NodeKind,
    attribute: Attribute,
    information: Option<DMatrix<f64>>,
    next: Option<NodeId>,
}

impl Node {
    /// Node of `kind` whose value is not set yet.
    pub fn new(id: NodeId, kind: NodeKind) -> Self {
        Node {
            id,
            kind,
            attribute: Attribute::new(kind.value_kind()),
            information: None,
            next: None,
        }
    }

    /// Node of `kind` holding `value`; fails if the value kind does not fit.
    pub fn with_value(id: NodeId, kind: NodeKind, value: Value) -> GraphResult<Self> {
        let mut node = Node::new(id, kind);
        node.set_value(value)?;
        Ok(node)
    }

    pub fn pose2(id: NodeId, pose: SE2) -> Self {
        Node::from_parts(id, NodeKind::Pose2, Value::SE2(pose))
    }

    pub fn pose3(id: NodeId, pose: SE3) -> Self {
        Node::from_parts(id, NodeKind::Pose3, Value::SE3(pose))
    }

    pub fn point2(id: NodeId, point: Vector2<f64>) -> Self {
        Node::from_parts(id, NodeKind::Point2, Value::Vector2(point))
    }

    pub fn point3(id: NodeId, point: Vector3<f64>) -> Self {
        Node::from_parts(id, NodeKind::Point3, Value::Vector3(point))
    }

    /// Calibration parameter node; the group is inferred from the value.
    pub fn parameter(id: NodeId, calibration: Calibration, value: Value) -> GraphResult<Self> {
        let group = [Group::SE2, Group::SE3]
            .into_iter()
            .find(|group| {
                calibration.parameter_kind(group.transformation_kind()) == Some(value.kind())
            })
            .ok_or_else(|| {
                GraphError::ParameterMismatch(format!(
                    "{calibration} parameter cannot hold a {} value",
                    value.kind()
                ))
            })?;
        Node::with_value(id, NodeKind::Parameter(calibration, group), value)
    }

    // kind and value agree by construction
    fn from_parts(id: NodeId, kind: NodeKind, value: Value) -> Self {
        Node {
            id,
            kind,
            attribute: Attribute::from(value),
            information: None,
            next: None,
        }
    }

    /// Attach a prior information matrix.
    pub fn with_information(mut self, information: DMatrix<f64>) -> GraphResult<Self> {
        check_information(&information, self.kind.value_kind().error_dimension())?;
        self.information = Some(information);
        Ok(self)
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub(crate) fn set_id(&mut self, id: NodeId) {
        self.id = id;
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn calibration(&self) -> Option<Calibration> {
        match self.kind {
            NodeKind::Parameter(calibration, _) => Some(calibration),
            _ => None,
        }
    }

    pub fn is_parameter(&self) -> bool {
        self.kind.is_parameter()
    }

    pub fn has_value(&self) -> bool {
        self.attribute.has_value()
    }

    pub fn value(&self) -> GraphResult<&Value> {
        self.attribute.value()
    }

    /// Replace the value; its kind must match the node kind.
    pub fn set_value(&mut self, value: Value) -> GraphResult<()> {
        self.attribute.set(value)
    }

    pub fn attribute(&self) -> &Attribute {
        &self.attribute
    }

    pub(crate) fn attribute_mut(&mut self) -> &mut Attribute {
        &mut self.attribute
    }

    /// Prior information matrix; `None` means the node carries no uncertainty.
    pub fn information(&self) -> Option<&DMatrix<f64>> {
        self.information.as_ref()
    }

    /// Successor in the parameter chain.
    pub fn next(&self) -> Option<NodeId> {
        self.next
    }

    /// Link the successor; the chain is append-only.
    pub(crate) fn set_next(&mut self, next: NodeId) -> GraphResult<()> {
        if let Some(existing) = self.next {
            return Err(GraphError::ParameterAlreadyLinked {
                id: self.id,
                next: existing,
            });
        }
        self.next = Some(next);
        Ok(())
    }

    pub(crate) fn next_mut(&mut self) -> &mut Option<NodeId> {
        &mut self.next
    }

    /// Record tag used for this node in text files.
    pub fn tag(&self) -> &'static str {
        RecordTag::for_node(self.kind).as_str()
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.attribute.value() {
            Ok(value) => write!(f, "{} [ id: {}, value: {} ]", self.tag(), self.id, value),
            Err(_) => write!(f, "{} [ id: {}, value: unset ]", self.tag(), self.id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifold::LieGroup;
    use nalgebra::Vector6;

    #[test]
    fn test_node_kinds() {
        assert_eq!(NodeKind::Pose3.value_kind(), ValueKind::SE3);
        assert_eq!(
            NodeKind::Parameter(Calibration::Scale, Group::SE2).value_kind(),
            ValueKind::Vector3
        );
        assert_eq!(
            NodeKind::Parameter(Calibration::Offset, Group::SE3).value_kind(),
            ValueKind::SE3
        );
    }

    #[test]
    fn test_untyped_node() {
        let node = Node::new(3, NodeKind::Point2);
        assert!(!node.has_value());
        assert_eq!(node.value(), Err(GraphError::Uninitialized));
        assert_eq!(node.tag(), "VERTEX_XY");
    }

    #[test]
    fn test_with_value_checks_kind() {
        let result = Node::with_value(1, NodeKind::Pose2, Value::Vector2(Vector2::zeros()));
        assert!(matches!(result, Err(GraphError::TypeMismatch { .. })));
    }

    #[test]
    fn test_parameter_group_inference() {
        let bias = Node::parameter(7, Calibration::Bias, Value::SE3(SE3::from_elements(
            0.0, 0.0, 0.0, 0.0, 0.0, 0.1,
        )))
        .unwrap();
        assert_eq!(bias.kind(), NodeKind::Parameter(Calibration::Bias, Group::SE3));
        assert_eq!(bias.calibration(), Some(Calibration::Bias));

        let scale = Node::parameter(8, Calibration::Scale, Value::Vector6(Vector6::repeat(1.0)))
            .unwrap();
        assert_eq!(scale.kind(), NodeKind::Parameter(Calibration::Scale, Group::SE3));

        let wrong = Node::parameter(9, Calibration::Scale, Value::Vector2(Vector2::zeros()));
        assert!(matches!(wrong, Err(GraphError::ParameterMismatch(_))));
    }

    #[test]
    fn test_set_next_is_append_only() {
        let mut node = Node::parameter(1, Calibration::Offset, Value::SE2(SE2::identity())).unwrap();
        node.set_next(2).unwrap();
        assert_eq!(
            node.set_next(3),
            Err(GraphError::ParameterAlreadyLinked { id: 1, next: 2 })
        );
        assert_eq!(node.next(), Some(2));
    }

    #[test]
    fn test_prior_information() {
        let node = Node::point2(1, Vector2::new(1.0, 2.0));
        assert!(node.clone().with_information(DMatrix::identity(2, 2)).is_ok());
        assert!(node.with_information(DMatrix::identity(3, 3)).is_err());
    }
}
