use crate::core::node::{Group, NodeKind};
use crate::core::{Calibration, EdgeKind, GraphError, GraphResult};
use std::fmt;
use std::str::FromStr;

/// Leading word of a text record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordTag {
    VertexSE2,
    VertexSE3Quat,
    VertexXY,
    VertexTrackXYZ,
    ParamSE2Bias,
    ParamSE2Offset,
    ParamSE2Scale,
    ParamSE3Bias,
    ParamSE3Offset,
    ParamSE3Scale,
    ParamNext,
    EdgeSE2,
    EdgeSE3Quat,
    EdgeSE2XY,
    EdgeSE3TrackXYZ,
    EdgeSE2Calib,
    EdgeSE3QuatCalib,
}

impl RecordTag {
    pub const ALL: [RecordTag; 17] = [
        RecordTag::VertexSE2,
        RecordTag::VertexSE3Quat,
        RecordTag::VertexXY,
        RecordTag::VertexTrackXYZ,
        RecordTag::ParamSE2Bias,
        RecordTag::ParamSE2Offset,
        RecordTag::ParamSE2Scale,
        RecordTag::ParamSE3Bias,
        RecordTag::ParamSE3Offset,
        RecordTag::ParamSE3Scale,
        RecordTag::ParamNext,
        RecordTag::EdgeSE2,
        RecordTag::EdgeSE3Quat,
        RecordTag::EdgeSE2XY,
        RecordTag::EdgeSE3TrackXYZ,
        RecordTag::EdgeSE2Calib,
        RecordTag::EdgeSE3QuatCalib,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            RecordTag::VertexSE2 => "VERTEX_SE2",
            RecordTag::VertexSE3Quat => "VERTEX_SE3:QUAT",
            RecordTag::VertexXY => "VERTEX_XY",
            RecordTag::VertexTrackXYZ => "VERTEX_TRACKXYZ",
            RecordTag::ParamSE2Bias => "PARAM_SE2_BIAS",
            RecordTag::ParamSE2Offset => "PARAM_SE2_OFFSET",
            RecordTag::ParamSE2Scale => "PARAM_SE2_SCALE",
            RecordTag::ParamSE3Bias => "PARAM_SE3_BIAS",
            RecordTag::ParamSE3Offset => "PARAM_SE3_OFFSET",
            RecordTag::ParamSE3Scale => "PARAM_SE3_SCALE",
            RecordTag::ParamNext => "PARAM_NEXT",
            RecordTag::EdgeSE2 => "EDGE_SE2",
            RecordTag::EdgeSE3Quat => "EDGE_SE3:QUAT",
            RecordTag::EdgeSE2XY => "EDGE_SE2_XY",
            RecordTag::EdgeSE3TrackXYZ => "EDGE_SE3_TRACKXYZ",
            RecordTag::EdgeSE2Calib => "EDGE_SE2:CALIB",
            RecordTag::EdgeSE3QuatCalib => "EDGE_SE3:QUAT:CALIB",
        }
    }

    /// Tag of a node record.
    pub const fn for_node(kind: NodeKind) -> RecordTag {
        match kind {
            NodeKind::Pose2 => RecordTag::VertexSE2,
            NodeKind::Pose3 => RecordTag::VertexSE3Quat,
            NodeKind::Point2 => RecordTag::VertexXY,
            NodeKind::Point3 => RecordTag::VertexTrackXYZ,
            NodeKind::Parameter(Calibration::Bias, Group::SE2) => RecordTag::ParamSE2Bias,
            NodeKind::Parameter(Calibration::Offset, Group::SE2) => RecordTag::ParamSE2Offset,
            NodeKind::Parameter(Calibration::Scale, Group::SE2) => RecordTag::ParamSE2Scale,
            NodeKind::Parameter(Calibration::Bias, Group::SE3) => RecordTag::ParamSE3Bias,
            NodeKind::Parameter(Calibration::Offset, Group::SE3) => RecordTag::ParamSE3Offset,
            NodeKind::Parameter(Calibration::Scale, Group::SE3) => RecordTag::ParamSE3Scale,
        }
    }

    /// Tag of an edge record; calibrated edges get their own tag.
    pub const fn for_edge(kind: EdgeKind, calibrated: bool) -> RecordTag {
        match (kind, calibrated) {
            (EdgeKind::Pose2, false) => RecordTag::EdgeSE2,
            (EdgeKind::Pose2, true) => RecordTag::EdgeSE2Calib,
            (EdgeKind::Pose3, false) => RecordTag::EdgeSE3Quat,
            (EdgeKind::Pose3, true) => RecordTag::EdgeSE3QuatCalib,
            (EdgeKind::Pose2Point2, _) => RecordTag::EdgeSE2XY,
            (EdgeKind::Pose3Point3, _) => RecordTag::EdgeSE3TrackXYZ,
        }
    }

    /// Node kind declared by a vertex or parameter tag.
    pub const fn node_kind(self) -> Option<NodeKind> {
        let kind = match self {
            RecordTag::VertexSE2 => NodeKind::Pose2,
            RecordTag::VertexSE3Quat => NodeKind::Pose3,
            RecordTag::VertexXY => NodeKind::Point2,
            RecordTag::VertexTrackXYZ => NodeKind::Point3,
            RecordTag::ParamSE2Bias => NodeKind::Parameter(Calibration::Bias, Group::SE2),
            RecordTag::ParamSE2Offset => NodeKind::Parameter(Calibration::Offset, Group::SE2),
            RecordTag::ParamSE2Scale => NodeKind::Parameter(Calibration::Scale, Group::SE2),
            RecordTag::ParamSE3Bias => NodeKind::Parameter(Calibration::Bias, Group::SE3),
            RecordTag::ParamSE3Offset => NodeKind::Parameter(Calibration::Offset, Group::SE3),
            RecordTag::ParamSE3Scale => NodeKind::Parameter(Calibration::Scale, Group::SE3),
            _ => return None,
        };
        Some(kind)
    }

    /// Edge kind declared by an edge tag, and whether it carries a parameter id.
    pub const fn edge_kind(self) -> Option<(EdgeKind, bool)> {
        let kind = match self {
            RecordTag::EdgeSE2 => (EdgeKind::Pose2, false),
            RecordTag::EdgeSE3Quat => (EdgeKind::Pose3, false),
            RecordTag::EdgeSE2XY => (EdgeKind::Pose2Point2, false),
            RecordTag::EdgeSE3TrackXYZ => (EdgeKind::Pose3Point3, false),
            RecordTag::EdgeSE2Calib => (EdgeKind::Pose2, true),
            RecordTag::EdgeSE3QuatCalib => (EdgeKind::Pose3, true),
            _ => return None,
        };
        Some(kind)
    }
}

impl fmt::Display for RecordTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordTag {
    type Err = GraphError;

    fn from_str(s: &str) -> GraphResult<Self> {
        RecordTag::ALL
            .into_iter()
            .find(|tag| tag.as_str() == s)
            .ok_or_else(|| GraphError::UnsupportedType(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_names_parse_back() {
        for tag in RecordTag::ALL {
            assert_eq!(tag.as_str().parse::<RecordTag>().unwrap(), tag);
        }
        assert_eq!(
            "VERTEX_SE2:EXTRA".parse::<RecordTag>(),
            Err(GraphError::UnsupportedType("VERTEX_SE2:EXTRA".to_string()))
        );
    }

    #[test]
    fn test_every_tag_has_one_role() {
        for tag in RecordTag::ALL {
            let roles = [
                tag.node_kind().is_some(),
                tag.edge_kind().is_some(),
                tag == RecordTag::ParamNext,
            ];
            assert_eq!(roles.iter().filter(|r| **r).count(), 1, "{tag}");
        }
    }

    #[test]
    fn test_node_tags_match_kinds() {
        for tag in RecordTag::ALL {
            if let Some(kind) = tag.node_kind() {
                assert_eq!(RecordTag::for_node(kind), tag);
            }
            if let Some((kind, calibrated)) = tag.edge_kind() {
                assert_eq!(RecordTag::for_edge(kind, calibrated), tag);
            }
        }
    }
}
