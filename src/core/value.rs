use crate::core::{GraphError, GraphResult};
use crate::manifold::se2::SE2;
use crate::manifold::se3::SE3;
use nalgebra::{Matrix2, Matrix3, Vector2, Vector3, Vector6};
use std::fmt;
use std::str::FromStr;

/// The closed set of value types nodes and edges can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    /// 2D pose, written as `x y angle`
    SE2,
    /// 3D pose, written as `x y z qx qy qz qw`
    SE3,
    Vector2,
    Vector3,
    Vector6,
    /// Symmetric 2×2 matrix, written as its upper triangle
    SymMatrix2,
    /// Symmetric 3×3 matrix, written as its upper triangle
    SymMatrix3,
}

impl ValueKind {
    pub const ALL: [ValueKind; 7] = [
        ValueKind::SE2,
        ValueKind::SE3,
        ValueKind::Vector2,
        ValueKind::Vector3,
        ValueKind::Vector6,
        ValueKind::SymMatrix2,
        ValueKind::SymMatrix3,
    ];

    /// Number of words the value occupies in a text record.
    pub const fn dimension(self) -> usize {
        match self {
            ValueKind::SE2 => 3,
            ValueKind::SE3 => 7,
            ValueKind::Vector2 => 2,
            ValueKind::Vector3 => 3,
            ValueKind::Vector6 => 6,
            ValueKind::SymMatrix2 => 3,
            ValueKind::SymMatrix3 => 6,
        }
    }

    /// Dimension of the error vector of a value of this kind, i.e. the size
    /// of a matching information matrix.
    pub const fn error_dimension(self) -> usize {
        match self {
            ValueKind::SE2 => 3,
            ValueKind::SE3 => 6,
            ValueKind::Vector2 => 2,
            ValueKind::Vector3 => 3,
            ValueKind::Vector6 => 6,
            ValueKind::SymMatrix2 => 3,
            ValueKind::SymMatrix3 => 6,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            ValueKind::SE2 => "SE2",
            ValueKind::SE3 => "SE3",
            ValueKind::Vector2 => "VECTOR2",
            ValueKind::Vector3 => "VECTOR3",
            ValueKind::Vector6 => "VECTOR6",
            ValueKind::SymMatrix2 => "SYMMATRIX2",
            ValueKind::SymMatrix3 => "SYMMATRIX3",
        }
    }

    /// Kind of a runtime value.
    pub fn of(value: &Value) -> ValueKind {
        match value {
            Value::SE2(_) => ValueKind::SE2,
            Value::SE3(_) => ValueKind::SE3,
            Value::Vector2(_) => ValueKind::Vector2,
            Value::Vector3(_) => ValueKind::Vector3,
            Value::Vector6(_) => ValueKind::Vector6,
            Value::SymMatrix2(_) => ValueKind::SymMatrix2,
            Value::SymMatrix3(_) => ValueKind::SymMatrix3,
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ValueKind {
    type Err = GraphError;

    fn from_str(s: &str) -> GraphResult<Self> {
        ValueKind::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| GraphError::UnsupportedType(s.to_string()))
    }
}

/// A concrete value of one of the supported kinds.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    SE2(SE2),
    SE3(SE3),
    Vector2(Vector2<f64>),
    Vector3(Vector3<f64>),
    Vector6(Vector6<f64>),
    SymMatrix2(Matrix2<f64>),
    SymMatrix3(Matrix3<f64>),
}

impl Value {
    pub fn kind(&self) -> ValueKind {
        ValueKind::of(self)
    }

    pub fn as_se2(&self) -> Option<&SE2> {
        match self {
            Value::SE2(pose) => Some(pose),
            _ => None,
        }
    }

    pub fn as_se3(&self) -> Option<&SE3> {
        match self {
            Value::SE3(pose) => Some(pose),
            _ => None,
        }
    }

    pub fn as_vector2(&self) -> Option<&Vector2<f64>> {
        match self {
            Value::Vector2(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_vector3(&self) -> Option<&Vector3<f64>> {
        match self {
            Value::Vector3(v) => Some(v),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::SE2(pose) => write!(f, "{pose}"),
            Value::SE3(pose) => write!(f, "{pose}"),
            Value::Vector2(v) => write!(f, "[{:.4}, {:.4}]", v.x, v.y),
            Value::Vector3(v) => write!(f, "[{:.4}, {:.4}, {:.4}]", v.x, v.y, v.z),
            Value::Vector6(v) => write!(f, "{}", v.transpose()),
            Value::SymMatrix2(m) => write!(f, "{m}"),
            Value::SymMatrix3(m) => write!(f, "{m}"),
        }
    }
}

impl From<SE2> for Value {
    fn from(pose: SE2) -> Self {
        Value::SE2(pose)
    }
}

impl From<SE3> for Value {
    fn from(pose: SE3) -> Self {
        Value::SE3(pose)
    }
}

impl From<Vector2<f64>> for Value {
    fn from(v: Vector2<f64>) -> Self {
        Value::Vector2(v)
    }
}

impl From<Vector3<f64>> for Value {
    fn from(v: Vector3<f64>) -> Self {
        Value::Vector3(v)
    }
}

impl From<Vector6<f64>> for Value {
    fn from(v: Vector6<f64>) -> Self {
        Value::Vector6(v)
    }
}
