//! Typed value containers with word-based read/write.
//!
//! An [`Attribute`] is bound to one [`ValueKind`] for its whole life. It may
//! start without a value; [`Attribute::has_value`] gates access and every
//! setter checks the kind, so an attribute is never partially valid.

use crate::core::{GraphError, GraphResult, Value, ValueKind};
use crate::linalg::{is_symmetric, list_to_symmetric, symmetric_to_list};
use crate::manifold::se2::SE2;
use crate::manifold::se3::SE3;
use nalgebra::{DMatrix, Matrix2, Matrix3, Quaternion, Vector2, Vector3, Vector6};

/// Decimal digits used when writing floats.
pub const PRECISION: usize = 5;

/// Tolerance used when checking symmetric values.
const SYMMETRY_TOLERANCE: f64 = 1e-9;

/// Format a float with `precision` decimals.
///
/// Values that are integral after rounding are written without a fractional
/// part (`2.0` → `"2"`, `-0.000001` → `"0"`).
pub fn format_float(value: f64, precision: usize) -> String {
    let text = format!("{value:.precision$}");
    let rounded = text.parse::<f64>().unwrap_or(value);
    if rounded.is_finite() && rounded.fract() == 0.0 {
        if rounded == 0.0 {
            "0".to_string()
        } else {
            format!("{rounded:.0}")
        }
    } else {
        text
    }
}

/// Parse every word as a float.
pub(crate) fn parse_floats(words: &[&str]) -> GraphResult<Vec<f64>> {
    words
        .iter()
        .map(|word| {
            word.parse::<f64>()
                .map_err(|_| GraphError::MalformedRecord(format!("'{word}' is not a number")))
        })
        .collect()
}

/// Value kind plus optional value.
#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    kind: ValueKind,
    value: Option<Value>,
}

impl Attribute {
    /// Attribute of `kind` without a value.
    pub fn new(kind: ValueKind) -> Self {
        Attribute { kind, value: None }
    }

    pub fn kind(&self) -> ValueKind {
        self.kind
    }

    /// Number of words [`Attribute::read`] consumes and [`Attribute::write`] produces.
    pub fn dimension(&self) -> usize {
        self.kind.dimension()
    }

    pub fn has_value(&self) -> bool {
        self.value.is_some()
    }

    pub fn value(&self) -> GraphResult<&Value> {
        self.value.as_ref().ok_or(GraphError::Uninitialized)
    }

    /// Set the value, checking its kind (and symmetry for matrix kinds).
    pub fn set(&mut self, value: Value) -> GraphResult<()> {
        if value.kind() != self.kind {
            return Err(GraphError::TypeMismatch {
                expected: self.kind,
                actual: value.kind(),
            });
        }
        let symmetric = match &value {
            Value::SymMatrix2(m) => (m - m.transpose()).amax() <= SYMMETRY_TOLERANCE,
            Value::SymMatrix3(m) => (m - m.transpose()).amax() <= SYMMETRY_TOLERANCE,
            _ => true,
        };
        if !symmetric {
            return Err(GraphError::NotSymmetric(value.to_string()));
        }
        self.value = Some(value);
        Ok(())
    }

    /// Parse exactly [`Attribute::dimension`] words into the value.
    pub fn read(&mut self, words: &[&str]) -> GraphResult<()> {
        if words.len() != self.dimension() {
            return Err(GraphError::MalformedRecord(format!(
                "{} expects {} words, got {}",
                self.kind,
                self.dimension(),
                words.len()
            )));
        }
        let floats = parse_floats(words)?;
        let value = value_from_floats(self.kind, &floats)?;
        self.set(value)
    }

    /// Parse the leading [`Attribute::dimension`] words and return the rest.
    pub fn read_rest<'a, 'w>(&mut self, words: &'a [&'w str]) -> GraphResult<&'a [&'w str]> {
        let dimension = self.dimension();
        if words.len() < dimension {
            return Err(GraphError::MalformedRecord(format!(
                "{} expects {} words, got {}",
                self.kind,
                dimension,
                words.len()
            )));
        }
        let (head, rest) = words.split_at(dimension);
        self.read(head)?;
        Ok(rest)
    }

    /// Serialize the value with [`PRECISION`] decimals.
    pub fn write(&self) -> GraphResult<Vec<String>> {
        let value = self.value()?;
        Ok(value_to_floats(value)
            .into_iter()
            .map(|x| format_float(x, PRECISION))
            .collect())
    }
}

impl From<Value> for Attribute {
    fn from(value: Value) -> Self {
        Attribute {
            kind: value.kind(),
            value: Some(value),
        }
    }
}

/// Rebuild a value of `kind` from exactly `kind.dimension()` floats.
fn value_from_floats(kind: ValueKind, f: &[f64]) -> GraphResult<Value> {
    let value = match kind {
        ValueKind::SE2 => Value::SE2(SE2::from_elements(f[0], f[1], f[2])),
        ValueKind::SE3 => Value::SE3(SE3::from_translation_quaternion(
            Vector3::new(f[0], f[1], f[2]),
            &Quaternion::new(f[6], f[3], f[4], f[5]),
        )?),
        ValueKind::Vector2 => Value::Vector2(Vector2::from_column_slice(f)),
        ValueKind::Vector3 => Value::Vector3(Vector3::from_column_slice(f)),
        ValueKind::Vector6 => Value::Vector6(Vector6::from_column_slice(f)),
        ValueKind::SymMatrix2 => {
            let m = list_to_symmetric(f)?;
            Value::SymMatrix2(Matrix2::from_iterator(m.iter().copied()))
        }
        ValueKind::SymMatrix3 => {
            let m = list_to_symmetric(f)?;
            Value::SymMatrix3(Matrix3::from_iterator(m.iter().copied()))
        }
    };
    Ok(value)
}

/// Flatten a value into the floats written for it.
fn value_to_floats(value: &Value) -> Vec<f64> {
    match value {
        Value::SE2(pose) => pose.elements().iter().copied().collect(),
        Value::SE3(pose) => {
            let t = pose.translation();
            let q = pose.quaternion();
            vec![t.x, t.y, t.z, q.i, q.j, q.k, q.w]
        }
        Value::Vector2(v) => v.iter().copied().collect(),
        Value::Vector3(v) => v.iter().copied().collect(),
        Value::Vector6(v) => v.iter().copied().collect(),
        Value::SymMatrix2(m) => symmetric_to_list(&DMatrix::from_iterator(2, 2, m.iter().copied())),
        Value::SymMatrix3(m) => symmetric_to_list(&DMatrix::from_iterator(3, 3, m.iter().copied())),
    }
}

/// Parse packed upper-triangle words into a symmetric matrix.
pub(crate) fn read_symmetric(words: &[&str]) -> GraphResult<DMatrix<f64>> {
    let floats = parse_floats(words)?;
    list_to_symmetric(&floats).map_err(|e| GraphError::MalformedRecord(e.to_string()))
}

/// Write a symmetric matrix as its packed upper triangle.
pub(crate) fn write_symmetric(m: &DMatrix<f64>) -> Vec<String> {
    symmetric_to_list(m)
        .into_iter()
        .map(|x| format_float(x, PRECISION))
        .collect()
}

/// Check that `m` is a symmetric `dimension`×`dimension` matrix.
pub(crate) fn check_information(m: &DMatrix<f64>, dimension: usize) -> GraphResult<()> {
    if m.nrows() != dimension || m.ncols() != dimension {
        return Err(GraphError::MalformedRecord(format!(
            "information matrix must be {dimension}x{dimension}, got {}x{}",
            m.nrows(),
            m.ncols()
        )));
    }
    if !is_symmetric(m, SYMMETRY_TOLERANCE) {
        return Err(GraphError::NotSymmetric(m.to_string()));
    }
    Ok(())
}
