//! Self-calibration parameters.
//!
//! A calibration parameter corrects a raw transformation measurement before it
//! is compared with the node states:
//!
//! | kind   | forward (`inverse = false`) | backward (`inverse = true`) |
//! |--------|-----------------------------|-----------------------------|
//! | Bias   | t ∘ p                       | t ∘ p⁻¹                     |
//! | Offset | p ∘ t ∘ p⁻¹                 | p⁻¹ ∘ t ∘ p                 |
//! | Scale  | elements(t) ⊙ p             | elements(t) ⊘ p             |
//!
//! Scale works on the `[x, y, angle]` (SE2) or `[x, y, z, roll, pitch, yaw]`
//! (SE3) elements of the transformation, not on its tangent vector.

use crate::core::{GraphError, GraphResult, Value, ValueKind};
use crate::manifold::se2::SE2;
use crate::manifold::se3::SE3;
use crate::manifold::LieGroup;
use nalgebra::Vector6;
use std::fmt;

/// How a parameter node corrects a measurement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Calibration {
    Bias,
    Offset,
    Scale,
}

impl Calibration {
    pub const fn name(self) -> &'static str {
        match self {
            Calibration::Bias => "BIAS",
            Calibration::Offset => "OFFSET",
            Calibration::Scale => "SCALE",
        }
    }

    /// Value kind of a parameter that corrects `transformation` measurements.
    pub fn parameter_kind(self, transformation: ValueKind) -> Option<ValueKind> {
        match (self, transformation) {
            (Calibration::Bias | Calibration::Offset, ValueKind::SE2 | ValueKind::SE3) => {
                Some(transformation)
            }
            (Calibration::Scale, ValueKind::SE2) => Some(ValueKind::Vector3),
            (Calibration::Scale, ValueKind::SE3) => Some(ValueKind::Vector6),
            _ => None,
        }
    }

    /// Apply the parameter to a transformation, or undo it with `inverse`.
    pub fn compose_transformation(
        self,
        parameter: &Value,
        transformation: &Value,
        inverse: bool,
    ) -> GraphResult<Value> {
        let composed = match (self, parameter, transformation) {
            (Calibration::Bias, Value::SE2(p), Value::SE2(t)) => Value::SE2(bias(t, p, inverse)),
            (Calibration::Bias, Value::SE3(p), Value::SE3(t)) => Value::SE3(bias(t, p, inverse)),
            (Calibration::Offset, Value::SE2(p), Value::SE2(t)) => {
                Value::SE2(offset(t, p, inverse))
            }
            (Calibration::Offset, Value::SE3(p), Value::SE3(t)) => {
                Value::SE3(offset(t, p, inverse))
            }
            (Calibration::Scale, Value::Vector3(p), Value::SE2(t)) => {
                let e = scale(&t.elements(), p, inverse)?;
                Value::SE2(SE2::from_elements(e.x, e.y, e.z))
            }
            (Calibration::Scale, Value::Vector6(p), Value::SE3(t)) => {
                let e: Vector6<f64> = scale(&t.elements(), p, inverse)?;
                Value::SE3(SE3::from_elements(e[0], e[1], e[2], e[3], e[4], e[5]))
            }
            _ => {
                return Err(GraphError::ParameterMismatch(format!(
                    "{} parameter of type {} cannot correct a {} measurement",
                    self,
                    parameter.kind(),
                    transformation.kind()
                )))
            }
        };
        Ok(composed)
    }
}

impl fmt::Display for Calibration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn bias<G: LieGroup>(transformation: &G, parameter: &G, inverse: bool) -> G {
    if inverse {
        transformation.compose(&parameter.inverse())
    } else {
        transformation.compose(parameter)
    }
}

fn offset<G: LieGroup>(transformation: &G, parameter: &G, inverse: bool) -> G {
    let parameter_inverse = parameter.inverse();
    if inverse {
        parameter_inverse.compose(transformation).compose(parameter)
    } else {
        parameter.compose(transformation).compose(&parameter_inverse)
    }
}

fn scale<const D: usize>(
    elements: &nalgebra::SVector<f64, D>,
    factors: &nalgebra::SVector<f64, D>,
    inverse: bool,
) -> GraphResult<nalgebra::SVector<f64, D>> {
    if !inverse {
        return Ok(elements.component_mul(factors));
    }
    if factors.iter().any(|factor| *factor == 0.0) {
        return Err(GraphError::ParameterMismatch(format!(
            "cannot invert scale with a zero factor: {}",
            factors.transpose()
        )));
    }
    Ok(elements.component_div(factors))
}
