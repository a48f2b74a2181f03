//! Lie groups for rigid-body rotations and transformations.
//!
//! Lie group M,° | size   | dim | X ∈ M             | Constraint | T_E M         | Exp(T)        | Comp. | Action
//! ------------- | ------ | --- | ----------------- | ---------- | ------------- | ------------- | ----- | ------
//! Rotation      | SO(2),.| 1   | R                 | RᵀR = I    | [θ]x ∈ so(2)  | R = exp([θ]x) | R₁R₂  | Rx
//! Rigid motion  | SE(2),.| 3   | M = [R t; 0 1]    | RᵀR = I    | [v̂] ∈ se(2)   | Exp([v̂])      | M₁M₂  | Rx+t
//! Rotation      | SO(3),.| 3   | R                 | RᵀR = I    | [θ]x ∈ so(3)  | R = exp([θ]x) | R₁R₂  | Rx
//! Rigid motion  | SE(3),.| 6   | M = [R t; 0 1]    | RᵀR = I    | [v̂] ∈ se(3)   | Exp([v̂])      | M₁M₂  | Rx+t
//!
//! Every group element has two dual representations: its matrix (rotation or
//! homogeneous transformation) and its minimal tangent-space vector (log map).
//! For the SE groups the tangent vector is `[ρ; ω]` where `ω` is the rotation
//! log and `ρ = J⁻¹(ω)·t` is the translation mapped through the inverse left
//! Jacobian of the rotation. The Jacobian coupling is what makes `exp`/`log`
//! exact for non-zero rotations.
//!
//! Operators follow matrix semantics:
//! - `a * b` composes (matrix product), `a + b` is an alias for `a * b`
//! - `a - b` is `b⁻¹ * a`, the transformation carrying `a` relative to `b`
//! - `-a` negates the matrix element-wise and yields a matrix, not a group element
//!
//! # Example
//!
//! ```
//! use slamkit::manifold::{LieGroup, se2::SE2};
//! use nalgebra::Vector3;
//!
//! let pose = SE2::from_elements(1.0, 2.0, 0.5);
//! let moved = pose.plus(&Vector3::new(0.1, 0.0, 0.05));
//! let delta = moved.minus(&pose);
//! assert!((delta - Vector3::new(0.1, 0.0, 0.05)).norm() < 1e-12);
//! ```

use std::fmt::Debug;
use thiserror::Error;

pub mod se2;
pub mod se3;
pub mod so2;
pub mod so3;

/// Rotation angles below this threshold use first-order Taylor expansions.
pub const SMALL_ANGLE: f64 = 1e-6;

/// Tolerance used when validating rotation matrices handed to `from_matrix`.
pub const ORTHOGONALITY_TOLERANCE: f64 = 1e-6;

/// Errors that can occur during manifold operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ManifoldError {
    /// Matrix does not represent an element of the group
    #[error("Invalid manifold element: {0}")]
    InvalidElement(String),

    /// Quaternion with zero norm cannot be normalized
    #[error("Cannot build a rotation from a zero quaternion")]
    ZeroQuaternion,
}

/// Result type for manifold operations.
pub type ManifoldResult<T> = Result<T, ManifoldError>;

/// Core trait for Lie group operations.
///
/// Implemented by [`so2::SO2`], [`so3::SO3`], [`se2::SE2`] and [`se3::SE3`].
/// Composition, inverse, exp/log and the plus/minus helpers are the shared
/// contract; each type adds its own `from_elements` constructor.
pub trait LieGroup: Clone + Debug + PartialEq + Sized {
    /// Matrix representation (rotation matrix or homogeneous transformation)
    type Matrix: Clone + Debug + PartialEq;

    /// Tangent-space vector representation
    type Vector: Clone + Debug + PartialEq;

    /// Degrees of freedom - dimension of the tangent space
    const DOF: usize;

    /// Neutral element e with e ∘ g = g ∘ e = g.
    fn identity() -> Self;

    /// Matrix form of the element.
    fn matrix(&self) -> Self::Matrix;

    /// Tangent-space coordinates (logarithmic map).
    fn vector(&self) -> Self::Vector;

    /// Group inverse g⁻¹.
    fn inverse(&self) -> Self;

    /// Group composition g₁ ∘ g₂ (matrix product).
    fn compose(&self, other: &Self) -> Self;

    /// Build an element from its matrix form, validating group membership.
    fn from_matrix(matrix: &Self::Matrix) -> ManifoldResult<Self>;

    /// Build an element from tangent-space coordinates (exponential map).
    fn from_vector(vector: &Self::Vector) -> Self;

    /// Random element, used for testing.
    fn random() -> Self;

    /// Whether the matrices of both elements agree within `tolerance`.
    fn is_approx(&self, other: &Self, tolerance: f64) -> bool;

    /// Increment by a tangent vector: g ⊞ v = g ∘ exp(v).
    fn plus(&self, vector: &Self::Vector) -> Self {
        self.compose(&Self::from_vector(vector))
    }

    /// Tangent vector of other⁻¹ ∘ g, i.e. g relative to `other`.
    fn minus(&self, other: &Self) -> Self::Vector {
        other.inverse().compose(self).vector()
    }

    /// Relative transformation g⁻¹ ∘ other.
    fn between(&self, other: &Self) -> Self {
        self.inverse().compose(other)
    }
}

/// Rotation groups additionally expose their angle and the left Jacobian of
/// the exponential map, which the SE groups use to couple translation and
/// rotation.
pub trait Rotation: LieGroup {
    /// Rotation angle in radians, in [0, π] for SO(3) and (-π, π] for SO(2).
    fn angle(&self) -> f64;

    /// Lie algebra element (hat of the tangent vector).
    fn algebra(&self) -> Self::Matrix;

    /// Left Jacobian of the exponential map at this rotation.
    fn jacobian(&self) -> Self::Matrix;

    /// Inverse of [`Rotation::jacobian`].
    fn inverse_jacobian(&self) -> Self::Matrix;
}

/// Implements `*`, `+`, binary `-` and unary `-` for a group type, for owned
/// and borrowed operands.
macro_rules! impl_group_operators {
    ($group:ty) => {
        impl std::ops::Mul for $group {
            type Output = $group;

            fn mul(self, rhs: $group) -> $group {
                $crate::manifold::LieGroup::compose(&self, &rhs)
            }
        }

        impl<'a, 'b> std::ops::Mul<&'b $group> for &'a $group {
            type Output = $group;

            fn mul(self, rhs: &'b $group) -> $group {
                $crate::manifold::LieGroup::compose(self, rhs)
            }
        }

        impl std::ops::Add for $group {
            type Output = $group;

            fn add(self, rhs: $group) -> $group {
                self * rhs
            }
        }

        impl<'a, 'b> std::ops::Add<&'b $group> for &'a $group {
            type Output = $group;

            fn add(self, rhs: &'b $group) -> $group {
                self * rhs
            }
        }

        impl std::ops::Sub for $group {
            type Output = $group;

            fn sub(self, rhs: $group) -> $group {
                &self - &rhs
            }
        }

        impl<'a, 'b> std::ops::Sub<&'b $group> for &'a $group {
            type Output = $group;

            fn sub(self, rhs: &'b $group) -> $group {
                $crate::manifold::LieGroup::compose(&$crate::manifold::LieGroup::inverse(rhs), self)
            }
        }

        impl std::ops::Neg for $group {
            type Output = <$group as $crate::manifold::LieGroup>::Matrix;

            fn neg(self) -> Self::Output {
                -$crate::manifold::LieGroup::matrix(&self)
            }
        }

        impl std::ops::Neg for &$group {
            type Output = <$group as $crate::manifold::LieGroup>::Matrix;

            fn neg(self) -> Self::Output {
                -$crate::manifold::LieGroup::matrix(self)
            }
        }
    };
}

pub(crate) use impl_group_operators;

/// Hat operator for 3-vectors: [v]ₓ.
pub(crate) fn skew(v: &nalgebra::Vector3<f64>) -> nalgebra::Matrix3<f64> {
    nalgebra::Matrix3::new(0.0, -v.z, v.y, v.z, 0.0, -v.x, -v.y, v.x, 0.0)
}

/// Vee operator on the antisymmetric part of a 3×3 matrix.
pub(crate) fn vee(m: &nalgebra::Matrix3<f64>) -> nalgebra::Vector3<f64> {
    0.5 * nalgebra::Vector3::new(
        m[(2, 1)] - m[(1, 2)],
        m[(0, 2)] - m[(2, 0)],
        m[(1, 0)] - m[(0, 1)],
    )
}
