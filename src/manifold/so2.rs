//! SO(2) - Special Orthogonal Group in 2D
//!
//! SO(2) elements are represented using nalgebra's UnitComplex internally.
//! The tangent space is one-dimensional: the rotation angle in radians.
//!
//! The left Jacobian of SO(2) is returned as the 2×2 matrix
//! V(θ) = (sin θ/θ)·I + ((1 − cos θ)/θ)·[1]ₓ, which is the block SE(2)
//! applies to its translation.

use crate::manifold::{
    impl_group_operators, LieGroup, ManifoldError, ManifoldResult, Rotation,
    ORTHOGONALITY_TOLERANCE, SMALL_ANGLE,
};
use nalgebra::{Matrix2, UnitComplex, Vector1};
use std::f64::consts::PI;
use std::fmt;

/// SO(2) group element representing rotations in 2D.
#[derive(Clone, Debug, PartialEq)]
pub struct SO2 {
    complex: UnitComplex<f64>,
}

impl fmt::Display for SO2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SO2(angle: {:.4})", self.complex.angle())
    }
}

impl SO2 {
    /// Create a new SO(2) element from a unit complex number.
    pub fn new(complex: UnitComplex<f64>) -> Self {
        SO2 { complex }
    }

    /// Create SO(2) from its single named component.
    ///
    /// # Arguments
    /// * `angle` - Rotation angle in radians
    pub fn from_elements(angle: f64) -> Self {
        SO2::new(UnitComplex::from_angle(angle))
    }

    /// Get the underlying unit complex number.
    pub fn complex(&self) -> UnitComplex<f64> {
        self.complex
    }

    /// Rotate a 2D vector.
    pub fn act(&self, v: &nalgebra::Vector2<f64>) -> nalgebra::Vector2<f64> {
        self.complex * v
    }

    /// Unit skew generator [1]ₓ.
    fn generator() -> Matrix2<f64> {
        Matrix2::new(0.0, -1.0, 1.0, 0.0)
    }
}

impl LieGroup for SO2 {
    type Matrix = Matrix2<f64>;
    type Vector = Vector1<f64>;

    const DOF: usize = 1;

    fn identity() -> Self {
        SO2 {
            complex: UnitComplex::identity(),
        }
    }

    /// R(θ) = [cos θ  -sin θ; sin θ  cos θ]
    fn matrix(&self) -> Self::Matrix {
        self.complex.to_rotation_matrix().into_inner()
    }

    /// θ = atan2(R(1,0), R(0,0)), in (-π, π]
    fn vector(&self) -> Self::Vector {
        Vector1::new(self.complex.angle())
    }

    /// R(θ)⁻¹ = R(-θ)
    fn inverse(&self) -> Self {
        SO2 {
            complex: self.complex.inverse(),
        }
    }

    fn compose(&self, other: &Self) -> Self {
        SO2 {
            complex: self.complex * other.complex,
        }
    }

    fn from_matrix(matrix: &Self::Matrix) -> ManifoldResult<Self> {
        let orthogonality = (matrix.transpose() * matrix - Matrix2::identity()).norm();
        if orthogonality > ORTHOGONALITY_TOLERANCE
            || (matrix.determinant() - 1.0).abs() > ORTHOGONALITY_TOLERANCE
        {
            return Err(ManifoldError::InvalidElement(format!(
                "not a 2D rotation matrix: {matrix}"
            )));
        }
        Ok(SO2::from_elements(matrix[(1, 0)].atan2(matrix[(0, 0)])))
    }

    fn from_vector(vector: &Self::Vector) -> Self {
        SO2::from_elements(vector[0])
    }

    fn random() -> Self {
        use rand::Rng;
        let mut rng = rand::rng();
        SO2::from_elements(rng.random_range(-PI..PI))
    }

    fn is_approx(&self, other: &Self, tolerance: f64) -> bool {
        (self.matrix() - other.matrix()).norm() < tolerance
    }
}

impl Rotation for SO2 {
    fn angle(&self) -> f64 {
        self.complex.angle()
    }

    /// [θ]ₓ = [0 -θ; θ 0]
    fn algebra(&self) -> Self::Matrix {
        self.angle() * SO2::generator()
    }

    /// V(θ) = (sin θ/θ)·I + ((1 − cos θ)/θ)·[1]ₓ
    fn jacobian(&self) -> Self::Matrix {
        let theta = self.angle();
        if theta.abs() < SMALL_ANGLE {
            return Matrix2::identity() + 0.5 * self.algebra();
        }
        let half = 0.5 * theta;
        let one_minus_cos = 2.0 * half.sin() * half.sin();
        (theta.sin() / theta) * Matrix2::identity() + (one_minus_cos / theta) * SO2::generator()
    }

    /// V(θ)⁻¹ = (θ sin θ / (2(1 − cos θ)))·I − (θ/2)·[1]ₓ
    fn inverse_jacobian(&self) -> Self::Matrix {
        let theta = self.angle();
        if theta.abs() < SMALL_ANGLE {
            return Matrix2::identity() - 0.5 * self.algebra();
        }
        let half = 0.5 * theta;
        // θ sin θ / (2(1 − cos θ)) = (θ/2)·cot(θ/2)
        let diagonal = half * half.cos() / half.sin();
        diagonal * Matrix2::identity() - half * SO2::generator()
    }
}

impl_group_operators!(SO2);

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: f64 = 1e-12;

    #[test]
    fn test_so2_identity() {
        let so2 = SO2::identity();
        assert!(so2.angle().abs() < TOLERANCE);
        assert_eq!(so2.matrix(), Matrix2::identity());
    }

    #[test]
    fn test_so2_inverse() {
        let so2 = SO2::from_elements(PI / 4.0);
        let so2_inv = so2.inverse();
        assert!((so2_inv.angle() + PI / 4.0).abs() < TOLERANCE);
        assert!((so2_inv * so2).is_approx(&SO2::identity(), TOLERANCE));
    }

    #[test]
    fn test_so2_compose() {
        let so2_a = SO2::from_elements(PI / 4.0);
        let so2_b = SO2::from_elements(PI / 2.0);
        let composed = &so2_a * &so2_b;
        assert!((composed.angle() - (3.0 * PI / 4.0)).abs() < TOLERANCE);
        assert_eq!(&so2_a + &so2_b, composed);
    }

    #[test]
    fn test_so2_exp_log_consistency() {
        let v = Vector1::new(0.4);
        let so2 = SO2::from_vector(&v);
        assert!((so2.vector() - v).norm() < TOLERANCE);
    }

    #[test]
    fn test_so2_from_matrix() {
        let so2 = SO2::from_elements(-2.0);
        let recovered = SO2::from_matrix(&so2.matrix()).unwrap();
        assert!((recovered.angle() + 2.0).abs() < TOLERANCE);

        let sheared = Matrix2::new(1.0, 0.5, 0.0, 1.0);
        assert!(matches!(
            SO2::from_matrix(&sheared),
            Err(ManifoldError::InvalidElement(_))
        ));
        let reflection = Matrix2::new(1.0, 0.0, 0.0, -1.0);
        assert!(SO2::from_matrix(&reflection).is_err());
    }

    #[test]
    fn test_so2_jacobian_inverse() {
        for theta in [0.0, 1e-8, 1e-3, 0.7, -2.5, 3.0] {
            let so2 = SO2::from_elements(theta);
            let product = so2.jacobian() * so2.inverse_jacobian();
            assert!((product - Matrix2::identity()).norm() < 1e-10);
        }
    }

    #[test]
    fn test_so2_jacobian_small_angle_continuity() {
        let below = SO2::from_elements(0.99 * SMALL_ANGLE).jacobian();
        let above = SO2::from_elements(1.01 * SMALL_ANGLE).jacobian();
        assert!((below - above).norm() < 1e-7);
    }

    #[test]
    fn test_so2_minus() {
        let a = SO2::from_elements(0.3);
        let b = SO2::from_elements(0.1);
        assert!((a.minus(&b)[0] - 0.2).abs() < TOLERANCE);
        assert!(((&a - &b).angle() - 0.2).abs() < TOLERANCE);
        assert_eq!(-a.clone(), -a.matrix());
    }
}
