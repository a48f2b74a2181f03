//! SE(2) - Special Euclidean Group in 2D
//!
//! SE(2) elements are a 2D translation plus an SO(2) rotation. Tangent
//! vectors are `[ρx, ρy, θ]` where `ρ = V(θ)⁻¹·t` is the translation seen
//! through the inverse left Jacobian of the rotation.

use crate::manifold::so2::SO2;
use crate::manifold::{
    impl_group_operators, LieGroup, ManifoldError, ManifoldResult, Rotation,
};
use nalgebra::{Matrix2, Matrix3, Vector1, Vector2, Vector3};
use std::fmt;

/// SE(2) group element representing rigid body transformations in 2D.
#[derive(Clone, Debug, PartialEq)]
pub struct SE2 {
    translation: Vector2<f64>,
    rotation: SO2,
}

impl fmt::Display for SE2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SE2(translation: [{:.4}, {:.4}], rotation: {:.4})",
            self.translation.x,
            self.translation.y,
            self.angle()
        )
    }
}

impl SE2 {
    /// Create a new SE2 element from translation and rotation.
    pub fn new(translation: Vector2<f64>, rotation: SO2) -> Self {
        SE2 {
            translation,
            rotation,
        }
    }

    /// Create SE2 from its named components.
    pub fn from_elements(x: f64, y: f64, angle: f64) -> Self {
        SE2::new(Vector2::new(x, y), SO2::from_elements(angle))
    }

    /// `[x, y, angle]`, the inverse of [`SE2::from_elements`].
    pub fn elements(&self) -> Vector3<f64> {
        Vector3::new(self.translation.x, self.translation.y, self.angle())
    }

    pub fn translation(&self) -> Vector2<f64> {
        self.translation
    }

    pub fn rotation(&self) -> &SO2 {
        &self.rotation
    }

    pub fn x(&self) -> f64 {
        self.translation.x
    }

    pub fn y(&self) -> f64 {
        self.translation.y
    }

    pub fn angle(&self) -> f64 {
        self.rotation.angle()
    }

    /// Transform a point: R·p + t.
    pub fn act(&self, point: &Vector2<f64>) -> Vector2<f64> {
        self.rotation.act(point) + self.translation
    }
}

impl LieGroup for SE2 {
    type Matrix = Matrix3<f64>;
    type Vector = Vector3<f64>;

    const DOF: usize = 3;

    fn identity() -> Self {
        SE2::new(Vector2::zeros(), SO2::identity())
    }

    /// M = [R t; 0 1]
    fn matrix(&self) -> Self::Matrix {
        let mut m = Matrix3::identity();
        m.fixed_view_mut::<2, 2>(0, 0)
            .copy_from(&self.rotation.matrix());
        m.fixed_view_mut::<2, 1>(0, 2).copy_from(&self.translation);
        m
    }

    /// [V(θ)⁻¹·t ; θ]
    fn vector(&self) -> Self::Vector {
        let rho = self.rotation.inverse_jacobian() * self.translation;
        Vector3::new(rho.x, rho.y, self.angle())
    }

    /// M⁻¹ = [Rᵀ -Rᵀt; 0 1]
    fn inverse(&self) -> Self {
        let rotation = self.rotation.inverse();
        let translation = -rotation.act(&self.translation);
        SE2::new(translation, rotation)
    }

    /// [R₁ t₁; 0 1]·[R₂ t₂; 0 1] = [R₁R₂  t₁ + R₁t₂; 0 1]
    fn compose(&self, other: &Self) -> Self {
        SE2::new(
            self.translation + self.rotation.act(&other.translation),
            self.rotation.compose(&other.rotation),
        )
    }

    fn from_matrix(matrix: &Self::Matrix) -> ManifoldResult<Self> {
        if matrix[(2, 0)].abs() > f64::EPSILON
            || matrix[(2, 1)].abs() > f64::EPSILON
            || (matrix[(2, 2)] - 1.0).abs() > f64::EPSILON
        {
            return Err(ManifoldError::InvalidElement(format!(
                "homogeneous row must be [0, 0, 1]: {matrix}"
            )));
        }
        let rotation: Matrix2<f64> = matrix.fixed_view::<2, 2>(0, 0).into_owned();
        Ok(SE2::new(
            matrix.fixed_view::<2, 1>(0, 2).into_owned(),
            SO2::from_matrix(&rotation)?,
        ))
    }

    /// (V(θ)·ρ, exp(θ))
    fn from_vector(vector: &Self::Vector) -> Self {
        let rotation = SO2::from_vector(&Vector1::new(vector.z));
        let translation = rotation.jacobian() * Vector2::new(vector.x, vector.y);
        SE2::new(translation, rotation)
    }

    fn random() -> Self {
        use rand::Rng;
        let mut rng = rand::rng();
        let translation = Vector2::new(rng.random_range(-1.0..1.0), rng.random_range(-1.0..1.0));
        SE2::new(translation, SO2::random())
    }

    fn is_approx(&self, other: &Self, tolerance: f64) -> bool {
        (self.matrix() - other.matrix()).norm() < tolerance
    }
}

impl_group_operators!(SE2);

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    const TOLERANCE: f64 = 1e-12;

    #[test]
    fn test_se2_identity() {
        let se2 = SE2::identity();
        assert_eq!(se2.matrix(), Matrix3::identity());
        assert_eq!(se2.vector(), Vector3::zeros());
    }

    #[test]
    fn test_se2_elements() {
        let se2 = SE2::from_elements(1.0, 2.0, 0.5);
        assert_eq!(se2.x(), 1.0);
        assert_eq!(se2.y(), 2.0);
        assert!((se2.angle() - 0.5).abs() < TOLERANCE);
        assert!((se2.elements() - Vector3::new(1.0, 2.0, 0.5)).norm() < TOLERANCE);
    }

    #[test]
    fn test_se2_compose_matches_matrix_product() {
        let a = SE2::from_elements(1.0, -0.5, 0.3);
        let b = SE2::from_elements(-2.0, 0.7, -1.2);
        let composed = &a * &b;
        assert!((composed.matrix() - a.matrix() * b.matrix()).norm() < TOLERANCE);
    }

    #[test]
    fn test_se2_inverse() {
        let se2 = SE2::from_elements(3.0, -1.0, 2.0);
        assert!((se2.inverse() * se2.clone()).is_approx(&SE2::identity(), TOLERANCE));
        assert!((se2.clone() * se2.inverse()).is_approx(&SE2::identity(), TOLERANCE));
    }

    #[test]
    fn test_se2_vector_is_not_block_diagonal() {
        // a quarter turn while moving forward: the log translation differs from t
        let se2 = SE2::from_elements(1.0, 0.0, PI / 2.0);
        let v = se2.vector();
        assert!((v.x - 1.0).abs() > 1e-3);
        assert!((v.z - PI / 2.0).abs() < TOLERANCE);
        assert!(SE2::from_vector(&v).is_approx(&se2, TOLERANCE));
    }

    #[test]
    fn test_se2_exp_of_pure_translation() {
        let se2 = SE2::from_vector(&Vector3::new(0.5, -0.25, 0.0));
        assert!((se2.translation() - Vector2::new(0.5, -0.25)).norm() < TOLERANCE);
    }

    #[test]
    fn test_se2_from_matrix() {
        let se2 = SE2::from_elements(0.2, 0.4, -0.6);
        let recovered = SE2::from_matrix(&se2.matrix()).unwrap();
        assert!(recovered.is_approx(&se2, TOLERANCE));

        let mut bad = se2.matrix();
        bad[(2, 0)] = 1.0;
        assert!(matches!(
            SE2::from_matrix(&bad),
            Err(ManifoldError::InvalidElement(_))
        ));
    }

    #[test]
    fn test_se2_operators() {
        let a = SE2::from_elements(1.0, 2.0, 0.4);
        let b = SE2::from_elements(0.5, -1.0, 0.1);

        assert_eq!(&a + &b, &a * &b);
        let difference = &a - &b;
        assert!(difference.is_approx(&(b.inverse() * a.clone()), TOLERANCE));
        assert!((a.minus(&b) - difference.vector()).norm() < TOLERANCE);
        assert_eq!(-&a, -a.matrix());
    }

    #[test]
    fn test_se2_plus_minus() {
        let a = SE2::from_elements(1.0, 2.0, 0.4);
        let v = Vector3::new(0.1, -0.2, 0.3);
        let b = a.plus(&v);
        assert!((b.minus(&a) - v).norm() < TOLERANCE);
    }

    #[test]
    fn test_se2_act() {
        let se2 = SE2::from_elements(1.0, 0.0, PI / 2.0);
        let p = se2.act(&Vector2::new(1.0, 0.0));
        assert!((p - Vector2::new(1.0, 1.0)).norm() < TOLERANCE);
    }
}
