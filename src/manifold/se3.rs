//! SE(3) - Special Euclidean Group in 3D
//!
//! SE(3) elements are a 3D translation plus an SO(3) rotation. Tangent
//! vectors are `[ρ; ω]` (6 components) where `ω` is the rotation log and
//! `ρ = J_l(ω)⁻¹·t`.

use crate::manifold::so3::SO3;
use crate::manifold::{impl_group_operators, LieGroup, ManifoldError, ManifoldResult, Rotation};
use nalgebra::{Matrix3, Matrix4, Quaternion, Vector3, Vector6};
use std::fmt;

/// SE(3) group element representing rigid body transformations in 3D.
#[derive(Clone, Debug, PartialEq)]
pub struct SE3 {
    translation: Vector3<f64>,
    rotation: SO3,
}

impl fmt::Display for SE3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SE3(translation: [{:.4}, {:.4}, {:.4}], rotation: {})",
            self.translation.x, self.translation.y, self.translation.z, self.rotation
        )
    }
}

impl SE3 {
    /// Create a new SE3 element from translation and rotation.
    pub fn new(translation: Vector3<f64>, rotation: SO3) -> Self {
        SE3 {
            translation,
            rotation,
        }
    }

    /// Create SE3 from translation and ZYX Euler angles.
    pub fn from_elements(x: f64, y: f64, z: f64, roll: f64, pitch: f64, yaw: f64) -> Self {
        SE3::new(Vector3::new(x, y, z), SO3::from_elements(roll, pitch, yaw))
    }

    /// `[x, y, z, roll, pitch, yaw]`, the inverse of [`SE3::from_elements`].
    pub fn elements(&self) -> Vector6<f64> {
        let angles = self.rotation.elements();
        Vector6::new(
            self.translation.x,
            self.translation.y,
            self.translation.z,
            angles.x,
            angles.y,
            angles.z,
        )
    }

    /// Create SE3 from translation and a quaternion (normalized on the way in).
    pub fn from_translation_quaternion(
        translation: Vector3<f64>,
        quaternion: &Quaternion<f64>,
    ) -> ManifoldResult<Self> {
        Ok(SE3::new(translation, SO3::from_quaternion(quaternion)?))
    }

    pub fn translation(&self) -> Vector3<f64> {
        self.translation
    }

    pub fn rotation(&self) -> &SO3 {
        &self.rotation
    }

    /// Unit quaternion of the rotation part, `w >= 0`.
    pub fn quaternion(&self) -> Quaternion<f64> {
        self.rotation.to_quaternion()
    }

    pub fn x(&self) -> f64 {
        self.translation.x
    }

    pub fn y(&self) -> f64 {
        self.translation.y
    }

    pub fn z(&self) -> f64 {
        self.translation.z
    }

    /// Transform a point: R·p + t.
    pub fn act(&self, point: &Vector3<f64>) -> Vector3<f64> {
        self.rotation.act(point) + self.translation
    }
}

impl LieGroup for SE3 {
    type Matrix = Matrix4<f64>;
    type Vector = Vector6<f64>;

    const DOF: usize = 6;

    fn identity() -> Self {
        SE3::new(Vector3::zeros(), SO3::identity())
    }

    fn matrix(&self) -> Self::Matrix {
        let mut m = Matrix4::identity();
        m.fixed_view_mut::<3, 3>(0, 0)
            .copy_from(&self.rotation.matrix());
        m.fixed_view_mut::<3, 1>(0, 3).copy_from(&self.translation);
        m
    }

    /// [J_l(ω)⁻¹·t ; ω]
    fn vector(&self) -> Self::Vector {
        let omega = self.rotation.vector();
        let rho = self.rotation.inverse_jacobian() * self.translation;
        Vector6::new(rho.x, rho.y, rho.z, omega.x, omega.y, omega.z)
    }

    fn inverse(&self) -> Self {
        let rotation = self.rotation.inverse();
        let translation = -rotation.act(&self.translation);
        SE3::new(translation, rotation)
    }

    fn compose(&self, other: &Self) -> Self {
        SE3::new(
            self.translation + self.rotation.act(&other.translation),
            self.rotation.compose(&other.rotation),
        )
    }

    fn from_matrix(matrix: &Self::Matrix) -> ManifoldResult<Self> {
        let bottom_ok = (0..3).all(|j| matrix[(3, j)].abs() <= f64::EPSILON)
            && (matrix[(3, 3)] - 1.0).abs() <= f64::EPSILON;
        if !bottom_ok {
            return Err(ManifoldError::InvalidElement(format!(
                "homogeneous row must be [0, 0, 0, 1]: {matrix}"
            )));
        }
        let rotation: Matrix3<f64> = matrix.fixed_view::<3, 3>(0, 0).into_owned();
        Ok(SE3::new(
            matrix.fixed_view::<3, 1>(0, 3).into_owned(),
            SO3::from_matrix(&rotation)?,
        ))
    }

    /// (J_l(ω)·ρ, exp(ω))
    fn from_vector(vector: &Self::Vector) -> Self {
        let rho = Vector3::new(vector[0], vector[1], vector[2]);
        let omega = Vector3::new(vector[3], vector[4], vector[5]);
        let rotation = SO3::from_vector(&omega);
        let translation = rotation.jacobian() * rho;
        SE3::new(translation, rotation)
    }

    fn random() -> Self {
        use rand::Rng;
        let mut rng = rand::rng();

        // Random translation in [-1, 1]³
        let translation = Vector3::new(
            rng.random_range(-1.0..1.0),
            rng.random_range(-1.0..1.0),
            rng.random_range(-1.0..1.0),
        );
        SE3::new(translation, SO3::random())
    }

    fn is_approx(&self, other: &Self, tolerance: f64) -> bool {
        (self.matrix() - other.matrix()).norm() < tolerance
    }
}

impl_group_operators!(SE3);
