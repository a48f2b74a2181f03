//! SO(3) - Special Orthogonal Group in 3D
//!
//! SO(3) elements are stored as 3×3 rotation matrices. Tangent vectors are
//! axis-angle vectors in R³ where the direction is the rotation axis and the
//! magnitude is the angle.
//!
//! Besides the exp/log maps this module converts to and from quaternions and
//! ZYX Euler angles (R = Rz(yaw)·Ry(pitch)·Rx(roll)). Both conversions select
//! their formula by branch to stay well conditioned: the quaternion
//! extraction switches on the trace and the largest diagonal entry, and the
//! Euler extraction has a dedicated branch at pitch = ±90°.

use crate::manifold::{
    impl_group_operators, skew, vee, LieGroup, ManifoldError, ManifoldResult, Rotation,
    ORTHOGONALITY_TOLERANCE, SMALL_ANGLE,
};
use nalgebra::{Matrix3, Quaternion, Vector3};
use std::f64::consts::PI;
use std::fmt;

/// |cos(pitch)| below this value is treated as gimbal lock.
pub const GIMBAL_EPSILON: f64 = 1e-9;

/// Angles within this distance of π take the quaternion branch of the log map.
const NEAR_PI: f64 = 1e-4;

/// SO(3) group element representing rotations in 3D.
#[derive(Clone, Debug, PartialEq)]
pub struct SO3 {
    rotation: Matrix3<f64>,
}

impl fmt::Display for SO3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let q = self.to_quaternion();
        write!(
            f,
            "SO3(quaternion: [w: {:.4}, x: {:.4}, y: {:.4}, z: {:.4}])",
            q.w, q.i, q.j, q.k
        )
    }
}

impl SO3 {
    /// Create SO(3) from ZYX Euler angles.
    ///
    /// # Arguments
    /// * `roll` - rotation about x
    /// * `pitch` - rotation about y
    /// * `yaw` - rotation about z
    pub fn from_elements(roll: f64, pitch: f64, yaw: f64) -> Self {
        SO3::from_euler(roll, pitch, yaw)
    }

    /// Euler angles `[roll, pitch, yaw]`, the inverse of [`SO3::from_elements`].
    pub fn elements(&self) -> Vector3<f64> {
        let (roll, pitch, yaw) = self.to_euler();
        Vector3::new(roll, pitch, yaw)
    }

    /// R = Rz(yaw)·Ry(pitch)·Rx(roll)
    pub fn from_euler(roll: f64, pitch: f64, yaw: f64) -> Self {
        let (sr, cr) = roll.sin_cos();
        let (sp, cp) = pitch.sin_cos();
        let (sy, cy) = yaw.sin_cos();

        SO3 {
            rotation: Matrix3::new(
                cy * cp,
                cy * sp * sr - sy * cr,
                cy * sp * cr + sy * sr,
                sy * cp,
                sy * sp * sr + cy * cr,
                sy * sp * cr - cy * sr,
                -sp,
                cp * sr,
                cp * cr,
            ),
        }
    }

    /// ZYX Euler angles `(roll, pitch, yaw)`.
    ///
    /// At gimbal lock (pitch = ±90°) roll and yaw are not separable; yaw is
    /// fixed at 0 and roll absorbs the combined rotation.
    pub fn to_euler(&self) -> (f64, f64, f64) {
        let r = &self.rotation;
        let sin_pitch = (-r[(2, 0)]).clamp(-1.0, 1.0);
        let pitch = sin_pitch.asin();
        let cos_pitch = r[(0, 0)].hypot(r[(1, 0)]);

        if cos_pitch < GIMBAL_EPSILON {
            let roll = if sin_pitch > 0.0 {
                // R01 = sin(roll - yaw), R02 = cos(roll - yaw)
                r[(0, 1)].atan2(r[(0, 2)])
            } else {
                // R01 = -sin(roll + yaw), R02 = -cos(roll + yaw)
                (-r[(0, 1)]).atan2(-r[(0, 2)])
            };
            let pitch = if sin_pitch > 0.0 { PI / 2.0 } else { -PI / 2.0 };
            (roll, pitch, 0.0)
        } else {
            let roll = r[(2, 1)].atan2(r[(2, 2)]);
            let yaw = r[(1, 0)].atan2(r[(0, 0)]);
            (roll, pitch, yaw)
        }
    }

    /// Build a rotation from a (not necessarily unit) quaternion.
    pub fn from_quaternion(q: &Quaternion<f64>) -> ManifoldResult<Self> {
        let norm = q.norm();
        if norm < f64::EPSILON {
            return Err(ManifoldError::ZeroQuaternion);
        }
        let (w, x, y, z) = (q.w / norm, q.i / norm, q.j / norm, q.k / norm);

        Ok(SO3 {
            rotation: Matrix3::new(
                1.0 - 2.0 * (y * y + z * z),
                2.0 * (x * y - w * z),
                2.0 * (x * z + w * y),
                2.0 * (x * y + w * z),
                1.0 - 2.0 * (x * x + z * z),
                2.0 * (y * z - w * x),
                2.0 * (x * z - w * y),
                2.0 * (y * z + w * x),
                1.0 - 2.0 * (x * x + y * y),
            ),
        })
    }

    /// Unit quaternion of this rotation with `w >= 0`.
    ///
    /// | condition                   | pivot |
    /// |-----------------------------|-------|
    /// | trace > 0                   | w     |
    /// | m00 > m11 and m00 > m22     | x     |
    /// | m11 > m22                   | y     |
    /// | otherwise                   | z     |
    pub fn to_quaternion(&self) -> Quaternion<f64> {
        let m = &self.rotation;
        let trace = m.trace();

        let (w, x, y, z) = if trace > 0.0 {
            let s = 0.5 / (trace + 1.0).sqrt();
            (
                0.25 / s,
                (m[(2, 1)] - m[(1, 2)]) * s,
                (m[(0, 2)] - m[(2, 0)]) * s,
                (m[(1, 0)] - m[(0, 1)]) * s,
            )
        } else if m[(0, 0)] > m[(1, 1)] && m[(0, 0)] > m[(2, 2)] {
            let s = 2.0 * (1.0 + m[(0, 0)] - m[(1, 1)] - m[(2, 2)]).sqrt();
            (
                (m[(2, 1)] - m[(1, 2)]) / s,
                0.25 * s,
                (m[(0, 1)] + m[(1, 0)]) / s,
                (m[(0, 2)] + m[(2, 0)]) / s,
            )
        } else if m[(1, 1)] > m[(2, 2)] {
            let s = 2.0 * (1.0 + m[(1, 1)] - m[(0, 0)] - m[(2, 2)]).sqrt();
            (
                (m[(0, 2)] - m[(2, 0)]) / s,
                (m[(0, 1)] + m[(1, 0)]) / s,
                0.25 * s,
                (m[(1, 2)] + m[(2, 1)]) / s,
            )
        } else {
            let s = 2.0 * (1.0 + m[(2, 2)] - m[(0, 0)] - m[(1, 1)]).sqrt();
            (
                (m[(1, 0)] - m[(0, 1)]) / s,
                (m[(0, 2)] + m[(2, 0)]) / s,
                (m[(1, 2)] + m[(2, 1)]) / s,
                0.25 * s,
            )
        };

        let q = Quaternion::new(w, x, y, z);
        let q = q / q.norm();
        if q.w < 0.0 {
            -q
        } else {
            q
        }
    }

    /// Rotate a 3D vector.
    pub fn act(&self, v: &Vector3<f64>) -> Vector3<f64> {
        self.rotation * v
    }

    /// Re-orthonormalize the matrix after accumulated round-off.
    pub fn normalize(&mut self) {
        // to_quaternion normalizes, so this cannot hit the zero-quaternion case
        if let Ok(normalized) = SO3::from_quaternion(&self.to_quaternion()) {
            *self = normalized;
        }
    }
}

impl LieGroup for SO3 {
    type Matrix = Matrix3<f64>;
    type Vector = Vector3<f64>;

    const DOF: usize = 3;

    fn identity() -> Self {
        SO3 {
            rotation: Matrix3::identity(),
        }
    }

    fn matrix(&self) -> Self::Matrix {
        self.rotation
    }

    /// Logarithmic map.
    ///
    /// θ = atan2(|vee(R)|, (tr R − 1)/2) and v = θ / sin θ · vee(R).
    /// Near θ = 0 the division is skipped and vee(R − I) is returned; near
    /// θ = π the axis is taken from the quaternion instead.
    fn vector(&self) -> Self::Vector {
        let axis_sin = vee(&self.rotation);
        let sin_angle = axis_sin.norm();
        let cos_angle = ((self.rotation.trace() - 1.0) * 0.5).clamp(-1.0, 1.0);
        let angle = sin_angle.atan2(cos_angle);

        if angle < SMALL_ANGLE {
            vee(&(self.rotation - Matrix3::identity()))
        } else if PI - angle < NEAR_PI {
            let q = self.to_quaternion();
            let imaginary = q.imag();
            let norm = imaginary.norm();
            2.0 * norm.atan2(q.w) / norm * imaginary
        } else {
            angle / sin_angle * axis_sin
        }
    }

    fn inverse(&self) -> Self {
        SO3 {
            rotation: self.rotation.transpose(),
        }
    }

    fn compose(&self, other: &Self) -> Self {
        SO3 {
            rotation: self.rotation * other.rotation,
        }
    }

    fn from_matrix(matrix: &Self::Matrix) -> ManifoldResult<Self> {
        let orthogonality = (matrix.transpose() * matrix - Matrix3::identity()).norm();
        if orthogonality > ORTHOGONALITY_TOLERANCE
            || (matrix.determinant() - 1.0).abs() > ORTHOGONALITY_TOLERANCE
        {
            return Err(ManifoldError::InvalidElement(format!(
                "not a 3D rotation matrix: {matrix}"
            )));
        }
        Ok(SO3 { rotation: *matrix })
    }

    /// Exponential map (Rodrigues).
    ///
    /// R = I + (sin θ/θ)[v]ₓ + ((1 − cos θ)/θ²)[v]ₓ²
    fn from_vector(vector: &Self::Vector) -> Self {
        let theta = vector.norm();
        let hat = skew(vector);

        let rotation = if theta < SMALL_ANGLE {
            Matrix3::identity() + hat + 0.5 * hat * hat
        } else {
            let half = 0.5 * theta;
            let one_minus_cos = 2.0 * half.sin() * half.sin();
            Matrix3::identity()
                + (theta.sin() / theta) * hat
                + (one_minus_cos / (theta * theta)) * hat * hat
        };
        SO3 { rotation }
    }

    fn random() -> Self {
        use rand::Rng;
        let mut rng = rand::rng();

        // every component in [-1, 1] keeps the angle below √3 < π
        let v = Vector3::new(
            rng.random_range(-1.0..1.0),
            rng.random_range(-1.0..1.0),
            rng.random_range(-1.0..1.0),
        );
        SO3::from_vector(&v)
    }

    fn is_approx(&self, other: &Self, tolerance: f64) -> bool {
        (self.rotation - other.rotation).norm() < tolerance
    }
}

impl Rotation for SO3 {
    fn angle(&self) -> f64 {
        self.vector().norm()
    }

    fn algebra(&self) -> Self::Matrix {
        skew(&self.vector())
    }

    /// J_l(θ) = I + (1 − cos θ)/θ² [θ]ₓ + (θ − sin θ)/θ³ [θ]ₓ²
    fn jacobian(&self) -> Self::Matrix {
        let v = self.vector();
        let theta = v.norm();
        let hat = skew(&v);

        if theta < SMALL_ANGLE {
            return Matrix3::identity() + 0.5 * hat;
        }

        let half = 0.5 * theta;
        let one_minus_cos = 2.0 * half.sin() * half.sin();
        let theta2 = theta * theta;
        Matrix3::identity()
            + (one_minus_cos / theta2) * hat
            + ((theta - theta.sin()) / (theta2 * theta)) * hat * hat
    }

    /// J_l⁻¹(θ) = I − ½[θ]ₓ + (1/θ² − (1 + cos θ)/(2θ sin θ)) [θ]ₓ²
    fn inverse_jacobian(&self) -> Self::Matrix {
        let v = self.vector();
        let theta = v.norm();
        let hat = skew(&v);

        if theta < SMALL_ANGLE {
            return Matrix3::identity() - 0.5 * hat;
        }

        let coefficient =
            1.0 / (theta * theta) - (1.0 + theta.cos()) / (2.0 * theta * theta.sin());
        Matrix3::identity() - 0.5 * hat + coefficient * hat * hat
    }
}

impl_group_operators!(SO3);

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: f64 = 1e-12;

    #[test]
    fn test_so3_identity() {
        let so3 = SO3::identity();
        assert_eq!(so3.vector(), Vector3::zeros());
        assert_eq!(so3.to_quaternion(), Quaternion::new(1.0, 0.0, 0.0, 0.0));
    }

    #[test]
    fn test_so3_inverse() {
        let so3 = SO3::random();
        let product = so3.inverse() * so3;
        assert!(product.is_approx(&SO3::identity(), TOLERANCE));
    }

    #[test]
    fn test_so3_exp_log() {
        let v = Vector3::new(0.3, -0.2, 0.9);
        let so3 = SO3::from_vector(&v);
        assert!((so3.vector() - v).norm() < TOLERANCE);
        assert!((so3.angle() - v.norm()).abs() < TOLERANCE);
    }

    #[test]
    fn test_so3_log_near_pi() {
        let v = Vector3::new(0.0, 0.0, PI - 1e-6);
        let so3 = SO3::from_vector(&v);
        assert!((so3.vector() - v).norm() < 1e-9);

        let axis = Vector3::new(1.0, 2.0, -2.0).normalize();
        let v = axis * (PI - 1e-5);
        assert!((SO3::from_vector(&v).vector() - v).norm() < 1e-9);
    }

    #[test]
    fn test_so3_small_angle_branch() {
        let v = Vector3::new(1e-9, -2e-9, 5e-10);
        let so3 = SO3::from_vector(&v);
        assert!((so3.vector() - v).norm() < 1e-20);
    }

    #[test]
    fn test_so3_quaternion_branches() {
        // trace > 0
        let a = SO3::from_elements(0.1, 0.2, 0.3);
        // rotations by ~π about each axis drive the trace negative and
        // select the x, y and z pivots in turn
        let bx = SO3::from_vector(&Vector3::new(3.0, 0.1, 0.0));
        let by = SO3::from_vector(&Vector3::new(0.1, 3.0, 0.0));
        let bz = SO3::from_vector(&Vector3::new(0.0, 0.1, 3.0));

        for so3 in [a, bx, by, bz] {
            let q = so3.to_quaternion();
            assert!(q.w >= 0.0);
            assert!((q.norm() - 1.0).abs() < TOLERANCE);
            let recovered = SO3::from_quaternion(&q).unwrap();
            assert!(recovered.is_approx(&so3, 1e-10));
        }
    }

    #[test]
    fn test_so3_quaternion_matches_axis_angle() {
        let angle = 0.8;
        let so3 = SO3::from_vector(&Vector3::new(0.0, 0.0, angle));
        let q = so3.to_quaternion();
        assert!((q.w - (angle / 2.0).cos()).abs() < TOLERANCE);
        assert!((q.k - (angle / 2.0).sin()).abs() < TOLERANCE);
    }

    #[test]
    fn test_so3_zero_quaternion() {
        let q = Quaternion::new(0.0, 0.0, 0.0, 0.0);
        assert_eq!(SO3::from_quaternion(&q), Err(ManifoldError::ZeroQuaternion));
    }

    #[test]
    fn test_so3_euler_roundtrip() {
        let (roll, pitch, yaw) = (0.4, -0.7, 2.1);
        let so3 = SO3::from_elements(roll, pitch, yaw);
        let (r, p, y) = so3.to_euler();
        assert!((r - roll).abs() < TOLERANCE);
        assert!((p - pitch).abs() < TOLERANCE);
        assert!((y - yaw).abs() < TOLERANCE);
    }

    #[test]
    fn test_so3_euler_gimbal_lock() {
        for pitch in [PI / 2.0, -PI / 2.0] {
            let so3 = SO3::from_elements(0.3, pitch, 0.5);
            let (roll, recovered_pitch, yaw) = so3.to_euler();
            assert_eq!(yaw, 0.0);
            assert!((recovered_pitch - pitch).abs() < TOLERANCE);
            let rebuilt = SO3::from_elements(roll, recovered_pitch, yaw);
            assert!(rebuilt.is_approx(&so3, 1e-9));
        }
    }

    #[test]
    fn test_so3_from_matrix_rejects_non_rotation() {
        let scaled = 2.0 * Matrix3::identity();
        assert!(SO3::from_matrix(&scaled).is_err());
        let reflection = Matrix3::new(1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, -1.0);
        assert!(SO3::from_matrix(&reflection).is_err());
    }

    #[test]
    fn test_so3_jacobian_inverse() {
        for v in [
            Vector3::zeros(),
            Vector3::new(1e-8, 0.0, 0.0),
            Vector3::new(0.1, 0.2, -0.3),
            Vector3::new(1.0, -1.0, 1.5),
        ] {
            let so3 = SO3::from_vector(&v);
            let product = so3.jacobian() * so3.inverse_jacobian();
            assert!((product - Matrix3::identity()).norm() < 1e-9);
        }
    }

    #[test]
    fn test_so3_jacobian_matches_finite_difference() {
        // exp(v + δ) ≈ exp(J_l δ) exp(v)
        let v = Vector3::new(0.4, -0.3, 0.2);
        let delta = Vector3::new(1e-6, -2e-6, 1.5e-6);
        let so3 = SO3::from_vector(&v);
        let lhs = SO3::from_vector(&(v + delta));
        let rhs = SO3::from_vector(&(so3.jacobian() * delta)) * so3;
        assert!(lhs.is_approx(&rhs, 1e-10));
    }

    #[test]
    fn test_so3_normalize() {
        let mut so3 = SO3::from_elements(0.1, 0.2, 0.3);
        so3.rotation[(0, 0)] += 1e-9;
        so3.normalize();
        let r = so3.matrix();
        assert!((r.transpose() * r - Matrix3::identity()).norm() < TOLERANCE);
    }
}
