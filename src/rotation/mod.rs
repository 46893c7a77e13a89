//! # Unit-quaternion rotations
//!
//! [`Rotation`] stores a normalized quaternion `(q0, q1, q2, q3)` (scalar part
//! first) and can be built from an axis/angle pair, a rotation matrix or three
//! Euler/Cardan angles. It can be applied to vectors, composed with other
//! rotations and inverted.
//!
//! ## Conventions
//!
//! Two composition semantics exist and are **not** interchangeable, see
//! [`Convention`]:
//!
//! * [`Convention::Vector`] (operator semantics): a rotation of angle `θ`
//!   around `u` turns vectors counter-clockwise; `r1.compose(&r2, Vector)`
//!   applies `r2` first, then `r1`.
//! * [`Convention::Frame`] (frame-transform semantics): the same axis/angle
//!   describes how the *frame* turns, so the resulting operator is the inverse
//!   of the vector one; `r1.compose(&r2, Frame)` applies `r1` first, then `r2`.
//!
//! ## Equality
//!
//! `==` compares the four components exactly. Use
//! [`Rotation::distance_to`] for tolerance-based comparisons.
//!
//! ## See also
//! ------------
//! * [`RotationOrder`] – axis sequences for the Euler/Cardan decompositions.
//! * [`crate::transform::Transform`] – kinematic transforms built on top of rotations.
use std::{fmt, ops::Not, str::FromStr};

use nalgebra::{DMatrix, Matrix3, Vector3};
use serde::{Deserialize, Serialize};

use crate::{
    astro_errors::AstroError,
    constants::{Radian, DPI},
};

mod order;

pub use order::RotationOrder;

/// Absolute tolerance used to detect the gimbal-lock configuration of an order.
const SINGULARITY_ABS_TOLERANCE: f64 = 1e-15;

/// Relative tolerance used to detect the gimbal-lock configuration of an order.
const SINGULARITY_REL_TOLERANCE: f64 = 1e-9;

/// Threshold selecting the quaternion extraction branch in [`Rotation::from_matrix`].
///
/// `qi = 0.45` implies `4 qi² - 1 = -0.19`, and since at least one component of
/// a unit quaternion is ≥ 0.5, one of the four branches always passes.
const BRANCH_THRESHOLD: f64 = -0.19;

/// Maximum number of Newton steps in the polar decomposition.
const MAX_POLAR_ITERATIONS: usize = 50;

/// Frobenius norm of the Newton correction below which the iteration has
/// converged. Convergence is quadratic, so the error left is at rounding level.
const POLAR_TOLERANCE: f64 = 1e-12;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Convention {
    /// Vector operator semantics.
    Vector,
    /// Frame transform semantics.
    Frame,
}

impl Convention {
    /// `+1` for [`Convention::Vector`], `-1` for [`Convention::Frame`].
    fn sign(&self) -> f64 {
        match self {
            Convention::Vector => 1.0,
            Convention::Frame => -1.0,
        }
    }
}

impl fmt::Display for Convention {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Convention::Vector => write!(f, "vector"),
            Convention::Frame => write!(f, "frame"),
        }
    }
}

impl FromStr for Convention {
    type Err = AstroError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "vector" => Ok(Convention::Vector),
            "frame" => Ok(Convention::Frame),
            _ => Err(AstroError::InvalidConvention(s.to_string())),
        }
    }
}

/// Rotation in three-dimensional space, stored as a unit quaternion.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rotation {
    q0: f64,
    q1: f64,
    q2: f64,
    q3: f64,
}

impl Default for Rotation {
    fn default() -> Self {
        Self::identity()
    }
}

impl Rotation {
    /// Build a rotation from a quaternion, normalizing it first.
    pub fn new(q0: f64, q1: f64, q2: f64, q3: f64) -> Self {
        let inv = 1.0 / (q0 * q0 + q1 * q1 + q2 * q2 + q3 * q3).sqrt();
        Rotation {
            q0: q0 * inv,
            q1: q1 * inv,
            q2: q2 * inv,
            q3: q3 * inv,
        }
    }

    /// Build a rotation from a quaternion the caller asserts is already unit-norm.
    pub const fn new_normalized(q0: f64, q1: f64, q2: f64, q3: f64) -> Self {
        Rotation { q0, q1, q2, q3 }
    }

    pub const fn identity() -> Self {
        Rotation::new_normalized(1.0, 0.0, 0.0, 0.0)
    }

    pub fn q0(&self) -> f64 {
        self.q0
    }

    pub fn q1(&self) -> f64 {
        self.q1
    }

    pub fn q2(&self) -> f64 {
        self.q2
    }

    pub fn q3(&self) -> f64 {
        self.q3
    }

    /// Quaternion components `[q0, q1, q2, q3]`.
    pub fn quaternion(&self) -> [f64; 4] {
        [self.q0, self.q1, self.q2, self.q3]
    }

    /// Build a rotation of `angle` radians around `axis`.
    ///
    /// Under [`Convention::Vector`] the half-angle used internally is negated
    /// with respect to [`Convention::Frame`]: both conventions produce rotations
    /// that are inverse of each other for the same stated axis and angle.
    ///
    /// Arguments
    /// -----------------
    /// * `axis`: rotation axis, need not be normalized.
    /// * `angle`: rotation angle in radians.
    /// * `convention`: semantics of the stated axis/angle.
    ///
    /// Return
    /// ----------
    /// * The rotation, or [`AstroError::ZeroNormAxis`] if `axis` is the zero vector.
    pub fn from_axis_angle(
        axis: &Vector3<f64>,
        angle: Radian,
        convention: Convention,
    ) -> Result<Self, AstroError> {
        let norm = axis.norm();
        if norm == 0.0 {
            return Err(AstroError::ZeroNormAxis);
        }
        Ok(Self::from_axis_angle_with_norm(axis, norm, angle, convention))
    }

    fn from_axis_angle_with_norm(
        axis: &Vector3<f64>,
        norm: f64,
        angle: Radian,
        convention: Convention,
    ) -> Self {
        let half_angle = -0.5 * angle * convention.sign();
        let coeff = half_angle.sin() / norm;

        Rotation::new_normalized(
            half_angle.cos(),
            coeff * axis[0],
            coeff * axis[1],
            coeff * axis[2],
        )
    }

    /// Build a rotation from a 3×3 matrix `M` such that `M·v == apply_to(v)`.
    ///
    /// The nearest orthogonal matrix `M·(MᵀM)^(-1/2)` is computed first so that
    /// slightly perturbed inputs are accepted. The quaternion is then extracted
    /// with the four-branch trace method.
    ///
    /// Return
    /// ----------
    /// * [`AstroError::NotARotationMatrix`] if the orthogonalized matrix has a
    ///   negative determinant or the orthogonalization does not converge,
    ///   [`AstroError::SingularMatrix`] if `M` cannot be inverted.
    pub fn from_matrix(matrix: &Matrix3<f64>) -> Result<Self, AstroError> {
        let ort = nearest_orthogonal(matrix)?;

        if ort.determinant() < 0.0 {
            return Err(AstroError::NotARotationMatrix);
        }

        let [q0, q1, q2, q3] = quaternion_from_matrix(&ort);
        Ok(Rotation::new_normalized(q0, q1, q2, q3))
    }

    /// Same as [`Rotation::from_matrix`] for a dynamically sized matrix.
    ///
    /// Fails with [`AstroError::InvalidShape`] if `matrix` is not 3×3.
    pub fn from_dmatrix(matrix: &DMatrix<f64>) -> Result<Self, AstroError> {
        if matrix.shape() != (3, 3) {
            return Err(AstroError::InvalidShape {
                expected: "(3, 3)".to_string(),
                found: format!("{:?}", matrix.shape()),
            });
        }
        Self::from_matrix(&matrix.fixed_view::<3, 3>(0, 0).into_owned())
    }

    /// Compose three single-axis rotations along the axes of `order`.
    ///
    /// The result is `r1.compose(r2.compose(r3))` under `convention`, where
    /// `ri` is the rotation of `alpha_i` around the `i`-th axis of `order`.
    pub fn from_euler_angles(
        order: RotationOrder,
        alpha1: Radian,
        alpha2: Radian,
        alpha3: Radian,
        convention: Convention,
    ) -> Self {
        let r1 = Self::from_axis_angle_with_norm(&order.axis1(), 1.0, alpha1, convention);
        let r2 = Self::from_axis_angle_with_norm(&order.axis2(), 1.0, alpha2, convention);
        let r3 = Self::from_axis_angle_with_norm(&order.axis3(), 1.0, alpha3, convention);

        r1.compose(&r2.compose(&r3, convention), convention)
    }

    /// Rotation angle, in `[0, π]`.
    pub fn angle(&self) -> Radian {
        if self.q0 < -0.1 || self.q0 > 0.1 {
            2.0 * (self.q1 * self.q1 + self.q2 * self.q2 + self.q3 * self.q3)
                .sqrt()
                .asin()
        } else if self.q0 < 0.0 {
            2.0 * (-self.q0).acos()
        } else {
            2.0 * self.q0.acos()
        }
    }

    /// Normalized rotation axis under `convention`.
    ///
    /// The identity has no defined axis: `+X` is returned under
    /// [`Convention::Vector`] and `-X` under [`Convention::Frame`].
    pub fn axis(&self, convention: Convention) -> Vector3<f64> {
        let squared_sine = self.q1 * self.q1 + self.q2 * self.q2 + self.q3 * self.q3;
        let sign = convention.sign();

        if squared_sine == 0.0 {
            return Vector3::x() * sign;
        }

        let inverse = if self.q0 < 0.0 {
            sign / squared_sine.sqrt()
        } else {
            -sign / squared_sine.sqrt()
        };
        Vector3::new(self.q1 * inverse, self.q2 * inverse, self.q3 * inverse)
    }

    /// Decompose the rotation into three angles for `order`.
    ///
    /// The returned angles `(a1, a2, a3)` satisfy
    /// `Rotation::from_euler_angles(order, a1, a2, a3, convention) ≈ self`.
    ///
    /// Return
    /// ----------
    /// * [`AstroError::GimbalLock`] when the rotation sits on the singular
    ///   configuration of `order` (middle angle ±π/2 for Cardan orders,
    ///   0 or π for proper Euler orders).
    pub fn angles(
        &self,
        order: RotationOrder,
        convention: Convention,
    ) -> Result<(Radian, Radian, Radian), AstroError> {
        let (index1, index2, index3) = order.indices();

        let mut a1y_sign = 1.0;
        let mut a1x_sign = 1.0;
        let mut a2_sign = 1.0;
        let mut a3y_sign = 1.0;
        let mut a3x_sign = 1.0;

        let is_singular = |value: f64| {
            let value = value.abs();
            (value - 1.0).abs()
                <= (SINGULARITY_REL_TOLERANCE * value.max(1.0)).max(SINGULARITY_ABS_TOLERANCE)
        };

        if !order.is_proper_euler() {
            match order {
                RotationOrder::XYZ | RotationOrder::YZX | RotationOrder::ZXY => {
                    a1y_sign = -1.0;
                    a3y_sign = -1.0;
                }
                _ => a2_sign = -1.0,
            }

            let (a1_v, a2_index, a3_v, v2) = match convention {
                Convention::Vector => {
                    let v1 = self.apply_to(&order.axis3());
                    let v2 = self.apply_inverse_to(&order.axis1());
                    (v1, index3, v2, v2)
                }
                Convention::Frame => {
                    let v1 = self.apply_to(&order.axis1());
                    let v2 = self.apply_inverse_to(&order.axis3());
                    (v2, index1, v1, v2)
                }
            };

            if is_singular(v2[a2_index]) {
                return Err(AstroError::GimbalLock(order));
            }

            Ok((
                (a1y_sign * a1_v[index2]).atan2(a1x_sign * a1_v[index3]),
                a2_sign * v2[a2_index].asin(),
                (a3y_sign * a3_v[index2]).atan2(a3x_sign * a3_v[index1]),
            ))
        } else {
            match order {
                RotationOrder::XZX | RotationOrder::YXY | RotationOrder::ZYZ => a3x_sign = -1.0,
                _ => a1x_sign = -1.0,
            }

            let other_index = 3 - index1 - index2;

            let v1 = self.apply_to(&order.axis3());
            let v2 = self.apply_inverse_to(&order.axis1());

            if is_singular(v2[index3]) {
                return Err(AstroError::GimbalLock(order));
            }

            let (a1_v, a3_v) = match convention {
                Convention::Vector => (v1, v2),
                Convention::Frame => (v2, v1),
            };

            Ok((
                (a1y_sign * a1_v[index2]).atan2(a1x_sign * a1_v[other_index]),
                a2_sign * v2[index3].acos(),
                (a3y_sign * a3_v[index2]).atan2(a3x_sign * a3_v[other_index]),
            ))
        }
    }

    /// Rotation matrix `M` such that `M·v == self.apply_to(v)`.
    pub fn matrix(&self) -> Matrix3<f64> {
        let q0q0 = self.q0 * self.q0;
        let q0q1 = self.q0 * self.q1;
        let q0q2 = self.q0 * self.q2;
        let q0q3 = self.q0 * self.q3;
        let q1q1 = self.q1 * self.q1;
        let q1q2 = self.q1 * self.q2;
        let q1q3 = self.q1 * self.q3;
        let q2q2 = self.q2 * self.q2;
        let q2q3 = self.q2 * self.q3;
        let q3q3 = self.q3 * self.q3;

        Matrix3::new(
            2.0 * (q0q0 + q1q1) - 1.0,
            2.0 * (q1q2 + q0q3),
            2.0 * (q1q3 - q0q2),
            2.0 * (q1q2 - q0q3),
            2.0 * (q0q0 + q2q2) - 1.0,
            2.0 * (q2q3 + q0q1),
            2.0 * (q1q3 + q0q2),
            2.0 * (q2q3 - q0q1),
            2.0 * (q0q0 + q3q3) - 1.0,
        )
    }

    /// Rotate `vector`.
    pub fn apply_to(&self, vector: &Vector3<f64>) -> Vector3<f64> {
        let (x, y, z) = (vector[0], vector[1], vector[2]);
        let s = self;

        let r = s.q1 * x + s.q2 * y + s.q3 * z;

        Vector3::new(
            2.0 * (s.q0 * (x * s.q0 - (s.q2 * z - s.q3 * y)) + r * s.q1) - x,
            2.0 * (s.q0 * (y * s.q0 - (s.q3 * x - s.q1 * z)) + r * s.q2) - y,
            2.0 * (s.q0 * (z * s.q0 - (s.q1 * y - s.q2 * x)) + r * s.q3) - z,
        )
    }

    /// Rotate `vector` by the inverse rotation.
    pub fn apply_inverse_to(&self, vector: &Vector3<f64>) -> Vector3<f64> {
        self.inverse().apply_to(vector)
    }

    /// Compose `self` with `rotation`.
    ///
    /// * [`Convention::Vector`]: the result applies `rotation` first, then `self`.
    /// * [`Convention::Frame`]: the result applies `self` first, then `rotation`.
    ///
    /// The product of two unit quaternions is unit-norm, so no renormalization
    /// is performed.
    pub fn compose(&self, rotation: &Rotation, convention: Convention) -> Rotation {
        let (a, b) = match convention {
            Convention::Vector => (self, rotation),
            Convention::Frame => (rotation, self),
        };

        Rotation::new_normalized(
            b.q0 * a.q0 - (b.q1 * a.q1 + b.q2 * a.q2 + b.q3 * a.q3),
            b.q1 * a.q0 + b.q0 * a.q1 + (b.q2 * a.q3 - b.q3 * a.q2),
            b.q2 * a.q0 + b.q0 * a.q2 + (b.q3 * a.q1 - b.q1 * a.q3),
            b.q3 * a.q0 + b.q0 * a.q3 + (b.q1 * a.q2 - b.q2 * a.q1),
        )
    }

    /// Inverse rotation (conjugate quaternion).
    pub fn inverse(&self) -> Rotation {
        Rotation::new_normalized(self.q0, -self.q1, -self.q2, -self.q3)
    }

    /// Angle of the rotation that brings `other` onto `self`.
    ///
    /// Zero (up to rounding) when both rotations are the same.
    pub fn distance_to(&self, other: &Rotation) -> Radian {
        self.compose(&other.inverse(), Convention::Vector).angle()
    }
}

impl Not for Rotation {
    type Output = Rotation;

    fn not(self) -> Self::Output {
        self.inverse()
    }
}

impl Not for &Rotation {
    type Output = Rotation;

    fn not(self) -> Self::Output {
        self.inverse()
    }
}

impl fmt::Display for Rotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Rotation(q0={}, q1={}, q2={}, q3={})",
            self.q0, self.q1, self.q2, self.q3
        )
    }
}

/// Orthogonal polar factor `M·(MᵀM)^(-1/2)` of `matrix`.
///
/// Computed with the Newton iteration `X ← (X + X⁻ᵀ) / 2`, which converges
/// quadratically to the polar factor and preserves the sign of the determinant.
fn nearest_orthogonal(matrix: &Matrix3<f64>) -> Result<Matrix3<f64>, AstroError> {
    let mut current = *matrix;

    for _ in 0..MAX_POLAR_ITERATIONS {
        let inverse = current.try_inverse().ok_or(AstroError::SingularMatrix)?;
        let next = (current + inverse.transpose()) * 0.5;
        let correction = (next - current).norm();
        current = next;

        if correction <= POLAR_TOLERANCE {
            return Ok(current);
        }
    }

    Err(AstroError::NotARotationMatrix)
}

fn quaternion_from_matrix(ort: &Matrix3<f64>) -> [f64; 4] {
    let m = |i: usize, j: usize| ort[(i, j)];

    let s = m(0, 0) + m(1, 1) + m(2, 2);
    if s > BRANCH_THRESHOLD {
        // compute q0 and deduce q1, q2 and q3
        let q0 = 0.5 * (s + 1.0).sqrt();
        let inv = 0.25 / q0;
        return [
            q0,
            inv * (m(1, 2) - m(2, 1)),
            inv * (m(2, 0) - m(0, 2)),
            inv * (m(0, 1) - m(1, 0)),
        ];
    }

    let s = m(0, 0) - m(1, 1) - m(2, 2);
    if s > BRANCH_THRESHOLD {
        // compute q1 and deduce q0, q2 and q3
        let q1 = 0.5 * (s + 1.0).sqrt();
        let inv = 0.25 / q1;
        return [
            inv * (m(1, 2) - m(2, 1)),
            q1,
            inv * (m(0, 1) + m(1, 0)),
            inv * (m(0, 2) + m(2, 0)),
        ];
    }

    let s = m(1, 1) - m(0, 0) - m(2, 2);
    if s > BRANCH_THRESHOLD {
        // compute q2 and deduce q0, q1 and q3
        let q2 = 0.5 * (s + 1.0).sqrt();
        let inv = 0.25 / q2;
        return [
            inv * (m(2, 0) - m(0, 2)),
            inv * (m(0, 1) + m(1, 0)),
            q2,
            inv * (m(2, 1) + m(1, 2)),
        ];
    }

    // compute q3 and deduce q0, q1 and q2
    let s = m(2, 2) - m(0, 0) - m(1, 1);
    let q3 = 0.5 * (s + 1.0).sqrt();
    let inv = 0.25 / q3;
    [
        inv * (m(0, 1) - m(1, 0)),
        inv * (m(0, 2) + m(2, 0)),
        inv * (m(2, 1) + m(1, 2)),
        q3,
    ]
}

/// Reduce `angle` into `[center - π, center + π)`.
pub fn normalize_angle(angle: Radian, center: Radian) -> Radian {
    angle - DPI * ((angle + std::f64::consts::PI - center) / DPI).floor()
}
