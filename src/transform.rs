//! # Kinematic transforms between frames
//!
//! A [`Transform`] maps position, velocity and acceleration expressed in one
//! frame into another frame at a given date. It carries a translation and its
//! first two derivatives, a [`Rotation`] and its angular velocity and
//! acceleration. All quantities are SI (m, m/s, m/s², rad/s, rad/s²).
//!
//! Transforms are immutable: `t1 + t2` chains two transforms (apply `t1`,
//! then `t2`), `!t` inverts one. Frames build their transforms by chaining
//! the per-hop transforms returned by each frame's [`TransformProvider`].
//!
//! ## See also
//! ------------
//! * [`crate::frames`] – frame trees resolving transforms between arbitrary frames.
use std::ops::{Add, Not};

use hifitime::{Epoch, TimeScale};
use nalgebra::Vector3;

use crate::{
    astro_errors::AstroError,
    constants::T2000,
    rotation::{Convention, Rotation},
};

/// Source of the transform from a parent frame to a child frame.
///
/// The returned transform maps coordinates expressed in the parent frame into
/// the child frame, at `date`.
pub trait TransformProvider {
    fn get_transform(&self, date: &Epoch) -> Transform;
}

#[derive(Debug, Clone, PartialEq)]
pub struct Transform {
    date: Epoch,
    translation: Vector3<f64>,
    velocity: Vector3<f64>,
    acceleration: Vector3<f64>,
    rotation: Rotation,
    angular_velocity: Vector3<f64>,
    angular_acceleration: Vector3<f64>,
}

impl Transform {
    /// Identity transform at `date`: zero vectors, identity rotation.
    pub fn identity(date: Epoch) -> Self {
        Transform {
            date,
            translation: Vector3::zeros(),
            velocity: Vector3::zeros(),
            acceleration: Vector3::zeros(),
            rotation: Rotation::identity(),
            angular_velocity: Vector3::zeros(),
            angular_acceleration: Vector3::zeros(),
        }
    }

    /// Pure rotation with constant orientation.
    pub fn from_rotation(date: Epoch, rotation: Rotation) -> Self {
        Transform::identity(date).with_rotation(rotation)
    }

    pub fn with_date(mut self, date: Epoch) -> Self {
        self.date = date;
        self
    }

    pub fn with_translation(mut self, translation: Vector3<f64>) -> Self {
        self.translation = translation;
        self
    }

    pub fn with_velocity(mut self, velocity: Vector3<f64>) -> Self {
        self.velocity = velocity;
        self
    }

    pub fn with_acceleration(mut self, acceleration: Vector3<f64>) -> Self {
        self.acceleration = acceleration;
        self
    }

    pub fn with_rotation(mut self, rotation: Rotation) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_angular_velocity(mut self, angular_velocity: Vector3<f64>) -> Self {
        self.angular_velocity = angular_velocity;
        self
    }

    pub fn with_angular_acceleration(mut self, angular_acceleration: Vector3<f64>) -> Self {
        self.angular_acceleration = angular_acceleration;
        self
    }

    pub fn date(&self) -> Epoch {
        self.date
    }

    pub fn translation(&self) -> &Vector3<f64> {
        &self.translation
    }

    pub fn velocity(&self) -> &Vector3<f64> {
        &self.velocity
    }

    pub fn acceleration(&self) -> &Vector3<f64> {
        &self.acceleration
    }

    pub fn rotation(&self) -> &Rotation {
        &self.rotation
    }

    pub fn angular_velocity(&self) -> &Vector3<f64> {
        &self.angular_velocity
    }

    pub fn angular_acceleration(&self) -> &Vector3<f64> {
        &self.angular_acceleration
    }

    /// Map a position: translate, then rotate.
    pub fn transform_position(&self, position: &Vector3<f64>) -> Vector3<f64> {
        self.rotation.apply_to(&(position + self.translation))
    }

    /// Map a free vector (direction): rotation only.
    pub fn transform_vector(&self, vector: &Vector3<f64>) -> Vector3<f64> {
        self.rotation.apply_to(vector)
    }

    /// Map position, velocity and acceleration with the rigid-body chain rule.
    ///
    /// With `p`, `v`, `a` the inputs shifted by the transform translation and
    /// its derivatives, `R` the rotation, `ω` the angular velocity and `ω̇` the
    /// angular acceleration:
    ///
    /// ```text
    /// pₜ = R p
    /// vₜ = R v − ω × pₜ
    /// aₜ = R a − 2 ω × vₜ − ω × (ω × pₜ) − ω̇ × pₜ
    /// ```
    ///
    /// Arguments
    /// -----------------
    /// * `position`: position in the source frame \[m\].
    /// * `velocity`: velocity in the source frame \[m/s\].
    /// * `acceleration`: acceleration in the source frame \[m/s²\], zero when `None`.
    ///
    /// Return
    /// ----------
    /// * `(position, velocity, acceleration)` in the destination frame.
    pub fn transform(
        &self,
        position: &Vector3<f64>,
        velocity: &Vector3<f64>,
        acceleration: Option<&Vector3<f64>>,
    ) -> (Vector3<f64>, Vector3<f64>, Vector3<f64>) {
        let o1 = &self.angular_velocity;
        let o1_dot = &self.angular_acceleration;

        let p2 = position + self.translation;
        let v2 = velocity + self.velocity;
        let a2 = acceleration.copied().unwrap_or_else(Vector3::zeros) + self.acceleration;

        let pt = self.rotation.apply_to(&p2);
        let cross_p = o1.cross(&pt);
        let vt = self.rotation.apply_to(&v2) - cross_p;
        let cross_v = o1.cross(&vt);
        let cross_cross_p = o1.cross(&cross_p);
        let cross_dot_p = o1_dot.cross(&pt);

        let at = vector_linear_combination(&[
            (1.0, &self.rotation.apply_to(&a2)),
            (-2.0, &cross_v),
            (-1.0, &cross_cross_p),
            (-1.0, &cross_dot_p),
        ]);

        (pt, vt, at)
    }

    /// Chain `self` then `other`.
    ///
    /// Panics if the two transforms do not share the same date: chaining
    /// transforms computed at different dates is a wiring bug.
    pub fn compose(&self, other: &Transform) -> Transform {
        assert_eq!(
            self.date, other.date,
            "cannot compose transforms at different dates"
        );

        let p1 = &self.translation;
        let v1 = &self.velocity;
        let a1 = &self.acceleration;
        let r1 = &self.rotation;
        let o1 = &self.angular_velocity;
        let o1_dot = &self.angular_acceleration;

        let p2 = &other.translation;
        let v2 = &other.velocity;
        let a2 = &other.acceleration;
        let r2 = &other.rotation;
        let o2 = &other.angular_velocity;
        let o2_dot = &other.angular_acceleration;

        let r1_inv = r1.inverse();

        let translation = p1 + r1_inv.apply_to(p2);

        let o1_x_p2 = o1.cross(p2);
        let velocity = v1 + r1_inv.apply_to(&(v2 + o1_x_p2));

        let o1_x_o1_x_p2 = o1.cross(&o1_x_p2);
        let o1_x_v2 = o1.cross(v2);
        let o1_dot_x_p2 = o1_dot.cross(p2);
        let acc = vector_linear_combination(&[
            (1.0, a2),
            (2.0, &o1_x_v2),
            (1.0, &o1_x_o1_x_p2),
            (1.0, &o1_dot_x_p2),
        ]);
        let acceleration = a1 + r1_inv.apply_to(&acc);

        let rotation = r1.compose(r2, Convention::Frame);

        let r2_o1 = r2.apply_to(o1);
        let angular_velocity = o2 + r2_o1;
        let angular_acceleration = vector_linear_combination(&[
            (1.0, o2_dot),
            (1.0, &r2.apply_to(o1_dot)),
            (-1.0, &o2.cross(&r2_o1)),
        ]);

        Transform {
            date: self.date,
            translation,
            velocity,
            acceleration,
            rotation,
            angular_velocity,
            angular_acceleration,
        }
    }

    /// Inverse transform: `t.compose(&t.inverse())` is the identity.
    pub fn inverse(&self) -> Transform {
        let o = &self.angular_velocity;
        let o_dot = &self.angular_acceleration;

        let rp = self.rotation.apply_to(&self.translation);
        let rv = self.rotation.apply_to(&self.velocity);
        let ra = self.rotation.apply_to(&self.acceleration);

        let o_x_rp = o.cross(&rp);
        let o_x_rv = o.cross(&rv);
        let o_dot_x_rp = o_dot.cross(&rp);
        let o_x_o_x_rp = o.cross(&o_x_rp);

        let acceleration = vector_linear_combination(&[
            (-1.0, &ra),
            (2.0, &o_x_rv),
            (1.0, &o_dot_x_rp),
            (-1.0, &o_x_o_x_rp),
        ]);

        let rotation = self.rotation.inverse();

        Transform {
            date: self.date,
            translation: -rp,
            velocity: o_x_rp - rv,
            acceleration,
            angular_velocity: -rotation.apply_to(o),
            angular_acceleration: -rotation.apply_to(o_dot),
            rotation,
        }
    }
}

impl Add for Transform {
    type Output = Transform;

    fn add(self, rhs: Transform) -> Self::Output {
        self.compose(&rhs)
    }
}

impl Add<&Transform> for &Transform {
    type Output = Transform;

    fn add(self, rhs: &Transform) -> Self::Output {
        self.compose(rhs)
    }
}

impl Not for Transform {
    type Output = Transform;

    fn not(self) -> Self::Output {
        self.inverse()
    }
}

impl Not for &Transform {
    type Output = Transform;

    fn not(self) -> Self::Output {
        self.inverse()
    }
}

/// Provider returning the same transform at every date.
#[derive(Debug, Clone)]
pub struct FixedTransformProvider {
    transform: Transform,
}

impl FixedTransformProvider {
    pub fn new(transform: Transform) -> Self {
        FixedTransformProvider { transform }
    }

    pub fn from_rotation(rotation: Rotation) -> Self {
        FixedTransformProvider::new(Transform::from_rotation(j2000(), rotation))
    }

    pub fn identity() -> Self {
        FixedTransformProvider::new(Transform::identity(j2000()))
    }
}

impl TransformProvider for FixedTransformProvider {
    fn get_transform(&self, date: &Epoch) -> Transform {
        self.transform.clone().with_date(*date)
    }
}

// the stored date is overwritten on every query
fn j2000() -> Epoch {
    Epoch::from_mjd_in_time_scale(T2000, TimeScale::TT)
}

/// Weighted sum `Σ aᵢ uᵢ` of 3-vectors.
pub fn vector_linear_combination(terms: &[(f64, &Vector3<f64>)]) -> Vector3<f64> {
    terms
        .iter()
        .fold(Vector3::zeros(), |acc, (weight, vector)| acc + *vector * *weight)
}

/// Build a 3-vector from a slice, failing if it does not hold exactly three values.
pub fn vector3_from_slice(values: &[f64]) -> Result<Vector3<f64>, AstroError> {
    match values {
        [x, y, z] => Ok(Vector3::new(*x, *y, *z)),
        _ => Err(AstroError::InvalidShape {
            expected: "(3,)".to_string(),
            found: format!("({},)", values.len()),
        }),
    }
}
