//! Axis sequences for Euler/Cardan angle decompositions.
//!
//! A [`RotationOrder`] names the three successive rotation axes used by
//! [`Rotation::from_euler_angles`](crate::rotation::Rotation::from_euler_angles)
//! and [`Rotation::angles`](crate::rotation::Rotation::angles).
//!
//! * Six **Cardan / Tait-Bryan** orders use three distinct axes
//!   (`XYZ`, `XZY`, `YXZ`, `YZX`, `ZXY`, `ZYX`). Their middle angle lives in
//!   `[-π/2, π/2]`.
//! * Six **proper Euler** orders repeat the first axis as the last one
//!   (`XYX`, `XZX`, `YXY`, `YZY`, `ZXZ`, `ZYZ`). Their middle angle lives in
//!   `[0, π]`.
use std::{fmt, str::FromStr};

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::astro_errors::AstroError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RotationOrder {
    XYZ,
    XZY,
    YXZ,
    YZX,
    ZXY,
    ZYX,
    XYX,
    XZX,
    YXY,
    YZY,
    ZXZ,
    ZYZ,
}

fn basis(index: usize) -> Vector3<f64> {
    match index {
        0 => Vector3::x(),
        1 => Vector3::y(),
        _ => Vector3::z(),
    }
}

impl RotationOrder {
    pub const ALL: [RotationOrder; 12] = [
        RotationOrder::XYZ,
        RotationOrder::XZY,
        RotationOrder::YXZ,
        RotationOrder::YZX,
        RotationOrder::ZXY,
        RotationOrder::ZYX,
        RotationOrder::XYX,
        RotationOrder::XZX,
        RotationOrder::YXY,
        RotationOrder::YZY,
        RotationOrder::ZXZ,
        RotationOrder::ZYZ,
    ];

    /// Array indices (0 = X, 1 = Y, 2 = Z) of the three rotation axes.
    pub fn indices(&self) -> (usize, usize, usize) {
        match self {
            RotationOrder::XYZ => (0, 1, 2),
            RotationOrder::XZY => (0, 2, 1),
            RotationOrder::YXZ => (1, 0, 2),
            RotationOrder::YZX => (1, 2, 0),
            RotationOrder::ZXY => (2, 0, 1),
            RotationOrder::ZYX => (2, 1, 0),
            RotationOrder::XYX => (0, 1, 0),
            RotationOrder::XZX => (0, 2, 0),
            RotationOrder::YXY => (1, 0, 1),
            RotationOrder::YZY => (1, 2, 1),
            RotationOrder::ZXZ => (2, 0, 2),
            RotationOrder::ZYZ => (2, 1, 2),
        }
    }

    pub fn index1(&self) -> usize {
        self.indices().0
    }

    pub fn index2(&self) -> usize {
        self.indices().1
    }

    pub fn index3(&self) -> usize {
        self.indices().2
    }

    pub fn axis1(&self) -> Vector3<f64> {
        basis(self.index1())
    }

    pub fn axis2(&self) -> Vector3<f64> {
        basis(self.index2())
    }

    pub fn axis3(&self) -> Vector3<f64> {
        basis(self.index3())
    }

    /// The three unit rotation axes, in application order.
    pub fn axes(&self) -> [Vector3<f64>; 3] {
        [self.axis1(), self.axis2(), self.axis3()]
    }

    /// `true` for the symmetric orders (first axis repeated as the last one).
    pub fn is_proper_euler(&self) -> bool {
        self.index1() == self.index3()
    }

    fn name(&self) -> &'static str {
        match self {
            RotationOrder::XYZ => "XYZ",
            RotationOrder::XZY => "XZY",
            RotationOrder::YXZ => "YXZ",
            RotationOrder::YZX => "YZX",
            RotationOrder::ZXY => "ZXY",
            RotationOrder::ZYX => "ZYX",
            RotationOrder::XYX => "XYX",
            RotationOrder::XZX => "XZX",
            RotationOrder::YXY => "YXY",
            RotationOrder::YZY => "YZY",
            RotationOrder::ZXZ => "ZXZ",
            RotationOrder::ZYZ => "ZYZ",
        }
    }
}

impl fmt::Display for RotationOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for RotationOrder {
    type Err = AstroError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        RotationOrder::ALL
            .iter()
            .copied()
            .find(|order| order.name() == upper)
            .ok_or_else(|| AstroError::InvalidRotationOrder(s.to_string()))
    }
}

#[cfg(test)]
mod test_rotation_order {
    use super::*;

    #[test]
    fn test_axes_match_name() {
        assert_eq!(RotationOrder::XYZ.axes(), [Vector3::x(), Vector3::y(), Vector3::z()]);
        assert_eq!(RotationOrder::ZXZ.axes(), [Vector3::z(), Vector3::x(), Vector3::z()]);
        assert_eq!(RotationOrder::YZX.indices(), (1, 2, 0));
    }

    #[test]
    fn test_families() {
        let proper: Vec<_> = RotationOrder::ALL
            .iter()
            .filter(|o| o.is_proper_euler())
            .collect();
        assert_eq!(proper.len(), 6);
        assert!(!RotationOrder::ZYX.is_proper_euler());
        assert!(RotationOrder::YXY.is_proper_euler());
    }

    #[test]
    fn test_parse_and_display() {
        for order in RotationOrder::ALL {
            assert_eq!(order.to_string().parse::<RotationOrder>().unwrap(), order);
        }
        assert_eq!("zyz".parse::<RotationOrder>().unwrap(), RotationOrder::ZYZ);
        assert_eq!(
            "XXY".parse::<RotationOrder>(),
            Err(AstroError::InvalidRotationOrder("XXY".to_string()))
        );
    }
}
