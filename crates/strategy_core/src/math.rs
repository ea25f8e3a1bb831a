//! Planar vector math for unit movement.
//!
//! Strategic units move on the map plane, so a 2D vector is enough.
//! Frame deltas are wall-clock seconds and the simulation does not aim for
//! cross-machine determinism, so plain `f32` is used throughout.

use serde::{Deserialize, Serialize};

/// 2D vector on the strategic map plane.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec2 {
    /// X coordinate.
    pub x: f32,
    /// Y coordinate.
    pub y: f32,
}

impl Vec2 {
    /// Create a new vector.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Zero vector.
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    /// Unit vector along +X, the default heading of a new unit.
    pub const UNIT_X: Self = Self { x: 1.0, y: 0.0 };

    /// Dot product of two vectors.
    #[must_use]
    pub fn dot(self, other: Self) -> f32 {
        self.x * other.x + self.y * other.y
    }

    /// Z component of the 3D cross product (positive when `other` is
    /// counter-clockwise from `self`).
    #[must_use]
    pub fn perp_dot(self, other: Self) -> f32 {
        self.x * other.y - self.y * other.x
    }

    /// Squared length.
    #[must_use]
    pub fn length_squared(self) -> f32 {
        self.dot(self)
    }

    /// Length.
    #[must_use]
    pub fn length(self) -> f32 {
        self.length_squared().sqrt()
    }

    /// Normalize to unit length. The zero vector stays zero.
    #[must_use]
    pub fn normalize_or_zero(self) -> Self {
        let len = self.length();
        if len <= f32::EPSILON {
            Self::ZERO
        } else {
            self * (1.0 / len)
        }
    }

    /// Rotate by `angle` radians counter-clockwise.
    #[must_use]
    pub fn rotated(self, angle: f32) -> Self {
        let (sin, cos) = angle.sin_cos();
        Self::new(self.x * cos - self.y * sin, self.x * sin + self.y * cos)
    }

    /// Signed angle in radians from `self` to `other`.
    #[must_use]
    pub fn angle_to(self, other: Self) -> f32 {
        self.perp_dot(other).atan2(self.dot(other))
    }

    /// Turn this direction toward `desired` by at most `max_angle` radians.
    ///
    /// Both vectors are expected to be normalized. Returns `desired` exactly
    /// when the remaining angle fits inside `max_angle`.
    #[must_use]
    pub fn rotate_towards(self, desired: Self, max_angle: f32) -> Self {
        let angle = self.angle_to(desired);
        if angle.abs() <= max_angle {
            desired
        } else {
            self.rotated(max_angle.copysign(angle)).normalize_or_zero()
        }
    }
}

impl std::ops::Add for Vec2 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl std::ops::AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Self) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl std::ops::Sub for Vec2 {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl std::ops::Mul<f32> for Vec2 {
    type Output = Self;

    fn mul(self, rhs: f32) -> Self::Output {
        Self::new(self.x * rhs, self.y * rhs)
    }
}
