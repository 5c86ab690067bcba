use crate::math::Vector2;

#[cfg(feature = "serialize")]
use serde::{Serialize, Deserialize};

/// Placement of a rigid body in the plane: where its center of mass is and how far it is turned
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct Transform {
    /// World position of the center of mass
    pub position: Vector2,

    /// Counter-clockwise rotation in radians
    pub angle: f64,

    /// Cached cosine of the angle
    cos: f64,

    /// Cached sine of the angle
    sin: f64,
}

impl Transform {
    /// Creates a new transform with the given position and angle
    #[inline]
    pub fn new(position: Vector2, angle: f64) -> Self {
        let (sin, cos) = angle.sin_cos();
        Self {
            position,
            angle,
            cos,
            sin,
        }
    }

    /// Creates a new identity transform
    #[inline]
    pub fn identity() -> Self {
        Self::new(Vector2::zero(), 0.0)
    }

    /// Rotates a vector by the transform's angle
    #[inline]
    pub fn rotate_vector(&self, v: Vector2) -> Vector2 {
        v.rotate_cos_sin(self.cos, self.sin)
    }

    /// Rotates a vector by the inverse of the transform's angle
    #[inline]
    pub fn inverse_rotate_vector(&self, v: Vector2) -> Vector2 {
        v.rotate_cos_sin(self.cos, -self.sin)
    }

    /// Maps a point given relative to the center of mass into world coordinates
    #[inline]
    pub fn transform_point(&self, p: Vector2) -> Vector2 {
        self.position + self.rotate_vector(p)
    }

    /// Maps a world point into coordinates relative to the center of mass
    #[inline]
    pub fn inverse_transform_point(&self, p: Vector2) -> Vector2 {
        self.inverse_rotate_vector(p - self.position)
    }

    /// Returns the cosine of the angle
    #[inline]
    pub fn cos(&self) -> f64 {
        self.cos
    }

    /// Returns the sine of the angle
    #[inline]
    pub fn sin(&self) -> f64 {
        self.sin
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}
