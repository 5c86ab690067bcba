mod vector;
mod transform;
mod aabb;

pub use vector::Vector2;
pub use transform::Transform;
pub use aabb::Aabb;

/// Constant for a very small number, used for comparisons
pub const EPSILON: f64 = 1.0e-12;

/// Wraps an angle into the range [0, 2*PI)
#[inline]
pub fn normalize_angle(angle: f64) -> f64 {
    let two_pi = 2.0 * std::f64::consts::PI;
    let a = angle % two_pi;
    if a < 0.0 {
        a + two_pi
    } else {
        a
    }
}
