use crate::math::Vector2;

/// Scratch record describing one location along a `NumericalPath`.
///
/// Connectors keep one of these and let the path update it in place every step, so the
/// last known path position doubles as the starting guess for the next local search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathPoint {
    /// Arc length along the path
    pub p: f64,

    /// World x coordinate of the point
    pub x: f64,

    /// World y coordinate of the point
    pub y: f64,

    /// Slope dy/dx of the path at the point (infinite for vertical tangents)
    pub slope: f64,

    /// x component of the unit tangent, that is dx/dp
    pub slope_x: f64,

    /// y component of the unit tangent, that is dy/dp
    pub slope_y: f64,

    /// x component of the unit normal (left of the direction of travel)
    pub normal_x: f64,

    /// y component of the unit normal
    pub normal_y: f64,

    /// Rate of change of the normal's x component with respect to `p`
    pub normal_x_dp: f64,

    /// Rate of change of the normal's y component with respect to `p`
    pub normal_y_dp: f64,

    /// Signed radius of curvature, infinite where the path is straight
    pub radius: f64,

    /// Index of the table sample at or before `p`
    pub idx: usize,
}

impl PathPoint {
    /// Creates a path point at the given arc length with nothing else computed yet
    pub fn new(p: f64) -> Self {
        Self {
            p,
            x: 0.0,
            y: 0.0,
            slope: 0.0,
            slope_x: 1.0,
            slope_y: 0.0,
            normal_x: 0.0,
            normal_y: 1.0,
            normal_x_dp: 0.0,
            normal_y_dp: 0.0,
            radius: f64::INFINITY,
            idx: 0,
        }
    }

    /// Returns the location of the point
    pub fn get_point(&self) -> Vector2 {
        Vector2::new(self.x, self.y)
    }

    /// Returns the unit tangent in the direction of increasing `p`
    pub fn get_tangent(&self) -> Vector2 {
        Vector2::new(self.slope_x, self.slope_y)
    }

    /// Returns the unit normal
    pub fn get_normal(&self) -> Vector2 {
        Vector2::new(self.normal_x, self.normal_y)
    }

    /// Returns the derivative of the normal with respect to `p`
    pub fn get_normal_dp(&self) -> Vector2 {
        Vector2::new(self.normal_x_dp, self.normal_y_dp)
    }
}

impl Default for PathPoint {
    fn default() -> Self {
        Self::new(0.0)
    }
}
