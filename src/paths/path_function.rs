use crate::math::Vector2;
use std::f64::consts::PI;

/// A curve given as a pair of functions x(t), y(t) over a parameter range
pub trait ParametricPath: Send + Sync + std::fmt::Debug {
    /// Returns the name of the path
    fn get_name(&self) -> &str;

    /// Returns x at parameter `t`
    fn x_value(&self, t: f64) -> f64;

    /// Returns y at parameter `t`
    fn y_value(&self, t: f64) -> f64;

    /// Returns the first parameter value
    fn get_start_t(&self) -> f64;

    /// Returns the last parameter value
    fn get_finish_t(&self) -> f64;

    /// Returns true if the end of the path joins up with its start
    fn is_closed_loop(&self) -> bool;
}

/// A circle traversed counter-clockwise
#[derive(Debug, Clone)]
pub struct CirclePath {
    /// Center of the circle
    center: Vector2,

    /// Radius of the circle
    radius: f64,
}

impl CirclePath {
    /// Creates a circle of the given radius around the origin
    pub fn new(radius: f64) -> Self {
        Self::with_center(Vector2::zero(), radius)
    }

    /// Creates a circle of the given radius around `center`
    pub fn with_center(center: Vector2, radius: f64) -> Self {
        Self { center, radius }
    }

    /// Returns the radius
    pub fn get_radius(&self) -> f64 {
        self.radius
    }
}

impl ParametricPath for CirclePath {
    fn get_name(&self) -> &str {
        "Circle"
    }

    fn x_value(&self, t: f64) -> f64 {
        self.center.x + self.radius * t.cos()
    }

    fn y_value(&self, t: f64) -> f64 {
        self.center.y + self.radius * t.sin()
    }

    fn get_start_t(&self) -> f64 {
        -PI / 2.0
    }

    fn get_finish_t(&self) -> f64 {
        3.0 * PI / 2.0
    }

    fn is_closed_loop(&self) -> bool {
        true
    }
}

/// An ellipse traversed counter-clockwise
#[derive(Debug, Clone)]
pub struct OvalPath {
    /// Half width
    semi_x: f64,

    /// Half height
    semi_y: f64,
}

impl OvalPath {
    /// Creates an ellipse centered on the origin
    pub fn new(semi_x: f64, semi_y: f64) -> Self {
        Self { semi_x, semi_y }
    }
}

impl ParametricPath for OvalPath {
    fn get_name(&self) -> &str {
        "Oval"
    }

    fn x_value(&self, t: f64) -> f64 {
        self.semi_x * t.cos()
    }

    fn y_value(&self, t: f64) -> f64 {
        self.semi_y * t.sin()
    }

    fn get_start_t(&self) -> f64 {
        -PI / 2.0
    }

    fn get_finish_t(&self) -> f64 {
        3.0 * PI / 2.0
    }

    fn is_closed_loop(&self) -> bool {
        true
    }
}

/// A horizontal line segment at y = 0
#[derive(Debug, Clone)]
pub struct FlatPath {
    left: f64,
    right: f64,
}

impl FlatPath {
    /// Creates a flat path spanning `left..right`
    pub fn new(left: f64, right: f64) -> Self {
        Self { left, right }
    }
}

impl ParametricPath for FlatPath {
    fn get_name(&self) -> &str {
        "Flat"
    }

    fn x_value(&self, t: f64) -> f64 {
        t
    }

    fn y_value(&self, _t: f64) -> f64 {
        0.0
    }

    fn get_start_t(&self) -> f64 {
        self.left
    }

    fn get_finish_t(&self) -> f64 {
        self.right
    }

    fn is_closed_loop(&self) -> bool {
        false
    }
}

/// The parabola y = k x^2 over a range of x
#[derive(Debug, Clone)]
pub struct ParabolaPath {
    /// Coefficient of x^2
    k: f64,

    /// Half width of the x range
    half_width: f64,
}

impl ParabolaPath {
    /// Creates a parabola spanning `-half_width..half_width`
    pub fn new(k: f64, half_width: f64) -> Self {
        Self { k, half_width }
    }
}

impl ParametricPath for ParabolaPath {
    fn get_name(&self) -> &str {
        "Parabola"
    }

    fn x_value(&self, t: f64) -> f64 {
        t
    }

    fn y_value(&self, t: f64) -> f64 {
        self.k * t * t
    }

    fn get_start_t(&self) -> f64 {
        -self.half_width
    }

    fn get_finish_t(&self) -> f64 {
        self.half_width
    }

    fn is_closed_loop(&self) -> bool {
        false
    }
}
