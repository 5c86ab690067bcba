use crate::math::{normalize_angle, Vector2};
use crate::shapes::SurfacePoint;
use std::f64::consts::PI;

/// Angular slack when deciding whether a direction falls inside the arc
const ANGLE_SLACK: f64 = 1.0e-9;

/// An arc of a circle between two vertices, or a full circle when both vertices coincide
#[derive(Debug, Clone)]
pub struct CircularEdge {
    vertex1: usize,
    vertex2: usize,

    /// Start point in body coordinates
    p1: Vector2,

    /// End point in body coordinates
    p2: Vector2,

    /// Center of the circle in body coordinates
    center: Vector2,

    /// Radius of the circle
    radius: f64,

    /// Direction of travel from `p1` to `p2` around the center
    clockwise: bool,

    /// Angle where the arc begins when swept counter-clockwise
    angle_low: f64,

    /// Counter-clockwise sweep of the arc in radians
    sweep: f64,

    /// True when the arc bulges away from the body
    convex: bool,
}

impl CircularEdge {
    /// Creates an arc from `p1` to `p2` around `center`
    pub fn new(
        vertex1: usize,
        p1: Vector2,
        vertex2: usize,
        p2: Vector2,
        center: Vector2,
        clockwise: bool,
    ) -> Self {
        let radius = p1.distance(&center);
        let a1 = (p1 - center).angle();
        let a2 = (p2 - center).angle();
        let full = p1.distance(&p2) < 1.0e-12 * radius.max(1.0);
        let (angle_low, sweep) = if full {
            (normalize_angle(a1), 2.0 * PI)
        } else if clockwise {
            (normalize_angle(a2), normalize_angle(a1 - a2))
        } else {
            (normalize_angle(a1), normalize_angle(a2 - a1))
        };
        Self {
            vertex1,
            vertex2,
            p1,
            p2,
            center,
            radius,
            clockwise,
            angle_low,
            sweep,
            convex: true,
        }
    }

    pub fn vertex1(&self) -> usize {
        self.vertex1
    }

    pub fn vertex2(&self) -> usize {
        self.vertex2
    }

    pub(crate) fn set_vertex2(&mut self, vertex2: usize) {
        self.vertex2 = vertex2;
    }

    /// Returns the center in body coordinates
    pub fn get_center(&self) -> Vector2 {
        self.center
    }

    /// Returns the radius
    pub fn get_radius(&self) -> f64 {
        self.radius
    }

    /// Returns true if the arc bulges away from the body
    pub fn is_convex(&self) -> bool {
        self.convex
    }

    /// Returns true if the edge is a complete circle
    pub fn is_full_circle(&self) -> bool {
        self.sweep >= 2.0 * PI - ANGLE_SLACK
    }

    /// Returns the length of the arc
    pub fn get_arc_length(&self) -> f64 {
        self.radius * self.sweep
    }

    /// Decides which side is outside given the winding of the boundary
    pub fn set_orientation(&mut self, counter_clockwise: bool) {
        // the center lies inside the body when the arc turns the same way as the boundary
        self.convex = self.clockwise != counter_clockwise;
    }

    /// True if the direction from the center at `angle` lies within the arc
    pub fn contains_angle(&self, angle: f64) -> bool {
        if self.is_full_circle() {
            return true;
        }
        let rel = normalize_angle(angle - self.angle_low);
        rel <= self.sweep + ANGLE_SLACK || rel >= 2.0 * PI - ANGLE_SLACK
    }

    /// True if the direction from the center towards body point `q` lies within the arc
    pub fn contains_direction(&self, q: Vector2) -> bool {
        self.contains_angle((q - self.center).angle())
    }

    /// Signed distance from the full circle; positive is outside the body
    pub fn distance_to_circle(&self, q: Vector2) -> f64 {
        let r = q.distance(&self.center);
        if self.convex {
            r - self.radius
        } else {
            self.radius - r
        }
    }

    /// Signed distance to the arc when `q` lies within its angular range
    pub fn distance_to_point(&self, q: Vector2) -> Option<f64> {
        if self.contains_direction(q) {
            Some(self.distance_to_circle(q))
        } else {
            None
        }
    }

    /// Returns the outward normal at the arc point nearest `q`
    pub fn outward_normal(&self, q: Vector2) -> Vector2 {
        let radial = (q - self.center).normalize();
        if self.convex {
            radial
        } else {
            -radial
        }
    }

    /// Returns the arc point in the direction of `q`
    pub fn nearest_point(&self, q: Vector2) -> Vector2 {
        self.center + (q - self.center).normalize() * self.radius
    }

    /// Returns the contact geometry for `q` if it lies within the arc's angular range
    pub fn surface_point(&self, q: Vector2) -> Option<SurfacePoint> {
        if !self.contains_direction(q) || q.distance(&self.center) < crate::math::EPSILON {
            return None;
        }
        let normal = self.outward_normal(q);
        let tangent = (q - self.center).normalize().perp();
        let sign = if self.convex { 1.0 } else { -1.0 };
        Some(SurfacePoint {
            distance: self.distance_to_circle(q),
            point: self.nearest_point(q),
            normal,
            tangent,
            normal_dp: tangent * (sign / self.radius),
        })
    }

    /// True when a point moving from `q_old` to `q_new` went from outside to inside through
    /// the arc
    pub fn intersects_motion(&self, q_old: Vector2, q_new: Vector2) -> bool {
        let d_old = self.distance_to_circle(q_old);
        let d_new = self.distance_to_circle(q_new);
        if d_old < 0.0 || d_new >= 0.0 {
            return false;
        }
        let t = d_old / (d_old - d_new);
        self.contains_direction(q_old.lerp(&q_new, t))
    }

    /// Center of the enclosing circle used for quick rejection
    pub fn centroid(&self) -> Vector2 {
        self.center
    }

    /// Radius of the enclosing circle used for quick rejection
    pub fn centroid_radius(&self) -> f64 {
        self.radius
    }

    /// Contribution of this edge to the signed area enclosed by the boundary
    pub fn signed_area(&self) -> f64 {
        let chord = 0.5 * self.p1.cross(&self.p2);
        let segment = 0.5 * self.radius * self.radius * (self.sweep - self.sweep.sin());
        if self.clockwise {
            chord - segment
        } else {
            chord + segment
        }
    }

    /// Points spaced about `spacing` apart along the interior of the arc
    pub fn decorate(&self, spacing: f64) -> Vec<Vector2> {
        if spacing <= 0.0 {
            return Vec::new();
        }
        let count = (self.get_arc_length() / spacing).floor() as usize;
        if count < 2 {
            return Vec::new();
        }
        let step = self.sweep / count as f64;
        (1..count)
            .map(|i| {
                let angle = self.angle_low + step * i as f64;
                self.center + Vector2::from_angle(angle) * self.radius
            })
            .collect()
    }
}
