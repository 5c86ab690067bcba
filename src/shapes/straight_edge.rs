use crate::math::Vector2;
use crate::shapes::SurfacePoint;

/// Reach tolerance along the edge, relative to its length
const END_SLACK: f64 = 1.0e-9;

/// A line segment between two vertices
#[derive(Debug, Clone)]
pub struct StraightEdge {
    /// Index of the starting vertex
    vertex1: usize,

    /// Index of the ending vertex
    vertex2: usize,

    /// Start point in body coordinates
    p1: Vector2,

    /// End point in body coordinates
    p2: Vector2,

    /// Unit direction from `p1` to `p2`
    direction: Vector2,

    /// Length of the segment
    length: f64,

    /// Unit normal pointing out of the body
    normal: Vector2,
}

impl StraightEdge {
    /// Creates a straight edge; the outside is fixed later by `set_orientation`
    pub fn new(vertex1: usize, p1: Vector2, vertex2: usize, p2: Vector2) -> Self {
        let length = p1.distance(&p2);
        let direction = (p2 - p1).normalize();
        Self {
            vertex1,
            vertex2,
            p1,
            p2,
            direction,
            length,
            normal: -direction.perp(),
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

    /// Returns the start point in body coordinates
    pub fn get_point1(&self) -> Vector2 {
        self.p1
    }

    /// Returns the end point in body coordinates
    pub fn get_point2(&self) -> Vector2 {
        self.p2
    }

    /// Returns the length of the segment
    pub fn get_length(&self) -> f64 {
        self.length
    }

    /// Returns the outward unit normal in body coordinates
    pub fn get_normal(&self) -> Vector2 {
        self.normal
    }

    /// Points the normal away from the body given the winding of the boundary
    pub fn set_orientation(&mut self, counter_clockwise: bool) {
        self.normal = if counter_clockwise {
            -self.direction.perp()
        } else {
            self.direction.perp()
        };
    }

    /// Signed distance from the infinite line through the edge; positive is outside
    pub fn distance_to_line(&self, q: Vector2) -> f64 {
        (q - self.p1).dot(&self.normal)
    }

    /// Position of the projection of `q` along the edge, measured from `p1`
    fn project(&self, q: Vector2) -> f64 {
        (q - self.p1).dot(&self.direction)
    }

    fn within_reach(&self, along: f64) -> bool {
        let slack = END_SLACK * self.length.max(1.0);
        along >= -slack && along <= self.length + slack
    }

    /// Signed distance to the edge when `q` projects onto it
    pub fn distance_to_point(&self, q: Vector2) -> Option<f64> {
        let along = self.project(q);
        if self.within_reach(along) {
            Some(self.distance_to_line(q))
        } else {
            None
        }
    }

    /// Returns the point on the segment nearest to `q`
    pub fn nearest_point(&self, q: Vector2) -> Vector2 {
        let along = self.project(q).max(0.0).min(self.length);
        self.p1 + self.direction * along
    }

    /// Returns the contact geometry for `q` if it projects onto the edge
    pub fn surface_point(&self, q: Vector2) -> Option<SurfacePoint> {
        let along = self.project(q);
        if !self.within_reach(along) {
            return None;
        }
        Some(SurfacePoint {
            distance: self.distance_to_line(q),
            point: self.p1 + self.direction * along,
            normal: self.normal,
            tangent: self.direction,
            normal_dp: Vector2::zero(),
        })
    }

    /// True when a point moving from `q_old` to `q_new` went from outside to inside through
    /// the segment
    pub fn intersects_motion(&self, q_old: Vector2, q_new: Vector2) -> bool {
        let d_old = self.distance_to_line(q_old);
        let d_new = self.distance_to_line(q_new);
        if d_old < 0.0 || d_new >= 0.0 {
            return false;
        }
        let t = d_old / (d_old - d_new);
        let crossing = q_old.lerp(&q_new, t);
        self.within_reach(self.project(crossing))
    }

    /// Midpoint of the segment
    pub fn centroid(&self) -> Vector2 {
        (self.p1 + self.p2) * 0.5
    }

    /// Radius of the circle around `centroid` that encloses the segment
    pub fn centroid_radius(&self) -> f64 {
        self.length * 0.5
    }

    /// Contribution of this edge to the signed area enclosed by the boundary
    pub fn signed_area(&self) -> f64 {
        0.5 * self.p1.cross(&self.p2)
    }
}
