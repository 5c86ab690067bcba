use crate::math::Vector2;
use crate::shapes::{CircularEdge, PathEdge, StraightEdge};

/// Where a query point sits relative to an edge, all in the edge owner's body coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfacePoint {
    /// Signed distance from the surface; negative means the point is inside the body
    pub distance: f64,

    /// Nearest point on the surface
    pub point: Vector2,

    /// Outward unit normal at `point`
    pub normal: Vector2,

    /// Unit tangent at `point`
    pub tangent: Vector2,

    /// Rate of change of `normal` per unit distance travelled along `tangent`
    pub normal_dp: Vector2,
}

/// One piece of a polygon's boundary
#[derive(Debug, Clone)]
pub enum Edge {
    /// A line segment
    Straight(StraightEdge),

    /// An arc of a circle
    Circular(CircularEdge),

    /// A stretch of a numerically sampled curve
    Path(PathEdge),
}

impl Edge {
    /// Index of the vertex the edge starts at
    pub fn vertex1(&self) -> usize {
        match self {
            Edge::Straight(e) => e.vertex1(),
            Edge::Circular(e) => e.vertex1(),
            Edge::Path(e) => e.vertex1(),
        }
    }

    /// Index of the vertex the edge ends at
    pub fn vertex2(&self) -> usize {
        match self {
            Edge::Straight(e) => e.vertex2(),
            Edge::Circular(e) => e.vertex2(),
            Edge::Path(e) => e.vertex2(),
        }
    }

    pub(crate) fn set_vertex2(&mut self, vertex2: usize) {
        match self {
            Edge::Straight(e) => e.set_vertex2(vertex2),
            Edge::Circular(e) => e.set_vertex2(vertex2),
            Edge::Path(e) => e.set_vertex2(vertex2),
        }
    }

    pub fn is_straight(&self) -> bool {
        matches!(self, Edge::Straight(_))
    }

    pub fn is_circular(&self) -> bool {
        matches!(self, Edge::Circular(_))
    }

    pub fn is_path(&self) -> bool {
        matches!(self, Edge::Path(_))
    }

    /// Signed distance from body point `q`, or `None` when `q` is beyond the edge's reach
    pub fn distance_to_point(&self, q: Vector2) -> Option<f64> {
        match self {
            Edge::Straight(e) => e.distance_to_point(q),
            Edge::Circular(e) => e.distance_to_point(q),
            Edge::Path(e) => e.distance_to_point(q),
        }
    }

    /// Contact geometry for body point `q`, or `None` when `q` is beyond the edge's reach
    pub fn surface_point(&self, q: Vector2) -> Option<SurfacePoint> {
        match self {
            Edge::Straight(e) => e.surface_point(q),
            Edge::Circular(e) => e.surface_point(q),
            Edge::Path(e) => e.surface_point(q),
        }
    }

    /// True when a point moving from `q_old` to `q_new` passed into the body through this edge
    pub fn intersects_motion(&self, q_old: Vector2, q_new: Vector2) -> bool {
        match self {
            Edge::Straight(e) => e.intersects_motion(q_old, q_new),
            Edge::Circular(e) => e.intersects_motion(q_old, q_new),
            Edge::Path(e) => e.intersects_motion(q_old, q_new),
        }
    }

    /// Center of a circle enclosing the edge
    pub fn centroid(&self) -> Vector2 {
        match self {
            Edge::Straight(e) => e.centroid(),
            Edge::Circular(e) => e.centroid(),
            Edge::Path(e) => e.centroid(),
        }
    }

    /// Radius of a circle enclosing the edge
    pub fn centroid_radius(&self) -> f64 {
        match self {
            Edge::Straight(e) => e.centroid_radius(),
            Edge::Circular(e) => e.centroid_radius(),
            Edge::Path(e) => e.centroid_radius(),
        }
    }

    pub(crate) fn signed_area(&self) -> f64 {
        match self {
            Edge::Straight(e) => e.signed_area(),
            Edge::Circular(e) => e.signed_area(),
            Edge::Path(e) => e.signed_area(),
        }
    }

    pub(crate) fn set_orientation(&mut self, counter_clockwise: bool) {
        match self {
            Edge::Straight(e) => e.set_orientation(counter_clockwise),
            Edge::Circular(e) => e.set_orientation(counter_clockwise),
            Edge::Path(e) => e.set_orientation(counter_clockwise),
        }
    }

    /// Extra sample points along a curved edge; straight edges have none
    pub fn decorate(&self, spacing: f64) -> Vec<Vector2> {
        match self {
            Edge::Straight(_) => Vec::new(),
            Edge::Circular(e) => e.decorate(spacing),
            Edge::Path(e) => e.decorate(spacing),
        }
    }
}
