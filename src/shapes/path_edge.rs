use crate::math::Vector2;
use crate::paths::NumericalPath;
use crate::shapes::SurfacePoint;
use std::sync::Arc;

/// Largest sideways offset from an end of the edge for a point to still be within reach
const END_REACH: f64 = 1.0e-9;

/// A body edge that follows a stretch of a `NumericalPath` given in body coordinates.
///
/// The edge runs from `p_start` to `p_end`; when `p_end < p_start` it follows the path
/// backwards.
#[derive(Debug, Clone)]
pub struct PathEdge {
    vertex1: usize,
    vertex2: usize,

    /// The curve, shared with anything else that uses it
    path: Arc<NumericalPath>,

    /// Arc length where the edge starts
    p_start: f64,

    /// Arc length where the edge ends
    p_end: f64,

    /// +1 when the outward normal is the path's own normal, -1 when it is the opposite
    outward_sign: f64,

    /// Center of the enclosing circle
    centroid: Vector2,

    /// Radius of the enclosing circle
    centroid_radius: f64,
}

impl PathEdge {
    /// Creates an edge along `path` from `p_start` to `p_end`
    pub fn new(vertex1: usize, vertex2: usize, path: Arc<NumericalPath>, p_start: f64, p_end: f64) -> Self {
        let samples = Self::sample_points(&path, p_start, p_end, 64);
        let (centroid, centroid_radius) = match crate::math::Aabb::from_points(&samples) {
            Some(bounds) => {
                let c = bounds.center();
                let r = samples.iter().map(|s| s.distance(&c)).fold(0.0, f64::max);
                (c, r)
            }
            None => (Vector2::zero(), 0.0),
        };
        Self {
            vertex1,
            vertex2,
            path,
            p_start,
            p_end,
            outward_sign: 1.0,
            centroid,
            centroid_radius,
        }
    }

    fn sample_points(path: &NumericalPath, p_start: f64, p_end: f64, count: usize) -> Vec<Vector2> {
        (0..=count)
            .map(|i| path.get_point(p_start + (p_end - p_start) * i as f64 / count as f64))
            .collect()
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

    /// Returns the underlying path
    pub fn get_path(&self) -> &Arc<NumericalPath> {
        &self.path
    }

    /// Returns the edge's range of arc length as `(low, high)`
    pub fn get_p_range(&self) -> (f64, f64) {
        (self.p_start.min(self.p_end), self.p_start.max(self.p_end))
    }

    /// Decides which side is outside given the winding of the boundary
    pub fn set_orientation(&mut self, counter_clockwise: bool) {
        // the path normal is on the left of increasing p; outside is on the right of travel
        // for a counter-clockwise boundary
        let forward = if self.p_end >= self.p_start { 1.0 } else { -1.0 };
        self.outward_sign = if counter_clockwise { -forward } else { forward };
    }

    /// Returns the contact geometry for `q` if it projects onto the edge
    pub fn surface_point(&self, q: Vector2) -> Option<SurfacePoint> {
        let (lo, hi) = self.get_p_range();
        let ppt = self.path.find_nearest_global_in_range(q, lo, hi);
        let point = ppt.get_point();
        let tangent = ppt.get_tangent();
        if (ppt.p <= lo || ppt.p >= hi) && tangent.dot(&(q - point)).abs() > END_REACH * (1.0 + q.length()) {
            return None;
        }
        let normal = ppt.get_normal() * self.outward_sign;
        Some(SurfacePoint {
            distance: normal.dot(&(q - point)),
            point,
            normal,
            tangent,
            normal_dp: ppt.get_normal_dp() * self.outward_sign,
        })
    }

    /// Signed distance to the edge when `q` projects onto it
    pub fn distance_to_point(&self, q: Vector2) -> Option<f64> {
        self.surface_point(q).map(|s| s.distance)
    }

    /// True when a point moving from `q_old` to `q_new` went from outside to inside through
    /// the edge
    pub fn intersects_motion(&self, q_old: Vector2, q_new: Vector2) -> bool {
        match (self.surface_point(q_old), self.surface_point(q_new)) {
            (Some(old), Some(new)) => old.distance >= 0.0 && new.distance < 0.0,
            _ => false,
        }
    }

    pub fn centroid(&self) -> Vector2 {
        self.centroid
    }

    pub fn centroid_radius(&self) -> f64 {
        self.centroid_radius
    }

    /// Contribution of this edge to the signed area enclosed by the boundary
    pub fn signed_area(&self) -> f64 {
        let samples = Self::sample_points(&self.path, self.p_start, self.p_end, 256);
        samples.windows(2).map(|w| 0.5 * w[0].cross(&w[1])).sum()
    }

    /// Points spaced about `spacing` apart along the interior of the edge
    pub fn decorate(&self, spacing: f64) -> Vec<Vector2> {
        if spacing <= 0.0 {
            return Vec::new();
        }
        let span = self.p_end - self.p_start;
        let count = (span.abs() / spacing).floor() as usize;
        if count < 2 {
            return Vec::new();
        }
        (1..count)
            .map(|i| self.path.get_point(self.p_start + span * i as f64 / count as f64))
            .collect()
    }
}
