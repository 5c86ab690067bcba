use crate::error::PhysicsError;
use crate::math::{Aabb, Vector2, EPSILON};
use crate::paths::{ParametricPath, PathPoint};
use crate::Result;

use tracing::debug;

/// Samples closer together than this are merged when the table is built
const MIN_SEGMENT: f64 = 1.0e-12;

/// A curve stored as a table of samples indexed by arc length.
///
/// Each sample holds the arc length `p` from the start of the path, the location and the unit
/// tangent (dx/dp, dy/dp). Between samples everything is interpolated linearly. Open paths are
/// extended past both ends as straight lines along the end tangents. For closed loops the last
/// sample repeats the first one, and `p` wraps around modulo the total length.
#[derive(Debug, Clone)]
pub struct NumericalPath {
    /// Name of the curve this table was sampled from
    name: String,

    /// Sampled x coordinates
    xvals: Vec<f64>,

    /// Sampled y coordinates
    yvals: Vec<f64>,

    /// Arc length at each sample
    pvals: Vec<f64>,

    /// Unit tangent x component at each sample
    dxvals: Vec<f64>,

    /// Unit tangent y component at each sample
    dyvals: Vec<f64>,

    /// Whether the end of the path joins its start
    closed_loop: bool,

    /// Bounding box of all samples
    bounds: Aabb,
}

impl NumericalPath {
    /// Number of samples taken from a parametric curve unless told otherwise
    pub const DEFAULT_TABLE_LENGTH: usize = 9000;

    /// Samples a parametric curve with the default table length
    pub fn new(path: &dyn ParametricPath) -> Result<Self> {
        Self::with_table_length(path, Self::DEFAULT_TABLE_LENGTH)
    }

    /// Samples a parametric curve at `table_length` evenly spaced parameter values
    pub fn with_table_length(path: &dyn ParametricPath, table_length: usize) -> Result<Self> {
        if table_length < 2 {
            return Err(PhysicsError::InvalidParameter(format!(
                "Path table needs at least 2 samples, got {}", table_length
            )));
        }

        let start = path.get_start_t();
        let finish = path.get_finish_t();
        if !(finish > start) {
            return Err(PhysicsError::InvalidParameter(format!(
                "Path parameter range is empty: {} to {}", start, finish
            )));
        }

        let delta = (finish - start) / (table_length - 1) as f64;
        let points: Vec<Vector2> = (0..table_length)
            .map(|i| {
                let t = if i == table_length - 1 { finish } else { start + i as f64 * delta };
                Vector2::new(path.x_value(t), path.y_value(t))
            })
            .collect();

        Self::build(path.get_name(), &points, path.is_closed_loop())
    }

    /// Builds a path that runs through the given points in order
    pub fn from_points(name: &str, points: &[Vector2], closed_loop: bool) -> Result<Self> {
        Self::build(name, points, closed_loop)
    }

    fn build(name: &str, points: &[Vector2], closed_loop: bool) -> Result<Self> {
        let mut pts: Vec<Vector2> = Vec::with_capacity(points.len() + 1);
        for &pt in points {
            if !pt.is_finite() {
                return Err(PhysicsError::InvalidParameter(format!(
                    "Path {} has a non-finite sample {}", name, pt
                )));
            }
            match pts.last() {
                Some(last) if last.distance(&pt) < MIN_SEGMENT => continue,
                _ => pts.push(pt),
            }
        }

        if closed_loop {
            if let Some(&first) = pts.first() {
                let n = pts.len();
                if n > 1 && pts[n - 1].distance(&first) < 1.0e-9 {
                    pts[n - 1] = first;
                } else {
                    pts.push(first);
                }
            }
        }

        let min_len = if closed_loop { 4 } else { 2 };
        if pts.len() < min_len {
            return Err(PhysicsError::InvalidParameter(format!(
                "Path {} needs at least {} distinct samples", name, min_len
            )));
        }

        let n = pts.len();
        let mut pvals = Vec::with_capacity(n);
        let mut p = 0.0;
        pvals.push(p);
        for i in 1..n {
            p += pts[i].distance(&pts[i - 1]);
            pvals.push(p);
        }

        let mut dxvals = Vec::with_capacity(n);
        let mut dyvals = Vec::with_capacity(n);
        for i in 0..n {
            // central differences, wrapping across the join of a closed loop
            let (prev, next) = if closed_loop {
                let prev = if i == 0 { n - 2 } else { i - 1 };
                let next = if i == n - 1 { 1 } else { i + 1 };
                (prev, next)
            } else {
                (i.saturating_sub(1), (i + 1).min(n - 1))
            };
            let tangent = (pts[next] - pts[prev]).normalize();
            dxvals.push(tangent.x);
            dyvals.push(tangent.y);
        }

        let bounds = Aabb::from_points(&pts).ok_or_else(|| {
            PhysicsError::InvalidParameter(format!("Path {} has no samples", name))
        })?;

        debug!(path = name, samples = n, length = p, closed_loop, "built numerical path");

        Ok(Self {
            name: name.to_string(),
            xvals: pts.iter().map(|v| v.x).collect(),
            yvals: pts.iter().map(|v| v.y).collect(),
            pvals,
            dxvals,
            dyvals,
            closed_loop,
            bounds,
        })
    }

    /// Returns the name of the path
    pub fn get_name(&self) -> &str {
        &self.name
    }

    /// Returns the number of samples in the table
    pub fn get_table_length(&self) -> usize {
        self.pvals.len()
    }

    /// Returns the total arc length
    pub fn get_length(&self) -> f64 {
        self.pvals[self.pvals.len() - 1]
    }

    /// Returns the arc length at the start of the path
    pub fn get_start_p(&self) -> f64 {
        0.0
    }

    /// Returns the arc length at the end of the path
    pub fn get_finish_p(&self) -> f64 {
        self.get_length()
    }

    /// Returns true if the path is a closed loop
    pub fn is_closed_loop(&self) -> bool {
        self.closed_loop
    }

    /// Returns the bounding box of the sampled points
    pub fn get_bounds(&self) -> Aabb {
        self.bounds
    }

    /// Wraps `p` into `[0, length)` for closed loops; open paths are returned unchanged
    pub fn mod_p(&self, p: f64) -> f64 {
        if !self.closed_loop {
            return p;
        }
        let length = self.get_length();
        let r = p % length;
        if r < 0.0 {
            r + length
        } else {
            r
        }
    }

    /// Returns the sampled point at table index `i`
    fn sample(&self, i: usize) -> Vector2 {
        Vector2::new(self.xvals[i], self.yvals[i])
    }

    /// Returns the sampled tangent at table index `i`
    fn tangent(&self, i: usize) -> Vector2 {
        Vector2::new(self.dxvals[i], self.dyvals[i])
    }

    /// Signed curvature of the segment starting at table index `k`
    fn segment_curvature(&self, k: usize) -> f64 {
        let t0 = self.tangent(k);
        let t1 = self.tangent(k + 1);
        let dp = self.pvals[k + 1] - self.pvals[k];
        if dp < MIN_SEGMENT {
            return 0.0;
        }
        t0.cross(&t1).atan2(t0.dot(&t1)) / dp
    }

    /// Index of the segment containing `p`, which must lie within the table
    fn segment_index(&self, p: f64) -> usize {
        let n = self.pvals.len();
        let k = self.pvals.partition_point(|&v| v <= p);
        k.saturating_sub(1).min(n - 2)
    }

    /// Fills in location, tangent, normal and curvature for the arc length stored in `ppt.p`
    pub fn map_p_to_xy(&self, ppt: &mut PathPoint) {
        let n = self.pvals.len();
        let length = self.get_length();
        if self.closed_loop {
            ppt.p = self.mod_p(ppt.p);
        }
        let p = ppt.p;

        let (point, tangent, curvature, idx) = if !self.closed_loop && p < 0.0 {
            let t = self.tangent(0);
            (self.sample(0) + t * p, t, 0.0, 0)
        } else if !self.closed_loop && p > length {
            let t = self.tangent(n - 1);
            (self.sample(n - 1) + t * (p - length), t, 0.0, n - 2)
        } else {
            let k = self.segment_index(p);
            let dp = self.pvals[k + 1] - self.pvals[k];
            let frac = if dp > MIN_SEGMENT { (p - self.pvals[k]) / dp } else { 0.0 };
            let point = self.sample(k).lerp(&self.sample(k + 1), frac);
            let tangent = self.tangent(k).lerp(&self.tangent(k + 1), frac).normalize();
            (point, tangent, self.segment_curvature(k), k)
        };

        let normal = tangent.perp();
        let normal_dp = tangent * (-curvature);
        ppt.x = point.x;
        ppt.y = point.y;
        ppt.slope_x = tangent.x;
        ppt.slope_y = tangent.y;
        ppt.slope = if tangent.x.abs() > EPSILON {
            tangent.y / tangent.x
        } else if tangent.y >= 0.0 {
            f64::INFINITY
        } else {
            f64::NEG_INFINITY
        };
        ppt.normal_x = normal.x;
        ppt.normal_y = normal.y;
        ppt.normal_x_dp = normal_dp.x;
        ppt.normal_y_dp = normal_dp.y;
        ppt.radius = if curvature.abs() > EPSILON { 1.0 / curvature } else { f64::INFINITY };
        ppt.idx = idx;
    }

    /// Returns a fully computed path point at arc length `p`
    pub fn point_at(&self, p: f64) -> PathPoint {
        let mut ppt = PathPoint::new(p);
        self.map_p_to_xy(&mut ppt);
        ppt
    }

    /// Returns the location on the path at arc length `p`
    pub fn get_point(&self, p: f64) -> Vector2 {
        self.point_at(p).get_point()
    }

    /// Scans the whole table for the sample nearest to `target`, then refines the estimate on
    /// the neighbouring segments. Used when there is no previous estimate to start from.
    pub fn find_nearest_global(&self, target: Vector2) -> PathPoint {
        let n = self.pvals.len();
        self.find_nearest_in_table(target, 0, n - 1)
    }

    /// Like `find_nearest_global` but only considers arc lengths in `p_lo..=p_hi`
    pub fn find_nearest_global_in_range(&self, target: Vector2, p_lo: f64, p_hi: f64) -> PathPoint {
        let n = self.pvals.len();
        let lo = self.segment_index(p_lo.max(0.0));
        let hi = (self.segment_index(p_hi.min(self.get_length())) + 1).min(n - 1);
        let mut ppt = self.find_nearest_in_table(target, lo, hi);
        if ppt.p < p_lo || ppt.p > p_hi {
            ppt.p = ppt.p.max(p_lo).min(p_hi);
            self.map_p_to_xy(&mut ppt);
        }
        ppt
    }

    fn find_nearest_in_table(&self, target: Vector2, lo: usize, hi: usize) -> PathPoint {
        let mut best = lo;
        let mut best_dist = f64::INFINITY;
        for i in lo..=hi {
            let d = self.sample(i).distance_squared(&target);
            if d < best_dist {
                best_dist = d;
                best = i;
            }
        }
        let best = self.canonical_index(best);
        let mut ppt = PathPoint::new(self.refine(best, target));
        self.map_p_to_xy(&mut ppt);
        ppt
    }

    /// Walks from the table index cached in `ppt` towards `target` and refines the result.
    ///
    /// This is cheap when the point has moved only a little since `ppt` was last updated, which
    /// is the normal case for connectors stepping through a simulation.
    pub fn find_nearest_local(&self, target: Vector2, ppt: &mut PathPoint) {
        let n = self.pvals.len();
        let mut k = self.canonical_index(ppt.idx.min(n - 1));
        let mut dist = self.sample(k).distance_squared(&target);

        for _ in 0..n {
            if let Some(j) = self.next_index(k) {
                let d = self.sample(j).distance_squared(&target);
                if d < dist {
                    k = j;
                    dist = d;
                    continue;
                }
            }
            if let Some(j) = self.prev_index(k) {
                let d = self.sample(j).distance_squared(&target);
                if d < dist {
                    k = j;
                    dist = d;
                    continue;
                }
            }
            break;
        }

        ppt.p = self.refine(k, target);
        self.map_p_to_xy(ppt);
    }

    /// The last sample of a closed loop is the same place as the first one
    fn canonical_index(&self, k: usize) -> usize {
        if self.closed_loop && k == self.pvals.len() - 1 {
            0
        } else {
            k
        }
    }

    fn next_index(&self, k: usize) -> Option<usize> {
        let n = self.pvals.len();
        if self.closed_loop {
            Some((k + 1) % (n - 1))
        } else if k + 1 < n {
            Some(k + 1)
        } else {
            None
        }
    }

    fn prev_index(&self, k: usize) -> Option<usize> {
        let n = self.pvals.len();
        if self.closed_loop {
            Some((k + n - 2) % (n - 1))
        } else if k > 0 {
            Some(k - 1)
        } else {
            None
        }
    }

    /// Projects `target` onto the segments on either side of sample `k` and returns the arc
    /// length of the closest projection. Open ends project onto their straight extensions.
    fn refine(&self, k: usize, target: Vector2) -> f64 {
        let n = self.pvals.len();
        let mut best_p = self.pvals[k];
        let mut best_dist = self.sample(k).distance_squared(&target);

        let mut consider = |a: usize, b: usize| {
            let pa = self.sample(a);
            let pb = self.sample(b);
            let seg = pb - pa;
            let len2 = seg.length_squared();
            if len2 < MIN_SEGMENT * MIN_SEGMENT {
                return;
            }
            let mut t = (target - pa).dot(&seg) / len2;
            if self.closed_loop || a != 0 {
                t = t.max(0.0);
            }
            if self.closed_loop || b != n - 1 {
                t = t.min(1.0);
            }
            let d = (pa + seg * t).distance_squared(&target);
            if d < best_dist {
                best_dist = d;
                best_p = self.pvals[a] + t * (self.pvals[b] - self.pvals[a]);
            }
        };

        if k + 1 < n {
            consider(k, k + 1);
        }
        if k > 0 {
            consider(k - 1, k);
        } else if self.closed_loop {
            consider(n - 2, n - 1);
        }

        self.mod_p(best_p)
    }
}
