use crate::constraints::connector::{check_identity, require_handle};
use crate::constraints::Connector;
use crate::core::{BodyHandle, BodyStorage, ConnectorHandle};
use crate::bodies::Polygon;
use crate::collision::{CollisionKind, RigidBodyCollision};
use crate::math::Vector2;
use crate::paths::{NumericalPath, PathPoint};
use crate::Result;

use std::any::Any;
use std::sync::Arc;
use tracing::debug;

/// A one-sided limit on how far along a path a body's attachment point may travel.
///
/// A record is made only on the step where the attachment point passes the limit, so a body
/// already beyond the limit is left alone and nothing is reported before the body has a saved
/// previous state to compare with.
#[derive(Debug, Clone)]
pub struct PathEndPoint {
    handle: Option<ConnectorHandle>,

    /// The body, then the scrim
    bodies: [BodyHandle; 2],

    /// The path, in world coordinates
    path: Arc<NumericalPath>,

    /// Attachment point in body coordinates
    attach_body: Vector2,

    /// Arc length of the limit
    limit: f64,

    /// True when the attachment may not go above `limit`, false when it may not go below
    upper: bool,

    /// Last known path position of the attachment point
    ppt: PathPoint,

    /// Whether `ppt` holds a usable estimate
    located: bool,
}

impl PathEndPoint {
    /// Creates a limit at arc length `limit` along `path`
    pub fn new(path: Arc<NumericalPath>, body: BodyHandle, attach_body: Vector2, limit: f64, upper: bool) -> Self {
        Self {
            handle: None,
            bodies: [body, BodyHandle::SCRIM],
            path,
            attach_body,
            limit,
            upper,
            ppt: PathPoint::default(),
            located: false,
        }
    }

    /// Returns the arc length of the limit
    pub fn get_limit(&self) -> f64 {
        self.limit
    }

    /// Returns true for an upper limit
    pub fn is_upper_limit(&self) -> bool {
        self.upper
    }

    /// Distance left before the limit; negative once it has been passed
    fn distance_to_limit(&self, p: f64) -> f64 {
        if self.upper {
            self.limit - p
        } else {
            p - self.limit
        }
    }

    fn locate(&self, target: Vector2, ppt: &mut PathPoint, located: bool) {
        if located {
            self.path.find_nearest_local(target, ppt);
        } else {
            *ppt = self.path.find_nearest_global(target);
        }
    }

    fn fill(&self, c: &mut RigidBodyCollision, body: &Polygon, scrim: &Polygon) {
        let p1 = body.body_to_world(self.attach_body);
        let tangent = self.ppt.get_tangent();
        let sign = if self.upper { -1.0 } else { 1.0 };
        let curvature = if self.ppt.radius.is_finite() && self.ppt.radius != 0.0 {
            1.0 / self.ppt.radius
        } else {
            0.0
        };
        // dT/dp = curvature * N
        let tangent_dp = self.ppt.get_normal() * curvature;

        c.impact1 = p1;
        c.impact2 = Some(self.path.get_point(self.limit));
        c.normal = tangent * sign;
        c.normal_slide = tangent_dp * (sign * tangent.dot(&body.get_velocity_at(p1)));
        c.distance = self.distance_to_limit(self.ppt.p);
        c.crossing = true;
        c.target_gap = 0.0;
        c.elasticity = body.get_elasticity();
        c.update_velocity(body, scrim);
    }
}

impl Connector for PathEndPoint {
    fn connector_type(&self) -> &'static str {
        "PathEndPoint"
    }

    fn get_bodies(&self) -> &[BodyHandle] {
        &self.bodies
    }

    fn get_handle(&self) -> Option<ConnectorHandle> {
        self.handle
    }

    fn set_handle(&mut self, handle: Option<ConnectorHandle>) {
        self.handle = handle;
    }

    fn is_bilateral(&self) -> bool {
        false
    }

    fn add_collision(
        &mut self,
        out: &mut Vec<RigidBodyCollision>,
        bodies: &BodyStorage<Polygon>,
        time: f64,
        _accuracy: f64,
    ) -> Result<()> {
        let handle = require_handle(self)?;
        let body = bodies.get_body(self.bodies[0])?;
        let scrim = bodies.get_body(self.bodies[1])?;
        let old_p1 = match body.old_body_to_world(self.attach_body) {
            Some(p) => p,
            None => return Ok(()),
        };

        // the previous position is searched from the cached point before the cache moves on
        let mut old_ppt = self.ppt;
        self.locate(old_p1, &mut old_ppt, self.located);
        let mut ppt = old_ppt;
        self.locate(body.body_to_world(self.attach_body), &mut ppt, true);
        self.ppt = ppt;
        self.located = true;

        let old_distance = self.distance_to_limit(old_ppt.p);
        let distance = self.distance_to_limit(ppt.p);
        if old_distance >= 0.0 && distance < 0.0 {
            let mut c = RigidBodyCollision::new(CollisionKind::Connector(handle), self.bodies[0], self.bodies[1], false, time);
            self.fill(&mut c, body, scrim);
            debug!(path = self.path.get_name(), limit = self.limit, distance, "path limit crossed");
            out.insert(0, c);
        }
        Ok(())
    }

    fn update_collision(&mut self, c: &mut RigidBodyCollision, bodies: &BodyStorage<Polygon>) -> Result<()> {
        check_identity(self, c)?;
        let body = bodies.get_body(self.bodies[0])?;
        let scrim = bodies.get_body(self.bodies[1])?;
        let mut ppt = self.ppt;
        self.locate(body.body_to_world(self.attach_body), &mut ppt, self.located);
        self.ppt = ppt;
        self.located = true;
        self.fill(c, body, scrim);
        Ok(())
    }

    fn align(&mut self, _bodies: &mut BodyStorage<Polygon>) -> Result<()> {
        Ok(())
    }

    fn reset(&mut self) {
        self.located = false;
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
