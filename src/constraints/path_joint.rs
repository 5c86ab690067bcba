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
use tracing::trace;

/// Tangential offset beyond which the attachment point counts as off the end of an open path
const OFF_END_TOLERANCE: f64 = 1.0e-4;

/// Holds an attachment point of a body on a path fixed in the world.
///
/// The path point nearest the attachment is cached between steps. The first search scans the
/// whole path; later searches walk from the cached point.
#[derive(Debug, Clone)]
pub struct PathJoint {
    handle: Option<ConnectorHandle>,

    /// The body, then the scrim
    bodies: [BodyHandle; 2],

    /// The path, in world coordinates
    path: Arc<NumericalPath>,

    /// Attachment point in body coordinates
    attach_body: Vector2,

    /// Last known path position of the attachment point
    ppt: PathPoint,

    /// Whether `ppt` holds a usable estimate
    located: bool,
}

impl PathJoint {
    /// Creates a joint holding `attach_body` on `body` to `path`
    pub fn new(path: Arc<NumericalPath>, body: BodyHandle, attach_body: Vector2) -> Self {
        Self {
            handle: None,
            bodies: [body, BodyHandle::SCRIM],
            path,
            attach_body,
            ppt: PathPoint::default(),
            located: false,
        }
    }

    /// Returns the path
    pub fn get_path(&self) -> &Arc<NumericalPath> {
        &self.path
    }

    /// Returns the attachment point in body coordinates
    pub fn get_attach(&self) -> Vector2 {
        self.attach_body
    }

    /// Returns the cached path position
    pub fn get_path_point(&self) -> &PathPoint {
        &self.ppt
    }

    fn locate(&mut self, target: Vector2) {
        if self.located {
            self.path.find_nearest_local(target, &mut self.ppt);
        } else {
            self.ppt = self.path.find_nearest_global(target);
            self.located = true;
            trace!(path = self.path.get_name(), p = self.ppt.p, "path joint located");
        }
    }

    /// True when `target` lies beyond an end of an open path
    fn off_end(&self, target: Vector2) -> bool {
        if self.path.is_closed_loop() {
            return false;
        }
        if self.ppt.p < self.path.get_start_p() || self.ppt.p > self.path.get_finish_p() {
            return true;
        }
        self.ppt.get_tangent().dot(&(target - self.ppt.get_point())).abs() > OFF_END_TOLERANCE
    }
}

impl Connector for PathJoint {
    fn connector_type(&self) -> &'static str {
        "PathJoint"
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
        true
    }

    fn add_collision(
        &mut self,
        out: &mut Vec<RigidBodyCollision>,
        bodies: &BodyStorage<Polygon>,
        time: f64,
        _accuracy: f64,
    ) -> Result<()> {
        let handle = require_handle(self)?;
        let mut c = RigidBodyCollision::new(CollisionKind::Connector(handle), self.bodies[0], self.bodies[1], true, time);
        self.update_collision(&mut c, bodies)?;
        out.insert(0, c);
        Ok(())
    }

    fn update_collision(&mut self, c: &mut RigidBodyCollision, bodies: &BodyStorage<Polygon>) -> Result<()> {
        check_identity(self, c)?;
        let body = bodies.get_body(self.bodies[0])?;
        let scrim = bodies.get_body(self.bodies[1])?;

        let p1 = body.body_to_world(self.attach_body);
        self.locate(p1);
        let point = self.ppt.get_point();
        let normal = self.ppt.get_normal();
        let tangent = self.ppt.get_tangent();
        let v1 = body.get_velocity_at(p1);

        c.impact1 = p1;
        c.impact2 = Some(point);
        c.normal = normal;
        c.distance = normal.dot(&(p1 - point));
        // past an open end the path carries on as a straight line
        c.normal_slide = if self.off_end(p1) {
            Vector2::zero()
        } else {
            self.ppt.get_normal_dp() * tangent.dot(&v1)
        };
        c.target_gap = 0.0;
        c.elasticity = 0.0;
        c.update_velocity(body, scrim);
        Ok(())
    }

    fn align(&mut self, bodies: &mut BodyStorage<Polygon>) -> Result<()> {
        let body = bodies.get_body_mut(self.bodies[0])?;
        if body.has_infinite_mass() {
            return Ok(());
        }
        let p1 = body.body_to_world(self.attach_body);
        self.ppt = self.path.find_nearest_global(p1);
        self.located = true;
        let offset = self.ppt.get_point() - p1;
        body.set_position(body.get_position() + offset);
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
