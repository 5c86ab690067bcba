use crate::constraints::connector::{check_identity, require_handle};
use crate::constraints::Connector;
use crate::core::{BodyHandle, BodyStorage, ConnectorHandle};
use crate::bodies::Polygon;
use crate::collision::{CollisionKind, RigidBodyCollision};
use crate::math::Vector2;
use crate::Result;
use std::any::Any;

/// Frame the joint normal is fixed in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NormalType {
    /// The normal never turns
    World,

    /// The normal turns with body2
    Body2,
}

/// A rigid link holding two attachment points together along one normal direction.
///
/// Two joints with perpendicular normals at the same points make a pin.
#[derive(Debug, Clone)]
pub struct Joint {
    handle: Option<ConnectorHandle>,

    /// body1 then body2
    bodies: [BodyHandle; 2],

    /// Attachment point on body1, in body1 coordinates
    attach1_body: Vector2,

    /// Attachment point on body2, in body2 coordinates
    attach2_body: Vector2,

    /// Unit normal, in world or body2 coordinates depending on `normal_type`
    normal: Vector2,

    /// Frame the normal is fixed in
    normal_type: NormalType,
}

impl Joint {
    /// Creates a joint; the normal is normalized
    pub fn new(
        body1: BodyHandle,
        attach1_body: Vector2,
        body2: BodyHandle,
        attach2_body: Vector2,
        normal: Vector2,
        normal_type: NormalType,
    ) -> Result<Self> {
        let normal = normal.try_normalize().ok_or_else(|| {
            crate::error::PhysicsError::InvalidParameter("Joint normal must not be zero".to_string())
        })?;
        if body1 == body2 {
            return Err(crate::error::PhysicsError::InvalidParameter(
                "A joint needs two different bodies".to_string(),
            ));
        }
        Ok(Self {
            handle: None,
            bodies: [body1, body2],
            attach1_body,
            attach2_body,
            normal,
            normal_type,
        })
    }

    /// Returns the attachment point on body1 in body coordinates
    pub fn get_attach1(&self) -> Vector2 {
        self.attach1_body
    }

    /// Returns the attachment point on body2 in body coordinates
    pub fn get_attach2(&self) -> Vector2 {
        self.attach2_body
    }

    /// Returns the frame the normal is fixed in
    pub fn get_normal_type(&self) -> NormalType {
        self.normal_type
    }

    /// Returns the normal in world coordinates
    pub fn get_world_normal(&self, body2: &Polygon) -> Vector2 {
        match self.normal_type {
            NormalType::World => self.normal,
            NormalType::Body2 => body2.rotate_body_to_world(self.normal),
        }
    }

    fn fill(&self, c: &mut RigidBodyCollision, body1: &Polygon, body2: &Polygon) {
        let p1 = body1.body_to_world(self.attach1_body);
        let p2 = body2.body_to_world(self.attach2_body);
        let normal = self.get_world_normal(body2);
        c.impact1 = p1;
        c.impact2 = Some(p2);
        c.normal = normal;
        c.distance = normal.dot(&(p1 - p2));
        c.normal_dt = match self.normal_type {
            NormalType::World => Vector2::zero(),
            NormalType::Body2 => normal.perp() * body2.get_angular_velocity(),
        };
        c.target_gap = 0.0;
        c.elasticity = 0.0;
        c.update_velocity(body1, body2);
    }

    /// Distance between the attachment points along the normal.
    ///
    /// Builds a throwaway record; meant for checks rather than the simulation loop.
    pub fn get_normal_distance(&self, bodies: &BodyStorage<Polygon>) -> Result<f64> {
        let body1 = bodies.get_body(self.bodies[0])?;
        let body2 = bodies.get_body(self.bodies[1])?;
        let handle = self.handle.unwrap_or(ConnectorHandle(u32::MAX));
        let mut c = RigidBodyCollision::new(CollisionKind::Connector(handle), self.bodies[0], self.bodies[1], true, 0.0);
        self.fill(&mut c, body1, body2);
        Ok(c.distance)
    }
}

impl Connector for Joint {
    fn connector_type(&self) -> &'static str {
        "Joint"
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
        let body1 = bodies.get_body(self.bodies[0])?;
        let body2 = bodies.get_body(self.bodies[1])?;
        self.fill(c, body1, body2);
        Ok(())
    }

    fn align(&mut self, bodies: &mut BodyStorage<Polygon>) -> Result<()> {
        let distance = self.get_normal_distance(bodies)?;
        let normal = self.get_world_normal(bodies.get_body(self.bodies[1])?);

        // move whichever body is free to move
        let body1 = bodies.get_body_mut(self.bodies[0])?;
        if !body1.has_infinite_mass() {
            body1.set_position(body1.get_position() - normal * distance);
            return Ok(());
        }
        let body2 = bodies.get_body_mut(self.bodies[1])?;
        if !body2.has_infinite_mass() {
            body2.set_position(body2.get_position() + normal * distance);
        }
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
