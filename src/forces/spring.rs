use crate::forces::{Force, ForceGenerator};
use crate::core::{BodyHandle, BodyStorage};
use crate::bodies::Polygon;
use crate::error::PhysicsError;
use crate::math::Vector2;
use crate::Result;
use std::any::Any;

/// A spring between points on two bodies; attach to the scrim for a fixed world point
#[derive(Debug, Clone)]
pub struct SpringForce {
    /// The bodies connected by the spring
    bodies: [BodyHandle; 2],

    /// Attachment point on the first body (in body coordinates)
    attach1_body: Vector2,

    /// Attachment point on the second body (in body coordinates)
    attach2_body: Vector2,

    /// The spring rest length
    rest_length: f64,

    /// The spring stiffness coefficient
    stiffness: f64,

    /// The spring damping coefficient
    damping: f64,
}

impl SpringForce {
    /// Creates a new spring between two bodies
    pub fn new(
        body1: BodyHandle,
        attach1_body: Vector2,
        body2: BodyHandle,
        attach2_body: Vector2,
        rest_length: f64,
        stiffness: f64,
    ) -> Result<Self> {
        if rest_length < 0.0 || stiffness < 0.0 {
            return Err(PhysicsError::InvalidParameter(format!(
                "Spring needs non-negative rest length and stiffness, got {} and {}", rest_length, stiffness
            )));
        }
        Ok(Self {
            bodies: [body1, body2],
            attach1_body,
            attach2_body,
            rest_length,
            stiffness,
            damping: 0.0,
        })
    }

    /// Sets the damping coefficient
    pub fn with_damping(mut self, damping: f64) -> Self {
        self.damping = damping.max(0.0);
        self
    }

    /// Gets the rest length
    pub fn get_rest_length(&self) -> f64 {
        self.rest_length
    }

    /// Gets the stiffness
    pub fn get_stiffness(&self) -> f64 {
        self.stiffness
    }

    /// Current length of the spring
    pub fn get_length(&self, bodies: &BodyStorage<Polygon>) -> Result<f64> {
        let (p1, p2) = self.end_points(bodies)?;
        Ok(p1.distance(&p2))
    }

    fn end_points(&self, bodies: &BodyStorage<Polygon>) -> Result<(Vector2, Vector2)> {
        let body1 = bodies.get_body(self.bodies[0])?;
        let body2 = bodies.get_body(self.bodies[1])?;
        Ok((body1.body_to_world(self.attach1_body), body2.body_to_world(self.attach2_body)))
    }
}

impl ForceGenerator for SpringForce {
    fn generator_type(&self) -> &'static str {
        "Spring"
    }

    fn calculate_forces(&self, bodies: &BodyStorage<Polygon>) -> Result<Vec<Force>> {
        let body1 = bodies.get_body(self.bodies[0])?;
        let body2 = bodies.get_body(self.bodies[1])?;
        let p1 = body1.body_to_world(self.attach1_body);
        let p2 = body2.body_to_world(self.attach2_body);
        let delta = p1 - p2;
        let length = delta.length();
        let direction = match delta.try_normalize() {
            Some(u) => u,
            None => return Ok(Vec::new()),
        };

        // F = -k (L - L0) - c v along the spring
        let stretch = length - self.rest_length;
        let relative_speed = direction.dot(&(body1.get_velocity_at(p1) - body2.get_velocity_at(p2)));
        let f = direction * (-self.stiffness * stretch - self.damping * relative_speed);

        Ok(vec![
            Force::new(self.bodies[0], p1, f),
            Force::new(self.bodies[1], p2, -f),
        ])
    }

    fn potential_energy(&self, bodies: &BodyStorage<Polygon>) -> f64 {
        match self.get_length(bodies) {
            Ok(length) => {
                let stretch = length - self.rest_length;
                0.5 * self.stiffness * stretch * stretch
            }
            Err(_) => 0.0,
        }
    }

    fn get_affected_bodies(&self) -> &[BodyHandle] {
        &self.bodies
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
