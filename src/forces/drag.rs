use crate::forces::{Force, ForceGenerator};
use crate::core::{BodyHandle, BodyStorage};
use crate::bodies::Polygon;
use crate::Result;
use std::any::Any;

/// Linear damping of translation and rotation
#[derive(Debug, Clone)]
pub struct DampingForce {
    /// Force per unit velocity
    linear_coefficient: f64,

    /// Torque per unit angular velocity
    angular_coefficient: f64,

    /// The bodies affected by this damping; empty means every movable body
    affected_bodies: Vec<BodyHandle>,

    /// Whether the force generator is enabled
    enabled: bool,
}

impl DampingForce {
    /// Creates a new damping force generator with the given coefficients
    pub fn new(linear_coefficient: f64, angular_coefficient: f64) -> Self {
        Self {
            linear_coefficient: linear_coefficient.max(0.0),
            angular_coefficient: angular_coefficient.max(0.0),
            affected_bodies: Vec::new(),
            enabled: true,
        }
    }

    /// Returns whether the force generator is enabled
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Sets whether the force generator is enabled
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Restricts damping to the listed bodies
    pub fn add_body(&mut self, body: BodyHandle) {
        if !self.affected_bodies.contains(&body) {
            self.affected_bodies.push(body);
        }
    }
}

impl ForceGenerator for DampingForce {
    fn generator_type(&self) -> &'static str {
        "Damping"
    }

    fn calculate_forces(&self, bodies: &BodyStorage<Polygon>) -> Result<Vec<Force>> {
        if !self.enabled {
            return Ok(Vec::new());
        }
        let mut forces = Vec::new();
        for (handle, body) in bodies.iter() {
            if body.has_infinite_mass() {
                continue;
            }
            if !self.affected_bodies.is_empty() && !self.affected_bodies.contains(&handle) {
                continue;
            }
            forces.push(Force::new(handle, body.get_position(), body.get_velocity() * -self.linear_coefficient));
            forces.push(Force::torque(handle, -self.angular_coefficient * body.get_angular_velocity()));
        }
        Ok(forces)
    }

    fn get_affected_bodies(&self) -> &[BodyHandle] {
        &self.affected_bodies
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
