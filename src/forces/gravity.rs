use crate::forces::{Force, ForceGenerator};
use crate::core::{BodyHandle, BodyStorage};
use crate::bodies::Polygon;
use crate::Result;
use std::any::Any;

/// Uniform gravity pulling in the negative y direction
#[derive(Debug, Clone)]
pub struct GravityForce {
    /// Magnitude of the gravitational acceleration
    gravity: f64,

    /// Height at which potential energy is zero
    zero_energy_level: f64,

    /// The bodies affected by this gravity; empty means every movable body
    affected_bodies: Vec<BodyHandle>,

    /// Whether the force generator is enabled
    enabled: bool,
}

impl GravityForce {
    /// Creates a new gravity force generator with the given acceleration
    pub fn new(gravity: f64) -> Self {
        Self {
            gravity,
            zero_energy_level: 0.0,
            affected_bodies: Vec::new(),
            enabled: true,
        }
    }

    /// Creates a new gravity force generator with Earth-like gravity
    pub fn new_earth_gravity() -> Self {
        Self::new(9.81)
    }

    /// Returns whether the force generator is enabled
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Sets whether the force generator is enabled
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Gets the current gravity acceleration
    pub fn get_gravity(&self) -> f64 {
        self.gravity
    }

    /// Sets the gravity acceleration
    pub fn set_gravity(&mut self, gravity: f64) {
        self.gravity = gravity;
    }

    /// Gets the height of zero potential energy
    pub fn get_zero_energy_level(&self) -> f64 {
        self.zero_energy_level
    }

    /// Sets the height of zero potential energy
    pub fn set_zero_energy_level(&mut self, level: f64) {
        self.zero_energy_level = level;
    }

    /// Restricts gravity to the listed bodies
    pub fn add_body(&mut self, body: BodyHandle) {
        if !self.affected_bodies.contains(&body) {
            self.affected_bodies.push(body);
        }
    }

    /// Removes a body from being affected by this gravity
    pub fn remove_body(&mut self, body: BodyHandle) {
        self.affected_bodies.retain(|&b| b != body);
    }

    fn pulls(&self, handle: BodyHandle, body: &Polygon) -> bool {
        !body.has_infinite_mass()
            && (self.affected_bodies.is_empty() || self.affected_bodies.contains(&handle))
    }
}

impl ForceGenerator for GravityForce {
    fn generator_type(&self) -> &'static str {
        "Gravity"
    }

    fn calculate_forces(&self, bodies: &BodyStorage<Polygon>) -> Result<Vec<Force>> {
        if !self.enabled {
            return Ok(Vec::new());
        }
        Ok(bodies
            .iter()
            .filter(|(handle, body)| self.pulls(*handle, body))
            .map(|(handle, body)| {
                // F = m * g
                let weight = crate::math::Vector2::new(0.0, -body.get_mass() * self.gravity);
                Force::new(handle, body.get_position(), weight)
            })
            .collect())
    }

    fn potential_energy(&self, bodies: &BodyStorage<Polygon>) -> f64 {
        if !self.enabled {
            return 0.0;
        }
        bodies
            .iter()
            .filter(|(handle, body)| self.pulls(*handle, body))
            .map(|(_, body)| body.get_mass() * self.gravity * (body.get_position().y - self.zero_energy_level))
            .sum()
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
