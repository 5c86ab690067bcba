use crate::core::{BodyHandle, BodyStorage};
use crate::bodies::Polygon;
use crate::math::Vector2;
use crate::Result;
use std::any::Any;

/// A force acting on one body at one instant
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Force {
    /// The body the force acts on
    pub body: BodyHandle,

    /// World point where the force is applied
    pub location: Vector2,

    /// The force vector in world coordinates
    pub direction: Vector2,

    /// Extra pure torque
    pub torque: f64,
}

impl Force {
    /// Creates a force with no extra torque
    pub fn new(body: BodyHandle, location: Vector2, direction: Vector2) -> Self {
        Self {
            body,
            location,
            direction,
            torque: 0.0,
        }
    }

    /// Creates a pure torque
    pub fn torque(body: BodyHandle, torque: f64) -> Self {
        Self {
            body,
            location: Vector2::zero(),
            direction: Vector2::zero(),
            torque,
        }
    }
}

/// Base trait for force generators that act between collisions
pub trait ForceGenerator: Send + Sync + std::fmt::Debug + 'static {
    /// Returns the type name of the force generator
    fn generator_type(&self) -> &'static str;

    /// Computes the forces for the bodies' current state
    fn calculate_forces(&self, bodies: &BodyStorage<Polygon>) -> Result<Vec<Force>>;

    /// Potential energy stored by this generator
    fn potential_energy(&self, _bodies: &BodyStorage<Polygon>) -> f64 {
        0.0
    }

    /// Returns the bodies affected by this force generator
    fn get_affected_bodies(&self) -> &[BodyHandle];

    /// Returns true if the force generator affects the given body
    fn affects_body(&self, body: BodyHandle) -> bool {
        self.get_affected_bodies().contains(&body)
    }

    /// Returns a dynamic reference to any for downcasting
    fn as_any(&self) -> &dyn Any;

    /// Returns a dynamic mutable reference to any for downcasting
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// A thruster: a constant force fixed to a point of a body that turns with the body
#[derive(Debug, Clone)]
pub struct ConstantForceGenerator {
    /// The force in body coordinates
    force: Vector2,

    /// The point to apply the force at, in body coordinates
    location_body: Vector2,

    /// Whether the force is enabled
    enabled: bool,

    /// The body to apply the force to
    affected_bodies: [BodyHandle; 1],
}

impl ConstantForceGenerator {
    /// Creates a thruster at `location_body` pushing along `force` (both in body coordinates)
    pub fn new(body: BodyHandle, location_body: Vector2, force: Vector2) -> Self {
        Self {
            force,
            location_body,
            enabled: true,
            affected_bodies: [body],
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

    /// Gets the force in body coordinates
    pub fn get_force(&self) -> Vector2 {
        self.force
    }

    /// Sets the force in body coordinates
    pub fn set_force(&mut self, force: Vector2) {
        self.force = force;
    }
}

impl ForceGenerator for ConstantForceGenerator {
    fn generator_type(&self) -> &'static str {
        "ConstantForce"
    }

    fn calculate_forces(&self, bodies: &BodyStorage<Polygon>) -> Result<Vec<Force>> {
        if !self.enabled {
            return Ok(Vec::new());
        }
        let handle = self.affected_bodies[0];
        let body = bodies.get_body(handle)?;
        Ok(vec![Force::new(
            handle,
            body.body_to_world(self.location_body),
            body.rotate_body_to_world(self.force),
        )])
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

/// A force generator registry that manages multiple force generators
#[derive(Debug, Default)]
pub struct ForceRegistry {
    /// The list of force generators
    generators: Vec<Box<dyn ForceGenerator>>,
}

impl ForceRegistry {
    /// Creates a new empty force registry
    pub fn new() -> Self {
        Self {
            generators: Vec::new(),
        }
    }

    /// Adds a force generator to the registry and returns its index
    pub fn add_generator(&mut self, generator: Box<dyn ForceGenerator>) -> usize {
        self.generators.push(generator);
        self.generators.len() - 1
    }

    /// Removes a force generator from the registry
    pub fn remove_generator(&mut self, index: usize) -> Option<Box<dyn ForceGenerator>> {
        if index < self.generators.len() {
            Some(self.generators.remove(index))
        } else {
            None
        }
    }

    /// Returns the number of generators in the registry
    pub fn len(&self) -> usize {
        self.generators.len()
    }

    /// Returns whether the registry is empty
    pub fn is_empty(&self) -> bool {
        self.generators.is_empty()
    }

    /// Returns a generator by index
    pub fn get(&self, index: usize) -> Option<&dyn ForceGenerator> {
        self.generators.get(index).map(|g| g.as_ref())
    }

    /// Returns a mutable generator by index
    pub fn get_mut(&mut self, index: usize) -> Option<&mut dyn ForceGenerator> {
        self.generators.get_mut(index).map(|g| g.as_mut())
    }

    /// Collects the forces of every generator
    pub fn calculate_forces(&self, bodies: &BodyStorage<Polygon>) -> Result<Vec<Force>> {
        let mut forces = Vec::new();
        for generator in &self.generators {
            forces.extend(generator.calculate_forces(bodies)?);
        }
        Ok(forces)
    }

    /// Sums the potential energy of every generator
    pub fn potential_energy(&self, bodies: &BodyStorage<Polygon>) -> f64 {
        self.generators.iter().map(|g| g.potential_energy(bodies)).sum()
    }

    /// Clears all force generators
    pub fn clear(&mut self) {
        self.generators.clear();
    }

    /// Removes all force generators affecting a specific body
    pub fn remove_generators_for_body(&mut self, body: BodyHandle) {
        self.generators.retain(|generator| !generator.affects_body(body));
    }
}
