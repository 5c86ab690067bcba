use crate::bodies::Polygon;
use crate::collision::{
    apply_impulse, build_force_rhs, build_impulse_rhs, build_matrix, effective_elasticity,
    new_contact_solver, solve_with_perturbation, BodyAccel, CollisionDetector, CollisionFilter,
    ContactSolver, RigidBodyCollision,
};
use crate::constraints::{Connector, Joint};
use crate::core::{
    BodyEvent, BodyEventType, BodyHandle, BodyStorage, CollisionEvent, CollisionEventType,
    CollisionHandling, ConnectorHandle, ConnectorStorage, EnergyInfo, EventQueue, ExtraAccel,
    SimulationConfig, Storage,
};
use crate::error::PhysicsError;
use crate::forces::{ForceGenerator, ForceRegistry};
use crate::integration::OdeSystem;
use crate::math::Vector2;
use crate::Result;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, trace};

/// Number of state variables per body slot: x, vx, y, vy, angle, angular velocity
pub const VARS_PER_BODY: usize = 6;

/// The main physics world class that manages all physics objects and simulation.
///
/// The world is also the differential equation the integrators advance. Its state vector
/// holds six variables per body slot followed by the simulation time.
pub struct PhysicsWorld {
    /// All rigid bodies in the world; the scrim occupies the first slot
    bodies: BodyStorage<Polygon>,

    /// All connectors in the world
    connectors: ConnectorStorage<Box<dyn Connector>>,

    /// Forces acting between collisions
    forces: ForceRegistry,

    /// Configuration for the simulation
    config: SimulationConfig,

    /// Finds contacts between bodies
    detector: CollisionDetector,

    /// Solves for contact forces and impulses
    solver: Box<dyn ContactSolver>,

    /// Seeded source of tie-breaking choices
    rng: StdRng,

    /// Queue of physics events
    events: EventQueue,

    /// The total elapsed simulation time
    time: f64,
}

impl PhysicsWorld {
    /// Creates a new physics world with default settings
    pub fn new() -> Self {
        Self::build(SimulationConfig::default())
    }

    /// Creates a new physics world with the given configuration
    pub fn with_config(config: SimulationConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: SimulationConfig) -> Self {
        let mut world = Self {
            bodies: BodyStorage::new(),
            connectors: ConnectorStorage::new(),
            forces: ForceRegistry::new(),
            detector: CollisionDetector::from_config(&config),
            solver: new_contact_solver(config.solver, config.contact_order, config.gauss_seidel_iterations),
            rng: StdRng::seed_from_u64(config.random_seed),
            events: EventQueue::new(),
            time: 0.0,
            config,
        };
        world.add_scrim();
        world
    }

    fn add_scrim(&mut self) {
        let handle = self.bodies.add(Polygon::scrim());
        debug_assert_eq!(handle, BodyHandle::SCRIM);
        if let Some(scrim) = self.bodies.get_mut(handle) {
            scrim.set_handle(Some(handle));
        }
    }

    /// Returns the current simulation time
    pub fn get_time(&self) -> f64 {
        self.time
    }

    /// Returns a reference to the simulation configuration
    pub fn get_config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Returns the distance below which bodies are considered touching
    pub fn get_distance_tol(&self) -> f64 {
        self.config.distance_tol
    }

    /// Sets how simultaneous collisions are resolved
    pub fn set_collision_handling(&mut self, policy: CollisionHandling) {
        self.config.collision_handling = policy;
    }

    /// Sets the drift correction applied through contact forces
    pub fn set_extra_accel(&mut self, policy: ExtraAccel) {
        self.config.extra_accel = policy;
    }

    /// Sets whether small joint velocities are left to contact forces
    pub fn set_joint_small_impacts(&mut self, value: bool) {
        self.config.joint_small_impacts = value;
    }

    /// Sets the elasticity of every body
    pub fn set_elasticity(&mut self, elasticity: f64) -> Result<()> {
        for (handle, body) in self.bodies.iter_mut() {
            if handle != BodyHandle::SCRIM {
                body.set_elasticity(elasticity)?;
            }
        }
        Ok(())
    }

    /// Replaces the filter deciding which pairs of bodies may collide
    pub fn set_collision_filter(&mut self, filter: Box<dyn CollisionFilter>) {
        self.detector.set_filter(filter);
    }

    /// Adds a finished rigid body to the world and returns its handle
    pub fn add_body(&mut self, mut body: Polygon) -> Result<BodyHandle> {
        if !body.is_finished() {
            return Err(PhysicsError::InvalidParameter(format!(
                "Body '{}' must be finished before it is added", body.get_name()
            )));
        }
        body.set_handle(None);
        let handle = self.bodies.add(body);
        self.bodies.get_body_mut(handle)?.set_handle(Some(handle));

        self.events.add_body_event(BodyEvent {
            event_type: BodyEventType::Added,
            body: handle,
        });
        debug!(body = handle.index(), "added body");

        Ok(handle)
    }

    /// Removes a rigid body from the world along with its connectors and forces
    pub fn remove_body(&mut self, handle: BodyHandle) -> Result<Polygon> {
        if handle == BodyHandle::SCRIM {
            return Err(PhysicsError::InvalidParameter("The scrim cannot be removed".to_string()));
        }
        self.bodies.get_body(handle)?;

        let connector_handles: Vec<ConnectorHandle> = self.connectors
            .iter()
            .filter(|(_, connector)| connector.involves_body(handle))
            .map(|(c_handle, _)| c_handle)
            .collect();
        for c_handle in connector_handles {
            self.remove_connector(c_handle)?;
        }
        self.forces.remove_generators_for_body(handle);
        for (_, other) in self.bodies.iter_mut() {
            other.remove_non_collide_body(handle);
        }

        self.events.add_body_event(BodyEvent {
            event_type: BodyEventType::Removed,
            body: handle,
        });

        let mut body = self.bodies
            .remove(handle)
            .ok_or_else(|| PhysicsError::ResourceNotFound(format!("Body with handle {:?} not found", handle)))?;
        body.set_handle(None);
        Ok(body)
    }

    /// Gets a reference to a rigid body by its handle
    pub fn get_body(&self, handle: BodyHandle) -> Result<&Polygon> {
        self.bodies.get_body(handle)
    }

    /// Gets a mutable reference to a rigid body by its handle
    pub fn get_body_mut(&mut self, handle: BodyHandle) -> Result<&mut Polygon> {
        self.bodies.get_body_mut(handle)
    }

    /// Returns every body, the scrim included
    pub fn get_bodies(&self) -> &BodyStorage<Polygon> {
        &self.bodies
    }

    /// Returns the number of bodies, not counting the scrim
    pub fn body_count(&self) -> usize {
        self.bodies.len().saturating_sub(1)
    }

    /// Stops two bodies from colliding with each other
    pub fn add_non_collide(&mut self, body1: BodyHandle, body2: BodyHandle) -> Result<()> {
        self.bodies.get_body(body2)?;
        self.bodies.get_body_mut(body1)?.add_non_collide_body(body2);
        self.bodies.get_body_mut(body2)?.add_non_collide_body(body1);
        Ok(())
    }

    /// Adds a connector to the world and returns its handle
    pub fn add_connector(&mut self, mut connector: Box<dyn Connector>) -> Result<ConnectorHandle> {
        for &body in connector.get_bodies() {
            self.bodies.get_body(body)?;
        }
        connector.set_handle(None);
        let handle = self.connectors.add(connector);
        self.connectors.get_connector_mut(handle)?.set_handle(Some(handle));
        debug!(connector = handle.index(), "added connector");
        Ok(handle)
    }

    /// Adds a joint to the world and returns its handle
    pub fn add_joint(&mut self, joint: Joint) -> Result<ConnectorHandle> {
        self.add_connector(Box::new(joint))
    }

    /// Removes a connector from the world
    pub fn remove_connector(&mut self, handle: ConnectorHandle) -> Result<Box<dyn Connector>> {
        let mut connector = self.connectors
            .remove(handle)
            .ok_or_else(|| PhysicsError::ResourceNotFound(format!("Connector with handle {:?} not found", handle)))?;
        connector.set_handle(None);
        Ok(connector)
    }

    /// Gets a connector by its handle
    pub fn get_connector(&self, handle: ConnectorHandle) -> Result<&dyn Connector> {
        self.connectors.get_connector(handle).map(|c| &**c)
    }

    /// Gets a connector by its handle as its concrete type
    pub fn get_connector_as<T: Connector>(&self, handle: ConnectorHandle) -> Result<&T> {
        self.get_connector(handle)?
            .as_any()
            .downcast_ref::<T>()
            .ok_or_else(|| PhysicsError::InvalidParameter(format!(
                "Connector {:?} is not a {}", handle, std::any::type_name::<T>()
            )))
    }

    /// Returns the number of connectors in the world
    pub fn connector_count(&self) -> usize {
        self.connectors.len()
    }

    /// Moves the bodies of one connector so that it is met exactly
    pub fn align_connector(&mut self, handle: ConnectorHandle) -> Result<()> {
        self.connectors.get_connector_mut(handle)?.align(&mut self.bodies)
    }

    /// Aligns every connector in the order they were added
    pub fn align_connectors(&mut self) -> Result<()> {
        for (_, connector) in self.connectors.iter_mut() {
            connector.align(&mut self.bodies)?;
        }
        Ok(())
    }

    /// Adds a force generator and returns its index
    pub fn add_force_generator(&mut self, generator: Box<dyn ForceGenerator>) -> usize {
        self.forces.add_generator(generator)
    }

    /// Returns the force generators
    pub fn get_forces(&self) -> &ForceRegistry {
        &self.forces
    }

    /// Returns the force generators for modification
    pub fn get_forces_mut(&mut self) -> &mut ForceRegistry {
        &mut self.forces
    }

    /// Returns a reference to the event queue
    pub fn get_events(&self) -> &EventQueue {
        &self.events
    }

    /// Returns a mutable reference to the event queue
    pub fn get_events_mut(&mut self) -> &mut EventQueue {
        &mut self.events
    }

    /// Returns the kinetic and potential energy of the world
    pub fn get_energy_info(&self) -> EnergyInfo {
        let (translational, rotational) = self.bodies
            .iter()
            .fold((0.0, 0.0), |(t, r), (_, body)| {
                (t + body.get_translational_energy(), r + body.get_rotational_energy())
            });
        EnergyInfo::new(translational, rotational, self.forces.potential_energy(&self.bodies))
    }

    /// Records every body's state so that detection can tell what crossed what
    pub fn save_old_copies(&mut self) {
        for (_, body) in self.bodies.iter_mut() {
            body.save_old_copy();
        }
    }

    /// Forgets every body's saved state
    pub fn erase_old_copies(&mut self) {
        for (_, body) in self.bodies.iter_mut() {
            body.erase_old_copy();
        }
    }

    /// Clears the world of all bodies, connectors and forces
    pub fn clear(&mut self) {
        self.bodies.clear();
        self.connectors.clear();
        self.forces.clear();
        self.events.clear();
        self.time = 0.0;
        self.rng = StdRng::seed_from_u64(self.config.random_seed);
        self.add_scrim();
    }

    /// Sets the state to `vars` and adds every collision, contact and connector record found
    /// there to `out`
    pub fn find_collisions(&mut self, out: &mut Vec<RigidBodyCollision>, vars: &[f64], accuracy: f64) -> Result<()> {
        self.set_vars(vars)?;
        self.collect_collisions(out, accuracy)
    }

    fn collect_collisions(&mut self, out: &mut Vec<RigidBodyCollision>, accuracy: f64) -> Result<()> {
        self.detector.detect(&self.bodies, self.time, &self.config, out);
        for (_, connector) in self.connectors.iter_mut() {
            connector.add_collision(out, &self.bodies, self.time, accuracy)?;
        }
        Ok(())
    }

    /// Applies impulses until no record in `collisions` needs handling, following the
    /// configured collision handling policy. Returns the number of impulse rounds.
    pub fn handle_collisions(&mut self, collisions: &mut [RigidBodyCollision]) -> Result<u32> {
        let policy = self.config.collision_handling;
        let mut rounds = 0;
        loop {
            let needing: Vec<usize> = (0..collisions.len())
                .filter(|&i| collisions[i].needs_handling(&self.config))
                .collect();
            if needing.is_empty() {
                break;
            }
            if rounds >= self.config.max_impulse_rounds {
                return Err(PhysicsError::UnresolvedCollision(format!(
                    "{} collisions still approaching after {} impulse rounds at time {}",
                    needing.len(), rounds, self.time
                )));
            }
            rounds += 1;

            let focus: Vec<usize> = if policy.is_serial() {
                let pick = needing[self.rng.gen_range(0..needing.len())];
                if policy.is_grouped() {
                    let (a, b) = (collisions[pick].body1, collisions[pick].body2);
                    needing
                        .iter()
                        .copied()
                        .filter(|&i| {
                            let c = &collisions[i];
                            (c.body1 == a && c.body2 == b) || (c.body1 == b && c.body2 == a)
                        })
                        .collect()
                } else {
                    vec![pick]
                }
            } else {
                needing
            };
            debug!(round = rounds, focus = focus.len(), ?policy, "handling collisions");
            self.apply_impulses(collisions, &focus)?;
        }

        if rounds > 0 && policy.has_last_pass() {
            // inelastic pass over everything touching to clear leftover approach speeds
            self.apply_impulses(collisions, &[])?;
            rounds += 1;
        }
        Ok(rounds)
    }

    /// Solves one impulse round. Records in `bounce` rebound with their elasticity; joints
    /// and touching contacts take part so that the impulses do not push through them.
    fn apply_impulses(&mut self, collisions: &mut [RigidBodyCollision], bounce: &[usize]) -> Result<()> {
        let distance_tol = self.config.distance_tol;
        let set: Vec<usize> = (0..collisions.len())
            .filter(|&i| {
                let c = &collisions[i];
                bounce.contains(&i) || c.joint || c.is_touching(distance_tol)
            })
            .collect();
        if set.is_empty() {
            return Ok(());
        }

        let mut subset: Vec<RigidBodyCollision> = Vec::with_capacity(set.len());
        let mut bounces = Vec::with_capacity(set.len());
        for &i in &set {
            let mut c = collisions[i].clone();
            let bounces_here = bounce.contains(&i);
            if bounces_here {
                c.elasticity = effective_elasticity(&c, &self.config);
            }
            subset.push(c);
            bounces.push(bounces_here);
        }
        let joint: Vec<bool> = subset.iter().map(|c| c.joint).collect();

        let a = build_matrix(&subset, &self.bodies)?;
        let b = build_impulse_rhs(&subset, &bounces);
        let impulses = solve_with_perturbation(&mut *self.solver, &a, &b, &joint, &mut self.rng)?;

        for (k, &i) in set.iter().enumerate() {
            let j = impulses[k];
            if j == 0.0 {
                continue;
            }
            apply_impulse(&subset[k], j, &mut self.bodies)?;
            collisions[i].impulse += j;
            if bounces[k] {
                let c = &subset[k];
                self.events.add_collision_event(CollisionEvent {
                    event_type: if c.crossing { CollisionEventType::LimitReached } else { CollisionEventType::Impulse },
                    body_a: c.body1,
                    body_b: c.body2,
                    impact: c.impact1,
                    normal: c.normal,
                    impulse: j,
                    time: self.time,
                });
                trace!(body1 = c.body1.index(), body2 = c.body2.index(), impulse = j, "impulse applied");
            }
        }

        for c in collisions.iter_mut() {
            let body1 = self.bodies.get_body(c.body1)?;
            let body2 = self.bodies.get_body(c.body2)?;
            c.update_velocity(body1, body2);
        }
        Ok(())
    }

    /// Accelerations caused by the force generators alone, indexed by body slot
    fn body_accelerations(&self) -> Result<Vec<BodyAccel>> {
        let mut accels = vec![BodyAccel::default(); self.bodies.slot_count()];
        for force in self.forces.calculate_forces(&self.bodies)? {
            let body = self.bodies.get_body(force.body)?;
            if body.has_infinite_mass() {
                continue;
            }
            let r = force.location - body.get_position();
            let accel = &mut accels[force.body.index()];
            accel.linear += force.direction * body.get_inverse_mass();
            accel.angular += (r.cross(&force.direction) + force.torque) * body.get_inverse_moment();
        }
        Ok(accels)
    }

    /// Solves for the contact forces of `contacts` and adds their accelerations to `accels`
    fn apply_contact_forces(
        &mut self,
        contacts: &mut [RigidBodyCollision],
        accels: &mut [BodyAccel],
        time_step: f64,
    ) -> Result<()> {
        let a = build_matrix(contacts, &self.bodies)?;
        let b = build_force_rhs(contacts, &self.bodies, accels, &self.config, time_step)?;
        let joint: Vec<bool> = contacts.iter().map(|c| c.joint).collect();
        let forces = solve_with_perturbation(&mut *self.solver, &a, &b, &joint, &mut self.rng)?;

        for (c, &force) in contacts.iter_mut().zip(forces.iter()) {
            c.force = force;
            for (handle, sign, impact) in [(c.body1, 1.0, c.impact1), (c.body2, -1.0, c.get_impact2())] {
                let body = self.bodies.get_body(handle)?;
                if body.has_infinite_mass() {
                    continue;
                }
                let push = c.normal * (sign * force);
                let r = impact - body.get_position();
                if let Some(accel) = accels.get_mut(handle.index()) {
                    accel.linear += push * body.get_inverse_mass();
                    accel.angular += r.cross(&push) * body.get_inverse_moment();
                }
            }
        }
        Ok(())
    }

    fn var_count(&self) -> usize {
        VARS_PER_BODY * self.bodies.slot_count() + 1
    }
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl OdeSystem for PhysicsWorld {
    fn get_vars(&self) -> Vec<f64> {
        let mut vars = vec![0.0; self.var_count()];
        for (handle, body) in self.bodies.iter() {
            let i = VARS_PER_BODY * handle.index();
            let position = body.get_position();
            let velocity = body.get_velocity();
            vars[i] = position.x;
            vars[i + 1] = velocity.x;
            vars[i + 2] = position.y;
            vars[i + 3] = velocity.y;
            vars[i + 4] = body.get_angle();
            vars[i + 5] = body.get_angular_velocity();
        }
        let last = vars.len() - 1;
        vars[last] = self.time;
        vars
    }

    fn set_vars(&mut self, vars: &[f64]) -> Result<()> {
        if vars.len() != self.var_count() {
            return Err(PhysicsError::InvalidParameter(format!(
                "Expected {} state variables, got {}", self.var_count(), vars.len()
            )));
        }
        if let Some(i) = vars.iter().position(|v| !v.is_finite()) {
            return Err(PhysicsError::SimulationError(format!(
                "State variable {} is not finite at time {}", i, self.time
            )));
        }
        for (handle, body) in self.bodies.iter_mut() {
            let i = VARS_PER_BODY * handle.index();
            body.set_position_angle(Vector2::new(vars[i], vars[i + 2]), vars[i + 4]);
            body.set_velocity(Vector2::new(vars[i + 1], vars[i + 3]));
            body.set_angular_velocity(vars[i + 5]);
        }
        self.time = vars[vars.len() - 1];
        Ok(())
    }

    fn evaluate(&mut self, vars: &[f64], change: &mut [f64], time_step: f64) -> Result<()> {
        if change.len() != vars.len() {
            return Err(PhysicsError::InvalidParameter(format!(
                "Change vector has {} entries for {} variables", change.len(), vars.len()
            )));
        }
        self.set_vars(vars)?;
        change.iter_mut().for_each(|c| *c = 0.0);

        let mut accels = self.body_accelerations()?;

        let accuracy = self.config.get_accuracy();
        let mut contacts = Vec::new();
        self.collect_collisions(&mut contacts, accuracy)?;
        let (distance_tol, velocity_tol) = (self.config.distance_tol, self.config.velocity_tol);
        contacts.retain(|c| c.is_contact(distance_tol, velocity_tol));
        if !contacts.is_empty() {
            self.apply_contact_forces(&mut contacts, &mut accels, time_step)?;
        }
        trace!(time = self.time, time_step, contacts = contacts.len(), "evaluated");

        for (handle, body) in self.bodies.iter() {
            if body.has_infinite_mass() {
                continue;
            }
            let i = VARS_PER_BODY * handle.index();
            let velocity = body.get_velocity();
            let accel = accels[handle.index()];
            change[i] = velocity.x;
            change[i + 1] = accel.linear.x;
            change[i + 2] = velocity.y;
            change[i + 3] = accel.linear.y;
            change[i + 4] = body.get_angular_velocity();
            change[i + 5] = accel.angular;
        }
        let last = change.len() - 1;
        change[last] = 1.0;
        Ok(())
    }
}
