use crate::collision::RigidBodyCollision;
use crate::core::{PhysicsWorld, SimulationConfig};
use crate::error::PhysicsError;
use crate::integration::{new_integrator, Integrator, OdeSystem};
use crate::Result;

use tracing::{debug, trace};

/// Where the scheduler is within an advance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvanceState {
    /// Integrating over a trial interval
    Advancing,

    /// The last trial interval ended in penetration and is being bisected
    CollisionImminent,

    /// Impulses are being applied
    Resolving,

    /// No collision needs handling and some contacts are resting
    SettledInContact,
}

/// Counters kept across calls to `advance`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AdvanceStats {
    /// Trial intervals integrated
    pub trial_steps: u64,

    /// Trial intervals thrown away because they ended in penetration
    pub bisections: u64,

    /// Impulse rounds applied
    pub impulse_rounds: u64,

    /// Collisions that needed an impulse
    pub collisions_handled: u64,
}

/// Advances a world through time, backing up and bisecting whenever a trial interval ends
/// with bodies overlapping, so that every collision is resolved at the moment of impact.
pub struct CollisionAdvance {
    /// The world being advanced
    world: PhysicsWorld,

    /// Integrates the smooth motion between collisions
    integrator: Box<dyn Integrator>,

    /// Current scheduler state
    state: AdvanceState,

    /// Counters
    stats: AdvanceStats,

    /// Scratch list reused by every detection pass
    collisions: Vec<RigidBodyCollision>,
}

impl CollisionAdvance {
    /// Creates a scheduler using the integrator named in the world's configuration
    pub fn new(world: PhysicsWorld) -> Self {
        let integrator = new_integrator(world.get_config().integrator);
        Self::with_integrator(world, integrator)
    }

    /// Creates a scheduler with a specific integrator
    pub fn with_integrator(world: PhysicsWorld, integrator: Box<dyn Integrator>) -> Self {
        Self {
            world,
            integrator,
            state: AdvanceState::Advancing,
            stats: AdvanceStats::default(),
            collisions: Vec::new(),
        }
    }

    /// Returns the world
    pub fn world(&self) -> &PhysicsWorld {
        &self.world
    }

    /// Returns the world for modification
    pub fn world_mut(&mut self) -> &mut PhysicsWorld {
        &mut self.world
    }

    /// Gives up the scheduler and returns the world
    pub fn into_world(self) -> PhysicsWorld {
        self.world
    }

    /// Returns the state the last advance ended in
    pub fn get_state(&self) -> AdvanceState {
        self.state
    }

    /// Returns the counters
    pub fn get_stats(&self) -> AdvanceStats {
        self.stats
    }

    /// Zeroes the counters
    pub fn reset_stats(&mut self) {
        self.stats = AdvanceStats::default();
    }

    /// Returns the name of the integrator in use
    pub fn integrator_name(&self) -> &str {
        self.integrator.name()
    }

    /// Advances by the configured default time step
    pub fn step(&mut self) -> Result<()> {
        let time_step = self.world.get_config().time_step;
        self.advance(time_step)
    }

    /// Advances with the default time step until the world reaches `time`
    pub fn run_until(&mut self, time: f64) -> Result<()> {
        let time_step = self.world.get_config().time_step;
        let slack = self.world.get_config().min_step_size;
        while self.world.get_time() < time - slack {
            let dt = time_step.min(time - self.world.get_time());
            self.advance(dt)?;
        }
        Ok(())
    }

    /// Advances the world by `time_step`, resolving every collision met on the way.
    ///
    /// Fails with `UnresolvedCollision` when a collision cannot be localized within the
    /// configured number of trial steps or above the minimum step size. The world is then
    /// left at the start of the failed trial interval.
    pub fn advance(&mut self, time_step: f64) -> Result<()> {
        if !(time_step >= 0.0) || !time_step.is_finite() {
            return Err(PhysicsError::InvalidParameter(format!(
                "Time step must be a non-negative number, got {}", time_step
            )));
        }
        self.world.get_events_mut().clear();

        let config = self.world.get_config().clone();
        let accuracy = config.get_accuracy();

        // velocities set from outside may already be driving bodies into each other
        self.collisions.clear();
        let vars = self.world.get_vars();
        self.world.find_collisions(&mut self.collisions, &vars, accuracy)?;
        self.resolve(&config)?;

        let mut remaining = time_step;
        let mut step = time_step;
        let mut iterations = 0;
        while remaining > 0.0 {
            iterations += 1;
            if iterations > config.max_advance_iterations {
                return Err(PhysicsError::UnresolvedCollision(format!(
                    "Advance gave up after {} trial steps at time {}",
                    config.max_advance_iterations, self.world.get_time()
                )));
            }

            let h = step.min(remaining);
            self.state = AdvanceState::Advancing;
            let saved = self.world.get_vars();
            self.world.save_old_copies();
            self.integrator.step(&mut self.world, h)?;
            self.stats.trial_steps += 1;

            self.collisions.clear();
            let vars = self.world.get_vars();
            self.world.find_collisions(&mut self.collisions, &vars, accuracy)?;

            if let Some(c) = self.collisions.iter().find(|c| c.is_penetrating(accuracy)) {
                self.state = AdvanceState::CollisionImminent;
                self.stats.bisections += 1;
                debug!(
                    body1 = c.body1.index(),
                    body2 = c.body2.index(),
                    distance = c.distance,
                    step = h,
                    "penetration, backing up"
                );
                self.world.set_vars(&saved)?;
                step = h / 2.0;
                if step < config.min_step_size {
                    return Err(PhysicsError::UnresolvedCollision(format!(
                        "Could not localize collision between bodies {} and {} at time {}: step fell below {}",
                        c.body1.index(), c.body2.index(), self.world.get_time(), config.min_step_size
                    )));
                }
                continue;
            }

            remaining -= h;
            if remaining < config.min_step_size {
                remaining = 0.0;
            }
            if self.resolve(&config)? {
                // next trial covers the rest of the interval
                step = remaining;
            }
        }

        self.world.erase_old_copies();
        trace!(time = self.world.get_time(), state = ?self.state, "advanced");
        Ok(())
    }

    /// Handles the collisions in the scratch list. Returns true if impulses were applied.
    fn resolve(&mut self, config: &SimulationConfig) -> Result<bool> {
        let handled = self.collisions.iter().filter(|c| c.needs_handling(config)).count();
        if handled == 0 {
            let resting = self.collisions
                .iter()
                .any(|c| !c.joint && c.is_touching(config.distance_tol));
            if resting {
                self.state = AdvanceState::SettledInContact;
            }
            return Ok(false);
        }

        self.state = AdvanceState::Resolving;
        let rounds = self.world.handle_collisions(&mut self.collisions)?;
        self.stats.impulse_rounds += u64::from(rounds);
        self.stats.collisions_handled += handled as u64;
        debug!(handled, rounds, time = self.world.get_time(), "collisions resolved");
        Ok(true)
    }
}
