use crate::collision::{ContactOrder, SolverType, BroadPhaseType};
use crate::error::PhysicsError;
use crate::Result;

#[cfg(feature = "serialize")]
use serde::{Serialize, Deserialize};

/// How simultaneous collisions are turned into impulses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub enum CollisionHandling {
    /// Solve every touching contact and joint at once
    Simultaneous,

    /// Solve one randomly chosen collision at a time, together with the joints
    SerialSeparate,

    /// Like `SerialSeparate`, then a final simultaneous inelastic pass
    SerialSeparateLastPass,

    /// Solve all collisions between one randomly chosen pair of bodies at a time
    SerialGrouped,

    /// Like `SerialGrouped`, then a final simultaneous inelastic pass
    SerialGroupedLastPass,
}

impl CollisionHandling {
    /// Returns true for the policies that work through collisions one focus at a time
    pub fn is_serial(&self) -> bool {
        !matches!(self, CollisionHandling::Simultaneous)
    }

    /// Returns true for the policies that group collisions by body pair
    pub fn is_grouped(&self) -> bool {
        matches!(self, CollisionHandling::SerialGrouped | CollisionHandling::SerialGroupedLastPass)
    }

    /// Returns true for the policies that finish with a simultaneous inelastic pass
    pub fn has_last_pass(&self) -> bool {
        matches!(self, CollisionHandling::SerialSeparateLastPass | CollisionHandling::SerialGroupedLastPass)
    }
}

/// Extra acceleration asked of contacts and joints to remove drift in velocity and distance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub enum ExtraAccel {
    /// No correction
    None,

    /// Remove the normal velocity of contacts over one time step
    Velocity,

    /// Remove the normal velocity of contacts and bring them to the target gap
    VelocityAndDistance,

    /// Like `Velocity`, for joints as well as contacts
    VelocityJoints,

    /// Like `VelocityAndDistance`, for joints as well as contacts
    VelocityAndDistanceJoints,
}

impl ExtraAccel {
    /// Returns true if the correction removes velocity
    pub fn corrects_velocity(&self) -> bool {
        !matches!(self, ExtraAccel::None)
    }

    /// Returns true if the correction also removes distance error
    pub fn corrects_distance(&self) -> bool {
        matches!(self, ExtraAccel::VelocityAndDistance | ExtraAccel::VelocityAndDistanceJoints)
    }

    /// Returns true if joints are corrected as well as contacts
    pub fn includes_joints(&self) -> bool {
        matches!(self, ExtraAccel::VelocityJoints | ExtraAccel::VelocityAndDistanceJoints)
    }
}

/// The ODE solver used between collisions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub enum IntegratorType {
    Euler,
    ModifiedEuler,
    RungeKutta,
}

/// Configuration parameters for the physics simulation
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct SimulationConfig {
    /// The default time step used by `CollisionAdvance::run_until`
    pub time_step: f64,

    /// The integrator to use between collisions
    pub integrator: IntegratorType,

    /// Contacts closer than this are touching
    pub distance_tol: f64,

    /// Contacts with normal speed below this are resting and receive contact forces
    pub velocity_tol: f64,

    /// Collisions are located to within this fraction of `distance_tol`
    pub collision_accuracy: f64,

    /// Approach speeds below this are too small to need an impulse
    pub small_impact_velocity: f64,

    /// Impacts slower than this are treated as perfectly inelastic
    pub restitution_velocity_threshold: f64,

    /// How simultaneous collisions are resolved
    pub collision_handling: CollisionHandling,

    /// Drift correction applied through contact forces
    pub extra_accel: ExtraAccel,

    /// When true, small joint velocities are left to contact forces instead of impulses
    pub joint_small_impacts: bool,

    /// The contact force solver
    pub solver: SolverType,

    /// The order the solver visits contacts in
    pub contact_order: ContactOrder,

    /// Iteration limit for the Gauss-Seidel solver
    pub gauss_seidel_iterations: u32,

    /// The broad-phase algorithm
    pub broad_phase: BroadPhaseType,

    /// Seed of the random number generator used to break ties
    pub random_seed: u64,

    /// Maximum trial steps and bisections spent on one call to `advance`
    pub max_advance_iterations: u32,

    /// Smallest trial step before a collision is declared unresolvable
    pub min_step_size: f64,

    /// Maximum impulse rounds spent resolving one set of collisions
    pub max_impulse_rounds: u32,
}

impl SimulationConfig {
    /// Contacts are kept at this distance by the distance correction
    pub fn get_target_gap(&self) -> f64 {
        self.distance_tol / 2.0
    }

    /// Distance within which a collision counts as located
    pub fn get_accuracy(&self) -> f64 {
        self.collision_accuracy * self.distance_tol
    }

    /// Checks that every parameter is usable
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("time_step", self.time_step),
            ("distance_tol", self.distance_tol),
            ("velocity_tol", self.velocity_tol),
            ("min_step_size", self.min_step_size),
        ];
        for (name, value) in positive {
            if !(value > 0.0) || !value.is_finite() {
                return Err(PhysicsError::InvalidParameter(format!(
                    "{} must be positive, got {}", name, value
                )));
            }
        }
        if !(self.collision_accuracy > 0.0 && self.collision_accuracy <= 1.0) {
            return Err(PhysicsError::InvalidParameter(format!(
                "collision_accuracy must be in (0, 1], got {}", self.collision_accuracy
            )));
        }
        if self.small_impact_velocity < 0.0 || self.restitution_velocity_threshold < 0.0 {
            return Err(PhysicsError::InvalidParameter(
                "Velocity thresholds must not be negative".to_string(),
            ));
        }
        if self.max_advance_iterations == 0 || self.max_impulse_rounds == 0 {
            return Err(PhysicsError::InvalidParameter(
                "Iteration limits must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            time_step: 0.025,
            integrator: IntegratorType::RungeKutta,
            distance_tol: 0.01,
            velocity_tol: 0.5,
            collision_accuracy: 0.6,
            small_impact_velocity: 1.0e-3,
            restitution_velocity_threshold: 0.5,
            collision_handling: CollisionHandling::SerialGroupedLastPass,
            extra_accel: ExtraAccel::VelocityAndDistanceJoints,
            joint_small_impacts: false,
            solver: SolverType::ComputeForces,
            contact_order: ContactOrder::Natural,
            gauss_seidel_iterations: 200,
            broad_phase: BroadPhaseType::BruteForce,
            random_seed: 0,
            max_advance_iterations: 2000,
            min_step_size: 1.0e-9,
            max_impulse_rounds: 200,
        }
    }
}
