mod collision_pair;
mod collision_detector;
mod broad_phase;
mod narrow_phase;
mod contact_solver;
mod contact_matrix;
mod collision_filter;
mod rigid_body_collision;

pub use self::collision_pair::CollisionPair;
pub use self::collision_detector::{add_collision, CollisionDetector};
pub use self::broad_phase::{new_broad_phase, BroadPhase, BroadPhaseType, BruteForceBroadPhase, SortAndSweep};
pub use self::narrow_phase::{EdgeNarrowPhase, NarrowPhase};
pub use self::contact_solver::{
    new_contact_solver, solve_with_perturbation, ComputeForces, ContactOrder, ContactSolver,
    GaussSeidelSolver, SolverType,
};
pub use self::contact_matrix::{
    apply_impulse, build_force_rhs, build_impulse_rhs, build_matrix, effective_elasticity,
    BodyAccel,
};
pub use self::collision_filter::{CollisionFilter, CollisionGroup, CollisionMask, GroupMaskFilter};
pub use self::rigid_body_collision::{CollisionKind, RigidBodyCollision};
