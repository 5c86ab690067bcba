pub mod math;
pub mod paths;
pub mod shapes;
pub mod bodies;
pub mod collision;
pub mod constraints;
pub mod forces;
pub mod integration;
pub mod core;

/// Re-export common types for easier usage
pub use crate::core::{PhysicsWorld, SimulationConfig, CollisionAdvance, BodyHandle, ConnectorHandle};
pub use crate::bodies::{Polygon, RigidBodyType, Material};
pub use crate::math::Vector2;

/// Error types for the physics engine
pub mod error {
    use thiserror::Error;

    #[derive(Error, Debug, Clone, PartialEq)]
    pub enum PhysicsError {
        #[error("Invalid parameter: {0}")]
        InvalidParameter(String),

        #[error("Resource not found: {0}")]
        ResourceNotFound(String),

        #[error("Contract violation: {0}")]
        ContractViolation(String),

        #[error("Unresolved collision: {0}")]
        UnresolvedCollision(String),

        #[error("Singular constraint matrix: {0}")]
        SingularMatrix(String),

        #[error("Simulation stability error: {0}")]
        SimulationError(String),
    }
}

/// Result type for physics engine operations
pub type Result<T> = std::result::Result<T, error::PhysicsError>;

/// Engine version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
