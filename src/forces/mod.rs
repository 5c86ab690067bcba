mod force_generator;
mod gravity;
mod spring;
mod drag;

pub use self::force_generator::{ConstantForceGenerator, Force, ForceGenerator, ForceRegistry};
pub use self::gravity::GravityForce;
pub use self::spring::SpringForce;
pub use self::drag::DampingForce;
