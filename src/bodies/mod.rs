mod polygon;
mod body_type;
mod material;

pub use self::polygon::{Polygon, BodyState};
pub use self::body_type::RigidBodyType;
pub use self::material::Material;
