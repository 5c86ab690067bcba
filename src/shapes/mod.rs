mod vertex;
mod edge;
mod straight_edge;
mod circular_edge;
mod path_edge;
mod shape;

pub use self::vertex::Vertex;
pub use self::edge::{Edge, SurfacePoint};
pub use self::straight_edge::StraightEdge;
pub use self::circular_edge::CircularEdge;
pub use self::path_edge::PathEdge;
pub use self::shape::Shapes;
