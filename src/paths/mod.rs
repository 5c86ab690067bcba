mod path_function;
mod path_point;
mod numerical_path;

pub use self::path_function::{ParametricPath, CirclePath, OvalPath, FlatPath, ParabolaPath};
pub use self::path_point::PathPoint;
pub use self::numerical_path::NumericalPath;
