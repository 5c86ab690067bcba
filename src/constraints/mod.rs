mod connector;
mod joint;
mod path_joint;
mod path_end_point;
mod joint_util;

pub use self::connector::Connector;
pub use self::joint::{Joint, NormalType};
pub use self::path_joint::PathJoint;
pub use self::path_end_point::PathEndPoint;
pub use self::joint_util::JointUtil;
