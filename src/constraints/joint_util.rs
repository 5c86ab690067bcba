use crate::constraints::{Joint, NormalType, PathJoint};
use crate::core::{BodyHandle, ConnectorHandle, PhysicsWorld};
use crate::math::Vector2;
use crate::paths::NumericalPath;
use crate::Result;

use std::sync::Arc;

/// Helpers for wiring connectors into a world
pub struct JointUtil;

impl JointUtil {
    /// Adds one joint along `normal` between the two attachment points
    pub fn add_single_joint(
        world: &mut PhysicsWorld,
        body1: BodyHandle,
        attach1_body: Vector2,
        body2: BodyHandle,
        attach2_body: Vector2,
        normal: Vector2,
        normal_type: NormalType,
    ) -> Result<ConnectorHandle> {
        let joint = Joint::new(body1, attach1_body, body2, attach2_body, normal, normal_type)?;
        world.add_joint(joint)
    }

    /// Pins two bodies together with a pair of joints along perpendicular normals that turn
    /// with body2. The bodies stop colliding with each other.
    pub fn add_double_joint(
        world: &mut PhysicsWorld,
        body1: BodyHandle,
        attach1_body: Vector2,
        body2: BodyHandle,
        attach2_body: Vector2,
    ) -> Result<(ConnectorHandle, ConnectorHandle)> {
        let first = Self::add_single_joint(world, body1, attach1_body, body2, attach2_body, Vector2::unit_x(), NormalType::Body2)?;
        let second = Self::add_single_joint(world, body1, attach1_body, body2, attach2_body, Vector2::unit_y(), NormalType::Body2)?;
        world.add_non_collide(body1, body2)?;
        Ok((first, second))
    }

    /// Holds `attach_body` on `body` to `path`, moving the body onto the path
    pub fn attach_to_path(
        world: &mut PhysicsWorld,
        path: Arc<NumericalPath>,
        body: BodyHandle,
        attach_body: Vector2,
    ) -> Result<ConnectorHandle> {
        let handle = world.add_connector(Box::new(PathJoint::new(path, body, attach_body)))?;
        world.align_connector(handle)?;
        Ok(handle)
    }
}
