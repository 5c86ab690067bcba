use crate::core::{BodyHandle, BodyStorage, ConnectorHandle};
use crate::bodies::Polygon;
use crate::collision::{CollisionKind, RigidBodyCollision};
use crate::error::PhysicsError;
use crate::Result;
use std::any::Any;

/// A constraint between two bodies that takes part in collision handling.
///
/// Each detection pass a connector adds a collision record describing how far its constraint
/// is from being met. Bilateral connectors add one every time; limits add one only when
/// they are crossed.
pub trait Connector: std::fmt::Debug + Send + Sync + 'static {
    /// Returns the type name of the connector
    fn connector_type(&self) -> &'static str;

    /// Returns the bodies involved, body1 first
    fn get_bodies(&self) -> &[BodyHandle];

    /// Checks if the connector involves a specific body
    fn involves_body(&self, body: BodyHandle) -> bool {
        self.get_bodies().contains(&body)
    }

    /// Returns the handle assigned by the world
    fn get_handle(&self) -> Option<ConnectorHandle>;

    /// Called by the world when the connector is added or removed
    fn set_handle(&mut self, handle: Option<ConnectorHandle>);

    /// True for constraints that may push or pull
    fn is_bilateral(&self) -> bool;

    /// Adds the collision record for the current state to the front of `out`
    fn add_collision(
        &mut self,
        out: &mut Vec<RigidBodyCollision>,
        bodies: &BodyStorage<Polygon>,
        time: f64,
        accuracy: f64,
    ) -> Result<()>;

    /// Recomputes a record made by this connector from the bodies' current state
    fn update_collision(&mut self, c: &mut RigidBodyCollision, bodies: &BodyStorage<Polygon>) -> Result<()>;

    /// Moves a connected body so that the constraint is met exactly
    fn align(&mut self, bodies: &mut BodyStorage<Polygon>) -> Result<()>;

    /// Forgets any cached position so the next search starts from scratch
    fn reset(&mut self) {}

    /// Returns a dynamic reference to any for downcasting
    fn as_any(&self) -> &dyn Any;

    /// Returns a dynamic mutable reference to any for downcasting
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Returns the connector's handle, failing if it has not been added to a world
pub(crate) fn require_handle(connector: &dyn Connector) -> Result<ConnectorHandle> {
    connector.get_handle().ok_or_else(|| {
        PhysicsError::ContractViolation(format!(
            "{} is not part of a world", connector.connector_type()
        ))
    })
}

/// Checks that a record was made by `connector` for the same pair of bodies
pub(crate) fn check_identity(connector: &dyn Connector, c: &RigidBodyCollision) -> Result<()> {
    let handle = require_handle(connector)?;
    let bodies = connector.get_bodies();
    if c.kind != CollisionKind::Connector(handle) {
        return Err(PhysicsError::ContractViolation(format!(
            "{} {:?} asked to update a record made by {:?}",
            connector.connector_type(), handle, c.kind
        )));
    }
    if c.body1 != bodies[0] || c.body2 != bodies[1] {
        return Err(PhysicsError::ContractViolation(format!(
            "{} {:?} joins {:?} and {:?} but the record names {:?} and {:?}",
            connector.connector_type(), handle, bodies[0], bodies[1], c.body1, c.body2
        )));
    }
    Ok(())
}
