#[cfg(feature = "serialize")]
use serde::{Serialize, Deserialize};

/// Type of rigid body, determining how it behaves in the simulation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub enum RigidBodyType {
    /// Dynamic bodies are moved by forces, contacts and collisions
    Dynamic,

    /// Fixed bodies have infinite mass and never move
    Fixed,

    /// The world-fixed pseudo-body that connectors attach to when they have no second body
    Scrim,
}

impl RigidBodyType {
    /// Returns true if bodies of this type can move
    pub fn is_movable(&self) -> bool {
        matches!(self, RigidBodyType::Dynamic)
    }
}
