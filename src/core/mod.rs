pub mod world;
pub mod config;
pub mod storage;
pub mod events;
pub mod energy;
pub mod collision_advance;

pub use self::world::PhysicsWorld;
pub use self::config::{SimulationConfig, CollisionHandling, ExtraAccel, IntegratorType};
pub use self::storage::{BodyStorage, ConnectorStorage, Storage};
pub use self::events::{EventQueue, CollisionEvent, CollisionEventType, BodyEvent, BodyEventType};
pub use self::energy::EnergyInfo;
pub use self::collision_advance::{CollisionAdvance, AdvanceState, AdvanceStats};

#[cfg(feature = "serialize")]
use serde::{Serialize, Deserialize};

/// A unique identifier for a body in the physics world; it is also the body's slot in the
/// state vector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct BodyHandle(pub(crate) u32);

impl BodyHandle {
    /// The scrim always occupies the first slot
    pub const SCRIM: BodyHandle = BodyHandle(0);

    /// Returns the slot index of the body
    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

/// A unique identifier for a connector in the physics world
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct ConnectorHandle(pub(crate) u32);

impl ConnectorHandle {
    /// Returns the slot index of the connector
    pub fn index(&self) -> usize {
        self.0 as usize
    }
}
