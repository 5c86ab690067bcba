#[cfg(feature = "serialize")]
use serde::{Serialize, Deserialize};

/// Breakdown of the energy in a world
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct EnergyInfo {
    /// Kinetic energy of the centers of mass
    pub translational: f64,

    /// Kinetic energy of rotation about the centers of mass
    pub rotational: f64,

    /// Potential energy stored by the force generators
    pub potential: f64,
}

impl EnergyInfo {
    /// Creates an energy record
    pub fn new(translational: f64, rotational: f64, potential: f64) -> Self {
        Self {
            translational,
            rotational,
            potential,
        }
    }

    /// Returns the kinetic energy
    pub fn kinetic(&self) -> f64 {
        self.translational + self.rotational
    }

    /// Returns kinetic plus potential energy
    pub fn total(&self) -> f64 {
        self.kinetic() + self.potential
    }
}
