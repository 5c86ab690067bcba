#[cfg(feature = "serialize")]
use serde::{Serialize, Deserialize};

/// Material properties for rigid bodies
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct Material {
    /// Elasticity of collisions, 0 stops dead and 1 rebounds without loss
    pub elasticity: f64,

    /// Mass per unit area, used by the shape factory
    pub density: f64,
}

impl Material {
    /// Creates a new material with the specified properties
    pub fn new(density: f64, elasticity: f64) -> Self {
        Self {
            elasticity,
            density,
        }
    }

    /// A material that does not bounce at all
    pub fn inelastic() -> Self {
        Self {
            elasticity: 0.0,
            density: 1.0,
        }
    }

    /// A material that rebounds without losing energy
    pub fn perfectly_elastic() -> Self {
        Self {
            elasticity: 1.0,
            density: 1.0,
        }
    }

    /// A lively but lossy material
    pub fn rubber() -> Self {
        Self {
            elasticity: 0.8,
            density: 1.2,
        }
    }

    /// A heavy material with a small bounce
    pub fn wood() -> Self {
        Self {
            elasticity: 0.3,
            density: 0.7,
        }
    }
}

impl Default for Material {
    fn default() -> Self {
        Self {
            elasticity: 1.0,
            density: 1.0,
        }
    }
}
