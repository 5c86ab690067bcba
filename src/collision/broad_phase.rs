use crate::core::BodyHandle;
use crate::math::Aabb;
use crate::collision::collision_pair::CollisionPair;

#[cfg(feature = "serialize")]
use serde::{Serialize, Deserialize};

/// Which broad-phase algorithm the detector uses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub enum BroadPhaseType {
    /// Test every pair
    BruteForce,

    /// Sort bounds along x and sweep
    SortAndSweep,
}

/// Trait for broad-phase collision detection algorithms
pub trait BroadPhase: Send + Sync {
    /// Updates the broad-phase with the current world bounds of the bodies
    fn update(&mut self, bodies: &[(BodyHandle, Aabb)]);

    /// Gets all potential collision pairs, sorted
    fn get_collision_pairs(&self) -> Vec<CollisionPair>;
}

/// Creates the broad-phase named by `kind`
pub fn new_broad_phase(kind: BroadPhaseType) -> Box<dyn BroadPhase> {
    match kind {
        BroadPhaseType::BruteForce => Box::new(BruteForceBroadPhase::new()),
        BroadPhaseType::SortAndSweep => Box::new(SortAndSweep::new()),
    }
}

/// Simple brute-force broad-phase algorithm
#[derive(Debug, Default)]
pub struct BruteForceBroadPhase {
    /// The bodies in the broad-phase
    bodies: Vec<(BodyHandle, Aabb)>,
}

impl BruteForceBroadPhase {
    /// Creates a new brute-force broad-phase
    pub fn new() -> Self {
        Self {
            bodies: Vec::new(),
        }
    }
}

impl BroadPhase for BruteForceBroadPhase {
    fn update(&mut self, bodies: &[(BodyHandle, Aabb)]) {
        self.bodies.clear();
        self.bodies.extend_from_slice(bodies);
    }

    fn get_collision_pairs(&self) -> Vec<CollisionPair> {
        let mut pairs = Vec::new();

        // Check all pairs of bodies
        for i in 0..self.bodies.len() {
            let (handle_a, aabb_a) = self.bodies[i];

            for j in (i + 1)..self.bodies.len() {
                let (handle_b, aabb_b) = self.bodies[j];

                // Check if the AABBs overlap
                if aabb_a.intersects(&aabb_b) {
                    pairs.push(CollisionPair::new(handle_a, handle_b));
                }
            }
        }

        pairs.sort();
        pairs
    }
}

/// Sort-and-sweep along the x axis
#[derive(Debug, Default)]
pub struct SortAndSweep {
    /// Bodies sorted by the left side of their bounds
    sorted: Vec<(BodyHandle, Aabb)>,
}

impl SortAndSweep {
    /// Creates a new sort-and-sweep broad-phase
    pub fn new() -> Self {
        Self {
            sorted: Vec::new(),
        }
    }
}

impl BroadPhase for SortAndSweep {
    fn update(&mut self, bodies: &[(BodyHandle, Aabb)]) {
        self.sorted.clear();
        self.sorted.extend_from_slice(bodies);
        self.sorted.sort_by(|a, b| a.1.min.x.total_cmp(&b.1.min.x));
    }

    fn get_collision_pairs(&self) -> Vec<CollisionPair> {
        let mut pairs = Vec::new();

        for i in 0..self.sorted.len() {
            let (handle_a, aabb_a) = self.sorted[i];

            for &(handle_b, aabb_b) in &self.sorted[i + 1..] {
                // Nothing further along can overlap once the sweep passes the right side
                if aabb_b.min.x > aabb_a.max.x {
                    break;
                }
                if aabb_a.intersects(&aabb_b) {
                    pairs.push(CollisionPair::new(handle_a, handle_b));
                }
            }
        }

        // Sort the pairs for deterministic behavior
        pairs.sort();
        pairs
    }
}
