use crate::core::{BodyHandle, BodyStorage, SimulationConfig};
use crate::bodies::Polygon;
use crate::collision::{
    broad_phase::{new_broad_phase, BroadPhase},
    collision_filter::{CollisionFilter, GroupMaskFilter},
    narrow_phase::{EdgeNarrowPhase, NarrowPhase},
    RigidBodyCollision,
};
use crate::math::Aabb;

use tracing::trace;

/// A system for detecting collisions between bodies
pub struct CollisionDetector {
    /// The broad-phase algorithm to use
    broad_phase: Box<dyn BroadPhase>,

    /// The narrow-phase algorithm to use
    narrow_phase: Box<dyn NarrowPhase>,

    /// The collision filter to use
    filter: Box<dyn CollisionFilter>,
}

impl std::fmt::Debug for CollisionDetector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CollisionDetector").finish_non_exhaustive()
    }
}

impl CollisionDetector {
    /// Creates a new collision detector
    pub fn new(
        broad_phase: Box<dyn BroadPhase>,
        narrow_phase: Box<dyn NarrowPhase>,
        filter: Box<dyn CollisionFilter>,
    ) -> Self {
        Self {
            broad_phase,
            narrow_phase,
            filter,
        }
    }

    /// Creates the detector described by the configuration
    pub fn from_config(config: &SimulationConfig) -> Self {
        Self::new(
            new_broad_phase(config.broad_phase),
            Box::new(EdgeNarrowPhase::new()),
            Box::new(GroupMaskFilter::new()),
        )
    }

    /// Replaces the collision filter
    pub fn set_filter(&mut self, filter: Box<dyn CollisionFilter>) {
        self.filter = filter;
    }

    /// Finds every contact between bodies and adds it to `out`
    pub fn detect(
        &mut self,
        bodies: &BodyStorage<Polygon>,
        time: f64,
        config: &SimulationConfig,
        out: &mut Vec<RigidBodyCollision>,
    ) {
        // Collect the bounds of every body with a boundary
        let bounds: Vec<(BodyHandle, Aabb)> = bodies
            .iter()
            .filter(|(_, body)| !body.get_edges().is_empty())
            .map(|(handle, body)| (handle, body.get_bounds_world().expanded(config.distance_tol)))
            .collect();

        self.broad_phase.update(&bounds);

        let mut found = Vec::new();
        for pair in self.broad_phase.get_collision_pairs() {
            let (body_a, body_b) = match (bodies.get_body(pair.body_a), bodies.get_body(pair.body_b)) {
                (Ok(a), Ok(b)) => (a, b),
                _ => continue,
            };
            if !self.filter.should_collide(pair.body_a, body_a, pair.body_b, body_b) {
                continue;
            }
            self.narrow_phase.detect_pair(
                (pair.body_a, body_a),
                (pair.body_b, body_b),
                time,
                config,
                &mut found,
            );
        }

        for c in found {
            add_collision(out, c, config.distance_tol);
        }
        trace!(count = out.len(), time, "detection pass");
    }
}

/// Adds a collision to the front of the list, unless a similar record is already there, in
/// which case the closer of the two is kept
pub fn add_collision(list: &mut Vec<RigidBodyCollision>, c: RigidBodyCollision, distance_tol: f64) {
    if let Some(existing) = list.iter_mut().find(|other| other.similar_to(&c, distance_tol)) {
        if c.distance < existing.distance {
            *existing = c;
        }
        return;
    }
    list.insert(0, c);
}
