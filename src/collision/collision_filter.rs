use bitflags::bitflags;
use crate::core::BodyHandle;
use crate::bodies::Polygon;

bitflags! {
    /// A bit mask representing a collision group
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct CollisionGroup: u32 {
        /// Default group (collides with everything)
        const DEFAULT  = 0x00000001;

        /// Immovable bodies such as walls and floors
        const STATIC   = 0x00000002;

        /// Moving bodies
        const DYNAMIC  = 0x00000004;

        /// Bodies held by joints, useful for excluding linkages from each other
        const LINKAGE  = 0x00000008;

        /// Group 5
        const GROUP5   = 0x00000010;

        /// Group 6
        const GROUP6   = 0x00000020;

        /// Group 7
        const GROUP7   = 0x00000040;

        /// Group 8
        const GROUP8   = 0x00000080;

        /// All groups
        const ALL      = 0xFFFFFFFF;
    }
}

/// Type alias for a collision mask (what groups this object collides with)
pub type CollisionMask = CollisionGroup;

/// A filter for determining whether two bodies should collide
pub trait CollisionFilter: Send + Sync {
    /// Returns whether the two bodies should be tested for collision
    fn should_collide(&self, handle_a: BodyHandle, body_a: &Polygon, handle_b: BodyHandle, body_b: &Polygon) -> bool;
}

/// A filter based on collision groups, masks and each body's list of bodies it ignores
#[derive(Debug, Default, Clone, Copy)]
pub struct GroupMaskFilter;

impl GroupMaskFilter {
    /// Creates a new group/mask collision filter
    pub fn new() -> Self {
        Self
    }
}

impl CollisionFilter for GroupMaskFilter {
    fn should_collide(&self, handle_a: BodyHandle, body_a: &Polygon, handle_b: BodyHandle, body_b: &Polygon) -> bool {
        // Immovable bodies never need a contact between themselves
        if body_a.has_infinite_mass() && body_b.has_infinite_mass() {
            return false;
        }

        if body_a.does_not_collide(handle_b) || body_b.does_not_collide(handle_a) {
            return false;
        }

        // A collides with B if A's mask includes B's group AND B's mask includes A's group
        body_a.get_collision_group().intersects(body_b.get_collision_mask())
            && body_b.get_collision_group().intersects(body_a.get_collision_mask())
    }
}
