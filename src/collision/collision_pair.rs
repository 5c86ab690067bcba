use crate::core::BodyHandle;

/// Two bodies whose bounds overlap, lower slot first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CollisionPair {
    pub body_a: BodyHandle,
    pub body_b: BodyHandle,
}

impl CollisionPair {
    /// Creates the pair, ordering the handles by slot so that (a, b) and (b, a) are equal
    pub fn new(first: BodyHandle, second: BodyHandle) -> Self {
        let (body_a, body_b) = if second < first { (second, first) } else { (first, second) };
        Self { body_a, body_b }
    }
}
