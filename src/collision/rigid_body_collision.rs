use crate::bodies::Polygon;
use crate::core::{BodyHandle, ConnectorHandle, SimulationConfig};
use crate::math::Vector2;

/// What produced a collision record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionKind {
    /// A vertex of body1 against an edge of body2
    CornerEdge {
        /// Vertex index on body1
        vertex: usize,

        /// Edge index on body2
        edge: usize,
    },

    /// An edge of body1 against an edge of body2
    EdgeEdge {
        /// Edge index on body1
        edge1: usize,

        /// Edge index on body2
        edge2: usize,
    },

    /// A connector between body1 and body2
    Connector(ConnectorHandle),
}

/// One contact, collision or joint found by a detection pass.
///
/// All vectors are in world coordinates. The normal points from body2 towards body1, so a
/// positive `distance` means separated and a negative `normal_velocity` means approaching.
#[derive(Debug, Clone)]
pub struct RigidBodyCollision {
    /// What produced this record
    pub kind: CollisionKind,

    /// The body whose point touches
    pub body1: BodyHandle,

    /// The body whose surface is touched; the scrim for path connectors
    pub body2: BodyHandle,

    /// True for bilateral constraints, which may push or pull
    pub joint: bool,

    /// True when the record only exists because something passed through a surface
    pub crossing: bool,

    /// Point of contact on body1
    pub impact1: Vector2,

    /// Point of contact on body2 when it differs from `impact1`
    pub impact2: Option<Vector2>,

    /// Unit normal from body2 towards body1
    pub normal: Vector2,

    /// Rate of change of the normal as it turns with body2
    pub normal_dt: Vector2,

    /// Rate of change of the normal as the contact slides along a curved surface.
    /// Enters the normal acceleration once, where `normal_dt` enters twice.
    pub normal_slide: Vector2,

    /// Normal acceleration of a rolling arc contact that the impact points do not carry
    pub curvature_accel: f64,

    /// Signed separation along the normal
    pub distance: f64,

    /// Relative velocity of body1 with respect to body2 along the normal
    pub normal_velocity: f64,

    /// Coefficient of restitution used when an impulse is computed
    pub elasticity: f64,

    /// Impulse applied by the last collision handling
    pub impulse: f64,

    /// Contact force found by the last force computation
    pub force: f64,

    /// Simulation time at which the record was made
    pub time: f64,

    /// Separation the distance correction steers towards
    pub target_gap: f64,
}

impl RigidBodyCollision {
    /// Creates a record with geometry still to be filled in
    pub fn new(kind: CollisionKind, body1: BodyHandle, body2: BodyHandle, joint: bool, time: f64) -> Self {
        Self {
            kind,
            body1,
            body2,
            joint,
            crossing: false,
            impact1: Vector2::zero(),
            impact2: None,
            normal: Vector2::unit_y(),
            normal_dt: Vector2::zero(),
            normal_slide: Vector2::zero(),
            curvature_accel: 0.0,
            distance: 0.0,
            normal_velocity: 0.0,
            elasticity: 1.0,
            impulse: 0.0,
            force: 0.0,
            time,
            target_gap: 0.0,
        }
    }

    /// Point of contact on body2
    pub fn get_impact2(&self) -> Vector2 {
        self.impact2.unwrap_or(self.impact1)
    }

    /// Returns the connector behind this record, if any
    pub fn get_connector(&self) -> Option<ConnectorHandle> {
        match self.kind {
            CollisionKind::Connector(handle) => Some(handle),
            _ => None,
        }
    }

    /// True when the bodies overlap by more than the collision accuracy allows.
    ///
    /// Joints never count. A crossing record is allowed to sit inside the accuracy band
    /// because it only exists once the limit has been passed.
    pub fn is_penetrating(&self, accuracy: f64) -> bool {
        if self.joint {
            return false;
        }
        if self.crossing {
            self.distance < -accuracy
        } else {
            self.distance < 0.0
        }
    }

    /// True when the bodies are close enough to be in contact
    pub fn is_touching(&self, distance_tol: f64) -> bool {
        self.distance < distance_tol
    }

    /// True for records that should receive a continuous contact force
    pub fn is_contact(&self, distance_tol: f64, velocity_tol: f64) -> bool {
        if self.joint {
            return true;
        }
        !self.crossing && self.is_touching(distance_tol) && self.normal_velocity.abs() < velocity_tol
    }

    /// True for records that must be resolved with an impulse before time can advance
    pub fn needs_handling(&self, config: &SimulationConfig) -> bool {
        let small = config.small_impact_velocity;
        if self.joint {
            if config.joint_small_impacts {
                self.normal_velocity.abs() > small
            } else {
                self.normal_velocity.abs() > 1.0e-10
            }
        } else if self.crossing {
            self.normal_velocity < -small
        } else {
            self.is_touching(config.distance_tol) && self.normal_velocity < -small
        }
    }

    /// Returns true if both records come from the same place on the same pair of bodies
    pub fn similar_to(&self, other: &RigidBodyCollision, distance_tol: f64) -> bool {
        if self.joint || other.joint {
            return false;
        }
        let same_pair = (self.body1 == other.body1 && self.body2 == other.body2)
            || (self.body1 == other.body2 && self.body2 == other.body1);
        if !same_pair {
            return false;
        }
        let same_direction = if self.body1 == other.body1 {
            self.normal.dot(&other.normal) > 0.99
        } else {
            self.normal.dot(&other.normal) < -0.99
        };
        same_direction && self.impact1.distance(&other.impact1) < distance_tol
    }

    /// Recomputes `normal_velocity` from the bodies' current velocities
    pub fn update_velocity(&mut self, body1: &Polygon, body2: &Polygon) {
        let v1 = body1.get_velocity_at(self.impact1);
        let v2 = body2.get_velocity_at(self.get_impact2());
        self.normal_velocity = self.normal.dot(&(v1 - v2));
    }

    /// Lever arm from body1's center of mass to the impact
    pub fn get_r1(&self, body1: &Polygon) -> Vector2 {
        self.impact1 - body1.get_position()
    }

    /// Lever arm from body2's center of mass to the impact
    pub fn get_r2(&self, body2: &Polygon) -> Vector2 {
        self.get_impact2() - body2.get_position()
    }
}
