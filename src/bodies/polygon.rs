use crate::bodies::{Material, RigidBodyType};
use crate::collision::{CollisionGroup, CollisionMask};
use crate::core::BodyHandle;
use crate::error::PhysicsError;
use crate::math::{Aabb, Transform, Vector2, EPSILON};
use crate::paths::NumericalPath;
use crate::shapes::{CircularEdge, Edge, PathEdge, StraightEdge, Vertex};
use crate::Result;

use std::sync::Arc;

#[cfg(feature = "serialize")]
use serde::{Serialize, Deserialize};

/// How close two points must be to count as the same vertex
const VERTEX_TOLERANCE: f64 = 1.0e-6;

/// Kinematic state of a body at one instant
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct BodyState {
    /// World position of the center of mass
    pub position: Vector2,

    /// Rotation in radians
    pub angle: f64,

    /// Velocity of the center of mass
    pub velocity: Vector2,

    /// Angular velocity in radians per second
    pub angular_velocity: f64,
}

/// A rigid body whose boundary is made of straight, circular and path edges.
///
/// The boundary is built in body coordinates with `start_path`, the `add_*_edge` calls and
/// `close_path`, and sealed with `finish`. Body coordinates are the coordinates the edges are
/// given in; the center of mass is a point in those coordinates, and the body's world
/// position is where that point currently is.
#[derive(Debug, Clone)]
pub struct Polygon {
    /// Name used in logs and events
    name: String,

    /// Handle assigned when the body is added to a world
    handle: Option<BodyHandle>,

    /// Boundary vertices, followed by decorated vertices once finished
    vertices: Vec<Vertex>,

    /// Boundary edges
    edges: Vec<Edge>,

    /// First vertex of the path being built
    path_start: Option<usize>,

    /// Last vertex of the path being built
    last_vertex: Option<usize>,

    /// Whether the boundary has been sealed
    finished: bool,

    /// Winding of the boundary, known once finished
    counter_clockwise: bool,

    /// Enclosed area, known once finished
    area: f64,

    /// The body's type (dynamic, fixed or scrim)
    body_type: RigidBodyType,

    /// The body's mass, infinite for fixed bodies
    mass: f64,

    /// Moment of inertia about the center of mass divided by the mass
    moment_per_mass: f64,

    /// Center of mass in body coordinates
    cm_body: Vector2,

    /// World placement of the center of mass
    transform: Transform,

    /// Velocity of the center of mass
    velocity: Vector2,

    /// Angular velocity
    angular_velocity: f64,

    /// The body's material properties
    material: Material,

    /// State saved before the last trial step, used to detect crossings
    old_copy: Option<BodyState>,

    /// Bodies this body never collides with
    non_collide_bodies: Vec<BodyHandle>,

    /// Edges of other bodies this body never collides with
    non_collide_edges: Vec<(BodyHandle, usize)>,

    /// Collision group this body belongs to
    collision_group: CollisionGroup,

    /// Groups this body collides with
    collision_mask: CollisionMask,

    /// Center of the enclosing circle in body coordinates
    centroid_body: Vector2,

    /// Radius of the enclosing circle
    centroid_radius: f64,

    /// Spacing of decorated vertices along curved edges
    decoration_spacing: f64,
}

impl Polygon {
    /// Default spacing of decorated vertices along curved edges
    pub const DEFAULT_DECORATION_SPACING: f64 = 0.1;

    /// Creates an empty dynamic polygon with unit mass
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            handle: None,
            vertices: Vec::new(),
            edges: Vec::new(),
            path_start: None,
            last_vertex: None,
            finished: false,
            counter_clockwise: true,
            area: 0.0,
            body_type: RigidBodyType::Dynamic,
            mass: 1.0,
            moment_per_mass: 1.0,
            cm_body: Vector2::zero(),
            transform: Transform::identity(),
            velocity: Vector2::zero(),
            angular_velocity: 0.0,
            material: Material::default(),
            old_copy: None,
            non_collide_bodies: Vec::new(),
            non_collide_edges: Vec::new(),
            collision_group: CollisionGroup::DEFAULT,
            collision_mask: CollisionMask::ALL,
            centroid_body: Vector2::zero(),
            centroid_radius: 0.0,
            decoration_spacing: Self::DEFAULT_DECORATION_SPACING,
        }
    }

    /// Creates the immovable, edgeless pseudo-body that stands for the world itself
    pub fn scrim() -> Self {
        let mut scrim = Self::new("scrim");
        scrim.body_type = RigidBodyType::Scrim;
        scrim.mass = f64::INFINITY;
        scrim.finished = true;
        scrim.collision_group = CollisionGroup::empty();
        scrim.collision_mask = CollisionMask::empty();
        scrim
    }

    /// Returns the body's name
    pub fn get_name(&self) -> &str {
        &self.name
    }

    /// Returns the handle assigned by the world, if any
    pub fn get_handle(&self) -> Option<BodyHandle> {
        self.handle
    }

    pub(crate) fn set_handle(&mut self, handle: Option<BodyHandle>) {
        self.handle = handle;
    }

    fn check_not_finished(&self) -> Result<()> {
        if self.finished {
            Err(PhysicsError::InvalidParameter(format!(
                "Polygon {} is already finished", self.name
            )))
        } else {
            Ok(())
        }
    }

    fn current_vertex(&self) -> Result<usize> {
        self.last_vertex.ok_or_else(|| {
            PhysicsError::InvalidParameter(format!(
                "Polygon {} has no open path; call start_path first", self.name
            ))
        })
    }

    fn push_edge(&mut self, from: usize, edge: Edge, end: Vector2) -> usize {
        let edge_index = self.edges.len();
        self.vertices[from].set_edge2(edge_index);
        let mut vertex = Vertex::new(end, true);
        vertex.set_edge1(edge_index);
        self.vertices.push(vertex);
        self.edges.push(edge);
        self.last_vertex = Some(self.vertices.len() - 1);
        edge_index
    }

    /// Begins a new closed path at `point`
    pub fn start_path(&mut self, point: Vector2) -> Result<()> {
        self.check_not_finished()?;
        if self.path_start.is_some() {
            return Err(PhysicsError::InvalidParameter(format!(
                "Polygon {} must close its current path before starting another", self.name
            )));
        }
        self.vertices.push(Vertex::new(point, true));
        let index = self.vertices.len() - 1;
        self.path_start = Some(index);
        self.last_vertex = Some(index);
        Ok(())
    }

    /// Adds a straight edge from the current vertex to `end`, returning the edge index
    pub fn add_straight_edge(&mut self, end: Vector2) -> Result<usize> {
        self.check_not_finished()?;
        let from = self.current_vertex()?;
        let start = self.vertices[from].loc_body();
        if start.distance(&end) < VERTEX_TOLERANCE {
            return Err(PhysicsError::InvalidParameter(format!(
                "Polygon {} straight edge has zero length at {}", self.name, start
            )));
        }
        let next = self.vertices.len();
        let edge = Edge::Straight(StraightEdge::new(from, start, next, end));
        Ok(self.push_edge(from, edge, end))
    }

    /// Adds an arc around `center` from the current vertex to `end`, returning the edge index.
    ///
    /// When `end` is the current vertex the edge is a full circle.
    pub fn add_circular_edge(&mut self, end: Vector2, center: Vector2, clockwise: bool) -> Result<usize> {
        self.check_not_finished()?;
        let from = self.current_vertex()?;
        let start = self.vertices[from].loc_body();
        let radius = start.distance(&center);
        if radius < VERTEX_TOLERANCE {
            return Err(PhysicsError::InvalidParameter(format!(
                "Polygon {} circular edge has zero radius", self.name
            )));
        }
        if (end.distance(&center) - radius).abs() > VERTEX_TOLERANCE * radius.max(1.0) {
            return Err(PhysicsError::InvalidParameter(format!(
                "Polygon {} circular edge ends off its circle at {}", self.name, end
            )));
        }
        let next = self.vertices.len();
        let edge = Edge::Circular(CircularEdge::new(from, start, next, end, center, clockwise));
        Ok(self.push_edge(from, edge, end))
    }

    /// Adds an edge that follows `path` from arc length `p_start` to `p_end`.
    ///
    /// The path must pass through the current vertex at `p_start`.
    pub fn add_path_edge(&mut self, path: Arc<NumericalPath>, p_start: f64, p_end: f64) -> Result<usize> {
        self.check_not_finished()?;
        let from = self.current_vertex()?;
        let start = self.vertices[from].loc_body();
        if path.get_point(p_start).distance(&start) > VERTEX_TOLERANCE {
            return Err(PhysicsError::InvalidParameter(format!(
                "Polygon {} path edge does not start at the current vertex {}", self.name, start
            )));
        }
        if (p_end - p_start).abs() < VERTEX_TOLERANCE {
            return Err(PhysicsError::InvalidParameter(format!(
                "Polygon {} path edge is empty", self.name
            )));
        }
        let end = path.get_point(p_end);
        let next = self.vertices.len();
        let edge = Edge::Path(PathEdge::new(from, next, path, p_start, p_end));
        Ok(self.push_edge(from, edge, end))
    }

    /// Closes the current path; its last vertex must coincide with its first
    pub fn close_path(&mut self) -> Result<()> {
        self.check_not_finished()?;
        let start = self.path_start.ok_or_else(|| {
            PhysicsError::InvalidParameter(format!("Polygon {} has no open path", self.name))
        })?;
        let last = self.current_vertex()?;
        if last == start {
            return Err(PhysicsError::InvalidParameter(format!(
                "Polygon {} path has no edges", self.name
            )));
        }
        if self.vertices[last].loc_body().distance(&self.vertices[start].loc_body()) > VERTEX_TOLERANCE {
            return Err(PhysicsError::InvalidParameter(format!(
                "Polygon {} path does not end where it started", self.name
            )));
        }

        // the last vertex is the newest one; fold it into the start vertex
        let last_edge = self.edges.len() - 1;
        self.edges[last_edge].set_vertex2(start);
        self.vertices[start].set_edge1(last_edge);
        self.vertices.pop();
        self.path_start = None;
        self.last_vertex = None;
        Ok(())
    }

    /// Seals the boundary: works out which side of every edge is outside, adds decorated
    /// vertices along curved edges and computes the enclosing circle
    pub fn finish(&mut self) -> Result<()> {
        self.check_not_finished()?;
        if self.path_start.is_some() {
            return Err(PhysicsError::InvalidParameter(format!(
                "Polygon {} has an unclosed path", self.name
            )));
        }
        if self.edges.is_empty() {
            return Err(PhysicsError::InvalidParameter(format!(
                "Polygon {} has no edges", self.name
            )));
        }

        let area: f64 = self.edges.iter().map(|e| e.signed_area()).sum();
        if area.abs() < EPSILON {
            return Err(PhysicsError::InvalidParameter(format!(
                "Polygon {} encloses no area", self.name
            )));
        }
        self.counter_clockwise = area > 0.0;
        self.area = area.abs();
        for edge in self.edges.iter_mut() {
            edge.set_orientation(self.counter_clockwise);
        }

        for i in 0..self.edges.len() {
            for point in self.edges[i].decorate(self.decoration_spacing) {
                self.vertices.push(Vertex::decorated(point, i));
            }
        }

        let mut points: Vec<Vector2> = self.vertices.iter().map(|v| v.loc_body()).collect();
        for edge in &self.edges {
            if let Edge::Circular(e) = edge {
                let c = e.get_center();
                let r = e.get_radius();
                points.push(c + Vector2::new(r, r));
                points.push(c - Vector2::new(r, r));
            }
        }
        let bounds = Aabb::from_points(&points).ok_or_else(|| {
            PhysicsError::InvalidParameter(format!("Polygon {} has no vertices", self.name))
        })?;
        let centroid = bounds.center();
        let mut radius = self.vertices
            .iter()
            .map(|v| v.loc_body().distance(&centroid))
            .fold(0.0, f64::max);
        for edge in &self.edges {
            if !edge.is_straight() {
                radius = radius.max(edge.centroid().distance(&centroid) + edge.centroid_radius());
            }
        }
        self.centroid_body = centroid;
        self.centroid_radius = radius;
        self.finished = true;
        Ok(())
    }

    /// Returns true once `finish` has been called
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Returns true if the boundary winds counter-clockwise
    pub fn is_counter_clockwise(&self) -> bool {
        self.counter_clockwise
    }

    /// Returns the enclosed area
    pub fn get_area(&self) -> f64 {
        self.area
    }

    /// Returns all vertices, decorated ones included
    pub fn get_vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    /// Returns all edges
    pub fn get_edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Returns an edge by index
    pub fn get_edge(&self, index: usize) -> Option<&Edge> {
        self.edges.get(index)
    }

    /// Returns the spacing of decorated vertices
    pub fn get_decoration_spacing(&self) -> f64 {
        self.decoration_spacing
    }

    /// Sets the spacing of decorated vertices; only allowed before `finish`
    pub fn set_decoration_spacing(&mut self, spacing: f64) -> Result<()> {
        self.check_not_finished()?;
        if !(spacing > 0.0) {
            return Err(PhysicsError::InvalidParameter(format!(
                "Decoration spacing must be positive, got {}", spacing
            )));
        }
        self.decoration_spacing = spacing;
        Ok(())
    }

    /// Returns the body's type
    pub fn get_body_type(&self) -> RigidBodyType {
        self.body_type
    }

    /// Returns true if the body can never be moved by forces or impulses
    pub fn has_infinite_mass(&self) -> bool {
        !self.mass.is_finite()
    }

    /// Returns the body's mass
    pub fn get_mass(&self) -> f64 {
        self.mass
    }

    /// Sets the body's mass; infinity turns the body into a fixed body
    pub fn set_mass(&mut self, mass: f64) -> Result<()> {
        if self.body_type == RigidBodyType::Scrim {
            return Err(PhysicsError::InvalidParameter("The scrim's mass cannot change".to_string()));
        }
        if !(mass > 0.0) {
            return Err(PhysicsError::InvalidParameter(format!(
                "Mass of {} must be positive, got {}", self.name, mass
            )));
        }
        self.mass = mass;
        if mass.is_finite() {
            self.body_type = RigidBodyType::Dynamic;
        } else {
            self.body_type = RigidBodyType::Fixed;
            self.velocity = Vector2::zero();
            self.angular_velocity = 0.0;
        }
        Ok(())
    }

    /// Returns the inverse of the mass, zero for infinite mass
    pub fn get_inverse_mass(&self) -> f64 {
        if self.has_infinite_mass() {
            0.0
        } else {
            1.0 / self.mass
        }
    }

    /// Returns the moment of inertia about the center of mass
    pub fn get_moment(&self) -> f64 {
        self.mass * self.moment_per_mass
    }

    /// Returns the inverse of the moment of inertia, zero for infinite mass
    pub fn get_inverse_moment(&self) -> f64 {
        if self.has_infinite_mass() || self.moment_per_mass <= 0.0 {
            0.0
        } else {
            1.0 / self.get_moment()
        }
    }

    /// Returns the moment of inertia divided by the mass
    pub fn get_moment_per_mass(&self) -> f64 {
        self.moment_per_mass
    }

    /// Sets the moment of inertia divided by the mass
    pub fn set_moment_per_mass(&mut self, moment_per_mass: f64) -> Result<()> {
        if !(moment_per_mass > 0.0) || !moment_per_mass.is_finite() {
            return Err(PhysicsError::InvalidParameter(format!(
                "Moment of {} must be positive, got {}", self.name, moment_per_mass
            )));
        }
        self.moment_per_mass = moment_per_mass;
        Ok(())
    }

    /// Returns the center of mass in body coordinates
    pub fn get_center_of_mass_body(&self) -> Vector2 {
        self.cm_body
    }

    /// Moves the center of mass within the body, keeping the body where it is in the world
    pub fn set_center_of_mass_body(&mut self, cm_body: Vector2) {
        let world = self.body_to_world(cm_body);
        self.cm_body = cm_body;
        self.transform = Transform::new(world, self.transform.angle);
    }

    /// Returns the body's transform
    pub fn get_transform(&self) -> Transform {
        self.transform
    }

    /// Returns the world position of the center of mass
    pub fn get_position(&self) -> Vector2 {
        self.transform.position
    }

    /// Moves the center of mass to `position`
    pub fn set_position(&mut self, position: Vector2) {
        self.transform = Transform::new(position, self.transform.angle);
    }

    /// Returns the body's angle in radians
    pub fn get_angle(&self) -> f64 {
        self.transform.angle
    }

    /// Sets the body's angle in radians
    pub fn set_angle(&mut self, angle: f64) {
        self.transform = Transform::new(self.transform.position, angle);
    }

    /// Sets position and angle together
    pub fn set_position_angle(&mut self, position: Vector2, angle: f64) {
        self.transform = Transform::new(position, angle);
    }

    /// Returns the velocity of the center of mass
    pub fn get_velocity(&self) -> Vector2 {
        self.velocity
    }

    /// Sets the velocity of the center of mass
    pub fn set_velocity(&mut self, velocity: Vector2) {
        self.velocity = velocity;
    }

    /// Returns the angular velocity
    pub fn get_angular_velocity(&self) -> f64 {
        self.angular_velocity
    }

    /// Sets the angular velocity
    pub fn set_angular_velocity(&mut self, angular_velocity: f64) {
        self.angular_velocity = angular_velocity;
    }

    /// Returns position, angle and velocities as one record
    pub fn get_state(&self) -> BodyState {
        BodyState {
            position: self.transform.position,
            angle: self.transform.angle,
            velocity: self.velocity,
            angular_velocity: self.angular_velocity,
        }
    }

    /// Restores position, angle and velocities from a record
    pub fn set_state(&mut self, state: &BodyState) {
        self.transform = Transform::new(state.position, state.angle);
        self.velocity = state.velocity;
        self.angular_velocity = state.angular_velocity;
    }

    /// Converts a body coordinates point to world coordinates
    pub fn body_to_world(&self, p_body: Vector2) -> Vector2 {
        self.transform.transform_point(p_body - self.cm_body)
    }

    /// Converts a world point to body coordinates
    pub fn world_to_body(&self, p_world: Vector2) -> Vector2 {
        self.cm_body + self.transform.inverse_transform_point(p_world)
    }

    /// Rotates a body coordinates vector into world coordinates
    pub fn rotate_body_to_world(&self, v_body: Vector2) -> Vector2 {
        self.transform.rotate_vector(v_body)
    }

    /// Rotates a world vector into body coordinates
    pub fn rotate_world_to_body(&self, v_world: Vector2) -> Vector2 {
        self.transform.inverse_rotate_vector(v_world)
    }

    /// Returns the world velocity of the body point currently at `p_world`
    pub fn get_velocity_at(&self, p_world: Vector2) -> Vector2 {
        self.velocity + (p_world - self.transform.position).perp() * self.angular_velocity
    }

    /// Records the current state so that later detection can tell what crossed what
    pub fn save_old_copy(&mut self) {
        self.old_copy = Some(self.get_state());
    }

    /// Returns the state saved by `save_old_copy`
    pub fn get_old_copy(&self) -> Option<&BodyState> {
        self.old_copy.as_ref()
    }

    /// Forgets the saved state
    pub fn erase_old_copy(&mut self) {
        self.old_copy = None;
    }

    /// Converts a body point to world coordinates at the saved state
    pub fn old_body_to_world(&self, p_body: Vector2) -> Option<Vector2> {
        self.old_copy.map(|old| {
            Transform::new(old.position, old.angle).transform_point(p_body - self.cm_body)
        })
    }

    /// Converts a world point to body coordinates at the saved state
    pub fn old_world_to_body(&self, p_world: Vector2) -> Option<Vector2> {
        self.old_copy.map(|old| {
            self.cm_body + Transform::new(old.position, old.angle).inverse_transform_point(p_world)
        })
    }

    /// Returns the kinetic energy of translation
    pub fn get_translational_energy(&self) -> f64 {
        if self.has_infinite_mass() {
            return 0.0;
        }
        0.5 * self.mass * self.velocity.length_squared()
    }

    /// Returns the kinetic energy of rotation
    pub fn get_rotational_energy(&self) -> f64 {
        if self.has_infinite_mass() {
            return 0.0;
        }
        0.5 * self.get_moment() * self.angular_velocity * self.angular_velocity
    }

    /// Returns the total kinetic energy
    pub fn get_kinetic_energy(&self) -> f64 {
        self.get_translational_energy() + self.get_rotational_energy()
    }

    /// Returns the body's material
    pub fn get_material(&self) -> &Material {
        &self.material
    }

    /// Sets the body's material
    pub fn set_material(&mut self, material: Material) {
        self.material = material;
    }

    /// Returns the elasticity used for collisions involving this body
    pub fn get_elasticity(&self) -> f64 {
        self.material.elasticity
    }

    /// Sets the elasticity used for collisions involving this body
    pub fn set_elasticity(&mut self, elasticity: f64) -> Result<()> {
        if !(0.0..=1.0).contains(&elasticity) {
            return Err(PhysicsError::InvalidParameter(format!(
                "Elasticity must be between 0 and 1, got {}", elasticity
            )));
        }
        self.material.elasticity = elasticity;
        Ok(())
    }

    /// Excludes `other` from collisions with this body
    pub fn add_non_collide_body(&mut self, other: BodyHandle) {
        if !self.non_collide_bodies.contains(&other) {
            self.non_collide_bodies.push(other);
        }
    }

    /// Allows `other` to collide with this body again
    pub fn remove_non_collide_body(&mut self, other: BodyHandle) {
        self.non_collide_bodies.retain(|&b| b != other);
    }

    /// Returns true if this body never collides with `other`
    pub fn does_not_collide(&self, other: BodyHandle) -> bool {
        self.non_collide_bodies.contains(&other)
    }

    /// Excludes one edge of another body from collisions with this body
    pub fn add_non_collide_edge(&mut self, other: BodyHandle, edge: usize) {
        if !self.non_collide_edges.contains(&(other, edge)) {
            self.non_collide_edges.push((other, edge));
        }
    }

    /// Returns true if this body never collides with the given edge of `other`
    pub fn non_collide_edge(&self, other: BodyHandle, edge: usize) -> bool {
        self.non_collide_edges.contains(&(other, edge))
    }

    /// Returns the collision group
    pub fn get_collision_group(&self) -> CollisionGroup {
        self.collision_group
    }

    /// Sets the collision group
    pub fn set_collision_group(&mut self, group: CollisionGroup) {
        self.collision_group = group;
    }

    /// Returns the collision mask
    pub fn get_collision_mask(&self) -> CollisionMask {
        self.collision_mask
    }

    /// Sets the collision mask
    pub fn set_collision_mask(&mut self, mask: CollisionMask) {
        self.collision_mask = mask;
    }

    /// Returns the center of the enclosing circle in world coordinates
    pub fn get_centroid_world(&self) -> Vector2 {
        self.body_to_world(self.centroid_body)
    }

    /// Returns the radius of the enclosing circle
    pub fn get_centroid_radius(&self) -> f64 {
        self.centroid_radius
    }

    /// Returns a world bounding box around the enclosing circle
    pub fn get_bounds_world(&self) -> Aabb {
        Aabb::from_circle(self.get_centroid_world(), self.centroid_radius)
    }
}
