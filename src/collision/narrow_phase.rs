use crate::bodies::Polygon;
use crate::collision::{CollisionKind, RigidBodyCollision};
use crate::core::{BodyHandle, SimulationConfig};
use crate::math::{Vector2, EPSILON};
use crate::shapes::{CircularEdge, Edge, StraightEdge};

use tracing::trace;

/// Trait for narrow-phase collision detection algorithms
pub trait NarrowPhase: Send + Sync {
    /// Appends every contact between the two bodies to `out`
    fn detect_pair(
        &self,
        pair: (BodyHandle, &Polygon),
        other: (BodyHandle, &Polygon),
        time: f64,
        config: &SimulationConfig,
        out: &mut Vec<RigidBodyCollision>,
    );
}

/// Narrow phase over polygon boundaries.
///
/// Corners are tested against edges in both directions. Pairs of arcs and arcs against
/// straight edges are solved exactly, since a smooth curve has no corner to find.
#[derive(Debug, Default, Clone, Copy)]
pub struct EdgeNarrowPhase;

impl EdgeNarrowPhase {
    /// Creates a new edge narrow phase
    pub fn new() -> Self {
        Self
    }
}

impl NarrowPhase for EdgeNarrowPhase {
    fn detect_pair(
        &self,
        pair: (BodyHandle, &Polygon),
        other: (BodyHandle, &Polygon),
        time: f64,
        config: &SimulationConfig,
        out: &mut Vec<RigidBodyCollision>,
    ) {
        let reach = pair.1.get_centroid_radius() + other.1.get_centroid_radius() + config.distance_tol;
        if pair.1.get_centroid_world().distance(&other.1.get_centroid_world()) > reach {
            return;
        }
        corners_against_edges(pair, other, time, config, out);
        corners_against_edges(other, pair, time, config, out);
        curved_edges(pair, other, time, config, out);
        curved_edges(other, pair, time, config, out);
    }
}

/// Distance filter shared by every test: far contacts are ignored, and a deep overlap only
/// counts when the surfaces were apart at the saved state.
fn accept_distance(distance: f64, old_distance: Option<f64>, distance_tol: f64) -> bool {
    if distance >= distance_tol {
        return false;
    }
    if distance > -distance_tol {
        return true;
    }
    matches!(old_distance, Some(d) if d >= 0.0)
}

/// World position of a body point at the saved state, or now when there is no saved state
fn old_world(body: &Polygon, p_body: Vector2) -> Vector2 {
    body.old_body_to_world(p_body)
        .unwrap_or_else(|| body.body_to_world(p_body))
}

/// Body coordinates of a world point at the saved state, or now when there is no saved state
fn old_body(body: &Polygon, p_world: Vector2) -> Vector2 {
    body.old_world_to_body(p_world)
        .unwrap_or_else(|| body.world_to_body(p_world))
}

fn has_history(body1: &Polygon, body2: &Polygon) -> bool {
    body1.get_old_copy().is_some() || body2.get_old_copy().is_some()
}

fn finish_collision(
    c: &mut RigidBodyCollision,
    body1: &Polygon,
    body2: &Polygon,
    config: &SimulationConfig,
) {
    c.elasticity = body1.get_elasticity().min(body2.get_elasticity());
    c.target_gap = config.get_target_gap();
    c.update_velocity(body1, body2);
}

/// Tests every vertex of body1 against every edge of body2
fn corners_against_edges(
    (h1, body1): (BodyHandle, &Polygon),
    (h2, body2): (BodyHandle, &Polygon),
    time: f64,
    config: &SimulationConfig,
    out: &mut Vec<RigidBodyCollision>,
) {
    let tol = config.distance_tol;
    let centroid2 = body2.get_centroid_world();
    let radius2 = body2.get_centroid_radius() + tol;

    for (vi, vertex) in body1.get_vertices().iter().enumerate() {
        // arcs meet arcs and straight edges exactly; their samples, and the seam where a
        // full circle closes on itself, only matter against paths
        let circular = vertex
            .get_edge1()
            .and_then(|e| body1.get_edge(e))
            .map_or(false, |e| e.is_circular());
        let seam = vertex.is_end_point() && vertex.get_edge1().is_some() && vertex.get_edge1() == vertex.get_edge2();
        let on_arc = circular && (!vertex.is_end_point() || seam);

        let w = body1.body_to_world(vertex.loc_body());
        if w.distance(&centroid2) > radius2 {
            continue;
        }
        let q = body2.world_to_body(w);

        for (ei, edge) in body2.get_edges().iter().enumerate() {
            if on_arc && !edge.is_path() {
                continue;
            }
            if body1.non_collide_edge(h2, ei) {
                continue;
            }
            if q.distance(&edge.centroid()) > edge.centroid_radius() + tol {
                continue;
            }
            let sp = match edge.surface_point(q) {
                Some(sp) => sp,
                None => continue,
            };

            let old_distance = if has_history(body1, body2) {
                let q_old = old_body(body2, old_world(body1, vertex.loc_body()));
                if edge.intersects_motion(q_old, q) {
                    Some(0.0)
                } else {
                    None
                }
            } else {
                None
            };
            if !accept_distance(sp.distance, old_distance, tol) {
                continue;
            }

            let normal = body2.rotate_body_to_world(sp.normal);
            let tangent = body2.rotate_body_to_world(sp.tangent);
            let normal_dp = body2.rotate_body_to_world(sp.normal_dp);
            let v_rel = body1.get_velocity_at(w) - body2.get_velocity_at(w);

            let mut c = RigidBodyCollision::new(CollisionKind::CornerEdge { vertex: vi, edge: ei }, h1, h2, false, time);
            c.impact1 = w;
            c.impact2 = Some(body2.body_to_world(sp.point));
            c.normal = normal;
            c.distance = sp.distance;
            c.normal_dt = normal.perp() * body2.get_angular_velocity();
            c.normal_slide = normal_dp * tangent.dot(&v_rel);
            finish_collision(&mut c, body1, body2, config);
            trace!(body1 = body1.get_name(), body2 = body2.get_name(), vertex = vi, edge = ei, distance = c.distance, "corner contact");
            out.push(c);
        }
    }
}

/// Exact tests for arcs of body1 against arcs and straight edges of body2
fn curved_edges(
    (h1, body1): (BodyHandle, &Polygon),
    (h2, body2): (BodyHandle, &Polygon),
    time: f64,
    config: &SimulationConfig,
    out: &mut Vec<RigidBodyCollision>,
) {
    for (i1, e1) in body1.get_edges().iter().enumerate() {
        let arc1 = match e1 {
            Edge::Circular(arc) => arc,
            _ => continue,
        };
        for (i2, e2) in body2.get_edges().iter().enumerate() {
            if body1.non_collide_edge(h2, i2) || body2.non_collide_edge(h1, i1) {
                continue;
            }
            let kind = CollisionKind::EdgeEdge { edge1: i1, edge2: i2 };
            let found = match e2 {
                // each pair of arcs is visited from both sides; keep one visit
                Edge::Circular(arc2) if h1 < h2 => circle_circle(kind, (h1, body1, arc1), (h2, body2, arc2), time, config),
                Edge::Straight(line) => circle_straight(kind, (h1, body1, arc1), (h2, body2, line), time, config),
                _ => None,
            };
            if let Some(c) = found {
                trace!(body1 = body1.get_name(), body2 = body2.get_name(), edge1 = i1, edge2 = i2, distance = c.distance, "edge contact");
                out.push(c);
            }
        }
    }
}

/// Geometry of an arc pair: signed distance, unit normal from body2 towards body1, and the
/// sign relating the normal to the direction between the centers
fn arc_pair_geometry(arc1: &CircularEdge, arc2: &CircularEdge, c1: Vector2, c2: Vector2) -> Option<(f64, Vector2, f64)> {
    let between = c1 - c2;
    let len = between.length();
    if len < EPSILON {
        return None;
    }
    let u = between / len;
    let (r1, r2) = (arc1.get_radius(), arc2.get_radius());
    match (arc1.is_convex(), arc2.is_convex()) {
        (true, true) => Some((len - r1 - r2, u, 1.0)),
        // body1's arc rolls inside body2's hollow
        (true, false) => Some((r2 - len - r1, -u, -1.0)),
        // body2's arc rolls inside body1's hollow
        (false, true) => Some((r1 - len - r2, -u, -1.0)),
        (false, false) => None,
    }
}

fn circle_circle(
    kind: CollisionKind,
    (h1, body1, arc1): (BodyHandle, &Polygon, &CircularEdge),
    (h2, body2, arc2): (BodyHandle, &Polygon, &CircularEdge),
    time: f64,
    config: &SimulationConfig,
) -> Option<RigidBodyCollision> {
    let c1 = body1.body_to_world(arc1.get_center());
    let c2 = body2.body_to_world(arc2.get_center());
    let (distance, normal, sign) = arc_pair_geometry(arc1, arc2, c1, c2)?;
    if distance >= config.distance_tol {
        return None;
    }

    // contact points lie on the line of centers
    let impact1 = if arc1.is_convex() {
        c1 - normal * arc1.get_radius()
    } else {
        c1 + normal * arc1.get_radius()
    };
    let impact2 = c2 + normal * arc2.get_radius() * if arc2.is_convex() { 1.0 } else { -1.0 };
    if !arc1.contains_direction(body1.world_to_body(impact1))
        || !arc2.contains_direction(body2.world_to_body(impact2))
    {
        return None;
    }

    let old_distance = if has_history(body1, body2) {
        let o1 = old_world(body1, arc1.get_center());
        let o2 = old_world(body2, arc2.get_center());
        arc_pair_geometry(arc1, arc2, o1, o2).map(|(d, _, _)| d)
    } else {
        None
    };
    if !accept_distance(distance, old_distance, config.distance_tol) {
        return None;
    }

    let len = (c1 - c2).length();
    let dv = body1.get_velocity_at(c1) - body2.get_velocity_at(c2);
    let sideways = dv - normal * dv.dot(&normal);
    let (w1, w2) = (body1.get_angular_velocity(), body2.get_angular_velocity());
    let mut c = RigidBodyCollision::new(kind, h1, h2, false, time);
    c.impact1 = impact1;
    c.impact2 = Some(impact2);
    c.normal = normal;
    c.distance = distance;
    // d'' = n.(a_c1 - a_c2) + sign |dv_t|^2 / len, less the spin terms of the impact points
    c.curvature_accel = sign * sideways.length_squared() / len
        + w1 * w1 * normal.dot(&(impact1 - c1))
        - w2 * w2 * normal.dot(&(impact2 - c2));
    finish_collision(&mut c, body1, body2, config);
    Some(c)
}

fn circle_straight(
    kind: CollisionKind,
    (h1, body1, arc): (BodyHandle, &Polygon, &CircularEdge),
    (h2, body2, line): (BodyHandle, &Polygon, &StraightEdge),
    time: f64,
    config: &SimulationConfig,
) -> Option<RigidBodyCollision> {
    if !arc.is_convex() {
        return None;
    }
    let r = arc.get_radius();
    let center = body1.body_to_world(arc.get_center());
    let center2 = body2.world_to_body(center);
    let distance = line.distance_to_line(center2) - r;
    if distance >= config.distance_tol {
        return None;
    }

    let normal_body2 = line.get_normal();
    let touch2 = center2 - normal_body2 * r;
    line.distance_to_point(touch2)?;
    let normal = body2.rotate_body_to_world(normal_body2);
    let impact1 = center - normal * r;
    if !arc.contains_direction(body1.world_to_body(impact1)) {
        return None;
    }

    let old_distance = if has_history(body1, body2) {
        let old_center = old_body(body2, old_world(body1, arc.get_center()));
        Some(line.distance_to_line(old_center) - r)
    } else {
        None
    };
    if !accept_distance(distance, old_distance, config.distance_tol) {
        return None;
    }

    let mut c = RigidBodyCollision::new(kind, h1, h2, false, time);
    c.impact1 = impact1;
    c.impact2 = Some(impact1 - normal * distance);
    c.normal = normal;
    c.distance = distance;
    c.normal_dt = normal.perp() * body2.get_angular_velocity();
    // the impact point on the arc is not fixed in body1
    let (w1, w2) = (body1.get_angular_velocity(), body2.get_angular_velocity());
    c.curvature_accel = -r * (w1 - w2) * (w1 - w2) - w2 * w2 * distance;
    finish_collision(&mut c, body1, body2, config);
    Some(c)
}
