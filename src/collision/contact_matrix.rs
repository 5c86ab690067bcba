use crate::bodies::Polygon;
use crate::collision::RigidBodyCollision;
use crate::core::{BodyHandle, BodyStorage, ExtraAccel, SimulationConfig};
use crate::math::Vector2;
use crate::Result;

use nalgebra::{DMatrix, DVector};

/// Linear and angular acceleration of a body's center of mass
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BodyAccel {
    /// Acceleration of the center of mass
    pub linear: Vector2,

    /// Angular acceleration
    pub angular: f64,
}

/// Sign of a unit force of collision `c` on `body`: +1 on body1, -1 on body2, 0 otherwise
fn side(c: &RigidBodyCollision, body: BodyHandle) -> f64 {
    if c.body1 == body {
        1.0
    } else if c.body2 == body {
        -1.0
    } else {
        0.0
    }
}

/// Lever arm of collision `c` on `body`
fn lever(c: &RigidBodyCollision, body: BodyHandle, polygon: &Polygon) -> Vector2 {
    if c.body1 == body {
        c.get_r1(polygon)
    } else {
        c.get_r2(polygon)
    }
}

/// Builds the matrix whose entry `(i, j)` is the normal acceleration at contact `i` caused by
/// a unit force at contact `j`
pub fn build_matrix(collisions: &[RigidBodyCollision], bodies: &BodyStorage<Polygon>) -> Result<DMatrix<f64>> {
    let n = collisions.len();
    let mut a = DMatrix::zeros(n, n);
    for i in 0..n {
        let ci = &collisions[i];
        for j in 0..n {
            let cj = &collisions[j];
            let mut value = 0.0;
            for body in [ci.body1, ci.body2] {
                let si = side(ci, body);
                let sj = side(cj, body);
                if sj == 0.0 {
                    continue;
                }
                let polygon = bodies.get_body(body)?;
                let inv_mass = polygon.get_inverse_mass();
                if inv_mass == 0.0 {
                    continue;
                }
                let ri = lever(ci, body, polygon);
                let rj = lever(cj, body, polygon);
                value += si * sj * (ci.normal.dot(&cj.normal) * inv_mass
                    + ri.cross(&ci.normal) * rj.cross(&cj.normal) * polygon.get_inverse_moment());
            }
            a[(i, j)] = value;
        }
    }
    Ok(a)
}

/// Acceleration of the body point at lever arm `r`
fn point_accel(polygon: &Polygon, accel: &BodyAccel, r: Vector2) -> Vector2 {
    let w = polygon.get_angular_velocity();
    // a_p = a_cm + alpha x r - w^2 r
    accel.linear + r.perp() * accel.angular - r * (w * w)
}

fn accel_of(accels: &[BodyAccel], body: BodyHandle) -> BodyAccel {
    accels.get(body.index()).copied().unwrap_or_default()
}

/// Builds the normal accelerations at each contact with no contact forces, including the
/// correction asked for by the extra acceleration policy
pub fn build_force_rhs(
    collisions: &[RigidBodyCollision],
    bodies: &BodyStorage<Polygon>,
    accels: &[BodyAccel],
    config: &SimulationConfig,
    time_step: f64,
) -> Result<DVector<f64>> {
    let h = config.time_step.max(time_step);
    let mut b = DVector::zeros(collisions.len());
    for (i, c) in collisions.iter().enumerate() {
        let body1 = bodies.get_body(c.body1)?;
        let body2 = bodies.get_body(c.body2)?;
        let r1 = c.get_r1(body1);
        let r2 = c.get_r2(body2);
        let a1 = point_accel(body1, &accel_of(accels, c.body1), r1);
        let a2 = point_accel(body2, &accel_of(accels, c.body2), r2);
        let v1 = body1.get_velocity_at(c.impact1);
        let v2 = body2.get_velocity_at(c.get_impact2());
        let v_rel = v1 - v2;
        let mut value = c.normal.dot(&(a1 - a2))
            + 2.0 * c.normal_dt.dot(&v_rel)
            + c.normal_slide.dot(&v_rel)
            + c.curvature_accel;

        if uses_correction(c, config.extra_accel) {
            value += c.normal_velocity / h;
            if config.extra_accel.corrects_distance() {
                let target = if c.joint { 0.0 } else { c.target_gap };
                value += (c.distance - target) / (h * h);
            }
        }
        b[i] = value;
    }
    Ok(b)
}

/// Builds the normal velocities the impulses must cancel. Rows flagged in `bounce` keep
/// `elasticity` of their approach speed as rebound.
pub fn build_impulse_rhs(collisions: &[RigidBodyCollision], bounce: &[bool]) -> DVector<f64> {
    DVector::from_fn(collisions.len(), |i, _| {
        let c = &collisions[i];
        if !c.joint && bounce.get(i).copied().unwrap_or(false) {
            (1.0 + c.elasticity) * c.normal_velocity
        } else {
            c.normal_velocity
        }
    })
}

/// Elasticity for an impact: slow impacts do not bounce
pub fn effective_elasticity(c: &RigidBodyCollision, config: &SimulationConfig) -> f64 {
    if c.normal_velocity.abs() < config.restitution_velocity_threshold {
        0.0
    } else {
        c.elasticity
    }
}

/// Applies impulse `j` along the normal of `c`: body1 is pushed along the normal, body2 the
/// other way
pub fn apply_impulse(c: &RigidBodyCollision, j: f64, bodies: &mut BodyStorage<Polygon>) -> Result<()> {
    for (handle, sign) in [(c.body1, 1.0), (c.body2, -1.0)] {
        let body = bodies.get_body_mut(handle)?;
        if body.has_infinite_mass() {
            continue;
        }
        let r = lever(c, handle, body);
        let impulse = c.normal * (sign * j);
        body.set_velocity(body.get_velocity() + impulse * body.get_inverse_mass());
        body.set_angular_velocity(body.get_angular_velocity() + r.cross(&impulse) * body.get_inverse_moment());
    }
    Ok(())
}

/// True if the policy adds correction terms for this record
pub fn uses_correction(c: &RigidBodyCollision, policy: ExtraAccel) -> bool {
    policy.corrects_velocity() && (!c.joint || policy.includes_joints())
}
