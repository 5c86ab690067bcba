use phys2d_engine::{
    BodyHandle, CollisionAdvance, PhysicsWorld, Vector2,
    constraints::{Connector, Joint, JointUtil, NormalType, PathEndPoint, PathJoint},
    core::CollisionEventType,
    error::PhysicsError,
    forces::GravityForce,
    integration::OdeSystem,
    paths::{CirclePath, FlatPath, NumericalPath, ParabolaPath},
    shapes::Shapes,
};
use std::sync::Arc;
use approx::assert_relative_eq;

fn world_with_block(x: f64, y: f64) -> (PhysicsWorld, BodyHandle) {
    let mut world = PhysicsWorld::new();
    let mut block = Shapes::make_block(0.2, 0.2, "block").unwrap();
    block.set_position(Vector2::new(x, y));
    let handle = world.add_body(block).unwrap();
    (world, handle)
}

fn find(world: &mut PhysicsWorld) -> Vec<phys2d_engine::collision::RigidBodyCollision> {
    let mut out = Vec::new();
    let vars = world.get_vars();
    let accuracy = world.get_config().get_accuracy();
    world.find_collisions(&mut out, &vars, accuracy).unwrap();
    out
}

#[test]
fn test_joint_align_closes_the_gap() {
    let (mut world, block) = world_with_block(0.3, -1.0);
    let handle = JointUtil::add_single_joint(
        &mut world,
        block,
        Vector2::new(0.0, 1.0),
        BodyHandle::SCRIM,
        Vector2::zero(),
        Vector2::unit_x(),
        NormalType::World,
    )
    .unwrap();

    let joint = world.get_connector_as::<Joint>(handle).unwrap();
    assert_relative_eq!(joint.get_normal_distance(world.get_bodies()).unwrap(), 0.3, epsilon = 1e-12);

    world.align_connector(handle).unwrap();
    let joint = world.get_connector_as::<Joint>(handle).unwrap();
    assert_relative_eq!(joint.get_normal_distance(world.get_bodies()).unwrap(), 0.0, epsilon = 1e-12);
    assert_relative_eq!(world.get_body(block).unwrap().get_position().x, 0.0, epsilon = 1e-12);
}

#[test]
fn test_joint_records_come_first() {
    let (mut world, block) = world_with_block(0.0, 0.0);
    let mut floor = Shapes::make_wall(4.0, 1.0, "floor").unwrap();
    floor.set_position(Vector2::new(0.0, -0.603));
    world.add_body(floor).unwrap();
    JointUtil::add_double_joint(&mut world, block, Vector2::zero(), BodyHandle::SCRIM, Vector2::zero()).unwrap();

    let collisions = find(&mut world);
    assert!(collisions.len() > 2);
    assert!(collisions[0].joint);
    assert!(collisions[1].joint);
    assert!(collisions[2..].iter().all(|c| !c.joint));

    // the two joint normals are perpendicular
    assert_relative_eq!(collisions[0].normal.dot(&collisions[1].normal), 0.0, epsilon = 1e-12);
}

#[test]
fn test_connector_without_world_is_rejected() {
    let (world, block) = world_with_block(0.0, 0.0);
    let mut loose = Joint::new(
        block,
        Vector2::zero(),
        BodyHandle::SCRIM,
        Vector2::zero(),
        Vector2::unit_x(),
        NormalType::World,
    )
    .unwrap();

    let mut out = Vec::new();
    let result = loose.add_collision(&mut out, world.get_bodies(), 0.0, 0.006);
    assert!(matches!(result, Err(PhysicsError::ContractViolation(_))));
    assert!(out.is_empty());
}

#[test]
fn test_update_with_foreign_record_is_rejected() {
    let (mut world, block) = world_with_block(0.0, 0.0);
    let (h1, h2) = JointUtil::add_double_joint(&mut world, block, Vector2::zero(), BodyHandle::SCRIM, Vector2::zero()).unwrap();
    let mut first = world.get_connector_as::<Joint>(h1).unwrap().clone();
    let mut second = world.get_connector_as::<Joint>(h2).unwrap().clone();

    let mut out = Vec::new();
    first.add_collision(&mut out, world.get_bodies(), 0.0, 0.006).unwrap();
    assert_eq!(out.len(), 1);

    let result = second.update_collision(&mut out[0], world.get_bodies());
    assert!(matches!(result, Err(PhysicsError::ContractViolation(_))));

    // the joint that made the record may refresh it
    first.update_collision(&mut out[0], world.get_bodies()).unwrap();
}

#[test]
fn test_invalid_joints_are_rejected() {
    let (_, block) = world_with_block(0.0, 0.0);
    assert!(matches!(
        Joint::new(block, Vector2::zero(), BodyHandle::SCRIM, Vector2::zero(), Vector2::zero(), NormalType::World),
        Err(PhysicsError::InvalidParameter(_))
    ));
    assert!(matches!(
        Joint::new(block, Vector2::zero(), block, Vector2::zero(), Vector2::unit_x(), NormalType::World),
        Err(PhysicsError::InvalidParameter(_))
    ));
}

#[test]
fn test_removing_a_body_removes_its_connectors() {
    let (mut world, block) = world_with_block(0.0, 0.0);
    let (h1, _) = JointUtil::add_double_joint(&mut world, block, Vector2::zero(), BodyHandle::SCRIM, Vector2::zero()).unwrap();
    assert_eq!(world.connector_count(), 2);

    world.remove_body(block).unwrap();
    assert_eq!(world.connector_count(), 0);
    assert!(matches!(world.get_connector(h1), Err(PhysicsError::ResourceNotFound(_))));

    // the scrim stays
    assert!(matches!(world.remove_body(BodyHandle::SCRIM), Err(PhysicsError::InvalidParameter(_))));
}

#[test]
fn test_path_joint_moves_body_onto_path() {
    let (mut world, block) = world_with_block(2.5, 0.3);
    let path = Arc::new(NumericalPath::new(&CirclePath::new(2.0)).unwrap());
    let handle = JointUtil::attach_to_path(&mut world, path, block, Vector2::zero()).unwrap();

    let position = world.get_body(block).unwrap().get_position();
    assert_relative_eq!(position.length(), 2.0, epsilon = 1e-3);

    let collisions = find(&mut world);
    assert_eq!(collisions.len(), 1);
    assert!(collisions[0].joint);
    assert_eq!(collisions[0].get_connector(), Some(handle));
    assert!(collisions[0].distance.abs() < 1e-3);
}

#[test]
fn test_bead_stays_on_circle() {
    let (mut world, block) = world_with_block(2.0, 0.0);
    let path = Arc::new(NumericalPath::new(&CirclePath::new(2.0)).unwrap());
    let handle = JointUtil::attach_to_path(&mut world, path, block, Vector2::zero()).unwrap();

    let tangent = world.get_connector_as::<PathJoint>(handle).unwrap().get_path_point().get_tangent();
    world.get_body_mut(block).unwrap().set_velocity(tangent);

    let mut sim = CollisionAdvance::new(world);
    while sim.world().get_time() < 1.0 - 1e-9 {
        sim.step().unwrap();
        let r = sim.world().get_body(block).unwrap().get_position().length();
        assert!((r - 2.0).abs() < 1e-3, "bead at radius {} at t = {}", r, sim.world().get_time());
    }

    // the joint only turns the velocity
    let body = sim.world().get_body(block).unwrap();
    assert_relative_eq!(body.get_velocity().length(), 1.0, epsilon = 5e-3);
}

#[test]
fn test_block_slides_on_parabola() {
    let (mut world, block) = world_with_block(1.5, 2.25);
    let path = Arc::new(NumericalPath::new(&ParabolaPath::new(1.0, 2.0)).unwrap());
    JointUtil::attach_to_path(&mut world, path.clone(), block, Vector2::zero()).unwrap();
    world.add_force_generator(Box::new(GravityForce::new(9.8)));
    let initial = world.get_energy_info().total();

    let mut sim = CollisionAdvance::new(world);
    let mut lowest = f64::INFINITY;
    while sim.world().get_time() < 5.0 - 1e-9 {
        sim.step().unwrap();
        let p = sim.world().get_body(block).unwrap().get_position();
        let gap = (p - path.find_nearest_global(p).get_point()).length();
        assert!(gap < 5e-3, "block {} off the parabola at t = {}", gap, sim.world().get_time());
        lowest = lowest.min(p.y);
    }

    // it swings through the bottom without gaining or losing energy
    assert!(lowest < 0.05);
    let energy = sim.world().get_energy_info().total();
    assert!((energy - initial).abs() < 0.03, "energy {} from {}", energy, initial);
}

#[test]
fn test_end_point_reports_only_the_crossing() {
    let (mut world, block) = world_with_block(0.5, 0.0);
    let path = Arc::new(NumericalPath::new(&FlatPath::new(-5.0, 5.0)).unwrap());
    let limit = path.find_nearest_global(Vector2::new(1.0, 0.0)).p;
    world
        .add_connector(Box::new(PathEndPoint::new(path, block, Vector2::zero(), limit, true)))
        .unwrap();

    // nothing to compare with before a state is saved
    assert!(find(&mut world).is_empty());

    world.save_old_copies();
    world.get_body_mut(block).unwrap().set_position(Vector2::new(1.5, 0.0));
    let collisions = find(&mut world);
    assert_eq!(collisions.len(), 1);
    let c = &collisions[0];
    assert!(c.crossing);
    assert!(!c.joint);
    assert_eq!(c.body1, block);
    assert_eq!(c.body2, BodyHandle::SCRIM);
    assert_relative_eq!(c.distance, -0.5, epsilon = 1e-6);
    assert_relative_eq!(c.normal.x, -1.0, epsilon = 1e-6);

    // already past the limit: left alone
    world.save_old_copies();
    world.get_body_mut(block).unwrap().set_position(Vector2::new(2.0, 0.0));
    assert!(find(&mut world).is_empty());
}

#[test]
fn test_end_point_bounces_body_back() {
    let (mut world, block) = world_with_block(0.0, 0.0);
    let path = Arc::new(NumericalPath::new(&FlatPath::new(-5.0, 5.0)).unwrap());
    let limit = path.find_nearest_global(Vector2::new(1.0, 0.0)).p;
    world
        .add_connector(Box::new(PathEndPoint::new(path, block, Vector2::zero(), limit, true)))
        .unwrap();
    world.get_body_mut(block).unwrap().set_velocity(Vector2::new(2.0, 0.0));

    let mut sim = CollisionAdvance::new(world);
    let mut limits_reached = 0;
    while sim.world().get_time() < 1.0 - 1e-9 {
        sim.step().unwrap();
        limits_reached += sim
            .world()
            .get_events()
            .get_collision_events_for_body(block)
            .iter()
            .filter(|e| e.event_type == CollisionEventType::LimitReached)
            .count();
    }

    assert_eq!(limits_reached, 1);
    let body = sim.world().get_body(block).unwrap();
    assert_relative_eq!(body.get_velocity().x, -2.0, epsilon = 1e-6);
    assert!(body.get_position().x.abs() < 0.02);
}
