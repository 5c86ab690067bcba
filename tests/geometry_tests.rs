use phys2d_engine::{
    Material, PhysicsWorld, Polygon, Vector2,
    error::PhysicsError,
    paths::{CirclePath, FlatPath, NumericalPath, OvalPath, ParabolaPath, PathPoint},
    shapes::Shapes,
};
use std::f64::consts::PI;
use std::sync::Arc;
use approx::assert_relative_eq;

#[test]
fn test_block_properties() {
    let block = Shapes::make_block(2.0, 1.0, "block").unwrap();

    assert!(block.is_finished());
    assert_eq!(block.get_edges().len(), 4);
    assert!(block.get_edges().iter().all(|e| e.is_straight()));
    assert_relative_eq!(block.get_area(), 2.0, epsilon = 1e-12);
    assert_relative_eq!(block.get_mass(), 2.0, epsilon = 1e-12);
    assert_relative_eq!(block.get_moment(), 2.0 * (4.0 + 1.0) / 12.0, epsilon = 1e-12);
    assert!(!block.has_infinite_mass());
}

#[test]
fn test_wall_has_infinite_mass() {
    let wall = Shapes::make_wall(10.0, 1.0, "floor").unwrap();
    assert!(wall.has_infinite_mass());
    assert_eq!(wall.get_inverse_mass(), 0.0);
    assert_eq!(wall.get_inverse_moment(), 0.0);
}

#[test]
fn test_invalid_shapes_are_rejected() {
    assert!(matches!(
        Shapes::make_block(0.0, 1.0, "flat"),
        Err(PhysicsError::InvalidParameter(_))
    ));
    assert!(matches!(
        Shapes::make_ball(-1.0, "ball"),
        Err(PhysicsError::InvalidParameter(_))
    ));
    assert!(Shapes::make_polygon(&[Vector2::zero(), Vector2::unit_x()], "line").is_err());
}

#[test]
fn test_ball_is_one_circular_edge() {
    let ball = Shapes::make_ball(0.5, "ball").unwrap();
    assert_eq!(ball.get_edges().len(), 1);
    assert!(ball.get_edges()[0].is_circular());
    assert_relative_eq!(ball.get_mass(), PI * 0.25, epsilon = 1e-9);
}

#[test]
fn test_body_to_world_round_trip() {
    let mut block = Shapes::make_block(1.0, 0.5, "block").unwrap();
    block.set_position_angle(Vector2::new(2.0, 3.0), PI / 2.0);

    // a quarter turn carries the corner (0.5, 0.25) to (-0.25, 0.5) around the center
    let corner = block.body_to_world(Vector2::new(0.5, 0.25));
    assert_relative_eq!(corner.x, 1.75, epsilon = 1e-12);
    assert_relative_eq!(corner.y, 3.5, epsilon = 1e-12);

    let back = block.world_to_body(corner);
    assert_relative_eq!(back.x, 0.5, epsilon = 1e-12);
    assert_relative_eq!(back.y, 0.25, epsilon = 1e-12);
}

#[test]
fn test_velocity_of_body_point() {
    let mut block = Shapes::make_block(1.0, 1.0, "block").unwrap();
    block.set_velocity(Vector2::new(1.0, 0.0));
    block.set_angular_velocity(2.0);

    // v + w x r with r = (0, 0.5)
    let v = block.get_velocity_at(Vector2::new(0.0, 0.5));
    assert_relative_eq!(v.x, 0.0, epsilon = 1e-12);
    assert_relative_eq!(v.y, 0.0, epsilon = 1e-12);
}

#[test]
fn test_block_resting_near_floor_makes_corner_contacts() {
    let mut world = PhysicsWorld::new();
    let mut floor = Shapes::make_wall(10.0, 1.0, "floor").unwrap();
    floor.set_position(Vector2::new(0.0, -0.5));
    let floor = world.add_body(floor).unwrap();

    let mut block = Shapes::make_block(1.0, 1.0, "block").unwrap();
    block.set_position(Vector2::new(0.0, 0.505));
    let block = world.add_body(block).unwrap();

    let mut collisions = Vec::new();
    let vars = phys2d_engine::integration::OdeSystem::get_vars(&world);
    let accuracy = world.get_config().get_accuracy();
    world.find_collisions(&mut collisions, &vars, accuracy).unwrap();

    assert_eq!(collisions.len(), 2);
    for c in &collisions {
        assert!(!c.joint);
        assert_eq!(c.body1, block);
        assert_eq!(c.body2, floor);
        assert_relative_eq!(c.distance, 0.005, epsilon = 1e-9);
        assert_relative_eq!(c.normal.y, 1.0, epsilon = 1e-9);
        assert!(c.is_touching(world.get_distance_tol()));
    }
}

#[test]
fn test_ball_near_floor_makes_one_contact() {
    let mut world = PhysicsWorld::new();
    let mut floor = Shapes::make_wall(10.0, 1.0, "floor").unwrap();
    floor.set_position(Vector2::new(0.0, -0.5));
    world.add_body(floor).unwrap();

    let mut ball = Shapes::make_ball(0.5, "ball").unwrap();
    ball.set_position(Vector2::new(1.0, 0.503));
    world.add_body(ball).unwrap();

    let mut collisions = Vec::new();
    let vars = phys2d_engine::integration::OdeSystem::get_vars(&world);
    world.find_collisions(&mut collisions, &vars, 0.006).unwrap();

    assert_eq!(collisions.len(), 1);
    let c = &collisions[0];
    assert_relative_eq!(c.distance, 0.003, epsilon = 1e-9);
    assert_relative_eq!(c.normal.y.abs(), 1.0, epsilon = 1e-9);
    assert_relative_eq!(c.impact1.x, 1.0, epsilon = 1e-9);
}

#[test]
fn test_separated_bodies_make_no_contacts() {
    let mut world = PhysicsWorld::new();
    let mut floor = Shapes::make_wall(10.0, 1.0, "floor").unwrap();
    floor.set_position(Vector2::new(0.0, -0.5));
    world.add_body(floor).unwrap();

    let mut block = Shapes::make_block(1.0, 1.0, "block").unwrap();
    block.set_position(Vector2::new(0.0, 2.0));
    world.add_body(block).unwrap();

    let mut collisions = Vec::new();
    let vars = phys2d_engine::integration::OdeSystem::get_vars(&world);
    world.find_collisions(&mut collisions, &vars, 0.006).unwrap();
    assert!(collisions.is_empty());
}

#[test]
fn test_path_global_and_local_search_agree() {
    let path = NumericalPath::new(&CirclePath::new(3.0)).unwrap();
    assert!(path.is_closed_loop());
    assert_relative_eq!(path.get_length(), 6.0 * PI, epsilon = 1e-3);

    // the circle starts at the bottom, so angle a lies at arc length 3 (a + PI/2)
    let angle: f64 = 0.7;
    let target = Vector2::from_angle(angle) * 3.5;
    let expected_p = 3.0 * (angle + PI / 2.0);

    let global = path.find_nearest_global(target);
    assert_relative_eq!(global.p, expected_p, epsilon = 0.01);

    // start the local search from a nearby estimate
    let mut local: PathPoint = path.find_nearest_global(Vector2::from_angle(angle - 0.05) * 3.0);
    path.find_nearest_local(target, &mut local);
    assert_relative_eq!(local.p, global.p, epsilon = 0.01);

    let nearest = local.get_point();
    let exact = Vector2::from_angle(angle) * 3.0;
    assert!(nearest.distance(&exact) < 1e-3);

    // the normal of a counter-clockwise circle points inwards
    let normal = local.get_normal();
    assert_relative_eq!(normal.dot(&Vector2::from_angle(angle)).abs(), 1.0, epsilon = 1e-3);
}

#[test]
fn test_open_path_extends_past_its_ends() {
    let path = NumericalPath::new(&FlatPath::new(-2.0, 2.0)).unwrap();
    assert!(!path.is_closed_loop());
    assert_relative_eq!(path.get_length(), 4.0, epsilon = 1e-9);

    let inside = path.find_nearest_global(Vector2::new(1.0, 0.3));
    assert_relative_eq!(inside.p, 3.0, epsilon = 1e-6);

    let mut ppt = inside;
    path.find_nearest_local(Vector2::new(1.5, -0.2), &mut ppt);
    assert_relative_eq!(ppt.p, 3.5, epsilon = 1e-6);

    // a point beyond the finish projects onto the straight extension
    let beyond = path.find_nearest_global(Vector2::new(3.0, 0.0));
    assert!(beyond.p > path.get_finish_p() - 1e-9);
}

#[test]
fn test_regular_polygon() {
    let hexagon = Shapes::make_regular_polygon(6, 1.0, "hexagon").unwrap();
    assert_eq!(hexagon.get_edges().len(), 6);
    assert!(hexagon.is_counter_clockwise());
    assert_relative_eq!(hexagon.get_area(), 1.5 * 3.0_f64.sqrt(), epsilon = 1e-9);

    assert!(Shapes::make_regular_polygon(2, 1.0, "line").is_err());
}

#[test]
fn test_oval_and_parabola_paths() {
    let oval = NumericalPath::new(&OvalPath::new(2.0, 1.0)).unwrap();
    assert!(oval.is_closed_loop());
    // Ramanujan's estimate of the perimeter
    let (a, b) = (2.0_f64, 1.0_f64);
    let perimeter = PI * (3.0 * (a + b) - ((3.0 * a + b) * (a + 3.0 * b)).sqrt());
    assert_relative_eq!(oval.get_length(), perimeter, epsilon = 1e-3);

    let parabola = NumericalPath::new(&ParabolaPath::new(0.5, 1.0)).unwrap();
    assert!(!parabola.is_closed_loop());
    assert_relative_eq!(parabola.get_length(), 2.0_f64.sqrt() + 1.0_f64.asinh(), epsilon = 1e-3);

    // halfway along the arc is the bottom of the bowl
    let middle = parabola.get_point(0.5 * (parabola.get_start_p() + parabola.get_finish_p()));
    assert!(middle.length() < 1e-3);
}

fn make_bowl() -> Polygon {
    let path = Arc::new(NumericalPath::new(&ParabolaPath::new(0.5, 1.0)).unwrap());
    let (start_p, finish_p) = (path.get_start_p(), path.get_finish_p());

    let mut bowl = Polygon::new("bowl");
    bowl.start_path(path.get_point(start_p)).unwrap();
    bowl.add_path_edge(path.clone(), start_p, finish_p).unwrap();
    bowl.add_straight_edge(Vector2::new(1.0, -1.0)).unwrap();
    bowl.add_straight_edge(Vector2::new(-1.0, -1.0)).unwrap();
    bowl.add_straight_edge(path.get_point(start_p)).unwrap();
    bowl.close_path().unwrap();
    bowl.finish().unwrap();
    bowl.set_mass(f64::INFINITY).unwrap();
    bowl
}

#[test]
fn test_polygon_with_path_edge() {
    let bowl = make_bowl();
    assert!(bowl.is_finished());
    assert!(!bowl.is_counter_clockwise());
    assert_eq!(bowl.get_edges().len(), 4);
    assert!(bowl.get_edges()[0].is_path());
    // area between y = -1 and y = x^2 / 2
    assert_relative_eq!(bowl.get_area(), 7.0 / 3.0, epsilon = 1e-3);

    // four corners plus points spread along the curved edge
    assert!(bowl.get_vertices().len() > 4);
}

#[test]
fn test_path_edge_must_start_at_current_vertex() {
    let path = Arc::new(NumericalPath::new(&FlatPath::new(-1.0, 1.0)).unwrap());
    let mut body = Polygon::new("bad");
    body.start_path(Vector2::new(0.0, 1.0)).unwrap();
    assert!(matches!(
        body.add_path_edge(path.clone(), path.get_start_p(), path.get_finish_p()),
        Err(PhysicsError::InvalidParameter(_))
    ));
}

#[test]
fn test_ball_resting_in_bowl_touches_curve() {
    let mut world = PhysicsWorld::new();
    world.add_body(make_bowl()).unwrap();

    let mut ball = Shapes::make_ball(0.5, "ball").unwrap();
    ball.set_position(Vector2::new(0.0, 0.503));
    world.add_body(ball).unwrap();

    let mut collisions = Vec::new();
    let vars = phys2d_engine::integration::OdeSystem::get_vars(&world);
    world.find_collisions(&mut collisions, &vars, 0.006).unwrap();

    assert!(!collisions.is_empty());
    for c in &collisions {
        assert!(!c.joint);
        assert!(c.distance > 0.0 && c.distance < world.get_distance_tol());
        assert!(c.normal.y.abs() > 0.95);
    }
}

#[test]
fn test_material_presets() {
    assert_eq!(Material::inelastic().elasticity, 0.0);
    assert_eq!(Material::perfectly_elastic().elasticity, 1.0);
    assert!(Material::rubber().elasticity > Material::wood().elasticity);

    let mut block = Shapes::make_block(1.0, 1.0, "block").unwrap();
    block.set_material(Material::wood());
    assert_relative_eq!(block.get_elasticity(), 0.3);
    assert!(block.set_elasticity(1.5).is_err());
}
