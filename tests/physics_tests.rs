use phys2d_engine::{
    BodyHandle, CollisionAdvance, PhysicsWorld, SimulationConfig, Vector2,
    constraints::{Joint, JointUtil},
    core::{AdvanceState, BodyEventType, CollisionEventType, CollisionHandling, IntegratorType},
    collision::{BroadPhaseType, CollisionGroup, CollisionMask, ContactOrder},
    error::PhysicsError,
    forces::{ConstantForceGenerator, DampingForce, GravityForce, SpringForce},
    integration::OdeSystem,
    shapes::Shapes,
};
use std::f64::consts::PI;
use approx::assert_relative_eq;

fn add_floor(world: &mut PhysicsWorld) -> BodyHandle {
    let mut floor = Shapes::make_wall(10.0, 1.0, "floor").unwrap();
    floor.set_position(Vector2::new(0.0, -0.5));
    world.add_body(floor).unwrap()
}

fn add_block(world: &mut PhysicsWorld, x: f64, y: f64) -> BodyHandle {
    let mut block = Shapes::make_block(1.0, 1.0, "block").unwrap();
    block.set_position(Vector2::new(x, y));
    world.add_body(block).unwrap()
}

#[test]
fn test_world_bookkeeping() {
    let mut world = PhysicsWorld::new();
    assert_eq!(world.body_count(), 0);
    assert!(world.get_body(BodyHandle::SCRIM).unwrap().has_infinite_mass());

    let block = add_block(&mut world, 0.0, 0.0);
    assert_eq!(world.body_count(), 1);
    assert_eq!(world.get_events().get_body_events_of_type(BodyEventType::Added).len(), 1);

    // one slot per body plus the scrim, then time
    assert_eq!(world.get_vars().len(), 6 * 2 + 1);

    world.remove_body(block).unwrap();
    assert_eq!(world.body_count(), 0);
    assert!(world.get_body(block).is_err());

    // removed slots are not reused
    let again = add_block(&mut world, 0.0, 0.0);
    assert_ne!(again, block);

    world.clear();
    assert_eq!(world.body_count(), 0);
    assert_eq!(world.get_time(), 0.0);
}

#[test]
fn test_invalid_config_is_rejected() {
    let config = SimulationConfig {
        distance_tol: -1.0,
        ..Default::default()
    };
    assert!(matches!(PhysicsWorld::with_config(config), Err(PhysicsError::InvalidParameter(_))));

    let config = SimulationConfig {
        collision_accuracy: 1.5,
        ..Default::default()
    };
    assert!(PhysicsWorld::with_config(config).is_err());
}

#[test]
fn test_set_vars_rejects_bad_state() {
    let mut world = PhysicsWorld::new();
    add_block(&mut world, 0.0, 0.0);

    let mut vars = world.get_vars();
    assert!(matches!(world.set_vars(&vars[1..]), Err(PhysicsError::InvalidParameter(_))));

    vars[6] = f64::NAN;
    assert!(matches!(world.set_vars(&vars), Err(PhysicsError::SimulationError(_))));
}

#[test]
fn test_free_fall() {
    let mut world = PhysicsWorld::new();
    let block = add_block(&mut world, 0.0, 10.0);
    world.add_force_generator(Box::new(GravityForce::new(9.8)));

    let mut sim = CollisionAdvance::new(world);
    assert_eq!(sim.integrator_name(), "RungeKutta");
    sim.run_until(1.0).unwrap();

    // Runge-Kutta is exact for constant acceleration
    let body = sim.world().get_body(block).unwrap();
    assert_relative_eq!(body.get_position().y, 10.0 - 4.9, epsilon = 1e-6);
    assert_relative_eq!(body.get_velocity().y, -9.8, epsilon = 1e-6);
    assert_relative_eq!(body.get_position().x, 0.0, epsilon = 1e-12);
    assert_eq!(sim.get_state(), AdvanceState::Advancing);
}

#[test]
fn test_euler_free_fall_lags() {
    let config = SimulationConfig {
        integrator: IntegratorType::Euler,
        ..Default::default()
    };
    let mut world = PhysicsWorld::with_config(config).unwrap();
    let block = add_block(&mut world, 0.0, 10.0);
    world.add_force_generator(Box::new(GravityForce::new(9.8)));

    let mut sim = CollisionAdvance::new(world);
    assert_eq!(sim.integrator_name(), "Euler");
    sim.run_until(1.0).unwrap();

    // forty steps of 0.025: y = 10 - g h^2 n (n - 1) / 2
    let body = sim.world().get_body(block).unwrap();
    assert_relative_eq!(body.get_position().y, 10.0 - 9.8 * 0.025 * 0.025 * 780.0, epsilon = 1e-9);
}

#[test]
fn test_spring_oscillator_conserves_energy() {
    let mut world = PhysicsWorld::new();
    let block = add_block(&mut world, 2.0, 0.0);
    let spring = SpringForce::new(block, Vector2::zero(), BodyHandle::SCRIM, Vector2::zero(), 1.0, 4.0).unwrap();
    world.add_force_generator(Box::new(spring));

    let initial = world.get_energy_info();
    assert_relative_eq!(initial.potential, 2.0, epsilon = 1e-12);
    assert_relative_eq!(initial.kinetic(), 0.0, epsilon = 1e-12);

    // unit mass and stiffness 4 give a period of PI
    let mut sim = CollisionAdvance::new(world);
    sim.run_until(PI).unwrap();

    let body = sim.world().get_body(block).unwrap();
    assert_relative_eq!(body.get_position().x, 2.0, epsilon = 1e-4);
    assert_relative_eq!(body.get_velocity().x, 0.0, epsilon = 1e-3);
    let energy = sim.world().get_energy_info();
    assert_relative_eq!(energy.total(), initial.total(), epsilon = 1e-4);
}

/// Hangs a 0.1 x 2 stick from its top end at the origin, released at 0.5 rad, and runs it
/// for 15 s checking both joints and the total energy after every step
fn run_pendulum(joint_small_impacts: bool) -> (PhysicsWorld, BodyHandle) {
    let mut world = PhysicsWorld::new();
    world.set_joint_small_impacts(joint_small_impacts);
    let angle: f64 = 0.5;
    let mut stick = Shapes::make_block(0.1, 2.0, "stick").unwrap();
    stick.set_position_angle(Vector2::new(angle.sin(), -angle.cos()), angle);
    let stick = world.add_body(stick).unwrap();

    let (h1, h2) = JointUtil::add_double_joint(&mut world, stick, Vector2::new(0.0, 1.0), BodyHandle::SCRIM, Vector2::zero()).unwrap();
    world.align_connectors().unwrap();
    world.add_force_generator(Box::new(GravityForce::new(9.8)));

    let initial = world.get_energy_info().total();
    let mut sim = CollisionAdvance::new(world);
    while sim.world().get_time() < 15.0 - 1e-9 {
        sim.step().unwrap();

        let world = sim.world();
        for h in [h1, h2] {
            let joint = world.get_connector_as::<Joint>(h).unwrap();
            let gap = joint.get_normal_distance(world.get_bodies()).unwrap();
            assert!(gap.abs() < 1e-4, "joint gap {} at t = {}", gap, world.get_time());
        }
        let energy = world.get_energy_info().total();
        assert!((energy - initial).abs() < 1e-3, "energy drifted to {} from {}", energy, initial);
    }
    (sim.into_world(), stick)
}

/// State of the stick after 15 s, from the reduced equation
/// theta'' = -g sin(theta) / (1 + (0.1^2 + 2^2) / 12) integrated with a fine step
fn assert_pendulum_final_state(world: &PhysicsWorld, stick: BodyHandle) {
    let body = world.get_body(stick).unwrap();
    assert_relative_eq!(body.get_angle(), -0.341530, epsilon = 2e-3);
    assert_relative_eq!(body.get_angular_velocity(), -0.974637, epsilon = 2e-3);
    assert_relative_eq!(body.get_position().x, -0.334930, epsilon = 2e-3);
    assert_relative_eq!(body.get_position().y, -0.942243, epsilon = 2e-3);
    assert_relative_eq!(body.get_velocity().x, -0.918345, epsilon = 2e-3);
    assert_relative_eq!(body.get_velocity().y, 0.326435, epsilon = 2e-3);
}

#[test]
fn test_pendulum_keeps_energy_and_joint() {
    let (world, stick) = run_pendulum(false);
    assert_relative_eq!(world.get_time(), 15.0, epsilon = 1e-9);
    assert_pendulum_final_state(&world, stick);
}

#[test]
fn test_pendulum_with_small_joint_impacts() {
    let (world, stick) = run_pendulum(true);
    assert_pendulum_final_state(&world, stick);
}

#[test]
fn test_block_rests_on_floor() {
    let mut world = PhysicsWorld::new();
    add_floor(&mut world);
    let block = add_block(&mut world, 0.0, 0.505);
    world.add_force_generator(Box::new(GravityForce::new(9.8)));
    let accuracy = world.get_config().get_accuracy();

    let mut sim = CollisionAdvance::new(world);
    while sim.world().get_time() < 2.0 - 1e-9 {
        sim.step().unwrap();
        let y = sim.world().get_body(block).unwrap().get_position().y;
        assert!(y > 0.5 - accuracy, "block sank to {}", y);
        assert!(y < 0.52, "block rose to {}", y);
    }
    let body = sim.world().get_body(block).unwrap();
    assert!(body.get_velocity().length() < 0.1);
    assert_relative_eq!(body.get_angle(), 0.0, epsilon = 1e-6);
    assert_eq!(sim.get_state(), AdvanceState::SettledInContact);
}

#[test]
fn test_spinning_ball_rests_on_floor() {
    let mut world = PhysicsWorld::new();
    add_floor(&mut world);
    let mut ball = Shapes::make_ball(0.5, "ball").unwrap();
    ball.set_position(Vector2::new(0.0, 0.505));
    ball.set_angular_velocity(20.0);
    let ball = world.add_body(ball).unwrap();
    world.add_force_generator(Box::new(GravityForce::new(9.8)));
    let accuracy = world.get_config().get_accuracy();

    // the spin of the impact point must not lighten the contact force
    let mut sim = CollisionAdvance::new(world);
    while sim.world().get_time() < 1.0 - 1e-9 {
        sim.step().unwrap();
        let y = sim.world().get_body(ball).unwrap().get_position().y;
        assert!(y > 0.5 - accuracy && y < 0.52, "ball at {} at t = {}", y, sim.world().get_time());
    }
    let body = sim.world().get_body(ball).unwrap();
    assert!(body.get_velocity().length() < 0.1);
    assert_relative_eq!(body.get_angular_velocity(), 20.0, epsilon = 1e-9);
}

#[test]
fn test_dropped_block_never_penetrates() {
    let mut world = PhysicsWorld::new();
    add_floor(&mut world);
    let block = add_block(&mut world, 0.0, 2.0);
    world.add_force_generator(Box::new(GravityForce::new(9.8)));
    world.set_elasticity(0.5).unwrap();

    let mut sim = CollisionAdvance::new(world);
    let mut impacts = 0;
    let mut bounced = false;
    while sim.world().get_time() < 2.0 - 1e-9 {
        sim.step().unwrap();
        impacts += sim
            .world_mut()
            .get_events_mut()
            .drain_collision_events()
            .into_iter()
            .filter(|e| e.event_type == CollisionEventType::Impulse && e.body_a == block)
            .count();
        bounced |= sim.world().get_body(block).unwrap().get_velocity().y > 1.0;

        let world = sim.world_mut();
        let mut collisions = Vec::new();
        let vars = world.get_vars();
        let accuracy = world.get_config().get_accuracy();
        world.find_collisions(&mut collisions, &vars, accuracy).unwrap();
        for c in collisions.iter().filter(|c| !c.joint) {
            assert!(c.distance >= 0.0, "penetration of {} at time {}", c.distance, c.time);
        }
    }

    assert!(impacts > 0);
    assert!(bounced);
    assert!(sim.get_stats().bisections > 0);
}

#[test]
fn test_linked_blocks_conserve_momentum() {
    let mut world = PhysicsWorld::new();
    let mut a = Shapes::make_block(1.0, 0.5, "a").unwrap();
    a.set_angular_velocity(1.0);
    let a = world.add_body(a).unwrap();
    let mut b = Shapes::make_block(1.0, 0.5, "b").unwrap();
    b.set_position(Vector2::new(1.0, 0.0));
    b.set_velocity(Vector2::new(0.0, 1.0));
    b.set_angular_velocity(1.0);
    let b = world.add_body(b).unwrap();

    let (h1, h2) = JointUtil::add_double_joint(&mut world, a, Vector2::new(0.5, 0.0), b, Vector2::new(-0.5, 0.0)).unwrap();

    let momentum = |world: &PhysicsWorld| {
        [a, b].iter().fold(Vector2::zero(), |sum, &h| {
            let body = world.get_body(h).unwrap();
            sum + body.get_velocity() * body.get_mass()
        })
    };
    let initial_momentum = momentum(&world);
    let initial_energy = world.get_energy_info().total();

    let mut sim = CollisionAdvance::new(world);
    while sim.world().get_time() < 3.0 - 1e-9 {
        sim.step().unwrap();

        let world = sim.world();
        for h in [h1, h2] {
            let joint = world.get_connector_as::<Joint>(h).unwrap();
            let gap = joint.get_normal_distance(world.get_bodies()).unwrap();
            assert!(gap.abs() < 1e-4, "joint gap {} at t = {}", gap, world.get_time());
        }
    }

    let world = sim.world();
    // no limits in play
    assert!(world.get_events().collision_events().all(|e| e.event_type != CollisionEventType::LimitReached));

    let p = momentum(world);
    assert_relative_eq!(p.x, initial_momentum.x, epsilon = 1e-6);
    assert_relative_eq!(p.y, initial_momentum.y, epsilon = 1e-6);
    let energy = world.get_energy_info().total();
    assert!((energy - initial_energy).abs() < 1e-3);

    // the initial velocities agree at the pin, so the pair turns as one body about its
    // center of mass, which drifts up at 0.5
    let body_a = world.get_body(a).unwrap();
    assert_relative_eq!(body_a.get_position().x, 0.994996, epsilon = 1e-3);
    assert_relative_eq!(body_a.get_position().y, 1.429440, epsilon = 1e-3);
    assert_relative_eq!(body_a.get_angle(), 3.0, epsilon = 1e-3);
    assert_relative_eq!(body_a.get_velocity().x, 0.070560, epsilon = 1e-3);
    assert_relative_eq!(body_a.get_velocity().y, 0.994996, epsilon = 1e-3);
    assert_relative_eq!(body_a.get_angular_velocity(), 1.0, epsilon = 1e-3);

    let body_b = world.get_body(b).unwrap();
    assert_relative_eq!(body_b.get_position().x, 0.005004, epsilon = 1e-3);
    assert_relative_eq!(body_b.get_position().y, 1.570560, epsilon = 1e-3);
    assert_relative_eq!(body_b.get_angle(), 3.0, epsilon = 1e-3);
    assert_relative_eq!(body_b.get_velocity().x, -0.070560, epsilon = 1e-3);
    assert_relative_eq!(body_b.get_velocity().y, 0.005004, epsilon = 1e-3);
    assert_relative_eq!(body_b.get_angular_velocity(), 1.0, epsilon = 1e-3);
}

#[test]
fn test_runs_are_deterministic() {
    let run = || {
        let config = SimulationConfig {
            contact_order: ContactOrder::Random,
            random_seed: 42,
            ..Default::default()
        };
        let mut world = PhysicsWorld::with_config(config).unwrap();
        add_floor(&mut world);
        let block = add_block(&mut world, 0.0, 1.5);
        world.get_body_mut(block).unwrap().set_angular_velocity(2.0);
        world.add_force_generator(Box::new(GravityForce::new(9.8)));

        let mut sim = CollisionAdvance::new(world);
        sim.run_until(1.5).unwrap();
        (sim.world().get_vars(), sim.get_stats())
    };

    let (vars1, stats1) = run();
    let (vars2, stats2) = run();
    assert_eq!(vars1, vars2);
    assert_eq!(stats1, stats2);
}

#[test]
fn test_advance_gives_up_after_iteration_limit() {
    let config = SimulationConfig {
        max_advance_iterations: 3,
        ..Default::default()
    };
    let mut world = PhysicsWorld::with_config(config).unwrap();
    add_floor(&mut world);
    let block = add_block(&mut world, 0.0, 0.63);
    world.get_body_mut(block).unwrap().set_velocity(Vector2::new(0.0, -2.0));

    // impact at t = 0.065: the first trial and the second half both overshoot
    let mut sim = CollisionAdvance::new(world);
    let result = sim.advance(0.1);
    assert!(matches!(result, Err(PhysicsError::UnresolvedCollision(_))));
}

#[test]
fn test_advance_gives_up_below_min_step() {
    let config = SimulationConfig {
        min_step_size: 0.04,
        ..Default::default()
    };
    let mut world = PhysicsWorld::with_config(config).unwrap();
    add_floor(&mut world);
    let block = add_block(&mut world, 0.0, 0.63);
    world.get_body_mut(block).unwrap().set_velocity(Vector2::new(0.0, -2.0));

    let mut sim = CollisionAdvance::new(world);
    let result = sim.advance(0.1);
    assert!(matches!(result, Err(PhysicsError::UnresolvedCollision(_))));

    // the world is left at the start of the failed trial
    assert!(sim.world().get_body(block).unwrap().get_position().y > 0.5);
}

#[test]
fn test_negative_time_step_is_rejected() {
    let mut sim = CollisionAdvance::new(PhysicsWorld::new());
    assert!(matches!(sim.advance(-0.1), Err(PhysicsError::InvalidParameter(_))));
    assert!(matches!(sim.advance(f64::NAN), Err(PhysicsError::InvalidParameter(_))));
}

#[test]
fn test_modified_euler_free_fall() {
    let config = SimulationConfig {
        integrator: IntegratorType::ModifiedEuler,
        ..Default::default()
    };
    let mut world = PhysicsWorld::with_config(config).unwrap();
    let block = add_block(&mut world, 0.0, 10.0);
    world.add_force_generator(Box::new(GravityForce::new(9.8)));

    let mut sim = CollisionAdvance::new(world);
    assert_eq!(sim.integrator_name(), "ModifiedEuler");
    sim.run_until(1.0).unwrap();

    // averaging both slopes is exact for constant acceleration
    let body = sim.world().get_body(block).unwrap();
    assert_relative_eq!(body.get_position().y, 10.0 - 4.9, epsilon = 1e-9);
    assert_relative_eq!(body.get_velocity().y, -9.8, epsilon = 1e-9);
}

#[test]
fn test_damping_slows_body() {
    let mut world = PhysicsWorld::new();
    let block = add_block(&mut world, 0.0, 0.0);
    world.get_body_mut(block).unwrap().set_velocity(Vector2::new(1.0, 0.0));
    world.get_body_mut(block).unwrap().set_angular_velocity(1.0);
    let mut damping = DampingForce::new(0.5, 0.0);
    damping.add_body(block);
    world.add_force_generator(Box::new(damping));

    let mut sim = CollisionAdvance::new(world);
    sim.run_until(1.0).unwrap();

    let body = sim.world().get_body(block).unwrap();
    assert_relative_eq!(body.get_velocity().x, (-0.5_f64).exp(), epsilon = 1e-6);
    // no angular damping
    assert_relative_eq!(body.get_angular_velocity(), 1.0, epsilon = 1e-12);
}

#[test]
fn test_thruster_accelerates_body() {
    let mut world = PhysicsWorld::new();
    let block = add_block(&mut world, 0.0, 0.0);
    let thruster = ConstantForceGenerator::new(block, Vector2::zero(), Vector2::new(1.0, 0.0));
    let index = world.add_force_generator(Box::new(thruster));

    let mut sim = CollisionAdvance::new(world);
    sim.run_until(1.0).unwrap();
    let body = sim.world().get_body(block).unwrap();
    assert_relative_eq!(body.get_position().x, 0.5, epsilon = 1e-9);
    assert_relative_eq!(body.get_velocity().x, 1.0, epsilon = 1e-9);
    assert_relative_eq!(body.get_angular_velocity(), 0.0, epsilon = 1e-12);

    // switched off, the body coasts
    sim.world_mut()
        .get_forces_mut()
        .get_mut(index)
        .unwrap()
        .as_any_mut()
        .downcast_mut::<ConstantForceGenerator>()
        .unwrap()
        .set_enabled(false);
    sim.run_until(2.0).unwrap();
    let body = sim.world().get_body(block).unwrap();
    assert_relative_eq!(body.get_position().x, 1.5, epsilon = 1e-9);
}

fn find(world: &mut PhysicsWorld) -> Vec<phys2d_engine::collision::RigidBodyCollision> {
    let mut out = Vec::new();
    let vars = world.get_vars();
    let accuracy = world.get_config().get_accuracy();
    world.find_collisions(&mut out, &vars, accuracy).unwrap();
    out
}

#[test]
fn test_sort_and_sweep_matches_brute_force() {
    let build = |broad_phase| {
        let config = SimulationConfig {
            broad_phase,
            ..Default::default()
        };
        let mut world = PhysicsWorld::with_config(config).unwrap();
        add_floor(&mut world);
        for i in 0..4 {
            add_block(&mut world, -3.0 + 2.0 * i as f64, 0.505);
        }
        // one block hovering out of reach
        add_block(&mut world, 0.0, 3.0);
        world
    };

    let brute = find(&mut build(BroadPhaseType::BruteForce));
    let sweep = find(&mut build(BroadPhaseType::SortAndSweep));
    assert_eq!(brute.len(), 8);
    assert_eq!(sweep.len(), brute.len());
    for c in &sweep {
        assert!(brute.iter().any(|b| {
            b.body1 == c.body1 && b.body2 == c.body2 && b.impact1.distance(&c.impact1) < 1e-12
        }));
    }
}

#[test]
fn test_collision_filters() {
    let mut world = PhysicsWorld::new();
    let floor = add_floor(&mut world);
    let block = add_block(&mut world, 0.0, 0.505);
    assert_eq!(find(&mut world).len(), 2);

    // the block only meets linkage bodies
    world.get_body_mut(block).unwrap().set_collision_mask(CollisionMask::LINKAGE);
    assert!(find(&mut world).is_empty());

    world.get_body_mut(floor).unwrap().set_collision_group(CollisionGroup::LINKAGE);
    world.get_body_mut(block).unwrap().set_collision_group(CollisionGroup::LINKAGE);
    assert_eq!(find(&mut world).len(), 2);

    world.add_non_collide(block, floor).unwrap();
    assert!(find(&mut world).is_empty());
}

#[test]
fn test_every_policy_stops_the_approach() {
    let policies = [
        CollisionHandling::Simultaneous,
        CollisionHandling::SerialSeparate,
        CollisionHandling::SerialSeparateLastPass,
        CollisionHandling::SerialGrouped,
        CollisionHandling::SerialGroupedLastPass,
    ];
    for policy in policies {
        let mut world = PhysicsWorld::new();
        world.set_collision_handling(policy);
        add_floor(&mut world);
        let block = add_block(&mut world, 0.0, 0.505);
        world.set_elasticity(0.5).unwrap();
        world.get_body_mut(block).unwrap().set_velocity(Vector2::new(0.0, -2.0));

        let mut collisions = find(&mut world);
        assert_eq!(collisions.len(), 2);
        let rounds = world.handle_collisions(&mut collisions).unwrap();
        assert!(rounds >= 1, "{:?}", policy);

        let small = world.get_config().small_impact_velocity;
        for c in &collisions {
            assert!(c.normal_velocity >= -small, "{:?}", policy);
            assert!(c.impulse > 0.0 || policy.is_serial());
        }
        let body = world.get_body(block).unwrap();
        assert!(body.get_velocity().y > 0.0, "{:?}", policy);

        if policy == CollisionHandling::Simultaneous {
            // both corners rebound together at half the approach speed
            assert_eq!(rounds, 1);
            assert_relative_eq!(body.get_velocity().y, 1.0, epsilon = 1e-9);
            assert_relative_eq!(body.get_angular_velocity(), 0.0, epsilon = 1e-9);
        }
    }
}
