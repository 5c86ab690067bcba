use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use phys2d_engine::{
    BodyHandle, CollisionAdvance, PhysicsWorld, Vector2,
    collision::{ComputeForces, ContactOrder, ContactSolver, GaussSeidelSolver},
    constraints::JointUtil,
    forces::GravityForce,
    shapes::Shapes,
};
use nalgebra::{DMatrix, DVector};
use rand::{rngs::StdRng, Rng, SeedableRng};

// A hanging chain of sticks pinned end to end
fn build_chain(links: usize) -> PhysicsWorld {
    let mut world = PhysicsWorld::new();
    let mut previous = BodyHandle::SCRIM;
    let mut previous_attach = Vector2::zero();

    for i in 0..links {
        let mut stick = Shapes::make_block(1.0, 0.1, "link").unwrap();
        stick.set_position(Vector2::new(0.5 + i as f64, 0.0));
        let handle = world.add_body(stick).unwrap();
        JointUtil::add_double_joint(&mut world, handle, Vector2::new(-0.5, 0.0), previous, previous_attach).unwrap();
        previous = handle;
        previous_attach = Vector2::new(0.5, 0.0);
    }
    world.add_force_generator(Box::new(GravityForce::new(9.8)));
    world
}

// A row of blocks resting on a floor
fn build_row(blocks: usize) -> PhysicsWorld {
    let mut world = PhysicsWorld::new();
    let mut floor = Shapes::make_wall(2.0 * blocks as f64 + 2.0, 1.0, "floor").unwrap();
    floor.set_position(Vector2::new(0.0, -0.5));
    world.add_body(floor).unwrap();

    for i in 0..blocks {
        let mut block = Shapes::make_block(1.0, 1.0, "block").unwrap();
        block.set_position(Vector2::new(2.0 * i as f64 - blocks as f64 + 1.0, 0.505));
        world.add_body(block).unwrap();
    }
    world.add_force_generator(Box::new(GravityForce::new(9.8)));
    world
}

fn bench_chain(c: &mut Criterion) {
    let mut group = c.benchmark_group("pendulum_chain");
    group.sample_size(10);

    for links in [1, 4, 8].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(links), links, |b, &n| {
            b.iter(|| {
                let mut sim = CollisionAdvance::new(build_chain(black_box(n)));
                sim.run_until(0.5).unwrap();
            });
        });
    }
    group.finish();
}

fn bench_resting_row(c: &mut Criterion) {
    let mut group = c.benchmark_group("resting_row");
    group.sample_size(10);

    for blocks in [1, 5, 10].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(blocks), blocks, |b, &n| {
            b.iter(|| {
                let mut sim = CollisionAdvance::new(build_row(black_box(n)));
                sim.run_until(0.5).unwrap();
            });
        });
    }
    group.finish();
}

// Random positive definite system, as a set of contacts would produce
fn contact_system(n: usize, seed: u64) -> (DMatrix<f64>, DVector<f64>) {
    let mut rng = StdRng::seed_from_u64(seed);
    let j = DMatrix::from_fn(n, n + 3, |_, _| rng.gen_range(-1.0..1.0));
    let a = &j * j.transpose() + DMatrix::identity(n, n) * 0.1;
    let b = DVector::from_fn(n, |_, _| rng.gen_range(-1.0..0.5));
    (a, b)
}

fn bench_solvers(c: &mut Criterion) {
    let mut group = c.benchmark_group("contact_solver");

    for n in [4, 16, 48].iter() {
        let (a, b) = contact_system(*n, 1);
        let joint = vec![false; *n];

        group.bench_with_input(BenchmarkId::new("compute_forces", n), n, |bench, _| {
            let mut solver = ComputeForces::new(ContactOrder::Natural);
            let mut rng = StdRng::seed_from_u64(0);
            bench.iter(|| solver.solve(black_box(&a), black_box(&b), &joint, &mut rng).unwrap());
        });
        group.bench_with_input(BenchmarkId::new("gauss_seidel", n), n, |bench, _| {
            let mut solver = GaussSeidelSolver::new(200);
            let mut rng = StdRng::seed_from_u64(0);
            bench.iter(|| solver.solve(black_box(&a), black_box(&b), &joint, &mut rng).unwrap());
        });
    }
    group.finish();
}

criterion_group!(benches, bench_chain, bench_resting_row, bench_solvers);
criterion_main!(benches);
