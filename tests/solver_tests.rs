use phys2d_engine::{
    collision::{ComputeForces, ContactOrder, ContactSolver, GaussSeidelSolver, solve_with_perturbation},
    error::PhysicsError,
};
use nalgebra::{DMatrix, DVector};
use rand::{rngs::StdRng, SeedableRng};
use approx::assert_relative_eq;

fn rng() -> StdRng {
    StdRng::seed_from_u64(7)
}

#[test]
fn test_two_pushing_contacts_share_the_load() {
    let a = DMatrix::from_row_slice(2, 2, &[2.0, 1.0, 1.0, 2.0]);
    let b = DVector::from_vec(vec![-1.0, -1.0]);
    let mut solver = ComputeForces::new(ContactOrder::Natural);

    let f = solver.solve(&a, &b, &[false, false], &mut rng()).unwrap();
    assert_relative_eq!(f[0], 1.0 / 3.0, epsilon = 1e-9);
    assert_relative_eq!(f[1], 1.0 / 3.0, epsilon = 1e-9);

    // both contacts end at rest
    let acc = &a * &f + &b;
    assert_relative_eq!(acc[0], 0.0, epsilon = 1e-9);
    assert_relative_eq!(acc[1], 0.0, epsilon = 1e-9);
}

#[test]
fn test_separating_contact_gets_no_force() {
    let a = DMatrix::from_row_slice(2, 2, &[2.0, 1.0, 1.0, 2.0]);
    let b = DVector::from_vec(vec![-1.0, 1.0]);
    let mut solver = ComputeForces::new(ContactOrder::Natural);

    let f = solver.solve(&a, &b, &[false, false], &mut rng()).unwrap();
    assert_relative_eq!(f[0], 0.5, epsilon = 1e-9);
    assert_relative_eq!(f[1], 0.0, epsilon = 1e-9);

    let acc = &a * &f + &b;
    assert_relative_eq!(acc[0], 0.0, epsilon = 1e-9);
    assert_relative_eq!(acc[1], 1.5, epsilon = 1e-9);
}

#[test]
fn test_joint_force_may_pull() {
    let a = DMatrix::from_row_slice(1, 1, &[1.0]);
    let b = DVector::from_vec(vec![1.0]);
    let mut solver = ComputeForces::new(ContactOrder::Natural);

    let f = solver.solve(&a, &b, &[true], &mut rng()).unwrap();
    assert_relative_eq!(f[0], -1.0, epsilon = 1e-9);
}

#[test]
fn test_redundant_contacts_are_solved() {
    // two identical rows: one carries the load, the other ends up unclamped at zero
    let a = DMatrix::from_row_slice(2, 2, &[1.0, 1.0, 1.0, 1.0]);
    let b = DVector::from_vec(vec![-1.0, -1.0]);
    let mut solver = ComputeForces::new(ContactOrder::Natural);

    let f = solver.solve(&a, &b, &[false, false], &mut rng()).unwrap();
    assert_relative_eq!(f[0], 1.0, epsilon = 1e-9);
    assert_relative_eq!(f[1], 0.0, epsilon = 1e-9);
}

#[test]
fn test_inconsistent_joints_are_singular() {
    let a = DMatrix::from_row_slice(2, 2, &[1.0, 1.0, 1.0, 1.0]);
    let b = DVector::from_vec(vec![1.0, 2.0]);
    let mut solver = ComputeForces::new(ContactOrder::Natural);

    let result = solver.solve(&a, &b, &[true, true], &mut rng());
    assert!(matches!(result, Err(PhysicsError::SingularMatrix(_))));
}

#[test]
fn test_mismatched_sizes_are_rejected() {
    let a = DMatrix::identity(2, 2);
    let b = DVector::from_vec(vec![-1.0, -1.0, -1.0]);

    let mut exact = ComputeForces::new(ContactOrder::Natural);
    assert!(matches!(
        exact.solve(&a, &b, &[false; 3], &mut rng()),
        Err(PhysicsError::InvalidParameter(_))
    ));

    let mut iterative = GaussSeidelSolver::new(50);
    assert!(matches!(
        iterative.solve(&a, &b, &[false; 3], &mut rng()),
        Err(PhysicsError::InvalidParameter(_))
    ));
}

#[test]
fn test_gauss_seidel_matches_pivoting() {
    let a = DMatrix::from_row_slice(3, 3, &[
        4.0, 1.0, 0.5,
        1.0, 3.0, 1.0,
        0.5, 1.0, 2.0,
    ]);
    let b = DVector::from_vec(vec![-2.0, 1.0, -1.0]);
    let joint = [false, false, false];

    let mut exact = ComputeForces::new(ContactOrder::Natural);
    let mut iterative = GaussSeidelSolver::new(200);
    let f_exact = exact.solve(&a, &b, &joint, &mut rng()).unwrap();
    let f_iter = iterative.solve(&a, &b, &joint, &mut rng()).unwrap();

    for i in 0..3 {
        assert_relative_eq!(f_exact[i], f_iter[i], epsilon = 1e-6);
        assert!(f_exact[i] >= -1e-12);
    }
    // the middle contact separates
    assert_relative_eq!(f_exact[1], 0.0, epsilon = 1e-9);
}

#[test]
fn test_random_order_is_reproducible() {
    let a = DMatrix::from_row_slice(3, 3, &[
        2.0, 1.0, 1.0,
        1.0, 2.0, 1.0,
        1.0, 1.0, 2.0,
    ]);
    let b = DVector::from_vec(vec![-1.0, -2.0, -1.5]);
    let joint = [false, false, false];

    let mut first = ComputeForces::new(ContactOrder::Random);
    let mut second = ComputeForces::new(ContactOrder::Random);
    let f1 = first.solve(&a, &b, &joint, &mut rng()).unwrap();
    let f2 = second.solve(&a, &b, &joint, &mut rng()).unwrap();
    assert_eq!(f1, f2);

    // a valid solution is complementary whatever the order
    let acc = &a * &f1 + &b;
    for i in 0..3 {
        assert!(f1[i] >= -1e-9);
        assert!(acc[i] >= -1e-9);
        assert!((f1[i] * acc[i]).abs() < 1e-9);
    }
}

#[test]
fn test_perturbation_passes_through_solvable_systems() {
    let a = DMatrix::from_row_slice(2, 2, &[2.0, 1.0, 1.0, 2.0]);
    let b = DVector::from_vec(vec![-1.0, -1.0]);
    let mut solver = ComputeForces::new(ContactOrder::Natural);
    let mut rng = rng();

    let f = solve_with_perturbation(&mut solver, &a, &b, &[false, false], &mut rng).unwrap();
    assert_relative_eq!(f[0], 1.0 / 3.0, epsilon = 1e-9);
    assert_relative_eq!(f[1], 1.0 / 3.0, epsilon = 1e-9);
}
