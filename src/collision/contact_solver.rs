//! Solvers for the contact linear complementarity problem.
//!
//! Given the matrix `A` relating contact forces to contact accelerations and the vector `b`
//! of accelerations with no contact forces, find forces `f` with `a = A f + b` such that for
//! every contact `f >= 0`, `a >= 0` and `f a = 0`, and for every joint `a = 0`. The same
//! problem with velocities in place of accelerations gives collision impulses.

use crate::error::PhysicsError;
use crate::Result;

use nalgebra::{DMatrix, DVector};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{debug, warn};

#[cfg(feature = "serialize")]
use serde::{Serialize, Deserialize};

/// Which algorithm computes contact forces
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub enum SolverType {
    /// Baraff's pivoting algorithm, exact up to round-off
    ComputeForces,

    /// Projected Gauss-Seidel iterations, approximate
    GaussSeidel,
}

/// The order in which contacts are brought into the solution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub enum ContactOrder {
    /// The order the contacts were found in
    Natural,

    /// A shuffled order, drawn from the seeded generator
    Random,
}

/// Trait for contact constraint solvers
pub trait ContactSolver: Send + Sync {
    /// Solves the problem for `A` and `b`; `joint[i]` marks bilateral rows
    fn solve(&mut self, a: &DMatrix<f64>, b: &DVector<f64>, joint: &[bool], rng: &mut StdRng) -> Result<DVector<f64>>;

    /// Returns the solver's name
    fn name(&self) -> &str;
}

/// Creates the solver named by `kind`
pub fn new_contact_solver(kind: SolverType, order: ContactOrder, iterations: u32) -> Box<dyn ContactSolver> {
    match kind {
        SolverType::ComputeForces => Box::new(ComputeForces::new(order)),
        SolverType::GaussSeidel => Box::new(GaussSeidelSolver::new(iterations)),
    }
}

/// Number of times the diagonal is perturbed before a singular system is given up on
const MAX_PERTURBATIONS: u32 = 6;

/// Solves the problem, nudging the diagonal with seeded noise when the system turns out to be
/// singular. Every retry uses a larger nudge.
pub fn solve_with_perturbation(
    solver: &mut dyn ContactSolver,
    a: &DMatrix<f64>,
    b: &DVector<f64>,
    joint: &[bool],
    rng: &mut StdRng,
) -> Result<DVector<f64>> {
    let mut last_error = match solver.solve(a, b, joint, rng) {
        Ok(f) => return Ok(f),
        Err(e @ PhysicsError::SingularMatrix(_)) => e,
        Err(e) => return Err(e),
    };

    let scale = a.diagonal().iter().fold(0.0_f64, |m, v| m.max(v.abs())).max(1.0);
    let mut nudge = 1.0e-9;
    for attempt in 1..=MAX_PERTURBATIONS {
        let mut perturbed = a.clone();
        for i in 0..perturbed.nrows() {
            perturbed[(i, i)] += scale * nudge * rng.gen_range(0.5..1.0);
        }
        debug!(solver = solver.name(), attempt, nudge, "retrying singular contact system");
        match solver.solve(&perturbed, b, joint, rng) {
            Ok(f) => return Ok(f),
            Err(e @ PhysicsError::SingularMatrix(_)) => last_error = e,
            Err(e) => return Err(e),
        }
        nudge *= 100.0;
    }
    Err(last_error)
}

/// Baraff's pivoting method ("Fast Contact Force Computation for Nonpenetrating Rigid
/// Bodies", 1994), extended with free-sign rows for joints.
///
/// Rows are split into the clamped set `C`, where `a = 0`, and the unclamped set `NC`, where
/// `f = 0`. Each row is driven to a valid state in turn while the others keep theirs. Joints
/// always end in `C`.
#[derive(Debug, Clone)]
pub struct ComputeForces {
    /// Order in which contacts are driven
    order: ContactOrder,

    /// Magnitude below which accelerations and forces count as zero
    tolerance: f64,
}

/// Which set a row currently belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RowState {
    Untouched,
    Clamped,
    NotClamped,
}

impl ComputeForces {
    /// Creates the solver with the default tolerance
    pub fn new(order: ContactOrder) -> Self {
        Self {
            order,
            tolerance: 1.0e-10,
        }
    }

    /// Direction of change in `f` that moves row `d` while keeping every clamped row at zero
    fn fdirection(
        &self,
        a: &DMatrix<f64>,
        d: usize,
        sign: f64,
        states: &[RowState],
    ) -> Result<DVector<f64>> {
        let n = a.nrows();
        let mut delta_f = DVector::zeros(n);
        delta_f[d] = sign;

        let clamped: Vec<usize> = (0..n).filter(|&i| states[i] == RowState::Clamped).collect();
        if clamped.is_empty() {
            return Ok(delta_f);
        }

        // A_CC x = -A_Cd * sign
        let size = clamped.len();
        let acc = DMatrix::from_fn(size, size, |r, c| a[(clamped[r], clamped[c])]);
        let rhs = DVector::from_fn(size, |r, _| -a[(clamped[r], d)] * sign);
        let x = acc
            .svd(true, true)
            .solve(&rhs, self.tolerance)
            .map_err(|e| PhysicsError::SingularMatrix(e.to_string()))?;
        for (k, &i) in clamped.iter().enumerate() {
            delta_f[i] = x[k];
        }
        Ok(delta_f)
    }

    /// Largest step along the direction that keeps every row valid, and the row that limits it
    fn maxstep(
        &self,
        f: &DVector<f64>,
        acc: &DVector<f64>,
        delta_f: &DVector<f64>,
        delta_a: &DVector<f64>,
        d: usize,
        joint: &[bool],
        states: &[RowState],
    ) -> Option<(f64, usize)> {
        let mut best: Option<(f64, usize)> = None;
        let mut consider = |s: f64, j: usize| {
            if best.map_or(true, |(s_best, _)| s < s_best) {
                best = Some((s.max(0.0), j));
            }
        };

        // row d stops when its acceleration reaches zero
        if joint[d] {
            if delta_a[d] * acc[d] < 0.0 {
                consider(-acc[d] / delta_a[d], d);
            }
        } else if delta_a[d] > 0.0 {
            consider(-acc[d] / delta_a[d], d);
        }

        for i in 0..f.len() {
            if i == d {
                continue;
            }
            match states[i] {
                // a clamped contact may not pull
                RowState::Clamped if !joint[i] && delta_f[i] < 0.0 => {
                    consider(-f[i] / delta_f[i], i);
                }
                // an unclamped contact may not start to penetrate
                RowState::NotClamped if delta_a[i] < 0.0 => {
                    consider(-acc[i] / delta_a[i], i);
                }
                _ => {}
            }
        }
        best
    }

    fn drive_to_zero(
        &self,
        a: &DMatrix<f64>,
        f: &mut DVector<f64>,
        acc: &mut DVector<f64>,
        d: usize,
        joint: &[bool],
        states: &mut [RowState],
    ) -> Result<()> {
        let n = a.nrows();
        let sign = if joint[d] && acc[d] > 0.0 { -1.0 } else { 1.0 };

        for _ in 0..(4 * n + 10) {
            let delta_f = self.fdirection(a, d, sign, states)?;
            let delta_a = a * &delta_f;

            if delta_a[d].abs() < self.tolerance {
                // row d depends on rows already clamped; it is fine if it is already satisfied
                if acc[d].abs() < self.tolerance.sqrt() || (!joint[d] && acc[d] >= 0.0) {
                    states[d] = if joint[d] { RowState::Clamped } else { RowState::NotClamped };
                    return Ok(());
                }
                return Err(PhysicsError::SingularMatrix(format!(
                    "Row {} cannot be driven to zero, acceleration {}", d, acc[d]
                )));
            }

            let (step, j) = self
                .maxstep(f, acc, &delta_f, &delta_a, d, joint, states)
                .ok_or_else(|| PhysicsError::SingularMatrix(format!("Unbounded step driving row {}", d)))?;

            *f += &delta_f * step;
            *acc += &delta_a * step;

            if j == d {
                acc[d] = 0.0;
                states[d] = RowState::Clamped;
                return Ok(());
            }
            match states[j] {
                RowState::Clamped => {
                    f[j] = 0.0;
                    states[j] = RowState::NotClamped;
                }
                RowState::NotClamped => {
                    acc[j] = 0.0;
                    states[j] = RowState::Clamped;
                }
                RowState::Untouched => {}
            }
        }
        Err(PhysicsError::SingularMatrix(format!("Row {} keeps cycling", d)))
    }

    fn verify(&self, f: &DVector<f64>, acc: &DVector<f64>, joint: &[bool]) {
        let loose = 1.0e-6 * (1.0 + acc.amax());
        for i in 0..f.len() {
            let ok = if joint[i] {
                acc[i].abs() <= loose
            } else {
                f[i] >= -loose && acc[i] >= -loose && (f[i] * acc[i]).abs() <= loose * (1.0 + f[i].abs())
            };
            if !ok {
                warn!(row = i, force = f[i], accel = acc[i], joint = joint[i], "contact solution out of tolerance");
            }
        }
    }
}

impl ContactSolver for ComputeForces {
    fn solve(&mut self, a: &DMatrix<f64>, b: &DVector<f64>, joint: &[bool], rng: &mut StdRng) -> Result<DVector<f64>> {
        let n = b.len();
        if a.nrows() != n || a.ncols() != n || joint.len() != n {
            return Err(PhysicsError::InvalidParameter(format!(
                "Contact system sizes disagree: A is {}x{}, b has {}, {} joint flags",
                a.nrows(), a.ncols(), n, joint.len()
            )));
        }

        let mut f = DVector::zeros(n);
        let mut acc = b.clone();
        let mut states = vec![RowState::Untouched; n];

        // joints first, since they are never allowed to leave the clamped set
        let mut order: Vec<usize> = (0..n).filter(|&i| joint[i]).collect();
        let mut contacts: Vec<usize> = (0..n).filter(|&i| !joint[i]).collect();
        if self.order == ContactOrder::Random {
            contacts.shuffle(rng);
        }
        order.extend(contacts);

        for d in order {
            if joint[d] {
                if acc[d].abs() <= self.tolerance {
                    states[d] = RowState::Clamped;
                    continue;
                }
            } else if acc[d] >= -self.tolerance {
                states[d] = RowState::NotClamped;
                continue;
            }
            self.drive_to_zero(a, &mut f, &mut acc, d, joint, &mut states)?;
        }

        self.verify(&f, &acc, joint);
        Ok(f)
    }

    fn name(&self) -> &str {
        "ComputeForces"
    }
}

/// Projected Gauss-Seidel iterations over the rows
#[derive(Debug, Clone)]
pub struct GaussSeidelSolver {
    /// Maximum sweeps over the rows
    max_iterations: u32,

    /// Sweeps stop once no force changes by more than this
    tolerance: f64,
}

impl GaussSeidelSolver {
    /// Creates the solver
    pub fn new(max_iterations: u32) -> Self {
        Self {
            max_iterations,
            tolerance: 1.0e-10,
        }
    }
}

impl ContactSolver for GaussSeidelSolver {
    fn solve(&mut self, a: &DMatrix<f64>, b: &DVector<f64>, joint: &[bool], _rng: &mut StdRng) -> Result<DVector<f64>> {
        let n = b.len();
        if a.nrows() != n || a.ncols() != n || joint.len() != n {
            return Err(PhysicsError::InvalidParameter(
                "Contact system sizes disagree".to_string(),
            ));
        }
        if (0..n).any(|i| a[(i, i)].abs() < self.tolerance) {
            return Err(PhysicsError::SingularMatrix(
                "Zero on the diagonal of the contact matrix".to_string(),
            ));
        }

        let mut f = DVector::zeros(n);
        for iteration in 0..self.max_iterations {
            let mut largest_change: f64 = 0.0;
            for i in 0..n {
                // a_i = sum_j A_ij f_j + b_i
                let acc = a.row(i).dot(&f.transpose()) + b[i];
                let mut value = f[i] - acc / a[(i, i)];
                if !joint[i] {
                    value = value.max(0.0);
                }
                largest_change = largest_change.max((value - f[i]).abs());
                f[i] = value;
            }
            if largest_change < self.tolerance {
                debug!(iterations = iteration + 1, "gauss-seidel converged");
                return Ok(f);
            }
        }
        warn!(iterations = self.max_iterations, "gauss-seidel stopped before converging");
        Ok(f)
    }

    fn name(&self) -> &str {
        "GaussSeidel"
    }
}
