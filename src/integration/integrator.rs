use crate::core::IntegratorType;
use crate::integration::{EulerIntegrator, ModifiedEulerIntegrator, RungeKuttaIntegrator};
use crate::Result;

/// A system of first order differential equations over a flat vector of variables
pub trait OdeSystem {
    /// Returns the current value of every variable
    fn get_vars(&self) -> Vec<f64>;

    /// Replaces the value of every variable
    fn set_vars(&mut self, vars: &[f64]) -> Result<()>;

    /// Writes the rate of change of every variable at `vars` into `change`.
    ///
    /// `time_step` is how far into the current step `vars` lies.
    fn evaluate(&mut self, vars: &[f64], change: &mut [f64], time_step: f64) -> Result<()>;
}

/// Trait for numerical integration algorithms
pub trait Integrator: Send + Sync {
    /// Advances the system by `time_step`
    fn step(&mut self, system: &mut dyn OdeSystem, time_step: f64) -> Result<()>;

    /// Returns the name of the integrator
    fn name(&self) -> &str;
}

/// Creates the integrator named by `kind`
pub fn new_integrator(kind: IntegratorType) -> Box<dyn Integrator> {
    match kind {
        IntegratorType::Euler => Box::new(EulerIntegrator::new()),
        IntegratorType::ModifiedEuler => Box::new(ModifiedEulerIntegrator::new()),
        IntegratorType::RungeKutta => Box::new(RungeKuttaIntegrator::new()),
    }
}

/// Resizes a scratch buffer, reusing its allocation
pub(crate) fn prepare(buffer: &mut Vec<f64>, len: usize) {
    buffer.clear();
    buffer.resize(len, 0.0);
}
