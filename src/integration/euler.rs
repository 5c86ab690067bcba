use crate::integration::integrator::prepare;
use crate::integration::{Integrator, OdeSystem};
use crate::Result;

/// Explicit Euler integrator; first order, mostly useful for comparisons
#[derive(Debug, Default)]
pub struct EulerIntegrator {
    change: Vec<f64>,
}

impl EulerIntegrator {
    /// Creates a new Euler integrator
    pub fn new() -> Self {
        Self { change: Vec::new() }
    }
}

impl Integrator for EulerIntegrator {
    fn step(&mut self, system: &mut dyn OdeSystem, time_step: f64) -> Result<()> {
        let mut vars = system.get_vars();
        prepare(&mut self.change, vars.len());
        system.evaluate(&vars, &mut self.change, 0.0)?;

        // x += h * dx/dt
        for (x, dx) in vars.iter_mut().zip(&self.change) {
            *x += time_step * dx;
        }
        system.set_vars(&vars)
    }

    fn name(&self) -> &str {
        "Euler"
    }
}
