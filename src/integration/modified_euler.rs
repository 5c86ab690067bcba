use crate::integration::integrator::prepare;
use crate::integration::{Integrator, OdeSystem};
use crate::Result;

/// Modified Euler (Heun) integrator: averages the slopes at both ends of the step
#[derive(Debug, Default)]
pub struct ModifiedEulerIntegrator {
    k1: Vec<f64>,
    k2: Vec<f64>,
    trial: Vec<f64>,
}

impl ModifiedEulerIntegrator {
    /// Creates a new modified Euler integrator
    pub fn new() -> Self {
        Self::default()
    }
}

impl Integrator for ModifiedEulerIntegrator {
    fn step(&mut self, system: &mut dyn OdeSystem, time_step: f64) -> Result<()> {
        let mut vars = system.get_vars();
        let n = vars.len();
        prepare(&mut self.k1, n);
        prepare(&mut self.k2, n);
        prepare(&mut self.trial, n);

        system.evaluate(&vars, &mut self.k1, 0.0)?;
        for i in 0..n {
            self.trial[i] = vars[i] + time_step * self.k1[i];
        }
        system.evaluate(&self.trial, &mut self.k2, time_step)?;

        for i in 0..n {
            vars[i] += time_step * (self.k1[i] + self.k2[i]) / 2.0;
        }
        system.set_vars(&vars)
    }

    fn name(&self) -> &str {
        "ModifiedEuler"
    }
}
