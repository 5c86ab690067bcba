use crate::integration::integrator::prepare;
use crate::integration::{Integrator, OdeSystem};
use crate::Result;

/// Fourth-order Runge-Kutta integrator for highly accurate physics simulations
#[derive(Debug, Default)]
pub struct RungeKuttaIntegrator {
    k1: Vec<f64>,
    k2: Vec<f64>,
    k3: Vec<f64>,
    k4: Vec<f64>,
    trial: Vec<f64>,
}

impl RungeKuttaIntegrator {
    /// Creates a new Runge-Kutta integrator
    pub fn new() -> Self {
        Self::default()
    }

    fn trial_point(trial: &mut [f64], vars: &[f64], k: &[f64], h: f64) {
        for i in 0..vars.len() {
            trial[i] = vars[i] + h * k[i];
        }
    }
}

impl Integrator for RungeKuttaIntegrator {
    fn step(&mut self, system: &mut dyn OdeSystem, time_step: f64) -> Result<()> {
        let mut vars = system.get_vars();
        let n = vars.len();
        for buffer in [&mut self.k1, &mut self.k2, &mut self.k3, &mut self.k4, &mut self.trial] {
            prepare(buffer, n);
        }
        let half = time_step / 2.0;

        // Step 1: slope at the start
        system.evaluate(&vars, &mut self.k1, 0.0)?;

        // Step 2: slope at the midpoint using k1
        Self::trial_point(&mut self.trial, &vars, &self.k1, half);
        system.evaluate(&self.trial, &mut self.k2, half)?;

        // Step 3: slope at the midpoint using k2
        Self::trial_point(&mut self.trial, &vars, &self.k2, half);
        system.evaluate(&self.trial, &mut self.k3, half)?;

        // Step 4: slope at the end using k3
        Self::trial_point(&mut self.trial, &vars, &self.k3, time_step);
        system.evaluate(&self.trial, &mut self.k4, time_step)?;

        // x += h/6 (k1 + 2 k2 + 2 k3 + k4)
        for i in 0..n {
            vars[i] += time_step * (self.k1[i] + 2.0 * self.k2[i] + 2.0 * self.k3[i] + self.k4[i]) / 6.0;
        }
        system.set_vars(&vars)
    }

    fn name(&self) -> &str {
        "RungeKutta"
    }
}
