mod integrator;
mod euler;
mod modified_euler;
mod runge_kutta;

pub use self::integrator::{new_integrator, Integrator, OdeSystem};
pub use self::euler::EulerIntegrator;
pub use self::modified_euler::ModifiedEulerIntegrator;
pub use self::runge_kutta::RungeKuttaIntegrator;
