//! Three-state rigid body driven by two torques.

use nalgebra::DVector;
use stc_core::{Action, State};
use stc_sim::{GaussianNoise, PlantCore, PlantModel, SimResult, SolverOptions, Trajectory};

/// Rigid body plant: `dx1 = u1`, `dx2 = u2`, `dx3 = x1 x2`.
#[derive(Debug, Clone)]
pub struct RigidBody {
    core: PlantCore,
}

impl RigidBody {
    pub const STATE_DIM: usize = 3;
    pub const ACTION_DIM: usize = 2;

    /// Sampling interval for periodic control.
    pub const TAU_PERIODIC: f64 = 4.5e-4;

    /// Self-triggered interval at the origin.
    pub const TAU_TRIGGER: f64 = 0.01;

    pub fn new(initial_conditions: &[f64]) -> SimResult<Self> {
        Ok(Self {
            core: PlantCore::new(initial_conditions, Self::STATE_DIM, Self::ACTION_DIM)?,
        })
    }

    pub fn with_noise(mut self, noise: GaussianNoise) -> Self {
        self.core = self.core.with_noise(noise);
        self
    }

    pub fn with_solver(mut self, solver: SolverOptions) -> Self {
        self.core = self.core.with_solver(solver);
        self
    }

    pub fn initial_conditions(&self) -> &State {
        self.core.initial_conditions()
    }

    pub fn dynamics(_t: f64, x: &State, u: &Action) -> State {
        DVector::from_vec(vec![u[0], u[1], x[0] * x[1]])
    }

    pub fn reference_command(state: &State) -> Action {
        let (x1, x2, x3) = (state[0], state[1], state[2]);
        DVector::from_vec(vec![
            -x1 * x2 - 2.0 * x2 * x3 - x1 - x3,
            2.0 * x1 * x2 * x3 + 3.0 * x3 * x3 - x2,
        ])
    }

    /// Continuous closed loop under [`RigidBody::reference_command`].
    pub fn analog_dynamics(t: f64, x: &State) -> State {
        Self::dynamics(t, x, &Self::reference_command(x))
    }

    pub fn periodic_interval(_state: &State) -> f64 {
        Self::TAU_PERIODIC
    }

    /// `TAU_TRIGGER / (1 + |x|^2)`: shorter intervals far from the origin.
    pub fn trigger_interval(state: &State) -> f64 {
        Self::TAU_TRIGGER / (1.0 + state.norm_squared())
    }
}

impl PlantModel for RigidBody {
    fn state_dim(&self) -> usize {
        Self::STATE_DIM
    }

    fn action_dim(&self) -> usize {
        Self::ACTION_DIM
    }

    fn reset(&mut self) {
        self.core.reset();
    }

    fn state(&self) -> &State {
        self.core.state()
    }

    fn apply_command(
        &mut self,
        action: &Action,
        duration: f64,
        disturbance: Option<&State>,
    ) -> SimResult<()> {
        self.core
            .advance(Self::dynamics, action, duration, disturbance)
    }

    fn calculate_command(&self, state: &State) -> Action {
        Self::reference_command(state)
    }

    fn periodic_condition(&self, state: &State) -> f64 {
        Self::periodic_interval(state)
    }

    fn trigger_condition(&self, state: &State) -> f64 {
        Self::trigger_interval(state)
    }

    fn analog_response(
        &self,
        duration: f64,
        initial_conditions: &State,
        times: &[f64],
    ) -> SimResult<Trajectory> {
        self.core
            .analog(Self::analog_dynamics, duration, initial_conditions, times)
    }
}
