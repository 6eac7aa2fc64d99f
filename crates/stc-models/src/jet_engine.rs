//! Two-state jet engine compressor model.
//!
//! States are the normalized mass flow `x1` and pressure rise `x2`; the
//! single input is the throttle command. Dynamics:
//!
//! ```text
//! dx1 = -x2 - 1.5 x1^2 - 0.5 x1^3
//! dx2 = (x1 - u) / beta^2
//! ```
//!
//! The control and trigger laws are written in the transformed coordinate
//! `Y = 2 (x1^2 + x2) / (x1^2 + 1)`.

use nalgebra::DVector;
use stc_core::{Action, State, scalar_action};
use stc_sim::{GaussianNoise, PlantCore, PlantModel, SimResult, SolverOptions, Trajectory};

/// Jet engine compressor plant.
#[derive(Debug, Clone)]
pub struct JetEngine {
    core: PlantCore,
}

impl JetEngine {
    pub const STATE_DIM: usize = 2;
    pub const ACTION_DIM: usize = 1;

    /// Normalization constant of the pressure-rise equation. Cancels in
    /// every law; kept named so the algebra stays traceable.
    pub const BETA: f64 = 1.0;

    /// Sampling interval for periodic control.
    pub const TAU_PERIODIC: f64 = 0.00763;

    /// Scale of the self-triggered interval.
    pub const TAU_TRIGGER: f64 = 0.00763;

    /// Create a noiseless plant at `initial_conditions = [x1, x2]`.
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

    /// Map `x2` to the transformed coordinate `Y`.
    pub fn x2_to_y(x1: f64, x2: f64) -> f64 {
        2.0 * (x1 * x1 + x2) / (x1 * x1 + 1.0)
    }

    /// Inverse of [`JetEngine::x2_to_y`].
    pub fn y_to_x2(x1: f64, y: f64) -> f64 {
        0.5 * y * (x1 * x1 + 1.0) - x1 * x1
    }

    /// Open-loop dynamics under a held throttle command.
    pub fn dynamics(_t: f64, x: &State, u: &Action) -> State {
        let (x1, x2) = (x[0], x[1]);
        let beta2 = Self::BETA * Self::BETA;
        DVector::from_vec(vec![
            -x2 - 1.5 * x1 * x1 - 0.5 * x1 * x1 * x1,
            (x1 - u[0]) / beta2,
        ])
    }

    /// Continuous closed loop in `(x1, Y)` coordinates.
    pub fn analog_dynamics(_t: f64, z: &State) -> State {
        let (x1, y) = (z[0], z[1]);
        let s = x1 * x1 + 1.0;
        DVector::from_vec(vec![-0.5 * s * (x1 + y), -s * y])
    }

    /// Re-derived stabilizing law. This is the law the model uses.
    pub fn reference_command(state: &State) -> Action {
        let x1 = state[0];
        let y = Self::x2_to_y(x1, state[1]);
        let beta2 = Self::BETA * Self::BETA;
        let x1s = x1 * x1;
        scalar_action(
            x1 + 0.5
                * beta2
                * (x1s + 1.0)
                * (2.0 * x1s * y + y + x1 * y * y - 2.0 * x1s - 2.0 * x1 * y),
        )
    }

    /// Closed form as first published. Disagrees with
    /// [`JetEngine::reference_command`] and is not used by the model.
    pub fn published_command(state: &State) -> Action {
        let x1 = state[0];
        let y = Self::x2_to_y(x1, state[1]);
        let beta2 = Self::BETA * Self::BETA;
        let x1s = x1 * x1;
        scalar_action(x1 - 0.5 * (x1s + 1.0) * (y + y * x1s + x1 * y * y) * beta2 + 2.0 * x1 * beta2)
    }

    pub fn periodic_interval(_state: &State) -> f64 {
        Self::TAU_PERIODIC
    }

    /// Self-triggered interval.
    ///
    /// NaN at the origin and negative for some `x1 < 0`; the controller
    /// rejects those values.
    pub fn trigger_interval(state: &State) -> f64 {
        let x1 = state[0];
        let y = Self::x2_to_y(x1, state[1]);
        let norm_sq = x1 * x1 + y * y;
        let norm = norm_sq.sqrt();
        (29.0 * x1 + norm_sq) / (5.36 * norm * x1 * x1 + norm_sq) * Self::TAU_TRIGGER
    }
}

impl PlantModel for JetEngine {
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
        stc_core::check_dim(initial_conditions, Self::STATE_DIM, "initial conditions")?;
        let x1 = initial_conditions[0];
        let z0 = DVector::from_vec(vec![x1, Self::x2_to_y(x1, initial_conditions[1])]);
        let mut response = self
            .core
            .analog(Self::analog_dynamics, duration, &z0, times)?;
        for z in response.states.iter_mut() {
            z[1] = Self::y_to_x2(z[0], z[1]);
        }
        Ok(response)
    }
}
