//! PlantModel trait for pluggable controlled plants.

use stc_core::{Action, State};

use crate::error::SimResult;
use crate::trajectory::Trajectory;

/// Trait for plants driven by the simulation controller.
///
/// A PlantModel owns its current state and must implement:
/// - reset to the construction-time initial conditions
/// - zero-order-hold actuation over an interval (the only state mutator during a run)
/// - a reference control law and periodic/self-triggered interval rules
/// - a continuous-time (unsampled) reference response
///
/// Models are not safe for concurrent reuse: at most one run may be in
/// flight per instance. The controller enforces this by borrowing the model
/// mutably for the whole run.
pub trait PlantModel {
    /// Number of state components.
    fn state_dim(&self) -> usize;

    /// Number of control inputs.
    fn action_dim(&self) -> usize;

    /// Restore the state to the initial conditions.
    fn reset(&mut self);

    /// Current state.
    fn state(&self) -> &State;

    /// Hold `action` over `[0, duration]`, integrate the dynamics and take the
    /// end state, then add per-step noise (if configured) and `disturbance`
    /// (if given).
    fn apply_command(
        &mut self,
        action: &Action,
        duration: f64,
        disturbance: Option<&State>,
    ) -> SimResult<()>;

    /// Reference control law.
    fn calculate_command(&self, state: &State) -> Action;

    /// Constant sampling interval for periodic control.
    fn periodic_condition(&self, state: &State) -> f64;

    /// State-dependent sampling interval for self-triggered control.
    fn trigger_condition(&self, state: &State) -> f64;

    /// Continuous-time closed-loop response from `initial_conditions`,
    /// evaluated at `times` (non-empty, strictly increasing, within
    /// `[0, duration]`).
    fn analog_response(
        &self,
        duration: f64,
        initial_conditions: &State,
        times: &[f64],
    ) -> SimResult<Trajectory>;
}
