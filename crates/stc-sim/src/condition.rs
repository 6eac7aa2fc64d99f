//! Control laws and sampling conditions.
//!
//! Both are plain function values of the sampled state. Closures and `fn`
//! items implement the traits directly.

use stc_core::{Action, State};

use crate::error::{SimError, SimResult};

/// Maps a sampled state to the action held until the next sample.
pub trait ControlLaw {
    fn control(&self, state: &State) -> Action;
}

impl<F> ControlLaw for F
where
    F: Fn(&State) -> Action,
{
    fn control(&self, state: &State) -> Action {
        self(state)
    }
}

/// Produces the interval until the next sample.
pub trait TriggerCondition {
    fn next_interval(&self, state: &State) -> f64;

    /// Constant interval, if the condition does not depend on state.
    ///
    /// The controller uses it to place samples at exact multiples of the
    /// period.
    fn fixed_period(&self) -> Option<f64> {
        None
    }
}

impl<F> TriggerCondition for F
where
    F: Fn(&State) -> f64,
{
    fn next_interval(&self, state: &State) -> f64 {
        self(state)
    }
}

/// Fixed-period sampling.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Periodic(pub f64);

impl TriggerCondition for Periodic {
    fn next_interval(&self, _state: &State) -> f64 {
        self.0
    }

    fn fixed_period(&self) -> Option<f64> {
        Some(self.0)
    }
}

/// Reject intervals that would stall or reverse the run clock.
pub fn check_interval(dt: f64, t: f64) -> SimResult<f64> {
    if !(dt.is_finite() && dt > 0.0) {
        return Err(SimError::invalid(format!(
            "trigger interval must be positive and finite, got {dt} at t={t}"
        )));
    }
    if t + dt <= t {
        return Err(SimError::invalid(format!(
            "trigger interval {dt} is too small to advance t={t}"
        )));
    }
    Ok(dt)
}
