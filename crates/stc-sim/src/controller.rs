//! Simulation controller: the sample → control → hold loop.

use stc_core::check_dim;
use tracing::{debug, info, trace};

use crate::condition::{ControlLaw, Periodic, TriggerCondition, check_interval};
use crate::disturbance::Disturbance;
use crate::error::{SimError, SimResult};
use crate::model::PlantModel;
use crate::trajectory::Trajectory;

/// Runs a control law on a plant under periodic or self-triggered sampling.
///
/// The controller borrows the plant mutably for its whole lifetime, so at
/// most one run can be in flight per plant instance.
pub struct Controller<'a, M, C> {
    model: &'a mut M,
    control: C,
}

impl<'a, M, C> Controller<'a, M, C>
where
    M: PlantModel,
    C: ControlLaw,
{
    pub fn new(model: &'a mut M, control: C) -> Self {
        Self { model, control }
    }

    pub fn model(&self) -> &M {
        &*self.model
    }

    /// Sample at `k * period` for the `floor(duration / period) + 1` values
    /// of `k` starting from zero.
    pub fn execute_periodic(&mut self, duration: f64, period: f64) -> SimResult<Trajectory> {
        self.execute(duration, &Periodic(period), None)
    }

    /// Sample whenever `condition` says so, starting at `t = 0`.
    pub fn execute_trigger<T>(&mut self, duration: f64, condition: &T) -> SimResult<Trajectory>
    where
        T: TriggerCondition,
    {
        self.execute(duration, condition, None)
    }

    /// Reset the plant and run the closed loop for `duration`.
    ///
    /// At each sample time `t` the state is recorded, the action computed and
    /// held for the interval `condition` returns. The disturbance is applied
    /// with the first step whose start time is strictly later than its
    /// `time`, then dropped.
    ///
    /// Arguments are validated before the plant is reset, so a rejected call
    /// leaves the plant untouched. An integration failure aborts the whole
    /// run; no partial trajectory is returned.
    pub fn execute<T>(
        &mut self,
        duration: f64,
        condition: &T,
        disturbance: Option<Disturbance>,
    ) -> SimResult<Trajectory>
    where
        T: TriggerCondition,
    {
        if !(duration.is_finite() && duration >= 0.0) {
            return Err(SimError::invalid(format!(
                "duration must be finite and non-negative, got {duration}"
            )));
        }
        let period = match condition.fixed_period() {
            Some(p) => Some(check_interval(p, 0.0)?),
            None => None,
        };
        let samples = period.map(|p| periodic_sample_count(duration, p));
        if let Some(d) = &disturbance {
            check_dim(&d.perturbation, self.model.state_dim(), "disturbance perturbation")?;
        }

        debug!(
            duration,
            ?period,
            ?samples,
            disturbance_time = ?disturbance.as_ref().map(|d| d.time),
            "starting closed-loop run"
        );

        self.model.reset();
        let mut pending = disturbance;
        let mut trajectory = Trajectory::new();
        let mut t = 0.0;
        let mut k: usize = 0;
        let more = |k: usize, t: f64| match samples {
            Some(n) => k < n,
            None => t <= duration,
        };

        while more(k, t) {
            let state = self.model.state().clone();
            let action = self.control.control(&state);
            check_dim(&action, self.model.action_dim(), "control action")?;
            let dt = check_interval(condition.next_interval(&state), t)?;
            trace!(t, dt, sample = k, "sample");
            trajectory.push(t, state);

            let fire = pending.as_ref().is_some_and(|d| d.time < t);
            let kick = if fire { pending.take() } else { None };
            if let Some(d) = &kick {
                info!(t, disturbance_time = d.time, "applying disturbance");
            }
            self.model
                .apply_command(&action, dt, kick.as_ref().map(|d| &d.perturbation))
                .map_err(|e| e.shifted(t))?;

            k += 1;
            t = match period {
                Some(p) => k as f64 * p,
                None => t + dt,
            };
        }

        debug!(samples = trajectory.len(), t_end = t, "closed-loop run complete");
        Ok(trajectory)
    }
}

/// Number of periodic samples in `[0, duration]`.
///
/// The ratio is widened by a few ulps so that a duration holding a whole
/// number of periods keeps its last sample (0.35 / 0.01 evaluates to
/// 34.99999999999999).
pub fn periodic_sample_count(duration: f64, period: f64) -> usize {
    let ratio = duration / period * (1.0 + 4.0 * f64::EPSILON);
    ratio.floor() as usize + 1
}
