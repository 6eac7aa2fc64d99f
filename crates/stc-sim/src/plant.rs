//! Shared plant machinery.
//!
//! Concrete plants keep their dynamics and laws; `PlantCore` owns the rest
//! of the lifecycle so every plant applies the same sequence per command:
//! integrate under zero-order hold, take the end state, add noise, add the
//! one-shot disturbance.

use stc_core::{Action, State, check_dim, state_from_slice};

use crate::error::{SimError, SimResult};
use crate::integrator::{SolverOptions, solve_ivp};
use crate::noise::GaussianNoise;
use crate::trajectory::Trajectory;

/// Initial conditions, current state, noise source and solver settings of a
/// plant.
#[derive(Debug, Clone)]
pub struct PlantCore {
    initial: State,
    state: State,
    action_dim: usize,
    noise: Option<GaussianNoise>,
    solver: SolverOptions,
}

impl PlantCore {
    /// Create a plant core, checking the initial conditions against the
    /// plant's state dimension.
    pub fn new(initial_conditions: &[f64], state_dim: usize, action_dim: usize) -> SimResult<Self> {
        if initial_conditions.len() != state_dim {
            return Err(SimError::configuration(format!(
                "expected {state_dim} initial conditions, got {}",
                initial_conditions.len()
            )));
        }
        let initial = state_from_slice(initial_conditions, "initial conditions")
            .map_err(|e| SimError::configuration(e.to_string()))?;
        Ok(Self {
            state: initial.clone(),
            initial,
            action_dim,
            noise: None,
            solver: SolverOptions::default(),
        })
    }

    pub fn with_noise(mut self, noise: GaussianNoise) -> Self {
        self.noise = Some(noise);
        self
    }

    pub fn with_solver(mut self, solver: SolverOptions) -> Self {
        self.solver = solver;
        self
    }

    pub fn initial_conditions(&self) -> &State {
        &self.initial
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    pub fn state_dim(&self) -> usize {
        self.initial.len()
    }

    pub fn action_dim(&self) -> usize {
        self.action_dim
    }

    pub fn solver(&self) -> &SolverOptions {
        &self.solver
    }

    pub fn noise(&self) -> Option<&GaussianNoise> {
        self.noise.as_ref()
    }

    pub fn reset(&mut self) {
        self.state.copy_from(&self.initial);
    }

    /// Hold `action` over `[0, duration]` under `dynamics(t, x, u)`.
    ///
    /// On error the state is left unchanged.
    pub fn advance<F>(
        &mut self,
        mut dynamics: F,
        action: &Action,
        duration: f64,
        disturbance: Option<&State>,
    ) -> SimResult<()>
    where
        F: FnMut(f64, &State, &Action) -> State,
    {
        check_dim(action, self.action_dim, "control action")?;
        if !(duration.is_finite() && duration >= 0.0) {
            return Err(SimError::invalid(format!(
                "command duration must be finite and non-negative, got {duration}"
            )));
        }
        if let Some(d) = disturbance {
            check_dim(d, self.state_dim(), "disturbance perturbation")?;
        }

        let end = [duration];
        let solution = solve_ivp(
            |t, x| dynamics(t, x, action),
            &self.state,
            (0.0, duration),
            Some(&end[..]),
            &self.solver,
        )?;
        let mut next = solution.into_final().ok_or_else(|| SimError::IntegrationFailure {
            t: duration,
            what: "solver returned no state".to_string(),
        })?;

        if let Some(noise) = self.noise.as_mut() {
            noise.perturb(&mut next);
        }
        if let Some(d) = disturbance {
            next += d;
        }
        self.state = next;
        Ok(())
    }

    /// Integrate `dynamics(t, x)` from `initial_conditions` and sample at
    /// `times`.
    pub fn analog<F>(
        &self,
        dynamics: F,
        duration: f64,
        initial_conditions: &State,
        times: &[f64],
    ) -> SimResult<Trajectory>
    where
        F: FnMut(f64, &State) -> State,
    {
        check_dim(initial_conditions, self.state_dim(), "initial conditions")?;
        let (first, last) = match (times.first(), times.last()) {
            (Some(&first), Some(&last)) => (first, last),
            _ => return Err(SimError::invalid("analog response needs at least one time")),
        };
        if !(first >= 0.0 && last <= duration) {
            return Err(SimError::invalid(format!(
                "analog response times must lie within [0, {duration}]"
            )));
        }
        let solution = solve_ivp(
            dynamics,
            initial_conditions,
            (first, last),
            Some(times),
            &self.solver,
        )?;
        Ok(solution.into())
    }
}
