//! Time integrators and the initial-value-problem driver.

use stc_core::{State, all_finite, ensure_positive};
use tracing::{trace, warn};

use crate::error::{SimError, SimResult};

/// Trait for single-step time integrators.
pub trait Integrator {
    /// Advance state `x` at time `t` by one step of size `dt`.
    fn step<F>(&self, f: &mut F, t: f64, x: &State, dt: f64) -> SimResult<State>
    where
        F: FnMut(f64, &State) -> State;
}

/// Classical RK4 (Runge-Kutta 4th order) integrator.
#[derive(Clone, Debug)]
pub struct RK4;

impl Integrator for RK4 {
    fn step<F>(&self, f: &mut F, t: f64, x: &State, dt: f64) -> SimResult<State>
    where
        F: FnMut(f64, &State) -> State,
    {
        let k1 = f(t, x);

        let x2 = x + &k1 * (0.5 * dt);
        let k2 = f(t + 0.5 * dt, &x2);

        let x3 = x + &k2 * (0.5 * dt);
        let k3 = f(t + 0.5 * dt, &x3);

        let x4 = x + &k3 * dt;
        let k4 = f(t + dt, &x4);

        // Combine: x_new = x + (dt/6) * (k1 + 2*k2 + 2*k3 + k4)
        let k_sum = k1 + k2 * 2.0 + k3 * 2.0 + k4;
        Ok(x + k_sum * (dt / 6.0))
    }
}

/// Forward Euler (explicit, 1st order, fast for testing).
/// Calls the right-hand side once per step instead of 4 times (RK4).
#[derive(Clone, Debug)]
pub struct ForwardEuler;

impl Integrator for ForwardEuler {
    fn step<F>(&self, f: &mut F, t: f64, x: &State, dt: f64) -> SimResult<State>
    where
        F: FnMut(f64, &State) -> State,
    {
        let xdot = f(t, x);
        Ok(x + xdot * dt)
    }
}

// Dormand-Prince 5(4) tableau.
const DP_C: [f64; 7] = [0.0, 1.0 / 5.0, 3.0 / 10.0, 4.0 / 5.0, 8.0 / 9.0, 1.0, 1.0];

#[rustfmt::skip]
const DP_A: [&[f64]; 7] = [
    &[],
    &[1.0 / 5.0],
    &[3.0 / 40.0, 9.0 / 40.0],
    &[44.0 / 45.0, -56.0 / 15.0, 32.0 / 9.0],
    &[19372.0 / 6561.0, -25360.0 / 2187.0, 64448.0 / 6561.0, -212.0 / 729.0],
    &[9017.0 / 3168.0, -355.0 / 33.0, 46732.0 / 5247.0, 49.0 / 176.0, -5103.0 / 18656.0],
    &[35.0 / 384.0, 0.0, 500.0 / 1113.0, 125.0 / 192.0, -2187.0 / 6784.0, 11.0 / 84.0],
];

// 5th-order weights minus embedded 4th-order weights.
const DP_E: [f64; 7] = [
    71.0 / 57600.0,
    0.0,
    -71.0 / 16695.0,
    71.0 / 1920.0,
    -17253.0 / 339200.0,
    22.0 / 525.0,
    -1.0 / 40.0,
];

const SAFETY: f64 = 0.9;
const MIN_FACTOR: f64 = 0.2;
const MAX_FACTOR: f64 = 10.0;

/// Dormand-Prince 5(4) adaptive integrator (DOPRI5).
///
/// Seven-stage, 5th order Runge-Kutta method with an embedded 4th order
/// error estimate. The propagated solution is the 5th order one.
#[derive(Clone, Debug)]
pub struct Dopri5 {
    pub rtol: f64,
    pub atol: f64,
}

impl Default for Dopri5 {
    fn default() -> Self {
        Self {
            rtol: 1e-3,
            atol: 1e-6,
        }
    }
}

impl Dopri5 {
    pub fn new(rtol: f64, atol: f64) -> Self {
        Self { rtol, atol }
    }

    /// One trial step. Returns the 5th order state and the scaled RMS error.
    pub fn attempt<F>(&self, f: &mut F, t: f64, x: &State, h: f64) -> (State, f64)
    where
        F: FnMut(f64, &State) -> State,
    {
        let mut k: Vec<State> = Vec::with_capacity(7);
        let mut x_stage = x.clone();
        for (stage, row) in DP_A.iter().enumerate() {
            x_stage.copy_from(x);
            for (&a, kj) in row.iter().zip(&k) {
                if a != 0.0 {
                    x_stage.axpy(h * a, kj, 1.0);
                }
            }
            k.push(f(t + DP_C[stage] * h, &x_stage));
        }
        // The last stage is evaluated at the propagated solution.
        let err = self.error_norm(x, &x_stage, &k, h);
        (x_stage, err)
    }

    fn error_norm(&self, x: &State, x_new: &State, k: &[State], h: f64) -> f64 {
        let n = x.len();
        if n == 0 {
            return 0.0;
        }
        let mut sum = 0.0;
        for i in 0..n {
            let e: f64 = DP_E.iter().zip(k).map(|(c, ki)| c * ki[i]).sum::<f64>() * h;
            let scale = self.atol + self.rtol * x[i].abs().max(x_new[i].abs());
            sum += (e / scale).powi(2);
        }
        (sum / n as f64).sqrt()
    }

    fn rms_scaled(&self, v: &State, x: &State) -> f64 {
        let n = v.len();
        if n == 0 {
            return 0.0;
        }
        let sum: f64 = v
            .iter()
            .zip(x.iter())
            .map(|(vi, xi)| (vi / (self.atol + self.rtol * xi.abs())).powi(2))
            .sum();
        (sum / n as f64).sqrt()
    }

    /// Starting step size (Hairer, Norsett & Wanner, II.4).
    pub fn initial_step<F>(&self, f: &mut F, t0: f64, x0: &State, span: f64) -> f64
    where
        F: FnMut(f64, &State) -> State,
    {
        if span <= 0.0 {
            return 0.0;
        }
        let f0 = f(t0, x0);
        let d0 = self.rms_scaled(x0, x0);
        let d1 = self.rms_scaled(&f0, x0);
        let h0 = if d0 < 1e-5 || d1 < 1e-5 {
            1e-6
        } else {
            0.01 * d0 / d1
        };
        let h0 = h0.min(span);

        let x1 = x0 + &f0 * h0;
        let f1 = f(t0 + h0, &x1);
        let d2 = self.rms_scaled(&(f1 - &f0), x0) / h0;

        let h1 = if d1 <= 1e-15 && d2 <= 1e-15 {
            (h0 * 1e-3).max(1e-6)
        } else {
            (0.01 / d1.max(d2)).powf(1.0 / 5.0)
        };
        (100.0 * h0).min(h1).min(span)
    }
}

impl Integrator for Dopri5 {
    fn step<F>(&self, f: &mut F, t: f64, x: &State, dt: f64) -> SimResult<State>
    where
        F: FnMut(f64, &State) -> State,
    {
        Ok(self.attempt(f, t, x, dt).0)
    }
}

/// Integrator selection for `solve_ivp`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum IntegratorType {
    /// Adaptive Dormand-Prince 5(4) (default).
    #[default]
    Dopri5,
    /// Fixed-step 4th-order Runge-Kutta.
    RK4,
    /// Fixed-step forward Euler.
    ForwardEuler,
}

/// Options for `solve_ivp`.
#[derive(Clone, Debug, PartialEq)]
pub struct SolverOptions {
    /// Integration method.
    pub method: IntegratorType,
    /// Relative tolerance (adaptive methods).
    pub rtol: f64,
    /// Absolute tolerance (adaptive methods).
    pub atol: f64,
    /// Step size for fixed-step methods.
    pub fixed_dt: f64,
    /// Upper bound on any step.
    pub max_step: f64,
    /// Maximum number of accepted steps (safety limit).
    pub max_steps: usize,
}

impl Default for SolverOptions {
    fn default() -> Self {
        Self {
            method: IntegratorType::default(),
            rtol: 1e-3,
            atol: 1e-6,
            fixed_dt: 1e-3,
            max_step: f64::INFINITY,
            max_steps: 100_000,
        }
    }
}

impl SolverOptions {
    pub fn with_method(mut self, method: IntegratorType) -> Self {
        self.method = method;
        self
    }

    pub fn with_tolerances(mut self, rtol: f64, atol: f64) -> Self {
        self.rtol = rtol;
        self.atol = atol;
        self
    }

    pub fn with_fixed_dt(mut self, dt: f64) -> Self {
        self.fixed_dt = dt;
        self
    }

    fn validate(&self) -> SimResult<()> {
        ensure_positive(self.rtol, "rtol")?;
        ensure_positive(self.atol, "atol")?;
        ensure_positive(self.fixed_dt, "fixed_dt")?;
        if !(self.max_step > 0.0) {
            return Err(SimError::invalid("max_step must be positive"));
        }
        if self.max_steps == 0 {
            return Err(SimError::invalid("max_steps must be positive"));
        }
        Ok(())
    }
}

/// Solution of an initial value problem.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct OdeSolution {
    /// Time points
    pub t: Vec<f64>,
    /// State at each time point
    pub y: Vec<State>,
}

impl OdeSolution {
    fn push(&mut self, t: f64, y: &State) {
        self.t.push(t);
        self.y.push(y.clone());
    }

    /// State at the last recorded time.
    pub fn last(&self) -> Option<&State> {
        self.y.last()
    }

    /// Consume the solution, keeping only the final state.
    pub fn into_final(mut self) -> Option<State> {
        self.y.pop()
    }
}

/// Solve `dx/dt = f(t, x)` from `x0` over `t_span`.
///
/// Without `t_eval` every accepted step is recorded (starting with `t0`).
/// With `t_eval` only those points are recorded; steps are shortened so the
/// integrator lands on each of them exactly.
pub fn solve_ivp<F>(
    mut f: F,
    x0: &State,
    t_span: (f64, f64),
    t_eval: Option<&[f64]>,
    opts: &SolverOptions,
) -> SimResult<OdeSolution>
where
    F: FnMut(f64, &State) -> State,
{
    let (t0, t1) = t_span;
    if !t0.is_finite() || !t1.is_finite() || t1 < t0 {
        return Err(SimError::invalid(format!(
            "time span must be finite and increasing, got ({t0}, {t1})"
        )));
    }
    opts.validate()?;
    if !all_finite(x0) {
        return Err(SimError::IntegrationFailure {
            t: t0,
            what: "non-finite initial state".to_string(),
        });
    }

    let evals = t_eval.unwrap_or(&[]);
    if evals.iter().any(|&te| !(te >= t0 && te <= t1)) {
        return Err(SimError::invalid("evaluation times must lie within the time span"));
    }
    if evals.windows(2).any(|w| w[0] >= w[1]) {
        return Err(SimError::invalid("evaluation times must be strictly increasing"));
    }
    let record_all = t_eval.is_none();

    let mut sol = OdeSolution::default();
    let mut t = t0;
    let mut x = x0.clone();
    let mut next_eval = 0;

    if record_all {
        sol.push(t, &x);
    }
    while next_eval < evals.len() && evals[next_eval] <= t {
        sol.push(evals[next_eval], &x);
        next_eval += 1;
    }

    let dopri = Dopri5::new(opts.rtol, opts.atol);
    let mut h_next = match opts.method {
        IntegratorType::Dopri5 => dopri.initial_step(&mut f, t0, x0, t1 - t0),
        IntegratorType::RK4 | IntegratorType::ForwardEuler => opts.fixed_dt,
    };

    let mut steps = 0;
    while t < t1 {
        if steps >= opts.max_steps {
            warn!(t, max_steps = opts.max_steps, "integration step budget exhausted");
            return Err(SimError::IntegrationFailure {
                t,
                what: format!("exceeded {} steps", opts.max_steps),
            });
        }

        let target = if next_eval < evals.len() {
            evals[next_eval]
        } else {
            t1
        };
        let remaining = target - t;
        let mut h = h_next.min(opts.max_step);
        let landing = h >= remaining || remaining - h <= 1e-12 * remaining.max(t.abs());
        if landing {
            h = remaining;
        }

        let (x_new, h_used, h_suggested) = match opts.method {
            IntegratorType::Dopri5 => adaptive_step(&dopri, &mut f, t, &x, h)?,
            IntegratorType::RK4 => (RK4.step(&mut f, t, &x, h)?, h, opts.fixed_dt),
            IntegratorType::ForwardEuler => {
                (ForwardEuler.step(&mut f, t, &x, h)?, h, opts.fixed_dt)
            }
        };

        if !all_finite(&x_new) {
            warn!(t, h = h_used, "non-finite state during integration");
            return Err(SimError::IntegrationFailure {
                t,
                what: "state became non-finite".to_string(),
            });
        }

        t = if landing && h_used == h { target } else { t + h_used };
        x = x_new;
        h_next = h_suggested;
        steps += 1;

        if record_all {
            sol.push(t, &x);
        }
        while next_eval < evals.len() && evals[next_eval] <= t {
            sol.push(evals[next_eval], &x);
            next_eval += 1;
        }
    }

    Ok(sol)
}

/// Take one accepted Dormand-Prince step, shrinking `h` until the error
/// estimate is within tolerance. Returns (state, step used, next step).
fn adaptive_step<F>(
    dopri: &Dopri5,
    f: &mut F,
    t: f64,
    x: &State,
    mut h: f64,
) -> SimResult<(State, f64, f64)>
where
    F: FnMut(f64, &State) -> State,
{
    let min_step = 10.0 * f64::EPSILON * t.abs().max(1.0);
    loop {
        if !(h >= min_step) {
            warn!(t, h, "step size underflow");
            return Err(SimError::IntegrationFailure {
                t,
                what: format!("step size underflow (h={h:e})"),
            });
        }

        let (x_new, err) = dopri.attempt(f, t, x, h);
        if err.is_finite() && err <= 1.0 && all_finite(&x_new) {
            let factor = if err == 0.0 {
                MAX_FACTOR
            } else {
                (SAFETY * err.powf(-1.0 / 5.0)).clamp(MIN_FACTOR, MAX_FACTOR)
            };
            return Ok((x_new, h, h * factor));
        }

        let factor = if err.is_finite() {
            (SAFETY * err.powf(-1.0 / 5.0)).clamp(MIN_FACTOR, 1.0)
        } else {
            MIN_FACTOR
        };
        trace!(t, h, err, "step rejected");
        h *= factor;
    }
}
