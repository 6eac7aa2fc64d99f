//! Closed-loop simulation engine for sampled and self-triggered control.
//!
//! Provides:
//! - ODE integration (adaptive Dormand-Prince 5(4), fixed-step RK4 and forward Euler)
//! - The plant-model contract driven by the controller
//! - Shared plant machinery (zero-order hold, per-step noise, one-shot disturbance)
//! - Periodic and state-dependent trigger conditions
//! - The simulation controller loop

pub mod condition;
pub mod controller;
pub mod disturbance;
pub mod error;
pub mod integrator;
pub mod model;
pub mod noise;
pub mod plant;
pub mod trajectory;

// Re-exports for public API
pub use condition::{ControlLaw, Periodic, TriggerCondition};
pub use controller::{Controller, periodic_sample_count};
pub use disturbance::{Disturbance, DisturbanceField};
pub use error::{SimError, SimResult};
pub use integrator::{
    Dopri5, ForwardEuler, Integrator, IntegratorType, OdeSolution, RK4, SolverOptions, solve_ivp,
};
pub use model::PlantModel;
pub use noise::GaussianNoise;
pub use plant::PlantCore;
pub use trajectory::Trajectory;
