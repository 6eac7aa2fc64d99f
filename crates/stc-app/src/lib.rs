//! Shared application service layer for the self-triggered control workspace.
//!
//! Turns scenario definitions into plants and closed-loop runs, caches run
//! results on disk and compares sampled runs with the analog response.

pub mod error;
pub mod plant;
pub mod project_service;
pub mod query;
pub mod run_service;

// Re-export key types for convenience
pub use error::{AppError, AppResult};
pub use plant::{Plant, PlantLaws, build_plant, parse_disturbance};
pub use project_service::{
    ScenarioSummary, get_scenario, list_scenarios, load_project, save_project, validate_project,
};
pub use query::{RunSummary, extract_state_series, get_run_summary};
pub use run_service::{
    AnalogComparison, ENGINE_VERSION, RunOptions, RunRequest, RunResponse, RunTimingSummary,
    compare_with_analog, ensure_run, list_runs, load_run, resolve_discipline, simulate,
};
