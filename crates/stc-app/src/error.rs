//! Error types for the stc-app service layer.

use std::path::PathBuf;

/// Application error type that wraps errors from the backend crates.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Project error: {0}")]
    Project(String),

    #[error("Failed to read project file: {path}")]
    ProjectFileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write project file: {path}")]
    ProjectFileWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Project validation failed: {0}")]
    Validation(String),

    #[error("Scenario not found: {0}")]
    ScenarioNotFound(String),

    #[error("Simulation error: {0}")]
    Simulation(String),

    #[error("Results error: {0}")]
    Results(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for stc-app operations.
pub type AppResult<T> = Result<T, AppError>;

impl From<stc_project::ProjectError> for AppError {
    fn from(err: stc_project::ProjectError) -> Self {
        AppError::Project(err.to_string())
    }
}

impl From<stc_project::ValidationError> for AppError {
    fn from(err: stc_project::ValidationError) -> Self {
        AppError::Validation(err.to_string())
    }
}

impl From<stc_sim::SimError> for AppError {
    fn from(err: stc_sim::SimError) -> Self {
        AppError::Simulation(err.to_string())
    }
}

impl From<stc_results::ResultsError> for AppError {
    fn from(err: stc_results::ResultsError) -> Self {
        AppError::Results(err.to_string())
    }
}
