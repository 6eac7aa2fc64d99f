//! Error types for simulation operations.

use stc_core::CoreError;
use thiserror::Error;

/// Errors encountered while integrating or running a closed loop.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimError {
    #[error("Invalid argument: {what}")]
    InvalidArgument { what: String },

    #[error("Integration failed at t={t}: {what}")]
    IntegrationFailure { t: f64, what: String },

    #[error("Configuration error: {what}")]
    Configuration { what: String },
}

pub type SimResult<T> = Result<T, SimError>;

impl SimError {
    pub fn invalid(what: impl Into<String>) -> Self {
        SimError::InvalidArgument { what: what.into() }
    }

    pub fn configuration(what: impl Into<String>) -> Self {
        SimError::Configuration { what: what.into() }
    }

    /// Shift the time of an integration failure from step-local to run time.
    pub fn shifted(self, t0: f64) -> Self {
        match self {
            SimError::IntegrationFailure { t, what } => {
                SimError::IntegrationFailure { t: t0 + t, what }
            }
            other => other,
        }
    }
}

impl From<CoreError> for SimError {
    fn from(e: CoreError) -> Self {
        SimError::InvalidArgument {
            what: e.to_string(),
        }
    }
}
