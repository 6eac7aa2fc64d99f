//! Result data types.

use serde::{Deserialize, Serialize};

pub type RunId = String;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunManifest {
    pub run_id: RunId,
    pub scenario_id: String,
    /// RFC 3339, UTC.
    pub timestamp: String,
    pub discipline: RunDiscipline,
    pub samples: usize,
    pub duration_s: f64,
    pub engine_version: String,
}

impl RunManifest {
    pub fn timestamp_now() -> String {
        chrono::Utc::now().to_rfc3339()
    }
}

/// Sampling discipline a run was executed under, with the period resolved.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum RunDiscipline {
    Periodic { period_s: f64 },
    SelfTriggered,
}

/// One sample of a stored trajectory.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TimeseriesRecord {
    pub time_s: f64,
    pub state: Vec<f64>,
}
