//! Scenario file schema.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Project {
    pub version: u32,
    pub name: String,
    #[serde(default)]
    pub scenarios: Vec<ScenarioDef>,
}

impl Project {
    pub fn scenario(&self, id: &str) -> Option<&ScenarioDef> {
        self.scenarios.iter().find(|s| s.id == id)
    }
}

/// One configured closed-loop run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScenarioDef {
    pub id: String,
    pub name: String,
    pub model: ModelDef,
    pub discipline: DisciplineDef,
    pub duration_s: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    /// Raw `[time, [p1, p2, ...]]` form; shape is checked by validation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disturbance: Option<Vec<DisturbanceValueDef>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub solver: Option<SolverDef>,
}

impl ScenarioDef {
    /// Whether two runs of this scenario produce the same trajectory.
    ///
    /// Noise without a seed draws from OS entropy.
    pub fn is_reproducible(&self) -> bool {
        self.model.noise_stddev == 0.0 || self.seed.is_some()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModelDef {
    #[serde(rename = "type")]
    pub kind: ModelKind,
    pub initial_conditions: Vec<f64>,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub noise_stddev: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ModelKind {
    JetEngine,
    RigidBody,
}

impl ModelKind {
    pub fn state_dim(self) -> usize {
        match self {
            ModelKind::JetEngine => 2,
            ModelKind::RigidBody => 3,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum DisciplineDef {
    SelfTriggered,
    Periodic {
        /// Falls back to the model's own periodic interval when absent.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        period_s: Option<f64>,
    },
}

impl DisciplineDef {
    pub fn label(&self) -> &'static str {
        match self {
            DisciplineDef::SelfTriggered => "self-triggered",
            DisciplineDef::Periodic { .. } => "periodic",
        }
    }
}

/// Element of the loosely typed disturbance list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum DisturbanceValueDef {
    Scalar(f64),
    Vector(Vec<f64>),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SolverDef {
    #[serde(default)]
    pub method: SolverMethodDef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rtol: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub atol: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fixed_dt_s: Option<f64>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum SolverMethodDef {
    #[default]
    Dopri5,
    RK4,
    ForwardEuler,
}

fn is_zero(v: &f64) -> bool {
    *v == 0.0
}
