//! Scenario validation.

use crate::schema::{DisciplineDef, DisturbanceValueDef, Project, ScenarioDef, SolverDef};
use std::collections::HashSet;

pub const LATEST_VERSION: u32 = 1;

#[derive(thiserror::Error, Debug)]
pub enum ValidationError {
    #[error("Duplicate ID: {id} in {context}")]
    DuplicateId { id: String, context: String },

    #[error("Invalid value: {field} = {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Malformed disturbance in scenario '{scenario}': {reason}")]
    MalformedDisturbance { scenario: String, reason: String },

    #[error("Unsupported version: {version}")]
    UnsupportedVersion { version: u32 },
}

pub fn validate_project(project: &Project) -> Result<(), ValidationError> {
    if project.version > LATEST_VERSION {
        return Err(ValidationError::UnsupportedVersion {
            version: project.version,
        });
    }

    let mut ids = HashSet::new();
    for scenario in &project.scenarios {
        if !ids.insert(&scenario.id) {
            return Err(ValidationError::DuplicateId {
                id: scenario.id.clone(),
                context: "scenarios".to_string(),
            });
        }
        validate_scenario(scenario)?;
    }
    Ok(())
}

pub fn validate_scenario(scenario: &ScenarioDef) -> Result<(), ValidationError> {
    let field = |name: &str| format!("scenario '{}' {}", scenario.id, name);

    if scenario.id.trim().is_empty() {
        return Err(ValidationError::InvalidValue {
            field: "scenario id".to_string(),
            value: format!("{:?}", scenario.id),
            reason: "must not be empty".to_string(),
        });
    }

    let model = &scenario.model;
    let expected = model.kind.state_dim();
    if model.initial_conditions.len() != expected {
        return Err(ValidationError::InvalidValue {
            field: field("initial_conditions"),
            value: format!("{:?}", model.initial_conditions),
            reason: format!("{:?} needs {expected} values", model.kind),
        });
    }
    if model.initial_conditions.iter().any(|v| !v.is_finite()) {
        return Err(ValidationError::InvalidValue {
            field: field("initial_conditions"),
            value: format!("{:?}", model.initial_conditions),
            reason: "values must be finite".to_string(),
        });
    }
    if !(model.noise_stddev.is_finite() && model.noise_stddev >= 0.0) {
        return Err(ValidationError::InvalidValue {
            field: field("noise_stddev"),
            value: model.noise_stddev.to_string(),
            reason: "must be finite and non-negative".to_string(),
        });
    }

    if !(scenario.duration_s.is_finite() && scenario.duration_s >= 0.0) {
        return Err(ValidationError::InvalidValue {
            field: field("duration_s"),
            value: scenario.duration_s.to_string(),
            reason: "must be finite and non-negative".to_string(),
        });
    }

    if let DisciplineDef::Periodic {
        period_s: Some(period),
    } = &scenario.discipline
    {
        if !(period.is_finite() && *period > 0.0) {
            return Err(ValidationError::InvalidValue {
                field: field("period_s"),
                value: period.to_string(),
                reason: "must be finite and positive".to_string(),
            });
        }
    }

    if let Some(disturbance) = &scenario.disturbance {
        validate_disturbance(&scenario.id, disturbance, expected)?;
    }
    if let Some(solver) = &scenario.solver {
        validate_solver(&scenario.id, solver)?;
    }
    Ok(())
}

fn validate_disturbance(
    scenario: &str,
    values: &[DisturbanceValueDef],
    state_dim: usize,
) -> Result<(), ValidationError> {
    let malformed = |reason: String| ValidationError::MalformedDisturbance {
        scenario: scenario.to_string(),
        reason,
    };
    match values {
        [DisturbanceValueDef::Scalar(time), DisturbanceValueDef::Vector(p)] => {
            if !time.is_finite() || p.iter().any(|v| !v.is_finite()) {
                return Err(malformed("values must be finite".to_string()));
            }
            if p.len() != state_dim {
                return Err(malformed(format!(
                    "perturbation has {} components, model state has {state_dim}",
                    p.len()
                )));
            }
            Ok(())
        }
        _ => Err(malformed(
            "expected the form [time, [s1, s2, ...]]".to_string(),
        )),
    }
}

fn validate_solver(scenario: &str, solver: &SolverDef) -> Result<(), ValidationError> {
    let checks = [
        ("rtol", solver.rtol),
        ("atol", solver.atol),
        ("fixed_dt_s", solver.fixed_dt_s),
    ];
    for (name, value) in checks {
        if let Some(v) = value {
            if !(v.is_finite() && v > 0.0) {
                return Err(ValidationError::InvalidValue {
                    field: format!("scenario '{scenario}' solver {name}"),
                    value: v.to_string(),
                    reason: "must be finite and positive".to_string(),
                });
            }
        }
    }
    Ok(())
}
