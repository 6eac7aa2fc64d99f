//! Plant construction from scenario definitions.

use stc_core::{Action, State};
use stc_models::{JetEngine, RigidBody};
use stc_project::schema::{DisturbanceValueDef, ModelDef, ModelKind, SolverDef, SolverMethodDef};
use stc_sim::{
    Disturbance, DisturbanceField, GaussianNoise, IntegratorType, PlantModel, SimResult,
    SolverOptions, Trajectory,
};

use crate::error::AppResult;

/// A configured plant of any supported kind.
#[derive(Debug, Clone)]
pub enum Plant {
    JetEngine(JetEngine),
    RigidBody(RigidBody),
}

/// Control and interval laws of a plant kind, as plain functions.
#[derive(Debug, Clone, Copy)]
pub struct PlantLaws {
    pub control: fn(&State) -> Action,
    pub periodic: fn(&State) -> f64,
    pub trigger: fn(&State) -> f64,
}

impl PlantLaws {
    pub fn for_kind(kind: ModelKind) -> Self {
        match kind {
            ModelKind::JetEngine => Self {
                control: JetEngine::reference_command,
                periodic: JetEngine::periodic_interval,
                trigger: JetEngine::trigger_interval,
            },
            ModelKind::RigidBody => Self {
                control: RigidBody::reference_command,
                periodic: RigidBody::periodic_interval,
                trigger: RigidBody::trigger_interval,
            },
        }
    }
}

impl Plant {
    pub fn kind(&self) -> ModelKind {
        match self {
            Plant::JetEngine(_) => ModelKind::JetEngine,
            Plant::RigidBody(_) => ModelKind::RigidBody,
        }
    }

    pub fn laws(&self) -> PlantLaws {
        PlantLaws::for_kind(self.kind())
    }

    pub fn initial_conditions(&self) -> &State {
        match self {
            Plant::JetEngine(p) => p.initial_conditions(),
            Plant::RigidBody(p) => p.initial_conditions(),
        }
    }

    fn as_model(&self) -> &dyn PlantModel {
        match self {
            Plant::JetEngine(p) => p,
            Plant::RigidBody(p) => p,
        }
    }

    fn as_model_mut(&mut self) -> &mut dyn PlantModel {
        match self {
            Plant::JetEngine(p) => p,
            Plant::RigidBody(p) => p,
        }
    }
}

impl PlantModel for Plant {
    fn state_dim(&self) -> usize {
        self.as_model().state_dim()
    }

    fn action_dim(&self) -> usize {
        self.as_model().action_dim()
    }

    fn reset(&mut self) {
        self.as_model_mut().reset();
    }

    fn state(&self) -> &State {
        self.as_model().state()
    }

    fn apply_command(
        &mut self,
        action: &Action,
        duration: f64,
        disturbance: Option<&State>,
    ) -> SimResult<()> {
        self.as_model_mut()
            .apply_command(action, duration, disturbance)
    }

    fn calculate_command(&self, state: &State) -> Action {
        self.as_model().calculate_command(state)
    }

    fn periodic_condition(&self, state: &State) -> f64 {
        self.as_model().periodic_condition(state)
    }

    fn trigger_condition(&self, state: &State) -> f64 {
        self.as_model().trigger_condition(state)
    }

    fn analog_response(
        &self,
        duration: f64,
        initial_conditions: &State,
        times: &[f64],
    ) -> SimResult<Trajectory> {
        self.as_model()
            .analog_response(duration, initial_conditions, times)
    }
}

/// Build a plant with noise (when `noise_stddev > 0`) and solver settings.
pub fn build_plant(
    model: &ModelDef,
    seed: Option<u64>,
    solver: Option<&SolverDef>,
) -> AppResult<Plant> {
    let options = solver_options(solver);
    let noise = if model.noise_stddev > 0.0 {
        Some(GaussianNoise::new(model.noise_stddev, seed)?)
    } else {
        None
    };

    let plant = match model.kind {
        ModelKind::JetEngine => {
            let mut p = JetEngine::new(&model.initial_conditions)?.with_solver(options);
            if let Some(n) = noise {
                p = p.with_noise(n);
            }
            Plant::JetEngine(p)
        }
        ModelKind::RigidBody => {
            let mut p = RigidBody::new(&model.initial_conditions)?.with_solver(options);
            if let Some(n) = noise {
                p = p.with_noise(n);
            }
            Plant::RigidBody(p)
        }
    };
    Ok(plant)
}

fn solver_options(solver: Option<&SolverDef>) -> SolverOptions {
    let mut options = SolverOptions::default();
    let Some(def) = solver else {
        return options;
    };
    options.method = match def.method {
        SolverMethodDef::Dopri5 => IntegratorType::Dopri5,
        SolverMethodDef::RK4 => IntegratorType::RK4,
        SolverMethodDef::ForwardEuler => IntegratorType::ForwardEuler,
    };
    if let Some(rtol) = def.rtol {
        options.rtol = rtol;
    }
    if let Some(atol) = def.atol {
        options.atol = atol;
    }
    if let Some(dt) = def.fixed_dt_s {
        options.fixed_dt = dt;
    }
    options
}

/// Convert the scenario's raw disturbance list.
pub fn parse_disturbance(values: &[DisturbanceValueDef]) -> AppResult<Disturbance> {
    let fields: Vec<DisturbanceField> = values
        .iter()
        .map(|v| match v {
            DisturbanceValueDef::Scalar(t) => DisturbanceField::Time(*t),
            DisturbanceValueDef::Vector(p) => DisturbanceField::Vector(p.clone()),
        })
        .collect();
    Ok(Disturbance::try_from(fields)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model(kind: ModelKind, ic: Vec<f64>) -> ModelDef {
        ModelDef {
            kind,
            initial_conditions: ic,
            noise_stddev: 0.0,
        }
    }

    #[test]
    fn builds_each_kind() {
        let je = build_plant(&model(ModelKind::JetEngine, vec![5.37, 0.34]), None, None).unwrap();
        assert_eq!(je.kind(), ModelKind::JetEngine);
        assert_eq!(je.state_dim(), 2);
        assert_eq!(je.action_dim(), 1);

        let rb = build_plant(&model(ModelKind::RigidBody, vec![0.0; 3]), None, None).unwrap();
        assert_eq!(rb.kind(), ModelKind::RigidBody);
        assert_eq!(rb.action_dim(), 2);
        assert_eq!(rb.trigger_condition(rb.state()), RigidBody::TAU_TRIGGER);
    }

    #[test]
    fn wrong_length_is_a_simulation_error() {
        let err = build_plant(&model(ModelKind::RigidBody, vec![0.0; 2]), None, None).unwrap_err();
        assert!(matches!(err, crate::AppError::Simulation(_)));
    }

    #[test]
    fn solver_def_maps_onto_options() {
        let def = SolverDef {
            method: SolverMethodDef::RK4,
            rtol: Some(1e-6),
            atol: None,
            fixed_dt_s: Some(1e-4),
        };
        let opts = solver_options(Some(&def));
        assert_eq!(opts.method, IntegratorType::RK4);
        assert_eq!(opts.rtol, 1e-6);
        assert_eq!(opts.atol, SolverOptions::default().atol);
        assert_eq!(opts.fixed_dt, 1e-4);
    }

    #[test]
    fn disturbance_conversion() {
        let d = parse_disturbance(&[
            DisturbanceValueDef::Scalar(1.0),
            DisturbanceValueDef::Vector(vec![0.5, 0.0]),
        ])
        .unwrap();
        assert_eq!(d.time, 1.0);
        assert_eq!(d.perturbation.as_slice(), &[0.5, 0.0]);

        assert!(parse_disturbance(&[DisturbanceValueDef::Vector(vec![0.5])]).is_err());
    }
}
