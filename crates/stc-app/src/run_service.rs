//! Run execution, caching and analog comparison.

use std::path::Path;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use stc_project::schema::{DisciplineDef, ScenarioDef};
use stc_results::{RunDiscipline, RunManifest, RunStore, TimeseriesRecord};
use stc_sim::{Controller, Periodic, PlantModel, Trajectory};
use tracing::{debug, info};

use crate::error::AppResult;
use crate::plant::{Plant, build_plant, parse_disturbance};
use crate::project_service;

/// Version string folded into run ids so a new engine never reuses old runs.
pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Options for running simulations.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub use_cache: bool,
    pub engine_version: String,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            use_cache: true,
            engine_version: ENGINE_VERSION.to_string(),
        }
    }
}

/// Request to execute a run.
pub struct RunRequest<'a> {
    pub project_path: &'a Path,
    pub scenario_id: &'a str,
    pub options: RunOptions,
}

/// Wall-clock timing of a run request.
#[derive(Debug, Clone, Default)]
pub struct RunTimingSummary {
    pub simulate_time_s: f64,
    pub save_time_s: f64,
    pub load_cache_time_s: f64,
    pub total_time_s: f64,
}

/// Response from a run execution.
#[derive(Debug, Clone)]
pub struct RunResponse {
    pub run_id: String,
    pub manifest: RunManifest,
    pub loaded_from_cache: bool,
    pub timing: RunTimingSummary,
}

/// Sampled run against the analog response at the same times.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AnalogComparison {
    pub samples: usize,
    /// Mean inter-sample interval (0 for a single sample).
    pub mean_interval_s: f64,
    /// Shortest inter-sample interval (0 for a single sample).
    pub min_interval_s: f64,
    /// Largest Euclidean distance between sampled and analog states.
    pub max_deviation: f64,
    /// Root mean square of the per-sample Euclidean distance.
    pub rms_deviation: f64,
}

/// Discipline with the period filled in from the model when not given.
pub fn resolve_discipline(scenario: &ScenarioDef, plant: &Plant) -> RunDiscipline {
    match scenario.discipline {
        DisciplineDef::SelfTriggered => RunDiscipline::SelfTriggered,
        DisciplineDef::Periodic { period_s } => RunDiscipline::Periodic {
            period_s: period_s
                .unwrap_or_else(|| plant.periodic_condition(plant.initial_conditions())),
        },
    }
}

/// Run the scenario's closed loop and return the sampled trajectory.
pub fn simulate(scenario: &ScenarioDef) -> AppResult<Trajectory> {
    let (_, trajectory, _) = run_closed_loop(scenario)?;
    Ok(trajectory)
}

fn run_closed_loop(scenario: &ScenarioDef) -> AppResult<(Plant, Trajectory, RunDiscipline)> {
    stc_project::validate::validate_scenario(scenario)?;

    let mut plant = build_plant(&scenario.model, scenario.seed, scenario.solver.as_ref())?;
    let laws = plant.laws();
    let discipline = resolve_discipline(scenario, &plant);
    let disturbance = scenario
        .disturbance
        .as_deref()
        .map(parse_disturbance)
        .transpose()?;

    info!(
        scenario = %scenario.id,
        model = ?scenario.model.kind,
        discipline = ?discipline,
        duration_s = scenario.duration_s,
        "simulating scenario"
    );

    let trajectory = {
        let mut controller = Controller::new(&mut plant, laws.control);
        match discipline {
            RunDiscipline::Periodic { period_s } => {
                controller.execute(scenario.duration_s, &Periodic(period_s), disturbance)?
            }
            RunDiscipline::SelfTriggered => {
                controller.execute(scenario.duration_s, &laws.trigger, disturbance)?
            }
        }
    };
    Ok((plant, trajectory, discipline))
}

/// Run the scenario and evaluate the analog response at its sample times.
pub fn compare_with_analog(scenario: &ScenarioDef) -> AppResult<AnalogComparison> {
    let (plant, trajectory, _) = run_closed_loop(scenario)?;
    let analog = plant.analog_response(
        scenario.duration_s,
        plant.initial_conditions(),
        &trajectory.times,
    )?;

    let mut max_deviation: f64 = 0.0;
    let mut sum_sq = 0.0;
    for (digital, reference) in trajectory.states.iter().zip(&analog.states) {
        let d = (digital - reference).norm();
        max_deviation = max_deviation.max(d);
        sum_sq += d * d;
    }
    let samples = trajectory.len();
    let intervals = trajectory.intervals();
    let (mean_interval_s, min_interval_s) = if intervals.is_empty() {
        (0.0, 0.0)
    } else {
        (
            intervals.iter().sum::<f64>() / intervals.len() as f64,
            intervals.iter().copied().fold(f64::INFINITY, f64::min),
        )
    };

    let comparison = AnalogComparison {
        samples,
        mean_interval_s,
        min_interval_s,
        max_deviation,
        rms_deviation: (sum_sq / samples.max(1) as f64).sqrt(),
    };
    debug!(scenario = %scenario.id, ?comparison, "analog comparison");
    Ok(comparison)
}

/// Execute or load a cached run.
pub fn ensure_run(request: &RunRequest) -> AppResult<RunResponse> {
    let started = Instant::now();
    let mut timing = RunTimingSummary::default();

    let project = project_service::load_project(request.project_path)?;
    let scenario = project_service::get_scenario(&project, request.scenario_id)?;
    let run_id = stc_results::compute_run_id(scenario, &request.options.engine_version);
    let store = RunStore::for_project(request.project_path)?;

    let cacheable = scenario.is_reproducible();
    if !cacheable {
        debug!(scenario = %scenario.id, "unseeded noise, bypassing run cache");
    }

    if request.options.use_cache && cacheable && store.has_run(&run_id) {
        let load_started = Instant::now();
        let manifest = store.load_manifest(&run_id)?;
        timing.load_cache_time_s = load_started.elapsed().as_secs_f64();
        timing.total_time_s = started.elapsed().as_secs_f64();
        info!(scenario = %scenario.id, %run_id, "loaded cached run");

        return Ok(RunResponse {
            run_id,
            manifest,
            loaded_from_cache: true,
            timing,
        });
    }

    let sim_started = Instant::now();
    let (_, trajectory, discipline) = run_closed_loop(scenario)?;
    timing.simulate_time_s = sim_started.elapsed().as_secs_f64();

    let records: Vec<TimeseriesRecord> = trajectory
        .iter()
        .map(|(t, state)| TimeseriesRecord {
            time_s: t,
            state: state.as_slice().to_vec(),
        })
        .collect();
    let manifest = RunManifest {
        run_id: run_id.clone(),
        scenario_id: scenario.id.clone(),
        timestamp: RunManifest::timestamp_now(),
        discipline,
        samples: records.len(),
        duration_s: scenario.duration_s,
        engine_version: request.options.engine_version.clone(),
    };

    let save_started = Instant::now();
    store.save_run(&manifest, &records)?;
    timing.save_time_s = save_started.elapsed().as_secs_f64();
    timing.total_time_s = started.elapsed().as_secs_f64();

    info!(
        scenario = %scenario.id,
        %run_id,
        samples = manifest.samples,
        simulate_time_s = timing.simulate_time_s,
        "run saved"
    );

    Ok(RunResponse {
        run_id,
        manifest,
        loaded_from_cache: false,
        timing,
    })
}

/// List runs of a scenario, most recent first.
pub fn list_runs(project_path: &Path, scenario_id: &str) -> AppResult<Vec<RunManifest>> {
    let store = RunStore::for_project(project_path)?;

    let mut runs = store.list_runs(scenario_id)?;
    runs.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    Ok(runs)
}

/// Load a stored run.
pub fn load_run(
    project_path: &Path,
    run_id: &str,
) -> AppResult<(RunManifest, Vec<TimeseriesRecord>)> {
    let store = RunStore::for_project(project_path)?;
    Ok(store.load_run(run_id)?)
}
