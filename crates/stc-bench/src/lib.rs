//! Benchmark framework: sampling cost and accuracy of each discipline.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use stc_app::{AppResult, compare_with_analog};
use stc_project::schema::{DisciplineDef, ModelDef, ModelKind, ScenarioDef};
use tracing::info;

/// A benchmark scenario definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkScenario {
    /// Unique identifier for this benchmark.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    pub scenario: ScenarioDef,
    pub notes: Option<String>,
}

/// Metrics from a single run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunMetrics {
    pub wall_time_s: f64,
    pub samples: usize,
}

/// Complete benchmark result for a scenario.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkResult {
    pub scenario: BenchmarkScenario,
    pub samples: usize,
    pub mean_interval_s: f64,
    pub min_interval_s: f64,
    pub max_deviation: f64,
    pub rms_deviation: f64,
    pub wall_time_median_s: f64,
    pub wall_time_min_s: f64,
    pub runs: Vec<RunMetrics>,
}

/// Collection of benchmark results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkSuite {
    pub timestamp: String,
    pub engine_version: String,
    pub results: Vec<BenchmarkResult>,
}

/// Run a scenario `times` times. Accuracy figures come from the last run;
/// runs are deterministic unless the scenario has unseeded noise.
pub fn run_benchmark(scenario: &BenchmarkScenario, times: usize) -> AppResult<BenchmarkResult> {
    let mut runs = Vec::with_capacity(times.max(1));
    let mut last = None;

    for _ in 0..times.max(1) {
        let started = Instant::now();
        let comparison = compare_with_analog(&scenario.scenario)?;
        runs.push(RunMetrics {
            wall_time_s: started.elapsed().as_secs_f64(),
            samples: comparison.samples,
        });
        last = Some(comparison);
    }

    let mut walls: Vec<f64> = runs.iter().map(|r| r.wall_time_s).collect();
    walls.sort_by(|a, b| a.total_cmp(b));
    let comparison = last.unwrap_or_default();

    info!(
        benchmark = %scenario.id,
        samples = comparison.samples,
        max_deviation = comparison.max_deviation,
        "benchmark complete"
    );

    Ok(BenchmarkResult {
        scenario: scenario.clone(),
        samples: comparison.samples,
        mean_interval_s: comparison.mean_interval_s,
        min_interval_s: comparison.min_interval_s,
        max_deviation: comparison.max_deviation,
        rms_deviation: comparison.rms_deviation,
        wall_time_median_s: walls[walls.len() / 2],
        wall_time_min_s: walls[0],
        runs,
    })
}

/// Run every scenario in parallel, preserving input order.
pub fn run_all(
    scenarios: &[BenchmarkScenario],
    times: usize,
) -> Vec<(String, AppResult<BenchmarkResult>)> {
    scenarios
        .par_iter()
        .map(|s| (s.id.clone(), run_benchmark(s, times)))
        .collect()
}

fn scenario(
    id: &str,
    name: &str,
    kind: ModelKind,
    initial_conditions: Vec<f64>,
    discipline: DisciplineDef,
    duration_s: f64,
) -> ScenarioDef {
    ScenarioDef {
        id: id.to_string(),
        name: name.to_string(),
        model: ModelDef {
            kind,
            initial_conditions,
            noise_stddev: 0.0,
        },
        discipline,
        duration_s,
        seed: None,
        disturbance: None,
        solver: None,
    }
}

/// Both plants under both disciplines from their nominal initial states.
pub fn default_scenarios() -> Vec<BenchmarkScenario> {
    let jet = vec![5.37, 0.34];
    let body = vec![0.5, -0.3, 0.2];
    let cases = [
        (
            "je_periodic",
            "Jet engine, periodic",
            ModelKind::JetEngine,
            jet.clone(),
            DisciplineDef::Periodic { period_s: None },
            3.0,
            "Fixed interval 0.00763",
        ),
        (
            "je_trigger",
            "Jet engine, self-triggered",
            ModelKind::JetEngine,
            jet,
            DisciplineDef::SelfTriggered,
            3.0,
            "State-dependent interval scaled by 0.00763",
        ),
        (
            "rb_periodic",
            "Rigid body, periodic",
            ModelKind::RigidBody,
            body.clone(),
            DisciplineDef::Periodic { period_s: None },
            1.0,
            "Fixed interval 4.5e-4",
        ),
        (
            "rb_trigger",
            "Rigid body, self-triggered",
            ModelKind::RigidBody,
            body,
            DisciplineDef::SelfTriggered,
            1.0,
            "0.01 / (1 + |x|^2)",
        ),
    ];

    cases
        .into_iter()
        .map(|(id, name, kind, ic, discipline, duration, notes)| BenchmarkScenario {
            id: id.to_string(),
            name: name.to_string(),
            scenario: scenario(id, name, kind, ic, discipline, duration),
            notes: Some(notes.to_string()),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_scenarios_are_defined() {
        let benchmarks = default_scenarios();
        assert_eq!(benchmarks.len(), 4);
        assert!(benchmarks.iter().all(|b| !b.id.is_empty()));
        assert!(benchmarks.iter().all(|b| b.id == b.scenario.id));
        for b in &benchmarks {
            stc_project::validate::validate_scenario(&b.scenario).unwrap();
        }
    }

    #[test]
    fn short_benchmark_runs() {
        let mut b = default_scenarios().remove(3);
        b.scenario.duration_s = 0.05;
        let result = run_benchmark(&b, 3).unwrap();
        assert_eq!(result.runs.len(), 3);
        assert!(result.samples > 1);
        assert!(result.min_interval_s > 0.0);
        assert!(result.min_interval_s <= result.mean_interval_s);
        assert!(result.wall_time_min_s <= result.wall_time_median_s);
    }

    #[test]
    fn run_all_preserves_order() {
        let mut benchmarks = default_scenarios();
        for b in &mut benchmarks {
            b.scenario.duration_s = 0.02;
        }
        let results = run_all(&benchmarks, 1);
        let ids: Vec<_> = results.iter().map(|(id, _)| id.as_str()).collect();
        assert_eq!(ids, ["je_periodic", "je_trigger", "rb_periodic", "rb_trigger"]);
        assert!(results.iter().all(|(_, r)| r.is_ok()));
    }

    #[test]
    fn benchmark_result_serializes() {
        let b = default_scenarios().remove(0);
        let json = serde_json::to_string(&b).expect("should serialize");
        let back: BenchmarkScenario = serde_json::from_str(&json).expect("should deserialize");
        assert_eq!(back.scenario, b.scenario);
    }
}
