use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use stc_app::{RunOptions, RunRequest, ensure_run, get_run_summary, list_runs, load_run};
use stc_results::RunDiscipline;

const PROJECT: &str = r#"
version: 1
name: persistence
scenarios:
  - id: je-periodic
    name: Jet engine, periodic
    model:
      type: JetEngine
      initial_conditions: [5.37, 0.34]
    discipline:
      type: Periodic
    duration_s: 0.1
  - id: rb-trigger
    name: Rigid body, self-triggered
    model:
      type: RigidBody
      initial_conditions: [0.5, -0.3, 0.2]
    discipline:
      type: SelfTriggered
    duration_s: 0.1
  - id: rb-noisy
    name: Rigid body, unseeded noise
    model:
      type: RigidBody
      initial_conditions: [0.5, -0.3, 0.2]
      noise_stddev: 0.01
    discipline:
      type: SelfTriggered
    duration_s: 0.1
  - id: rb-noisy-seeded
    name: Rigid body, seeded noise
    model:
      type: RigidBody
      initial_conditions: [0.5, -0.3, 0.2]
      noise_stddev: 0.01
    discipline:
      type: SelfTriggered
    duration_s: 0.1
    seed: 7
"#;

fn project_file(prefix: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let dir = std::env::temp_dir().join(format!("{}_{}", prefix, nanos));
    fs::create_dir_all(&dir).expect("failed to create temp project dir");
    let path = dir.join("project.yaml");
    fs::write(&path, PROJECT).expect("failed to write project file");
    path
}

#[test]
fn run_is_saved_then_served_from_cache() {
    let project_path = project_file("stc_app_cache");
    let request = RunRequest {
        project_path: &project_path,
        scenario_id: "je-periodic",
        options: RunOptions::default(),
    };

    let first = ensure_run(&request).expect("first run failed");
    assert!(!first.loaded_from_cache);
    // floor(0.1 / 0.00763) + 1
    assert_eq!(first.manifest.samples, 14);
    assert_eq!(
        first.manifest.discipline,
        RunDiscipline::Periodic { period_s: 0.00763 }
    );

    let second = ensure_run(&request).expect("cached run failed");
    assert!(second.loaded_from_cache);
    assert_eq!(second.run_id, first.run_id);
    assert_eq!(second.manifest, first.manifest);

    let (manifest, records) = load_run(&project_path, &first.run_id).expect("load failed");
    assert_eq!(manifest.scenario_id, "je-periodic");
    assert_eq!(records.len(), 14);
    assert_eq!(records[0].state, vec![5.37, 0.34]);

    let summary = get_run_summary(&records).unwrap();
    assert_eq!(summary.state_dim, 2);
    assert!((summary.mean_interval_s.unwrap() - 0.00763).abs() < 1e-12);

    let runs = list_runs(&project_path, "je-periodic").unwrap();
    assert_eq!(runs.len(), 1);
}

#[test]
fn cache_can_be_bypassed() {
    let project_path = project_file("stc_app_nocache");
    let request = RunRequest {
        project_path: &project_path,
        scenario_id: "rb-trigger",
        options: RunOptions {
            use_cache: false,
            ..RunOptions::default()
        },
    };
    let a = ensure_run(&request).unwrap();
    let b = ensure_run(&request).unwrap();
    assert!(!a.loaded_from_cache && !b.loaded_from_cache);
    assert_eq!(a.run_id, b.run_id);
    assert_eq!(a.manifest.discipline, RunDiscipline::SelfTriggered);
}

#[test]
fn unseeded_noisy_runs_are_never_served_from_cache() {
    let project_path = project_file("stc_app_noisy");
    let request = RunRequest {
        project_path: &project_path,
        scenario_id: "rb-noisy",
        options: RunOptions::default(),
    };
    let first = ensure_run(&request).unwrap();
    let second = ensure_run(&request).unwrap();
    assert!(!first.loaded_from_cache);
    assert!(!second.loaded_from_cache);

    let seeded = RunRequest {
        project_path: &project_path,
        scenario_id: "rb-noisy-seeded",
        options: RunOptions::default(),
    };
    assert!(!ensure_run(&seeded).unwrap().loaded_from_cache);
    assert!(ensure_run(&seeded).unwrap().loaded_from_cache);
}

#[test]
fn unknown_scenario_is_reported() {
    let project_path = project_file("stc_app_missing");
    let request = RunRequest {
        project_path: &project_path,
        scenario_id: "nope",
        options: RunOptions::default(),
    };
    assert!(matches!(
        ensure_run(&request),
        Err(stc_app::AppError::ScenarioNotFound(_))
    ));
}
