use std::path::PathBuf;

use stc_app::{compare_with_analog, list_scenarios, load_project, simulate};
use stc_project::schema::*;

fn rigid_body(discipline: DisciplineDef) -> ScenarioDef {
    ScenarioDef {
        id: "rb".to_string(),
        name: "Rigid body".to_string(),
        model: ModelDef {
            kind: ModelKind::RigidBody,
            initial_conditions: vec![0.5, -0.3, 0.2],
            noise_stddev: 0.0,
        },
        discipline,
        duration_s: 0.5,
        seed: None,
        disturbance: None,
        solver: Some(SolverDef {
            method: SolverMethodDef::Dopri5,
            rtol: Some(1e-9),
            atol: Some(1e-12),
            fixed_dt_s: None,
        }),
    }
}

#[test]
fn periodic_rigid_body_tracks_analog() {
    let cmp = compare_with_analog(&rigid_body(DisciplineDef::Periodic { period_s: None })).unwrap();
    assert_eq!(cmp.samples, (0.5_f64 / 4.5e-4).floor() as usize + 1);
    assert!((cmp.mean_interval_s - 4.5e-4).abs() < 1e-12);
    assert!(cmp.max_deviation < 1e-3, "{cmp:?}");
    assert!(cmp.rms_deviation <= cmp.max_deviation);
}

#[test]
fn self_triggered_uses_fewer_samples_with_larger_deviation() {
    let periodic = compare_with_analog(&rigid_body(DisciplineDef::Periodic { period_s: None })).unwrap();
    let triggered = compare_with_analog(&rigid_body(DisciplineDef::SelfTriggered)).unwrap();
    assert!(triggered.samples < periodic.samples / 10);
    assert!(triggered.mean_interval_s > periodic.mean_interval_s);
    assert!(triggered.max_deviation > periodic.max_deviation);
    assert!(triggered.max_deviation < 1e-2, "{triggered:?}");
}

#[test]
fn invalid_scenario_is_rejected_before_running() {
    let mut s = rigid_body(DisciplineDef::SelfTriggered);
    s.disturbance = Some(vec![DisturbanceValueDef::Scalar(0.1)]);
    assert!(matches!(
        simulate(&s),
        Err(stc_app::AppError::Validation(_))
    ));
}

#[test]
fn disturbance_and_seeded_noise_are_applied() {
    let mut s = rigid_body(DisciplineDef::Periodic { period_s: Some(0.01) });
    let clean = simulate(&s).unwrap();

    s.disturbance = Some(vec![
        DisturbanceValueDef::Scalar(0.25),
        DisturbanceValueDef::Vector(vec![0.0, 0.0, 1.0]),
    ]);
    let kicked = simulate(&s).unwrap();
    assert_eq!(kicked.len(), clean.len());
    let (_, a) = clean.last().unwrap();
    let (_, b) = kicked.last().unwrap();
    assert!((a - b).norm() > 0.1);

    s.model.noise_stddev = 0.001;
    s.seed = Some(3);
    assert_eq!(simulate(&s).unwrap(), simulate(&s).unwrap());
}

#[test]
fn bundled_scenarios_simulate() {
    let root = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .and_then(|p| p.parent())
        .expect("workspace root")
        .join("scenarios");

    for name in ["jet_engine_study.yaml", "rigid_body_study.yaml"] {
        let project = load_project(&root.join(name)).expect("failed to load scenarios");
        assert_eq!(list_scenarios(&project).len(), project.scenarios.len());
        for scenario in &project.scenarios {
            let traj = simulate(scenario)
                .unwrap_or_else(|e| panic!("{} failed: {e}", scenario.id));
            assert!(traj.len() > 1);
            assert!(traj.times.windows(2).all(|w| w[0] < w[1]));
        }
    }
}
