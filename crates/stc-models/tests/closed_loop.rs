//! Closed-loop behavior of the concrete plants under the controller.

use nalgebra::DVector;
use stc_core::{State, Tolerances, nearly_equal};
use stc_models::{JetEngine, RigidBody};
use stc_sim::{
    Controller, Disturbance, DisturbanceField, GaussianNoise, Periodic, PlantModel, SimError,
    SolverOptions,
};

const JET_IC: [f64; 2] = [5.37, 0.34];
const BODY_IC: [f64; 3] = [0.5, -0.3, 0.2];

#[test]
fn reset_restores_initial_conditions_exactly() {
    let mut plant = JetEngine::new(&JET_IC).unwrap();
    plant
        .apply_command(&DVector::from_vec(vec![3.0]), 0.1, None)
        .unwrap();
    assert_ne!(plant.state().as_slice(), &JET_IC[..]);
    plant.reset();
    assert_eq!(plant.state().as_slice(), &JET_IC[..]);

    let mut body = RigidBody::new(&BODY_IC).unwrap();
    Controller::new(&mut body, RigidBody::reference_command)
        .execute_periodic(0.05, RigidBody::TAU_PERIODIC)
        .unwrap();
    body.reset();
    assert_eq!(body.state().as_slice(), &BODY_IC[..]);
}

#[test]
fn jet_engine_periodic_sample_count_and_times() {
    let mut plant = JetEngine::new(&JET_IC).unwrap();
    let period = JetEngine::TAU_PERIODIC;
    let duration = 0.5;
    let traj = Controller::new(&mut plant, JetEngine::reference_command)
        .execute_periodic(duration, period)
        .unwrap();

    let expected = (duration / period).floor() as usize + 1;
    assert_eq!(traj.len(), expected);
    for (i, t) in traj.times.iter().enumerate() {
        assert_eq!(*t, i as f64 * period);
    }
}

#[test]
fn periodic_count_survives_decimal_periods() {
    for (duration, period, expected) in [(0.35, 0.01, 36), (0.63, 0.07, 10)] {
        let mut plant = RigidBody::new(&BODY_IC).unwrap();
        let traj = Controller::new(&mut plant, RigidBody::reference_command)
            .execute_periodic(duration, period)
            .unwrap();
        assert_eq!(traj.len(), expected, "duration {duration}, period {period}");
        let last = *traj.times.last().unwrap();
        assert_eq!(last, (expected - 1) as f64 * period);
        assert!((last - duration).abs() < 1e-12);
    }
}

#[test]
fn jet_engine_self_triggered_gaps_match_interval_before_step() {
    let mut plant = JetEngine::new(&JET_IC).unwrap();
    let traj = Controller::new(&mut plant, JetEngine::reference_command)
        .execute_trigger(3.0, &JetEngine::trigger_interval)
        .unwrap();

    assert!(traj.len() > 2);
    for (i, gap) in traj.intervals().iter().enumerate() {
        assert!(*gap > 0.0);
        let expected = JetEngine::trigger_interval(&traj.states[i]);
        assert!(
            nearly_equal(*gap, expected, Tolerances::default()),
            "gap {gap} vs interval {expected} at sample {i}"
        );
    }
    // Self-triggering needs far fewer samples than the periodic rate.
    let periodic_samples = (3.0 / JetEngine::TAU_PERIODIC).floor() as usize + 1;
    assert!(traj.len() < periodic_samples / 2);

    // Closed loop settles near the origin.
    let (_, last) = traj.last().unwrap();
    assert!(last[0].abs() < 1.0, "final state {last}");
}

#[test]
fn late_disturbance_never_fires() {
    let duration = 0.2;
    let mut plant = RigidBody::new(&BODY_IC).unwrap();
    let mut ctl = Controller::new(&mut plant, RigidBody::reference_command);
    let baseline = ctl
        .execute_trigger(duration, &RigidBody::trigger_interval)
        .unwrap();

    for time in [duration, duration + 1.0] {
        let kick = Disturbance::new(time, DVector::from_vec(vec![10.0, 10.0, 10.0])).unwrap();
        let traj = ctl
            .execute(duration, &RigidBody::trigger_interval, Some(kick))
            .unwrap();
        assert_eq!(traj, baseline);
    }
}

#[test]
fn early_disturbance_changes_trajectory() {
    let mut plant = RigidBody::new(&BODY_IC).unwrap();
    let mut ctl = Controller::new(&mut plant, RigidBody::reference_command);
    let baseline = ctl.execute_periodic(0.1, 0.01).unwrap();
    let kick = Disturbance::new(0.045, DVector::from_vec(vec![1.0, 0.0, 0.0])).unwrap();
    let traj = ctl.execute(0.1, &Periodic(0.01), Some(kick)).unwrap();

    assert_eq!(traj.len(), baseline.len());
    // Fires with the step starting at t = 0.05; its result is recorded at
    // t = 0.06.
    for i in 0..=5 {
        assert_eq!(traj.states[i], baseline.states[i]);
    }
    assert!(traj.states[6][0] - baseline.states[6][0] > 0.5);
}

#[test]
fn malformed_disturbance_leaves_plant_untouched() {
    let err = Disturbance::from_wire(&[DisturbanceField::Time(1.0)]).unwrap_err();
    assert!(matches!(err, SimError::InvalidArgument { .. }));

    let mut plant = JetEngine::new(&JET_IC).unwrap();
    plant
        .apply_command(&DVector::from_vec(vec![0.0]), 0.1, None)
        .unwrap();
    let moved = plant.state().clone();

    // Wrong perturbation length is caught before the run resets the plant.
    let kick = Disturbance::new(0.0, DVector::from_vec(vec![1.0, 2.0, 3.0])).unwrap();
    let err = Controller::new(&mut plant, JetEngine::reference_command)
        .execute(1.0, &JetEngine::trigger_interval, Some(kick))
        .unwrap_err();
    assert!(matches!(err, SimError::InvalidArgument { .. }));
    assert_eq!(plant.state(), &moved);
}

#[test]
fn negative_trigger_interval_is_rejected() {
    // x1 = -1, Y = 0 gives a negative interval at the first sample.
    let x2 = JetEngine::y_to_x2(-1.0, 0.0);
    let mut plant = JetEngine::new(&[-1.0, x2]).unwrap();
    let err = Controller::new(&mut plant, JetEngine::reference_command)
        .execute_trigger(1.0, &JetEngine::trigger_interval)
        .unwrap_err();
    assert!(matches!(err, SimError::InvalidArgument { .. }));
}

#[test]
fn rigid_body_digital_tracks_analog_for_small_period() {
    let solver = SolverOptions::default().with_tolerances(1e-9, 1e-12);
    let mut plant = RigidBody::new(&BODY_IC).unwrap().with_solver(solver);
    let duration = 0.5;
    let traj = Controller::new(&mut plant, RigidBody::reference_command)
        .execute_periodic(duration, RigidBody::TAU_PERIODIC)
        .unwrap();

    let ic = plant.initial_conditions().clone();
    let analog = plant.analog_response(duration, &ic, &traj.times).unwrap();
    assert_eq!(analog.times, traj.times);

    let mut max_dev: f64 = 0.0;
    for (digital, reference) in traj.states.iter().zip(&analog.states) {
        max_dev = max_dev.max((digital - reference).amax());
    }
    assert!(max_dev < 1e-3, "max deviation {max_dev}");
    assert!(max_dev > 0.0);
}

#[test]
fn seeded_noise_is_reproducible() {
    let run = |seed: u64| {
        let noise = GaussianNoise::new(0.01, Some(seed)).unwrap();
        let mut plant = JetEngine::new(&JET_IC).unwrap().with_noise(noise);
        Controller::new(&mut plant, JetEngine::reference_command)
            .execute_periodic(0.2, JetEngine::TAU_PERIODIC)
            .unwrap()
    };
    let a = run(7);
    let b = run(7);
    let c = run(8);
    assert_eq!(a, b);
    assert_ne!(a.states, c.states);
}

#[test]
fn rigid_body_trigger_gaps_shrink_with_state_norm() {
    let far: State = DVector::from_vec(vec![3.0, -2.0, 1.0]);
    let near: State = DVector::from_vec(vec![0.3, -0.2, 0.1]);
    assert!(RigidBody::trigger_interval(&far) < RigidBody::trigger_interval(&near));
}
