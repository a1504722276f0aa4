use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};
use rand::rngs::StdRng;
use rand::SeedableRng;
use crate::geometry::DieMesh;
use crate::models::Quaternion;
use crate::outcome::ResolutionState;
use crate::session::{DiceSession, DieHandle, ThrowParams};
use crate::utils::{DiceError, SessionConfig, ZERO_VECTOR};

const SETTLE_TICKS: usize = 900;

fn session() -> DiceSession {
    DiceSession::with_mesh(SessionConfig::default(), DieMesh::standard_d6(1.0)).unwrap()
}

#[test]
fn test_roll_without_mesh_fails() {
    let mut session = DiceSession::new(SessionConfig::default()).unwrap();
    assert!(!session.has_mesh());
    assert_eq!(session.request_roll((0.0, 2.0, 0.0)), Err(DiceError::MeshNotLoaded));
    assert_eq!(session.die_count(), 0);

    session.set_die_mesh(DieMesh::standard_d6(1.0));
    assert!(session.request_roll((0.0, 2.0, 0.0)).is_ok());
    assert_eq!(session.die_count(), 1);
}

#[test]
fn test_invalid_config_is_rejected() {
    let config = SessionConfig {
        fixed_time_step: 0.0,
        ..SessionConfig::default()
    };
    assert!(matches!(DiceSession::new(config), Err(DiceError::InvalidConfiguration(_))));
}

#[test]
fn test_result_waits_for_rest() {
    let mut session = session();
    let die = session.request_roll((0.0, 2.0, 0.0)).unwrap();

    assert_eq!(session.result_of(die), Err(DiceError::NotSettled(die)));
    session.step_delta(1.0 / 60.0);
    assert_eq!(session.result_of(die), Err(DiceError::NotSettled(die)));
    assert_eq!(session.state_of(die), Ok(ResolutionState::Tumbling));
}

#[test]
fn test_flat_drop_shows_top_face() {
    let mut session = session();
    let die = session.request_roll((0.0, 2.0, 0.0)).unwrap();

    assert!(session.run_until_settled(SETTLE_TICKS));
    assert_eq!(session.result_of(die), Ok(1));
    assert_eq!(session.state_of(die), Ok(ResolutionState::Resolved(1)));
    assert_eq!(session.result_of(die), Ok(1));

    let pose = session.pose_of(die).unwrap();
    assert!(pose.position.1 > 0.4 && pose.position.1 < 0.6, "y = {}", pose.position.1);
}

#[test]
fn test_rotated_drop_shows_other_face() {
    let mut session = session();
    let throw = ThrowParams {
        orientation: Quaternion::from_axis_angle((0.0, 0.0, 1.0), FRAC_PI_2),
        ..ThrowParams::at((3.0, 1.5, -2.0))
    };
    let die = session.request_throw(throw).unwrap();

    assert!(session.run_until_settled(SETTLE_TICKS));
    assert_eq!(session.result_of(die), Ok(2));
}

#[test]
fn test_woken_die_must_settle_again() {
    let mut session = session();
    let die = session.request_roll((0.0, 1.0, 0.0)).unwrap();
    assert!(session.run_until_settled(SETTLE_TICKS));
    assert_eq!(session.result_of(die), Ok(1));

    // A second die landing on the first wakes it.
    let upper = ThrowParams {
        orientation: Quaternion::from_axis_angle((0.0, 1.0, 0.0), 0.3),
        ..ThrowParams::at((0.2, 2.5, 0.2))
    };
    session.request_throw(upper).unwrap();
    let mut woke = false;
    for _ in 0..300 {
        session.step_delta(1.0 / 60.0);
        if session.state_of(die) == Ok(ResolutionState::Tumbling) {
            woke = true;
            break;
        }
    }
    assert!(woke);
    assert_eq!(session.result_of(die), Err(DiceError::NotSettled(die)));
}

#[test]
fn test_unknown_die_is_reported() {
    let mut session = session();
    let ghost = DieHandle(99);

    assert_eq!(session.result_of(ghost), Err(DiceError::UnknownDie(ghost)));
    assert_eq!(session.pose_of(ghost), Err(DiceError::UnknownDie(ghost)));
    assert_eq!(session.remove_die(ghost), Err(DiceError::UnknownDie(ghost)));
}

#[test]
fn test_remove_and_reset() {
    let mut session = session();
    let tray_bodies = session.world().body_count();

    let first = session.request_roll((-3.0, 2.0, 0.0)).unwrap();
    let second = session.request_roll((3.0, 2.0, 0.0)).unwrap();
    assert_eq!(session.world().body_count(), tray_bodies + 2);

    session.remove_die(first).unwrap();
    assert_eq!(session.dice().collect::<Vec<_>>(), vec![second]);
    assert_eq!(session.pose_of(first), Err(DiceError::UnknownDie(first)));

    session.reset();
    assert_eq!(session.die_count(), 0);
    assert_eq!(session.world().body_count(), tray_bodies);
    assert!(session.all_settled());
}

#[test]
fn test_step_uses_clock_readings() {
    let mut session = session();
    session.request_roll((0.0, 2.0, 0.0)).unwrap();

    assert_eq!(session.step(1.0 / 60.0), 1);
    assert_eq!(session.step(1.0 / 60.0), 0);
    assert_eq!(session.step(0.0), 0);
    assert_eq!(session.step(10.0), session.config().max_sub_steps);
}

#[test]
fn test_spread_dice_all_resolve() {
    let mut session = session();
    let spins = [(2.0, 0.0, 1.0), (0.0, 1.5, -2.0), (-1.0, 2.0, 0.0), (1.0, -1.0, 1.0)];

    let dice: Vec<DieHandle> = [-6.0, -2.0, 2.0, 6.0]
        .iter()
        .zip(spins)
        .map(|(&x, spin)| {
            let throw = ThrowParams {
                angular_velocity: spin,
                ..ThrowParams::at((x, 1.5, 0.0))
            };
            session.request_throw(throw).unwrap()
        })
        .collect();

    assert!(session.run_until_settled(SETTLE_TICKS * 2));
    let results = session.results();
    assert_eq!(results.len(), dice.len());
    for (die, result) in results {
        let value = result.unwrap_or_else(|e| panic!("die {} failed: {}", die, e));
        assert!((1..=6).contains(&value));
    }
}

#[test]
fn test_seeded_throws_are_deterministic() {
    let run = |seed: u64| {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut session = session();
        for _ in 0..3 {
            session.request_random_throw(&mut rng).unwrap();
        }
        for _ in 0..240 {
            session.step_delta(1.0 / 60.0);
        }
        let poses: Vec<_> = session
            .dice()
            .map(|die| session.pose_of(die).unwrap())
            .collect();
        poses
    };

    assert_eq!(run(7), run(7));
}

#[test]
fn test_random_throw_lands_inside_tray() {
    let config = SessionConfig::default();
    let (half_width, half_depth) = config.tray.half_extents();
    let mut rng = StdRng::seed_from_u64(11);

    for _ in 0..50 {
        let throw = ThrowParams::random(&mut rng, config.tray);
        assert!(throw.position.0.abs() < half_width);
        assert!(throw.position.2.abs() < half_depth);
        assert!(throw.position.1 >= 2.0);
        assert!((throw.orientation.magnitude() - 1.0).abs() < 1e-12);
    }

    let still = ThrowParams::at((1.0, 2.0, 3.0));
    assert_eq!(still.linear_velocity, ZERO_VECTOR);
    assert_eq!(still.orientation, Quaternion::identity());
}

#[test]
fn test_unresolved_face_leaves_die_untouched() {
    let mut session = session();
    let on_edge = ThrowParams {
        orientation: Quaternion::from_axis_angle((0.0, 0.0, 1.0), FRAC_PI_4),
        ..ThrowParams::at((0.0, 0.75, 0.0))
    };
    let die = session.request_throw(on_edge).unwrap();
    let body = session.body_handle(die).unwrap();
    session.world_mut().put_to_sleep(body).unwrap();
    session.step_delta(0.0);
    assert_eq!(session.state_of(die), Ok(ResolutionState::Settled));

    let pose = session.pose_of(die).unwrap();
    for _ in 0..2 {
        let result = session.result_of(die);
        assert!(
            matches!(result, Err(DiceError::UnresolvedFace { die: d, .. }) if d == die),
            "got {:?}",
            result
        );
        assert_eq!(session.pose_of(die), Ok(pose));
        assert_eq!(session.state_of(die), Ok(ResolutionState::Settled));
        assert!(session.world().body(body).unwrap().is_sleeping());
    }

    // Nothing else moves, so the die stays put and keeps failing the same way.
    session.step_delta(1.0 / 60.0);
    assert_eq!(session.pose_of(die), Ok(pose));
    assert!(matches!(session.result_of(die), Err(DiceError::UnresolvedFace { .. })));
}

#[test]
fn test_wake_and_sleep_within_one_step_drops_cached_result() {
    let mut session = session();
    let die = session.request_roll((0.0, 1.0, 0.0)).unwrap();
    assert!(session.run_until_settled(SETTLE_TICKS));
    assert_eq!(session.result_of(die), Ok(1));

    let body = session.body_handle(die).unwrap();
    session.world_mut().wake_up(body).unwrap();
    session.world_mut().put_to_sleep(body).unwrap();
    session.step_delta(0.0);

    assert_eq!(session.state_of(die), Ok(ResolutionState::Settled));
    assert_eq!(session.result_of(die), Ok(1));
    assert_eq!(session.state_of(die), Ok(ResolutionState::Resolved(1)));
}
