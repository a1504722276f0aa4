use approx::assert_abs_diff_eq;
use crate::geometry::{build_convex_hull, DieMesh};
use crate::models::{BodyHandle, CollisionShape, Quaternion, RigidBody, SleepState};
use crate::session::build_tray;
use crate::utils::{DiceError, SessionConfig, DEFAULT_FIXED_TIME_STEP, DEFAULT_TRAY};
use crate::world::World;

const H: f64 = DEFAULT_FIXED_TIME_STEP;

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn world_with_tray() -> World {
    let mut world = World::new(SessionConfig::default()).unwrap();
    build_tray(&mut world, DEFAULT_TRAY).unwrap();
    world
}

fn new_die(world: &mut World, position: (f64, f64, f64), orientation: Quaternion) -> RigidBody {
    let hull = build_convex_hull(&DieMesh::standard_d6(1.0).positions).unwrap();
    RigidBody::new(world.allocate_handle(), CollisionShape::ConvexHull(hull), 1.0, world.material())
        .unwrap()
        .with_position(position)
        .with_orientation(orientation)
}

fn drop_die(world: &mut World, position: (f64, f64, f64), orientation: Quaternion) -> BodyHandle {
    let die = new_die(world, position, orientation);
    world.register_body(die).unwrap()
}

/// Runs frames of one sub-step each until the body sleeps; returns the frames used.
fn run_until_asleep(world: &mut World, handle: BodyHandle, max_ticks: usize) -> Option<usize> {
    for tick in 1..=max_ticks {
        world.step(H, 3);
        if world.body(handle).unwrap().is_sleeping() {
            return Some(tick);
        }
    }
    None
}

#[test]
fn test_boundary_bodies_never_move() {
    init_logger();
    let mut world = world_with_tray();
    let before: Vec<_> = world
        .boundary_bodies()
        .iter()
        .map(|&h| (world.body(h).unwrap().position(), world.body(h).unwrap().orientation()))
        .collect();

    let die = new_die(&mut world, (9.0, 2.0, 4.0), Quaternion::from_axis_angle((1.0, 1.0, 0.0), 0.4))
        .with_linear_velocity((6.0, -2.0, 5.0))
        .with_angular_velocity((3.0, 0.0, -4.0));
    world.register_body(die).unwrap();

    for _ in 0..300 {
        world.step(H, 3);
        let after: Vec<_> = world
            .boundary_bodies()
            .iter()
            .map(|&h| (world.body(h).unwrap().position(), world.body(h).unwrap().orientation()))
            .collect();
        assert_eq!(before, after, "a static body moved");
    }
    assert_eq!(world.boundary_bodies().len(), 5);
}

#[test]
fn test_large_frame_is_caught_up_over_later_calls() {
    let mut world = world_with_tray();
    drop_die(&mut world, (0.0, 3.0, 0.0), Quaternion::identity());

    assert_eq!(world.step(5.0, 3), 3);
    assert_abs_diff_eq!(world.simulated_time(), 3.0 * H, epsilon = 1e-12);
    assert!(world.accumulated_time() > 4.9);

    let mut total = 3;
    for _ in 0..200 {
        let performed = world.step(0.0, 3);
        assert!(performed <= 3);
        if performed == 0 {
            break;
        }
        total += performed;
        assert!(world.simulated_time() <= 5.0 + 1e-9);
    }

    // 300 sub-steps in exact arithmetic; rounding may leave the last one pending.
    assert!(total == 299 || total == 300, "performed {} sub-steps", total);
    assert!(world.accumulated_time() < H + 1e-9);
    assert_abs_diff_eq!(world.simulated_time() + world.accumulated_time(), 5.0, epsilon = 1e-9);
    assert_eq!(world.step(0.0, 3), 0);
}

#[test]
fn test_partial_frames_carry_over() {
    let mut world = World::new(SessionConfig::default()).unwrap();

    assert_eq!(world.step(0.6 * H, 3), 0);
    assert_abs_diff_eq!(world.accumulated_time(), 0.6 * H, epsilon = 1e-12);
    assert_eq!(world.step(0.6 * H, 3), 1);
    assert_abs_diff_eq!(world.accumulated_time(), 0.2 * H, epsilon = 1e-12);
    assert_abs_diff_eq!(world.simulated_time(), H, epsilon = 1e-12);
}

#[test]
fn test_invalid_frame_times_advance_nothing() {
    let mut world = World::new(SessionConfig::default()).unwrap();

    assert_eq!(world.step(-1.0, 3), 0);
    assert_eq!(world.step(f64::NAN, 3), 0);
    assert_eq!(world.step(f64::INFINITY, 3), 0);
    assert_eq!(world.simulated_time(), 0.0);
    assert_eq!(world.accumulated_time(), 0.0);
}

#[test]
fn test_duplicate_registration_is_rejected_whole() {
    let mut world = world_with_tray();
    let handle = drop_die(&mut world, (0.0, 1.0, 0.0), Quaternion::identity());
    let count = world.body_count();

    let hull = build_convex_hull(&DieMesh::standard_d6(1.0).positions).unwrap();
    let twin = RigidBody::new(handle, CollisionShape::ConvexHull(hull), 1.0, world.material())
        .unwrap()
        .with_position((5.0, 5.0, 0.0));

    assert_eq!(world.register_body(twin), Err(DiceError::DuplicateBody(handle)));
    assert_eq!(world.body_count(), count);
    assert_eq!(world.body(handle).unwrap().position(), (0.0, 1.0, 0.0));
}

#[test]
fn test_unknown_bodies() {
    let mut world = World::new(SessionConfig::default()).unwrap();
    let missing = BodyHandle(77);

    assert!(matches!(world.deregister_body(missing), Err(DiceError::UnknownBody(_))));
    assert_eq!(world.wake_up(missing), Err(DiceError::UnknownBody(missing)));
    assert_eq!(
        world.apply_impulse(missing, (1.0, 0.0, 0.0), (0.0, 0.0, 0.0)),
        Err(DiceError::UnknownBody(missing))
    );
}

#[test]
fn test_boundary_must_be_static() {
    let mut world = World::new(SessionConfig::default()).unwrap();
    let die = new_die(&mut world, (0.0, 1.0, 0.0), Quaternion::identity());

    assert_eq!(world.register_boundary(die), Err(DiceError::InvalidMass(1.0)));
    assert_eq!(world.body_count(), 0);
}

#[test]
fn test_dropped_die_comes_to_rest() {
    init_logger();
    let orientations = [
        Quaternion::identity(),
        Quaternion::from_axis_angle((1.0, 0.0, 0.0), 0.3),
        Quaternion::from_axis_angle((0.0, 1.0, 1.0), 0.2),
    ];

    for height in [1.0, 2.0, 3.0] {
        for orientation in orientations {
            let mut world = world_with_tray();
            let handle = drop_die(&mut world, (0.0, height, 0.0), orientation);

            let ticks = run_until_asleep(&mut world, handle, 600);
            assert!(ticks.is_some(), "die dropped from {} never fell asleep", height);

            let body = world.body(handle).unwrap();
            assert_eq!(body.sleep_state(), SleepState::Sleeping);
            assert_eq!(body.linear_velocity(), (0.0, 0.0, 0.0));
            assert!(
                (0.4..0.6).contains(&body.position().1),
                "die rests at height {}",
                body.position().1
            );
            assert_eq!(world.awake_body_count(), 0);
        }
    }
}

#[test]
fn test_free_fall_and_bounce_never_gain_energy() {
    let mut world = world_with_tray();
    let handle = drop_die(&mut world, (0.0, 2.0, 0.0), Quaternion::identity());
    let g = -world.gravity().1;
    let energy = |world: &World| {
        let body = world.body(handle).unwrap();
        body.kinetic_energy() + body.mass() * g * body.position().1
    };
    let initial = energy(&world);

    for _ in 0..240 {
        world.step(H, 3);
        assert!(energy(&world) <= initial + 1e-9);
    }
}

#[test]
fn test_impulses_wake_sleeping_dice_only_above_threshold() {
    let mut world = world_with_tray();
    let handle = drop_die(&mut world, (0.0, 0.5, 0.0), Quaternion::identity());
    world.put_to_sleep(handle).unwrap();

    world.apply_impulse(handle, (0.0, 0.1, 0.0), (0.0, 0.5, 0.0)).unwrap();
    let body = world.body(handle).unwrap();
    assert!(body.is_sleeping());
    assert_eq!(body.linear_velocity(), (0.0, 0.0, 0.0));

    world.apply_impulse(handle, (0.0, 3.0, 0.0), (0.0, 0.5, 0.0)).unwrap();
    let body = world.body(handle).unwrap();
    assert!(!body.is_sleeping());
    assert_abs_diff_eq!(body.linear_velocity().1, 3.0, epsilon = 1e-12);

    // Static bodies shrug impulses off.
    let floor = world.boundary_bodies()[0];
    world.apply_impulse(floor, (0.0, 100.0, 0.0), (0.0, 0.0, 0.0)).unwrap();
    assert_eq!(world.body(floor).unwrap().linear_velocity(), (0.0, 0.0, 0.0));
}

#[test]
fn test_sleeping_die_is_skipped_until_woken() {
    let mut world = world_with_tray();
    let handle = drop_die(&mut world, (0.0, 4.0, 0.0), Quaternion::identity());
    world.put_to_sleep(handle).unwrap();

    for _ in 0..30 {
        world.step(H, 3);
    }
    assert_eq!(world.body(handle).unwrap().position(), (0.0, 4.0, 0.0));

    assert_eq!(world.body(handle).unwrap().wake_count(), 0);
    world.wake_up(handle).unwrap();
    world.wake_up(handle).unwrap();
    assert_eq!(world.body(handle).unwrap().wake_count(), 1);

    world.step(H, 3);
    assert!(world.body(handle).unwrap().position().1 < 4.0);
}

#[test]
fn test_falling_die_wakes_the_one_below() {
    init_logger();
    let mut world = world_with_tray();
    let lower = drop_die(&mut world, (0.0, 0.5, 0.0), Quaternion::identity());
    world.put_to_sleep(lower).unwrap();
    let upper = drop_die(
        &mut world,
        (0.2, 2.5, 0.2),
        Quaternion::from_axis_angle((0.0, 1.0, 0.0), 0.3),
    );

    let mut woke = false;
    for _ in 0..300 {
        world.step(H, 3);
        woke |= !world.body(lower).unwrap().is_sleeping();
    }
    assert!(woke, "impact should wake the resting die");

    let a = world.body(lower).unwrap().position();
    let b = world.body(upper).unwrap().position();
    assert!(a.0.is_finite() && b.0.is_finite());
    let gap = ((a.0 - b.0).powi(2) + (a.1 - b.1).powi(2) + (a.2 - b.2).powi(2)).sqrt();
    assert!(gap > 0.9, "dice interpenetrate: centres {:?} and {:?}", a, b);
}
