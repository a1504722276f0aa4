use approx::assert_relative_eq;
use crate::session::FrameClock;

#[test]
fn test_deltas_follow_readings() {
    let mut clock = FrameClock::new();

    assert_relative_eq!(clock.tick(1.0 / 60.0), 1.0 / 60.0);
    assert_relative_eq!(clock.tick(3.0 / 60.0), 2.0 / 60.0, epsilon = 1e-12);
    assert_eq!(clock.tick(3.0 / 60.0), 0.0);
    assert_relative_eq!(clock.previous_elapsed(), 0.05, epsilon = 1e-12);
}

#[test]
fn test_clock_going_backwards_gives_zero() {
    let mut clock = FrameClock::new();
    clock.tick(2.0);

    assert_eq!(clock.tick(1.5), 0.0);
    assert_relative_eq!(clock.tick(1.75), 0.25);
}

#[test]
fn test_non_finite_reading_is_ignored() {
    let mut clock = FrameClock::new();
    clock.tick(1.0);

    assert_eq!(clock.tick(f64::NAN), 0.0);
    assert_eq!(clock.tick(f64::INFINITY), 0.0);
    assert_relative_eq!(clock.previous_elapsed(), 1.0);
    assert_relative_eq!(clock.tick(1.5), 0.5);
}
