use approx::assert_abs_diff_eq;
use std::sync::Arc;
use crate::geometry::DieMesh;
use crate::geometry::build_convex_hull;
use crate::models::{BodyHandle, CollisionShape, ContactMaterial, Quaternion, RigidBody, SleepState};
use crate::utils::{DiceError, DEFAULT_CONTACT_MATERIAL};

fn cube_shape() -> CollisionShape {
    let mesh = DieMesh::standard_d6(1.0);
    CollisionShape::ConvexHull(build_convex_hull(&mesh.positions).unwrap())
}

fn material() -> Arc<ContactMaterial> {
    Arc::new(DEFAULT_CONTACT_MATERIAL)
}

#[test]
fn test_dynamic_body_defaults() {
    let body = RigidBody::new(BodyHandle(1), cube_shape(), 2.0, material()).unwrap();

    assert_eq!(body.id(), BodyHandle(1));
    assert_eq!(body.sleep_state(), SleepState::Awake);
    assert!(!body.is_static());
    assert!(body.is_active());
    assert_eq!(body.position(), (0.0, 0.0, 0.0));
    assert_eq!(body.orientation(), Quaternion::identity());
}

#[test]
fn test_zero_mass_is_static_and_ignores_velocity() {
    let body = RigidBody::new(BodyHandle(2), cube_shape(), 0.0, material())
        .unwrap()
        .with_linear_velocity((1.0, 0.0, 0.0));

    assert!(body.is_static());
    assert!(!body.is_active());
    assert_eq!(body.linear_velocity(), (0.0, 0.0, 0.0));
}

#[test]
fn test_invalid_masses_are_rejected() {
    let negative = RigidBody::new(BodyHandle(3), cube_shape(), -1.0, material());
    assert_eq!(negative.unwrap_err(), DiceError::InvalidMass(-1.0));

    let nan = RigidBody::new(BodyHandle(3), cube_shape(), f64::NAN, material());
    assert!(matches!(nan, Err(DiceError::InvalidMass(_))));

    let heavy_plane = RigidBody::new(
        BodyHandle(4),
        CollisionShape::HalfSpace { normal: (0.0, 1.0, 0.0) },
        1.0,
        material(),
    );
    assert_eq!(heavy_plane.unwrap_err(), DiceError::InvalidMass(1.0));
}

#[test]
fn test_impulse_through_centre_only_changes_linear_velocity() {
    let mut body = RigidBody::new(BodyHandle(5), cube_shape(), 2.0, material())
        .unwrap()
        .with_position((0.0, 1.0, 0.0));

    body.apply_impulse_at((4.0, 0.0, 0.0), (0.0, 1.0, 0.0));

    assert_abs_diff_eq!(body.linear_velocity().0, 2.0, epsilon = 1e-12);
    assert_abs_diff_eq!(body.angular_velocity().2, 0.0, epsilon = 1e-12);
}

#[test]
fn test_off_centre_impulse_spins_the_body() {
    let mut body = RigidBody::new(BodyHandle(6), cube_shape(), 1.0, material()).unwrap();

    // Unit cube, mass 1: I = 1/6 about every axis.
    body.apply_impulse_at((1.0, 0.0, 0.0), (0.0, 0.5, 0.0));

    assert_abs_diff_eq!(body.angular_velocity().2, -3.0, epsilon = 1e-9);
    assert_abs_diff_eq!(body.kinetic_energy(), 0.5 + 0.5 * (1.0 / 6.0) * 9.0, epsilon = 1e-9);
}

#[test]
fn test_world_and_local_transforms_are_inverse() {
    let body = RigidBody::new(BodyHandle(7), cube_shape(), 1.0, material())
        .unwrap()
        .with_position((1.0, 2.0, 3.0))
        .with_orientation(Quaternion::from_axis_angle((0.0, 1.0, 1.0), 0.7));

    let local = (0.5, -0.5, 0.5);
    let back = body.to_local(body.to_world(local));
    assert_abs_diff_eq!(back.0, local.0, epsilon = 1e-12);
    assert_abs_diff_eq!(back.1, local.1, epsilon = 1e-12);
    assert_abs_diff_eq!(back.2, local.2, epsilon = 1e-12);
    assert_eq!(body.world_vertices().len(), 8);
}
