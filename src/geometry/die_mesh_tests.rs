use approx::assert_abs_diff_eq;
use crate::geometry::{DieMesh, STANDARD_D6_FACE_CENTRES};
use crate::utils::DiceError;

#[test]
fn test_standard_d6_face_centres() {
    let mesh = DieMesh::standard_d6(1.0);
    let probes = [
        ((0.0, 1.0, 0.0), 1),
        ((1.0, 0.0, 0.0), 2),
        ((0.0, 0.0, -1.0), 3),
        ((0.0, 0.0, 1.0), 4),
        ((-1.0, 0.0, 0.0), 5),
        ((0.0, -1.0, 0.0), 6),
    ];

    for (direction, value) in probes {
        let hit = mesh.raycast((0.0, 0.0, 0.0), direction).expect("ray should leave the cube");
        let expected = STANDARD_D6_FACE_CENTRES[value - 1];
        assert_abs_diff_eq!(hit.distance, 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(hit.uv.0, expected.0, epsilon = 1e-12);
        assert_abs_diff_eq!(hit.uv.1, expected.1, epsilon = 1e-12);
    }
}

#[test]
fn test_raycast_picks_nearest_hit_from_outside() {
    let mesh = DieMesh::standard_d6(1.0);
    let hit = mesh.raycast((0.0, 5.0, 0.0), (0.0, -1.0, 0.0)).unwrap();

    assert_abs_diff_eq!(hit.distance, 4.5, epsilon = 1e-12);
    assert_abs_diff_eq!(hit.point.1, 0.5, epsilon = 1e-12);
}

#[test]
fn test_raycast_misses() {
    let mesh = DieMesh::standard_d6(1.0);
    assert!(mesh.raycast((0.0, 5.0, 0.0), (0.0, 1.0, 0.0)).is_none());
    assert!(mesh.raycast((3.0, 0.0, 0.0), (0.0, 1.0, 0.0)).is_none());
}

#[test]
fn test_raycast_interpolates_surface_coordinates() {
    let mesh = DieMesh::standard_d6(1.0);
    // A quarter of the way towards the +X edge of the top face.
    let hit = mesh.raycast((0.25, 0.0, 0.0), (0.0, 1.0, 0.0)).unwrap();

    assert_abs_diff_eq!(hit.uv.0, 0.17 + 0.075, epsilon = 1e-12);
    assert_abs_diff_eq!(hit.uv.1, 0.75, epsilon = 1e-12);
}

#[test]
fn test_mismatched_buffers_are_rejected() {
    let three_vertices = [0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0];

    assert!(matches!(
        DieMesh::from_flat(&three_vertices, &[0.0, 0.0]),
        Err(DiceError::InvalidMesh(_))
    ));
    assert!(matches!(
        DieMesh::from_flat(&three_vertices[..6], &[0.0; 4]),
        Err(DiceError::InvalidMesh(_))
    ));
    assert!(matches!(
        DieMesh::from_flat(&three_vertices, &[0.0; 5]),
        Err(DiceError::InvalidMesh(_))
    ));
    assert!(DieMesh::from_flat(&three_vertices, &[0.0; 6]).is_ok());
}
