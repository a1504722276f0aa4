// src/geometry/die_mesh.rs
use crate::utils::{cross_product, dot_product, scale_vector, subtract_vectors, add_vectors, DiceError, Vector3};

/// Surface-coordinate half extents of one face inside its atlas cell
const FACE_U_HALF_EXTENT: f64 = 0.15;
const FACE_V_HALF_EXTENT: f64 = 0.2;

/// Atlas cell centres of the standard d6, indexed by face value - 1
pub const STANDARD_D6_FACE_CENTRES: [(f64, f64); 6] = [
    (0.17, 0.75),
    (0.5, 0.75),
    (0.83, 0.75),
    (0.17, 0.25),
    (0.5, 0.25),
    (0.83, 0.25),
];

/// Triangle soup of a die in its body frame, with one surface coordinate per vertex.
///
/// Every three consecutive positions form one triangle, the layout produced by
/// non-indexed vertex buffers.
///
/// The mesh origin becomes the body origin. Dynamics treat it as the centre of mass and
/// results are read by probing upward from it, so meshes should be authored centred on
/// their centroid. An off-centre mesh still rolls, but tumbles as if its mass sat at
/// the origin.
#[derive(Debug, Clone, PartialEq)]
pub struct DieMesh {
    pub positions: Vec<Vector3>,
    pub uvs: Vec<(f64, f64)>,
}

/// Result of probing a mesh with a ray
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    pub distance: f64,
    pub point: Vector3,
    pub uv: (f64, f64),
    pub triangle: usize,
}

impl DieMesh {
    pub fn new(positions: Vec<Vector3>, uvs: Vec<(f64, f64)>) -> Result<Self, DiceError> {
        if positions.is_empty() || positions.len() % 3 != 0 {
            return Err(DiceError::InvalidMesh(format!(
                "expected a whole number of triangles, got {} vertices",
                positions.len()
            )));
        }
        if uvs.len() != positions.len() {
            return Err(DiceError::InvalidMesh(format!(
                "{} surface coordinates for {} vertices",
                uvs.len(),
                positions.len()
            )));
        }
        Ok(Self { positions, uvs })
    }

    /// Builds a mesh from flat buffers as delivered by an asset loader.
    ///
    /// # Arguments
    ///
    /// * `positions` - `x, y, z` triples, three vertices per triangle
    /// * `uvs` - `u, v` pairs, one per vertex
    ///
    /// # Example
    /// ```
    /// use rs_dice::geometry::DieMesh;
    ///
    /// let mesh = DieMesh::from_flat(
    ///     &[0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0],
    ///     &[0.0, 0.0, 1.0, 0.0, 0.0, 1.0],
    /// ).unwrap();
    /// assert_eq!(mesh.triangle_count(), 1);
    /// assert!(DieMesh::from_flat(&[0.0, 0.0], &[]).is_err());
    /// ```
    pub fn from_flat(positions: &[f64], uvs: &[f64]) -> Result<Self, DiceError> {
        if positions.len() % 3 != 0 {
            return Err(DiceError::InvalidMesh(format!(
                "position buffer length {} is not a multiple of 3",
                positions.len()
            )));
        }
        if uvs.len() % 2 != 0 {
            return Err(DiceError::InvalidMesh(format!(
                "surface coordinate buffer length {} is not a multiple of 2",
                uvs.len()
            )));
        }
        let positions = positions.chunks_exact(3).map(|c| (c[0], c[1], c[2])).collect();
        let uvs = uvs.chunks_exact(2).map(|c| (c[0], c[1])).collect();
        Self::new(positions, uvs)
    }

    /// Axis-aligned cube of edge length `size` centred on the origin, with the surface
    /// coordinates of the standard pip atlas.
    ///
    /// Face values: `+Y = 1`, `+X = 2`, `-Z = 3`, `+Z = 4`, `-X = 5`, `-Y = 6`, so opposite
    /// faces sum to seven. The centre of face `n` maps to `STANDARD_D6_FACE_CENTRES[n - 1]`.
    pub fn standard_d6(size: f64) -> Self {
        // (face value, outward normal, u axis, v axis) with u × v == normal
        let faces: [(usize, Vector3, Vector3, Vector3); 6] = [
            (1, (0.0, 1.0, 0.0), (1.0, 0.0, 0.0), (0.0, 0.0, -1.0)),
            (2, (1.0, 0.0, 0.0), (0.0, 0.0, -1.0), (0.0, 1.0, 0.0)),
            (3, (0.0, 0.0, -1.0), (-1.0, 0.0, 0.0), (0.0, 1.0, 0.0)),
            (4, (0.0, 0.0, 1.0), (1.0, 0.0, 0.0), (0.0, 1.0, 0.0)),
            (5, (-1.0, 0.0, 0.0), (0.0, 0.0, 1.0), (0.0, 1.0, 0.0)),
            (6, (0.0, -1.0, 0.0), (1.0, 0.0, 0.0), (0.0, 0.0, 1.0)),
        ];
        let half = size / 2.0;
        let corners = [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)];

        let mut positions = Vec::with_capacity(36);
        let mut uvs = Vec::with_capacity(36);
        for (value, normal, u_axis, v_axis) in faces {
            let (cu, cv) = STANDARD_D6_FACE_CENTRES[value - 1];
            let quad: Vec<(Vector3, (f64, f64))> = corners
                .iter()
                .map(|&(s, t)| {
                    let p = add_vectors(
                        scale_vector(normal, half),
                        add_vectors(scale_vector(u_axis, s * half), scale_vector(v_axis, t * half)),
                    );
                    (p, (cu + s * FACE_U_HALF_EXTENT, cv + t * FACE_V_HALF_EXTENT))
                })
                .collect();
            for i in [0, 1, 2, 0, 2, 3] {
                positions.push(quad[i].0);
                uvs.push(quad[i].1);
            }
        }

        Self { positions, uvs }
    }

    pub fn triangle_count(&self) -> usize {
        self.positions.len() / 3
    }

    /// Casts a ray against every triangle, both sides, and returns the nearest hit.
    ///
    /// Hits on shared edges count for either triangle. The surface coordinate of the hit
    /// is interpolated from the triangle's vertices.
    pub fn raycast(&self, origin: Vector3, direction: Vector3) -> Option<RayHit> {
        let mut nearest: Option<RayHit> = None;

        for (triangle, (tri, tri_uv)) in self
            .positions
            .chunks_exact(3)
            .zip(self.uvs.chunks_exact(3))
            .enumerate()
        {
            let Some((distance, u, v)) = intersect_triangle(origin, direction, tri[0], tri[1], tri[2]) else {
                continue;
            };
            if nearest.is_some_and(|hit| hit.distance <= distance) {
                continue;
            }

            let w = 1.0 - u - v;
            let uv = (
                w * tri_uv[0].0 + u * tri_uv[1].0 + v * tri_uv[2].0,
                w * tri_uv[0].1 + u * tri_uv[1].1 + v * tri_uv[2].1,
            );
            nearest = Some(RayHit {
                distance,
                point: add_vectors(origin, scale_vector(direction, distance)),
                uv,
                triangle,
            });
        }

        nearest
    }
}

/// Möller–Trumbore intersection returning `(t, u, v)` for hits in front of the origin.
fn intersect_triangle(
    origin: Vector3,
    direction: Vector3,
    v0: Vector3,
    v1: Vector3,
    v2: Vector3,
) -> Option<(f64, f64, f64)> {
    const EPSILON: f64 = 1e-12;
    const EDGE_TOLERANCE: f64 = 1e-9;

    let edge1 = subtract_vectors(v1, v0);
    let edge2 = subtract_vectors(v2, v0);
    let p = cross_product(direction, edge2);
    let det = dot_product(edge1, p);
    if det.abs() < EPSILON {
        return None;
    }
    let inv_det = 1.0 / det;

    let s = subtract_vectors(origin, v0);
    let u = dot_product(s, p) * inv_det;
    if u < -EDGE_TOLERANCE || u > 1.0 + EDGE_TOLERANCE {
        return None;
    }

    let q = cross_product(s, edge1);
    let v = dot_product(direction, q) * inv_det;
    if v < -EDGE_TOLERANCE || u + v > 1.0 + EDGE_TOLERANCE {
        return None;
    }

    let t = dot_product(edge2, q) * inv_det;
    if t > EPSILON {
        Some((t, u, v))
    } else {
        None
    }
}
