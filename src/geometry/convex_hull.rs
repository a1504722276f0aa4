// src/geometry/convex_hull.rs
use std::collections::HashSet;

use log::debug;

use crate::utils::{
    add_matrices, add_vectors, component_max, component_min, cross_product, dot_product,
    is_finite_vector, outer_product, scale_matrix, scale_vector, subtract_vectors,
    vector_magnitude, DiceError, Matrix3, Vector3, IDENTITY_MATRIX, ZERO_MATRIX, ZERO_VECTOR,
};

/// Relative tolerance used for duplicate detection and plane tests
const HULL_TOLERANCE: f64 = 1e-9;

/// Outward-facing plane of a hull face: `dot(normal, p) == offset` on the plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HullPlane {
    pub normal: Vector3,
    pub offset: f64,
}

impl HullPlane {
    /// Positive outside the hull, negative inside
    pub fn signed_distance(&self, point: Vector3) -> f64 {
        dot_product(self.normal, point) - self.offset
    }
}

/// Convex collision geometry derived from a point cloud, in the body frame.
#[derive(Debug, Clone)]
pub struct ConvexHullShape {
    vertices: Vec<Vector3>,
    triangles: Vec<[usize; 3]>,
    planes: Vec<HullPlane>,
    volume: f64,
    centroid: Vector3,
    /// Second moment `∫ x xᵀ dV` about the body origin at unit density
    second_moment: Matrix3,
    bounding_radius: f64,
}

impl ConvexHullShape {
    pub fn vertices(&self) -> &[Vector3] {
        &self.vertices
    }

    /// Outward-wound triangles indexing into [`ConvexHullShape::vertices`]
    pub fn triangles(&self) -> &[[usize; 3]] {
        &self.triangles
    }

    /// Distinct face planes (coplanar triangles share one plane)
    pub fn planes(&self) -> &[HullPlane] {
        &self.planes
    }

    pub fn volume(&self) -> f64 {
        self.volume
    }

    pub fn centroid(&self) -> Vector3 {
        self.centroid
    }

    /// True when the centroid sits on the body origin, which dynamics use as the centre
    /// of mass.
    pub fn is_centred(&self) -> bool {
        vector_magnitude(self.centroid) <= 1e-6 * self.bounding_radius.max(1.0)
    }

    /// Distance from the body origin to the farthest hull vertex
    pub fn bounding_radius(&self) -> f64 {
        self.bounding_radius
    }

    /// Inertia tensor about the body origin for a uniform solid of the given mass.
    ///
    /// # Example
    /// ```
    /// use rs_dice::geometry::{build_convex_hull, DieMesh};
    ///
    /// let hull = build_convex_hull(&DieMesh::standard_d6(1.0).positions).unwrap();
    /// let inertia = hull.inertia_tensor(1.0);
    /// assert!((inertia[0][0] - 1.0 / 6.0).abs() < 1e-12);
    /// ```
    pub fn inertia_tensor(&self, mass: f64) -> Matrix3 {
        let c = scale_matrix(&self.second_moment, mass / self.volume);
        let trace = c[0][0] + c[1][1] + c[2][2];
        add_matrices(&scale_matrix(&IDENTITY_MATRIX, trace), &scale_matrix(&c, -1.0))
    }

    /// Largest plane distance: positive outside, zero on the boundary, negative inside
    pub fn signed_distance(&self, point: Vector3) -> f64 {
        self.planes
            .iter()
            .map(|plane| plane.signed_distance(point))
            .fold(f64::NEG_INFINITY, f64::max)
    }

    /// Face plane the point is closest to leaving through, with its distance
    pub fn closest_face(&self, point: Vector3) -> Option<(&HullPlane, f64)> {
        self.planes
            .iter()
            .map(|plane| (plane, plane.signed_distance(point)))
            .max_by(|a, b| a.1.total_cmp(&b.1))
    }

    pub fn contains_point(&self, point: Vector3, tolerance: f64) -> bool {
        self.signed_distance(point) <= tolerance
    }

    /// Axis-aligned bounds in the body frame as `(min, max)`
    pub fn local_bounds(&self) -> (Vector3, Vector3) {
        let first = self.vertices.first().copied().unwrap_or(ZERO_VECTOR);
        self.vertices
            .iter()
            .fold((first, first), |(lo, hi), &v| (component_min(lo, v), component_max(hi, v)))
    }
}

/// Builds the convex hull of a point cloud.
///
/// Duplicate points (as produced by per-triangle vertex buffers) are merged first.
/// The hull is grown incrementally from an initial tetrahedron by replacing the faces a
/// new point can see with a fan over their horizon.
///
/// # Arguments
///
/// * `points` - Vertex positions in the body frame
///
/// # Returns
///
/// * `Ok(ConvexHullShape)` - Hull enclosing every input point
/// * `Err(DiceError::DegenerateGeometry)` - Fewer than four distinct points, collinear or
///   coplanar input, or non-finite coordinates
///
/// # Example
/// ```
/// use rs_dice::geometry::build_convex_hull;
///
/// let tetra = [(0.0, 0.0, 0.0), (1.0, 0.0, 0.0), (0.0, 1.0, 0.0), (0.0, 0.0, 1.0)];
/// let hull = build_convex_hull(&tetra).unwrap();
/// assert!((hull.volume() - 1.0 / 6.0).abs() < 1e-12);
///
/// let flat = [(0.0, 0.0, 0.0), (1.0, 0.0, 0.0), (0.0, 1.0, 0.0), (1.0, 1.0, 0.0)];
/// assert!(build_convex_hull(&flat).is_err());
/// ```
pub fn build_convex_hull(points: &[Vector3]) -> Result<ConvexHullShape, DiceError> {
    if let Some(bad) = points.iter().find(|p| !is_finite_vector(**p)) {
        return Err(DiceError::DegenerateGeometry(format!(
            "non-finite vertex {:?}",
            bad
        )));
    }

    let scale = points
        .iter()
        .map(|p| p.0.abs().max(p.1.abs()).max(p.2.abs()))
        .fold(0.0, f64::max)
        .max(1.0);
    let eps = scale * HULL_TOLERANCE;

    let unique = dedupe_points(points, eps);
    if unique.len() < 4 {
        return Err(DiceError::DegenerateGeometry(format!(
            "need at least 4 distinct points, got {}",
            unique.len()
        )));
    }

    let [a, b, c, d] = initial_tetrahedron(&unique, eps)?;
    let mut faces: Vec<[usize; 3]> = vec![[a, b, c], [a, d, b], [b, d, c], [c, d, a]];

    for index in 0..unique.len() {
        if [a, b, c, d].contains(&index) {
            continue;
        }
        let point = unique[index];

        let visible: Vec<bool> = faces
            .iter()
            .map(|face| face_distance(&unique, face, point) > eps)
            .collect();
        if !visible.contains(&true) {
            continue;
        }

        let visible_edges: HashSet<(usize, usize)> = faces
            .iter()
            .zip(&visible)
            .filter(|(_, v)| **v)
            .flat_map(|(face, _)| face_edges(face))
            .collect();
        let horizon: Vec<(usize, usize)> = faces
            .iter()
            .zip(&visible)
            .filter(|(_, v)| **v)
            .flat_map(|(face, _)| face_edges(face))
            .filter(|&(from, to)| !visible_edges.contains(&(to, from)))
            .collect();

        let mut keep = visible.iter().map(|v| !v);
        faces.retain(|_| keep.next().unwrap_or(true));
        faces.extend(horizon.into_iter().map(|(from, to)| [from, to, index]));
    }

    let shape = finish_hull(&unique, &faces, eps)?;
    debug!(
        "Built convex hull: {} input points, {} vertices, {} faces, volume {:.6}",
        points.len(),
        shape.vertices.len(),
        shape.planes.len(),
        shape.volume
    );
    Ok(shape)
}

fn dedupe_points(points: &[Vector3], eps: f64) -> Vec<Vector3> {
    let mut unique: Vec<Vector3> = Vec::with_capacity(points.len());
    for &p in points {
        let seen = unique
            .iter()
            .any(|&q| vector_magnitude(subtract_vectors(p, q)) <= eps);
        if !seen {
            unique.push(p);
        }
    }
    unique
}

fn farthest_by<F: Fn(Vector3) -> f64>(points: &[Vector3], metric: F) -> (usize, f64) {
    points
        .iter()
        .enumerate()
        .map(|(i, &p)| (i, metric(p)))
        .fold((0, f64::NEG_INFINITY), |best, cur| if cur.1 > best.1 { cur } else { best })
}

/// Picks four affinely independent points, wound so the fourth lies behind the first face.
fn initial_tetrahedron(points: &[Vector3], eps: f64) -> Result<[usize; 4], DiceError> {
    let (a, _) = farthest_by(points, |p| vector_magnitude(subtract_vectors(p, points[0])));
    let (b, span) = farthest_by(points, |p| vector_magnitude(subtract_vectors(p, points[a])));
    if span <= eps {
        return Err(DiceError::DegenerateGeometry("all points coincide".to_string()));
    }

    let axis = scale_vector(subtract_vectors(points[b], points[a]), 1.0 / span);
    let (c, off_line) = farthest_by(points, |p| {
        vector_magnitude(cross_product(subtract_vectors(p, points[a]), axis))
    });
    if off_line <= eps {
        return Err(DiceError::DegenerateGeometry("points are collinear".to_string()));
    }

    let normal = cross_product(
        subtract_vectors(points[b], points[a]),
        subtract_vectors(points[c], points[a]),
    );
    let normal = scale_vector(normal, 1.0 / vector_magnitude(normal));
    let (d, off_plane) = farthest_by(points, |p| {
        dot_product(normal, subtract_vectors(p, points[a])).abs()
    });
    if off_plane <= eps {
        return Err(DiceError::DegenerateGeometry("points are coplanar".to_string()));
    }

    if dot_product(normal, subtract_vectors(points[d], points[a])) > 0.0 {
        Ok([a, c, b, d])
    } else {
        Ok([a, b, c, d])
    }
}

fn face_edges(face: &[usize; 3]) -> [(usize, usize); 3] {
    [(face[0], face[1]), (face[1], face[2]), (face[2], face[0])]
}

fn face_normal(points: &[Vector3], face: &[usize; 3]) -> Vector3 {
    cross_product(
        subtract_vectors(points[face[1]], points[face[0]]),
        subtract_vectors(points[face[2]], points[face[0]]),
    )
}

fn face_distance(points: &[Vector3], face: &[usize; 3], point: Vector3) -> f64 {
    let n = face_normal(points, face);
    let length = vector_magnitude(n);
    if length <= f64::EPSILON {
        return 0.0;
    }
    dot_product(n, subtract_vectors(point, points[face[0]])) / length
}

/// Compacts the vertex list and derives planes and mass properties.
fn finish_hull(
    points: &[Vector3],
    faces: &[[usize; 3]],
    eps: f64,
) -> Result<ConvexHullShape, DiceError> {
    let mut remap = vec![usize::MAX; points.len()];
    let mut vertices = Vec::new();
    let mut triangles = Vec::with_capacity(faces.len());
    for face in faces {
        let mut tri = [0; 3];
        for (slot, &i) in tri.iter_mut().zip(face) {
            if remap[i] == usize::MAX {
                remap[i] = vertices.len();
                vertices.push(points[i]);
            }
            *slot = remap[i];
        }
        triangles.push(tri);
    }

    let mut planes: Vec<HullPlane> = Vec::new();
    let mut volume = 0.0;
    let mut first_moment = ZERO_VECTOR;
    let mut second_moment = ZERO_MATRIX;

    for tri in &triangles {
        let (p0, p1, p2) = (vertices[tri[0]], vertices[tri[1]], vertices[tri[2]]);

        let n = face_normal(&vertices, tri);
        let length = vector_magnitude(n);
        if length > f64::EPSILON {
            let normal = scale_vector(n, 1.0 / length);
            let offset = dot_product(normal, p0);
            let duplicate = planes.iter().any(|plane| {
                dot_product(plane.normal, normal) > 1.0 - 1e-9 && (plane.offset - offset).abs() <= eps * 10.0
            });
            if !duplicate {
                planes.push(HullPlane { normal, offset });
            }
        }

        // Signed tetrahedron spanned by the body origin and this face.
        let det = dot_product(p0, cross_product(p1, p2));
        volume += det / 6.0;
        let sum = add_vectors(add_vectors(p0, p1), p2);
        first_moment = add_vectors(first_moment, scale_vector(sum, det / 24.0));
        let products = add_matrices(
            &add_matrices(&outer_product(p0, p0), &outer_product(p1, p1)),
            &add_matrices(&outer_product(p2, p2), &outer_product(sum, sum)),
        );
        second_moment = add_matrices(&second_moment, &scale_matrix(&products, det / 120.0));
    }

    if volume <= eps {
        return Err(DiceError::DegenerateGeometry(format!(
            "hull volume {} is not positive",
            volume
        )));
    }

    let bounding_radius = vertices.iter().map(|&v| vector_magnitude(v)).fold(0.0, f64::max);

    Ok(ConvexHullShape {
        vertices,
        triangles,
        planes,
        volume,
        centroid: scale_vector(first_moment, 1.0 / volume),
        second_moment,
        bounding_radius,
    })
}
