//! Tuple based vector and 3x3 matrix helpers shared by the geometry and solver code.

/// A 3D vector as `(x, y, z)`.
pub type Vector3 = (f64, f64, f64);

/// A row-major 3x3 matrix.
pub type Matrix3 = [[f64; 3]; 3];

pub const ZERO_VECTOR: Vector3 = (0.0, 0.0, 0.0);

pub const IDENTITY_MATRIX: Matrix3 = [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]];

pub const ZERO_MATRIX: Matrix3 = [[0.0; 3]; 3];

#[inline]
pub fn add_vectors(a: Vector3, b: Vector3) -> Vector3 {
    (a.0 + b.0, a.1 + b.1, a.2 + b.2)
}

#[inline]
pub fn subtract_vectors(a: Vector3, b: Vector3) -> Vector3 {
    (a.0 - b.0, a.1 - b.1, a.2 - b.2)
}

#[inline]
pub fn scale_vector(v: Vector3, factor: f64) -> Vector3 {
    (v.0 * factor, v.1 * factor, v.2 * factor)
}

/// Calculates the cross product of two 3D vectors.
///
/// # Example
/// ```
/// use rs_dice::utils::cross_product;
///
/// let result = cross_product((1.0, 0.0, 0.0), (0.0, 1.0, 0.0));
/// assert_eq!(result, (0.0, 0.0, 1.0));
/// ```
#[inline]
pub fn cross_product(v1: Vector3, v2: Vector3) -> Vector3 {
    (
        v1.1 * v2.2 - v1.2 * v2.1,
        v1.2 * v2.0 - v1.0 * v2.2,
        v1.0 * v2.1 - v1.1 * v2.0
    )
}

/// Calculates the dot product of two 3D vectors.
///
/// # Example
/// ```
/// use rs_dice::utils::dot_product;
///
/// assert_eq!(dot_product((1.0, 2.0, 3.0), (4.0, 5.0, 6.0)), 32.0);
/// ```
#[inline]
pub fn dot_product(v1: Vector3, v2: Vector3) -> f64 {
    v1.0 * v2.0 + v1.1 * v2.1 + v1.2 * v2.2
}

/// Vector utility: magnitude calculation
#[inline]
pub fn vector_magnitude(v: Vector3) -> f64 {
    dot_product(v, v).sqrt()
}

/// Normalizes a 3D vector.
///
/// # Returns
/// `None` if the vector is too short to have a direction.
///
/// # Example
/// ```
/// use rs_dice::utils::normalize_vector;
///
/// let n = normalize_vector((3.0, 0.0, 4.0)).unwrap();
/// assert!((n.0 - 0.6).abs() < 1e-12);
/// assert!((n.2 - 0.8).abs() < 1e-12);
/// assert!(normalize_vector((0.0, 0.0, 0.0)).is_none());
/// ```
#[inline]
pub fn normalize_vector(v: Vector3) -> Option<Vector3> {
    let magnitude = vector_magnitude(v);
    if magnitude < 1e-12 || !magnitude.is_finite() {
        return None;
    }
    Some(scale_vector(v, 1.0 / magnitude))
}

/// Returns `v` scaled down so its length does not exceed `max_length`.
pub fn clamp_magnitude(v: Vector3, max_length: f64) -> Vector3 {
    let magnitude = vector_magnitude(v);
    if magnitude > max_length && magnitude > 0.0 {
        scale_vector(v, max_length / magnitude)
    } else {
        v
    }
}

/// Builds two unit vectors that together with `normal` form an orthonormal basis.
///
/// `normal` must already be unit length.
pub fn tangent_basis(normal: Vector3) -> (Vector3, Vector3) {
    // Pick the world axis least aligned with the normal to avoid a degenerate cross product
    let helper = if normal.0.abs() < 0.57 {
        (1.0, 0.0, 0.0)
    } else {
        (0.0, 1.0, 0.0)
    };
    let t1 = normalize_vector(cross_product(normal, helper)).unwrap_or((0.0, 0.0, 1.0));
    let t2 = cross_product(normal, t1);
    (t1, t2)
}

pub fn is_finite_vector(v: Vector3) -> bool {
    v.0.is_finite() && v.1.is_finite() && v.2.is_finite()
}

pub fn component_min(a: Vector3, b: Vector3) -> Vector3 {
    (a.0.min(b.0), a.1.min(b.1), a.2.min(b.2))
}

pub fn component_max(a: Vector3, b: Vector3) -> Vector3 {
    (a.0.max(b.0), a.1.max(b.1), a.2.max(b.2))
}

#[inline]
pub fn matrix_vector_product(m: &Matrix3, v: Vector3) -> Vector3 {
    (
        m[0][0] * v.0 + m[0][1] * v.1 + m[0][2] * v.2,
        m[1][0] * v.0 + m[1][1] * v.1 + m[1][2] * v.2,
        m[2][0] * v.0 + m[2][1] * v.1 + m[2][2] * v.2,
    )
}

pub fn matrix_product(a: &Matrix3, b: &Matrix3) -> Matrix3 {
    let mut out = ZERO_MATRIX;
    for (i, row) in out.iter_mut().enumerate() {
        for (j, cell) in row.iter_mut().enumerate() {
            *cell = (0..3).map(|k| a[i][k] * b[k][j]).sum();
        }
    }
    out
}

pub fn transpose(m: &Matrix3) -> Matrix3 {
    let mut out = ZERO_MATRIX;
    for (i, row) in m.iter().enumerate() {
        for (j, value) in row.iter().enumerate() {
            out[j][i] = *value;
        }
    }
    out
}

pub fn determinant(m: &Matrix3) -> f64 {
    m[0][0] * (m[1][1] * m[2][2] - m[1][2] * m[2][1])
        - m[0][1] * (m[1][0] * m[2][2] - m[1][2] * m[2][0])
        + m[0][2] * (m[1][0] * m[2][1] - m[1][1] * m[2][0])
}

/// Inverts a 3x3 matrix using the adjugate.
///
/// # Returns
/// `None` if the matrix is singular.
pub fn invert_matrix(m: &Matrix3) -> Option<Matrix3> {
    let det = determinant(m);
    if det.abs() < 1e-15 || !det.is_finite() {
        return None;
    }
    let inv_det = 1.0 / det;
    Some([
        [
            (m[1][1] * m[2][2] - m[1][2] * m[2][1]) * inv_det,
            (m[0][2] * m[2][1] - m[0][1] * m[2][2]) * inv_det,
            (m[0][1] * m[1][2] - m[0][2] * m[1][1]) * inv_det,
        ],
        [
            (m[1][2] * m[2][0] - m[1][0] * m[2][2]) * inv_det,
            (m[0][0] * m[2][2] - m[0][2] * m[2][0]) * inv_det,
            (m[0][2] * m[1][0] - m[0][0] * m[1][2]) * inv_det,
        ],
        [
            (m[1][0] * m[2][1] - m[1][1] * m[2][0]) * inv_det,
            (m[0][1] * m[2][0] - m[0][0] * m[2][1]) * inv_det,
            (m[0][0] * m[1][1] - m[0][1] * m[1][0]) * inv_det,
        ],
    ])
}

/// Outer product `a bᵀ`.
pub fn outer_product(a: Vector3, b: Vector3) -> Matrix3 {
    [
        [a.0 * b.0, a.0 * b.1, a.0 * b.2],
        [a.1 * b.0, a.1 * b.1, a.1 * b.2],
        [a.2 * b.0, a.2 * b.1, a.2 * b.2],
    ]
}

pub fn add_matrices(a: &Matrix3, b: &Matrix3) -> Matrix3 {
    let mut out = *a;
    for (i, row) in out.iter_mut().enumerate() {
        for (j, cell) in row.iter_mut().enumerate() {
            *cell += b[i][j];
        }
    }
    out
}

pub fn scale_matrix(m: &Matrix3, factor: f64) -> Matrix3 {
    let mut out = *m;
    for row in out.iter_mut() {
        for cell in row.iter_mut() {
            *cell *= factor;
        }
    }
    out
}

/// Rounds `value` to `decimals` digits and returns the scaled integer, so that two
/// values can be compared exactly after rounding.
///
/// # Example
/// ```
/// use rs_dice::utils::rounded_key;
///
/// assert_eq!(rounded_key(0.2049, 2), 20);
/// assert_eq!(rounded_key(0.2049, 2), rounded_key(0.1951, 2));
/// ```
pub fn rounded_key(value: f64, decimals: u32) -> i64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() as i64
}
