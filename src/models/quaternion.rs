use crate::utils::{Matrix3, Vector3};

/// Unit quaternion describing the orientation of a body relative to the world frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quaternion {
    pub w: f64,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Default for Quaternion {
    fn default() -> Self {
        Quaternion::identity()
    }
}

impl Quaternion {
    pub fn new(w: f64, x: f64, y: f64, z: f64) -> Self {
        Self { w, x, y, z }
    }

    /// Creates a new identity quaternion (no rotation)
    pub fn identity() -> Self {
        Self {
            w: 1.0,
            x: 0.0,
            y: 0.0,
            z: 0.0,
        }
    }

    /// Creates a quaternion from axis-angle representation.
    ///
    /// A zero-length axis yields the identity.
    ///
    /// # Example
    /// ```
    /// use rs_dice::models::Quaternion;
    /// use std::f64::consts::FRAC_PI_2;
    ///
    /// let q = Quaternion::from_axis_angle((0.0, 0.0, 1.0), FRAC_PI_2);
    /// let r = q.rotate_point((1.0, 0.0, 0.0));
    /// assert!((r.1 - 1.0).abs() < 1e-12);
    /// ```
    pub fn from_axis_angle(axis: Vector3, angle: f64) -> Self {
        let half_angle = angle / 2.0;
        let sin_half = half_angle.sin();
        let (ax, ay, az) = axis;
        let magnitude = (ax * ax + ay * ay + az * az).sqrt();

        if magnitude < 1e-10 {
            return Quaternion::identity();
        }

        Quaternion {
            w: half_angle.cos(),
            x: ax / magnitude * sin_half,
            y: ay / magnitude * sin_half,
            z: az / magnitude * sin_half,
        }
    }

    pub fn magnitude(&self) -> f64 {
        (self.w * self.w + self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    /// Returns a normalized version of the quaternion, or the identity if it has collapsed
    pub fn normalized(&self) -> Self {
        let mag = self.magnitude();
        if mag < 1e-10 || !mag.is_finite() {
            return Quaternion::identity();
        }
        Quaternion {
            w: self.w / mag,
            x: self.x / mag,
            y: self.y / mag,
            z: self.z / mag,
        }
    }

    /// Hamilton product `self * other` (apply `other` first, then `self`)
    pub fn multiply(&self, other: &Quaternion) -> Quaternion {
        Quaternion {
            w: self.w * other.w - self.x * other.x - self.y * other.y - self.z * other.z,
            x: self.w * other.x + self.x * other.w + self.y * other.z - self.z * other.y,
            y: self.w * other.y - self.x * other.z + self.y * other.w + self.z * other.x,
            z: self.w * other.z + self.x * other.y - self.y * other.x + self.z * other.w,
        }
    }

    pub fn conjugate(&self) -> Quaternion {
        Quaternion {
            w: self.w,
            x: -self.x,
            y: -self.y,
            z: -self.z,
        }
    }

    pub fn inverse(&self) -> Quaternion {
        let mag_squared = self.w * self.w + self.x * self.x + self.y * self.y + self.z * self.z;
        if mag_squared < 1e-10 {
            return Quaternion::identity();
        }

        let conj = self.conjugate();
        Quaternion {
            w: conj.w / mag_squared,
            x: conj.x / mag_squared,
            y: conj.y / mag_squared,
            z: conj.z / mag_squared,
        }
    }

    /// Rotates a point (or direction) from the body frame into the world frame
    pub fn rotate_point(&self, point: Vector3) -> Vector3 {
        let p = Quaternion {
            w: 0.0,
            x: point.0,
            y: point.1,
            z: point.2,
        };

        let q = self.normalized();
        let rotated = q.multiply(&p).multiply(&q.conjugate());

        (rotated.x, rotated.y, rotated.z)
    }

    /// Rotates a world-frame direction back into the body frame
    pub fn inverse_rotate_point(&self, point: Vector3) -> Vector3 {
        self.inverse().rotate_point(point)
    }

    /// Row-major rotation matrix `R` such that `R * v == self.rotate_point(v)`
    pub fn to_rotation_matrix(&self) -> Matrix3 {
        let q = self.normalized();
        let (w, x, y, z) = (q.w, q.x, q.y, q.z);
        [
            [1.0 - 2.0 * (y * y + z * z), 2.0 * (x * y - w * z), 2.0 * (x * z + w * y)],
            [2.0 * (x * y + w * z), 1.0 - 2.0 * (x * x + z * z), 2.0 * (y * z - w * x)],
            [2.0 * (x * z - w * y), 2.0 * (y * z + w * x), 1.0 - 2.0 * (x * x + y * y)],
        ]
    }

    /// Advances the orientation by a world-frame angular velocity over `dt`.
    ///
    /// Uses `q' = q + 0.5 * (0, ω) * q * dt` followed by renormalisation.
    pub fn integrate(&self, angular_velocity: Vector3, dt: f64) -> Quaternion {
        let omega = Quaternion {
            w: 0.0,
            x: angular_velocity.0,
            y: angular_velocity.1,
            z: angular_velocity.2,
        };
        let dq = omega.multiply(self);
        let half_dt = 0.5 * dt;

        Quaternion {
            w: self.w + dq.w * half_dt,
            x: self.x + dq.x * half_dt,
            y: self.y + dq.y * half_dt,
            z: self.z + dq.z * half_dt,
        }
        .normalized()
    }

    pub fn is_finite(&self) -> bool {
        self.w.is_finite() && self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}
