// src/models/rigid_body.rs
use std::fmt;
use std::sync::Arc;

use crate::geometry::ConvexHullShape;
use crate::models::{ContactMaterial, Quaternion};
use crate::utils::{
    add_vectors, cross_product, invert_matrix, matrix_product, matrix_vector_product,
    scale_vector, subtract_vectors, transpose, DiceError, Matrix3, Vector3, ZERO_MATRIX,
    ZERO_VECTOR,
};

/// Identifier of a body within one `World`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BodyHandle(pub u64);

impl fmt::Display for BodyHandle {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SleepState {
    Awake,
    Sleeping,
}

/// Collision geometry in the body frame.
#[derive(Debug, Clone)]
pub enum CollisionShape {
    ConvexHull(ConvexHullShape),
    /// Infinite solid behind a plane through the body origin. Only static bodies may use it.
    HalfSpace { normal: Vector3 },
}

impl CollisionShape {
    /// Radius of a sphere around the body origin enclosing the shape, `None` if unbounded
    pub fn bounding_radius(&self) -> Option<f64> {
        match self {
            CollisionShape::ConvexHull(hull) => Some(hull.bounding_radius()),
            CollisionShape::HalfSpace { .. } => None,
        }
    }
}

/// Physical state of one die or one tray boundary.
///
/// The body origin is the reference point of its shape and is treated as the
/// centre of mass. Only the `World` mutates a registered body.
#[derive(Debug, Clone)]
pub struct RigidBody {
    pub(crate) id: BodyHandle,
    pub(crate) shape: CollisionShape,
    pub(crate) mass: f64,
    pub(crate) inv_mass: f64,
    pub(crate) inv_inertia_body: Matrix3,
    pub(crate) position: Vector3,
    pub(crate) orientation: Quaternion,
    pub(crate) linear_velocity: Vector3,
    pub(crate) angular_velocity: Vector3,
    pub(crate) sleep_state: SleepState,
    pub(crate) quiet_time: f64,
    pub(crate) wake_count: u64,
    pub(crate) material: Arc<ContactMaterial>,
}

impl RigidBody {
    /// Creates a body at the origin with identity orientation and no velocity.
    ///
    /// # Arguments
    ///
    /// * `id` - Handle the body is registered under
    /// * `shape` - Collision geometry, owned by the body from now on
    /// * `mass` - Mass in kg, `0.0` for a static body
    /// * `material` - Shared contact material
    ///
    /// # Returns
    ///
    /// * `Err(DiceError::InvalidMass)` - Negative or non-finite mass, or a half-space with mass
    /// * `Err(DiceError::DegenerateGeometry)` - The hull's inertia tensor cannot be inverted
    pub fn new(
        id: BodyHandle,
        shape: CollisionShape,
        mass: f64,
        material: Arc<ContactMaterial>,
    ) -> Result<Self, DiceError> {
        if !mass.is_finite() || mass < 0.0 {
            return Err(DiceError::InvalidMass(mass));
        }

        let (inv_mass, inv_inertia_body) = match (&shape, mass > 0.0) {
            (_, false) => (0.0, ZERO_MATRIX),
            (CollisionShape::HalfSpace { .. }, true) => return Err(DiceError::InvalidMass(mass)),
            (CollisionShape::ConvexHull(hull), true) => {
                let inertia = hull.inertia_tensor(mass);
                let inv_inertia = invert_matrix(&inertia).ok_or_else(|| {
                    DiceError::DegenerateGeometry("inertia tensor is singular".to_string())
                })?;
                (1.0 / mass, inv_inertia)
            }
        };

        Ok(Self {
            id,
            shape,
            mass,
            inv_mass,
            inv_inertia_body,
            position: ZERO_VECTOR,
            orientation: Quaternion::identity(),
            linear_velocity: ZERO_VECTOR,
            angular_velocity: ZERO_VECTOR,
            sleep_state: SleepState::Awake,
            quiet_time: 0.0,
            wake_count: 0,
            material,
        })
    }

    pub fn with_position(mut self, position: Vector3) -> Self {
        self.position = position;
        self
    }

    pub fn with_orientation(mut self, orientation: Quaternion) -> Self {
        self.orientation = orientation.normalized();
        self
    }

    /// Static bodies ignore initial velocities.
    pub fn with_linear_velocity(mut self, velocity: Vector3) -> Self {
        if !self.is_static() {
            self.linear_velocity = velocity;
        }
        self
    }

    pub fn with_angular_velocity(mut self, velocity: Vector3) -> Self {
        if !self.is_static() {
            self.angular_velocity = velocity;
        }
        self
    }

    pub fn id(&self) -> BodyHandle {
        self.id
    }

    pub fn shape(&self) -> &CollisionShape {
        &self.shape
    }

    pub fn mass(&self) -> f64 {
        self.mass
    }

    pub fn position(&self) -> Vector3 {
        self.position
    }

    pub fn orientation(&self) -> Quaternion {
        self.orientation
    }

    pub fn linear_velocity(&self) -> Vector3 {
        self.linear_velocity
    }

    pub fn angular_velocity(&self) -> Vector3 {
        self.angular_velocity
    }

    pub fn sleep_state(&self) -> SleepState {
        self.sleep_state
    }

    /// Number of times the body has gone from sleeping back to awake
    pub fn wake_count(&self) -> u64 {
        self.wake_count
    }

    pub fn material(&self) -> &ContactMaterial {
        &self.material
    }

    pub fn is_static(&self) -> bool {
        self.inv_mass == 0.0
    }

    pub fn is_sleeping(&self) -> bool {
        self.sleep_state == SleepState::Sleeping
    }

    /// True for bodies the integrator has to move this sub-step
    pub fn is_active(&self) -> bool {
        !self.is_static() && !self.is_sleeping()
    }

    /// Inverse inertia tensor in world axes, `R * I⁻¹ * Rᵀ`
    pub(crate) fn inv_inertia_world(&self) -> Matrix3 {
        let r = self.orientation.to_rotation_matrix();
        matrix_product(&matrix_product(&r, &self.inv_inertia_body), &transpose(&r))
    }

    /// Velocity of a world-space point rigidly attached to the body
    pub fn point_velocity(&self, world_point: Vector3) -> Vector3 {
        let r = subtract_vectors(world_point, self.position);
        add_vectors(self.linear_velocity, cross_product(self.angular_velocity, r))
    }

    /// Applies an impulse at a world-space point, changing both velocities
    pub(crate) fn apply_impulse_at(&mut self, impulse: Vector3, world_point: Vector3) {
        if self.is_static() {
            return;
        }
        let r = subtract_vectors(world_point, self.position);
        self.linear_velocity = add_vectors(self.linear_velocity, scale_vector(impulse, self.inv_mass));
        let angular_impulse = cross_product(r, impulse);
        self.angular_velocity = add_vectors(
            self.angular_velocity,
            matrix_vector_product(&self.inv_inertia_world(), angular_impulse),
        );
    }

    /// Transforms a body-frame point into world space
    pub fn to_world(&self, local: Vector3) -> Vector3 {
        add_vectors(self.position, self.orientation.rotate_point(local))
    }

    /// Transforms a world-space point into the body frame
    pub fn to_local(&self, world: Vector3) -> Vector3 {
        self.orientation
            .inverse_rotate_point(subtract_vectors(world, self.position))
    }

    /// Hull vertices in world space; empty for half-spaces
    pub fn world_vertices(&self) -> Vec<Vector3> {
        match &self.shape {
            CollisionShape::ConvexHull(hull) => {
                let r = self.orientation.to_rotation_matrix();
                hull.vertices()
                    .iter()
                    .map(|&v| add_vectors(self.position, matrix_vector_product(&r, v)))
                    .collect()
            }
            CollisionShape::HalfSpace { .. } => Vec::new(),
        }
    }

    pub(crate) fn kinetic_energy(&self) -> f64 {
        if self.is_static() {
            return 0.0;
        }
        let v = self.linear_velocity;
        let w = self.orientation.inverse_rotate_point(self.angular_velocity);
        let inertia = invert_matrix(&self.inv_inertia_body).unwrap_or(ZERO_MATRIX);
        let iw = matrix_vector_product(&inertia, w);
        0.5 * self.mass * (v.0 * v.0 + v.1 * v.1 + v.2 * v.2)
            + 0.5 * (w.0 * iw.0 + w.1 * iw.1 + w.2 * iw.2)
    }
}
