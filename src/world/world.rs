// src/world/world.rs
use std::collections::BTreeMap;
use std::sync::Arc;

use log::{debug, trace, warn};

use crate::models::{BodyHandle, CollisionShape, ContactMaterial, RigidBody, SleepState};
use crate::utils::{
    add_vectors, clamp_magnitude, dot_product, is_finite_vector, scale_vector, subtract_vectors,
    vector_magnitude, DiceError, SessionConfig, Vector3, ZERO_VECTOR,
};
use crate::world::{correct_positions, generate_contacts, solve_contacts, sweep_and_prune, Aabb, ContactManifold};

/// Owns every rigid body of a session and advances them in fixed sub-steps.
///
/// A sub-step runs, in order: gravity and damping, broad phase, narrow phase against the
/// pre-step poses, wake-up on hard contacts, velocity solve, speed clamping, integration,
/// positional correction, and the sleep policy.
#[derive(Debug)]
pub struct World {
    config: SessionConfig,
    material: Arc<ContactMaterial>,
    bodies: BTreeMap<BodyHandle, RigidBody>,
    boundary_bodies: Vec<BodyHandle>,
    next_handle: u64,
    accumulator: f64,
    simulated_time: f64,
}

impl World {
    /// Creates an empty world.
    ///
    /// # Errors
    /// Returns the first problem reported by [`SessionConfig::validate`].
    ///
    /// # Example
    /// ```
    /// use rs_dice::utils::SessionConfig;
    /// use rs_dice::world::World;
    ///
    /// let mut world = World::new(SessionConfig::default()).unwrap();
    /// assert_eq!(world.step(1.0 / 60.0, 3), 1);
    /// ```
    pub fn new(config: SessionConfig) -> Result<Self, DiceError> {
        config.validate()?;
        Ok(Self {
            material: Arc::new(config.material),
            config,
            bodies: BTreeMap::new(),
            boundary_bodies: Vec::new(),
            next_handle: 1,
            accumulator: 0.0,
            simulated_time: 0.0,
        })
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn gravity(&self) -> Vector3 {
        self.config.gravity
    }

    /// Contact material shared by every body of this world
    pub fn material(&self) -> Arc<ContactMaterial> {
        Arc::clone(&self.material)
    }

    /// Reserves a handle no registered body uses
    pub fn allocate_handle(&mut self) -> BodyHandle {
        let handle = BodyHandle(self.next_handle);
        self.next_handle += 1;
        handle
    }

    /// Adds a body to the simulation.
    ///
    /// Nothing is changed when registration fails.
    ///
    /// # Errors
    /// * `DiceError::DuplicateBody` - A body with the same handle is already registered
    /// * `DiceError::InvalidConfiguration` - The body's pose or velocity is not finite
    pub fn register_body(&mut self, body: RigidBody) -> Result<BodyHandle, DiceError> {
        let handle = body.id();
        if self.bodies.contains_key(&handle) {
            return Err(DiceError::DuplicateBody(handle));
        }
        if !(is_finite_vector(body.position)
            && body.orientation.is_finite()
            && is_finite_vector(body.linear_velocity)
            && is_finite_vector(body.angular_velocity))
        {
            return Err(DiceError::InvalidConfiguration(format!(
                "body {} has a non-finite state",
                handle
            )));
        }

        self.next_handle = self.next_handle.max(handle.0 + 1);
        debug!(
            "Registered body {} (mass {}, at {:?})",
            handle, body.mass, body.position
        );
        self.bodies.insert(handle, body);
        Ok(handle)
    }

    /// Registers a static body as part of the tray boundary.
    ///
    /// # Errors
    /// `DiceError::InvalidMass` if the body can move, otherwise as [`World::register_body`].
    pub fn register_boundary(&mut self, body: RigidBody) -> Result<BodyHandle, DiceError> {
        if !body.is_static() {
            return Err(DiceError::InvalidMass(body.mass));
        }
        let handle = self.register_body(body)?;
        self.boundary_bodies.push(handle);
        Ok(handle)
    }

    pub fn boundary_bodies(&self) -> &[BodyHandle] {
        &self.boundary_bodies
    }

    /// Removes a body; it takes no part in any later step.
    pub fn deregister_body(&mut self, handle: BodyHandle) -> Result<RigidBody, DiceError> {
        let body = self
            .bodies
            .remove(&handle)
            .ok_or(DiceError::UnknownBody(handle))?;
        self.boundary_bodies.retain(|&h| h != handle);
        debug!("Deregistered body {}", handle);
        Ok(body)
    }

    pub fn body(&self, handle: BodyHandle) -> Option<&RigidBody> {
        self.bodies.get(&handle)
    }

    pub fn bodies(&self) -> impl Iterator<Item = &RigidBody> {
        self.bodies.values()
    }

    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    /// Dynamic bodies that are currently awake
    pub fn awake_body_count(&self) -> usize {
        self.bodies.values().filter(|b| b.is_active()).count()
    }

    /// Total time advanced by completed sub-steps
    pub fn simulated_time(&self) -> f64 {
        self.simulated_time
    }

    /// Requested time not yet consumed by a sub-step
    pub fn accumulated_time(&self) -> f64 {
        self.accumulator
    }

    /// Applies an instantaneous impulse at a world-space point.
    ///
    /// A sleeping body only reacts, and wakes up, when the impulse would change its
    /// velocity by more than the wake threshold. Static bodies ignore impulses.
    pub fn apply_impulse(
        &mut self,
        handle: BodyHandle,
        impulse: Vector3,
        world_point: Vector3,
    ) -> Result<(), DiceError> {
        let wake_threshold = self.config.wake_threshold;
        let body = self
            .bodies
            .get_mut(&handle)
            .ok_or(DiceError::UnknownBody(handle))?;
        if body.is_static() {
            return Ok(());
        }

        if body.is_sleeping() {
            let velocity_change = vector_magnitude(impulse) * body.inv_mass;
            if velocity_change <= wake_threshold {
                trace!("Impulse on sleeping body {} below wake threshold", handle);
                return Ok(());
            }
            wake(body);
        }
        body.apply_impulse_at(impulse, world_point);
        Ok(())
    }

    pub fn wake_up(&mut self, handle: BodyHandle) -> Result<(), DiceError> {
        let body = self
            .bodies
            .get_mut(&handle)
            .ok_or(DiceError::UnknownBody(handle))?;
        if !body.is_static() {
            wake(body);
        }
        Ok(())
    }

    pub fn put_to_sleep(&mut self, handle: BodyHandle) -> Result<(), DiceError> {
        let body = self
            .bodies
            .get_mut(&handle)
            .ok_or(DiceError::UnknownBody(handle))?;
        if !body.is_static() {
            sleep(body);
        }
        Ok(())
    }

    /// Advances the simulation by `requested_dt` seconds in fixed sub-steps.
    ///
    /// At most `max_sub_steps` sub-steps of `fixed_time_step` run. Time not consumed,
    /// including whole sub-steps beyond the cap, is carried into later calls, which catch
    /// up by at most `max_sub_steps` each. A negative or non-finite request advances nothing.
    ///
    /// # Returns
    /// The number of sub-steps performed.
    pub fn step(&mut self, requested_dt: f64, max_sub_steps: usize) -> usize {
        let dt = if requested_dt.is_finite() && requested_dt >= 0.0 {
            requested_dt
        } else {
            warn!("Ignoring invalid time step request {}", requested_dt);
            0.0
        };

        let h = self.config.fixed_time_step;
        self.accumulator += dt;
        let available = (self.accumulator / h).floor() as usize;
        let sub_steps = available.min(max_sub_steps);

        for _ in 0..sub_steps {
            self.sub_step(h);
        }

        self.accumulator = (self.accumulator - sub_steps as f64 * h).max(0.0);
        if available > sub_steps {
            debug!(
                "Carrying {} sub-steps beyond the limit of {} into later frames",
                available - sub_steps,
                max_sub_steps
            );
        }
        sub_steps
    }

    fn sub_step(&mut self, h: f64) {
        self.apply_forces(h);

        let pairs = self.candidate_pairs();
        let manifolds = generate_contacts(&self.bodies, &pairs);
        trace!(
            "t={:.4}: {} candidate pairs, {} touching",
            self.simulated_time,
            pairs.len(),
            manifolds.len()
        );

        self.wake_on_impact(&manifolds);
        solve_contacts(&mut self.bodies, &manifolds, &self.config);
        self.integrate(h);
        correct_positions(&mut self.bodies, &manifolds, &self.config);
        self.update_sleep_states(h);

        self.simulated_time += h;
    }

    fn apply_forces(&mut self, h: f64) {
        let gravity_step = scale_vector(self.config.gravity, h);
        let linear_decay = (1.0 - self.config.linear_damping).max(0.0).powf(h);
        let angular_decay = (1.0 - self.config.angular_damping).max(0.0).powf(h);

        for body in self.bodies.values_mut().filter(|b| b.is_active()) {
            body.linear_velocity = scale_vector(add_vectors(body.linear_velocity, gravity_step), linear_decay);
            body.angular_velocity = scale_vector(body.angular_velocity, angular_decay);
        }
    }

    /// Bounded bodies go through sweep-and-prune; half-spaces are tested against each
    /// awake body's bounding sphere directly.
    fn candidate_pairs(&self) -> Vec<(BodyHandle, BodyHandle)> {
        let mut boxes = Vec::new();
        let mut half_spaces = Vec::new();
        for body in self.bodies.values() {
            match body.shape().bounding_radius() {
                Some(radius) => boxes.push((body.id(), Aabb::from_sphere(body.position, radius))),
                None => half_spaces.push(body),
            }
        }

        let is_active = |handle: &BodyHandle| self.bodies.get(handle).is_some_and(|b| b.is_active());
        let mut pairs: Vec<(BodyHandle, BodyHandle)> = sweep_and_prune(&boxes)
            .into_iter()
            .filter(|(a, b)| is_active(a) || is_active(b))
            .collect();

        for body in self.bodies.values().filter(|b| b.is_active()) {
            let Some(radius) = body.shape().bounding_radius() else {
                continue;
            };
            for plane in &half_spaces {
                if let CollisionShape::HalfSpace { normal } = plane.shape() {
                    let normal = plane.orientation.rotate_point(*normal);
                    let height = dot_product(normal, subtract_vectors(body.position, plane.position));
                    if height < radius {
                        pairs.push((body.id(), plane.id()));
                    }
                }
            }
        }
        pairs
    }

    /// Wakes sleeping bodies struck by an awake body faster than the wake threshold.
    fn wake_on_impact(&mut self, manifolds: &[ContactManifold]) {
        let threshold = self.config.wake_threshold;
        let mut to_wake = Vec::new();

        for manifold in manifolds {
            let (Some(a), Some(b)) = (self.bodies.get(&manifold.body_a), self.bodies.get(&manifold.body_b)) else {
                continue;
            };
            let sleeper = match (a.is_sleeping(), b.is_sleeping()) {
                (true, false) if b.is_active() => a.id(),
                (false, true) if a.is_active() => b.id(),
                _ => continue,
            };
            let approach = manifold
                .contacts
                .iter()
                .map(|c| -dot_product(subtract_vectors(a.point_velocity(c.point), b.point_velocity(c.point)), c.normal))
                .fold(0.0, f64::max);
            if approach > threshold {
                to_wake.push((sleeper, approach));
            }
        }

        for (handle, approach) in to_wake {
            if let Some(body) = self.bodies.get_mut(&handle) {
                debug!("Body {} woken by impact at {:.3} m/s", handle, approach);
                wake(body);
            }
        }
    }

    fn integrate(&mut self, h: f64) {
        let max_linear = self.config.max_linear_speed;
        let max_angular = self.config.max_angular_speed;

        for body in self.bodies.values_mut().filter(|b| b.is_active()) {
            body.linear_velocity = clamp_magnitude(body.linear_velocity, max_linear);
            body.angular_velocity = clamp_magnitude(body.angular_velocity, max_angular);
            body.position = add_vectors(body.position, scale_vector(body.linear_velocity, h));
            body.orientation = body.orientation.integrate(body.angular_velocity, h);
        }
    }

    fn update_sleep_states(&mut self, h: f64) {
        let config = &self.config;
        for body in self.bodies.values_mut().filter(|b| b.is_active()) {
            let quiet = vector_magnitude(body.linear_velocity) < config.sleep_linear_threshold
                && vector_magnitude(body.angular_velocity) < config.sleep_angular_threshold;
            if !quiet {
                body.quiet_time = 0.0;
                continue;
            }
            body.quiet_time += h;
            if body.quiet_time >= config.sleep_quiet_duration {
                debug!("Body {} fell asleep at {:?}", body.id, body.position);
                sleep(body);
            }
        }
    }
}

fn wake(body: &mut RigidBody) {
    if body.sleep_state == SleepState::Sleeping {
        body.wake_count += 1;
    }
    body.sleep_state = SleepState::Awake;
    body.quiet_time = 0.0;
}

fn sleep(body: &mut RigidBody) {
    body.sleep_state = SleepState::Sleeping;
    body.linear_velocity = ZERO_VECTOR;
    body.angular_velocity = ZERO_VECTOR;
}
