// src/session/dice_session.rs
use std::collections::BTreeMap;
use std::f64::consts::TAU;
use std::fmt;
use std::sync::Arc;

use log::{debug, info, warn};
use rand::Rng;

use crate::geometry::{build_convex_hull, DieMesh};
use crate::models::{BodyHandle, CollisionShape, Quaternion, RigidBody};
use crate::outcome::{FaceTable, OutcomeResolver, ResolutionState};
use crate::session::{build_tray, FrameClock};
use crate::utils::{DiceError, SessionConfig, TrayDimensions, Vector3, ZERO_VECTOR};
use crate::world::World;

/// Identifier of a die within one session
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DieHandle(pub u64);

impl fmt::Display for DieHandle {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "d{}", self.0)
    }
}

/// Position and orientation handed to the presentation layer each frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub position: Vector3,
    pub orientation: Quaternion,
}

/// Initial state of a thrown die
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThrowParams {
    pub position: Vector3,
    pub orientation: Quaternion,
    pub linear_velocity: Vector3,
    pub angular_velocity: Vector3,
}

impl ThrowParams {
    /// A die released at rest, unrotated
    pub fn at(position: Vector3) -> Self {
        Self {
            position,
            orientation: Quaternion::identity(),
            linear_velocity: ZERO_VECTOR,
            angular_velocity: ZERO_VECTOR,
        }
    }

    /// Random throw into the tray: uniformly random orientation, a release point above
    /// the floor away from the walls, a sideways toss and some spin.
    pub fn random<R: Rng>(rng: &mut R, tray: TrayDimensions) -> Self {
        let (half_width, half_depth) = tray.half_extents();
        let reach_x = (half_width - 1.0).max(half_width / 2.0);
        let reach_z = (half_depth - 1.0).max(half_depth / 2.0);

        // Uniform sampling of unit quaternions (Shoemake).
        let (u1, u2, u3): (f64, f64, f64) = (rng.random(), rng.random(), rng.random());
        let orientation = Quaternion::new(
            u1.sqrt() * (TAU * u3).cos(),
            (1.0 - u1).sqrt() * (TAU * u2).sin(),
            (1.0 - u1).sqrt() * (TAU * u2).cos(),
            u1.sqrt() * (TAU * u3).sin(),
        );

        Self {
            position: (
                rng.random_range(-reach_x..=reach_x),
                rng.random_range(2.0..=4.0),
                rng.random_range(-reach_z..=reach_z),
            ),
            orientation,
            linear_velocity: (
                rng.random_range(-3.0..=3.0),
                rng.random_range(-1.0..=1.0),
                rng.random_range(-3.0..=3.0),
            ),
            angular_velocity: (
                rng.random_range(-8.0..=8.0),
                rng.random_range(-8.0..=8.0),
                rng.random_range(-8.0..=8.0),
            ),
        }
    }
}

#[derive(Debug, Clone)]
struct LiveDie {
    body: BodyHandle,
    mesh: Arc<DieMesh>,
    state: ResolutionState,
    seen_wakes: u64,
}

impl LiveDie {
    /// Brings the resolution state up to date with the body. A wake-up since the last
    /// look invalidates any cached result, even if the body is asleep again.
    fn observe(&mut self, body: &RigidBody) -> ResolutionState {
        let previous = self.state;
        let mut state = self.state;
        if body.wake_count() != self.seen_wakes {
            self.seen_wakes = body.wake_count();
            state = ResolutionState::Tumbling;
        }
        self.state = state.observe(body.sleep_state());
        previous
    }
}

/// Owns a world with a tray and the dice thrown into it.
///
/// The presentation layer drives it once per frame with [`DiceSession::step`], reads
/// poses with [`DiceSession::pose_of`] and asks for results with [`DiceSession::result_of`].
///
/// # Example
/// ```
/// use rs_dice::geometry::DieMesh;
/// use rs_dice::session::DiceSession;
/// use rs_dice::utils::SessionConfig;
///
/// let mut session = DiceSession::with_mesh(SessionConfig::default(), DieMesh::standard_d6(1.0)).unwrap();
/// let die = session.request_roll((0.0, 2.0, 0.0)).unwrap();
/// assert!(session.result_of(die).is_err());
///
/// assert!(session.run_until_settled(600));
/// assert_eq!(session.result_of(die), Ok(1));
/// ```
#[derive(Debug)]
pub struct DiceSession {
    world: World,
    resolver: OutcomeResolver,
    clock: FrameClock,
    mesh: Option<Arc<DieMesh>>,
    dice: BTreeMap<DieHandle, LiveDie>,
    next_die: u64,
}

impl DiceSession {
    /// Creates a session with an empty tray and no die mesh yet.
    ///
    /// # Errors
    /// Any error of [`SessionConfig::validate`].
    pub fn new(config: SessionConfig) -> Result<Self, DiceError> {
        let mut world = World::new(config)?;
        build_tray(&mut world, config.tray)?;
        let resolver = OutcomeResolver::new(FaceTable::standard_d6(), config.face_decimals)?;

        info!(
            "Dice session ready: tray {} x {}, gravity {:?}, step {:.4}s x {}",
            config.tray.width, config.tray.depth, config.gravity, config.fixed_time_step, config.max_sub_steps
        );
        Ok(Self {
            world,
            resolver,
            clock: FrameClock::new(),
            mesh: None,
            dice: BTreeMap::new(),
            next_die: 1,
        })
    }

    pub fn with_mesh(config: SessionConfig, mesh: DieMesh) -> Result<Self, DiceError> {
        let mut session = Self::new(config)?;
        session.set_die_mesh(mesh);
        Ok(session)
    }

    /// Replaces the face table used to read results, e.g. for a die with another atlas.
    pub fn with_face_table(mut self, table: Arc<FaceTable>) -> Result<Self, DiceError> {
        self.resolver = OutcomeResolver::new(table, self.world.config().face_decimals)?;
        Ok(self)
    }

    /// Delivers the die mesh once the asset pipeline has it. Dice already rolled keep
    /// the mesh they were created with.
    pub fn set_die_mesh(&mut self, mesh: DieMesh) {
        debug!("Die mesh loaded: {} triangles", mesh.triangle_count());
        self.mesh = Some(Arc::new(mesh));
    }

    pub fn has_mesh(&self) -> bool {
        self.mesh.is_some()
    }

    /// Drops an unrotated die at `spawn_position`.
    pub fn request_roll(&mut self, spawn_position: Vector3) -> Result<DieHandle, DiceError> {
        self.request_throw(ThrowParams::at(spawn_position))
    }

    /// Creates a die from the current mesh and throws it into the tray.
    ///
    /// # Errors
    /// * `DiceError::MeshNotLoaded` - No mesh has been delivered yet
    /// * `DiceError::DegenerateGeometry` - The mesh does not enclose a volume
    ///
    /// Nothing is registered when an error is returned.
    pub fn request_throw(&mut self, throw: ThrowParams) -> Result<DieHandle, DiceError> {
        let mesh = self.mesh.clone().ok_or(DiceError::MeshNotLoaded)?;
        let hull = build_convex_hull(&mesh.positions)?;
        if !hull.is_centred() {
            warn!(
                "Die mesh centroid {:?} is off its origin; the die will tumble about the origin",
                hull.centroid()
            );
        }

        let body = RigidBody::new(
            self.world.allocate_handle(),
            CollisionShape::ConvexHull(hull),
            self.world.config().die_mass,
            self.world.material(),
        )?
        .with_position(throw.position)
        .with_orientation(throw.orientation)
        .with_linear_velocity(throw.linear_velocity)
        .with_angular_velocity(throw.angular_velocity);
        let seen_wakes = body.wake_count();
        let body = self.world.register_body(body)?;

        let die = DieHandle(self.next_die);
        self.next_die += 1;
        self.dice.insert(
            die,
            LiveDie {
                body,
                mesh,
                state: ResolutionState::Tumbling,
                seen_wakes,
            },
        );
        info!("Die {} thrown from {:?}", die, throw.position);
        Ok(die)
    }

    pub fn request_random_throw<R: Rng>(&mut self, rng: &mut R) -> Result<DieHandle, DiceError> {
        let throw = ThrowParams::random(rng, self.world.config().tray);
        self.request_throw(throw)
    }

    /// Advances the session to the clock reading `elapsed_total` (seconds since start).
    ///
    /// # Returns
    /// Sub-steps performed, at most `max_sub_steps`.
    pub fn step(&mut self, elapsed_total: f64) -> usize {
        let delta = self.clock.tick(elapsed_total);
        self.step_delta(delta)
    }

    /// Advances the session by a raw frame delta.
    pub fn step_delta(&mut self, delta: f64) -> usize {
        let max_sub_steps = self.world.config().max_sub_steps;
        let sub_steps = self.world.step(delta, max_sub_steps);
        self.sync_states();
        sub_steps
    }

    fn sync_states(&mut self) {
        for (handle, die) in self.dice.iter_mut() {
            let Some(body) = self.world.body(die.body) else {
                continue;
            };
            let previous = die.observe(body);
            if previous != die.state {
                debug!("Die {}: {:?} -> {:?}", handle, previous, die.state);
            }
        }
    }

    /// Current pose of a die.
    pub fn pose_of(&self, die: DieHandle) -> Result<Pose, DiceError> {
        let body = self.body_of(die)?;
        Ok(Pose {
            position: body.position(),
            orientation: body.orientation(),
        })
    }

    pub fn state_of(&self, die: DieHandle) -> Result<ResolutionState, DiceError> {
        self.dice
            .get(&die)
            .map(|d| d.state)
            .ok_or(DiceError::UnknownDie(die))
    }

    /// Face value of a die that has come to rest.
    ///
    /// The value is read once and cached until the die moves again.
    ///
    /// # Errors
    /// * `DiceError::NotSettled` - The die is still moving
    /// * `DiceError::UnresolvedFace` - The die rests on something other than a face
    /// * `DiceError::UnknownDie` - No such die in this session
    pub fn result_of(&mut self, die: DieHandle) -> Result<u8, DiceError> {
        let live = self.dice.get_mut(&die).ok_or(DiceError::UnknownDie(die))?;
        let body = self.world.body(live.body).ok_or(DiceError::UnknownDie(die))?;
        live.observe(body);

        match live.state {
            ResolutionState::Tumbling => Err(DiceError::NotSettled(die)),
            ResolutionState::Resolved(value) => Ok(value),
            ResolutionState::Settled => {
                let value = self.resolver.resolve(die, &live.mesh, body.orientation())?;
                live.state = ResolutionState::Resolved(value);
                info!("Die {} shows {}", die, value);
                Ok(value)
            }
        }
    }

    /// Results of every die, in handle order
    pub fn results(&mut self) -> Vec<(DieHandle, Result<u8, DiceError>)> {
        let handles: Vec<DieHandle> = self.dice.keys().copied().collect();
        handles.into_iter().map(|die| (die, self.result_of(die))).collect()
    }

    /// True when every die is asleep
    pub fn all_settled(&self) -> bool {
        self.dice.values().all(|die| {
            self.world
                .body(die.body)
                .map_or(true, |body| body.is_sleeping())
        })
    }

    /// Steps one fixed sub-step per tick until every die sleeps.
    ///
    /// # Returns
    /// Whether the dice settled within `max_ticks`.
    pub fn run_until_settled(&mut self, max_ticks: usize) -> bool {
        let h = self.world.config().fixed_time_step;
        for tick in 0..max_ticks {
            if self.all_settled() {
                debug!("All dice settled after {} ticks", tick);
                return true;
            }
            self.step_delta(h);
        }
        self.all_settled()
    }

    /// Takes a die out of the simulation before the next step.
    pub fn remove_die(&mut self, die: DieHandle) -> Result<(), DiceError> {
        let live = self.dice.remove(&die).ok_or(DiceError::UnknownDie(die))?;
        self.world.deregister_body(live.body)?;
        info!("Die {} removed", die);
        Ok(())
    }

    /// Removes every die; the tray stays.
    pub fn reset(&mut self) {
        let handles: Vec<DieHandle> = self.dice.keys().copied().collect();
        for die in handles {
            if let Err(err) = self.remove_die(die) {
                debug!("Reset skipped die {}: {}", die, err);
            }
        }
    }

    pub fn dice(&self) -> impl Iterator<Item = DieHandle> + '_ {
        self.dice.keys().copied()
    }

    pub fn die_count(&self) -> usize {
        self.dice.len()
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn config(&self) -> &SessionConfig {
        self.world.config()
    }

    #[cfg(test)]
    pub(crate) fn body_handle(&self, die: DieHandle) -> Option<BodyHandle> {
        self.dice.get(&die).map(|live| live.body)
    }

    #[cfg(test)]
    pub(crate) fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    fn body_of(&self, die: DieHandle) -> Result<&RigidBody, DiceError> {
        let live = self.dice.get(&die).ok_or(DiceError::UnknownDie(die))?;
        self.world.body(live.body).ok_or(DiceError::UnknownDie(die))
    }
}
