// src/utils/session_config.rs
use crate::models::ContactMaterial;
use crate::utils::{DiceError, DEFAULT_SESSION_CONFIG};

/// Inner floor size of the tray. The floor sits at `y = 0`, centred on the origin,
/// with walls at `x = ±width / 2` and `z = ±depth / 2`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrayDimensions {
    pub width: f64,
    pub depth: f64,
}

impl TrayDimensions {
    pub fn half_extents(&self) -> (f64, f64) {
        (self.width / 2.0, self.depth / 2.0)
    }
}

/// Everything a dice session is configured with at creation time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionConfig {
    /// Constant gravity vector (m/s²)
    pub gravity: (f64, f64, f64),
    /// Size of one integration sub-step in seconds
    pub fixed_time_step: f64,
    /// Upper bound of sub-steps run by one `step` call
    pub max_sub_steps: usize,
    /// Friction/restitution shared by every contact
    pub material: ContactMaterial,
    pub sleep_linear_threshold: f64,
    pub sleep_angular_threshold: f64,
    pub sleep_quiet_duration: f64,
    /// Approach speed (or injected velocity change) that wakes a sleeping body
    pub wake_threshold: f64,
    /// Impacts slower than this do not bounce
    pub restitution_threshold: f64,
    pub solver_iterations: usize,
    pub linear_damping: f64,
    pub angular_damping: f64,
    pub max_linear_speed: f64,
    pub max_angular_speed: f64,
    /// Penetration tolerated before positional correction kicks in
    pub penetration_slop: f64,
    /// Fraction of the remaining penetration removed per sub-step
    pub correction_percent: f64,
    pub die_mass: f64,
    pub tray: TrayDimensions,
    /// Digits kept when matching surface coordinates against a face table
    pub face_decimals: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        DEFAULT_SESSION_CONFIG
    }
}

impl SessionConfig {
    /// Creates a configuration, falling back to the defaults for every `None`.
    ///
    /// # Example
    /// ```
    /// use rs_dice::utils::SessionConfig;
    ///
    /// let config = SessionConfig::new(Some((0.0, -1.62, 0.0)), None, Some(5), None);
    /// assert_eq!(config.gravity.1, -1.62);
    /// assert_eq!(config.max_sub_steps, 5);
    /// assert_eq!(config.fixed_time_step, 1.0 / 60.0);
    /// ```
    pub fn new(
        gravity: Option<(f64, f64, f64)>,
        fixed_time_step: Option<f64>,
        max_sub_steps: Option<usize>,
        material: Option<ContactMaterial>,
    ) -> Self {
        let default = DEFAULT_SESSION_CONFIG;
        Self {
            gravity: gravity.unwrap_or(default.gravity),
            fixed_time_step: fixed_time_step.unwrap_or(default.fixed_time_step),
            max_sub_steps: max_sub_steps.unwrap_or(default.max_sub_steps),
            material: material.unwrap_or(default.material),
            ..default
        }
    }

    /// Checks every field for values the world cannot run with.
    ///
    /// # Errors
    /// Returns `DiceError::InvalidConfiguration` naming the first offending field.
    pub fn validate(&self) -> Result<(), DiceError> {
        let invalid = |msg: &str| Err(DiceError::InvalidConfiguration(msg.to_string()));

        if !(self.gravity.0.is_finite() && self.gravity.1.is_finite() && self.gravity.2.is_finite()) {
            return invalid("gravity must be finite");
        }
        if !(self.fixed_time_step > 0.0 && self.fixed_time_step.is_finite()) {
            return invalid("fixed time step must be positive");
        }
        if self.max_sub_steps == 0 { return invalid("max sub-steps must be at least 1"); }
        self.material.validate()?;
        if self.sleep_linear_threshold < 0.0 || self.sleep_angular_threshold < 0.0 {
            return invalid("sleep thresholds must be non-negative");
        }
        if self.sleep_quiet_duration < 0.0 { return invalid("sleep quiet duration must be non-negative"); }
        if self.wake_threshold < 0.0 { return invalid("wake threshold must be non-negative"); }
        if self.restitution_threshold < 0.0 { return invalid("restitution threshold must be non-negative"); }
        if self.solver_iterations == 0 { return invalid("solver iterations must be at least 1"); }
        if self.linear_damping < 0.0 || self.angular_damping < 0.0 {
            return invalid("damping must be non-negative");
        }
        if !(self.max_linear_speed > 0.0 && self.max_angular_speed > 0.0) {
            return invalid("speed limits must be positive");
        }
        if self.penetration_slop < 0.0 { return invalid("penetration slop must be non-negative"); }
        if !(0.0..=1.0).contains(&self.correction_percent) {
            return invalid("correction percent must be within [0, 1]");
        }
        if !(self.die_mass > 0.0 && self.die_mass.is_finite()) {
            return Err(DiceError::InvalidMass(self.die_mass));
        }
        if !(self.tray.width > 0.0 && self.tray.depth > 0.0) {
            return invalid("tray dimensions must be positive");
        }
        if self.face_decimals > 12 { return invalid("face decimals must be at most 12"); }
        Ok(())
    }
}
