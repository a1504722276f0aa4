use crate::models::ContactMaterial;
use crate::utils::{SessionConfig, TrayDimensions};

/// Standard gravity used by the tray scene, pointing down the y axis.
pub const DEFAULT_GRAVITY: (f64, f64, f64) = (0.0, -9.82, 0.0);

pub const DEFAULT_FIXED_TIME_STEP: f64 = 1.0 / 60.0;

pub const DEFAULT_MAX_SUB_STEPS: usize = 3;

pub const DEFAULT_CONTACT_MATERIAL: ContactMaterial = ContactMaterial {
    friction: 0.1,
    restitution: 0.6,
};

/// Below this speed (m/s) and [`DEFAULT_SLEEP_ANGULAR_THRESHOLD`] (rad/s) a body counts as quiet.
pub const DEFAULT_SLEEP_LINEAR_THRESHOLD: f64 = 0.1;
pub const DEFAULT_SLEEP_ANGULAR_THRESHOLD: f64 = 0.2;
/// Seconds a body has to stay quiet before it is put to sleep.
pub const DEFAULT_SLEEP_QUIET_DURATION: f64 = 0.5;
pub const DEFAULT_WAKE_THRESHOLD: f64 = 0.3;

pub const DEFAULT_TRAY: TrayDimensions = TrayDimensions {
    width: 20.0,
    depth: 10.0,
};

pub const DEFAULT_SESSION_CONFIG: SessionConfig = SessionConfig {
    gravity: DEFAULT_GRAVITY,
    fixed_time_step: DEFAULT_FIXED_TIME_STEP,
    max_sub_steps: DEFAULT_MAX_SUB_STEPS,
    material: DEFAULT_CONTACT_MATERIAL,
    sleep_linear_threshold: DEFAULT_SLEEP_LINEAR_THRESHOLD,
    sleep_angular_threshold: DEFAULT_SLEEP_ANGULAR_THRESHOLD,
    sleep_quiet_duration: DEFAULT_SLEEP_QUIET_DURATION,
    wake_threshold: DEFAULT_WAKE_THRESHOLD,
    restitution_threshold: 1.0,
    solver_iterations: 10,
    linear_damping: 0.01,
    angular_damping: 0.1,
    max_linear_speed: 60.0,
    max_angular_speed: 60.0,
    penetration_slop: 0.005,
    correction_percent: 0.8,
    die_mass: 1.0,
    tray: DEFAULT_TRAY,
    face_decimals: 2,
};
