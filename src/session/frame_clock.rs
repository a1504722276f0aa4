// src/session/frame_clock.rs
use log::warn;

/// Turns a monotonically increasing clock reading into per-frame deltas.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameClock {
    previous_elapsed: f64,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Time since the previous reading. The first reading is measured from zero.
    ///
    /// A reading that goes backwards, or is not finite, yields a zero delta.
    ///
    /// # Example
    /// ```
    /// use rs_dice::session::FrameClock;
    ///
    /// let mut clock = FrameClock::new();
    /// assert_eq!(clock.tick(0.5), 0.5);
    /// assert_eq!(clock.tick(0.75), 0.25);
    /// assert_eq!(clock.tick(0.6), 0.0);
    /// ```
    pub fn tick(&mut self, elapsed_total: f64) -> f64 {
        if !elapsed_total.is_finite() {
            warn!("Ignoring non-finite clock reading {}", elapsed_total);
            return 0.0;
        }

        let delta = elapsed_total - self.previous_elapsed;
        self.previous_elapsed = elapsed_total;
        if delta < 0.0 {
            warn!("Clock went backwards by {:.4}s", -delta);
            return 0.0;
        }
        delta
    }

    pub fn previous_elapsed(&self) -> f64 {
        self.previous_elapsed
    }
}
