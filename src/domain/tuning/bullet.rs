use std::time::Duration;

/// Gameplay tuning for bullets.
///
/// Keep this separate from runtime/server configuration (ports, buffer sizes, etc.).
#[derive(Debug, Clone, Copy)]
pub struct BulletTuning {
    /// Pixels travelled per bullet tick.
    pub step: i32,

    /// Side of the square bullet hitbox in pixels.
    pub size: i32,

    /// Period of the bullet task.
    pub tick_interval: Duration,

    /// Live bullets a single tank may have in flight.
    pub max_live_per_tank: usize,
}

impl Default for BulletTuning {
    fn default() -> Self {
        Self {
            step: 15,
            size: 15,
            tick_interval: Duration::from_millis(30),
            max_live_per_tank: 1,
        }
    }
}
