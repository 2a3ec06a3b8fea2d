use std::time::Duration;

/// Gameplay tuning for enemy tanks.
#[derive(Debug, Clone, Copy)]
pub struct EnemyTuning {
    /// Enemy tanks spawned over a whole session.
    pub max_spawns: u32,

    /// Period of the spawn task.
    pub spawn_interval: Duration,

    /// Period of the enemy movement task.
    pub move_interval: Duration,

    /// Chance (0..=100) that an enemy fires on a movement tick.
    pub fire_chance_percent: u32,
}

impl Default for EnemyTuning {
    fn default() -> Self {
        Self {
            max_spawns: 20,
            spawn_interval: Duration::from_millis(3000),
            move_interval: Duration::from_millis(400),
            fire_chance_percent: 10,
        }
    }
}
