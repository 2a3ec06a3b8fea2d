// Simulation systems that operate on the grid.

pub mod bullets;
pub mod enemies;
pub mod movement;

pub use bullets::{BulletEngine, BulletTick, Impact, ImpactKind};
pub use enemies::{EnemyRoster, SpawnOutcome};
pub use movement::{MoveOutcome, try_move};
