// Use-case level inputs/outputs for the game session.

use crate::domain::{Bullet, Direction, Element, GameOutcome, PlayState};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputCommand {
    /// Directional control pressed or held.
    Move(Direction),
    Fire,
    /// Directional control released.
    Release,
    TogglePlay,
    /// Host lost focus; pause without toggling.
    Pause,
}

/// Full picture of the world for newly attached viewers.
#[derive(Debug, Clone)]
pub struct WorldSnapshot {
    pub state: PlayState,
    pub elements: Vec<Element>,
    pub bullets: Vec<Bullet>,
    pub enemies_alive: usize,
    pub enemies_spawned: u32,
    pub outcome: Option<GameOutcome>,
}
