// Use cases layer: the game session and its periodic tasks.

pub mod game;
pub mod play_state;
mod scheduler;
pub mod types;

#[cfg(test)]
pub(crate) mod test_support;

pub use game::{EditError, Game, GameSettings};
pub use play_state::PlayStateMachine;
pub use types::{InputCommand, WorldSnapshot};
