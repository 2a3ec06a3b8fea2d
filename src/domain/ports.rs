// Ports for the collaborators the simulation core talks to.

use crate::domain::events::SoundCue;
use crate::domain::geometry::Coordinate;
use crate::domain::grid::Element;
use crate::domain::material::Material;
use std::fmt;

/// One stored placement, in level order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelEntry {
    pub material: Material,
    pub coordinate: Coordinate,
}

impl From<&Element> for LevelEntry {
    fn from(element: &Element) -> Self {
        Self {
            material: element.material,
            coordinate: element.coordinate,
        }
    }
}

#[derive(Debug)]
pub enum StorageError {
    Io(std::io::Error),
    Format(String),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::Io(err) => write!(f, "level storage io error: {err}"),
            StorageError::Format(message) => write!(f, "level storage format error: {message}"),
        }
    }
}

impl std::error::Error for StorageError {}

impl From<std::io::Error> for StorageError {
    fn from(err: std::io::Error) -> Self {
        StorageError::Io(err)
    }
}

// Port for persisting the grid snapshot between sessions.
pub trait LevelStorage: Send + Sync {
    fn load(&self) -> Result<Vec<LevelEntry>, StorageError>;
    fn save(&self, elements: &[Element]) -> Result<(), StorageError>;
}

// Port for the audio collaborator; purely observational.
pub trait AudioSink: Send + Sync {
    fn play(&self, cue: SoundCue);
}
