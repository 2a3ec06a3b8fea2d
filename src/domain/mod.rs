// Domain layer: core simulation types and rules.

pub mod events;
pub mod geometry;
pub mod grid;
pub mod material;
pub mod ports;
pub mod state;
pub mod systems;
pub mod tuning;
pub mod world;

pub use events::{Outbox, RenderEvent, SoundCue};
pub use geometry::{Bounds, CELL_SIZE, Coordinate, Direction, Rect};
pub use grid::{Element, ElementId, Grid, GridError, Placement};
pub use material::Material;
pub use ports::{AudioSink, LevelEntry, LevelStorage, StorageError};
pub use state::{Bullet, BulletId, Faction, GameOutcome, PlayState, Tank};
pub use world::{LoadReport, World};
