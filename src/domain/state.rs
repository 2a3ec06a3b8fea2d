// Domain-level actors, projectiles, and the play state they run under.

use crate::domain::geometry::{Coordinate, Direction};
use crate::domain::grid::ElementId;
use crate::domain::material::Material;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Faction {
    Player,
    Enemy,
}

impl Faction {
    pub const fn material(self) -> Material {
        match self {
            Faction::Player => Material::PlayerTank,
            Faction::Enemy => Material::EnemyTank,
        }
    }

    pub const fn of(material: Material) -> Option<Faction> {
        match material {
            Material::PlayerTank => Some(Faction::Player),
            Material::EnemyTank => Some(Faction::Enemy),
            _ => None,
        }
    }
}

/// An actor driving one grid element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tank {
    pub element_id: ElementId,
    pub direction: Direction,
    pub faction: Faction,
}

impl Tank {
    pub const fn new(element_id: ElementId, direction: Direction, faction: Faction) -> Self {
        Self {
            element_id,
            direction,
            faction,
        }
    }
}

/// Handle the renderer keys bullet views by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BulletId(pub u64);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bullet {
    pub id: BulletId,
    /// Element of the firing tank. Attribution only; the bullet outlives it.
    pub owner: ElementId,
    pub faction: Faction,
    pub direction: Direction,
    pub position: Coordinate,
    /// Flips to false once, on impact or boundary exit.
    pub alive: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameOutcome {
    Won,
    Lost,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlayState {
    #[default]
    Paused,
    Playing,
    Finished(GameOutcome),
}

impl PlayState {
    pub const fn is_playing(self) -> bool {
        matches!(self, PlayState::Playing)
    }

    pub const fn is_finished(self) -> bool {
        matches!(self, PlayState::Finished(_))
    }
}
