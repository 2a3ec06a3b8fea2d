// Notifications for the rendering and audio collaborators.

use crate::domain::geometry::{Coordinate, Direction};
use crate::domain::grid::{Element, ElementId};
use crate::domain::state::{Bullet, BulletId, PlayState};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderEvent {
    Placed(Element),
    Moved {
        id: ElementId,
        coordinate: Coordinate,
        direction: Direction,
    },
    /// Facing changed without advancing.
    Turned {
        id: ElementId,
        direction: Direction,
    },
    Removed {
        id: ElementId,
    },
    BulletSpawned(Bullet),
    BulletMoved {
        id: BulletId,
        position: Coordinate,
    },
    BulletRemoved {
        id: BulletId,
    },
    StateChanged(PlayState),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundCue {
    BulletShot,
    BulletBurst,
    TankMove,
    TankStop,
    Intro,
    PauseAll,
}

/// Events collected while the world lock is held, published after release.
#[derive(Debug, Default)]
pub struct Outbox {
    pub render: Vec<RenderEvent>,
    pub sounds: Vec<SoundCue>,
}

impl Outbox {
    pub fn render(&mut self, event: RenderEvent) {
        self.render.push(event);
    }

    pub fn sound(&mut self, cue: SoundCue) {
        self.sounds.push(cue);
    }

    pub fn take(&mut self) -> Outbox {
        std::mem::take(self)
    }

    pub fn is_empty(&self) -> bool {
        self.render.is_empty() && self.sounds.is_empty()
    }
}
