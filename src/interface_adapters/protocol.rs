// Wire protocol DTOs and conversions for viewer messages and the level format.

use crate::domain::{
    Bullet, Coordinate, Direction, Element, GameOutcome, LevelEntry, Material, PlayState,
    Placement, RenderEvent,
};
use crate::use_cases::{InputCommand, WorldSnapshot};
use serde::{Deserialize, Serialize};

/// Messages the server sends to connected viewers over the WebSocket.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "data")]
pub enum ServerMessage {
    // Full world on connect; later changes arrive as Render messages.
    Snapshot(SnapshotDto),
    Render(RenderEventDto),
    // Play state transitions (paused, playing, finished).
    State(PlayStateDto),
}

/// Messages the viewer sends to the server over the WebSocket.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum ClientMessage {
    Move { direction: DirectionDto },
    Fire,
    Release,
    TogglePlay,
    Pause,
}

impl From<ClientMessage> for InputCommand {
    fn from(message: ClientMessage) -> Self {
        match message {
            ClientMessage::Move { direction } => InputCommand::Move(direction.into()),
            ClientMessage::Fire => InputCommand::Fire,
            ClientMessage::Release => InputCommand::Release,
            ClientMessage::TogglePlay => InputCommand::TogglePlay,
            ClientMessage::Pause => InputCommand::Pause,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DirectionDto {
    Up,
    Down,
    Left,
    Right,
}

impl From<DirectionDto> for Direction {
    fn from(direction: DirectionDto) -> Self {
        match direction {
            DirectionDto::Up => Direction::Up,
            DirectionDto::Down => Direction::Down,
            DirectionDto::Left => Direction::Left,
            DirectionDto::Right => Direction::Right,
        }
    }
}

impl From<Direction> for DirectionDto {
    fn from(direction: Direction) -> Self {
        match direction {
            Direction::Up => DirectionDto::Up,
            Direction::Down => DirectionDto::Down,
            Direction::Left => DirectionDto::Left,
            Direction::Right => DirectionDto::Right,
        }
    }
}

/// Material names as they appear in stored levels and on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MaterialDto {
    Empty,
    Brick,
    Concrete,
    Grass,
    Eagle,
    EnemyTank,
    PlayerTank,
}

impl From<MaterialDto> for Material {
    fn from(material: MaterialDto) -> Self {
        match material {
            MaterialDto::Empty => Material::Empty,
            MaterialDto::Brick => Material::Brick,
            MaterialDto::Concrete => Material::Concrete,
            MaterialDto::Grass => Material::Grass,
            MaterialDto::Eagle => Material::Eagle,
            MaterialDto::EnemyTank => Material::EnemyTank,
            MaterialDto::PlayerTank => Material::PlayerTank,
        }
    }
}

impl From<Material> for MaterialDto {
    fn from(material: Material) -> Self {
        match material {
            Material::Empty => MaterialDto::Empty,
            Material::Brick => MaterialDto::Brick,
            Material::Concrete => MaterialDto::Concrete,
            Material::Grass => MaterialDto::Grass,
            Material::Eagle => MaterialDto::Eagle,
            Material::EnemyTank => MaterialDto::EnemyTank,
            Material::PlayerTank => MaterialDto::PlayerTank,
        }
    }
}

/// One stored placement: `[{"material":"BRICK","top":0,"left":50}, ...]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelEntryDto {
    pub material: MaterialDto,
    pub top: i32,
    pub left: i32,
}

impl From<LevelEntryDto> for LevelEntry {
    fn from(entry: LevelEntryDto) -> Self {
        Self {
            material: entry.material.into(),
            coordinate: Coordinate::new(entry.top, entry.left),
        }
    }
}

impl From<&Element> for LevelEntryDto {
    fn from(element: &Element) -> Self {
        Self {
            material: element.material.into(),
            top: element.coordinate.top,
            left: element.coordinate.left,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ElementDto {
    pub id: u64,
    pub material: MaterialDto,
    pub top: i32,
    pub left: i32,
}

impl From<&Element> for ElementDto {
    fn from(element: &Element) -> Self {
        Self {
            id: element.id.0,
            material: element.material.into(),
            top: element.coordinate.top,
            left: element.coordinate.left,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BulletDto {
    pub id: u64,
    pub direction: DirectionDto,
    pub top: i32,
    pub left: i32,
}

impl From<&Bullet> for BulletDto {
    fn from(bullet: &Bullet) -> Self {
        Self {
            id: bullet.id.0,
            direction: bullet.direction.into(),
            top: bullet.position.top,
            left: bullet.position.left,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "outcome")]
pub enum PlayStateDto {
    Paused,
    Playing,
    Finished(OutcomeDto),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum OutcomeDto {
    Won,
    Lost,
}

impl From<GameOutcome> for OutcomeDto {
    fn from(outcome: GameOutcome) -> Self {
        match outcome {
            GameOutcome::Won => OutcomeDto::Won,
            GameOutcome::Lost => OutcomeDto::Lost,
        }
    }
}

impl From<PlayState> for PlayStateDto {
    fn from(state: PlayState) -> Self {
        match state {
            PlayState::Paused => PlayStateDto::Paused,
            PlayState::Playing => PlayStateDto::Playing,
            PlayState::Finished(outcome) => PlayStateDto::Finished(outcome.into()),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SnapshotDto {
    pub state: PlayStateDto,
    pub elements: Vec<ElementDto>,
    pub bullets: Vec<BulletDto>,
    pub enemies_alive: usize,
    pub enemies_spawned: u32,
}

impl From<WorldSnapshot> for SnapshotDto {
    fn from(snapshot: WorldSnapshot) -> Self {
        Self {
            state: snapshot.state.into(),
            elements: snapshot.elements.iter().map(ElementDto::from).collect(),
            bullets: snapshot.bullets.iter().map(BulletDto::from).collect(),
            enemies_alive: snapshot.enemies_alive,
            enemies_spawned: snapshot.enemies_spawned,
        }
    }
}

/// Incremental render instruction for viewers.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind")]
pub enum RenderEventDto {
    Placed { element: ElementDto },
    Moved { id: u64, top: i32, left: i32, direction: DirectionDto },
    Turned { id: u64, direction: DirectionDto },
    Removed { id: u64 },
    BulletSpawned { bullet: BulletDto },
    BulletMoved { id: u64, top: i32, left: i32 },
    BulletRemoved { id: u64 },
}

impl From<RenderEvent> for ServerMessage {
    fn from(event: RenderEvent) -> Self {
        let dto = match event {
            RenderEvent::StateChanged(state) => return ServerMessage::State(state.into()),
            RenderEvent::Placed(element) => RenderEventDto::Placed {
                element: ElementDto::from(&element),
            },
            RenderEvent::Moved {
                id,
                coordinate,
                direction,
            } => RenderEventDto::Moved {
                id: id.0,
                top: coordinate.top,
                left: coordinate.left,
                direction: direction.into(),
            },
            RenderEvent::Turned { id, direction } => RenderEventDto::Turned {
                id: id.0,
                direction: direction.into(),
            },
            RenderEvent::Removed { id } => RenderEventDto::Removed { id: id.0 },
            RenderEvent::BulletSpawned(bullet) => RenderEventDto::BulletSpawned {
                bullet: BulletDto::from(&bullet),
            },
            RenderEvent::BulletMoved { id, position } => RenderEventDto::BulletMoved {
                id: id.0,
                top: position.top,
                left: position.left,
            },
            RenderEvent::BulletRemoved { id } => RenderEventDto::BulletRemoved { id: id.0 },
        };
        ServerMessage::Render(dto)
    }
}

/// Body of `POST /elements`.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PlaceElementRequest {
    pub material: MaterialDto,
    pub top: i32,
    pub left: i32,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlacementResponse {
    pub placed: Option<ElementDto>,
    pub replaced: Vec<u64>,
}

impl From<Placement> for PlacementResponse {
    fn from(placement: Placement) -> Self {
        Self {
            placed: placement.placed.as_ref().map(ElementDto::from),
            replaced: placement.replaced.iter().map(|e| e.id.0).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SaveLevelResponse {
    pub saved: usize,
}
