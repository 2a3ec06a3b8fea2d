// Game session orchestration: owns the world lock, play state, and output fan-out.

use super::play_state::PlayStateMachine;
use super::scheduler;
use super::types::{InputCommand, WorldSnapshot};
use crate::domain::tuning::{BulletTuning, EnemyTuning};
use crate::domain::{
    AudioSink, Bounds, Coordinate, GridError, LevelStorage, LoadReport, Material, Outbox,
    PlayState, Placement, RenderEvent, SoundCue, StorageError, World,
};
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::{Mutex, Notify, broadcast, watch};
use tracing::{debug, info};

/// Shared configuration for a game session.
#[derive(Debug, Clone)]
pub struct GameSettings {
    /// Container size in pixels plus the cell size.
    pub bounds: Bounds,
    pub bullet: BulletTuning,
    pub enemy: EnemyTuning,
    /// Capacity for broadcast render events.
    pub render_capacity: usize,
    /// Fixed seed for enemy decisions; `None` seeds from the OS.
    pub rng_seed: Option<u64>,
}

/// Errors returned by level-editor placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditError {
    /// Editing only happens while the session is paused.
    NotPaused,
    /// Actors and the eagle are never placed by hand.
    NotEditable(Material),
    Grid(GridError),
}

impl fmt::Display for EditError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EditError::NotPaused => write!(f, "level can only be edited while paused"),
            EditError::NotEditable(material) => write!(f, "{material:?} cannot be placed"),
            EditError::Grid(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for EditError {}

impl From<GridError> for EditError {
    fn from(err: GridError) -> Self {
        EditError::Grid(err)
    }
}

/// Cloneable handle to one game session.
#[derive(Clone)]
pub struct Game {
    inner: Arc<GameInner>,
}

struct GameInner {
    settings: GameSettings,
    world: Mutex<World>,
    state: PlayStateMachine,
    render_tx: broadcast::Sender<RenderEvent>,
    audio: Arc<dyn AudioSink>,
    storage: Arc<dyn LevelStorage>,
    tasks_started: AtomicBool,
    intro_played: AtomicBool,
    stopping: AtomicBool,
    shutdown: Notify,
}

impl Game {
    pub fn new(
        settings: GameSettings,
        audio: Arc<dyn AudioSink>,
        storage: Arc<dyn LevelStorage>,
    ) -> Self {
        let world = World::new(settings.bounds, settings.bullet, settings.enemy);
        let (render_tx, _render_rx) = broadcast::channel(settings.render_capacity.max(1));
        Self {
            inner: Arc::new(GameInner {
                settings,
                world: Mutex::new(world),
                state: PlayStateMachine::new(),
                render_tx,
                audio,
                storage,
                tasks_started: AtomicBool::new(false),
                intro_played: AtomicBool::new(false),
                stopping: AtomicBool::new(false),
                shutdown: Notify::new(),
            }),
        }
    }

    pub fn settings(&self) -> &GameSettings {
        &self.inner.settings
    }

    pub fn state(&self) -> PlayState {
        self.inner.state.current()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<RenderEvent> {
        self.inner.render_tx.subscribe()
    }

    pub fn subscribe_state(&self) -> watch::Receiver<PlayState> {
        self.inner.state.subscribe()
    }

    /// Runs `f` under the world lock and publishes what it produced.
    ///
    /// Render events and the finished state go out while the lock is held so viewers
    /// see them in world order. Sound cues are played after unlocking.
    pub async fn with_world<T>(&self, f: impl FnOnce(&mut World) -> T) -> T {
        let (result, sounds) = {
            let mut world = self.inner.world.lock().await;
            let result = f(&mut world);
            let Outbox { render, sounds } = world.take_outbox();
            for event in render {
                // No receivers is fine; viewers come and go.
                let _ = self.inner.render_tx.send(event);
            }
            if let Some(outcome) = world.outcome() {
                if self.inner.state.finish(outcome) {
                    info!(?outcome, "session finished");
                    self.publish_state(PlayState::Finished(outcome));
                }
            }
            (result, sounds)
        };

        for cue in sounds {
            self.inner.audio.play(cue);
        }
        result
    }

    /// Seeds the world from storage. Call before the first toggle.
    pub async fn load_level(&self) -> Result<LoadReport, StorageError> {
        let storage = Arc::clone(&self.inner.storage);
        let entries = tokio::task::spawn_blocking(move || storage.load())
            .await
            .map_err(|err| StorageError::Io(std::io::Error::other(err)))??;
        Ok(self.with_world(|world| world.load_level(&entries)).await)
    }

    /// Persists the terrain currently on the grid. Returns the number of entries written.
    pub async fn save_level(&self) -> Result<usize, StorageError> {
        let terrain: Vec<_> = {
            let world = self.inner.world.lock().await;
            world
                .grid()
                .elements()
                .iter()
                .filter(|e| e.material.is_editable())
                .cloned()
                .collect()
        };
        let count = terrain.len();
        let storage = Arc::clone(&self.inner.storage);
        tokio::task::spawn_blocking(move || storage.save(&terrain))
            .await
            .map_err(|err| StorageError::Io(std::io::Error::other(err)))??;
        info!(entries = count, "level saved");
        Ok(count)
    }

    /// Level-editor placement; only allowed while paused.
    pub async fn place_element(
        &self,
        material: Material,
        coordinate: Coordinate,
    ) -> Result<Placement, EditError> {
        if self.state() != PlayState::Paused {
            return Err(EditError::NotPaused);
        }
        if !material.is_editable() {
            return Err(EditError::NotEditable(material));
        }
        let placement = self
            .with_world(|world| world.place(material, coordinate))
            .await?;
        debug!(?material, top = coordinate.top, left = coordinate.left, "element placed");
        Ok(placement)
    }

    pub async fn handle_input(&self, command: InputCommand) {
        match command {
            InputCommand::TogglePlay => {
                self.toggle_play();
            }
            InputCommand::Pause => {
                self.force_pause();
            }
            _ if !self.inner.state.is_playing() => {
                debug!(?command, "ignoring input while not playing");
            }
            InputCommand::Move(direction) => {
                self.with_world(|world| world.move_player(direction)).await;
            }
            InputCommand::Fire => {
                self.with_world(|world| world.fire_player()).await;
            }
            InputCommand::Release => {
                self.with_world(|world| world.release_player()).await;
            }
        }
    }

    /// Flips Paused/Playing. The first switch to Playing plays the intro and starts
    /// the periodic tasks; later toggles only gate them.
    pub fn toggle_play(&self) -> Option<PlayState> {
        let next = self.inner.state.toggle()?;
        info!(state = ?next, "play state toggled");
        self.publish_state(next);

        match next {
            PlayState::Playing => {
                if !self.inner.intro_played.swap(true, Ordering::SeqCst) {
                    self.inner.audio.play(SoundCue::Intro);
                }
                if !self.inner.tasks_started.swap(true, Ordering::SeqCst) {
                    scheduler::spawn_tasks(self.clone());
                }
            }
            _ => self.inner.audio.play(SoundCue::PauseAll),
        }
        Some(next)
    }

    /// Pauses a running session, e.g. when the last viewer goes away.
    pub fn force_pause(&self) -> bool {
        if !self.inner.state.force_pause() {
            return false;
        }
        info!("session paused");
        self.publish_state(PlayState::Paused);
        self.inner.audio.play(SoundCue::PauseAll);
        true
    }

    pub async fn snapshot(&self) -> WorldSnapshot {
        let world = self.inner.world.lock().await;
        WorldSnapshot {
            state: self.state(),
            elements: world.grid().elements().to_vec(),
            bullets: world.bullets().to_vec(),
            enemies_alive: world.enemies().len(),
            enemies_spawned: world.enemies().spawned(),
            outcome: world.outcome(),
        }
    }

    /// Stops the periodic tasks.
    pub fn shutdown(&self) {
        self.inner.stopping.store(true, Ordering::SeqCst);
        self.inner.shutdown.notify_waiters();
    }

    pub(crate) fn is_stopping(&self) -> bool {
        self.inner.stopping.load(Ordering::SeqCst)
    }

    pub(crate) async fn stopped(&self) {
        self.inner.shutdown.notified().await;
    }

    fn publish_state(&self, state: PlayState) {
        let _ = self.inner.render_tx.send(RenderEvent::StateChanged(state));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CELL_SIZE, Direction, GameOutcome, LevelEntry};
    use crate::use_cases::test_support::{RecordingAudio, StubStorage, quiet_settings};
    use std::time::Duration;

    fn cell(column: i32, row: i32) -> Coordinate {
        Coordinate::from_cell(column, row, CELL_SIZE)
    }

    fn game_with(settings: GameSettings, storage: StubStorage) -> (Game, RecordingAudio) {
        let audio = RecordingAudio::default();
        let game = Game::new(settings, Arc::new(audio.clone()), Arc::new(storage));
        (game, audio)
    }

    async fn loaded_game(max_spawns: u32) -> (Game, RecordingAudio) {
        let (game, audio) = game_with(quiet_settings(max_spawns), StubStorage::default());
        game.load_level().await.expect("level loads");
        (game, audio)
    }

    #[tokio::test(start_paused = true)]
    async fn when_playing_then_enemies_spawn_until_cap() {
        let (game, _audio) = loaded_game(3).await;

        game.toggle_play();
        tokio::time::sleep(Duration::from_secs(20)).await;

        let snapshot = game.snapshot().await;
        assert_eq!(snapshot.enemies_spawned, 3);
        assert_eq!(snapshot.enemies_alive, 3);
        game.shutdown();
    }

    #[tokio::test(start_paused = true)]
    async fn when_paused_and_resumed_then_spawning_continues_without_duplicates() {
        let (game, _audio) = loaded_game(20).await;

        game.toggle_play();
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(game.snapshot().await.enemies_spawned, 1);

        game.toggle_play();
        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(game.snapshot().await.enemies_spawned, 1);

        game.toggle_play();
        tokio::time::sleep(Duration::from_secs(3)).await;
        assert_eq!(game.snapshot().await.enemies_spawned, 2);
        game.shutdown();
    }

    #[tokio::test]
    async fn when_toggled_repeatedly_then_intro_plays_once() {
        let (game, audio) = loaded_game(1).await;

        game.toggle_play();
        game.toggle_play();
        game.toggle_play();

        assert_eq!(audio.count(SoundCue::Intro), 1);
        assert_eq!(audio.count(SoundCue::PauseAll), 1);
        game.shutdown();
    }

    #[tokio::test]
    async fn when_paused_then_player_input_is_ignored() {
        let (game, audio) = loaded_game(1).await;
        let before = game.snapshot().await.elements;

        game.handle_input(InputCommand::Move(Direction::Up)).await;
        game.handle_input(InputCommand::Fire).await;

        let after = game.snapshot().await;
        assert_eq!(after.elements, before);
        assert!(after.bullets.is_empty());
        assert!(audio.cues().is_empty());
    }

    #[tokio::test]
    async fn when_playing_then_editor_placement_is_refused() {
        let (game, _audio) = loaded_game(1).await;
        game.toggle_play();

        let result = game.place_element(Material::Brick, cell(0, 5)).await;

        assert_eq!(result, Err(EditError::NotPaused));
        game.shutdown();
    }

    #[tokio::test]
    async fn when_placing_actor_material_then_it_is_not_editable() {
        let (game, _audio) = loaded_game(1).await;

        let result = game.place_element(Material::EnemyTank, cell(0, 5)).await;

        assert_eq!(result, Err(EditError::NotEditable(Material::EnemyTank)));
    }

    #[tokio::test]
    async fn when_level_is_saved_then_only_terrain_is_written() {
        let storage = StubStorage::with_level(vec![LevelEntry {
            material: Material::Brick,
            coordinate: cell(0, 0),
        }]);
        let (game, _audio) = game_with(quiet_settings(1), storage.clone());
        game.load_level().await.expect("level loads");
        game.place_element(Material::Grass, cell(5, 0))
            .await
            .expect("placement");

        let written = game.save_level().await.expect("save");

        assert_eq!(written, 2);
        let materials: Vec<Material> = storage.stored().iter().map(|e| e.material).collect();
        assert_eq!(materials, vec![Material::Brick, Material::Grass]);
    }

    #[tokio::test]
    async fn when_storage_fails_then_load_reports_the_error() {
        let (game, _audio) = game_with(quiet_settings(1), StubStorage::failing());

        assert!(matches!(
            game.load_level().await,
            Err(StorageError::Format(_))
        ));
    }

    #[tokio::test]
    async fn when_last_enemy_is_removed_after_cap_then_session_is_won() {
        let (game, _audio) = loaded_game(1).await;
        let mut state_rx = game.subscribe_state();
        game.with_world(|world| world.spawn_enemy()).await;

        assert!(game.with_world(|world| world.remove_enemy(-1)).await.is_none());
        assert!(game.with_world(|world| world.remove_enemy(0)).await.is_some());

        assert_eq!(game.state(), PlayState::Finished(GameOutcome::Won));
        assert!(state_rx.has_changed().unwrap_or(false));
        assert_eq!(game.toggle_play(), None);
    }

    #[tokio::test]
    async fn when_viewer_subscribes_then_render_events_are_delivered() {
        let (game, _audio) = loaded_game(1).await;
        let mut rx = game.subscribe();

        game.with_world(|world| world.spawn_enemy()).await;

        assert!(matches!(
            rx.recv().await,
            Ok(RenderEvent::Placed(element)) if element.material == Material::EnemyTank
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn when_paused_and_resumed_then_enemy_movement_freezes_and_continues() {
        let mut settings = quiet_settings(1);
        settings.enemy.move_interval = Duration::from_millis(400);
        let (game, _audio) = game_with(settings, StubStorage::default());
        game.load_level().await.expect("level loads");

        game.toggle_play();
        tokio::time::sleep(Duration::from_millis(500)).await;
        game.toggle_play();
        let frozen = enemy_position(&game).await;

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(enemy_position(&game).await, frozen);

        game.toggle_play();
        tokio::time::sleep(Duration::from_millis(500)).await;
        assert!(enemy_position(&game).await.top > frozen.top);
        game.shutdown();
    }

    async fn enemy_position(game: &Game) -> Coordinate {
        game.snapshot()
            .await
            .elements
            .into_iter()
            .find(|e| e.material == Material::EnemyTank)
            .map(|e| e.coordinate)
            .expect("enemy on the grid")
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn when_tasks_race_then_removals_never_precede_placements() {
        let mut settings = quiet_settings(10_000);
        settings.render_capacity = 8_192;
        let (game, _audio) = game_with(settings, StubStorage::default());
        game.load_level().await.expect("level loads");
        let mut rx = game.subscribe();

        let spawner = {
            let game = game.clone();
            tokio::spawn(async move {
                for _ in 0..500 {
                    game.with_world(|world| world.spawn_enemy()).await;
                    tokio::task::yield_now().await;
                }
            })
        };
        let remover = {
            let game = game.clone();
            tokio::spawn(async move {
                for _ in 0..500 {
                    game.with_world(|world| world.remove_enemy(0)).await;
                    tokio::task::yield_now().await;
                }
            })
        };
        spawner.await.expect("spawner");
        remover.await.expect("remover");

        let mut placed = std::collections::HashSet::new();
        while let Ok(event) = rx.try_recv() {
            match event {
                RenderEvent::Placed(element) => {
                    placed.insert(element.id);
                }
                RenderEvent::Removed { id } => {
                    assert!(placed.contains(&id), "removed {id:?} before it was placed");
                }
                _ => {}
            }
        }
        assert!(!placed.is_empty());
    }

    #[tokio::test]
    async fn when_level_is_loaded_then_storage_runs_off_the_async_thread() {
        let storage = StubStorage::default();
        let (game, _audio) = game_with(quiet_settings(1), storage.clone());

        game.load_level().await.expect("level loads");
        game.save_level().await.expect("save");

        let caller = std::thread::current().id();
        let threads = storage.threads();
        assert_eq!(threads.len(), 2);
        assert!(threads.iter().all(|id| *id != caller));
    }
}
