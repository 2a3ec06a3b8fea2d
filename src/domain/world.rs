// World aggregate: the state guarded by the simulation lock.
//
// Every mutation records render events and sound cues in the outbox; the caller
// publishes them after releasing the lock.

use crate::domain::events::{Outbox, RenderEvent, SoundCue};
use crate::domain::geometry::{Bounds, Coordinate, Direction};
use crate::domain::grid::{Element, ElementId, Grid, GridError, Placement};
use crate::domain::material::Material;
use crate::domain::ports::LevelEntry;
use crate::domain::state::{Bullet, BulletId, Faction, GameOutcome, Tank};
use crate::domain::systems::{
    BulletEngine, EnemyRoster, ImpactKind, MoveOutcome, SpawnOutcome, try_move,
};
use crate::domain::tuning::{BulletTuning, EnemyTuning};
use rand::Rng;
use rand::seq::IteratorRandom;
use tracing::{debug, info, warn};

/// Counts from seeding the grid out of storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LoadReport {
    pub placed: usize,
    pub skipped: usize,
}

#[derive(Debug)]
pub struct World {
    grid: Grid,
    player: Option<Tank>,
    eagle: Option<ElementId>,
    enemies: EnemyRoster,
    bullets: BulletEngine,
    enemy_tuning: EnemyTuning,
    outcome: Option<GameOutcome>,
    outbox: Outbox,
}

impl World {
    pub fn new(bounds: Bounds, bullet_tuning: BulletTuning, enemy_tuning: EnemyTuning) -> Self {
        Self {
            grid: Grid::new(bounds),
            player: None,
            eagle: None,
            enemies: EnemyRoster::new(bounds, enemy_tuning.max_spawns),
            bullets: BulletEngine::new(bullet_tuning),
            enemy_tuning,
            outcome: None,
            outbox: Outbox::default(),
        }
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn player(&self) -> Option<&Tank> {
        self.player.as_ref()
    }

    pub fn eagle(&self) -> Option<ElementId> {
        self.eagle
    }

    pub fn enemies(&self) -> &EnemyRoster {
        &self.enemies
    }

    pub fn bullets(&self) -> &[Bullet] {
        self.bullets.bullets()
    }

    pub fn outcome(&self) -> Option<GameOutcome> {
        self.outcome
    }

    pub fn take_outbox(&mut self) -> Outbox {
        self.outbox.take()
    }

    /// Rebuilds the world from stored terrain, then adds the eagle and player tank.
    ///
    /// Actor and eagle entries in storage are ignored; they are always placed fresh.
    pub fn load_level(&mut self, entries: &[LevelEntry]) -> LoadReport {
        let bounds = self.grid.bounds();
        self.grid.clear();
        self.bullets.clear();
        self.enemies = EnemyRoster::new(bounds, self.enemy_tuning.max_spawns);
        self.player = None;
        self.eagle = None;
        self.outcome = None;

        let mut report = LoadReport::default();
        for entry in entries {
            if !entry.material.is_editable() || entry.material == Material::Empty {
                debug!(material = ?entry.material, "ignoring non-terrain level entry");
                continue;
            }
            match self.grid.insert(entry.material, entry.coordinate) {
                Ok(_) => report.placed += 1,
                Err(err) => {
                    warn!(
                        material = ?entry.material,
                        top = entry.coordinate.top,
                        left = entry.coordinate.left,
                        error = %err,
                        "skipping level entry"
                    );
                    report.skipped += 1;
                }
            }
        }

        let eagle_at = eagle_anchor(bounds);
        self.eagle = self.insert_clearing(Material::Eagle, eagle_at).map(|e| e.id);

        let player_at = player_anchor(bounds, eagle_at);
        self.player = self
            .insert_clearing(Material::PlayerTank, player_at)
            .map(|e| Tank::new(e.id, Direction::Up, Faction::Player));

        for element in self.grid.elements() {
            self.outbox.render(RenderEvent::Placed(element.clone()));
        }
        info!(
            placed = report.placed,
            skipped = report.skipped,
            "level loaded"
        );
        report
    }

    /// Level-editor placement of terrain.
    pub fn place(
        &mut self,
        material: Material,
        coordinate: Coordinate,
    ) -> Result<Placement, GridError> {
        let placement = self.grid.place(material, coordinate)?;
        for element in &placement.replaced {
            self.outbox.render(RenderEvent::Removed { id: element.id });
        }
        if let Some(element) = &placement.placed {
            self.outbox.render(RenderEvent::Placed(element.clone()));
        }
        Ok(placement)
    }

    pub fn move_player(&mut self, direction: Direction) -> Option<MoveOutcome> {
        let player = self.player.as_mut()?;
        let outcome = try_move(&mut self.grid, player, direction);
        let id = player.element_id;
        if outcome == MoveOutcome::Moved {
            self.outbox.sound(SoundCue::TankMove);
        }
        self.publish_motion(id, direction, outcome);
        Some(outcome)
    }

    pub fn fire_player(&mut self) -> Option<BulletId> {
        let player = self.player.clone()?;
        self.fire(&player)
    }

    /// Directional input released.
    pub fn release_player(&mut self) {
        // Enemy engines keep the move loop audible while any are alive.
        if self.enemies.is_empty() {
            self.outbox.sound(SoundCue::TankStop);
        }
    }

    pub fn spawn_enemy(&mut self) -> SpawnOutcome {
        let outcome = self.enemies.spawn(&mut self.grid);
        match &outcome {
            SpawnOutcome::Spawned(element) => {
                info!(
                    element_id = element.id.0,
                    left = element.coordinate.left,
                    spawned = self.enemies.spawned(),
                    "enemy spawned"
                );
                self.outbox.render(RenderEvent::Placed(element.clone()));
            }
            SpawnOutcome::AllPointsBusy => debug!("all respawn points busy; skipping spawn"),
            SpawnOutcome::CapReached => {}
        }
        outcome
    }

    /// One enemy movement pass: advance each live tank and maybe fire.
    pub fn move_enemies<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let chance = self.enemy_tuning.fire_chance_percent.min(100);

        for id in self.enemies.snapshot() {
            let Some(tank) = self.enemies.get_mut(id) else {
                continue;
            };
            let heading = tank.direction;
            let outcome = try_move(&mut self.grid, tank, heading);
            if outcome != MoveOutcome::Moved {
                // Keep heading until blocked, then pick another way.
                tank.direction = Direction::ALL
                    .into_iter()
                    .filter(|d| *d != heading)
                    .choose(rng)
                    .unwrap_or(heading);
            }
            let tank = tank.clone();
            self.publish_motion(tank.element_id, tank.direction, outcome);

            if rng.random_ratio(chance, 100) {
                self.fire(&tank);
            }
        }
    }

    /// Removes the enemy at roster position `index` and its grid element.
    pub fn remove_enemy(&mut self, index: isize) -> Option<Tank> {
        let tank = self.enemies.remove_tank(index)?;
        if self.grid.remove(tank.element_id).is_some() {
            self.outbox.render(RenderEvent::Removed {
                id: tank.element_id,
            });
        }
        self.check_victory();
        Some(tank)
    }

    pub fn tick_bullets(&mut self) {
        let tick = self.bullets.tick(&mut self.grid);

        for (id, position) in tick.moved {
            self.outbox.render(RenderEvent::BulletMoved { id, position });
        }

        for impact in tick.impacts {
            self.outbox
                .render(RenderEvent::BulletRemoved { id: impact.bullet });
            let ImpactKind::Collision {
                destroyed,
                eagle_struck,
            } = impact.kind
            else {
                continue;
            };

            self.outbox.sound(SoundCue::BulletBurst);
            for element in destroyed {
                self.outbox.render(RenderEvent::Removed { id: element.id });
                match element.material {
                    Material::EnemyTank => {
                        self.enemies.remove_by_element(element.id);
                        info!(
                            element_id = element.id.0,
                            alive = self.enemies.len(),
                            "enemy destroyed"
                        );
                    }
                    Material::PlayerTank => {
                        self.player = None;
                        info!(shooter = ?impact.shooter, "player tank destroyed");
                        self.finish(GameOutcome::Lost);
                    }
                    _ => {}
                }
            }
            if eagle_struck {
                info!("eagle struck");
                self.finish(GameOutcome::Lost);
            }
        }

        self.check_victory();
    }

    fn fire(&mut self, tank: &Tank) -> Option<BulletId> {
        let bullet = self.bullets.spawn(&self.grid, tank)?;
        let id = bullet.id;
        debug!(bullet_id = id.0, owner = tank.element_id.0, "bullet fired");
        self.outbox.render(RenderEvent::BulletSpawned(bullet));
        self.outbox.sound(SoundCue::BulletShot);
        Some(id)
    }

    fn publish_motion(&mut self, id: ElementId, direction: Direction, outcome: MoveOutcome) {
        let event = match (outcome, self.grid.get(id)) {
            (MoveOutcome::Moved, Some(element)) => RenderEvent::Moved {
                id,
                coordinate: element.coordinate,
                direction,
            },
            _ => RenderEvent::Turned { id, direction },
        };
        self.outbox.render(event);
    }

    // Inserts an actor, clearing any terrain under its footprint first.
    fn insert_clearing(&mut self, material: Material, at: Coordinate) -> Option<Element> {
        let footprint = material.footprint(at, self.grid.cell_size());
        let covered: Vec<ElementId> = self
            .grid
            .query(footprint)
            .into_iter()
            .map(|e| e.id)
            .collect();
        for id in covered {
            self.grid.remove(id);
        }
        match self.grid.insert(material, at) {
            Ok(element) => Some(element),
            Err(err) => {
                warn!(material = ?material, error = %err, "could not place actor");
                None
            }
        }
    }

    fn check_victory(&mut self) {
        if self.enemies.is_exhausted() && self.enemies.is_empty() {
            self.finish(GameOutcome::Won);
        }
    }

    fn finish(&mut self, outcome: GameOutcome) {
        if self.outcome.is_none() {
            info!(?outcome, "game over");
            self.outcome = Some(outcome);
        }
    }
}

// Bottom row, horizontally centred.
fn eagle_anchor(bounds: Bounds) -> Coordinate {
    let cell = bounds.cell_size;
    Coordinate::new(
        (bounds.rows() - Material::Eagle.height_cells()) * cell,
        (bounds.columns() / 2 - Material::Eagle.width_cells() / 2) * cell,
    )
}

// Bottom row, directly left of the eagle (right of it when there is no room).
fn player_anchor(bounds: Bounds, eagle: Coordinate) -> Coordinate {
    let cell = bounds.cell_size;
    let width = Material::PlayerTank.width_cells() * cell;
    let top = (bounds.rows() - Material::PlayerTank.height_cells()) * cell;
    let left = if eagle.left >= width {
        eagle.left - width
    } else {
        eagle.left + Material::Eagle.width_cells() * cell
    };
    Coordinate::new(top, left)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::geometry::CELL_SIZE;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn cell(column: i32, row: i32) -> Coordinate {
        Coordinate::from_cell(column, row, CELL_SIZE)
    }

    fn world_with(enemy_tuning: EnemyTuning) -> World {
        World::new(
            Bounds::from_cells(10, 10, CELL_SIZE),
            BulletTuning::default(),
            enemy_tuning,
        )
    }

    fn world() -> World {
        world_with(EnemyTuning::default())
    }

    fn entry(material: Material, column: i32, row: i32) -> LevelEntry {
        LevelEntry {
            material,
            coordinate: cell(column, row),
        }
    }

    fn run_bullets(world: &mut World) {
        for _ in 0..100 {
            world.tick_bullets();
            if world.bullets().is_empty() {
                break;
            }
        }
    }

    #[test]
    fn when_level_loads_then_eagle_and_player_are_placed_at_bottom() {
        let mut world = world();

        let report = world.load_level(&[entry(Material::Brick, 0, 0)]);

        assert_eq!(report, LoadReport { placed: 1, skipped: 0 });
        let eagle = world.grid().get(world.eagle().expect("eagle")).expect("eagle element");
        assert_eq!(eagle.coordinate, cell(3, 7));
        let player = world.player().expect("player");
        let element = world.grid().get(player.element_id).expect("player element");
        assert_eq!(element.coordinate, cell(1, 8));
        assert_eq!(player.direction, Direction::Up);
    }

    #[test]
    fn when_level_has_overlapping_or_actor_entries_then_they_are_skipped() {
        let mut world = world();

        let report = world.load_level(&[
            entry(Material::Brick, 0, 0),
            entry(Material::Concrete, 0, 0),
            entry(Material::EnemyTank, 4, 4),
            entry(Material::Eagle, 0, 3),
        ]);

        assert_eq!(report, LoadReport { placed: 1, skipped: 1 });
        assert!(world.enemies().is_empty());
    }

    #[test]
    fn when_level_loads_then_renderer_receives_every_element() {
        let mut world = world();
        world.load_level(&[entry(Material::Grass, 0, 0)]);

        let outbox = world.take_outbox();

        assert_eq!(outbox.render.len(), world.grid().len());
        assert!(world.take_outbox().is_empty());
    }

    #[test]
    fn when_player_moves_then_move_cue_and_render_event_are_emitted() {
        let mut world = world();
        world.load_level(&[]);
        world.take_outbox();

        assert_eq!(world.move_player(Direction::Up), Some(MoveOutcome::Moved));

        let outbox = world.take_outbox();
        assert_eq!(outbox.sounds, vec![SoundCue::TankMove]);
        assert!(matches!(
            outbox.render.as_slice(),
            [RenderEvent::Moved { coordinate, .. }] if *coordinate == cell(1, 7)
        ));
    }

    #[test]
    fn when_enemy_is_blocked_then_it_turns_without_moving() {
        let mut world = world_with(EnemyTuning {
            fire_chance_percent: 0,
            ..EnemyTuning::default()
        });
        world.load_level(&[entry(Material::Concrete, 3, 2), entry(Material::Concrete, 4, 2)]);
        let SpawnOutcome::Spawned(element) = world.spawn_enemy() else {
            panic!("spawn should succeed");
        };
        let mut rng = StdRng::seed_from_u64(7);

        world.move_enemies(&mut rng);

        let tank = &world.enemies().tanks()[0];
        assert_ne!(tank.direction, Direction::Down);
        assert_eq!(
            world.grid().get(element.id).expect("enemy").coordinate,
            cell(3, 0)
        );
    }

    #[test]
    fn when_enemy_path_is_clear_then_it_keeps_heading_down() {
        let mut world = world_with(EnemyTuning {
            fire_chance_percent: 0,
            ..EnemyTuning::default()
        });
        world.load_level(&[]);
        let SpawnOutcome::Spawned(element) = world.spawn_enemy() else {
            panic!("spawn should succeed");
        };
        let mut rng = StdRng::seed_from_u64(7);

        world.move_enemies(&mut rng);
        world.move_enemies(&mut rng);

        assert_eq!(world.enemies().tanks()[0].direction, Direction::Down);
        assert_eq!(
            world.grid().get(element.id).expect("enemy").coordinate,
            cell(3, 2)
        );
        assert!(world.bullets().is_empty());
    }

    #[test]
    fn when_fire_chance_is_certain_then_every_enemy_fires_once() {
        let mut world = world_with(EnemyTuning {
            fire_chance_percent: 100,
            ..EnemyTuning::default()
        });
        world.load_level(&[]);
        world.spawn_enemy();
        world.spawn_enemy();
        let mut rng = StdRng::seed_from_u64(1);

        world.move_enemies(&mut rng);
        world.move_enemies(&mut rng);

        assert_eq!(world.bullets().len(), 2);
    }

    #[test]
    fn when_enemy_bullet_hits_eagle_then_game_is_lost() {
        let mut world = world();
        world.load_level(&[]);
        // Enemy straight above the eagle, firing downwards.
        let element = world
            .grid
            .insert(Material::EnemyTank, cell(4, 0))
            .expect("enemy");
        let tank = Tank::new(element.id, Direction::Down, Faction::Enemy);
        world.fire(&tank).expect("bullet");

        run_bullets(&mut world);

        assert_eq!(world.outcome(), Some(GameOutcome::Lost));
        assert!(world.eagle().is_some());
    }

    #[test]
    fn when_player_kills_last_enemy_after_cap_then_game_is_won() {
        let mut world = world_with(EnemyTuning {
            max_spawns: 1,
            ..EnemyTuning::default()
        });
        world.load_level(&[]);
        let SpawnOutcome::Spawned(enemy) = world.spawn_enemy() else {
            panic!("spawn should succeed");
        };
        // Line the enemy up above the player, clear of the eagle.
        world.grid.move_to(enemy.id, cell(1, 0));
        world.fire_player().expect("bullet");

        run_bullets(&mut world);

        assert!(world.grid().get(enemy.id).is_none());
        assert!(world.enemies().is_empty());
        assert_eq!(world.outcome(), Some(GameOutcome::Won));
    }

    #[test]
    fn when_removing_enemy_by_index_then_its_element_leaves_the_grid() {
        let mut world = world();
        world.load_level(&[]);
        let SpawnOutcome::Spawned(enemy) = world.spawn_enemy() else {
            panic!("spawn should succeed");
        };

        assert!(world.remove_enemy(-1).is_none());
        assert_eq!(world.enemies().len(), 1);

        assert!(world.remove_enemy(0).is_some());
        assert!(world.grid().get(enemy.id).is_none());
        assert_eq!(world.outcome(), None);
    }

    #[test]
    fn when_editor_replaces_terrain_then_removal_and_placement_are_published() {
        let mut world = world();
        world.load_level(&[entry(Material::Brick, 5, 0)]);
        world.take_outbox();

        world
            .place(Material::Concrete, cell(5, 0))
            .expect("placement");

        let outbox = world.take_outbox();
        assert!(matches!(
            outbox.render.as_slice(),
            [RenderEvent::Removed { .. }, RenderEvent::Placed(element)]
                if element.material == Material::Concrete
        ));
    }

    #[test]
    fn when_editor_erases_eagle_anchor_then_eagle_stays_defended() {
        let mut world = world();
        world.load_level(&[]);
        world.take_outbox();
        let eagle = world.eagle().expect("eagle");
        let anchor = world.grid().get(eagle).expect("eagle element").coordinate;

        assert_eq!(world.place(Material::Empty, anchor), Err(GridError::Occupied));
        assert_eq!(world.place(Material::Brick, anchor), Err(GridError::Occupied));

        assert!(world.grid().get(eagle).is_some());
        assert!(world.take_outbox().is_empty());
    }
}
