use crate::domain::geometry::{Coordinate, Direction, Rect};
use crate::domain::grid::{Element, ElementId, Grid};
use crate::domain::material::Material;
use crate::domain::state::{Bullet, BulletId, Faction, Tank};
use crate::domain::tuning::BulletTuning;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImpactKind {
    /// Left the container; nothing was hit.
    Boundary,
    /// Stopped by solid cells. `destroyed` lists removed elements.
    Collision {
        destroyed: Vec<Element>,
        eagle_struck: bool,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Impact {
    pub bullet: BulletId,
    pub shooter: Faction,
    pub kind: ImpactKind,
}

/// What one engine tick did, for the world to publish.
#[derive(Debug, Default)]
pub struct BulletTick {
    pub moved: Vec<(BulletId, Coordinate)>,
    pub impacts: Vec<Impact>,
}

#[derive(Debug)]
pub struct BulletEngine {
    tuning: BulletTuning,
    bullets: Vec<Bullet>,
    next_id: u64,
}

impl BulletEngine {
    pub fn new(tuning: BulletTuning) -> Self {
        Self {
            tuning,
            bullets: Vec::new(),
            next_id: 1,
        }
    }

    pub fn tuning(&self) -> BulletTuning {
        self.tuning
    }

    pub fn bullets(&self) -> &[Bullet] {
        &self.bullets
    }

    pub fn live_count_for(&self, owner: ElementId) -> usize {
        self.bullets
            .iter()
            .filter(|b| b.alive && b.owner == owner)
            .count()
    }

    /// Fires a bullet from the edge `tank` is facing.
    ///
    /// Returns `None` when the tank has no element or already has its quota in flight.
    pub fn spawn(&mut self, grid: &Grid, tank: &Tank) -> Option<Bullet> {
        if self.live_count_for(tank.element_id) >= self.tuning.max_live_per_tank {
            return None;
        }
        let element = grid.get(tank.element_id)?;
        let footprint = element.footprint(grid.cell_size());
        let position = muzzle(footprint, tank.direction, self.tuning.size);

        let bullet = Bullet {
            id: BulletId(self.next_id),
            owner: tank.element_id,
            faction: tank.faction,
            direction: tank.direction,
            position,
            alive: true,
        };
        self.next_id = self.next_id.wrapping_add(1);
        self.bullets.push(bullet.clone());
        Some(bullet)
    }

    /// Advances every live bullet one step and resolves what it runs into.
    pub fn tick(&mut self, grid: &mut Grid) -> BulletTick {
        let mut report = BulletTick::default();
        let BulletTuning { step, size, .. } = self.tuning;
        let bounds = grid.bounds();

        for bullet in self.bullets.iter_mut().filter(|b| b.alive) {
            let candidate = bullet.position.step(bullet.direction, step);
            let area = Rect::new(candidate, size, size);

            if !bounds.contains(&area) {
                bullet.alive = false;
                report.impacts.push(Impact {
                    bullet: bullet.id,
                    shooter: bullet.faction,
                    kind: ImpactKind::Boundary,
                });
                continue;
            }

            let hits: Vec<Element> = grid
                .query(area)
                .into_iter()
                .filter(|e| e.id != bullet.owner && !e.material.bullet_can_pass())
                .cloned()
                .collect();

            if hits.is_empty() {
                bullet.position = candidate;
                report.moved.push((bullet.id, candidate));
                continue;
            }

            bullet.alive = false;
            let mut destroyed = Vec::new();
            let mut eagle_struck = false;
            for hit in hits {
                match hit.material {
                    Material::Eagle => eagle_struck |= bullet.faction == Faction::Enemy,
                    material if material.is_tank() => {
                        // No friendly fire: same-faction tanks only stop the bullet.
                        if Faction::of(material) != Some(bullet.faction) {
                            destroyed.extend(grid.remove(hit.id));
                        }
                    }
                    material if material.bullet_can_destroy() => {
                        destroyed.extend(grid.remove(hit.id));
                    }
                    _ => {}
                }
            }

            debug!(
                bullet_id = bullet.id.0,
                destroyed = destroyed.len(),
                eagle_struck,
                "bullet impact"
            );
            report.impacts.push(Impact {
                bullet: bullet.id,
                shooter: bullet.faction,
                kind: ImpactKind::Collision {
                    destroyed,
                    eagle_struck,
                },
            });
        }

        self.bullets.retain(|b| b.alive);
        report
    }

    pub fn clear(&mut self) {
        self.bullets.clear();
    }
}

// Bullet anchor centred on the firing edge, just inside the tank footprint.
fn muzzle(footprint: Rect, direction: Direction, size: i32) -> Coordinate {
    let centre_top = footprint.top + (footprint.height - size) / 2;
    let centre_left = footprint.left + (footprint.width - size) / 2;
    match direction {
        Direction::Up => Coordinate::new(footprint.top, centre_left),
        Direction::Down => Coordinate::new(footprint.bottom() - size, centre_left),
        Direction::Left => Coordinate::new(centre_top, footprint.left),
        Direction::Right => Coordinate::new(centre_top, footprint.right() - size),
    }
}
