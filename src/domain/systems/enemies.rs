use crate::domain::geometry::{Bounds, Coordinate, Direction};
use crate::domain::grid::{Element, ElementId, Grid};
use crate::domain::material::Material;
use crate::domain::state::{Faction, Tank};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpawnOutcome {
    Spawned(Element),
    /// Every respawn point is covered; nothing was counted.
    AllPointsBusy,
    /// Lifetime cap reached; spawning is over for the session.
    CapReached,
}

/// Live enemy tanks plus the lifetime spawn bookkeeping.
#[derive(Debug)]
pub struct EnemyRoster {
    respawn_points: Vec<Coordinate>,
    cursor: usize,
    spawned: u32,
    cap: u32,
    tanks: Vec<Tank>,
}

impl EnemyRoster {
    pub fn new(bounds: Bounds, cap: u32) -> Self {
        let respawn_points = respawn_points(bounds);
        // The rotation starts just past the first point, so the centre goes first.
        let cursor = 1 % respawn_points.len().max(1);
        Self {
            respawn_points,
            cursor,
            spawned: 0,
            cap,
            tanks: Vec::new(),
        }
    }

    pub fn respawn_points(&self) -> &[Coordinate] {
        &self.respawn_points
    }

    pub fn tanks(&self) -> &[Tank] {
        &self.tanks
    }

    pub fn len(&self) -> usize {
        self.tanks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tanks.is_empty()
    }

    pub fn spawned(&self) -> u32 {
        self.spawned
    }

    pub fn cap(&self) -> u32 {
        self.cap
    }

    /// True once the lifetime cap has been hit.
    pub fn is_exhausted(&self) -> bool {
        self.spawned >= self.cap
    }

    /// Element ids of the live tanks, for iterating while the roster changes.
    pub fn snapshot(&self) -> Vec<ElementId> {
        self.tanks.iter().map(|t| t.element_id).collect()
    }

    pub fn get_mut(&mut self, id: ElementId) -> Option<&mut Tank> {
        self.tanks.iter_mut().find(|t| t.element_id == id)
    }

    /// Places one enemy at the next free respawn point, cycling left to right from the centre.
    pub fn spawn(&mut self, grid: &mut Grid) -> SpawnOutcome {
        if self.is_exhausted() {
            return SpawnOutcome::CapReached;
        }

        let count = self.respawn_points.len();
        for offset in 0..count {
            let index = (self.cursor + offset) % count;
            let point = self.respawn_points[index];
            let Ok(element) = grid.insert(Material::EnemyTank, point) else {
                continue;
            };

            self.cursor = (index + 1) % count;
            self.spawned += 1;
            self.tanks.push(Tank::new(element.id, Direction::Down, Faction::Enemy));
            return SpawnOutcome::Spawned(element);
        }

        SpawnOutcome::AllPointsBusy
    }

    /// Drops the tank at `index` from the roster. Negative or stale indices are ignored.
    pub fn remove_tank(&mut self, index: isize) -> Option<Tank> {
        let index = usize::try_from(index).ok()?;
        (index < self.tanks.len()).then(|| self.tanks.remove(index))
    }

    pub fn remove_by_element(&mut self, id: ElementId) -> Option<Tank> {
        let index = self.tanks.iter().position(|t| t.element_id == id)?;
        Some(self.tanks.remove(index))
    }

    pub fn clear(&mut self) {
        self.tanks.clear();
    }
}

// Top-row spawn anchors: left edge, centre, right edge.
fn respawn_points(bounds: Bounds) -> Vec<Coordinate> {
    let cell = bounds.cell_size;
    let tank_width = Material::EnemyTank.width_cells() * cell;
    let columns = bounds.columns();

    let candidates = [
        0,
        (columns - columns % 2) * cell / 2 - tank_width,
        columns * cell - tank_width,
    ];

    let mut points: Vec<Coordinate> = Vec::with_capacity(candidates.len());
    for left in candidates {
        let point = Coordinate::new(0, left.max(0));
        let fits = bounds.contains(&Material::EnemyTank.footprint(point, cell));
        if fits && !points.contains(&point) {
            points.push(point);
        }
    }
    points
}
