use crate::domain::geometry::Direction;
use crate::domain::grid::Grid;
use crate::domain::state::Tank;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    Moved,
    Blocked,
    OutOfBounds,
}

/// Advances `tank` one cell towards `direction` if the destination is free.
///
/// The tank always turns to face `direction`, even when it cannot advance.
pub fn try_move(grid: &mut Grid, tank: &mut Tank, direction: Direction) -> MoveOutcome {
    tank.direction = direction;

    // A tank whose element is gone (destroyed mid-pass) cannot go anywhere.
    let Some(element) = grid.get(tank.element_id) else {
        return MoveOutcome::Blocked;
    };
    let material = element.material;
    let cell_size = grid.cell_size();
    let candidate = element.coordinate.step(direction, cell_size);

    let footprint = material.footprint(candidate, cell_size);
    if !grid.bounds().contains(&footprint) {
        return MoveOutcome::OutOfBounds;
    }

    let blocked = grid
        .query(footprint)
        .into_iter()
        .any(|other| other.id != tank.element_id && !other.material.tank_can_pass());
    if blocked {
        return MoveOutcome::Blocked;
    }

    grid.move_to(tank.element_id, candidate);
    MoveOutcome::Moved
}
