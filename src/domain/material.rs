// Terrain and actor kinds with their footprint and passability profile.

use crate::domain::geometry::{Coordinate, Rect};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Material {
    /// Eraser used by the level editor; never stored in the grid.
    Empty,
    Brick,
    Concrete,
    Grass,
    Eagle,
    EnemyTank,
    PlayerTank,
}

impl Material {
    pub const fn width_cells(self) -> i32 {
        match self {
            Material::Empty => 0,
            Material::Brick | Material::Concrete | Material::Grass => 1,
            Material::Eagle => 4,
            Material::EnemyTank | Material::PlayerTank => 2,
        }
    }

    pub const fn height_cells(self) -> i32 {
        match self {
            Material::Empty => 0,
            Material::Brick | Material::Concrete | Material::Grass => 1,
            Material::Eagle => 3,
            Material::EnemyTank | Material::PlayerTank => 2,
        }
    }

    /// Whether a tank may share cells with this material.
    pub const fn tank_can_pass(self) -> bool {
        matches!(self, Material::Empty | Material::Grass)
    }

    /// Whether a bullet flies over this material untouched.
    pub const fn bullet_can_pass(self) -> bool {
        matches!(self, Material::Empty | Material::Grass)
    }

    /// Whether a hostile bullet removes this material from the grid.
    pub const fn bullet_can_destroy(self) -> bool {
        matches!(
            self,
            Material::Brick | Material::EnemyTank | Material::PlayerTank
        )
    }

    pub const fn is_tank(self) -> bool {
        matches!(self, Material::EnemyTank | Material::PlayerTank)
    }

    /// Materials the level editor may paint.
    pub const fn is_editable(self) -> bool {
        matches!(
            self,
            Material::Empty | Material::Brick | Material::Concrete | Material::Grass
        )
    }

    /// Pixel rectangle covered when anchored at `origin`.
    pub const fn footprint(self, origin: Coordinate, cell_size: i32) -> Rect {
        Rect::new(
            origin,
            self.width_cells() * cell_size,
            self.height_cells() * cell_size,
        )
    }
}
