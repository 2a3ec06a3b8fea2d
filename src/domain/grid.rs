// Grid model: the authoritative list of placed elements and occupancy queries.

use crate::domain::geometry::{Bounds, Coordinate, Rect};
use crate::domain::material::Material;
use std::fmt;

/// Stable identity of a placed element; survives moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(pub u64);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub id: ElementId,
    pub material: Material,
    pub coordinate: Coordinate,
}

impl Element {
    pub const fn footprint(&self, cell_size: i32) -> Rect {
        self.material.footprint(self.coordinate, cell_size)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridError {
    /// Anchor is not a multiple of the cell size.
    Unaligned,
    /// Footprint leaves the container.
    OutOfBounds,
    /// Footprint overlaps another non-passable element.
    Occupied,
    /// Erase at an anchor that holds no terrain.
    NothingPlaced,
}

impl fmt::Display for GridError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GridError::Unaligned => write!(f, "coordinate is not aligned to the grid"),
            GridError::OutOfBounds => write!(f, "element does not fit inside the container"),
            GridError::Occupied => write!(f, "cells are occupied by a solid element"),
            GridError::NothingPlaced => write!(f, "nothing to erase at this coordinate"),
        }
    }
}

impl std::error::Error for GridError {}

/// Result of an editor-style placement.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Placement {
    /// Newly inserted element; `None` when erasing.
    pub placed: Option<Element>,
    /// Elements anchored at the same coordinate that were dropped.
    pub replaced: Vec<Element>,
}

#[derive(Debug, Clone)]
pub struct Grid {
    bounds: Bounds,
    elements: Vec<Element>,
    next_id: u64,
}

impl Grid {
    pub fn new(bounds: Bounds) -> Self {
        Self {
            bounds,
            elements: Vec::new(),
            next_id: 1,
        }
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn cell_size(&self) -> i32 {
        self.bounds.cell_size
    }

    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn get(&self, id: ElementId) -> Option<&Element> {
        self.elements.iter().find(|e| e.id == id)
    }

    /// Editor placement: overlays `material` at `coordinate`.
    ///
    /// Terrain anchored at the same coordinate is replaced; placing [`Material::Empty`]
    /// only erases. Tanks and the eagle are never replaced, they count as occupants.
    pub fn place(
        &mut self,
        material: Material,
        coordinate: Coordinate,
    ) -> Result<Placement, GridError> {
        self.check_anchor(material, coordinate)?;

        let replaceable = |e: &Element| e.coordinate == coordinate && e.material.is_editable();

        if material == Material::Empty {
            let pinned = self
                .elements
                .iter()
                .any(|e| e.coordinate == coordinate && !e.material.is_editable());
            if pinned {
                return Err(GridError::Occupied);
            }
        } else {
            let footprint = material.footprint(coordinate, self.cell_size());
            let blocked = self
                .query(footprint)
                .into_iter()
                .any(|other| !replaceable(other) && collides(material, other.material));
            if blocked {
                return Err(GridError::Occupied);
            }
        }

        let mut replaced = Vec::new();
        self.elements.retain(|e| {
            if replaceable(e) {
                replaced.push(e.clone());
                false
            } else {
                true
            }
        });
        if material == Material::Empty && replaced.is_empty() {
            return Err(GridError::NothingPlaced);
        }

        let placed = (material != Material::Empty).then(|| self.push(material, coordinate));
        Ok(Placement { placed, replaced })
    }

    /// Strict insertion used for actors and level seeding: never replaces anything.
    pub fn insert(
        &mut self,
        material: Material,
        coordinate: Coordinate,
    ) -> Result<Element, GridError> {
        self.check_anchor(material, coordinate)?;
        if !self.is_free_for(material, coordinate, None) {
            return Err(GridError::Occupied);
        }
        Ok(self.push(material, coordinate))
    }

    /// Elements whose footprint intersects `area`. Order is unspecified.
    pub fn query(&self, area: Rect) -> Vec<&Element> {
        let cell_size = self.cell_size();
        self.elements
            .iter()
            .filter(|e| e.footprint(cell_size).intersects(&area))
            .collect()
    }

    /// True when `material` at `coordinate` overlaps no colliding element except `ignore`.
    pub fn is_free_for(
        &self,
        material: Material,
        coordinate: Coordinate,
        ignore: Option<ElementId>,
    ) -> bool {
        let footprint = material.footprint(coordinate, self.cell_size());
        self.query(footprint)
            .into_iter()
            .filter(|other| Some(other.id) != ignore)
            .all(|other| !collides(material, other.material))
    }

    /// Deletes by identity. Unknown ids are a no-op.
    pub fn remove(&mut self, id: ElementId) -> Option<Element> {
        let index = self.elements.iter().position(|e| e.id == id)?;
        Some(self.elements.remove(index))
    }

    /// Re-anchors an element in place, keeping its identity.
    pub(crate) fn move_to(&mut self, id: ElementId, coordinate: Coordinate) -> bool {
        match self.elements.iter_mut().find(|e| e.id == id) {
            Some(element) => {
                element.coordinate = coordinate;
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self) {
        self.elements.clear();
    }

    fn check_anchor(&self, material: Material, coordinate: Coordinate) -> Result<(), GridError> {
        if !coordinate.is_aligned(self.cell_size()) {
            return Err(GridError::Unaligned);
        }
        let footprint = material.footprint(coordinate, self.cell_size());
        let anchor_inside = coordinate.top >= 0
            && coordinate.left >= 0
            && coordinate.top < self.bounds.height
            && coordinate.left < self.bounds.width;
        if !anchor_inside || !self.bounds.contains(&footprint) {
            return Err(GridError::OutOfBounds);
        }
        Ok(())
    }

    fn push(&mut self, material: Material, coordinate: Coordinate) -> Element {
        let element = Element {
            id: ElementId(self.next_id),
            material,
            coordinate,
        };
        self.next_id = self.next_id.wrapping_add(1);
        self.elements.push(element.clone());
        element
    }
}

// Two solids cannot share a cell; passable materials overlay anything.
fn collides(a: Material, b: Material) -> bool {
    !a.tank_can_pass() && !b.tank_can_pass()
}
