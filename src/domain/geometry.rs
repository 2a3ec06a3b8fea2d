// Pixel-space coordinates, headings, and the container rectangle.

/// Side length of one grid cell in pixels.
pub const CELL_SIZE: i32 = 50;

/// Top-left anchor of an element or bullet, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Coordinate {
    pub top: i32,
    pub left: i32,
}

impl Coordinate {
    pub const fn new(top: i32, left: i32) -> Self {
        Self { top, left }
    }

    /// Coordinate of the cell at (`column`, `row`).
    pub const fn from_cell(column: i32, row: i32, cell_size: i32) -> Self {
        Self {
            top: row * cell_size,
            left: column * cell_size,
        }
    }

    pub fn is_aligned(self, cell_size: i32) -> bool {
        self.top % cell_size == 0 && self.left % cell_size == 0
    }

    /// Offset by `distance` pixels along `direction`.
    pub fn step(self, direction: Direction, distance: i32) -> Self {
        let (d_top, d_left) = direction.vector();
        Self {
            top: self.top + d_top * distance,
            left: self.left + d_left * distance,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Unit vector as (top, left); screen space grows downwards.
    pub const fn vector(self) -> (i32, i32) {
        match self {
            Direction::Up => (-1, 0),
            Direction::Down => (1, 0),
            Direction::Left => (0, -1),
            Direction::Right => (0, 1),
        }
    }
}

/// Axis-aligned rectangle in pixels. Edges are half-open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub top: i32,
    pub left: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub const fn new(origin: Coordinate, width: i32, height: i32) -> Self {
        Self {
            top: origin.top,
            left: origin.left,
            width,
            height,
        }
    }

    pub const fn bottom(&self) -> i32 {
        self.top + self.height
    }

    pub const fn right(&self) -> i32 {
        self.left + self.width
    }

    pub const fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        if self.is_empty() || other.is_empty() {
            return false;
        }
        self.left < other.right()
            && other.left < self.right()
            && self.top < other.bottom()
            && other.top < self.bottom()
    }
}

/// Size of the playfield container in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bounds {
    pub width: i32,
    pub height: i32,
    pub cell_size: i32,
}

impl Bounds {
    pub const fn from_cells(columns: i32, rows: i32, cell_size: i32) -> Self {
        Self {
            width: columns * cell_size,
            height: rows * cell_size,
            cell_size,
        }
    }

    pub const fn columns(&self) -> i32 {
        self.width / self.cell_size
    }

    pub const fn rows(&self) -> i32 {
        self.height / self.cell_size
    }

    /// True when `rect` lies fully inside the container.
    pub const fn contains(&self, rect: &Rect) -> bool {
        rect.top >= 0 && rect.left >= 0 && rect.bottom() <= self.height && rect.right() <= self.width
    }
}
