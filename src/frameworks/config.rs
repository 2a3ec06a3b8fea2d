use crate::domain::{Bounds, CELL_SIZE};
use std::{env, path::PathBuf};

// Runtime/server constants (not gameplay tuning).

pub fn http_port() -> u16 {
    env::var("TANKS_HTTP_PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(3001)
}

pub fn grid_columns() -> i32 {
    positive_env("GRID_COLUMNS").unwrap_or(26)
}

pub fn grid_rows() -> i32 {
    positive_env("GRID_ROWS").unwrap_or(16)
}

/// Container size in pixels, derived from the cell counts.
pub fn grid_bounds() -> Bounds {
    Bounds::from_cells(grid_columns(), grid_rows(), CELL_SIZE)
}

/// Where the level editor saves to. An empty value keeps the level in memory only.
pub fn level_path() -> Option<PathBuf> {
    match env::var("LEVEL_PATH") {
        Ok(value) if value.trim().is_empty() => None,
        Ok(value) => Some(PathBuf::from(value)),
        Err(_) => Some(PathBuf::from("level.json")),
    }
}

fn positive_env(key: &str) -> Option<i32> {
    env::var(key)
        .ok()
        .and_then(|value| value.parse::<i32>().ok())
        .filter(|value| *value > 0)
}

pub const RENDER_BROADCAST_CAPACITY: usize = 256;
pub const RENDER_BYTES_CAPACITY: usize = 256;
