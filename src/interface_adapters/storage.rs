// Level storage adapters: a JSON file on disk and an in-memory table.

use crate::domain::{Element, LevelEntry, LevelStorage, StorageError};
use crate::interface_adapters::protocol::LevelEntryDto;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};
use tracing::{debug, info};

/// Stores the level as a JSON array of `{material, top, left}` entries.
#[derive(Debug, Clone)]
pub struct JsonFileStorage {
    path: PathBuf,
}

impl JsonFileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl LevelStorage for JsonFileStorage {
    fn load(&self) -> Result<Vec<LevelEntry>, StorageError> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                // Nothing saved yet: start from an empty level.
                info!(path = %self.path.display(), "no saved level; starting empty");
                return Ok(Vec::new());
            }
            Err(err) => return Err(err.into()),
        };
        if raw.trim().is_empty() {
            return Ok(Vec::new());
        }

        let entries: Vec<LevelEntryDto> =
            serde_json::from_str(&raw).map_err(|e| StorageError::Format(e.to_string()))?;
        debug!(path = %self.path.display(), entries = entries.len(), "level read");
        Ok(entries.into_iter().map(LevelEntry::from).collect())
    }

    fn save(&self, elements: &[Element]) -> Result<(), StorageError> {
        let entries: Vec<LevelEntryDto> = elements.iter().map(LevelEntryDto::from).collect();
        let raw = serde_json::to_string_pretty(&entries)
            .map_err(|e| StorageError::Format(e.to_string()))?;
        std::fs::write(&self.path, raw)?;
        Ok(())
    }
}

/// Keeps the level in process memory; used when no file path is configured.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<Vec<LevelEntry>>,
}

impl MemoryStorage {
    pub fn new(entries: Vec<LevelEntry>) -> Self {
        Self {
            entries: Mutex::new(entries),
        }
    }
}

impl LevelStorage for MemoryStorage {
    fn load(&self) -> Result<Vec<LevelEntry>, StorageError> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.clone())
    }

    fn save(&self, elements: &[Element]) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        *entries = elements.iter().map(LevelEntry::from).collect();
        Ok(())
    }
}
