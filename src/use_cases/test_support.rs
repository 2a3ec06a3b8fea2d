use std::sync::{Arc, Mutex};
use std::thread::ThreadId;

use crate::domain::events::SoundCue;
use crate::domain::geometry::{Bounds, CELL_SIZE};
use crate::domain::grid::Element;
use crate::domain::ports::{AudioSink, LevelEntry, LevelStorage, StorageError};
use crate::domain::tuning::{BulletTuning, EnemyTuning};
use crate::use_cases::game::GameSettings;

// Audio sink that remembers every cue, for asserting on sound side effects.
#[derive(Clone, Default)]
pub(crate) struct RecordingAudio {
    cues: Arc<Mutex<Vec<SoundCue>>>,
}

impl RecordingAudio {
    pub(crate) fn cues(&self) -> Vec<SoundCue> {
        self.cues.lock().expect("cues mutex poisoned").clone()
    }

    pub(crate) fn count(&self, cue: SoundCue) -> usize {
        self.cues().into_iter().filter(|c| *c == cue).count()
    }
}

impl AudioSink for RecordingAudio {
    fn play(&self, cue: SoundCue) {
        self.cues.lock().expect("cues mutex poisoned").push(cue);
    }
}

// Level storage that keeps entries in memory and remembers which threads called it.
#[derive(Clone, Default)]
pub(crate) struct StubStorage {
    level: Arc<Mutex<Vec<LevelEntry>>>,
    threads: Arc<Mutex<Vec<ThreadId>>>,
    fail: bool,
}

impl StubStorage {
    pub(crate) fn with_level(entries: Vec<LevelEntry>) -> Self {
        Self {
            level: Arc::new(Mutex::new(entries)),
            ..Self::default()
        }
    }

    pub(crate) fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub(crate) fn stored(&self) -> Vec<LevelEntry> {
        self.level.lock().expect("level mutex poisoned").clone()
    }

    pub(crate) fn threads(&self) -> Vec<ThreadId> {
        self.threads.lock().expect("threads mutex poisoned").clone()
    }

    fn record_thread(&self) {
        self.threads
            .lock()
            .expect("threads mutex poisoned")
            .push(std::thread::current().id());
    }
}

impl LevelStorage for StubStorage {
    fn load(&self) -> Result<Vec<LevelEntry>, StorageError> {
        self.record_thread();
        if self.fail {
            return Err(StorageError::Format("stub failure".to_string()));
        }
        Ok(self.stored())
    }

    fn save(&self, elements: &[Element]) -> Result<(), StorageError> {
        self.record_thread();
        if self.fail {
            return Err(StorageError::Format("stub failure".to_string()));
        }
        *self.level.lock().expect("level mutex poisoned") =
            elements.iter().map(LevelEntry::from).collect();
        Ok(())
    }
}

// Small deterministic session: enemies never fire and only move on request.
pub(crate) fn quiet_settings(max_spawns: u32) -> GameSettings {
    GameSettings {
        bounds: Bounds::from_cells(10, 10, CELL_SIZE),
        bullet: BulletTuning::default(),
        enemy: EnemyTuning {
            max_spawns,
            move_interval: std::time::Duration::from_secs(3600),
            fire_chance_percent: 0,
            ..EnemyTuning::default()
        },
        render_capacity: 256,
        rng_seed: Some(7),
    }
}
