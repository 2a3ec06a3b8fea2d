// Audio adapter: sound cues become structured log lines for whatever player tails them.

use crate::domain::{AudioSink, SoundCue};
use tracing::{debug, info};

#[derive(Debug, Default, Clone, Copy)]
pub struct TracingAudio;

impl AudioSink for TracingAudio {
    fn play(&self, cue: SoundCue) {
        match cue {
            // Per-tick cues are noisy.
            SoundCue::TankMove | SoundCue::BulletShot | SoundCue::BulletBurst => {
                debug!(target: "audio", ?cue, "sound cue");
            }
            SoundCue::TankStop | SoundCue::Intro | SoundCue::PauseAll => {
                info!(target: "audio", ?cue, "sound cue");
            }
        }
    }
}
