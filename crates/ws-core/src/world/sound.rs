//! Sound cues
//!
//! Fire-and-forget: the engine queues cues, the host plays and drains them.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoundCue {
    pub sound: String,
    pub volume: u8,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SoundQueue {
    pending: Vec<SoundCue>,
}

impl SoundQueue {
    pub fn play(&mut self, sound: &str, volume: u8) {
        self.pending.push(SoundCue {
            sound: sound.to_string(),
            volume,
        });
    }

    pub fn pending(&self) -> &[SoundCue] {
        &self.pending
    }

    pub fn drain(&mut self) -> Vec<SoundCue> {
        core::mem::take(&mut self.pending)
    }
}
