//! Outbound audio requests. The engine only names a cue; synthesis belongs to
//! whatever backend implements `AudioCueDispatcher`.

use super::judgment::Tier;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AudioCue {
    Perfect,
    Good,
    Ok,
    Miss,
    LevelUp,
    Beat,
    ComboMilestone,
    GameOver,
}

impl From<Tier> for AudioCue {
    fn from(tier: Tier) -> Self {
        match tier {
            Tier::Perfect => AudioCue::Perfect,
            Tier::Good => AudioCue::Good,
            Tier::Ok => AudioCue::Ok,
            Tier::Miss => AudioCue::Miss,
        }
    }
}

/// Fire-and-forget cue sink. Implementations must not block and must swallow
/// their own failures; an unavailable backend simply plays nothing.
pub trait AudioCueDispatcher {
    fn play(&mut self, cue: AudioCue);

    /// Free the backend. Called once when the engine is closed.
    fn release(&mut self) {}
}

/// Backend that plays nothing.
#[derive(Clone, Copy, Debug, Default)]
pub struct SilentCues;

impl AudioCueDispatcher for SilentCues {
    fn play(&mut self, _cue: AudioCue) {}
}

/// Keeps every requested cue in order; handy for tests and replays.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RecordingCues {
    pub cues: Vec<AudioCue>,
    pub released: bool,
}

impl RecordingCues {
    pub fn count(&self, cue: AudioCue) -> usize {
        self.cues.iter().filter(|c| **c == cue).count()
    }
}

impl AudioCueDispatcher for RecordingCues {
    fn play(&mut self, cue: AudioCue) {
        if !self.released {
            self.cues.push(cue);
        }
    }

    fn release(&mut self) {
        self.released = true;
    }
}
