//! Static track catalogue. Each built-in track lives in its own file; this
//! module unifies them behind `TrackLibrary`.

use super::error::EngineError;

mod track_lofi_drift;
mod track_midnight_groove;
mod track_neon_pulse;
mod track_thunder_drums;

pub use track_lofi_drift::LOFI_DRIFT;
pub use track_midnight_groove::MIDNIGHT_GROOVE;
pub use track_neon_pulse::NEON_PULSE;
pub use track_thunder_drums::THUNDER_DRUMS;

/// A playable track (immutable). `pattern` holds one 0/1 step per beat.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Track {
    pub id: &'static str,
    pub name: &'static str,
    pub genre: &'static str,
    pub bpm: u32,
    /// Opaque colour token handed to the renderer.
    pub accent_color: &'static str,
    pub pattern: &'static [u8],
}

impl Track {
    pub fn beat_interval_ms(&self) -> f64 {
        60_000.0 / self.bpm as f64
    }

    /// Whether the step at `beat_index` (wrapping) spawns a note.
    pub fn spawns_on(&self, beat_index: u64) -> bool {
        let len = self.pattern.len() as u64;
        len > 0 && self.pattern[(beat_index % len) as usize] == 1
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        let reason = if self.bpm == 0 {
            Some("bpm must be positive".to_string())
        } else if self.pattern.is_empty() {
            Some("pattern is empty".to_string())
        } else if let Some(bit) = self.pattern.iter().find(|b| **b > 1) {
            Some(format!("pattern step {bit} is not 0 or 1"))
        } else {
            None
        };
        match reason {
            Some(reason) => Err(EngineError::InvalidTrack {
                id: self.id.to_string(),
                reason,
            }),
            None => Ok(()),
        }
    }
}

pub static BUILTIN_TRACKS: [&Track; 4] = [&NEON_PULSE, &MIDNIGHT_GROOVE, &THUNDER_DRUMS, &LOFI_DRIFT];

/// Read-only catalogue shared with the scheduler.
#[derive(Clone, Debug)]
pub struct TrackLibrary {
    tracks: Vec<Track>,
}

impl Default for TrackLibrary {
    fn default() -> Self {
        Self::builtin()
    }
}

impl TrackLibrary {
    pub fn builtin() -> Self {
        Self {
            tracks: BUILTIN_TRACKS.iter().map(|t| **t).collect(),
        }
    }

    /// Build a custom catalogue. Every track is validated and ids must be unique.
    pub fn new(tracks: Vec<Track>) -> Result<Self, EngineError> {
        if tracks.is_empty() {
            return Err(EngineError::InvalidConfig("track catalogue is empty".into()));
        }
        for (i, track) in tracks.iter().enumerate() {
            track.validate()?;
            if tracks[..i].iter().any(|t| t.id == track.id) {
                return Err(EngineError::InvalidTrack {
                    id: track.id.to_string(),
                    reason: "duplicate id".into(),
                });
            }
        }
        Ok(Self { tracks })
    }

    pub fn get(&self, id: &str) -> Option<&Track> {
        self.tracks.iter().find(|t| t.id == id)
    }

    pub fn first(&self) -> &Track {
        &self.tracks[0]
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }
}
