//! Beat Master rhythm engine.
//!
//! A selected track's beat pattern becomes a stream of falling notes; player
//! hits are graded against the judgment line, and score/combo/lives/level
//! evolve from those grades. Each frame the host calls `Engine::tick`:
//! the clock advances, live notes move (overdue ones become misses), the
//! scheduler spawns notes for any beat crossed, and progression applies the
//! results and requests audio cues.

mod audio;
mod clock;
mod config;
mod engine;
mod error;
mod judgment;
mod notes;
mod progression;
mod scheduler;
mod timer;
pub mod tracks;

pub use audio::{AudioCue, AudioCueDispatcher, RecordingCues, SilentCues};
pub use clock::SimulationClock;
pub use config::EngineConfig;
pub use engine::{Engine, NoteView, Snapshot, TickReport};
pub use error::EngineError;
pub use judgment::{HitOutcome, JudgmentEngine, JudgmentResult, Tier};
pub use notes::{Note, NoteId, NoteRegistry};
pub use progression::{Difficulty, JudgmentStats, Phase, Progress, ProgressionController, ProgressionState};
pub use scheduler::{BeatCrossing, PatternScheduler};
pub use timer::{BeatTimer, TimerToken};
pub use tracks::{Track, TrackLibrary};
