//! Per-session engine object. Everything a frame needs flows through explicit
//! calls: the host drives `tick`, forwards player input to `hit`, and reads
//! `snapshot` to draw.

use log::{debug, info, warn};

use super::audio::{AudioCue, AudioCueDispatcher, SilentCues};
use super::clock::{SimulationClock, frame_delta};
use super::config::EngineConfig;
use super::error::EngineError;
use super::judgment::{HitOutcome, JudgmentEngine, JudgmentResult};
use super::notes::{Note, NoteId, NoteRegistry};
use super::progression::{Difficulty, JudgmentStats, Phase, Progress, ProgressionController, ProgressionState};
use super::scheduler::PatternScheduler;
use super::timer::{BeatTimer, TimerToken};
use super::tracks::{Track, TrackLibrary};

/// What happened during one `tick`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TickReport {
    pub spawned: Vec<NoteId>,
    pub misses: Vec<JudgmentResult>,
    pub level_ups: u32,
}

/// Drawing data for one live note.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct NoteView {
    pub id: NoteId,
    pub position_y: f64,
    pub target_y: f64,
    pub resolved: bool,
}

impl From<&Note> for NoteView {
    fn from(note: &Note) -> Self {
        Self {
            id: note.id,
            position_y: note.position_y,
            target_y: note.target_y,
            resolved: note.is_resolved(),
        }
    }
}

/// Read-only view of the session for the rendering layer.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Snapshot {
    pub score: u64,
    pub combo: u32,
    pub max_combo: u32,
    pub lives: u32,
    pub level: u32,
    pub phase: Phase,
    pub stats: JudgmentStats,
    pub track_id: &'static str,
    pub track_name: &'static str,
    pub accent_color: &'static str,
    pub note_speed: f64,
    pub beat_interval_ms: f64,
    pub elapsed_ms: f64,
    pub notes: Vec<NoteView>,
}

pub struct Engine<A: AudioCueDispatcher = SilentCues> {
    config: EngineConfig,
    library: TrackLibrary,
    track: Track,
    clock: SimulationClock,
    scheduler: PatternScheduler,
    notes: NoteRegistry,
    judge: JudgmentEngine,
    progression: ProgressionController,
    beat_timer: BeatTimer,
    /// `None` once the engine has been closed.
    audio: Option<A>,
}

impl Engine<SilentCues> {
    pub fn silent() -> Self {
        Self::new(SilentCues)
    }
}

impl<A: AudioCueDispatcher> Engine<A> {
    /// Engine with default tuning and the built-in catalogue.
    pub fn new(audio: A) -> Self {
        let config = EngineConfig::default();
        let library = TrackLibrary::builtin();
        Self::assemble(config, library, audio)
    }

    pub fn with_config(config: EngineConfig, library: TrackLibrary, audio: A) -> Result<Self, EngineError> {
        config.validate()?;
        Ok(Self::assemble(config, library, audio))
    }

    fn assemble(config: EngineConfig, library: TrackLibrary, audio: A) -> Self {
        let track = *library.first();
        Self {
            clock: SimulationClock::new(),
            scheduler: PatternScheduler::new(),
            notes: NoteRegistry::new(config.target_y),
            judge: JudgmentEngine::new(&config),
            progression: ProgressionController::new(&config),
            beat_timer: BeatTimer::default(),
            audio: Some(audio),
            track,
            library,
            config,
        }
    }

    // --- Accessors ----------------------------------------------------------

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn tracks(&self) -> &[Track] {
        self.library.tracks()
    }

    pub fn selected_track(&self) -> &Track {
        &self.track
    }

    pub fn phase(&self) -> Phase {
        self.progression.phase()
    }

    pub fn state(&self) -> &ProgressionState {
        self.progression.state()
    }

    pub fn difficulty(&self) -> Difficulty {
        self.progression.difficulty()
    }

    pub fn notes(&self) -> &[Note] {
        self.notes.notes()
    }

    pub fn elapsed_ms(&self) -> f64 {
        self.clock.elapsed_ms()
    }

    /// The audio backend, `None` after `close`.
    pub fn audio(&self) -> Option<&A> {
        self.audio.as_ref()
    }

    /// Token and cadence the host's periodic beat callback should run with,
    /// `None` whenever the session is not playing.
    pub fn beat_timer(&self) -> Option<(TimerToken, f64)> {
        self.beat_timer.current()
    }

    pub fn snapshot(&self) -> Snapshot {
        let st = self.progression.state();
        let difficulty = self.progression.difficulty();
        Snapshot {
            score: st.score,
            combo: st.combo,
            max_combo: st.max_combo,
            lives: st.lives,
            level: st.level,
            phase: st.phase,
            stats: st.stats,
            track_id: self.track.id,
            track_name: self.track.name,
            accent_color: self.track.accent_color,
            note_speed: difficulty.note_speed,
            beat_interval_ms: difficulty.beat_interval_ms,
            elapsed_ms: self.clock.elapsed_ms(),
            notes: self.notes.notes().iter().map(NoteView::from).collect(),
        }
    }

    // --- Session control ----------------------------------------------------

    /// Choose the track for the next session. Only allowed from the menu.
    pub fn select_track(&mut self, track_id: &str) -> Result<(), EngineError> {
        let phase = self.phase();
        if phase != Phase::Menu {
            return Err(self.rejected(EngineError::InvalidPhase { op: "select track", phase }));
        }
        let Some(track) = self.library.get(track_id) else {
            return Err(self.rejected(EngineError::UnknownTrack(track_id.to_string())));
        };
        self.track = *track;
        info!("selected track '{}' ({} bpm)", track.name, track.bpm);
        Ok(())
    }

    pub fn start(&mut self) -> Result<(), EngineError> {
        let interval = self.track.beat_interval_ms();
        self.progression.start(interval).map_err(|e| self.rejected(e))?;
        self.reset_session();
        Ok(())
    }

    pub fn restart(&mut self) -> Result<(), EngineError> {
        let interval = self.track.beat_interval_ms();
        self.progression.restart(interval).map_err(|e| self.rejected(e))?;
        self.reset_session();
        Ok(())
    }

    fn reset_session(&mut self) {
        self.clock.reset();
        self.scheduler.reset();
        self.notes.clear();
        self.beat_timer.arm(self.progression.difficulty().beat_interval_ms);
        info!("playing '{}'", self.track.name);
    }

    /// Freeze the session. Everything is kept for an exact resume.
    pub fn pause(&mut self) -> Result<(), EngineError> {
        self.progression.pause().map_err(|e| self.rejected(e))?;
        self.beat_timer.cancel();
        Ok(())
    }

    pub fn resume(&mut self) -> Result<(), EngineError> {
        self.progression.resume().map_err(|e| self.rejected(e))?;
        self.beat_timer.arm(self.progression.difficulty().beat_interval_ms);
        Ok(())
    }

    /// End the session and return to track selection.
    pub fn menu(&mut self) -> Result<(), EngineError> {
        let phase = self.phase();
        if phase == Phase::Menu {
            return Err(self.rejected(EngineError::InvalidPhase { op: "return to menu", phase }));
        }
        self.teardown();
        Ok(())
    }

    /// Tear the session down and release the audio backend. Cues requested
    /// afterwards are dropped. Safe to call repeatedly.
    pub fn close(&mut self) {
        self.teardown();
        if let Some(mut audio) = self.audio.take() {
            audio.release();
            info!("audio released");
        }
    }

    fn teardown(&mut self) {
        self.beat_timer.cancel();
        self.notes.clear();
        self.clock.reset();
        self.scheduler.reset();
        self.progression.end_session();
    }

    fn rejected(&self, err: EngineError) -> EngineError {
        warn!("rejected: {err}");
        err
    }

    // --- Frame + input ------------------------------------------------------

    /// Advance the simulation by one frame. Does nothing unless playing.
    pub fn tick(&mut self, delta_ms: f64) -> TickReport {
        let mut report = TickReport::default();
        if self.phase() != Phase::Playing {
            return report;
        }
        let delta_ms = frame_delta(delta_ms);
        let elapsed = self.clock.advance(delta_ms);
        let difficulty = self.progression.difficulty();

        let expired = self.notes.advance(delta_ms, self.config.frame_ms);

        for crossing in self.scheduler.poll(elapsed, &self.track, difficulty.beat_interval_ms) {
            if crossing.spawn {
                let id = self.notes.spawn(self.clock.ticks(), difficulty.note_speed);
                report.spawned.push(id);
            }
        }

        for note in &expired {
            if self.phase() != Phase::Playing {
                break;
            }
            let result = self.judge.expire(note);
            let progress = self.progression.apply_miss(&result);
            debug!("note {} missed", note.id.0);
            self.cue(AudioCue::Miss);
            report.level_ups += self.after_progress(progress);
            report.misses.push(result);
        }
        report
    }

    /// Player hit (key press or tap).
    pub fn hit(&mut self) -> HitOutcome {
        if self.phase() != Phase::Playing {
            return HitOutcome::Ignored;
        }
        let combo = self.progression.state().combo;
        let outcome = self.judge.judge_hit(&mut self.notes, combo);
        match &outcome {
            HitOutcome::Judged(result) => {
                let progress = self.progression.apply_judgment(result);
                self.cue(result.tier.into());
                self.after_progress(progress);
            }
            HitOutcome::Whiff => self.progression.apply_whiff(),
            HitOutcome::Ignored => {}
        }
        outcome
    }

    /// Periodic background-beat callback from the host. Plays the beat cue
    /// only for the currently armed timer; stale tokens are ignored.
    pub fn on_beat_timer(&mut self, token: TimerToken) -> bool {
        if self.phase() != Phase::Playing || !self.beat_timer.is_current(token) {
            return false;
        }
        self.cue(AudioCue::Beat);
        true
    }

    fn after_progress(&mut self, progress: Progress) -> u32 {
        if progress.combo_milestone {
            self.cue(AudioCue::ComboMilestone);
        }
        if progress.level_ups > 0 {
            self.cue(AudioCue::LevelUp);
            if self.phase() == Phase::Playing {
                self.beat_timer.arm(self.progression.difficulty().beat_interval_ms);
            }
        }
        if progress.game_over {
            self.beat_timer.cancel();
            self.cue(AudioCue::GameOver);
        }
        progress.level_ups
    }

    fn cue(&mut self, cue: AudioCue) {
        if let Some(audio) = self.audio.as_mut() {
            audio.play(cue);
        }
    }
}
