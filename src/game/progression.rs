//! Score, combo, lives, level and the session phase machine.
//!
//! ```text
//! Menu --start--> Playing <--pause/resume--> Paused
//!                    |
//!              lives reach 0
//!                    v
//!                GameOver --restart--> Playing
//!                    |
//!                  menu --> Menu
//! ```

use log::info;

use super::config::EngineConfig;
use super::error::EngineError;
use super::judgment::{JudgmentResult, Tier};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Phase {
    Menu,
    Playing,
    Paused,
    GameOver,
}

/// Per-tier counters for the results screen.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct JudgmentStats {
    pub perfect: u32,
    pub good: u32,
    pub ok: u32,
    pub miss: u32,
    pub whiff: u32,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ProgressionState {
    pub score: u64,
    pub combo: u32,
    pub max_combo: u32,
    pub lives: u32,
    pub level: u32,
    pub phase: Phase,
    pub stats: JudgmentStats,
}

impl ProgressionState {
    fn fresh(lives: u32, phase: Phase) -> Self {
        Self {
            score: 0,
            combo: 0,
            max_combo: 0,
            lives,
            level: 1,
            phase,
            stats: JudgmentStats::default(),
        }
    }
}

/// Global difficulty knobs scaled on every level-up.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Difficulty {
    pub note_speed: f64,
    pub beat_interval_ms: f64,
}

/// Side effects of applying a judgment, for cue dispatch.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Progress {
    pub level_ups: u32,
    pub combo_milestone: bool,
    pub game_over: bool,
}

#[derive(Clone, Debug)]
pub struct ProgressionController {
    state: ProgressionState,
    difficulty: Difficulty,
    starting_lives: u32,
    base_speed: f64,
    level_score_step: u64,
    speed_increment: f64,
    interval_decrement_ms: f64,
    min_beat_interval_ms: f64,
    combo_milestone: u32,
}

impl ProgressionController {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            state: ProgressionState::fresh(config.starting_lives, Phase::Menu),
            difficulty: Difficulty {
                note_speed: config.base_speed,
                beat_interval_ms: 0.0,
            },
            starting_lives: config.starting_lives,
            base_speed: config.base_speed,
            level_score_step: config.level_score_step,
            speed_increment: config.speed_increment,
            interval_decrement_ms: config.interval_decrement_ms,
            min_beat_interval_ms: config.min_beat_interval_ms,
            combo_milestone: config.combo_milestone,
        }
    }

    pub fn state(&self) -> &ProgressionState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    // --- Phase machine ------------------------------------------------------

    fn require(&self, op: &'static str, allowed: &[Phase]) -> Result<(), EngineError> {
        if allowed.contains(&self.state.phase) {
            Ok(())
        } else {
            Err(EngineError::InvalidPhase {
                op,
                phase: self.state.phase,
            })
        }
    }

    pub fn start(&mut self, beat_interval_ms: f64) -> Result<(), EngineError> {
        self.require("start", &[Phase::Menu])?;
        self.fresh_session(beat_interval_ms);
        Ok(())
    }

    /// Accepted from any in-session phase, including `GameOver`.
    pub fn restart(&mut self, beat_interval_ms: f64) -> Result<(), EngineError> {
        self.require("restart", &[Phase::Playing, Phase::Paused, Phase::GameOver])?;
        self.fresh_session(beat_interval_ms);
        Ok(())
    }

    fn fresh_session(&mut self, beat_interval_ms: f64) {
        self.state = ProgressionState::fresh(self.starting_lives, Phase::Playing);
        self.difficulty = Difficulty {
            note_speed: self.base_speed,
            beat_interval_ms,
        };
        info!("session started, beat interval {beat_interval_ms:.1}ms");
    }

    pub fn pause(&mut self) -> Result<(), EngineError> {
        self.require("pause", &[Phase::Playing])?;
        self.state.phase = Phase::Paused;
        info!("paused");
        Ok(())
    }

    pub fn resume(&mut self) -> Result<(), EngineError> {
        self.require("resume", &[Phase::Paused])?;
        self.state.phase = Phase::Playing;
        info!("resumed");
        Ok(())
    }

    /// Drop the session and go back to the menu.
    pub fn end_session(&mut self) {
        if self.state.phase != Phase::Menu {
            info!(
                "session ended: score {} max combo {} level {}",
                self.state.score, self.state.max_combo, self.state.level
            );
        }
        self.state = ProgressionState::fresh(self.starting_lives, Phase::Menu);
        self.difficulty.note_speed = self.base_speed;
    }

    // --- Scoring ------------------------------------------------------------

    /// Apply a hit judgment. No-op outside `Playing`.
    pub fn apply_judgment(&mut self, result: &JudgmentResult) -> Progress {
        let mut progress = Progress::default();
        if self.state.phase != Phase::Playing {
            return progress;
        }
        let st = &mut self.state;
        match result.tier {
            Tier::Perfect => st.stats.perfect += 1,
            Tier::Good => st.stats.good += 1,
            Tier::Ok => st.stats.ok += 1,
            Tier::Miss => st.stats.miss += 1,
        }
        st.score += result.score_delta;
        if result.tier.keeps_combo() {
            st.combo += 1;
            st.max_combo = st.max_combo.max(st.combo);
            progress.combo_milestone =
                self.combo_milestone > 0 && st.combo % self.combo_milestone == 0;
        } else {
            st.combo = 0;
        }
        while self.state.score > self.state.level as u64 * self.level_score_step {
            self.state.level += 1;
            self.scale_difficulty();
            progress.level_ups += 1;
        }
        progress
    }

    /// A hit with no candidate: the combo breaks, nothing else changes.
    pub fn apply_whiff(&mut self) {
        if self.state.phase != Phase::Playing {
            return;
        }
        self.state.combo = 0;
        self.state.stats.whiff += 1;
    }

    /// A note expired unresolved: judgment bookkeeping plus one life.
    pub fn apply_miss(&mut self, result: &JudgmentResult) -> Progress {
        if self.state.phase != Phase::Playing {
            return Progress::default();
        }
        let mut progress = self.apply_judgment(result);
        self.state.lives = self.state.lives.saturating_sub(1);
        if self.state.lives == 0 {
            self.state.phase = Phase::GameOver;
            progress.game_over = true;
            info!(
                "game over: score {} max combo {} level {}",
                self.state.score, self.state.max_combo, self.state.level
            );
        }
        progress
    }

    /// Faster notes and a shorter beat interval, never below the floor. A track
    /// that already beats faster than the floor keeps its interval.
    pub fn scale_difficulty(&mut self) {
        self.difficulty.note_speed += self.speed_increment;
        let interval = self.difficulty.beat_interval_ms;
        if interval > self.min_beat_interval_ms {
            self.difficulty.beat_interval_ms =
                (interval - self.interval_decrement_ms).max(self.min_beat_interval_ms);
        }
        info!(
            "level {}: speed {:.2}, beat interval {:.1}ms",
            self.state.level, self.difficulty.note_speed, self.difficulty.beat_interval_ms
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::notes::NoteId;

    fn playing() -> ProgressionController {
        let mut p = ProgressionController::new(&EngineConfig::default());
        p.start(500.0).unwrap();
        p
    }

    fn result(tier: Tier, score_delta: u64) -> JudgmentResult {
        JudgmentResult {
            note: NoteId(0),
            tier,
            distance: 0.0,
            score_delta,
        }
    }

    #[test]
    fn starts_in_menu() {
        let p = ProgressionController::new(&EngineConfig::default());
        assert_eq!(p.phase(), Phase::Menu);
        assert_eq!(p.state().lives, 3);
        assert_eq!(p.state().level, 1);
    }

    #[test]
    fn phase_guards() {
        let mut p = ProgressionController::new(&EngineConfig::default());
        assert!(p.pause().is_err());
        assert!(p.restart(500.0).is_err());
        p.start(500.0).unwrap();
        assert!(p.start(500.0).is_err());
        assert!(p.resume().is_err());
        p.pause().unwrap();
        assert_eq!(p.phase(), Phase::Paused);
        p.resume().unwrap();
        assert_eq!(p.phase(), Phase::Playing);
    }

    #[test]
    fn combo_tracks_max_and_resets_on_ok() {
        let mut p = playing();
        p.apply_judgment(&result(Tier::Perfect, 100));
        p.apply_judgment(&result(Tier::Good, 100));
        assert_eq!(p.state().combo, 2);
        p.apply_judgment(&result(Tier::Ok, 25));
        assert_eq!(p.state().combo, 0);
        assert_eq!(p.state().max_combo, 2);
        assert_eq!(p.state().score, 225);
        p.apply_whiff();
        assert_eq!(p.state().max_combo, 2);
        assert_eq!(p.state().stats.whiff, 1);
    }

    #[test]
    fn tenth_combo_is_a_milestone() {
        let mut p = playing();
        for i in 1..=10 {
            let progress = p.apply_judgment(&result(Tier::Good, 0));
            assert_eq!(progress.combo_milestone, i == 10);
        }
    }

    #[test]
    fn level_up_fires_once_per_threshold() {
        let mut p = playing();
        assert_eq!(p.apply_judgment(&result(Tier::Perfect, 1000)).level_ups, 0);
        let up = p.apply_judgment(&result(Tier::Perfect, 1));
        assert_eq!(up.level_ups, 1);
        assert_eq!(p.state().level, 2);
        assert!((p.difficulty().note_speed - 3.2).abs() < 1e-9);
        assert_eq!(p.difficulty().beat_interval_ms, 490.0);
        assert_eq!(p.apply_judgment(&result(Tier::Perfect, 10)).level_ups, 0);
        assert_eq!(p.state().level, 2);
    }

    #[test]
    fn large_jump_crosses_several_levels() {
        let mut p = playing();
        let up = p.apply_judgment(&result(Tier::Perfect, 3500));
        assert_eq!(up.level_ups, 3);
        assert_eq!(p.state().level, 4);
        assert_eq!(p.difficulty().beat_interval_ms, 470.0);
    }

    #[test]
    fn beat_interval_respects_floor() {
        let mut p = ProgressionController::new(&EngineConfig::default());
        p.start(205.0).unwrap();
        p.scale_difficulty();
        assert_eq!(p.difficulty().beat_interval_ms, 200.0);
        p.scale_difficulty();
        assert_eq!(p.difficulty().beat_interval_ms, 200.0);
    }

    #[test]
    fn interval_below_floor_is_never_raised() {
        let mut p = ProgressionController::new(&EngineConfig::default());
        // 400 bpm
        p.start(150.0).unwrap();
        let before = p.difficulty();
        p.scale_difficulty();
        let after = p.difficulty();
        assert_eq!(after.beat_interval_ms, 150.0);
        assert!(after.note_speed > before.note_speed);
    }

    #[test]
    fn misses_cost_lives_until_game_over() {
        let mut p = playing();
        p.apply_judgment(&result(Tier::Perfect, 100));
        assert!(!p.apply_miss(&result(Tier::Miss, 0)).game_over);
        assert_eq!(p.state().combo, 0);
        assert!(!p.apply_miss(&result(Tier::Miss, 0)).game_over);
        assert!(p.apply_miss(&result(Tier::Miss, 0)).game_over);
        assert_eq!(p.state().lives, 0);
        assert_eq!(p.phase(), Phase::GameOver);
        assert_eq!(p.apply_miss(&result(Tier::Miss, 0)), Progress::default());
        assert_eq!(p.state().lives, 0);
        assert_eq!(p.state().stats.miss, 3);
    }

    #[test]
    fn restart_from_game_over_is_fresh() {
        let mut p = playing();
        for _ in 0..3 {
            p.apply_miss(&result(Tier::Miss, 0));
        }
        p.restart(500.0).unwrap();
        assert_eq!(p.phase(), Phase::Playing);
        assert_eq!(p.state().lives, 3);
        assert_eq!(p.state().score, 0);
    }
}
