//! Browser bindings: the `BeatMaster` class JS drives, a Web Audio cue
//! backend, the background beat interval, and a console logger.
//! Nothing here runs on native builds; the engine itself is platform-free.

use std::cell::RefCell;
use std::rc::Rc;

use log::{Level, LevelFilter, Metadata, Record, debug, warn};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{AudioContext, OscillatorType, window};

use crate::game::{AudioCue, AudioCueDispatcher, Engine, HitOutcome, Phase, Tier, TimerToken};

// --- Logging ----------------------------------------------------------------

struct ConsoleLogger;

impl log::Log for ConsoleLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = JsValue::from_str(&format!("[beat-master {}] {}", record.level(), record.args()));
        match record.level() {
            Level::Error => web_sys::console::error_1(&line),
            Level::Warn => web_sys::console::warn_1(&line),
            Level::Info => web_sys::console::info_1(&line),
            Level::Debug | Level::Trace => web_sys::console::debug_1(&line),
        }
    }

    fn flush(&self) {}
}

static LOGGER: ConsoleLogger = ConsoleLogger;

pub(crate) fn init_logging() {
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(LevelFilter::Info);
    }
}

/// Change console verbosity at runtime ("error" .. "trace", or "off").
#[wasm_bindgen]
pub fn set_log_level(level: &str) -> bool {
    match level.parse::<LevelFilter>() {
        Ok(filter) => {
            log::set_max_level(filter);
            true
        }
        Err(_) => false,
    }
}

// --- Audio ------------------------------------------------------------------

/// Oscillator blips over Web Audio. If the browser refuses an `AudioContext`
/// (autoplay policy, no audio device) every cue is silently dropped.
pub struct WebAudioCues {
    ctx: Option<AudioContext>,
}

impl WebAudioCues {
    pub fn new() -> Self {
        let ctx = match AudioContext::new() {
            Ok(ctx) => Some(ctx),
            Err(e) => {
                warn!("audio unavailable: {e:?}");
                None
            }
        };
        Self { ctx }
    }

    fn voice(cue: AudioCue) -> (f32, f64, OscillatorType) {
        match cue {
            AudioCue::Perfect => (880.0, 0.12, OscillatorType::Sine),
            AudioCue::Good => (660.0, 0.10, OscillatorType::Sine),
            AudioCue::Ok => (440.0, 0.08, OscillatorType::Triangle),
            AudioCue::Miss => (150.0, 0.20, OscillatorType::Sawtooth),
            AudioCue::LevelUp => (1046.5, 0.30, OscillatorType::Square),
            AudioCue::Beat => (110.0, 0.05, OscillatorType::Sine),
            AudioCue::ComboMilestone => (1318.5, 0.15, OscillatorType::Triangle),
            AudioCue::GameOver => (98.0, 0.60, OscillatorType::Sawtooth),
        }
    }

    fn blip(ctx: &AudioContext, freq: f32, duration: f64, wave: OscillatorType) -> Result<(), JsValue> {
        let osc = ctx.create_oscillator()?;
        let gain = ctx.create_gain()?;
        osc.set_type(wave);
        osc.frequency().set_value(freq);
        let now = ctx.current_time();
        gain.gain().set_value_at_time(0.2, now)?;
        gain.gain().exponential_ramp_to_value_at_time(0.001, now + duration)?;
        osc.connect_with_audio_node(&gain)?;
        gain.connect_with_audio_node(&ctx.destination())?;
        osc.start()?;
        osc.stop_with_when(now + duration)?;
        Ok(())
    }
}

impl Default for WebAudioCues {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioCueDispatcher for WebAudioCues {
    fn play(&mut self, cue: AudioCue) {
        let Some(ctx) = self.ctx.as_ref() else {
            return;
        };
        let (freq, duration, wave) = Self::voice(cue);
        // Best effort; a failed blip must never reach gameplay.
        if let Err(e) = Self::blip(ctx, freq, duration, wave) {
            debug!("cue {cue:?} dropped: {e:?}");
        }
    }

    fn release(&mut self) {
        if let Some(ctx) = self.ctx.take() {
            if let Err(e) = ctx.close() {
                debug!("audio context close failed: {e:?}");
            }
        }
    }
}

// --- Beat interval ----------------------------------------------------------

/// A live `setInterval` bound to one beat-timer token. Dropping it clears
/// the interval.
struct IntervalHandle {
    id: i32,
    token: TimerToken,
    _callback: Closure<dyn FnMut()>,
}

impl Drop for IntervalHandle {
    fn drop(&mut self) {
        if let Some(w) = window() {
            w.clear_interval_with_handle(self.id);
        }
    }
}

// --- JS facade --------------------------------------------------------------

type SharedEngine = Rc<RefCell<Engine<WebAudioCues>>>;

/// One game session object. JS owns the frame loop: call `tick(16)` from
/// `requestAnimationFrame`, `hit()` on key press / tap, then read the getters.
#[wasm_bindgen]
pub struct BeatMaster {
    engine: SharedEngine,
    interval: Option<IntervalHandle>,
}

#[wasm_bindgen]
impl BeatMaster {
    #[wasm_bindgen(constructor)]
    pub fn new() -> BeatMaster {
        BeatMaster {
            engine: Rc::new(RefCell::new(Engine::new(WebAudioCues::new()))),
            interval: None,
        }
    }

    pub fn track_ids(&self) -> Vec<String> {
        self.engine.borrow().tracks().iter().map(|t| t.id.to_string()).collect()
    }

    pub fn track_names(&self) -> Vec<String> {
        self.engine.borrow().tracks().iter().map(|t| t.name.to_string()).collect()
    }

    pub fn select_track(&mut self, id: &str) -> bool {
        self.control(|e| e.select_track(id))
    }

    pub fn start(&mut self) -> bool {
        self.control(|e| e.start())
    }

    pub fn pause(&mut self) -> bool {
        self.control(|e| e.pause())
    }

    pub fn resume(&mut self) -> bool {
        self.control(|e| e.resume())
    }

    pub fn restart(&mut self) -> bool {
        self.control(|e| e.restart())
    }

    pub fn menu(&mut self) -> bool {
        self.control(|e| e.menu())
    }

    pub fn close(&mut self) {
        self.engine.borrow_mut().close();
        self.sync_interval();
    }

    /// Returns the judgment name: "perfect", "good", "ok", "whiff" or "ignored".
    pub fn hit(&mut self) -> String {
        let outcome = self.engine.borrow_mut().hit();
        self.sync_interval();
        match outcome {
            HitOutcome::Judged(result) => tier_name(result.tier).to_string(),
            HitOutcome::Whiff => "whiff".to_string(),
            HitOutcome::Ignored => "ignored".to_string(),
        }
    }

    /// Advance one frame; returns the number of notes missed during it.
    pub fn tick(&mut self, delta_ms: f64) -> u32 {
        let report = self.engine.borrow_mut().tick(delta_ms);
        self.sync_interval();
        report.misses.len() as u32
    }

    pub fn score(&self) -> f64 {
        self.engine.borrow().state().score as f64
    }

    pub fn combo(&self) -> u32 {
        self.engine.borrow().state().combo
    }

    pub fn max_combo(&self) -> u32 {
        self.engine.borrow().state().max_combo
    }

    pub fn lives(&self) -> u32 {
        self.engine.borrow().state().lives
    }

    pub fn level(&self) -> u32 {
        self.engine.borrow().state().level
    }

    pub fn phase(&self) -> String {
        phase_name(self.engine.borrow().phase()).to_string()
    }

    pub fn accent_color(&self) -> String {
        self.engine.borrow().selected_track().accent_color.to_string()
    }

    pub fn target_y(&self) -> f64 {
        self.engine.borrow().config().target_y
    }

    /// Current `position_y` of every live note, oldest first.
    pub fn note_positions(&self) -> Vec<f64> {
        self.engine.borrow().notes().iter().map(|n| n.position_y).collect()
    }
}

#[cfg(feature = "serde_json")]
#[wasm_bindgen]
impl BeatMaster {
    /// Full `Snapshot` as JSON, for renderers that prefer one call per frame.
    pub fn snapshot_json(&self) -> String {
        serde_json::to_string(&self.engine.borrow().snapshot()).unwrap_or_default()
    }
}

impl Default for BeatMaster {
    fn default() -> Self {
        Self::new()
    }
}

impl BeatMaster {
    fn control<F>(&mut self, op: F) -> bool
    where
        F: FnOnce(&mut Engine<WebAudioCues>) -> Result<(), crate::game::EngineError>,
    {
        let ok = {
            let mut engine = self.engine.borrow_mut();
            op(&mut *engine).is_ok()
        };
        self.sync_interval();
        ok
    }

    /// Keep the browser interval matched to the engine's armed beat timer.
    fn sync_interval(&mut self) {
        let wanted = self.engine.borrow().beat_timer();
        let current = self.interval.as_ref().map(|h| h.token);
        if wanted.map(|(token, _)| token) == current {
            return;
        }
        self.interval = None;
        if let Some((token, interval_ms)) = wanted {
            self.interval = self.set_interval(token, interval_ms);
        }
    }

    fn set_interval(&self, token: TimerToken, interval_ms: f64) -> Option<IntervalHandle> {
        let w = window()?;
        let engine = Rc::clone(&self.engine);
        let callback = Closure::wrap(Box::new(move || {
            if let Ok(mut e) = engine.try_borrow_mut() {
                e.on_beat_timer(token);
            }
        }) as Box<dyn FnMut()>);
        let id = w
            .set_interval_with_callback_and_timeout_and_arguments_0(
                callback.as_ref().unchecked_ref(),
                interval_ms.round() as i32,
            )
            .ok()?;
        Some(IntervalHandle {
            id,
            token,
            _callback: callback,
        })
    }
}

fn tier_name(tier: Tier) -> &'static str {
    match tier {
        Tier::Perfect => "perfect",
        Tier::Good => "good",
        Tier::Ok => "ok",
        Tier::Miss => "miss",
    }
}

fn phase_name(phase: Phase) -> &'static str {
    match phase {
        Phase::Menu => "menu",
        Phase::Playing => "playing",
        Phase::Paused => "paused",
        Phase::GameOver => "game_over",
    }
}
