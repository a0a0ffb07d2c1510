//! Beat Master core crate.
//!
//! The rhythm engine in [`game`] is plain Rust and runs anywhere; [`web`]
//! wraps it for the browser (wasm-bindgen class, Web Audio cues, console
//! logging). The site's menu and canvas drawing stay in JS and talk to the
//! engine only through `BeatMaster`.

use wasm_bindgen::prelude::*;

pub mod game;
pub mod web;

pub use game::{
    AudioCue, AudioCueDispatcher, Engine, EngineConfig, EngineError, HitOutcome, Phase, RecordingCues,
    SilentCues, Snapshot, Tier, TickReport, Track, TrackLibrary,
};
pub use web::BeatMaster;

// Optional small allocator for size (feature gated)
#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen(start)]
pub fn wasm_start() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
    web::init_logging();
}
