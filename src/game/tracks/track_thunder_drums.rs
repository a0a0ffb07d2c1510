// Track: Thunder Drums
use super::Track;

pub static THUNDER_DRUMS: Track = Track {
    id: "thunder-drums",
    name: "Thunder Drums",
    genre: "Rock",
    bpm: 140,
    accent_color: "#fb5607",
    pattern: &[1, 1, 0, 1, 1, 0, 1, 0, 1, 1, 0, 1, 1, 0, 1, 1],
};
