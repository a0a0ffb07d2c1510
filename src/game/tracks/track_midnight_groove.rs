// Track: Midnight Groove
use super::Track;

pub static MIDNIGHT_GROOVE: Track = Track {
    id: "midnight-groove",
    name: "Midnight Groove",
    genre: "Funk",
    bpm: 110,
    accent_color: "#8338ec",
    pattern: &[1, 0, 0, 1, 0, 0, 1, 0, 1, 0, 0, 1, 0, 1, 0, 0],
};
