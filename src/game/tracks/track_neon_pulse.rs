// Track: Neon Pulse
use super::Track;

pub static NEON_PULSE: Track = Track {
    id: "neon-pulse",
    name: "Neon Pulse",
    genre: "Electronic",
    bpm: 128,
    accent_color: "#ff006e",
    pattern: &[1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 1, 1, 0],
};
