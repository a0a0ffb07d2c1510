// Track: Lo-Fi Drift
use super::Track;

pub static LOFI_DRIFT: Track = Track {
    id: "lofi-drift",
    name: "Lo-Fi Drift",
    genre: "Chill",
    bpm: 90,
    accent_color: "#3a86ff",
    pattern: &[1, 0, 0, 0, 1, 0, 0, 0, 1, 0, 1, 0, 0, 0, 0, 0],
};
