use log::trace;

use super::tracks::Track;

/// One beat boundary crossed during a poll.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BeatCrossing {
    pub index: u64,
    pub spawn: bool,
}

/// Turns elapsed simulation time into beat crossings by walking the track's
/// pattern. Holds only timing state; the pattern itself stays in the `Track`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PatternScheduler {
    last_beat_ms: f64,
    beat_index: u64,
}

impl PatternScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Report every beat boundary crossed since the previous poll, oldest first.
    /// Boundaries are phase-locked (`last + interval`) rather than reset to the
    /// current time, so an oversized frame yields one crossing per beat it spans.
    pub fn poll(&mut self, elapsed_ms: f64, track: &Track, beat_interval_ms: f64) -> Vec<BeatCrossing> {
        let mut crossings = Vec::new();
        if !elapsed_ms.is_finite() || !(beat_interval_ms.is_finite() && beat_interval_ms > 0.0) {
            return crossings;
        }
        while elapsed_ms - self.last_beat_ms >= beat_interval_ms {
            self.last_beat_ms += beat_interval_ms;
            let crossing = BeatCrossing {
                index: self.beat_index,
                spawn: track.spawns_on(self.beat_index),
            };
            trace!("beat {} at {:.1}ms spawn={}", crossing.index, self.last_beat_ms, crossing.spawn);
            crossings.push(crossing);
            self.beat_index += 1;
        }
        crossings
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Index of the next beat to be crossed.
    pub fn beat_index(&self) -> u64 {
        self.beat_index
    }

    pub fn last_beat_ms(&self) -> f64 {
        self.last_beat_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    static ALTERNATING: Track = Track {
        id: "alt",
        name: "Alternating",
        genre: "Test",
        bpm: 120,
        accent_color: "#000",
        pattern: &[1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0],
    };

    fn run(ticks: usize, delta: f64) -> Vec<BeatCrossing> {
        let mut s = PatternScheduler::new();
        let mut elapsed = 0.0;
        let mut all = Vec::new();
        for _ in 0..ticks {
            elapsed += delta;
            all.extend(s.poll(elapsed, &ALTERNATING, ALTERNATING.beat_interval_ms()));
        }
        all
    }

    #[test]
    fn no_crossing_before_first_interval() {
        assert!(run(31, 16.0).is_empty());
    }

    #[test]
    fn first_crossing_uses_index_zero() {
        let crossings = run(32, 16.0);
        assert_eq!(crossings, vec![BeatCrossing { index: 0, spawn: true }]);
    }

    #[test]
    fn oversized_frame_evaluates_every_beat_in_order() {
        let mut s = PatternScheduler::new();
        let crossings = s.poll(1_600.0, &ALTERNATING, 500.0);
        assert_eq!(
            crossings,
            vec![
                BeatCrossing { index: 0, spawn: true },
                BeatCrossing { index: 1, spawn: false },
                BeatCrossing { index: 2, spawn: true },
            ]
        );
        assert_eq!(s.beat_index(), 3);
        assert_eq!(s.last_beat_ms(), 1_500.0);
    }

    #[test]
    fn interval_change_applies_from_next_boundary() {
        let mut s = PatternScheduler::new();
        assert_eq!(s.poll(500.0, &ALTERNATING, 500.0).len(), 1);
        assert!(s.poll(980.0, &ALTERNATING, 490.0).is_empty());
        assert_eq!(s.poll(990.0, &ALTERNATING, 490.0).len(), 1);
    }

    #[test]
    fn non_finite_time_yields_nothing() {
        let mut s = PatternScheduler::new();
        assert!(s.poll(f64::INFINITY, &ALTERNATING, 500.0).is_empty());
        assert!(s.poll(1_000.0, &ALTERNATING, f64::NAN).is_empty());
        assert_eq!(s, PatternScheduler::new());
    }

    #[test]
    fn reset_restarts_pattern() {
        let mut s = PatternScheduler::new();
        s.poll(2_000.0, &ALTERNATING, 500.0);
        s.reset();
        assert_eq!(s, PatternScheduler::new());
    }
}
