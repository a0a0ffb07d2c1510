/// Single authority for "now" inside a session. Only advanced while playing.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SimulationClock {
    elapsed_ms: f64,
    ticks: u64,
}

impl SimulationClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance by one frame of `delta_ms` and return the new elapsed time.
    /// Negative or non-finite deltas count as an empty frame.
    pub fn advance(&mut self, delta_ms: f64) -> f64 {
        self.elapsed_ms += frame_delta(delta_ms);
        self.ticks += 1;
        self.elapsed_ms
    }

    pub fn reset(&mut self) {
        self.elapsed_ms = 0.0;
        self.ticks = 0;
    }

    pub fn elapsed_ms(&self) -> f64 {
        self.elapsed_ms
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }
}

/// Clamp a host-supplied frame delta to a finite, non-negative duration.
pub(crate) fn frame_delta(delta_ms: f64) -> f64 {
    if delta_ms.is_finite() { delta_ms.max(0.0) } else { 0.0 }
}
