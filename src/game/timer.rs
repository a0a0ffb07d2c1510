/// Identifies one arming of the background beat timer. A callback carrying a
/// token that is no longer current belongs to a cancelled timer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TimerToken(pub u64);

/// Logical state of the background beat timer. The real periodic callback
/// lives in the host; this only decides which callbacks still count.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BeatTimer {
    generation: u64,
    armed: Option<(TimerToken, f64)>,
}

impl BeatTimer {
    /// Arm at `interval_ms`, replacing any previous arming.
    pub fn arm(&mut self, interval_ms: f64) -> TimerToken {
        self.generation += 1;
        let token = TimerToken(self.generation);
        self.armed = Some((token, interval_ms));
        token
    }

    pub fn cancel(&mut self) {
        self.armed = None;
    }

    pub fn is_current(&self, token: TimerToken) -> bool {
        matches!(self.armed, Some((t, _)) if t == token)
    }

    /// Current token and interval, `None` while cancelled.
    pub fn current(&self) -> Option<(TimerToken, f64)> {
        self.armed
    }
}
