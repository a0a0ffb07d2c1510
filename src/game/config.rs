//! Engine tunables. Defaults reproduce the shipped game; tests and embedders
//! can override individual values (JSON with the `serde_json` feature).

use super::error::EngineError;

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EngineConfig {
    /// Reference frame length; note speeds are expressed per frame of this size.
    pub frame_ms: f64,
    /// Distance from the spawn point to the judgment line.
    pub target_y: f64,
    /// Note speed (distance units per reference frame) at level 1.
    pub base_speed: f64,
    pub perfect_window: f64,
    pub good_window: f64,
    /// Exclusive upper bound of the hit window; anything at or beyond is a whiff.
    pub miss_window: f64,
    pub perfect_points: u64,
    pub good_points: u64,
    pub ok_points: u64,
    pub starting_lives: u32,
    /// Level `n` ends once score exceeds `n * level_score_step`.
    pub level_score_step: u64,
    pub speed_increment: f64,
    pub interval_decrement_ms: f64,
    pub min_beat_interval_ms: f64,
    pub combo_milestone: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            frame_ms: 16.0,
            target_y: 500.0,
            base_speed: 3.0,
            perfect_window: 15.0,
            good_window: 30.0,
            miss_window: 60.0,
            perfect_points: 100,
            good_points: 50,
            ok_points: 25,
            starting_lives: 3,
            level_score_step: 1000,
            speed_increment: 0.2,
            interval_decrement_ms: 10.0,
            min_beat_interval_ms: 200.0,
            combo_milestone: 10,
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), EngineError> {
        let positive = [
            ("frame_ms", self.frame_ms),
            ("target_y", self.target_y),
            ("base_speed", self.base_speed),
            ("perfect_window", self.perfect_window),
            ("min_beat_interval_ms", self.min_beat_interval_ms),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(EngineError::InvalidConfig(format!(
                    "{name} must be positive, got {value}"
                )));
            }
        }
        if !(self.perfect_window < self.good_window && self.good_window < self.miss_window) {
            return Err(EngineError::InvalidConfig(format!(
                "windows must be ordered perfect < good < miss, got {} / {} / {}",
                self.perfect_window, self.good_window, self.miss_window
            )));
        }
        let steps = [self.speed_increment, self.interval_decrement_ms];
        if !steps.iter().all(|step| step.is_finite() && *step >= 0.0) {
            return Err(EngineError::InvalidConfig(
                "difficulty steps must not make the game easier".into(),
            ));
        }
        if self.starting_lives == 0 {
            return Err(EngineError::InvalidConfig("starting_lives must be at least 1".into()));
        }
        if self.level_score_step == 0 {
            return Err(EngineError::InvalidConfig("level_score_step must be at least 1".into()));
        }
        Ok(())
    }

    /// Parse a (possibly partial) JSON object; missing keys keep their defaults.
    #[cfg(feature = "serde_json")]
    pub fn from_json(json: &str) -> Result<Self, EngineError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| EngineError::Json(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(EngineConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_unordered_windows() {
        let cfg = EngineConfig {
            good_window: 70.0,
            ..EngineConfig::default()
        };
        assert!(matches!(cfg.validate(), Err(EngineError::InvalidConfig(_))));
    }

    #[test]
    fn rejects_zero_lives() {
        let cfg = EngineConfig {
            starting_lives: 0,
            ..EngineConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn rejects_nan_difficulty_step() {
        let cfg = EngineConfig {
            speed_increment: f64::NAN,
            ..EngineConfig::default()
        };
        assert!(matches!(cfg.validate(), Err(EngineError::InvalidConfig(_))));
        let cfg = EngineConfig {
            interval_decrement_ms: f64::INFINITY,
            ..EngineConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[cfg(feature = "serde_json")]
    #[test]
    fn partial_json_keeps_defaults() {
        let cfg = EngineConfig::from_json(r#"{ "base_speed": 4.5 }"#).unwrap();
        assert_eq!(cfg.base_speed, 4.5);
        assert_eq!(cfg.target_y, 500.0);
        assert!(EngineConfig::from_json("{ nope").is_err());
    }
}
