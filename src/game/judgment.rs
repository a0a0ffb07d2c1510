use std::cmp::Ordering;

use log::debug;

use super::config::EngineConfig;
use super::notes::{Note, NoteId, NoteRegistry};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Tier {
    Perfect,
    Good,
    Ok, // scores, but breaks the combo
    Miss,
}

impl Tier {
    /// Perfect and Good extend the combo; everything else resets it.
    pub fn keeps_combo(self) -> bool {
        matches!(self, Tier::Perfect | Tier::Good)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct JudgmentResult {
    pub note: NoteId,
    pub tier: Tier,
    pub distance: f64,
    pub score_delta: u64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum HitOutcome {
    Judged(JudgmentResult),
    /// No note inside the hit window. Resets the combo, consumes nothing.
    Whiff,
    /// The session is not running; nothing happened.
    Ignored,
}

/// Timing windows and point values; stateless apart from configuration.
#[derive(Clone, Debug, PartialEq)]
pub struct JudgmentEngine {
    perfect_window: f64,
    good_window: f64,
    miss_window: f64,
    perfect_points: u64,
    good_points: u64,
    ok_points: u64,
}

impl JudgmentEngine {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            perfect_window: config.perfect_window,
            good_window: config.good_window,
            miss_window: config.miss_window,
            perfect_points: config.perfect_points,
            good_points: config.good_points,
            ok_points: config.ok_points,
        }
    }

    /// Tier for a hit at `distance` from the line, `None` outside the window.
    /// Perfect and Good bounds are inclusive, the outer window is exclusive.
    pub fn classify(&self, distance: f64) -> Option<Tier> {
        if distance <= self.perfect_window {
            Some(Tier::Perfect)
        } else if distance <= self.good_window {
            Some(Tier::Good)
        } else if distance < self.miss_window {
            Some(Tier::Ok)
        } else {
            None
        }
    }

    pub fn score_delta(&self, tier: Tier, combo_before: u32) -> u64 {
        let chain = combo_before as u64 + 1;
        match tier {
            Tier::Perfect => self.perfect_points * chain,
            Tier::Good => self.good_points * chain,
            Tier::Ok => self.ok_points,
            Tier::Miss => 0,
        }
    }

    /// Pick the live note closest to the line (oldest first on ties), grade it
    /// and remove it from the registry.
    pub fn judge_hit(&self, registry: &mut NoteRegistry, combo_before: u32) -> HitOutcome {
        let candidate = registry
            .notes()
            .iter()
            .filter(|n| !n.is_resolved() && n.distance() < self.miss_window)
            .min_by(|a, b| closer(a, b));
        let Some((id, distance)) = candidate.map(|n| (n.id, n.distance())) else {
            debug!("whiff: no note within {}", self.miss_window);
            return HitOutcome::Whiff;
        };
        let Some(tier) = self.classify(distance) else {
            return HitOutcome::Whiff;
        };
        registry.resolve(id, tier);
        let result = JudgmentResult {
            note: id,
            tier,
            distance,
            score_delta: self.score_delta(tier, combo_before),
        };
        debug!("hit note {} -> {:?} at {:.3}", id.0, tier, distance);
        HitOutcome::Judged(result)
    }

    /// Result for a note that crossed the line unresolved.
    pub fn expire(&self, note: &Note) -> JudgmentResult {
        JudgmentResult {
            note: note.id,
            tier: Tier::Miss,
            distance: note.distance(),
            score_delta: 0,
        }
    }
}

fn closer(a: &Note, b: &Note) -> Ordering {
    a.distance()
        .total_cmp(&b.distance())
        .then(a.spawn_tick.cmp(&b.spawn_tick))
        .then(a.id.cmp(&b.id))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn judge() -> JudgmentEngine {
        JudgmentEngine::new(&EngineConfig::default())
    }

    /// Registry with one note per position, each placed by a single 16ms frame.
    fn registry_at(positions: &[f64]) -> NoteRegistry {
        let mut reg = NoteRegistry::new(500.0);
        for (tick, pos) in positions.iter().enumerate() {
            reg.spawn(tick as u64, *pos);
        }
        reg.advance(16.0, 16.0);
        reg
    }

    #[test]
    fn window_boundaries() {
        let j = judge();
        assert_eq!(j.classify(0.0), Some(Tier::Perfect));
        assert_eq!(j.classify(15.0), Some(Tier::Perfect));
        assert_eq!(j.classify(15.0001), Some(Tier::Good));
        assert_eq!(j.classify(30.0), Some(Tier::Good));
        assert_eq!(j.classify(30.0001), Some(Tier::Ok));
        assert_eq!(j.classify(59.999), Some(Tier::Ok));
        assert_eq!(j.classify(60.0), None);
    }

    #[test]
    fn score_scales_with_combo_except_ok() {
        let j = judge();
        assert_eq!(j.score_delta(Tier::Perfect, 0), 100);
        assert_eq!(j.score_delta(Tier::Perfect, 4), 500);
        assert_eq!(j.score_delta(Tier::Good, 2), 150);
        assert_eq!(j.score_delta(Tier::Ok, 9), 25);
        assert_eq!(j.score_delta(Tier::Miss, 9), 0);
    }

    #[test]
    fn hit_picks_closest_note() {
        let mut reg = registry_at(&[400.0, 480.0, 470.0]);
        let HitOutcome::Judged(result) = judge().judge_hit(&mut reg, 0) else {
            panic!("expected a judgment");
        };
        assert_eq!(result.note, NoteId(1));
        assert_eq!(result.tier, Tier::Good);
        assert_eq!(result.distance, 20.0);
        assert_eq!(reg.len(), 2);
    }

    #[test]
    fn exact_boundary_positions() {
        let j = judge();
        let mut reg = registry_at(&[485.0]);
        assert!(matches!(j.judge_hit(&mut reg, 0), HitOutcome::Judged(r) if r.tier == Tier::Perfect));
        let mut reg = registry_at(&[470.0]);
        assert!(matches!(j.judge_hit(&mut reg, 0), HitOutcome::Judged(r) if r.tier == Tier::Good));
        let mut reg = registry_at(&[440.0]);
        assert_eq!(j.judge_hit(&mut reg, 0), HitOutcome::Whiff);
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn ties_go_to_the_oldest_note() {
        let mut reg = NoteRegistry::new(500.0);
        let first = reg.spawn(3, 10.0);
        reg.spawn(9, 10.0);
        reg.advance(784.0, 16.0);
        assert_eq!(reg.notes()[0].distance(), reg.notes()[1].distance());
        let HitOutcome::Judged(result) = judge().judge_hit(&mut reg, 0) else {
            panic!("expected a judgment");
        };
        assert_eq!(result.note, first);
    }

    #[test]
    fn empty_registry_is_a_whiff() {
        let mut reg = NoteRegistry::new(500.0);
        assert_eq!(judge().judge_hit(&mut reg, 3), HitOutcome::Whiff);
    }
}
