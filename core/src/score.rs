//! Tier-conditioned quiz score model.

use crate::{
    assignment::PerformanceTier,
    config::{ScoreModel, ScoreModels},
    rng::PhaseRng,
};

impl ScoreModels {
    pub fn for_tier(&self, tier: PerformanceTier) -> ScoreModel {
        match tier {
            PerformanceTier::High => self.high,
            PerformanceTier::Low => self.low,
            PerformanceTier::Average => self.average,
        }
    }
}

impl ScoreModel {
    /// Round to nearest, then clamp. Out-of-range draws are clamped,
    /// never resampled.
    pub fn draw(&self, rng: &mut PhaseRng) -> i64 {
        let raw = rng.normal(self.mean, self.std_dev).round() as i64;
        raw.clamp(self.min, self.max)
    }
}

pub fn quiz_score(models: &ScoreModels, tier: PerformanceTier, rng: &mut PhaseRng) -> i64 {
    models.for_tier(tier).draw(rng)
}
