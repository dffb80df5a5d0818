//! Run configuration.
//!
//! Every field has a default matching the documented generation model,
//! so a config file only needs the values it overrides.

use crate::error::{SimError, SimResult};
use serde::{Deserialize, Serialize};

pub const DEFAULT_TARGET_TABLE: &str = "stg_student_activities";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TrendConfig {
    pub keyword: String,
    pub geo: String,
    /// Trailing window kept by the fetcher, ending at the latest point.
    pub window_days: u32,
}

impl Default for TrendConfig {
    fn default() -> Self {
        Self {
            keyword: "BrainPOP".into(),
            geo: "US".into(),
            window_days: 90,
        }
    }
}

/// Normal(mean, std_dev), rounded, then clamped to [min, max].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ScoreModel {
    pub mean: f64,
    pub std_dev: f64,
    pub min: i64,
    pub max: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ScoreModels {
    pub high: ScoreModel,
    pub low: ScoreModel,
    pub average: ScoreModel,
}

impl Default for ScoreModels {
    fn default() -> Self {
        Self {
            high: ScoreModel { mean: 8.5, std_dev: 1.0, min: 7, max: 10 },
            low: ScoreModel { mean: 4.0, std_dev: 2.0, min: 0, max: 6 },
            average: ScoreModel { mean: 7.0, std_dev: 2.0, min: 0, max: 10 },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct InteractionConfig {
    pub mean: f64,
    pub std_dev: f64,
    pub min: u32,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self { mean: 2.0, std_dev: 1.25, min: 1 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GeneratorConfig {
    pub high_tier_share: f64,
    /// Applied to the full roster size, drawn from what High left over.
    pub low_tier_share: f64,
    pub movie_probability: f64,
    pub interactions: InteractionConfig,
    pub score_models: ScoreModels,
    /// Inclusive.
    pub quiz_id_range: (i64, i64),
    /// Half-open: [start, end).
    pub record_id_range: (i64, i64),
    pub quiz_follows_movie_probability: f64,
    pub duplication_rate: f64,
    /// Inclusive, in seconds.
    pub duplicate_shift_seconds: (i64, i64),
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            high_tier_share: 0.3,
            low_tier_share: 0.2,
            movie_probability: 0.6,
            interactions: InteractionConfig::default(),
            score_models: ScoreModels::default(),
            quiz_id_range: (50, 100),
            record_id_range: (10_000_000, 11_000_000),
            quiz_follows_movie_probability: 0.7,
            duplication_rate: 0.3,
            duplicate_shift_seconds: (1, 10),
        }
    }
}

impl GeneratorConfig {
    /// Reject shares, probabilities and ranges the generator cannot draw from.
    pub fn validate(&self) -> SimResult<()> {
        for (field, p) in [
            ("generator.high_tier_share", self.high_tier_share),
            ("generator.low_tier_share", self.low_tier_share),
            ("generator.movie_probability", self.movie_probability),
            ("generator.quiz_follows_movie_probability", self.quiz_follows_movie_probability),
            ("generator.duplication_rate", self.duplication_rate),
        ] {
            if !(0.0..=1.0).contains(&p) {
                return Err(invalid(field, format!("{p} is outside [0, 1]")));
            }
        }
        if self.high_tier_share + self.low_tier_share > 1.0 {
            return Err(invalid(
                "generator.low_tier_share",
                "high and low shares together exceed the roster".into(),
            ));
        }
        if !(self.interactions.std_dev >= 0.0 && self.interactions.mean.is_finite()) {
            return Err(invalid("generator.interactions", "std_dev must be >= 0".into()));
        }
        for (field, m) in [
            ("generator.score_models.high", self.score_models.high),
            ("generator.score_models.low", self.score_models.low),
            ("generator.score_models.average", self.score_models.average),
        ] {
            if !(m.std_dev >= 0.0 && m.mean.is_finite()) {
                return Err(invalid(field, "std_dev must be >= 0".into()));
            }
            if m.min > m.max || m.min < 0 || m.max > 10 {
                return Err(invalid(field, format!("bounds {}..={} not within 0..=10", m.min, m.max)));
            }
        }
        if self.quiz_id_range.0 > self.quiz_id_range.1 {
            return Err(invalid("generator.quiz_id_range", "range is empty".into()));
        }
        if self.record_id_range.0 >= self.record_id_range.1 {
            return Err(invalid("generator.record_id_range", "range is empty".into()));
        }
        let (lo, hi) = self.duplicate_shift_seconds;
        if lo < 1 || lo > hi {
            return Err(invalid(
                "generator.duplicate_shift_seconds",
                "shift must be a non-empty range of positive seconds".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SimConfig {
    pub trend: TrendConfig,
    pub generator: GeneratorConfig,
    pub target_table: String,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            trend: TrendConfig::default(),
            generator: GeneratorConfig::default(),
            target_table: DEFAULT_TARGET_TABLE.into(),
        }
    }
}

impl SimConfig {
    /// Load from a JSON file and validate it.
    /// In tests, use SimConfig::default().
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let config: SimConfig = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Cannot parse {path}: {e}"))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> SimResult<()> {
        self.generator.validate()?;
        if self.trend.window_days == 0 {
            return Err(invalid("trend.window_days", "must be at least 1".into()));
        }
        if self.target_table.trim().is_empty() {
            return Err(invalid("target_table", "must not be empty".into()));
        }
        Ok(())
    }
}

fn invalid(field: &str, reason: String) -> SimError {
    SimError::InvalidConfig { field: field.into(), reason }
}
