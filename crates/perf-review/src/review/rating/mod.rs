//! Discrete performance tiers and the score-to-tier lookup.

mod config;

pub use config::{
    RatingConfig, RatingConfigError, RatingLevel, RatingMode, DEFAULT_MAX_RATING,
};

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Result of placing a score on the rating scale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TierOutcome {
    /// No positive score yet; distinct from the lowest tier.
    NotRated,
    Matched { level: RatingLevel },
    /// Score fell outside the scale and was pinned to the nearest end.
    Clamped { level: RatingLevel },
    /// No level covered the score; the lowest tier is reported instead.
    Degraded { level: RatingLevel },
}

impl TierOutcome {
    pub fn level(&self) -> Option<&RatingLevel> {
        match self {
            TierOutcome::NotRated => None,
            TierOutcome::Matched { level }
            | TierOutcome::Clamped { level }
            | TierOutcome::Degraded { level } => Some(level),
        }
    }

    pub fn name(&self) -> &str {
        self.level()
            .map(|level| level.name.as_str())
            .unwrap_or("NOT_RATED")
    }

    pub fn is_rated(&self) -> bool {
        !matches!(self, TierOutcome::NotRated)
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, TierOutcome::Degraded { .. })
    }

    /// Whether the tier reaches the scale's benchmark level.
    pub fn target_met(&self, config: &RatingConfig) -> bool {
        self.level()
            .map(|level| level.level >= config.target_level)
            .unwrap_or(false)
    }
}

/// Lookup over one cycle's rating configuration.
#[derive(Debug, Clone)]
pub struct RatingScale {
    config: RatingConfig,
}

impl RatingScale {
    pub fn new(config: RatingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RatingConfig {
        &self.config
    }

    /// Tier for a weighted rating total. Percentage scales see the total as a
    /// share of `max_rating`.
    pub fn tier_for_total(&self, total: f64) -> TierOutcome {
        match self.config.mode {
            RatingMode::Percentage => self.tier_for(self.config.percentage_of_max(total)),
            RatingMode::Level => self.tier_for(total),
        }
    }

    pub fn tier_for(&self, score: f64) -> TierOutcome {
        self.tier_for_mode(score, self.config.mode)
    }

    pub fn tier_for_mode(&self, score: f64, mode: RatingMode) -> TierOutcome {
        if !score.is_finite() || score <= 0.0 {
            return TierOutcome::NotRated;
        }

        let levels = &self.config.levels;
        let (Some(bottom), Some(top)) = (
            levels
                .iter()
                .min_by(|a, b| a.min_score.total_cmp(&b.min_score)),
            levels
                .iter()
                .max_by(|a, b| a.max_score.total_cmp(&b.max_score)),
        ) else {
            warn!(cycle = %self.config.cycle, "rating scale has no levels, score left unrated");
            return TierOutcome::NotRated;
        };

        let score = match mode {
            RatingMode::Percentage => score.min(100.0),
            RatingMode::Level => score,
        };
        let score = round_to_boundary(score);

        if let Some(level) = levels.iter().find(|level| level.contains(score)) {
            return TierOutcome::Matched {
                level: level.clone(),
            };
        }

        if score < bottom.min_score {
            return TierOutcome::Clamped {
                level: bottom.clone(),
            };
        }
        if score > top.max_score {
            return TierOutcome::Clamped { level: top.clone() };
        }

        warn!(
            cycle = %self.config.cycle,
            score,
            fallback = %bottom.name,
            "no rating level covers score, reporting lowest tier"
        );
        TierOutcome::Degraded {
            level: bottom.clone(),
        }
    }
}

fn round_to_boundary(score: f64) -> f64 {
    (score / config::BOUNDARY_STEP).round() * config::BOUNDARY_STEP
}
