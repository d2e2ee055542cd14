use serde::{Deserialize, Serialize};

/// Authoring resolution of level boundaries (e.g. 1.49 followed by 1.5).
pub(crate) const BOUNDARY_STEP: f64 = 0.01;
const EPSILON: f64 = 1e-9;
/// Top of the goal rating scale; one step per goal target.
pub const DEFAULT_MAX_RATING: f64 = 6.0;

fn default_max_rating() -> f64 {
    DEFAULT_MAX_RATING
}

/// Whether scores are read on the native level scale or as percentages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RatingMode {
    Level,
    Percentage,
}

/// One discrete performance tier with its inclusive score range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingLevel {
    pub level: u8,
    pub name: String,
    pub min_score: f64,
    pub max_score: f64,
}

impl RatingLevel {
    pub fn new(level: u8, name: impl Into<String>, min_score: f64, max_score: f64) -> Self {
        Self {
            level,
            name: name.into(),
            min_score,
            max_score,
        }
    }

    pub fn contains(&self, score: f64) -> bool {
        score >= self.min_score - EPSILON && score <= self.max_score + EPSILON
    }
}

/// Rating scale for one performance cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingConfig {
    #[serde(default)]
    pub cycle: String,
    pub mode: RatingMode,
    pub levels: Vec<RatingLevel>,
    pub levels_count: usize,
    /// Level flagged as the expected benchmark tier.
    pub target_level: u8,
    /// Weighted total that counts as 100% when the scale is in percentage mode.
    #[serde(default = "default_max_rating")]
    pub max_rating: f64,
}

impl RatingConfig {
    /// Six-level scale used when a cycle has no configured scale.
    pub fn default_six_level(cycle: impl Into<String>) -> Self {
        let levels = vec![
            RatingLevel::new(1, "STARTER", 0.0, 1.49),
            RatingLevel::new(2, "WALKER", 1.5, 2.49),
            RatingLevel::new(3, "JOGGER", 2.5, 3.49),
            RatingLevel::new(4, "RUNNER", 3.5, 4.49),
            RatingLevel::new(5, "SPRINTER", 4.5, 5.49),
            RatingLevel::new(6, "CHAMPION", 5.5, 6.0),
        ];

        Self {
            cycle: cycle.into(),
            mode: RatingMode::Level,
            levels_count: levels.len(),
            levels,
            target_level: 4,
            max_rating: DEFAULT_MAX_RATING,
        }
    }

    /// Key under which the scale for `cycle` is persisted.
    pub fn storage_key(cycle: &str) -> String {
        format!("rating_config_{cycle}")
    }

    /// Weighted rating total expressed on the 0..100 percentage axis.
    pub fn percentage_of_max(&self, total: f64) -> f64 {
        total / self.max_rating * 100.0
    }

    pub fn level(&self, level: u8) -> Option<&RatingLevel> {
        self.levels.iter().find(|candidate| candidate.level == level)
    }

    /// Checks that the levels form a contiguous, non-overlapping cover of the
    /// scale. Run when administrators save a scale.
    pub fn validate(&self) -> Result<(), RatingConfigError> {
        if self.levels.is_empty() {
            return Err(RatingConfigError::NoLevels);
        }

        if !(self.max_rating.is_finite() && self.max_rating > 0.0) {
            return Err(RatingConfigError::InvalidMaxRating(self.max_rating));
        }

        if self.levels_count != self.levels.len() {
            return Err(RatingConfigError::LevelCountMismatch {
                declared: self.levels_count,
                actual: self.levels.len(),
            });
        }

        if let Some(level) = self
            .levels
            .iter()
            .find(|level| !(level.min_score.is_finite() && level.max_score.is_finite())
                || level.min_score > level.max_score)
        {
            return Err(RatingConfigError::InvertedRange { level: level.level });
        }

        let mut ordered: Vec<&RatingLevel> = self.levels.iter().collect();
        ordered.sort_by(|a, b| a.min_score.total_cmp(&b.min_score));

        for pair in ordered.windows(2) {
            let (lower, upper) = (pair[0], pair[1]);
            if upper.min_score <= lower.max_score + EPSILON {
                return Err(RatingConfigError::Overlap {
                    lower: lower.level,
                    upper: upper.level,
                });
            }
            if upper.min_score - lower.max_score > BOUNDARY_STEP + EPSILON {
                return Err(RatingConfigError::Gap {
                    after: lower.level,
                    from: lower.max_score,
                    to: upper.min_score,
                });
            }
        }

        if self.mode == RatingMode::Percentage {
            let bottom = ordered[0].min_score;
            let top = ordered[ordered.len() - 1].max_score;
            if bottom > EPSILON || top < 100.0 - BOUNDARY_STEP - EPSILON {
                return Err(RatingConfigError::IncompleteCoverage { bottom, top });
            }
        }

        if self.level(self.target_level).is_none() {
            return Err(RatingConfigError::UnknownTargetLevel(self.target_level));
        }

        Ok(())
    }
}

/// Configuration defects detected in a rating scale.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RatingConfigError {
    #[error("rating scale defines no levels")]
    NoLevels,
    #[error("rating scale declares {declared} levels but defines {actual}")]
    LevelCountMismatch { declared: usize, actual: usize },
    #[error("level {level} has an invalid score range")]
    InvertedRange { level: u8 },
    #[error("levels {lower} and {upper} overlap")]
    Overlap { lower: u8, upper: u8 },
    #[error("scores between {from} and {to} (after level {after}) map to no level")]
    Gap { after: u8, from: f64, to: f64 },
    #[error("percentage scale covers {bottom}..{top} instead of 0..100")]
    IncompleteCoverage { bottom: f64, top: f64 },
    #[error("maximum rating must be positive, got {0}")]
    InvalidMaxRating(f64),
    #[error("target level {0} is not part of the scale")]
    UnknownTargetLevel(u8),
}
