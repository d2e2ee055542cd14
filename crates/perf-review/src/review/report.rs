use serde::{Deserialize, Serialize};

use super::progress::ProgressSummary;
use super::rating::RatingConfig;
use super::scoring::EmployeeScore;
use super::domain::EmployeeId;

/// Head count per tier, in level order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierBucket {
    pub level: u8,
    pub name: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewSummary {
    pub scored: usize,
    pub not_rated: usize,
    pub degraded: usize,
    pub target_met: usize,
    /// Mean total over rated employees; zero when nobody is rated.
    pub mean_total: f64,
    pub tiers: Vec<TierBucket>,
}

/// Population scoring result for one cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewReport {
    pub cycle: String,
    pub summary: ReviewSummary,
    pub scores: Vec<EmployeeScore>,
}

impl ReviewReport {
    pub fn new(rating: &RatingConfig, scores: Vec<EmployeeScore>) -> Self {
        let summary = summarize(rating, &scores);
        Self {
            cycle: rating.cycle.clone(),
            summary,
            scores,
        }
    }

    pub fn score_for(&self, id: &EmployeeId) -> Option<&EmployeeScore> {
        self.scores.iter().find(|score| score.employee_id == *id)
    }
}

fn summarize(rating: &RatingConfig, scores: &[EmployeeScore]) -> ReviewSummary {
    let mut levels: Vec<_> = rating.levels.iter().collect();
    levels.sort_by_key(|level| level.level);
    levels.dedup_by_key(|level| level.level);

    let tiers = levels
        .into_iter()
        .map(|level| TierBucket {
            level: level.level,
            name: level.name.clone(),
            count: scores
                .iter()
                .filter(|score| score.tier.level().map(|tier| tier.level) == Some(level.level))
                .count(),
        })
        .collect();

    let rated: Vec<&EmployeeScore> = scores.iter().filter(|score| score.tier.is_rated()).collect();
    let mean_total = if rated.is_empty() {
        0.0
    } else {
        rated.iter().map(|score| score.total).sum::<f64>() / rated.len() as f64
    };

    ReviewSummary {
        scored: scores.len(),
        not_rated: scores.len() - rated.len(),
        degraded: scores.iter().filter(|score| score.tier.is_degraded()).count(),
        target_met: scores
            .iter()
            .filter(|score| score.tier.target_met(rating))
            .count(),
        mean_total,
        tiers,
    }
}

/// Aggregation failure for a single manager; the rest of the overview stands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressFailure {
    pub employee_id: EmployeeId,
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ProgressOverview {
    pub summaries: Vec<ProgressSummary>,
    pub failures: Vec<ProgressFailure>,
}
