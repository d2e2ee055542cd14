use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::ReviewSettings;

use super::domain::{Employee, EmployeeId, SharedGoal};
use super::hierarchy::OrgChart;
use super::preflight::{check_employee, PreflightReport};
use super::progress::{
    CascadeMode, ProgressAggregator, ProgressConfig, ProgressConfigError, ProgressError,
    ProgressSummary,
};
use super::rating::{RatingConfig, RatingConfigError};
use super::report::{ProgressFailure, ProgressOverview, ReviewReport};
use super::scoring::{ConfigPolicy, EmployeeScore, ScoreAggregator, ScoringError};
use super::weights::{WeightConfigError, WeightConfigs};

/// The three configuration objects a review cycle runs under.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewConfigs {
    pub weights: WeightConfigs,
    pub rating: RatingConfig,
    pub progress: ProgressConfig,
}

impl ReviewConfigs {
    pub fn baseline(cycle: &str) -> Self {
        Self {
            weights: WeightConfigs::default(),
            rating: RatingConfig::default_six_level(cycle),
            progress: ProgressConfig::baseline(),
        }
    }

    /// Every defect found across the three configurations.
    pub fn validate(&self) -> Vec<ConfigDefect> {
        let mut defects = Vec::new();
        if let Err(err) = self.weights.validate() {
            defects.push(ConfigDefect::Weights(err));
        }
        if let Err(err) = self.rating.validate() {
            defects.push(ConfigDefect::Rating(err));
        }
        if let Err(err) = self.progress.validate() {
            defects.push(ConfigDefect::Progress(err));
        }
        defects
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigDefect {
    #[error("weight configuration: {0}")]
    Weights(WeightConfigError),
    #[error("rating configuration: {0}")]
    Rating(RatingConfigError),
    #[error("progress configuration: {0}")]
    Progress(ProgressConfigError),
}

/// Scores and progress for one review cycle over explicit configuration.
#[derive(Debug, Clone)]
pub struct ReviewEngine {
    scorer: ScoreAggregator,
    progress: ProgressAggregator,
    shared_goals: Vec<SharedGoal>,
}

impl ReviewEngine {
    pub fn new(configs: ReviewConfigs, shared_goals: Vec<SharedGoal>) -> Self {
        Self::with_settings(configs, shared_goals, &ReviewSettings::default())
    }

    pub fn with_settings(
        configs: ReviewConfigs,
        shared_goals: Vec<SharedGoal>,
        settings: &ReviewSettings,
    ) -> Self {
        let policy = if settings.strict_config {
            ConfigPolicy::Strict
        } else {
            ConfigPolicy::Lenient
        };

        Self {
            scorer: ScoreAggregator::new(configs.weights, configs.rating).with_policy(policy),
            progress: ProgressAggregator::new(configs.progress).with_max_depth(settings.max_depth),
            shared_goals,
        }
    }

    pub fn with_cascade_mode(mut self, mode: CascadeMode) -> Self {
        self.progress = self.progress.with_cascade_mode(mode);
        self
    }

    pub fn rating(&self) -> &RatingConfig {
        self.scorer.scale().config()
    }

    pub fn shared_goals(&self) -> &[SharedGoal] {
        &self.shared_goals
    }

    pub fn score_employee(&self, employee: &Employee) -> Result<EmployeeScore, ScoringError> {
        self.scorer.score(employee, &self.shared_goals)
    }

    /// Score every reviewable employee on the chart.
    pub fn score_population(&self, chart: &OrgChart) -> Result<ReviewReport, ScoringError> {
        let scores = chart
            .employees()
            .filter(|employee| employee.status.is_reviewable())
            .map(|employee| self.score_employee(employee))
            .collect::<Result<Vec<_>, _>>()?;

        let report = ReviewReport::new(self.rating(), scores);
        info!(
            cycle = %report.cycle,
            scored = report.summary.scored,
            not_rated = report.summary.not_rated,
            "scored review population"
        );
        Ok(report)
    }

    pub fn preflight(&self, chart: &OrgChart) -> Vec<PreflightReport> {
        chart
            .employees()
            .filter(|employee| employee.status.is_reviewable())
            .map(|employee| check_employee(employee, self.scorer.resolver()))
            .collect()
    }

    pub fn progress_for(
        &self,
        manager_id: &EmployeeId,
        chart: &OrgChart,
    ) -> Result<ProgressSummary, ProgressError> {
        self.progress.aggregate(manager_id, chart)
    }

    /// Aggregate every manager; failures are collected rather than aborting.
    pub fn progress_overview(&self, chart: &OrgChart) -> ProgressOverview {
        let mut overview = ProgressOverview::default();
        for manager in chart.managers() {
            match self.progress.aggregate(&manager.id, chart) {
                Ok(summary) => overview.summaries.push(summary),
                Err(err) => {
                    warn!(manager = %manager.id, error = %err, "progress aggregation failed");
                    overview.failures.push(ProgressFailure {
                        employee_id: manager.id.clone(),
                        error: err.to_string(),
                    });
                }
            }
        }
        overview
    }
}
