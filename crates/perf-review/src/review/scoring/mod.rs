mod shared;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::domain::{sanitize_amount, Employee, EmployeeId, SharedGoal};
use super::normalizer::normalize;
use super::rating::{RatingConfig, RatingScale, TierOutcome};
use super::weights::{
    SplitSource, WeightConfigError, WeightConfigs, WeightRuleResolver, WeightSplit,
};

pub(crate) use shared::applicable_shared_goals;

/// How configuration defects are handled while scoring.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfigPolicy {
    /// Substitute built-in defaults and keep scoring.
    #[default]
    Lenient,
    /// Report the defect to the caller.
    Strict,
}

/// Combines shared and individual goal ratings into a final score and tier.
#[derive(Debug, Clone)]
pub struct ScoreAggregator {
    resolver: WeightRuleResolver,
    scale: RatingScale,
    policy: ConfigPolicy,
}

impl ScoreAggregator {
    pub fn new(weights: WeightConfigs, rating: RatingConfig) -> Self {
        Self {
            resolver: WeightRuleResolver::new(weights),
            scale: RatingScale::new(rating),
            policy: ConfigPolicy::Lenient,
        }
    }

    pub fn with_policy(mut self, policy: ConfigPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn resolver(&self) -> &WeightRuleResolver {
        &self.resolver
    }

    pub fn scale(&self) -> &RatingScale {
        &self.scale
    }

    pub fn score(
        &self,
        employee: &Employee,
        shared_goals: &[SharedGoal],
    ) -> Result<EmployeeScore, ScoringError> {
        let resolved = match self.policy {
            ConfigPolicy::Lenient => {
                self.resolver
                    .resolve(&employee.company, &employee.job_title, &employee.level)
            }
            ConfigPolicy::Strict => self.resolver.resolve_strict(
                &employee.company,
                &employee.job_title,
                &employee.level,
            )?,
        };
        let split = resolved.split;

        let applicable = applicable_shared_goals(employee, shared_goals);
        let shared_goal_rows: Vec<GoalContribution> =
            normalize(&applicable, f64::from(split.shared_pct))
                .into_iter()
                .map(|normalized| {
                    let goal = normalized.goal;
                    GoalContribution::new(
                        Some(goal.goal.id.clone()),
                        &goal.goal.title,
                        goal.goal.rating,
                        goal.total_weight,
                        normalized.effective_weight,
                    )
                })
                .collect();

        let individual_goal_rows: Vec<GoalContribution> =
            normalize(&employee.goals, f64::from(split.individual_pct))
                .into_iter()
                .map(|normalized| {
                    GoalContribution::new(
                        None,
                        &normalized.goal.title,
                        normalized.goal.rating,
                        normalized.goal.weight,
                        normalized.effective_weight,
                    )
                })
                .collect();

        let shared_contribution = sum_contributions(&shared_goal_rows);
        let individual_contribution = sum_contributions(&individual_goal_rows);
        let total = shared_contribution + individual_contribution;
        let tier = self.scale.tier_for_total(total);

        debug!(
            employee = %employee.id,
            shared_contribution,
            individual_contribution,
            total,
            tier = tier.name(),
            "scored employee"
        );

        Ok(EmployeeScore {
            employee_id: employee.id.clone(),
            split,
            split_source: resolved.source,
            shared_contribution,
            individual_contribution,
            total,
            tier,
            shared_goals: shared_goal_rows,
            individual_goals: individual_goal_rows,
        })
    }
}

fn sum_contributions(rows: &[GoalContribution]) -> f64 {
    rows.iter().map(|row| row.contribution).sum()
}

/// One goal's share of an employee's score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalContribution {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub goal_id: Option<String>,
    pub title: String,
    pub rating: f64,
    pub raw_weight: f64,
    pub effective_weight: f64,
    pub contribution: f64,
}

impl GoalContribution {
    fn new(
        goal_id: Option<String>,
        title: &str,
        rating: f64,
        raw_weight: f64,
        effective_weight: f64,
    ) -> Self {
        let rating = sanitize_amount(rating);
        Self {
            goal_id,
            title: title.to_string(),
            rating,
            raw_weight: sanitize_amount(raw_weight),
            effective_weight,
            contribution: rating * effective_weight,
        }
    }
}

/// Scoring output for one employee.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmployeeScore {
    pub employee_id: EmployeeId,
    pub split: WeightSplit,
    pub split_source: SplitSource,
    pub shared_contribution: f64,
    pub individual_contribution: f64,
    pub total: f64,
    pub tier: TierOutcome,
    pub shared_goals: Vec<GoalContribution>,
    pub individual_goals: Vec<GoalContribution>,
}

#[derive(Debug, thiserror::Error)]
pub enum ScoringError {
    #[error(transparent)]
    WeightConfig(#[from] WeightConfigError),
}
