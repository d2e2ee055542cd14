//! Weighted goal scoring and progress aggregation for review cycles.

pub mod domain;
mod engine;
pub mod hierarchy;
pub mod normalizer;
pub mod preflight;
pub mod progress;
pub mod rating;
pub mod report;
pub mod roster;
pub mod scoring;
pub mod weights;

#[cfg(test)]
mod tests;

pub use domain::{
    Assignment, DivisionWeightOverride, Employee, EmployeeId, EmployeeStatus, Goal, Scope,
    SharedGoal,
};
pub use engine::{ConfigDefect, ReviewConfigs, ReviewEngine};
pub use hierarchy::{HierarchyIssue, OrgChart};
pub use normalizer::{normalize, NormalizedGoal, Weighted};
pub use preflight::{GoalIssue, PreflightReport};
pub use progress::{
    CascadeMode, LevelWeight, ProgressAggregator, ProgressConfig, ProgressError, ProgressSummary,
};
pub use rating::{RatingConfig, RatingLevel, RatingMode, RatingScale, TierOutcome};
pub use report::{ProgressOverview, ReviewReport, ReviewSummary, TierBucket};
pub use roster::{RosterImportError, RosterImporter};
pub use scoring::{ConfigPolicy, EmployeeScore, GoalContribution, ScoreAggregator, ScoringError};
pub use weights::{
    ResolvedSplit, RuleKind, SplitSource, WeightConfig, WeightConfigs, WeightRule,
    WeightRuleResolver, WeightSplit,
};
