//! Advisory checks run before an employee's goals are submitted.
//!
//! None of these block scoring; they surface what a reviewer should fix.

use serde::{Deserialize, Serialize};

use super::domain::{sanitize_amount, Employee, EmployeeId, Goal};
use super::weights::{WeightRuleResolver, WeightSplit};

/// Allowed drift, in percentage points, between authored and allocated weight.
pub const ALLOCATION_TOLERANCE_PCT: f64 = 0.5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GoalIssue {
    /// Individual goal weights do not add up to the employee's allocation.
    AllocationMismatch { allocated_pct: u8, authored_pct: f64 },
    /// A zero-weight goal cannot move the score.
    NotActionable { goal: String },
    TargetCount { goal: String, found: usize },
    Unrated { goal: String },
}

impl GoalIssue {
    pub fn summary(&self) -> String {
        match self {
            GoalIssue::AllocationMismatch {
                allocated_pct,
                authored_pct,
            } => format!(
                "individual goals weigh {authored_pct:.1}% but {allocated_pct}% is allocated"
            ),
            GoalIssue::NotActionable { goal } => format!("'{goal}' has no weight"),
            GoalIssue::TargetCount { goal, found } => format!(
                "'{goal}' defines {found} targets, expected {}",
                Goal::TARGET_COUNT
            ),
            GoalIssue::Unrated { goal } => format!("'{goal}' has not been rated"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreflightReport {
    pub employee_id: EmployeeId,
    pub split: WeightSplit,
    pub issues: Vec<GoalIssue>,
}

impl PreflightReport {
    pub fn is_ready(&self) -> bool {
        self.issues.is_empty()
    }
}

pub fn check_employee(employee: &Employee, resolver: &WeightRuleResolver) -> PreflightReport {
    let split = resolver
        .resolve(&employee.company, &employee.job_title, &employee.level)
        .split;
    let mut issues = Vec::new();

    let authored_pct: f64 = employee
        .goals
        .iter()
        .map(|goal| sanitize_amount(goal.weight) * 100.0)
        .sum();
    if (authored_pct - f64::from(split.individual_pct)).abs() > ALLOCATION_TOLERANCE_PCT {
        issues.push(GoalIssue::AllocationMismatch {
            allocated_pct: split.individual_pct,
            authored_pct,
        });
    }

    for goal in &employee.goals {
        if sanitize_amount(goal.weight) == 0.0 {
            issues.push(GoalIssue::NotActionable {
                goal: goal.title.clone(),
            });
        }
        if goal.targets.len() != Goal::TARGET_COUNT {
            issues.push(GoalIssue::TargetCount {
                goal: goal.title.clone(),
                found: goal.targets.len(),
            });
        }
        if sanitize_amount(goal.rating) == 0.0 {
            issues.push(GoalIssue::Unrated {
                goal: goal.title.clone(),
            });
        }
    }

    PreflightReport {
        employee_id: employee.id.clone(),
        split,
        issues,
    }
}
