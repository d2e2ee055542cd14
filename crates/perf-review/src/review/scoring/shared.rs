use super::super::domain::{sanitize_amount, Assignment, Employee, Scope, SharedGoal};
use super::super::normalizer::Weighted;

/// A shared goal as it applies to one employee.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ApplicableSharedGoal<'a> {
    pub goal: &'a SharedGoal,
    /// Sum of every matching assignment's resolved weight.
    pub total_weight: f64,
    pub scopes: Vec<&'a Scope>,
}

impl Weighted for ApplicableSharedGoal<'_> {
    fn raw_weight(&self) -> f64 {
        self.total_weight
    }
}

pub(crate) fn applicable_shared_goals<'a>(
    employee: &Employee,
    shared_goals: &'a [SharedGoal],
) -> Vec<ApplicableSharedGoal<'a>> {
    shared_goals
        .iter()
        .filter_map(|goal| {
            let matching: Vec<&Assignment> = goal
                .assignments
                .iter()
                .filter(|assignment| assignment.target.matches(employee))
                .collect();
            if matching.is_empty() {
                return None;
            }

            let total_weight: f64 = matching
                .iter()
                .map(|assignment| assignment_weight(goal, assignment, employee))
                .sum();

            Some(ApplicableSharedGoal {
                goal,
                total_weight,
                scopes: matching.iter().map(|assignment| &assignment.target).collect(),
            })
        })
        .collect()
}

/// Division assignments honor manager-specific overrides first, then the
/// division default, then the assignment's own weight.
fn assignment_weight(goal: &SharedGoal, assignment: &Assignment, employee: &Employee) -> f64 {
    let raw = sanitize_amount(assignment.weight);
    let Scope::Division(division) = &assignment.target else {
        return raw;
    };

    let division_override = goal.division_overrides.get(division).or_else(|| {
        goal.division_overrides
            .iter()
            .find(|(name, _)| name.trim().eq_ignore_ascii_case(division.trim()))
            .map(|(_, entry)| entry)
    });

    match division_override {
        Some(entry) => entry
            .managers
            .get(&employee.id)
            .copied()
            .or(entry.default_weight)
            .map(sanitize_amount)
            .unwrap_or(raw),
        None => raw,
    }
}
