use std::collections::BTreeMap;

use crate::review::domain::{
    Assignment, DivisionWeightOverride, Employee, EmployeeId, Goal, Scope, SharedGoal,
};
use crate::review::hierarchy::OrgChart;
use crate::review::progress::{CascadeMode, LevelWeight, ProgressAggregator, ProgressConfig};
use crate::review::rating::RatingConfig;
use crate::review::scoring::ScoreAggregator;
use crate::review::weights::{RuleKind, WeightConfig, WeightConfigs, WeightRule};

pub(super) const EPSILON: f64 = 1e-9;

pub(super) fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < EPSILON,
        "expected {expected}, got {actual}"
    );
}

pub(super) fn weight_configs() -> WeightConfigs {
    let mut companies = BTreeMap::new();
    companies.insert(
        "Acme".to_string(),
        WeightConfig::new(vec![
            WeightRule::new(RuleKind::Level, "L3", 10, 2),
            WeightRule::new(RuleKind::Title, "manager", 30, 1),
            WeightRule::new(RuleKind::Default, "", 20, 99),
        ]),
    );
    companies.insert(
        "Initech".to_string(),
        WeightConfig::new(vec![WeightRule::new(RuleKind::Title, "director", 50, 1)]),
    );
    WeightConfigs::new(companies)
}

pub(super) fn aggregator() -> ScoreAggregator {
    ScoreAggregator::new(weight_configs(), RatingConfig::default_six_level("2025"))
}

pub(super) fn employee(id: &str, level: &str, job_title: &str) -> Employee {
    let mut employee = Employee::new(id, format!("Employee {id}"));
    employee.company = "Acme".to_string();
    employee.division = "Platform".to_string();
    employee.level = level.to_string();
    employee.job_title = job_title.to_string();
    employee
}

pub(super) fn shared_goal(id: &str, rating: f64, assignments: Vec<Assignment>) -> SharedGoal {
    SharedGoal {
        id: id.to_string(),
        title: format!("Shared {id}"),
        rating,
        targets: Vec::new(),
        assignments,
        division_overrides: BTreeMap::new(),
    }
}

/// Global, division (with overrides for manager M1) and company goals.
pub(super) fn shared_goals() -> Vec<SharedGoal> {
    let mut platform = shared_goal(
        "sg-platform",
        3.0,
        vec![Assignment::new(Scope::Division("Platform".to_string()), 0.1)],
    );
    let mut managers = BTreeMap::new();
    managers.insert(EmployeeId::new("M1"), 0.2);
    platform.division_overrides.insert(
        "Platform".to_string(),
        DivisionWeightOverride {
            default_weight: Some(0.15),
            managers,
        },
    );

    vec![
        shared_goal("sg-global", 5.0, vec![Assignment::new(Scope::Global, 0.05)]),
        platform,
        shared_goal(
            "sg-acme",
            4.0,
            vec![Assignment::new(Scope::Company("Acme".to_string()), 0.05)],
        ),
        shared_goal(
            "sg-globex",
            6.0,
            vec![Assignment::new(Scope::Company("Globex".to_string()), 0.5)],
        ),
    ]
}

pub(super) fn progress_config(mode: CascadeMode) -> ProgressConfig {
    let mut level_weights = BTreeMap::new();
    level_weights.insert("L2".to_string(), LevelWeight::new(60, 40));
    level_weights.insert("L3".to_string(), LevelWeight::new(50, 50));
    level_weights.insert("L5".to_string(), LevelWeight::new(100, 0));
    level_weights.insert("default".to_string(), LevelWeight::new(80, 20));

    let mut team_member_weights = BTreeMap::new();
    team_member_weights.insert("L3".to_string(), 20.0);
    team_member_weights.insert("L4".to_string(), 30.0);
    team_member_weights.insert("default".to_string(), 10.0);

    ProgressConfig {
        cascade_mode: mode,
        level_weights,
        team_member_weights,
    }
}

pub(super) fn progress_aggregator(mode: CascadeMode) -> ProgressAggregator {
    ProgressAggregator::new(progress_config(mode))
}

/// Employee reporting to `manager` with one goal per progress value.
pub(super) fn member(id: &str, level: &str, manager: Option<&str>, progress: &[f64]) -> Employee {
    let mut employee = employee(id, level, "Engineer");
    employee.manager_ref = manager.map(str::to_string);
    employee.goals = progress
        .iter()
        .enumerate()
        .map(|(index, value)| Goal::new(format!("Goal {index}"), 0.3, 4.0).with_progress(*value))
        .collect();
    employee
}

pub(super) fn chart(employees: Vec<Employee>) -> OrgChart {
    OrgChart::build(employees).0
}

pub(super) fn id(value: &str) -> EmployeeId {
    EmployeeId::new(value)
}
