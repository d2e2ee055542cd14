use chrono::NaiveDate;
use perf_review::error::AppError;
use perf_review::review::roster::{attach_goals, RosterImporter};
use perf_review::review::{
    Employee, EmployeeId, Goal, ProgressConfig, RatingConfig, ReviewConfigs, SharedGoal,
    WeightConfigs,
};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::path::Path;
use tracing::{info, warn};

pub(crate) const SHARED_GOALS_KEY: &str = "shared_goals";
pub(crate) const EMPLOYEES_KEY: &str = "employees";

/// Everything one review run needs, read from a single JSON document.
///
/// The document uses the persisted keys (`weight_config_v1`,
/// `rating_config_<cycle>`, `progress_config_v1`) plus `shared_goals` and
/// `employees`. Missing configs fall back to the library baselines.
#[derive(Debug, Clone)]
pub(crate) struct ReviewBundle {
    pub(crate) configs: ReviewConfigs,
    pub(crate) shared_goals: Vec<SharedGoal>,
    pub(crate) employees: Vec<Employee>,
    /// Storage keys that were absent and replaced with a baseline.
    pub(crate) substituted: Vec<String>,
}

impl ReviewBundle {
    pub(crate) fn from_path(path: &Path, cycle: &str) -> Result<Self, AppError> {
        let raw = std::fs::read_to_string(path)?;
        let bundle = Self::from_json(&raw, cycle)?;
        info!(
            path = %path.display(),
            employees = bundle.employees.len(),
            shared_goals = bundle.shared_goals.len(),
            "loaded review bundle"
        );
        Ok(bundle)
    }

    pub(crate) fn from_json(raw: &str, cycle: &str) -> Result<Self, AppError> {
        let mut document: Map<String, Value> = serde_json::from_str(raw)?;
        let mut substituted = Vec::new();

        let weights = take_section(&mut document, WeightConfigs::STORAGE_KEY)?
            .unwrap_or_else(|| {
                substituted.push(WeightConfigs::STORAGE_KEY.to_string());
                WeightConfigs::default()
            });

        let rating_key = RatingConfig::storage_key(cycle);
        let mut rating: RatingConfig = match take_section(&mut document, &rating_key)? {
            Some(rating) => rating,
            None => {
                substituted.push(rating_key);
                RatingConfig::default_six_level(cycle)
            }
        };
        if rating.cycle.trim().is_empty() {
            rating.cycle = cycle.to_string();
        }

        let progress = take_section(&mut document, ProgressConfig::STORAGE_KEY)?
            .unwrap_or_else(|| {
                substituted.push(ProgressConfig::STORAGE_KEY.to_string());
                ProgressConfig::baseline()
            });

        let shared_goals = take_section(&mut document, SHARED_GOALS_KEY)?.unwrap_or_default();
        let employees = take_section(&mut document, EMPLOYEES_KEY)?.unwrap_or_default();

        for key in &substituted {
            warn!(key = %key, "configuration missing from bundle, using baseline");
        }

        Ok(Self {
            configs: ReviewConfigs {
                weights,
                rating,
                progress,
            },
            shared_goals,
            employees,
            substituted,
        })
    }

    /// Replace bundle employees with a roster export, keeping their goals.
    pub(crate) fn with_roster(mut self, path: &Path) -> Result<Self, AppError> {
        let mut roster = RosterImporter::from_path(path)?;
        let goals: HashMap<EmployeeId, Vec<Goal>> = self
            .employees
            .drain(..)
            .map(|employee| (employee.id, employee.goals))
            .collect();

        for orphan in attach_goals(&mut roster, goals) {
            warn!(employee = %orphan, "goals supplied for an employee missing from the roster");
        }

        self.employees = roster;
        Ok(self)
    }
}

fn take_section<T: DeserializeOwned>(
    document: &mut Map<String, Value>,
    key: &str,
) -> Result<Option<T>, serde_json::Error> {
    document
        .remove(key)
        .filter(|value| !value.is_null())
        .map(serde_json::from_value)
        .transpose()
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}
