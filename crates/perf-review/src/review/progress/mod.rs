//! Blended individual/team progress for managers.

mod config;

pub use config::{CascadeMode, LevelWeight, ProgressConfig, ProgressConfigError, DEFAULT_KEY};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::domain::{Employee, EmployeeId};
use super::hierarchy::OrgChart;

pub const DEFAULT_MAX_DEPTH: usize = 50;

/// Progress of one direct report as it entered the team average.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberProgress {
    pub employee_id: EmployeeId,
    pub level: String,
    pub weight: f64,
    pub progress_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressSummary {
    pub employee_id: EmployeeId,
    pub individual_pct: f64,
    pub team_pct: f64,
    pub overall_pct: f64,
    /// Split applied to this employee. Anyone without direct reports is
    /// blended at [`LevelWeight::INDIVIDUAL_ONLY`] whatever their level
    /// configures, so leaves cascade their own progress unchanged.
    pub weights_used: LevelWeight,
    pub direct_reports: Vec<MemberProgress>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProgressError {
    #[error("reporting cycle detected: {}", format_path(.path))]
    Cycle { path: Vec<EmployeeId> },
    #[error("reporting chain below {employee} exceeds {max_depth} levels")]
    DepthExceeded {
        employee: EmployeeId,
        max_depth: usize,
    },
    #[error("employee {0} is not on the org chart")]
    UnknownEmployee(EmployeeId),
}

fn format_path(path: &[EmployeeId]) -> String {
    path.iter()
        .map(EmployeeId::as_str)
        .collect::<Vec<_>>()
        .join(" -> ")
}

/// Walks the org chart under one progress configuration.
#[derive(Debug, Clone)]
pub struct ProgressAggregator {
    config: ProgressConfig,
    max_depth: usize,
}

impl ProgressAggregator {
    pub fn new(config: ProgressConfig) -> Self {
        Self {
            config,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth.max(1);
        self
    }

    pub fn with_cascade_mode(mut self, mode: CascadeMode) -> Self {
        self.config.cascade_mode = mode;
        self
    }

    pub fn config(&self) -> &ProgressConfig {
        &self.config
    }

    pub fn aggregate(
        &self,
        manager_id: &EmployeeId,
        chart: &OrgChart,
    ) -> Result<ProgressSummary, ProgressError> {
        let mut path = Vec::new();
        self.summarize(manager_id, chart, &mut path)
    }

    fn summarize<'a>(
        &self,
        id: &'a EmployeeId,
        chart: &'a OrgChart,
        path: &mut Vec<&'a EmployeeId>,
    ) -> Result<ProgressSummary, ProgressError> {
        if let Some(position) = path.iter().position(|seen| *seen == id) {
            let mut cycle: Vec<EmployeeId> = path[position..].iter().map(|id| (*id).clone()).collect();
            cycle.push(id.clone());
            return Err(ProgressError::Cycle { path: cycle });
        }
        if path.len() >= self.max_depth {
            return Err(ProgressError::DepthExceeded {
                employee: path.first().map(|id| (*id).clone()).unwrap_or_else(|| id.clone()),
                max_depth: self.max_depth,
            });
        }

        let employee = chart
            .employee(id)
            .ok_or_else(|| ProgressError::UnknownEmployee(id.clone()))?;
        let individual_pct = individual_progress(employee);
        let reports: Vec<&Employee> = chart.direct_reports(id).collect();

        let weights = if reports.is_empty() {
            LevelWeight::INDIVIDUAL_ONLY
        } else {
            self.config.level_weight(&employee.level).unwrap_or_else(|| {
                warn!(employee = %id, level = %employee.level, "no level weight configured, using individual progress only");
                LevelWeight::INDIVIDUAL_ONLY
            })
        };

        let mut direct_reports = Vec::new();
        let mut team_pct = 0.0;
        if weights.team_pct > 0 {
            path.push(id);
            for report in &reports {
                let progress_pct = match self.config.cascade_mode {
                    CascadeMode::Direct => {
                        if report.id == *id {
                            path.pop();
                            return Err(ProgressError::Cycle {
                                path: vec![id.clone(), id.clone()],
                            });
                        }
                        round1(individual_progress(report))
                    }
                    CascadeMode::Full => match self.summarize(&report.id, chart, path) {
                        Ok(summary) => summary.overall_pct,
                        Err(err) => {
                            path.pop();
                            return Err(err);
                        }
                    },
                };

                direct_reports.push(MemberProgress {
                    employee_id: report.id.clone(),
                    level: report.level.clone(),
                    weight: self.member_weight(report),
                    progress_pct,
                });
            }
            path.pop();
            team_pct = weighted_mean(&direct_reports);
        }

        let overall_pct = individual_pct * f64::from(weights.individual_pct) / 100.0
            + team_pct * f64::from(weights.team_pct) / 100.0;

        debug!(
            employee = %id,
            individual_pct,
            team_pct,
            overall_pct,
            reports = direct_reports.len(),
            "aggregated progress"
        );

        Ok(ProgressSummary {
            employee_id: id.clone(),
            individual_pct: round1(individual_pct),
            team_pct: round1(team_pct),
            overall_pct: round1(overall_pct),
            weights_used: weights,
            direct_reports,
        })
    }

    fn member_weight(&self, report: &Employee) -> f64 {
        self.config
            .member_weight(&report.level)
            .filter(|weight| weight.is_finite() && *weight >= 0.0)
            .unwrap_or(1.0)
    }
}

/// Mean of reported goal progress; goals without a value are skipped.
pub fn individual_progress(employee: &Employee) -> f64 {
    let values: Vec<f64> = employee
        .goals
        .iter()
        .filter_map(|goal| goal.progress_pct())
        .collect();
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

fn weighted_mean(members: &[MemberProgress]) -> f64 {
    let total_weight: f64 = members.iter().map(|member| member.weight).sum();
    if total_weight <= 0.0 {
        return 0.0;
    }
    members
        .iter()
        .map(|member| member.progress_pct * member.weight)
        .sum::<f64>()
        / total_weight
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
