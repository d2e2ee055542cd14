use crate::infra::{parse_date, ReviewBundle};
use chrono::{Local, NaiveDate};
use clap::{Args, ValueEnum};
use perf_review::config::ReviewSettings;
use perf_review::error::AppError;
use perf_review::review::{
    CascadeMode, EmployeeId, EmployeeScore, HierarchyIssue, OrgChart, PreflightReport,
    ProgressOverview, ProgressSummary, ReviewEngine, ReviewReport,
};
use serde::Serialize;
use std::io::Write;
use std::path::PathBuf;
use tracing::warn;

#[derive(Args, Debug, Clone)]
pub(crate) struct BundleArgs {
    /// JSON bundle with configurations, shared goals and employees
    #[arg(long)]
    pub(crate) bundle: PathBuf,
    /// Roster CSV export replacing the bundle's employee records
    #[arg(long)]
    pub(crate) roster_csv: Option<PathBuf>,
    /// Review cycle whose rating scale to load (defaults to REVIEW_CYCLE)
    #[arg(long)]
    pub(crate) cycle: Option<String>,
    /// Evaluation date stamped on the output (defaults to today)
    #[arg(long, value_parser = parse_date)]
    pub(crate) as_of: Option<NaiveDate>,
}

#[derive(Args, Debug, Clone)]
pub(crate) struct ScoreArgs {
    #[command(flatten)]
    pub(crate) bundle: BundleArgs,
    /// Score a single employee instead of the whole population
    #[arg(long)]
    pub(crate) employee: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub(crate) struct ProgressArgs {
    #[command(flatten)]
    pub(crate) bundle: BundleArgs,
    /// Aggregate a single manager instead of every manager
    #[arg(long)]
    pub(crate) manager: Option<String>,
    /// Override the configured cascade mode
    #[arg(long, value_enum)]
    pub(crate) cascade: Option<CascadeArg>,
}

#[derive(Args, Debug, Clone)]
pub(crate) struct ValidateArgs {
    #[command(flatten)]
    pub(crate) bundle: BundleArgs,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum CascadeArg {
    Direct,
    Full,
}

impl From<CascadeArg> for CascadeMode {
    fn from(value: CascadeArg) -> Self {
        match value {
            CascadeArg::Direct => CascadeMode::Direct,
            CascadeArg::Full => CascadeMode::Full,
        }
    }
}

/// Output envelope shared by every command.
#[derive(Debug, Serialize)]
pub(crate) struct Stamped<T: Serialize> {
    pub(crate) as_of: NaiveDate,
    pub(crate) cycle: String,
    pub(crate) result: T,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub(crate) enum ScoreOutput {
    Employee(Box<EmployeeScore>),
    Population(ReviewReport),
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub(crate) enum ProgressOutput {
    Manager(ProgressSummary),
    Overview(ProgressOverview),
}

#[derive(Debug, Serialize)]
pub(crate) struct ValidationOutput {
    pub(crate) substituted: Vec<String>,
    pub(crate) config_defects: Vec<String>,
    pub(crate) hierarchy_issues: Vec<HierarchyIssue>,
    pub(crate) preflight: Vec<PreflightReport>,
}

impl ValidationOutput {
    pub(crate) fn is_clean(&self) -> bool {
        self.config_defects.is_empty()
            && self.hierarchy_issues.is_empty()
            && self.preflight.is_empty()
    }
}

/// Loaded inputs for one command run.
struct Session {
    settings: ReviewSettings,
    bundle: ReviewBundle,
    chart: OrgChart,
    issues: Vec<HierarchyIssue>,
    as_of: NaiveDate,
}

impl Session {
    fn open(args: &BundleArgs, settings: &ReviewSettings) -> Result<Self, AppError> {
        let mut settings = settings.clone();
        if let Some(cycle) = args.cycle.as_deref().map(str::trim).filter(|c| !c.is_empty()) {
            settings.cycle = cycle.to_string();
        }

        let mut bundle = ReviewBundle::from_path(&args.bundle, &settings.cycle)?;
        if let Some(roster) = &args.roster_csv {
            bundle = bundle.with_roster(roster)?;
        }

        let (chart, issues) = OrgChart::build(bundle.employees.clone());
        Ok(Self {
            settings,
            bundle,
            chart,
            issues,
            as_of: args.as_of.unwrap_or_else(|| Local::now().date_naive()),
        })
    }

    /// Engine over the bundle; strict runs refuse defective configurations.
    fn engine(&self) -> Result<ReviewEngine, AppError> {
        let mut defects = self.bundle.configs.validate();
        if self.settings.strict_config && !defects.is_empty() {
            return Err(defects.remove(0).into());
        }
        for defect in &defects {
            warn!(defect = %defect, "continuing with a defective configuration");
        }

        Ok(ReviewEngine::with_settings(
            self.bundle.configs.clone(),
            self.bundle.shared_goals.clone(),
            &self.settings,
        ))
    }

    fn stamp<T: Serialize>(&self, result: T) -> Stamped<T> {
        Stamped {
            as_of: self.as_of,
            cycle: self.settings.cycle.clone(),
            result,
        }
    }
}

pub(crate) fn run_score(args: ScoreArgs, settings: &ReviewSettings) -> Result<(), AppError> {
    let output = score(&args, settings)?;
    emit(&output)
}

pub(crate) fn run_progress(args: ProgressArgs, settings: &ReviewSettings) -> Result<(), AppError> {
    let output = progress(&args, settings)?;
    emit(&output)
}

pub(crate) fn run_validate(args: ValidateArgs, settings: &ReviewSettings) -> Result<(), AppError> {
    let output = validate(&args, settings)?;
    if !output.result.is_clean() {
        warn!(
            config_defects = output.result.config_defects.len(),
            hierarchy_issues = output.result.hierarchy_issues.len(),
            goals_needing_attention = output.result.preflight.len(),
            "review data needs attention"
        );
    }
    emit(&output)
}

pub(crate) fn score(
    args: &ScoreArgs,
    settings: &ReviewSettings,
) -> Result<Stamped<ScoreOutput>, AppError> {
    let session = Session::open(&args.bundle, settings)?;
    let engine = session.engine()?;

    let result = match &args.employee {
        Some(id) => {
            let id = EmployeeId::new(id.trim());
            let employee = session
                .chart
                .employee(&id)
                .ok_or_else(|| AppError::NotFound(format!("employee {id}")))?;
            ScoreOutput::Employee(Box::new(engine.score_employee(employee)?))
        }
        None => ScoreOutput::Population(engine.score_population(&session.chart)?),
    };
    Ok(session.stamp(result))
}

pub(crate) fn progress(
    args: &ProgressArgs,
    settings: &ReviewSettings,
) -> Result<Stamped<ProgressOutput>, AppError> {
    let session = Session::open(&args.bundle, settings)?;
    let mut engine = session.engine()?;
    if let Some(mode) = args.cascade {
        engine = engine.with_cascade_mode(mode.into());
    }

    let result = match &args.manager {
        Some(id) => {
            let id = EmployeeId::new(id.trim());
            ProgressOutput::Manager(engine.progress_for(&id, &session.chart)?)
        }
        None => ProgressOutput::Overview(engine.progress_overview(&session.chart)),
    };
    Ok(session.stamp(result))
}

pub(crate) fn validate(
    args: &ValidateArgs,
    settings: &ReviewSettings,
) -> Result<Stamped<ValidationOutput>, AppError> {
    let session = Session::open(&args.bundle, settings)?;
    let config_defects = session
        .bundle
        .configs
        .validate()
        .iter()
        .map(ToString::to_string)
        .collect();

    let engine = ReviewEngine::with_settings(
        session.bundle.configs.clone(),
        session.bundle.shared_goals.clone(),
        &session.settings,
    );
    let preflight = engine
        .preflight(&session.chart)
        .into_iter()
        .filter(|report| !report.is_ready())
        .collect();

    let output = ValidationOutput {
        substituted: session.bundle.substituted.clone(),
        config_defects,
        hierarchy_issues: session.issues.clone(),
        preflight,
    };
    Ok(session.stamp(output))
}

fn emit<T: Serialize>(value: &T) -> Result<(), AppError> {
    let stdout = std::io::stdout();
    let mut handle = stdout.lock();
    serde_json::to_writer_pretty(&mut handle, value)?;
    writeln!(handle)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use perf_review::review::{ProgressError, TierOutcome};
    use tempfile::NamedTempFile;

    const BUNDLE: &str = r#"{
        "weight_config_v1": {
            "companies": {
                "Acme": {
                    "rules": [
                        { "type": "title", "match": "manager", "sharedPct": 30, "individualPct": 70, "priority": 1 },
                        { "type": "default", "sharedPct": 10, "individualPct": 90, "priority": 99 }
                    ]
                },
                "Initech": {
                    "rules": [
                        { "type": "title", "match": "director", "sharedPct": 50, "individualPct": 50, "priority": 1 }
                    ]
                }
            }
        },
        "progress_config_v1": {
            "cascadeMode": "full",
            "levelWeights": {
                "L2": { "individualPct": 60, "teamPct": 40 },
                "L3": { "individualPct": 50, "teamPct": 50 },
                "default": { "individualPct": 80, "teamPct": 20 }
            },
            "teamMemberWeights": { "default": 1 }
        },
        "shared_goals": [
            { "id": "sg-1", "title": "Revenue", "rating": 5, "assignments": [ { "target": "COMP_Acme", "weight": 0.3 } ] }
        ],
        "employees": [
            { "id": "M", "name": "Morgan", "company": "Acme", "level": "L2", "jobTitle": "Engineering Manager",
              "goals": [ { "title": "Hiring", "weight": 0.7, "rating": 5, "progress": 80 } ] },
            { "id": "S", "name": "Sam", "company": "Acme", "level": "L3", "jobTitle": "Engineer", "managerRef": "Morgan",
              "goals": [ { "title": "Latency", "weight": 0.9, "rating": 4, "progress": 40 } ] },
            { "id": "X", "name": "Xiu", "company": "Acme", "level": "L4", "jobTitle": "Engineer", "managerRef": "S",
              "goals": [ { "title": "Docs", "weight": 0.9, "rating": 3, "progress": 80 } ] }
        ]
    }"#;

    fn bundle_file(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("temp bundle");
        file.write_all(contents.as_bytes()).expect("bundle written");
        file
    }

    fn bundle_args(file: &NamedTempFile) -> BundleArgs {
        BundleArgs {
            bundle: file.path().to_path_buf(),
            roster_csv: None,
            cycle: None,
            as_of: NaiveDate::from_ymd_opt(2025, 12, 31),
        }
    }

    #[test]
    fn score_single_employee_from_bundle() {
        let file = bundle_file(BUNDLE);
        let args = ScoreArgs {
            bundle: bundle_args(&file),
            employee: Some("M".to_string()),
        };

        let output = score(&args, &ReviewSettings::default()).expect("scores");

        assert_eq!(output.cycle, "2025");
        match output.result {
            ScoreOutput::Employee(score) => {
                // 0.3 shared at rating 5 plus 0.7 individual at rating 5.
                assert!((score.total - 5.0).abs() < 1e-9);
                assert!(matches!(score.tier, TierOutcome::Matched { .. }));
                assert_eq!(score.tier.name(), "SPRINTER");
            }
            other => panic!("expected single score, got {other:?}"),
        }
    }

    #[test]
    fn score_unknown_employee_is_not_found() {
        let file = bundle_file(BUNDLE);
        let args = ScoreArgs {
            bundle: bundle_args(&file),
            employee: Some("nobody".to_string()),
        };

        let err = score(&args, &ReviewSettings::default()).expect_err("missing employee");
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[test]
    fn progress_honours_cascade_override() {
        let file = bundle_file(BUNDLE);
        let mut args = ProgressArgs {
            bundle: bundle_args(&file),
            manager: Some("M".to_string()),
            cascade: None,
        };

        let full = progress(&args, &ReviewSettings::default()).expect("full progress");
        args.cascade = Some(CascadeArg::Direct);
        let direct = progress(&args, &ReviewSettings::default()).expect("direct progress");

        match (full.result, direct.result) {
            (ProgressOutput::Manager(full), ProgressOutput::Manager(direct)) => {
                // S blends 40 with team 80 at 50/50 before M sees it.
                assert_eq!(full.team_pct, 60.0);
                assert_eq!(full.overall_pct, 72.0);
                assert_eq!(direct.team_pct, 40.0);
                assert_eq!(direct.overall_pct, 64.0);
            }
            other => panic!("expected manager summaries, got {other:?}"),
        }
    }

    #[test]
    fn progress_depth_follows_settings() {
        let file = bundle_file(BUNDLE);
        let args = ProgressArgs {
            bundle: bundle_args(&file),
            manager: Some("M".to_string()),
            cascade: None,
        };
        let settings = ReviewSettings {
            max_depth: 1,
            ..ReviewSettings::default()
        };

        let err = progress(&args, &settings).expect_err("depth bound");
        assert!(matches!(
            err,
            AppError::Progress(ProgressError::DepthExceeded { max_depth: 1, .. })
        ));
    }

    #[test]
    fn strict_runs_reject_defective_configs_but_validate_reports_them() {
        let file = bundle_file(BUNDLE);
        let strict = ReviewSettings {
            strict_config: true,
            ..ReviewSettings::default()
        };
        let args = ScoreArgs {
            bundle: bundle_args(&file),
            employee: None,
        };

        let err = score(&args, &strict).expect_err("Initech lacks a default rule");
        assert!(matches!(err, AppError::ReviewConfig(_)));

        let report = validate(
            &ValidateArgs {
                bundle: bundle_args(&file),
            },
            &strict,
        )
        .expect("validation runs");
        assert!(!report.result.is_clean());
        assert_eq!(report.result.config_defects.len(), 1);
        assert!(report.result.config_defects[0].contains("Initech"));
        assert_eq!(
            report.result.substituted,
            vec!["rating_config_2025".to_string()]
        );
        assert!(report.result.hierarchy_issues.is_empty());
    }

    #[test]
    fn output_is_stamped_with_the_evaluation_date() {
        let file = bundle_file(BUNDLE);
        let args = ScoreArgs {
            bundle: bundle_args(&file),
            employee: None,
        };

        let output = score(&args, &ReviewSettings::default()).expect("scores");
        let json = serde_json::to_value(&output).expect("serializes");

        assert_eq!(json["as_of"], "2025-12-31");
        assert_eq!(json["result"]["summary"]["scored"], 3);
    }
}
