use std::collections::HashMap;

use perf_review::config::ReviewSettings;
use perf_review::review::roster::attach_goals;
use perf_review::review::{
    CascadeMode, EmployeeId, Goal, HierarchyIssue, OrgChart, ProgressConfig, RatingConfig,
    ReviewConfigs, ReviewEngine, RosterImporter, SharedGoal, WeightConfigs,
};

const ROSTER: &str = "Employee ID,Name,Company,Level,Job Title,Division,Manager,Status\n\
M1,Morgan Lee,Acme,L2,Engineering Manager,Platform,,Active\n\
E1,Ada King,Acme,L3,Engineer,Platform,morgan lee,Active\n\
E2,Alan Reed,Acme,L4,Engineer,Platform,M1,Active\n\
E3,Grace Park,Acme,L4,Engineer,Platform,Nobody Known,Inactive\n";

const WEIGHTS: &str = r#"{
    "companies": {
        "Acme": {
            "rules": [
                { "type": "level", "match": "L3", "sharedPct": 10, "individualPct": 90, "priority": 2 },
                { "type": "title", "match": "manager", "sharedPct": 30, "individualPct": 70, "priority": 1 },
                { "type": "default", "sharedPct": 20, "individualPct": 80, "priority": 99 }
            ]
        }
    }
}"#;

const SHARED_GOALS: &str = r#"[
    { "id": "sg-platform", "title": "Platform uptime", "rating": 4,
      "assignments": [ { "target": "DIV_Platform", "weight": 0.1 } ] }
]"#;

const GOALS: &str = r#"{
    "M1": [ { "title": "Hiring", "weight": 0.7, "rating": 5, "progress": 60 } ],
    "E1": [
        { "title": "Latency", "weight": 0.6, "rating": 4, "progress": 50 },
        { "title": "Docs", "weight": "0.3", "rating": "3", "progress": "90" }
    ],
    "E2": [ { "title": "On-call", "weight": 0.8, "rating": 2, "progress": 30 } ],
    "E9": [ { "title": "Left over", "weight": 1.0, "rating": 1 } ]
}"#;

fn configs(progress: ProgressConfig) -> ReviewConfigs {
    ReviewConfigs {
        weights: serde_json::from_str::<WeightConfigs>(WEIGHTS).expect("weights parse"),
        rating: RatingConfig::default_six_level("2025"),
        progress,
    }
}

fn shared_goals() -> Vec<SharedGoal> {
    serde_json::from_str(SHARED_GOALS).expect("shared goals parse")
}

fn org_chart() -> (OrgChart, Vec<HierarchyIssue>, Vec<EmployeeId>) {
    let mut employees = RosterImporter::from_reader(ROSTER.as_bytes()).expect("roster imports");
    let goals: HashMap<EmployeeId, Vec<Goal>> =
        serde_json::from_str(GOALS).expect("goals parse");
    let orphans = attach_goals(&mut employees, goals);
    let (chart, issues) = OrgChart::build(employees);
    (chart, issues, orphans)
}

fn close(actual: f64, expected: f64) -> bool {
    (actual - expected).abs() < 1e-9
}

#[test]
fn roster_goals_and_configs_score_a_full_population() {
    let (chart, issues, orphans) = org_chart();
    assert_eq!(orphans, vec![EmployeeId::new("E9")]);
    assert!(issues.iter().any(|issue| matches!(
        issue,
        HierarchyIssue::Unresolved { employee, reference }
            if employee.as_str() == "E3" && reference == "Nobody Known"
    )));

    let engine = ReviewEngine::new(configs(ProgressConfig::baseline()), shared_goals());
    let report = engine.score_population(&chart).expect("population scores");

    assert_eq!(report.summary.scored, 3);
    assert_eq!(report.summary.target_met, 2);

    let manager = report.score_for(&EmployeeId::new("M1")).expect("M1 scored");
    assert_eq!(manager.split.shared_pct, 30);
    assert!(close(manager.total, 0.4 + 3.5));
    assert_eq!(manager.tier.name(), "RUNNER");

    let engineer = report.score_for(&EmployeeId::new("E1")).expect("E1 scored");
    assert_eq!(engineer.split.shared_pct, 10);
    assert!(close(engineer.total, 0.4 + 2.4 + 0.9));
    assert_eq!(engineer.tier.name(), "RUNNER");

    let on_call = report.score_for(&EmployeeId::new("E2")).expect("E2 scored");
    assert_eq!(on_call.split.shared_pct, 20);
    assert!(close(on_call.total, 0.4 + 1.6));
    assert_eq!(on_call.tier.name(), "WALKER");

    assert!(report.score_for(&EmployeeId::new("E3")).is_none());
    assert!(close(report.summary.mean_total, (3.9 + 3.7 + 2.0) / 3.0));
}

#[test]
fn manager_progress_blends_team_members_resolved_by_name() {
    let (chart, _, _) = org_chart();
    let engine = ReviewEngine::new(configs(ProgressConfig::baseline()), shared_goals());

    let summary = engine
        .progress_for(&EmployeeId::new("M1"), &chart)
        .expect("progress aggregates");

    // E1 averages 50 and 90; E2 reports 30; L2 splits 50/50.
    assert_eq!(summary.individual_pct, 60.0);
    assert_eq!(summary.team_pct, 50.0);
    assert_eq!(summary.overall_pct, 55.0);
    assert_eq!(summary.direct_reports.len(), 2);

    let overview = engine
        .with_cascade_mode(CascadeMode::Full)
        .progress_overview(&chart);
    assert_eq!(overview.summaries.len(), 1);
    assert!(overview.failures.is_empty());
    assert_eq!(overview.summaries[0].overall_pct, 55.0);
}

#[test]
fn roster_cycles_surface_at_import_and_during_full_cascade() {
    let roster = "Employee ID,Name,Company,Level,Job Title,Division,Manager,Status\n\
A,Avery,Acme,L2,Manager,Platform,B,Active\n\
B,Blake,Acme,L2,Manager,Platform,A,Active\n";
    let employees = RosterImporter::from_reader(roster.as_bytes()).expect("roster imports");
    let (chart, issues) = OrgChart::build(employees);

    assert!(issues
        .iter()
        .any(|issue| matches!(issue, HierarchyIssue::Cycle { members } if members.len() == 2)));

    let mut progress = ProgressConfig::baseline();
    progress.cascade_mode = CascadeMode::Full;
    let engine = ReviewEngine::new(configs(progress), Vec::new());
    let overview = engine.progress_overview(&chart);

    assert!(overview.summaries.is_empty());
    assert_eq!(overview.failures.len(), 2);
}

#[test]
fn strict_settings_reject_companies_without_a_default_rule() {
    let weights = r#"{ "companies": { "Initech": { "rules": [
        { "type": "title", "match": "director", "sharedPct": 50, "individualPct": 50, "priority": 1 }
    ] } } }"#;
    let configs = ReviewConfigs {
        weights: serde_json::from_str(weights).expect("weights parse"),
        ..ReviewConfigs::baseline("2025")
    };
    assert_eq!(configs.validate().len(), 1);

    let roster = "Employee ID,Name,Company,Level,Job Title,Division,Manager,Status\n\
I1,Indra,Initech,L3,Analyst,Finance,,Active\n";
    let (chart, _) = OrgChart::build(
        RosterImporter::from_reader(roster.as_bytes()).expect("roster imports"),
    );

    let lenient = ReviewEngine::new(configs.clone(), Vec::new());
    let report = lenient.score_population(&chart).expect("lenient run scores");
    assert_eq!(report.scores[0].split.shared_pct, 5);

    let settings = ReviewSettings {
        strict_config: true,
        ..ReviewSettings::default()
    };
    let strict = ReviewEngine::with_settings(configs, Vec::new(), &settings);
    let err = strict
        .score_population(&chart)
        .expect_err("strict run rejects fallback");
    assert!(err.to_string().contains("Initech"));
}
