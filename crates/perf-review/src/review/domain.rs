use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{de::IgnoredAny, Deserialize, Deserializer, Serialize};

/// Identifier wrapper for employees.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EmployeeId(pub String);

impl EmployeeId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EmployeeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Employment state carried on roster records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EmployeeStatus {
    Active,
    OnLeave,
    Inactive,
}

impl EmployeeStatus {
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().replace([' ', '-'], "_").as_str() {
            "on_leave" | "leave" => Self::OnLeave,
            "inactive" | "resigned" | "terminated" | "left" => Self::Inactive,
            _ => Self::Active,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            EmployeeStatus::Active => "active",
            EmployeeStatus::OnLeave => "on_leave",
            EmployeeStatus::Inactive => "inactive",
        }
    }

    pub const fn is_reviewable(self) -> bool {
        !matches!(self, EmployeeStatus::Inactive)
    }
}

impl Default for EmployeeStatus {
    fn default() -> Self {
        Self::Active
    }
}

impl From<String> for EmployeeStatus {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<EmployeeStatus> for String {
    fn from(value: EmployeeStatus) -> Self {
        value.label().to_string()
    }
}

/// Roster entry together with the employee's individual goals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    pub id: EmployeeId,
    pub name: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub level: String,
    #[serde(default)]
    pub job_title: String,
    #[serde(default)]
    pub division: String,
    /// Free-text manager reference (id or name) as captured on the roster.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manager_ref: Option<String>,
    /// Resolved manager, filled in once by `OrgChart::build`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manager_id: Option<EmployeeId>,
    #[serde(default)]
    pub status: EmployeeStatus,
    #[serde(default)]
    pub goals: Vec<Goal>,
}

impl Employee {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: EmployeeId::new(id),
            name: name.into(),
            company: String::new(),
            level: String::new(),
            job_title: String::new(),
            division: String::new(),
            manager_ref: None,
            manager_id: None,
            status: EmployeeStatus::Active,
            goals: Vec::new(),
        }
    }
}

/// Individual objective owned by one employee.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Goal {
    pub title: String,
    /// Fraction of the total score, authored independently of the allocation.
    #[serde(default, deserialize_with = "lenient_amount")]
    pub weight: f64,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub rating: f64,
    /// One target description per rating level.
    #[serde(default)]
    pub targets: Vec<String>,
    #[serde(
        default,
        deserialize_with = "lenient_progress",
        skip_serializing_if = "Option::is_none"
    )]
    pub progress: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_context: Option<String>,
}

impl Goal {
    pub const TARGET_COUNT: usize = 6;

    pub fn new(title: impl Into<String>, weight: f64, rating: f64) -> Self {
        Self {
            title: title.into(),
            weight,
            rating,
            targets: Vec::new(),
            progress: None,
            company_context: None,
        }
    }

    pub fn with_progress(mut self, progress: f64) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Progress clamped to `[0, 100]`; `None` when never reported.
    pub fn progress_pct(&self) -> Option<f64> {
        self.progress
            .filter(|value| value.is_finite())
            .map(|value| value.clamp(0.0, 100.0))
    }
}

/// Company, division, or global objective rated once and shared by every
/// employee its assignments reach.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SharedGoal {
    pub id: String,
    pub title: String,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub rating: f64,
    #[serde(default)]
    pub targets: Vec<String>,
    #[serde(default)]
    pub assignments: Vec<Assignment>,
    /// Per-division weight overrides keyed by division name.
    #[serde(default)]
    pub division_overrides: BTreeMap<String, DivisionWeightOverride>,
}

/// Binds a shared goal to a scope with the weight it carries there.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    pub target: Scope,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub weight: f64,
}

impl Assignment {
    pub fn new(target: Scope, weight: f64) -> Self {
        Self { target, weight }
    }
}

/// Manager-level weights inside a division-targeted shared goal.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DivisionWeightOverride {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_weight: Option<f64>,
    #[serde(default)]
    pub managers: BTreeMap<EmployeeId, f64>,
}

/// Reach of a shared-goal assignment.
///
/// Persisted as the tag strings `GLOBAL_ALL`, `COMP_<company>`,
/// `DIV_<division>` and `ID_<employee id>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Scope {
    Global,
    Company(String),
    Division(String),
    Individual(EmployeeId),
}

impl Scope {
    pub fn matches(&self, employee: &Employee) -> bool {
        match self {
            Scope::Global => true,
            Scope::Company(company) => same_name(company, &employee.company),
            Scope::Division(division) => same_name(division, &employee.division),
            Scope::Individual(id) => *id == employee.id,
        }
    }
}

fn same_name(expected: &str, actual: &str) -> bool {
    let actual = actual.trim();
    !actual.is_empty() && expected.trim().eq_ignore_ascii_case(actual)
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScopeParseError {
    #[error("unknown assignment scope tag '{0}'")]
    UnknownTag(String),
    #[error("assignment scope tag '{0}' is missing its name")]
    EmptyName(String),
}

impl FromStr for Scope {
    type Err = ScopeParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let tag = value.trim();
        if tag == "GLOBAL_ALL" {
            return Ok(Scope::Global);
        }

        let (prefix, rest) = ["COMP_", "DIV_", "ID_"]
            .into_iter()
            .find_map(|prefix| tag.strip_prefix(prefix).map(|rest| (prefix, rest)))
            .ok_or_else(|| ScopeParseError::UnknownTag(tag.to_string()))?;

        if rest.trim().is_empty() {
            return Err(ScopeParseError::EmptyName(tag.to_string()));
        }

        let name = rest.to_string();
        Ok(match prefix {
            "COMP_" => Scope::Company(name),
            "DIV_" => Scope::Division(name),
            _ => Scope::Individual(EmployeeId(name)),
        })
    }
}

impl TryFrom<String> for Scope {
    type Error = ScopeParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::Global => f.write_str("GLOBAL_ALL"),
            Scope::Company(company) => write!(f, "COMP_{company}"),
            Scope::Division(division) => write!(f, "DIV_{division}"),
            Scope::Individual(id) => write!(f, "ID_{id}"),
        }
    }
}

impl From<Scope> for String {
    fn from(value: Scope) -> Self {
        value.to_string()
    }
}

/// Non-finite and negative amounts count as zero.
pub fn sanitize_amount(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LenientNumber {
    Number(f64),
    Text(String),
    Other(IgnoredAny),
}

impl LenientNumber {
    fn value(self) -> Option<f64> {
        let value = match self {
            LenientNumber::Number(value) => Some(value),
            LenientNumber::Text(text) => text.trim().trim_end_matches('%').trim().parse().ok(),
            LenientNumber::Other(_) => None,
        };
        value.filter(|value: &f64| value.is_finite())
    }
}

fn lenient_amount<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = LenientNumber::deserialize(deserializer)?;
    Ok(raw.value().map(sanitize_amount).unwrap_or(0.0))
}

fn lenient_progress<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = LenientNumber::deserialize(deserializer)?;
    Ok(raw.value().map(|value| value.clamp(0.0, 100.0)))
}
