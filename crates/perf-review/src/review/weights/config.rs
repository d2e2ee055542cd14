use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Kind of criterion a weight rule matches on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleKind {
    Title,
    Level,
    Default,
}

impl RuleKind {
    pub const fn label(self) -> &'static str {
        match self {
            RuleKind::Title => "title",
            RuleKind::Level => "level",
            RuleKind::Default => "default",
        }
    }
}

/// Shared/individual split applied to employees matching `matches`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeightRule {
    #[serde(rename = "type")]
    pub kind: RuleKind,
    #[serde(rename = "match", default)]
    pub matches: String,
    pub shared_pct: u8,
    pub individual_pct: u8,
    /// Lower number takes precedence.
    #[serde(default)]
    pub priority: i32,
}

impl WeightRule {
    pub fn new(kind: RuleKind, matches: impl Into<String>, shared_pct: u8, priority: i32) -> Self {
        Self {
            kind,
            matches: matches.into(),
            shared_pct,
            individual_pct: 100u8.saturating_sub(shared_pct),
            priority,
        }
    }

    pub fn split(&self) -> WeightSplit {
        WeightSplit {
            shared_pct: self.shared_pct,
            individual_pct: self.individual_pct,
        }
    }
}

/// Percentages of the total score drawn from shared and individual goals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeightSplit {
    pub shared_pct: u8,
    pub individual_pct: u8,
}

impl WeightSplit {
    /// Split used when a company configuration lacks a default rule.
    pub const FALLBACK: WeightSplit = WeightSplit {
        shared_pct: 5,
        individual_pct: 95,
    };

    pub fn is_complete(&self) -> bool {
        u16::from(self.shared_pct) + u16::from(self.individual_pct) == 100
    }
}

/// Ordered rule set for a single company.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeightConfig {
    #[serde(default)]
    pub rules: Vec<WeightRule>,
}

impl WeightConfig {
    pub fn new(rules: Vec<WeightRule>) -> Self {
        Self { rules }
    }

    /// Baseline substituted for companies without their own configuration.
    pub fn baseline() -> Self {
        Self::new(vec![WeightRule::new(RuleKind::Default, "", 10, 999)])
    }

    pub fn default_rule(&self) -> Option<&WeightRule> {
        self.rules.iter().find(|rule| rule.kind == RuleKind::Default)
    }

    /// Save-time checks: every split totals 100 and exactly one default
    /// rule terminates the set.
    pub fn validate(&self) -> Result<(), WeightConfigError> {
        if let Some((index, rule)) = self
            .rules
            .iter()
            .enumerate()
            .find(|(_, rule)| !rule.split().is_complete())
        {
            return Err(WeightConfigError::IncompleteSplit {
                index,
                shared_pct: rule.shared_pct,
                individual_pct: rule.individual_pct,
            });
        }

        match self
            .rules
            .iter()
            .filter(|rule| rule.kind == RuleKind::Default)
            .count()
        {
            1 => Ok(()),
            0 => Err(WeightConfigError::MissingDefault {
                company: None,
            }),
            count => Err(WeightConfigError::DuplicateDefault { count }),
        }
    }
}

/// Per-company rule sets plus the baseline applied to everyone else.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeightConfigs {
    #[serde(default)]
    pub companies: BTreeMap<String, WeightConfig>,
    #[serde(default = "WeightConfig::baseline")]
    pub baseline: WeightConfig,
}

impl Default for WeightConfigs {
    fn default() -> Self {
        Self {
            companies: BTreeMap::new(),
            baseline: WeightConfig::baseline(),
        }
    }
}

impl WeightConfigs {
    pub const STORAGE_KEY: &'static str = "weight_config_v1";

    pub fn new(companies: BTreeMap<String, WeightConfig>) -> Self {
        Self {
            companies,
            ..Self::default()
        }
    }

    /// Company rule set, or the baseline when the company has none.
    pub fn for_company(&self, company: &str) -> &WeightConfig {
        let company = company.trim();
        self.companies
            .get(company)
            .or_else(|| {
                self.companies
                    .iter()
                    .find(|(name, _)| name.trim().eq_ignore_ascii_case(company))
                    .map(|(_, config)| config)
            })
            .unwrap_or(&self.baseline)
    }

    pub fn has_company(&self, company: &str) -> bool {
        !std::ptr::eq(self.for_company(company), &self.baseline)
    }

    /// Validate every company set, identifying the first defective company.
    pub fn validate(&self) -> Result<(), WeightConfigError> {
        self.baseline.validate().map_err(|err| err.for_company("baseline"))?;
        for (company, config) in &self.companies {
            config.validate().map_err(|err| err.for_company(company))?;
        }
        Ok(())
    }
}

/// Configuration defects in weight rules.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WeightConfigError {
    #[error("rule {index} splits {shared_pct}/{individual_pct}, which does not total 100")]
    IncompleteSplit {
        index: usize,
        shared_pct: u8,
        individual_pct: u8,
    },
    #[error("weight configuration{} has no default rule", company_suffix(.company))]
    MissingDefault { company: Option<String> },
    #[error("weight configuration defines {count} default rules")]
    DuplicateDefault { count: usize },
    #[error("company '{company}': {source}")]
    Company {
        company: String,
        #[source]
        source: Box<WeightConfigError>,
    },
}

impl WeightConfigError {
    fn for_company(self, company: &str) -> Self {
        match self {
            WeightConfigError::MissingDefault { company: None } => {
                WeightConfigError::MissingDefault {
                    company: Some(company.to_string()),
                }
            }
            other => WeightConfigError::Company {
                company: company.to_string(),
                source: Box::new(other),
            },
        }
    }
}

fn company_suffix(company: &Option<String>) -> String {
    company
        .as_deref()
        .map(|company| format!(" for '{company}'"))
        .unwrap_or_default()
}
