//! Resolution of an employee's shared/individual score split.

mod config;
mod rules;

pub use config::{RuleKind, WeightConfig, WeightConfigError, WeightConfigs, WeightRule, WeightSplit};

use rules::{rule_matches, Candidate};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Where a resolved split came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum SplitSource {
    Rule { kind: RuleKind, priority: i32 },
    Default,
    /// Neither a rule nor a default matched; the built-in split was used.
    Fallback,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedSplit {
    pub split: WeightSplit,
    pub source: SplitSource,
}

/// Applies the prioritized rule sets in `WeightConfigs`.
#[derive(Debug, Clone)]
pub struct WeightRuleResolver {
    configs: WeightConfigs,
}

impl WeightRuleResolver {
    pub fn new(configs: WeightConfigs) -> Self {
        Self { configs }
    }

    pub fn configs(&self) -> &WeightConfigs {
        &self.configs
    }

    pub fn resolve(&self, company: &str, job_title: &str, level: &str) -> ResolvedSplit {
        let resolved = resolve_in(self.configs.for_company(company), job_title, level);
        match resolved.source {
            SplitSource::Fallback => warn!(
                company,
                "weight configuration has no default rule, using built-in split"
            ),
            source => debug!(company, job_title, level, ?source, "resolved weight split"),
        }
        resolved
    }

    /// Like [`resolve`](Self::resolve) but reports a missing default rule
    /// instead of falling back.
    pub fn resolve_strict(
        &self,
        company: &str,
        job_title: &str,
        level: &str,
    ) -> Result<ResolvedSplit, WeightConfigError> {
        let resolved = self.resolve(company, job_title, level);
        if resolved.source == SplitSource::Fallback {
            return Err(WeightConfigError::MissingDefault {
                company: Some(company.to_string()),
            });
        }
        Ok(resolved)
    }
}

fn resolve_in(config: &WeightConfig, job_title: &str, level: &str) -> ResolvedSplit {
    let mut ordered: Vec<&WeightRule> = config.rules.iter().collect();
    ordered.sort_by_key(|rule| rule.priority);

    let candidate = Candidate { job_title, level };
    if let Some(rule) = ordered
        .iter()
        .find(|rule| rule_matches(rule, &candidate))
    {
        return ResolvedSplit {
            split: rule.split(),
            source: SplitSource::Rule {
                kind: rule.kind,
                priority: rule.priority,
            },
        };
    }

    match ordered.iter().find(|rule| rule.kind == RuleKind::Default) {
        Some(rule) => ResolvedSplit {
            split: rule.split(),
            source: SplitSource::Default,
        },
        None => ResolvedSplit {
            split: WeightSplit::FALLBACK,
            source: SplitSource::Fallback,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn resolver() -> WeightRuleResolver {
        let mut companies = BTreeMap::new();
        companies.insert(
            "Acme".to_string(),
            WeightConfig::new(vec![
                WeightRule::new(RuleKind::Default, "", 20, 100),
                WeightRule::new(RuleKind::Level, "L3", 10, 5),
                WeightRule::new(RuleKind::Title, "manager", 40, 1),
                WeightRule::new(RuleKind::Title, "engineering", 30, 5),
            ]),
        );
        companies.insert(
            "Initech".to_string(),
            WeightConfig::new(vec![WeightRule::new(RuleKind::Title, "director", 50, 1)]),
        );
        WeightRuleResolver::new(WeightConfigs::new(companies))
    }

    #[test]
    fn lowest_priority_number_wins() {
        let resolved = resolver().resolve("Acme", "Engineering Manager", "L3");
        assert_eq!(resolved.split.shared_pct, 40);
        assert_eq!(
            resolved.source,
            SplitSource::Rule {
                kind: RuleKind::Title,
                priority: 1
            }
        );
    }

    #[test]
    fn equal_priorities_keep_declaration_order() {
        let resolved = resolver().resolve("Acme", "Engineering Analyst", "L3");
        assert_eq!(
            resolved.split,
            WeightSplit {
                shared_pct: 10,
                individual_pct: 90
            }
        );
        assert_eq!(
            resolved.source,
            SplitSource::Rule {
                kind: RuleKind::Level,
                priority: 5
            }
        );
    }

    #[test]
    fn level_rules_cover_levels_containing_their_number() {
        let resolver = resolver();
        for level in ["L13", "Level 3 Senior", "l-3"] {
            let resolved = resolver.resolve("Acme", "Designer", level);
            assert_eq!(resolved.split.shared_pct, 10, "level {level}");
        }
        assert_eq!(resolver.resolve("Acme", "Designer", "L4").split.shared_pct, 20);
    }

    #[test]
    fn unmatched_employees_use_the_company_default() {
        let resolved = resolver().resolve("Acme", "Designer", "L7");
        assert_eq!(resolved.split.shared_pct, 20);
        assert_eq!(resolved.source, SplitSource::Default);
    }

    #[test]
    fn unknown_companies_use_the_baseline() {
        let resolved = resolver().resolve("Globex", "Designer", "L3");
        assert_eq!(resolved.split.shared_pct, 10);
        assert_eq!(resolved.source, SplitSource::Default);
    }

    #[test]
    fn missing_default_falls_back_or_errors_in_strict_mode() {
        let resolver = resolver();
        let resolved = resolver.resolve("Initech", "Analyst", "L2");
        assert_eq!(resolved.split, WeightSplit::FALLBACK);
        assert_eq!(resolved.source, SplitSource::Fallback);

        let err = resolver
            .resolve_strict("Initech", "Analyst", "L2")
            .expect_err("strict mode rejects fallback");
        assert!(err.to_string().contains("Initech"));

        assert!(resolver
            .resolve_strict("Initech", "Regional Director", "L1")
            .is_ok());
    }
}
