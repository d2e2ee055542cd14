use super::config::{RuleKind, WeightRule};

/// Candidate attributes a rule is evaluated against.
pub(crate) struct Candidate<'a> {
    pub job_title: &'a str,
    pub level: &'a str,
}

pub(crate) fn rule_matches(rule: &WeightRule, candidate: &Candidate<'_>) -> bool {
    match rule.kind {
        RuleKind::Title => title_matches(&rule.matches, candidate.job_title),
        RuleKind::Level => level_matches(&rule.matches, candidate.level),
        RuleKind::Default => false,
    }
}

fn title_matches(pattern: &str, job_title: &str) -> bool {
    let pattern = pattern.trim().to_lowercase();
    if pattern.is_empty() {
        return false;
    }
    job_title.to_lowercase().contains(&pattern)
}

/// `L3`, `l-3`, `Level 3` and `3` all denote the same level. Past exact
/// equality, a rule matches any level containing its numeric suffix, so `L3`
/// also covers `L13` and `Level 3 Senior`.
fn level_matches(pattern: &str, level: &str) -> bool {
    let pattern = normalize_level(pattern);
    let level = normalize_level(level);
    if pattern.is_empty() || level.is_empty() {
        return false;
    }
    if pattern == level {
        return true;
    }

    let suffix = numeric_suffix(&pattern);
    !suffix.is_empty() && level.contains(suffix)
}

fn normalize_level(value: &str) -> String {
    value
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|ch| ch.to_ascii_uppercase())
        .collect()
}

fn numeric_suffix(value: &str) -> &str {
    let digits = value
        .bytes()
        .rev()
        .take_while(u8::is_ascii_digit)
        .count();
    &value[value.len() - digits..]
}
