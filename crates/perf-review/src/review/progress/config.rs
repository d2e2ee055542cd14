use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub const DEFAULT_KEY: &str = "default";

/// Whether team progress reflects direct reports' own goals only or their
/// whole downstream organization.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CascadeMode {
    #[default]
    Direct,
    Full,
}

/// Blend of personal and team progress for one level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelWeight {
    pub individual_pct: u8,
    pub team_pct: u8,
}

impl LevelWeight {
    pub const INDIVIDUAL_ONLY: LevelWeight = LevelWeight {
        individual_pct: 100,
        team_pct: 0,
    };

    pub const fn new(individual_pct: u8, team_pct: u8) -> Self {
        Self {
            individual_pct,
            team_pct,
        }
    }

    pub fn is_complete(&self) -> bool {
        u16::from(self.individual_pct) + u16::from(self.team_pct) == 100
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressConfig {
    #[serde(default)]
    pub cascade_mode: CascadeMode,
    #[serde(default)]
    pub level_weights: BTreeMap<String, LevelWeight>,
    /// Relative weight of a team member by level when averaging team progress.
    #[serde(default)]
    pub team_member_weights: BTreeMap<String, f64>,
}

impl ProgressConfig {
    pub const STORAGE_KEY: &'static str = "progress_config_v1";

    /// Configuration used when a cycle has none stored.
    pub fn baseline() -> Self {
        let level_weights = [
            ("L1", LevelWeight::new(30, 70)),
            ("L2", LevelWeight::new(50, 50)),
            ("L3", LevelWeight::new(70, 30)),
            (DEFAULT_KEY, LevelWeight::new(80, 20)),
        ]
        .into_iter()
        .map(|(level, weight)| (level.to_string(), weight))
        .collect();

        let team_member_weights = [(DEFAULT_KEY, 1.0)]
            .into_iter()
            .map(|(level, weight)| (level.to_string(), weight))
            .collect();

        Self {
            cascade_mode: CascadeMode::Direct,
            level_weights,
            team_member_weights,
        }
    }

    pub fn level_weight(&self, level: &str) -> Option<LevelWeight> {
        lookup(&self.level_weights, level).copied()
    }

    pub fn member_weight(&self, level: &str) -> Option<f64> {
        lookup(&self.team_member_weights, level).copied()
    }

    pub fn validate(&self) -> Result<(), ProgressConfigError> {
        if let Some((level, weight)) = self
            .level_weights
            .iter()
            .find(|(_, weight)| !weight.is_complete())
        {
            return Err(ProgressConfigError::IncompleteLevelWeight {
                level: level.clone(),
                individual_pct: weight.individual_pct,
                team_pct: weight.team_pct,
            });
        }

        if !self.level_weights.contains_key(DEFAULT_KEY) {
            return Err(ProgressConfigError::MissingDefaultLevelWeight);
        }

        if let Some((level, weight)) = self
            .team_member_weights
            .iter()
            .find(|(_, weight)| !(weight.is_finite() && **weight > 0.0))
        {
            return Err(ProgressConfigError::NonPositiveMemberWeight {
                level: level.clone(),
                weight: *weight,
            });
        }

        Ok(())
    }
}

impl Default for ProgressConfig {
    fn default() -> Self {
        Self::baseline()
    }
}

/// Exact key, then case-insensitive key, then the `default` entry.
fn lookup<'a, V>(map: &'a BTreeMap<String, V>, level: &str) -> Option<&'a V> {
    let level = level.trim();
    map.get(level)
        .or_else(|| {
            map.iter()
                .find(|(key, _)| !level.is_empty() && key.trim().eq_ignore_ascii_case(level))
                .map(|(_, value)| value)
        })
        .or_else(|| map.get(DEFAULT_KEY))
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ProgressConfigError {
    #[error("level '{level}' splits {individual_pct}/{team_pct}, which does not total 100")]
    IncompleteLevelWeight {
        level: String,
        individual_pct: u8,
        team_pct: u8,
    },
    #[error("progress configuration has no 'default' level weight")]
    MissingDefaultLevelWeight,
    #[error("team member weight for level '{level}' must be positive, found {weight}")]
    NonPositiveMemberWeight { level: String, weight: f64 },
}
