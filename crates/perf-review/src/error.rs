use crate::config::ConfigError;
use crate::review::progress::ProgressError;
use crate::review::ConfigDefect;
use crate::review::roster::RosterImportError;
use crate::review::scoring::ScoringError;
use crate::telemetry::TelemetryError;
use std::fmt;

/// Host-level failure surfaced by binaries embedding the engine.
#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Json(serde_json::Error),
    Roster(RosterImportError),
    Scoring(ScoringError),
    Progress(ProgressError),
    ReviewConfig(ConfigDefect),
    NotFound(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Json(err) => write!(f, "invalid review data: {}", err),
            AppError::Roster(err) => write!(f, "roster error: {}", err),
            AppError::Scoring(err) => write!(f, "scoring error: {}", err),
            AppError::Progress(err) => write!(f, "progress error: {}", err),
            AppError::ReviewConfig(err) => write!(f, "invalid review configuration: {}", err),
            AppError::NotFound(what) => write!(f, "not found: {}", what),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Json(err) => Some(err),
            AppError::Roster(err) => Some(err),
            AppError::Scoring(err) => Some(err),
            AppError::Progress(err) => Some(err),
            AppError::ReviewConfig(err) => Some(err),
            AppError::NotFound(_) => None,
        }
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

impl From<RosterImportError> for AppError {
    fn from(value: RosterImportError) -> Self {
        Self::Roster(value)
    }
}

impl From<ScoringError> for AppError {
    fn from(value: ScoringError) -> Self {
        Self::Scoring(value)
    }
}

impl From<ProgressError> for AppError {
    fn from(value: ProgressError) -> Self {
        Self::Progress(value)
    }
}

impl From<ConfigDefect> for AppError {
    fn from(value: ConfigDefect) -> Self {
        Self::ReviewConfig(value)
    }
}
