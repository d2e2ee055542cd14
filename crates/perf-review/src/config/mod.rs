use std::env;
use std::fmt;

/// Distinguishes runtime behavior for different stages of the engine host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for hosts embedding the review engine.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub review: ReviewSettings,
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let cycle = env::var("REVIEW_CYCLE").unwrap_or_else(|_| DEFAULT_CYCLE.to_string());
        if cycle.trim().is_empty() {
            return Err(ConfigError::EmptyCycle);
        }

        let max_depth = env::var("REVIEW_MAX_DEPTH")
            .unwrap_or_else(|_| DEFAULT_MAX_DEPTH.to_string())
            .parse::<usize>()
            .ok()
            .filter(|depth| *depth > 0)
            .ok_or(ConfigError::InvalidMaxDepth)?;

        let strict_config = match env::var("REVIEW_STRICT_CONFIG") {
            Ok(value) => parse_flag(&value).ok_or(ConfigError::InvalidStrictFlag { value })?,
            Err(_) => false,
        };

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            environment,
            review: ReviewSettings {
                cycle: cycle.trim().to_string(),
                max_depth,
                strict_config,
            },
            telemetry: TelemetryConfig { log_level },
        })
    }
}

pub const DEFAULT_CYCLE: &str = "2025";
pub const DEFAULT_MAX_DEPTH: usize = 50;

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}

/// Knobs for a single review computation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewSettings {
    /// Performance cycle whose rating scale is loaded (`rating_config_<cycle>`).
    pub cycle: String,
    /// Upper bound on reporting-chain recursion during progress aggregation.
    pub max_depth: usize,
    /// Treat a company config without a default rule as an error instead of
    /// falling back to the built-in split.
    pub strict_config: bool,
}

impl Default for ReviewSettings {
    fn default() -> Self {
        Self {
            cycle: DEFAULT_CYCLE.to_string(),
            max_depth: DEFAULT_MAX_DEPTH,
            strict_config: false,
        }
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

#[derive(Debug)]
pub enum ConfigError {
    EmptyCycle,
    InvalidMaxDepth,
    InvalidStrictFlag { value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::EmptyCycle => write!(f, "REVIEW_CYCLE must not be empty"),
            ConfigError::InvalidMaxDepth => {
                write!(f, "REVIEW_MAX_DEPTH must be a positive integer")
            }
            ConfigError::InvalidStrictFlag { value } => {
                write!(f, "REVIEW_STRICT_CONFIG must be a boolean, found '{value}'")
            }
        }
    }
}

impl std::error::Error for ConfigError {}
