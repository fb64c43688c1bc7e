//! Tracing bootstrap for the binary. The library only emits events.

use crate::config::TelemetryConfig;
use std::fmt;
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::EnvFilter;

/// HTTP plumbing is chatty at `info`; keep it at `warn` unless asked for.
const QUIET_DEPENDENCIES: &[&str] = &["hyper", "axum_prometheus"];

#[derive(Debug)]
pub enum TelemetryError {
    InvalidFilter { value: String, source: ParseError },
    AlreadyInstalled(Box<dyn std::error::Error + Send + Sync>),
}

impl fmt::Display for TelemetryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TelemetryError::InvalidFilter { value, .. } => {
                write!(f, "invalid log filter '{value}' in NOISE_SURVEY_LOG_LEVEL")
            }
            TelemetryError::AlreadyInstalled(err) => {
                write!(f, "a global tracing subscriber is already installed: {err}")
            }
        }
    }
}

impl std::error::Error for TelemetryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TelemetryError::InvalidFilter { source, .. } => Some(source),
            TelemetryError::AlreadyInstalled(err) => Some(&**err),
        }
    }
}

/// Configured level plus `warn` caps for dependencies the level does not name.
fn directives(log_level: &str) -> String {
    let mut directives = vec![log_level.trim().to_string()];
    directives.extend(
        QUIET_DEPENDENCIES
            .iter()
            .filter(|target| !log_level.contains(*target))
            .map(|target| format!("{target}=warn")),
    );
    directives.join(",")
}

/// `RUST_LOG` wins over the configured level when it parses.
fn build_filter(config: &TelemetryConfig) -> Result<EnvFilter, TelemetryError> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }

    EnvFilter::try_new(directives(&config.log_level)).map_err(|source| {
        TelemetryError::InvalidFilter {
            value: config.log_level.clone(),
            source,
        }
    })
}

/// Install the global subscriber. Called once by the binary.
pub fn init(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    let env_filter = build_filter(config)?;

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .with_ansi(false)
        .try_init()
        .map_err(TelemetryError::AlreadyInstalled)
}
