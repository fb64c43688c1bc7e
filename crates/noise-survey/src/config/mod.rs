//! Environment-driven settings for the rules service.
//!
//! Every variable is prefixed `NOISE_SURVEY_`. A `.env` file in the working
//! directory is read first; real environment variables win over it.

use std::collections::HashMap;
use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};

pub const ENV_VAR: &str = "NOISE_SURVEY_ENV";
pub const HOST_VAR: &str = "NOISE_SURVEY_HOST";
pub const PORT_VAR: &str = "NOISE_SURVEY_PORT";
pub const LOG_LEVEL_VAR: &str = "NOISE_SURVEY_LOG_LEVEL";
pub const BODY_LIMIT_VAR: &str = "NOISE_SURVEY_BODY_LIMIT_BYTES";

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_LOG_LEVEL: &str = "info";
/// Whole survey snapshots with employees and audiograms fit well inside this.
const DEFAULT_BODY_LIMIT_BYTES: usize = 4 * 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AppEnvironment {
    #[default]
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Test => "test",
            Self::Production => "production",
        }
    }
}

impl fmt::Display for AppEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    /// Read `.env`, then the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build from any variable source. Unset and blank variables take defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let environment = var(ENV_VAR)
            .map(|value| AppEnvironment::parse(&value))
            .unwrap_or_default();

        let port = match var(PORT_VAR) {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidPort { value: raw })?,
            None => DEFAULT_PORT,
        };

        let body_limit_bytes = match var(BODY_LIMIT_VAR) {
            Some(raw) => raw
                .trim()
                .parse::<usize>()
                .ok()
                .filter(|limit| *limit > 0)
                .ok_or(ConfigError::InvalidBodyLimit { value: raw })?,
            None => DEFAULT_BODY_LIMIT_BYTES,
        };

        Ok(Self {
            environment,
            server: ServerConfig {
                host: var(HOST_VAR).unwrap_or_else(|| DEFAULT_HOST.to_string()),
                port,
                body_limit_bytes,
            },
            telemetry: TelemetryConfig {
                log_level: var(LOG_LEVEL_VAR).unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
            },
        })
    }

    /// Convenience for tests and tooling that hold variables in a map.
    pub fn from_map(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        Self::from_lookup(|name| vars.get(name).cloned())
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Largest request body the HTTP surface accepts.
    pub body_limit_bytes: usize,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        let ip = if self.host.eq_ignore_ascii_case("localhost") {
            IpAddr::from([127, 0, 0, 1])
        } else {
            self.host
                .parse()
                .map_err(|source| ConfigError::InvalidHost {
                    value: self.host.clone(),
                    source,
                })?
        };
        Ok(SocketAddr::new(ip, self.port))
    }
}

#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// `EnvFilter` directive, e.g. `info` or `noise_survey=debug`.
    pub log_level: String,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort {
        value: String,
    },
    InvalidHost {
        value: String,
        source: std::net::AddrParseError,
    },
    InvalidBodyLimit {
        value: String,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort { value } => {
                write!(f, "{PORT_VAR} must be a port number, got '{value}'")
            }
            ConfigError::InvalidHost { value, .. } => write!(
                f,
                "{HOST_VAR} must be 'localhost' or an IP address, got '{value}'"
            ),
            ConfigError::InvalidBodyLimit { value } => write!(
                f,
                "{BODY_LIMIT_VAR} must be a positive byte count, got '{value}'"
            ),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source, .. } => Some(source),
            ConfigError::InvalidPort { .. } | ConfigError::InvalidBodyLimit { .. } => None,
        }
    }
}
