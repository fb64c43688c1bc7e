use crate::config::ConfigError;
use crate::survey::area::AreaError;
use crate::survey::import::LoggerImportError;
use crate::telemetry::TelemetryError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Server(axum::Error),
    Snapshot(serde_json::Error),
    Import(LoggerImportError),
    Area(AreaError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Server(err) => write!(f, "server error: {}", err),
            AppError::Snapshot(err) => write!(f, "invalid survey snapshot: {}", err),
            AppError::Import(err) => write!(f, "logger import failed: {}", err),
            AppError::Area(err) => write!(f, "area error: {}", err),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Server(err) => Some(err),
            AppError::Snapshot(err) => Some(err),
            AppError::Import(err) => Some(err),
            AppError::Area(err) => Some(err),
        }
    }
}

impl AppError {
    /// Caller mistakes are 400s; everything else is the service's fault.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Snapshot(_) | AppError::Import(_) | AppError::Area(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::Config(_)
            | AppError::Telemetry(_)
            | AppError::Io(_)
            | AppError::Server(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable machine-readable tag for API clients.
    pub const fn code(&self) -> &'static str {
        match self {
            AppError::Config(_) => "config",
            AppError::Telemetry(_) => "telemetry",
            AppError::Io(_) => "io",
            AppError::Server(_) => "server",
            AppError::Snapshot(_) => "invalid_snapshot",
            AppError::Import(_) => "invalid_logger_export",
            AppError::Area(_) => "invalid_area",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }

        let body = Json(json!({ "error": self.to_string(), "code": self.code() }));
        (status, body).into_response()
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

impl From<axum::Error> for AppError {
    fn from(value: axum::Error) -> Self {
        Self::Server(value)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(value: serde_json::Error) -> Self {
        Self::Snapshot(value)
    }
}

impl From<LoggerImportError> for AppError {
    fn from(value: LoggerImportError) -> Self {
        Self::Import(value)
    }
}

impl From<AreaError> for AppError {
    fn from(value: AreaError) -> Self {
        Self::Area(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::survey::area::AreaPath;

    #[test]
    fn input_errors_map_to_bad_request() {
        let snapshot = serde_json::from_str::<serde_json::Value>("{")
            .map(|_| ())
            .expect_err("truncated json");
        let error = AppError::from(snapshot);
        assert_eq!(error.code(), "invalid_snapshot");
        assert_eq!(error.into_response().status(), StatusCode::BAD_REQUEST);

        let response = AppError::from(LoggerImportError::MissingLevelColumn).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let error = AppError::from(AreaError::NotFound(AreaPath::main(4).key()));
        assert_eq!(error.status_code(), StatusCode::BAD_REQUEST);
        assert!(error.to_string().contains("{\"main\":4}"));
    }

    #[test]
    fn infrastructure_errors_map_to_server_error() {
        let error = AppError::from(ConfigError::InvalidPort {
            value: "http".to_string(),
        });
        assert_eq!(error.code(), "config");
        assert_eq!(
            error.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );

        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "survey.json");
        assert_eq!(
            AppError::from(io).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
