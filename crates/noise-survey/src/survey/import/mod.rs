//! Import of sound level meter logger exports.

mod parser;

use crate::survey::domain::Measurement;
use std::io::Read;
use std::path::Path;
use tracing::debug;

#[derive(Debug)]
pub enum LoggerImportError {
    Io(std::io::Error),
    Csv(csv::Error),
    MissingLevelColumn,
}

impl std::fmt::Display for LoggerImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoggerImportError::Io(err) => write!(f, "failed to read logger export: {}", err),
            LoggerImportError::Csv(err) => write!(f, "invalid logger CSV data: {}", err),
            LoggerImportError::MissingLevelColumn => write!(
                f,
                "logger export has no LAeq, Leq or Level column"
            ),
        }
    }
}

impl std::error::Error for LoggerImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LoggerImportError::Io(err) => Some(err),
            LoggerImportError::Csv(err) => Some(err),
            LoggerImportError::MissingLevelColumn => None,
        }
    }
}

impl From<std::io::Error> for LoggerImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for LoggerImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

/// Readings pulled from a logger export, ready to attach to a measurement.
#[derive(Debug, Clone, PartialEq)]
pub struct LoggedReadings {
    pub readings: Vec<String>,
    /// Rows whose level cell was blank or not a number.
    pub skipped_rows: usize,
}

impl LoggedReadings {
    pub fn into_measurement(
        self,
        exposure_hours: &str,
        shift_hours: &str,
        slm_id: &str,
        calibrator_id: &str,
    ) -> Measurement {
        Measurement {
            shift_duration: shift_hours.to_string(),
            exposure_time: exposure_hours.to_string(),
            slm_id: slm_id.to_string(),
            calibrator_id: calibrator_id.to_string(),
            readings: self.readings,
        }
    }
}

pub struct LoggerImporter;

impl LoggerImporter {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<LoggedReadings, LoggerImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<LoggedReadings, LoggerImportError> {
        let parsed = parser::parse_log(reader)?.ok_or(LoggerImportError::MissingLevelColumn)?;
        debug!(
            readings = parsed.readings.len(),
            skipped = parsed.skipped_rows,
            "logger export parsed"
        );

        Ok(LoggedReadings {
            readings: parsed.readings,
            skipped_rows: parsed.skipped_rows,
        })
    }
}
