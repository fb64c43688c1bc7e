use chrono::NaiveDate;
use metrics_exporter_prometheus::PrometheusHandle;
use noise_survey::error::AppError;
use noise_survey::survey::SurveyData;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

/// Read a survey snapshot exported by the data-entry application.
pub(crate) fn load_survey(path: &Path) -> Result<SurveyData, AppError> {
    let raw = std::fs::read_to_string(path)?;
    let survey = serde_json::from_str(&raw)?;
    Ok(survey)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_date_requires_iso_dates() {
        assert_eq!(
            parse_date(" 2025-06-01 "),
            Ok(NaiveDate::from_ymd_opt(2025, 6, 1).expect("valid date"))
        );
        let error = parse_date("01/06/2025").expect_err("not iso");
        assert!(error.contains("YYYY-MM-DD"));
    }

    #[test]
    fn load_survey_reports_io_and_snapshot_errors() {
        match load_survey(Path::new("./does-not-exist.json")) {
            Err(AppError::Io(_)) => {}
            other => panic!("expected io error, got {other:?}"),
        }

        let path = std::env::temp_dir().join("noise-survey-invalid-snapshot.json");
        std::fs::write(&path, "{\"areas\": 3}").expect("write temp file");
        let result = load_survey(&path);
        std::fs::remove_file(&path).ok();
        match result {
            Err(AppError::Snapshot(_)) => {}
            other => panic!("expected snapshot error, got {other:?}"),
        }
    }
}
