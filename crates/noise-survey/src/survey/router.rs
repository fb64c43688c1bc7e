use axum::{routing::post, Json, Router};
use chrono::{Local, NaiveDate};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::audiometry::{get_audiometry_summary, validate_audiogram, AudiometrySummary};
use super::domain::{AudiogramData, Employee, HearingProtectionDevice, SurveyData};
use super::exposure::{average_laeq, get_exposure_summary, ExposureSummary, REFERENCE_HOURS};
use super::protection::{
    get_protection_summary, recommend_best_device, DeviceRecommendation, ProtectionSummary,
};
use super::report::views::SurveyReportView;
use super::report::SurveyReport;
use super::validation::{validate_survey, ValidationResult};
use super::values::{lenient_strings, parse_readings};
use crate::error::AppError;

/// Router exposing the rules engines over HTTP.
pub fn survey_router() -> Router {
    Router::new()
        .route("/api/v1/survey/validate", post(validate_handler))
        .route("/api/v1/survey/report", post(report_handler))
        .route("/api/v1/exposure/summary", post(exposure_handler))
        .route("/api/v1/protection/summary", post(protection_handler))
        .route("/api/v1/audiometry/summary", post(audiometry_handler))
        .route("/api/v1/audiometry/validate", post(audiogram_handler))
}

/// Decode a body against the engine's types so that malformed snapshots come
/// back as `AppError::Snapshot` rather than an extractor rejection.
fn decode<T: DeserializeOwned>(payload: Value) -> Result<T, AppError> {
    serde_json::from_value(payload).map_err(AppError::from)
}

fn today_or_local(today: Option<NaiveDate>) -> NaiveDate {
    today.unwrap_or_else(|| Local::now().date_naive())
}

#[derive(Debug, Deserialize)]
struct SurveyRequest {
    survey: SurveyData,
    #[serde(default)]
    today: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
struct ExposureRequest {
    #[serde(default, deserialize_with = "lenient_strings")]
    readings: Vec<String>,
    exposure_hours: f64,
    #[serde(default = "reference_hours")]
    shift_hours: f64,
}

fn reference_hours() -> f64 {
    REFERENCE_HOURS
}

#[derive(Debug, Deserialize)]
struct ProtectionRequest {
    #[serde(default)]
    actual_lex8h: Option<f64>,
    #[serde(default)]
    devices: Vec<HearingProtectionDevice>,
}

#[derive(Debug, Serialize)]
struct ProtectionResponse {
    summary: Option<ProtectionSummary>,
    recommendation: Option<DeviceRecommendation>,
}

#[derive(Debug, Deserialize)]
struct AudiometryRequest {
    employee: Employee,
    #[serde(default)]
    today: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
struct AudiogramRequest {
    audiogram: AudiogramData,
}

#[derive(Debug, Serialize)]
struct AudiogramResponse {
    errors: Vec<String>,
}

async fn validate_handler(Json(payload): Json<Value>) -> Result<Json<ValidationResult>, AppError> {
    let request: SurveyRequest = decode(payload)?;
    let result = validate_survey(&request.survey, today_or_local(request.today));
    Ok(Json(result))
}

async fn report_handler(Json(payload): Json<Value>) -> Result<Json<SurveyReportView>, AppError> {
    let request: SurveyRequest = decode(payload)?;
    let report = SurveyReport::build(&request.survey, today_or_local(request.today));
    Ok(Json(report.summary()))
}

async fn exposure_handler(Json(payload): Json<Value>) -> Result<Json<ExposureSummary>, AppError> {
    let request: ExposureRequest = decode(payload)?;
    let laeq = average_laeq(&parse_readings(&request.readings));
    Ok(Json(get_exposure_summary(
        laeq,
        request.exposure_hours,
        request.shift_hours,
    )))
}

async fn protection_handler(
    Json(payload): Json<Value>,
) -> Result<Json<ProtectionResponse>, AppError> {
    let request: ProtectionRequest = decode(payload)?;
    let summary = get_protection_summary(request.actual_lex8h, &request.devices);
    let recommendation = request
        .actual_lex8h
        .and_then(|actual| recommend_best_device(&request.devices, actual));
    Ok(Json(ProtectionResponse {
        summary,
        recommendation,
    }))
}

async fn audiometry_handler(
    Json(payload): Json<Value>,
) -> Result<Json<AudiometrySummary>, AppError> {
    let request: AudiometryRequest = decode(payload)?;
    Ok(Json(get_audiometry_summary(
        &request.employee,
        today_or_local(request.today),
    )))
}

async fn audiogram_handler(
    Json(payload): Json<Value>,
) -> Result<Json<AudiogramResponse>, AppError> {
    let request: AudiogramRequest = decode(payload)?;
    Ok(Json(AudiogramResponse {
        errors: validate_audiogram(&request.audiogram),
    }))
}
