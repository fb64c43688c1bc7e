use crate::survey::exposure::Zone;
use crate::survey::protection::AdequacyLevel;
use chrono::NaiveDate;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct AreaRowView {
    pub area_key: String,
    pub area_name: String,
    pub measurement_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub laeq: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lex8h: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dose: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub permitted_time: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zone: Option<Zone>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zone_label: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protected_lex8h: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub adequacy: Option<AdequacyLevel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub adequacy_label: Option<&'static str>,
    pub employee_count: usize,
    pub sts_count: usize,
    pub details_completed: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ZoneTallyEntry {
    pub zone: Zone,
    pub zone_label: &'static str,
    pub areas: usize,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct CompletionProgress {
    pub completed: usize,
    pub total: usize,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct ValidationCounts {
    pub is_valid: bool,
    pub critical: usize,
    pub warnings: usize,
    pub info: usize,
}

/// Flattened report handed to the document exporter.
#[derive(Debug, Clone, Serialize)]
pub struct SurveyReportView {
    pub client_name: String,
    pub site_name: String,
    pub report_number: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub survey_date: Option<NaiveDate>,
    pub surveyor_name: String,
    pub generated_on: NaiveDate,
    pub areas: Vec<AreaRowView>,
    pub zone_tally: Vec<ZoneTallyEntry>,
    pub unmeasured_areas: usize,
    pub completion: CompletionProgress,
    pub validation: ValidationCounts,
    pub ready_for_sign_off: bool,
}
