use super::common::*;
use crate::survey::area::AreaPath;
use crate::survey::domain::{SurveyData, YesNo};
use crate::survey::validation::{validate_survey, IssueCategory, IssueSeverity};

#[test]
fn empty_survey_fails_completeness_gate() {
    let result = validate_survey(&SurveyData::default(), today());

    assert!(!result.is_valid);
    assert!(result.critical_count >= 3);
    let messages: Vec<&str> = result
        .critical
        .iter()
        .map(|issue| issue.message.as_str())
        .collect();
    assert_eq!(
        messages,
        vec![
            "No sound level meter registered",
            "No acoustic calibrator registered",
            "No survey areas defined",
        ]
    );
}

#[test]
fn calibration_drift_over_one_db_is_critical() {
    let mut survey = red_zone_survey();
    survey.equipment[0].post_calibration = "92.8".to_string();

    let result = validate_survey(&survey, today());
    let drift = result
        .critical
        .iter()
        .find(|issue| issue.category == IssueCategory::Equipment)
        .expect("drift issue raised");
    assert!(drift.message.contains("1.2 dB"));
    assert!(drift.message.starts_with("Sound Level Meter 'Class 1 SLM'"));
}

#[test]
fn calibrator_certificate_age_is_checked() {
    let mut survey = red_zone_survey();
    survey.equipment[1].calibration_date = Some(date(2024, 4, 1));
    let result = validate_survey(&survey, today());
    assert_eq!(
        count(&result, IssueCategory::Equipment, IssueSeverity::Critical),
        1
    );

    survey.equipment[1].calibration_date = Some(date(2024, 6, 20));
    let result = validate_survey(&survey, today());
    assert_eq!(
        count(&result, IssueCategory::Equipment, IssueSeverity::Critical),
        0
    );
    assert_eq!(
        count(&result, IssueCategory::Equipment, IssueSeverity::Warning),
        1
    );
}

#[test]
fn dangling_equipment_reference_is_critical() {
    let mut survey = red_zone_survey();
    if let Some(measurements) = survey.measurements_by_area.get_mut(&leaf().key()) {
        measurements[0].slm_id = "slm-9".to_string();
        measurements[0].calibrator_id = String::new();
    }

    let result = validate_survey(&survey, today());
    let critical: Vec<_> = result.in_category(IssueCategory::References).collect();
    assert!(critical
        .iter()
        .any(|issue| issue.severity == IssueSeverity::Critical && issue.message.contains("'slm-9'")));
    assert!(critical.iter().any(|issue| issue.severity == IssueSeverity::Warning
        && issue.message.contains("no Calibrator assigned")));
    assert_eq!(critical[0].area_name.as_deref(), Some("Crusher House"));
}

#[test]
fn data_under_deleted_areas_is_reported() {
    let mut survey = red_zone_survey();
    survey
        .hearing_issued_status
        .insert(AreaPath::sub(3, 1).key(), YesNo::Yes);

    let result = validate_survey(&survey, today());
    let orphan = result
        .in_category(IssueCategory::References)
        .find(|issue| issue.severity == IssueSeverity::Critical)
        .expect("orphaned key reported");
    assert!(orphan.message.contains(r#"{"main":3,"sub":1}"#));
}
