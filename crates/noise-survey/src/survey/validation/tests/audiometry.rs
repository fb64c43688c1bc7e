use super::common::*;
use crate::survey::audiometry::{apply_new_test, STS_FREQUENCIES};
use crate::survey::domain::{AudiogramData, DeviceCondition, Ear, Employee, TestType};
use crate::survey::validation::{validate_survey, IssueCategory, IssueSeverity};

fn protected_red_zone() -> crate::survey::domain::SurveyData {
    let mut survey = red_zone_survey();
    survey.controls_by_area.insert(leaf().key(), full_controls());
    survey
        .hearing_protection_devices
        .insert(leaf().key(), vec![device("28", DeviceCondition::Good)]);
    survey
}

fn shifted(base: f64, shift: f64) -> AudiogramData {
    let mut audiogram = AudiogramData::flat(base);
    for frequency in STS_FREQUENCIES {
        audiogram.set(frequency, Ear::Right, base + shift);
    }
    audiogram
}

#[test]
fn red_zone_employee_without_baseline_is_critical() {
    let mut survey = protected_red_zone();
    survey.employees_by_area.insert(
        leaf().key(),
        vec![
            Employee::new("e1", "Zanele", "Dube"),
            employee_with_baseline("e2", date(2025, 3, 1)),
        ],
    );

    let result = validate_survey(&survey, today());
    let critical: Vec<_> = result
        .in_category(IssueCategory::Audiometry)
        .filter(|issue| issue.severity == IssueSeverity::Critical)
        .collect();
    assert_eq!(critical.len(), 1);
    assert_eq!(critical[0].message, "Zanele Dube has no baseline audiogram");
}

#[test]
fn missing_annual_retest_after_baseline_is_a_warning() {
    let mut survey = protected_red_zone();
    survey.employees_by_area.insert(
        leaf().key(),
        vec![employee_with_baseline("e1", date(2024, 3, 1))],
    );

    let result = validate_survey(&survey, today());
    assert!(result.is_valid);
    let warning = result
        .in_category(IssueCategory::Audiometry)
        .next()
        .expect("retest warning");
    assert_eq!(warning.severity, IssueSeverity::Warning);
    assert!(warning.message.contains("due 2025-03-01"));
}

#[test]
fn sts_severity_maps_to_issue_severity() {
    let baseline = employee_with_baseline("e1", date(2024, 9, 1));
    let severe = apply_new_test(
        baseline.clone(),
        audiometry_test(TestType::Annual, date(2025, 5, 1), shifted(15.0, 26.0)),
    );
    let mild = apply_new_test(
        baseline,
        audiometry_test(TestType::FollowUp, date(2025, 5, 2), shifted(15.0, 12.0)),
    );
    assert!(severe.has_sts && mild.has_sts);

    let mut survey = protected_red_zone();
    survey
        .employees_by_area
        .insert(leaf().key(), vec![severe, mild]);

    let result = validate_survey(&survey, today());
    assert_eq!(
        count(&result, IssueCategory::Audiometry, IssueSeverity::Critical),
        1
    );
    assert_eq!(
        count(&result, IssueCategory::Audiometry, IssueSeverity::Info),
        1
    );
    let info = result.info.first().expect("mild shift");
    assert!(info.message.starts_with("Thabo Mabena: Mild"));
}

#[test]
fn recovered_shift_stays_visible_as_info() {
    let employee = employee_with_baseline("e1", date(2024, 1, 10));
    let employee = apply_new_test(
        employee,
        audiometry_test(TestType::Annual, date(2024, 12, 1), shifted(15.0, 11.0)),
    );
    let employee = apply_new_test(
        employee,
        audiometry_test(TestType::FollowUp, date(2025, 1, 5), AudiogramData::flat(15.0)),
    );

    let mut survey = protected_red_zone();
    survey.employees_by_area.insert(leaf().key(), vec![employee]);

    let result = validate_survey(&survey, today());
    assert_eq!(result.info_count, 1);
    assert!(result.info[0].message.contains("recorded on 2024-12-01"));
}

#[test]
fn stale_periodic_test_is_flagged_in_any_zone() {
    let mut survey = red_zone_survey();
    survey
        .measurements_by_area
        .insert(leaf().key(), vec![measurement(&["70"], "8", "8")]);
    let mut employee = employee_with_baseline("e1", date(2022, 2, 1));
    employee.periodic_tests.push(audiometry_test(
        TestType::Annual,
        date(2023, 2, 1),
        AudiogramData::flat(15.0),
    ));
    survey.employees_by_area.insert(leaf().key(), vec![employee]);

    let result = validate_survey(&survey, today());
    let issues: Vec<_> = result.in_category(IssueCategory::Audiometry).collect();
    assert_eq!(issues.len(), 1);
    assert!(issues[0].message.contains("more than a year old"));
}
