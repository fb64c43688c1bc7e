use super::common::*;
use crate::survey::area::AreaPath;
use crate::survey::domain::{Area, SurveyData};
use crate::survey::validation::{validate_survey, IssueCategory, IssueSeverity};

fn two_area_survey() -> SurveyData {
    SurveyData {
        equipment: vec![slm(), calibrator()],
        areas: vec![
            Area::new("a1", "Mill").with_sub_areas(vec![
                Area::new("a1-1", "Ball Mill"),
                Area::new("a1-2", "Control Room"),
            ]),
        ],
        ..SurveyData::default()
    }
}

#[test]
fn survey_without_any_measurement_gets_one_critical() {
    let result = validate_survey(&two_area_survey(), today());

    let issues: Vec<_> = result.in_category(IssueCategory::Measurements).collect();
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].severity, IssueSeverity::Critical);
    assert_eq!(issues[0].message, "No measurements recorded in any area");
}

#[test]
fn unmeasured_leaf_is_a_warning_once_others_are_measured() {
    let mut survey = two_area_survey();
    survey.measurements_by_area.insert(
        AreaPath::sub(0, 0).key(),
        vec![measurement(&["82"], "8", "8")],
    );

    let result = validate_survey(&survey, today());
    let issues: Vec<_> = result.in_category(IssueCategory::Measurements).collect();
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].severity, IssueSeverity::Warning);
    assert_eq!(issues[0].area_name.as_deref(), Some("Mill > Control Room"));
}

#[test]
fn measurement_sanity_checks() {
    let mut survey = red_zone_survey();
    survey.measurements_by_area.insert(
        leaf().key(),
        vec![
            measurement(&["", "n/a"], "8", "8"),
            measurement(&["91"], "10", "8"),
        ],
    );

    let result = validate_survey(&survey, today());
    let messages: Vec<&str> = result
        .in_category(IssueCategory::Measurements)
        .map(|issue| issue.message.as_str())
        .collect();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0], "Measurement 1 has no valid readings");
    assert!(messages[1].contains("exceeds the shift duration"));
}

#[test]
fn critical_bucket_follows_category_order() {
    let mut survey = red_zone_survey();
    survey.equipment.clear();

    let result = validate_survey(&survey, today());
    let categories: Vec<IssueCategory> = result
        .critical
        .iter()
        .map(|issue| issue.category)
        .collect();
    let mut sorted = categories.clone();
    sorted.sort();
    assert_eq!(categories, sorted);
    assert_eq!(categories.first(), Some(&IssueCategory::Equipment));
    assert!(categories.contains(&IssueCategory::References));
    assert!(categories.contains(&IssueCategory::Controls));
}
