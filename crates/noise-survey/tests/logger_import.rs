use chrono::NaiveDate;
use noise_survey::survey::area::AreaPath;
use noise_survey::survey::domain::{Area, Equipment, EquipmentKind, SurveyData};
use noise_survey::survey::exposure::{ExposureSummary, Zone};
use noise_survey::survey::validation::{validate_survey, IssueCategory};
use noise_survey::survey::LoggerImporter;
use std::path::PathBuf;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn instrument(id: &str, kind: EquipmentKind) -> Equipment {
    Equipment {
        id: id.to_string(),
        kind: Some(kind),
        name: kind.label().to_string(),
        serial: String::new(),
        weighting: "A".to_string(),
        response_mode: "Slow".to_string(),
        pre_calibration: "94.0".to_string(),
        during_calibration: String::new(),
        post_calibration: "93.8".to_string(),
        calibration_date: NaiveDate::from_ymd_opt(2025, 3, 1),
        area_ref: None,
    }
}

#[test]
fn logger_export_reads_the_laeq_column_only() {
    let logged = LoggerImporter::from_path(fixture("logger_export.csv")).expect("export imports");

    assert_eq!(logged.readings, vec!["91.2", "93.0", "89.8"]);
    assert_eq!(logged.skipped_rows, 2);
}

#[test]
fn imported_measurement_flows_into_survey_checks() {
    let measurement = LoggerImporter::from_path(fixture("logger_export.csv"))
        .expect("export imports")
        .into_measurement("10", "12", "slm-2", "cal-2");

    let summary = ExposureSummary::from_measurement(&measurement);
    assert_eq!(summary.zone.zone, Zone::Red);
    assert_eq!(summary.shift_hours, 12.0);

    let mut data = SurveyData {
        equipment: vec![
            instrument("slm-2", EquipmentKind::SoundLevelMeter),
            instrument("cal-2", EquipmentKind::Calibrator),
        ],
        areas: vec![Area::new("kiln", "Kiln Floor")],
        ..SurveyData::default()
    };
    data.measurements_by_area
        .insert(AreaPath::main(0).key(), vec![measurement]);

    let today = NaiveDate::from_ymd_opt(2025, 6, 1).expect("valid date");
    let result = validate_survey(&data, today);

    assert_eq!(result.in_category(IssueCategory::References).count(), 0);
    assert_eq!(result.in_category(IssueCategory::Measurements).count(), 0);
    assert!(result
        .in_category(IssueCategory::Controls)
        .any(|issue| issue.area_name.as_deref() == Some("Kiln Floor")));
}
