use chrono::NaiveDate;

use crate::survey::area::AreaPath;
use crate::survey::domain::{
    Area, AreaControls, AudiogramData, AudiometryTest, DeviceCondition, Employee, Equipment,
    EquipmentKind, HearingProtectionDevice, Measurement, RatingType, SurveyData, TestType, YesNo,
};
use crate::survey::validation::{IssueCategory, IssueSeverity, ValidationResult};

pub(super) fn today() -> NaiveDate {
    date(2025, 6, 1)
}

pub(super) fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

pub(super) fn slm() -> Equipment {
    Equipment {
        id: "slm-1".to_string(),
        kind: Some(EquipmentKind::SoundLevelMeter),
        name: "Class 1 SLM".to_string(),
        serial: "SLM-2231".to_string(),
        weighting: "A".to_string(),
        response_mode: "Fast".to_string(),
        pre_calibration: "94.0".to_string(),
        during_calibration: String::new(),
        post_calibration: "94.1".to_string(),
        calibration_date: Some(date(2025, 2, 1)),
        area_ref: None,
    }
}

pub(super) fn calibrator() -> Equipment {
    Equipment {
        id: "cal-1".to_string(),
        kind: Some(EquipmentKind::Calibrator),
        name: "Acoustic calibrator".to_string(),
        serial: "CAL-778".to_string(),
        weighting: String::new(),
        response_mode: String::new(),
        pre_calibration: String::new(),
        during_calibration: String::new(),
        post_calibration: String::new(),
        calibration_date: Some(date(2025, 1, 15)),
        area_ref: None,
    }
}

pub(super) fn measurement(readings: &[&str], exposure: &str, shift: &str) -> Measurement {
    Measurement {
        shift_duration: shift.to_string(),
        exposure_time: exposure.to_string(),
        slm_id: "slm-1".to_string(),
        calibrator_id: "cal-1".to_string(),
        readings: readings.iter().map(|reading| reading.to_string()).collect(),
    }
}

pub(super) fn device(value: &str, condition: DeviceCondition) -> HearingProtectionDevice {
    HearingProtectionDevice {
        device_type: "Earmuff".to_string(),
        manufacturer: "3M Peltor".to_string(),
        snr_or_nrr: Some(RatingType::Snr),
        snr_value: value.to_string(),
        condition,
        training: YesNo::Yes,
        fitting: YesNo::Yes,
        maintenance: YesNo::Yes,
    }
}

pub(super) fn full_controls() -> AreaControls {
    AreaControls {
        engineering: vec!["Acoustic enclosure on crusher motor".to_string()],
        administrative: vec!["Job rotation limiting time in zone".to_string()],
    }
}

pub(super) fn audiometry_test(
    test_type: TestType,
    on: NaiveDate,
    audiogram: AudiogramData,
) -> AudiometryTest {
    AudiometryTest {
        test_type: Some(test_type),
        test_date: Some(on),
        audiogram,
        tester_name: "N. Pillay".to_string(),
        tester_qualification: "Occupational health nurse".to_string(),
        calibration_date: Some(date(2024, 12, 1)),
    }
}

pub(super) fn employee_with_baseline(id: &str, baseline_on: NaiveDate) -> Employee {
    let mut employee = Employee::new(id, "Thabo", "Mabena");
    employee.baseline_test = Some(audiometry_test(
        TestType::Baseline,
        baseline_on,
        AudiogramData::flat(15.0),
    ));
    employee
}

/// A single-leaf survey in the red zone (LAeq 90.3 dB over a full shift) with
/// calibrated equipment and nothing else recorded.
pub(super) fn red_zone_survey() -> SurveyData {
    let mut survey = SurveyData {
        equipment: vec![slm(), calibrator()],
        areas: vec![Area::new("a1", "Crusher House")],
        ..SurveyData::default()
    };
    survey.measurements_by_area.insert(
        leaf().key(),
        vec![measurement(&["90", "92", "88"], "8", "8")],
    );
    survey
}

pub(super) fn leaf() -> AreaPath {
    AreaPath::main(0)
}

pub(super) fn count(
    result: &ValidationResult,
    category: IssueCategory,
    severity: IssueSeverity,
) -> usize {
    result
        .in_category(category)
        .filter(|issue| issue.severity == severity)
        .count()
}
