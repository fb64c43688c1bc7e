use chrono::{Duration, NaiveDate};
use noise_survey::survey::audiometry::apply_new_test;
use noise_survey::survey::domain::{
    Area, AreaControls, AudiogramData, AudiometryTest, DeviceCondition, Ear, Employee, Equipment,
    EquipmentKind, Frequency, Gender, HearingProtectionDevice, Measurement, RatingType,
    SurveyData, SurveyMetadata, TestType, YesNo,
};
use noise_survey::survey::AreaPath;

/// Built-in survey used by the `demo` command. Dates are anchored to `today`
/// so the certificate and retest checks read the same on any run.
pub(crate) fn sample_survey(today: NaiveDate) -> SurveyData {
    let days_ago = |days: i64| today - Duration::days(days);

    let mut data = SurveyData {
        metadata: SurveyMetadata {
            client_name: "Karoo Aggregates (Pty) Ltd".to_string(),
            site_name: "Beaufort West Quarry".to_string(),
            site_address: "Farm 112, Beaufort West".to_string(),
            survey_date: Some(days_ago(7)),
            surveyor_name: "L. van Wyk".to_string(),
            surveyor_qualification: "Approved Inspection Authority".to_string(),
            report_number: "NS-2025-014".to_string(),
        },
        equipment: vec![
            Equipment {
                id: "slm-1".to_string(),
                kind: Some(EquipmentKind::SoundLevelMeter),
                name: "Class 1 integrating SLM".to_string(),
                serial: "SLM-40871".to_string(),
                weighting: "A".to_string(),
                response_mode: "Fast".to_string(),
                pre_calibration: "94.0".to_string(),
                during_calibration: String::new(),
                post_calibration: "94.3".to_string(),
                calibration_date: Some(days_ago(90)),
                area_ref: None,
            },
            Equipment {
                id: "cal-1".to_string(),
                kind: Some(EquipmentKind::Calibrator),
                name: "Acoustic calibrator 94 dB".to_string(),
                serial: "CAL-2210".to_string(),
                weighting: String::new(),
                response_mode: String::new(),
                pre_calibration: String::new(),
                during_calibration: String::new(),
                post_calibration: String::new(),
                calibration_date: Some(days_ago(120)),
                area_ref: None,
            },
        ],
        areas: vec![
            Area::new("crusher", "Crusher House").with_sub_areas(vec![
                completed(Area::new("primary", "Primary Crusher")),
                Area::new("screening", "Screening Deck"),
            ]),
            completed(Area::new("workshop", "Workshop")),
            completed(Area::new("control", "Control Room")),
        ],
        ..SurveyData::default()
    };

    let primary = AreaPath::sub(0, 0);
    let screening = AreaPath::sub(0, 1);
    let workshop = AreaPath::main(1);
    let control = AreaPath::main(2);

    data.measurements_by_area
        .insert(primary.key(), vec![measurement(&["94", "95", "93"], "8")]);
    data.measurements_by_area
        .insert(screening.key(), vec![measurement(&["89", "90", "88"], "6")]);
    data.measurements_by_area
        .insert(workshop.key(), vec![measurement(&["84", "86", "85"], "8")]);
    data.measurements_by_area
        .insert(control.key(), vec![measurement(&["68", "70"], "8")]);

    data.controls_by_area.insert(
        primary.key(),
        AreaControls {
            engineering: vec!["Rubber-lined chute and motor enclosure".to_string()],
            administrative: vec!["Two-hour rotation with the stockpile crew".to_string()],
        },
    );
    data.controls_by_area.insert(
        screening.key(),
        AreaControls {
            engineering: vec!["Polyurethane screen panels".to_string()],
            administrative: Vec::new(),
        },
    );
    data.controls_by_area.insert(
        workshop.key(),
        AreaControls {
            engineering: vec!["Extraction fan silencer".to_string()],
            administrative: Vec::new(),
        },
    );

    data.hearing_protection_devices.insert(
        primary.key(),
        vec![device("Earmuff", RatingType::Snr, "25")],
    );
    data.hearing_issued_status.insert(primary.key(), YesNo::Yes);
    data.hearing_issued_status.insert(screening.key(), YesNo::No);
    data.hearing_protection_devices.insert(
        workshop.key(),
        vec![device("Foam earplug", RatingType::Nrr, "29")],
    );
    data.hearing_issued_status.insert(workshop.key(), YesNo::Yes);

    data.employees_by_area.insert(
        primary.key(),
        vec![crusher_operator(today), plant_assistant(today)],
    );

    data
}

fn completed(mut area: Area) -> Area {
    area.details_completed = true;
    area
}

fn measurement(readings: &[&str], exposure_hours: &str) -> Measurement {
    Measurement {
        shift_duration: "8".to_string(),
        exposure_time: exposure_hours.to_string(),
        slm_id: "slm-1".to_string(),
        calibrator_id: "cal-1".to_string(),
        readings: readings.iter().map(|reading| reading.to_string()).collect(),
    }
}

fn device(device_type: &str, rating: RatingType, value: &str) -> HearingProtectionDevice {
    HearingProtectionDevice {
        device_type: device_type.to_string(),
        manufacturer: "Dromex".to_string(),
        snr_or_nrr: Some(rating),
        snr_value: value.to_string(),
        condition: DeviceCondition::Good,
        training: YesNo::Yes,
        fitting: YesNo::Yes,
        maintenance: YesNo::Yes,
    }
}

fn test(test_type: TestType, date: NaiveDate, audiogram: AudiogramData) -> AudiometryTest {
    AudiometryTest {
        test_type: Some(test_type),
        test_date: Some(date),
        audiogram,
        tester_name: "N. Pillay".to_string(),
        tester_qualification: "Occupational health nurse".to_string(),
        calibration_date: Some(date - Duration::days(60)),
    }
}

/// Baseline and an annual test with a moderate shift in the left ear.
fn crusher_operator(today: NaiveDate) -> Employee {
    let mut employee = Employee::new("emp-101", "Sipho", "Dlamini");
    employee.employee_number = "KA-0101".to_string();
    employee.gender = Gender::Male;
    employee.date_of_birth = NaiveDate::from_ymd_opt(1981, 3, 14);

    let baseline = AudiogramData::flat(10.0);
    let mut annual = baseline;
    annual.set(Frequency::Hz2000, Ear::Left, 25.0);
    annual.set(Frequency::Hz3000, Ear::Left, 30.0);
    annual.set(Frequency::Hz4000, Ear::Left, 35.0);

    let employee = apply_new_test(
        employee,
        test(TestType::Baseline, today - Duration::days(400), baseline),
    );
    apply_new_test(
        employee,
        test(TestType::Annual, today - Duration::days(30), annual),
    )
}

fn plant_assistant(today: NaiveDate) -> Employee {
    let mut employee = Employee::new("emp-117", "Naledi", "Khumalo");
    employee.employee_number = "KA-0117".to_string();
    employee.gender = Gender::Female;
    employee.date_of_birth = NaiveDate::from_ymd_opt(1994, 8, 2);

    apply_new_test(
        employee,
        test(
            TestType::Baseline,
            today - Duration::days(200),
            AudiogramData::flat(5.0),
        ),
    )
}
