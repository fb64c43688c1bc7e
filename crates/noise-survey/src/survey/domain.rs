use super::area::{AreaMap, AreaPath};
use super::values::{
    lenient_choice, lenient_choice_map, lenient_choice_or_default, lenient_date, lenient_f64,
    lenient_string, lenient_strings,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Display/aggregation severity used by the calculation engines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusSeverity {
    Success,
    Info,
    Warning,
    Error,
}

impl StatusSeverity {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Success => "Success",
            Self::Info => "Info",
            Self::Warning => "Warning",
            Self::Error => "Error",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EquipmentKind {
    #[serde(rename = "SLM")]
    SoundLevelMeter,
    #[serde(rename = "Calibrator")]
    Calibrator,
}

impl EquipmentKind {
    pub const fn label(self) -> &'static str {
        match self {
            Self::SoundLevelMeter => "Sound Level Meter",
            Self::Calibrator => "Calibrator",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Equipment {
    pub id: String,
    /// `None` until the surveyor picks a type.
    #[serde(rename = "type", default, deserialize_with = "lenient_choice")]
    pub kind: Option<EquipmentKind>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub serial: String,
    #[serde(default)]
    pub weighting: String,
    #[serde(default)]
    pub response_mode: String,
    #[serde(default, alias = "pre", deserialize_with = "lenient_string")]
    pub pre_calibration: String,
    #[serde(default, alias = "during", deserialize_with = "lenient_string")]
    pub during_calibration: String,
    #[serde(default, alias = "post", deserialize_with = "lenient_string")]
    pub post_calibration: String,
    #[serde(default, deserialize_with = "lenient_date")]
    pub calibration_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub area_ref: Option<String>,
}

/// Node of the survey area tree (main, sub, sub-sub).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Area {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sub_areas: Vec<Area>,
    #[serde(default)]
    pub details_completed: bool,
}

impl Area {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            sub_areas: Vec::new(),
            details_completed: false,
        }
    }

    pub fn with_sub_areas(mut self, sub_areas: Vec<Area>) -> Self {
        self.sub_areas = sub_areas;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoiseSource {
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub noise_level: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Measurement {
    #[serde(default, deserialize_with = "lenient_string")]
    pub shift_duration: String,
    /// Hours of exposure within the shift.
    #[serde(default, deserialize_with = "lenient_string")]
    pub exposure_time: String,
    #[serde(default)]
    pub slm_id: String,
    #[serde(default)]
    pub calibrator_id: String,
    #[serde(default, deserialize_with = "lenient_strings")]
    pub readings: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AreaControls {
    #[serde(default, deserialize_with = "lenient_strings")]
    pub engineering: Vec<String>,
    #[serde(default, deserialize_with = "lenient_strings")]
    pub administrative: Vec<String>,
}

impl AreaControls {
    pub fn has_engineering(&self) -> bool {
        self.engineering.iter().any(|entry| !entry.trim().is_empty())
    }

    pub fn has_administrative(&self) -> bool {
        self.administrative
            .iter()
            .any(|entry| !entry.trim().is_empty())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum YesNo {
    Yes,
    #[default]
    No,
}

impl YesNo {
    pub const fn is_yes(self) -> bool {
        matches!(self, Self::Yes)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RatingType {
    #[serde(rename = "SNR")]
    Snr,
    #[serde(rename = "NRR")]
    Nrr,
}

impl RatingType {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Snr => "SNR",
            Self::Nrr => "NRR",
        }
    }
}

/// An unrecorded condition counts as poor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DeviceCondition {
    Good,
    #[default]
    Poor,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HearingProtectionDevice {
    #[serde(rename = "type", default)]
    pub device_type: String,
    #[serde(default)]
    pub manufacturer: String,
    #[serde(default, deserialize_with = "lenient_choice")]
    pub snr_or_nrr: Option<RatingType>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub snr_value: String,
    #[serde(default, deserialize_with = "lenient_choice_or_default")]
    pub condition: DeviceCondition,
    #[serde(default, deserialize_with = "lenient_choice_or_default")]
    pub training: YesNo,
    #[serde(default, deserialize_with = "lenient_choice_or_default")]
    pub fitting: YesNo,
    #[serde(default, deserialize_with = "lenient_choice_or_default")]
    pub maintenance: YesNo,
}

/// Free-text exposure record entered per area (who is exposed, how).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExposureDetails {
    #[serde(default)]
    pub occupation: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub employees_exposed: String,
    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Frequency {
    #[serde(rename = "500")]
    Hz500,
    #[serde(rename = "1000")]
    Hz1000,
    #[serde(rename = "2000")]
    Hz2000,
    #[serde(rename = "3000")]
    Hz3000,
    #[serde(rename = "4000")]
    Hz4000,
    #[serde(rename = "6000")]
    Hz6000,
    #[serde(rename = "8000")]
    Hz8000,
}

impl Frequency {
    pub const ALL: [Self; 7] = [
        Self::Hz500,
        Self::Hz1000,
        Self::Hz2000,
        Self::Hz3000,
        Self::Hz4000,
        Self::Hz6000,
        Self::Hz8000,
    ];

    pub const fn hz(self) -> u32 {
        match self {
            Self::Hz500 => 500,
            Self::Hz1000 => 1000,
            Self::Hz2000 => 2000,
            Self::Hz3000 => 3000,
            Self::Hz4000 => 4000,
            Self::Hz6000 => 6000,
            Self::Hz8000 => 8000,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Ear {
    Left,
    Right,
}

impl Ear {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
        }
    }
}

/// Hearing thresholds (dB HL) for both ears at one frequency.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct EarThresholds {
    #[serde(default, deserialize_with = "lenient_f64")]
    pub left: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub right: f64,
}

impl EarThresholds {
    pub const fn new(left: f64, right: f64) -> Self {
        Self { left, right }
    }

    pub const fn get(&self, ear: Ear) -> f64 {
        match ear {
            Ear::Left => self.left,
            Ear::Right => self.right,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AudiogramData {
    #[serde(rename = "500", default)]
    pub hz500: EarThresholds,
    #[serde(rename = "1000", default)]
    pub hz1000: EarThresholds,
    #[serde(rename = "2000", default)]
    pub hz2000: EarThresholds,
    #[serde(rename = "3000", default)]
    pub hz3000: EarThresholds,
    #[serde(rename = "4000", default)]
    pub hz4000: EarThresholds,
    #[serde(rename = "6000", default)]
    pub hz6000: EarThresholds,
    #[serde(rename = "8000", default)]
    pub hz8000: EarThresholds,
}

impl AudiogramData {
    /// Same threshold at every frequency in both ears.
    pub fn flat(level: f64) -> Self {
        let both = EarThresholds::new(level, level);
        Self {
            hz500: both,
            hz1000: both,
            hz2000: both,
            hz3000: both,
            hz4000: both,
            hz6000: both,
            hz8000: both,
        }
    }

    pub fn at(&self, frequency: Frequency) -> &EarThresholds {
        match frequency {
            Frequency::Hz500 => &self.hz500,
            Frequency::Hz1000 => &self.hz1000,
            Frequency::Hz2000 => &self.hz2000,
            Frequency::Hz3000 => &self.hz3000,
            Frequency::Hz4000 => &self.hz4000,
            Frequency::Hz6000 => &self.hz6000,
            Frequency::Hz8000 => &self.hz8000,
        }
    }

    pub fn at_mut(&mut self, frequency: Frequency) -> &mut EarThresholds {
        match frequency {
            Frequency::Hz500 => &mut self.hz500,
            Frequency::Hz1000 => &mut self.hz1000,
            Frequency::Hz2000 => &mut self.hz2000,
            Frequency::Hz3000 => &mut self.hz3000,
            Frequency::Hz4000 => &mut self.hz4000,
            Frequency::Hz6000 => &mut self.hz6000,
            Frequency::Hz8000 => &mut self.hz8000,
        }
    }

    pub fn threshold(&self, frequency: Frequency, ear: Ear) -> f64 {
        self.at(frequency).get(ear)
    }

    pub fn set(&mut self, frequency: Frequency, ear: Ear, value: f64) {
        let slot = self.at_mut(frequency);
        match ear {
            Ear::Left => slot.left = value,
            Ear::Right => slot.right = value,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TestType {
    Baseline,
    Annual,
    Exit,
    #[serde(rename = "Follow-up")]
    FollowUp,
}

impl TestType {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Baseline => "Baseline",
            Self::Annual => "Annual",
            Self::Exit => "Exit",
            Self::FollowUp => "Follow-up",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudiometryTest {
    #[serde(default, deserialize_with = "lenient_choice")]
    pub test_type: Option<TestType>,
    #[serde(default, deserialize_with = "lenient_date")]
    pub test_date: Option<NaiveDate>,
    #[serde(default)]
    pub audiogram: AudiogramData,
    #[serde(default)]
    pub tester_name: String,
    #[serde(default)]
    pub tester_qualification: String,
    #[serde(default, deserialize_with = "lenient_date")]
    pub calibration_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
    #[default]
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    pub id: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub employee_number: String,
    #[serde(default, deserialize_with = "lenient_date")]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(default, deserialize_with = "lenient_choice_or_default")]
    pub gender: Gender,
    #[serde(default)]
    pub baseline_test: Option<AudiometryTest>,
    #[serde(default)]
    pub periodic_tests: Vec<AudiometryTest>,
    /// Cached result of STS detection; only `apply_new_test` sets it.
    #[serde(default, rename = "hasSTS")]
    pub has_sts: bool,
    #[serde(default, rename = "stsDate", deserialize_with = "lenient_date")]
    pub sts_date: Option<NaiveDate>,
    #[serde(default, rename = "stsDetails")]
    pub sts_details: Option<String>,
}

impl Employee {
    pub fn new(id: impl Into<String>, first_name: &str, last_name: &str) -> Self {
        Self {
            id: id.into(),
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            employee_number: String::new(),
            date_of_birth: None,
            gender: Gender::Other,
            baseline_test: None,
            periodic_tests: Vec::new(),
            has_sts: false,
            sts_date: None,
            sts_details: None,
        }
    }

    pub fn display_name(&self) -> String {
        let full = format!("{} {}", self.first_name.trim(), self.last_name.trim());
        let full = full.trim();
        if full.is_empty() {
            format!("Employee {}", self.id)
        } else {
            full.to_string()
        }
    }

    /// Last periodic test, else the baseline.
    pub fn latest_test(&self) -> Option<&AudiometryTest> {
        self.periodic_tests.last().or(self.baseline_test.as_ref())
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SurveyMetadata {
    #[serde(default)]
    pub client_name: String,
    #[serde(default)]
    pub site_name: String,
    #[serde(default)]
    pub site_address: String,
    #[serde(default, deserialize_with = "lenient_date")]
    pub survey_date: Option<NaiveDate>,
    #[serde(default)]
    pub surveyor_name: String,
    #[serde(default)]
    pub surveyor_qualification: String,
    #[serde(default)]
    pub report_number: String,
}

/// Whole-survey snapshot handed to the engines. Never mutated by them.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SurveyData {
    #[serde(flatten)]
    pub metadata: SurveyMetadata,
    #[serde(default)]
    pub equipment: Vec<Equipment>,
    #[serde(default)]
    pub areas: Vec<Area>,
    #[serde(default)]
    pub noise_sources_by_area: AreaMap<Vec<NoiseSource>>,
    #[serde(default)]
    pub measurements_by_area: AreaMap<Vec<Measurement>>,
    #[serde(default)]
    pub controls_by_area: AreaMap<AreaControls>,
    #[serde(default)]
    pub hearing_protection_devices: AreaMap<Vec<HearingProtectionDevice>>,
    #[serde(default, deserialize_with = "lenient_choice_map")]
    pub hearing_issued_status: AreaMap<YesNo>,
    #[serde(default)]
    pub exposures_by_area: AreaMap<ExposureDetails>,
    #[serde(default)]
    pub comments_by_area: AreaMap<String>,
    #[serde(default)]
    pub employees_by_area: AreaMap<Vec<Employee>>,
}

impl SurveyData {
    pub fn equipment_by_id(&self, id: &str) -> Option<&Equipment> {
        self.equipment.iter().find(|item| item.id == id)
    }

    pub fn measurements_at(&self, path: &AreaPath) -> &[Measurement] {
        self.measurements_by_area
            .get(&path.key())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn devices_at(&self, path: &AreaPath) -> &[HearingProtectionDevice] {
        self.hearing_protection_devices
            .get(&path.key())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn employees_at(&self, path: &AreaPath) -> &[Employee] {
        self.employees_by_area
            .get(&path.key())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn controls_at(&self, path: &AreaPath) -> Option<&AreaControls> {
        self.controls_by_area.get(&path.key())
    }

    pub fn issued_status_at(&self, path: &AreaPath) -> Option<YesNo> {
        self.hearing_issued_status.get(&path.key()).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_deserializes_from_ui_shaped_json() {
        let json = r#"{
            "clientName": "Acme Mining",
            "surveyDate": "2025-02-10",
            "equipment": [
                {"id": "slm-1", "type": "SLM", "name": "Type 1 SLM", "pre": "94.0", "post": 94.2},
                {"id": "cal-1", "type": "Calibrator", "calibrationDate": "2024-11-01"}
            ],
            "areas": [{"id": "a1", "name": "Crusher", "subAreas": [{"id": "a1-1", "name": "Feed"}]}],
            "measurementsByArea": {
                "{\"main\":0,\"sub\":0}": [
                    {"shiftDuration": "8", "exposureTime": 8, "slmId": "slm-1", "calibratorId": "cal-1", "readings": ["90", 92, "88"]}
                ]
            },
            "hearingIssuedStatus": {"{\"sub\":0,\"main\":0}": "Yes"}
        }"#;

        let survey: SurveyData = serde_json::from_str(json).expect("snapshot parses");
        assert_eq!(survey.metadata.client_name, "Acme Mining");
        assert_eq!(survey.equipment[0].post_calibration, "94.2");
        assert_eq!(survey.equipment[1].kind, Some(EquipmentKind::Calibrator));

        let path = AreaPath::sub(0, 0);
        let measurements = survey.measurements_at(&path);
        assert_eq!(measurements.len(), 1);
        assert_eq!(measurements[0].readings, vec!["90", "92", "88"]);
        assert_eq!(measurements[0].exposure_time, "8");
        assert_eq!(survey.issued_status_at(&path), Some(YesNo::Yes));
    }

    #[test]
    fn unselected_form_fields_still_decode() {
        let json = r#"{
            "equipment": [{"id": "slm-1", "type": ""}],
            "areas": [{"id": "a1", "name": "Kiln"}, {"id": "a2", "name": "Yard"}],
            "hearingProtectionDevices": {
                "{\"main\":0}": [
                    {"type": "Earmuff", "snrOrNrr": "", "snrValue": "", "condition": "", "training": "", "fitting": null, "maintenance": "Yes"}
                ]
            },
            "hearingIssuedStatus": {"{\"main\":0}": "", "{\"main\":1}": "No"},
            "employeesByArea": {
                "{\"main\":0}": [
                    {"id": "e1", "gender": "", "baselineTest": {"testType": "", "testDate": "2025-01-10"}}
                ]
            }
        }"#;

        let survey: SurveyData = serde_json::from_str(json).expect("half-filled snapshot parses");
        assert_eq!(survey.equipment[0].kind, None);

        let kiln = AreaPath::main(0);
        let device = &survey.devices_at(&kiln)[0];
        assert_eq!(device.snr_or_nrr, None);
        assert_eq!(device.condition, DeviceCondition::Poor);
        assert_eq!(device.training, YesNo::No);
        assert_eq!(device.fitting, YesNo::No);
        assert_eq!(device.maintenance, YesNo::Yes);

        assert_eq!(survey.issued_status_at(&kiln), None);
        assert_eq!(survey.issued_status_at(&AreaPath::main(1)), Some(YesNo::No));

        let employee = &survey.employees_at(&kiln)[0];
        assert_eq!(employee.gender, Gender::Other);
        let baseline = employee.baseline_test.as_ref().expect("baseline kept");
        assert_eq!(baseline.test_type, None);
        assert_eq!(baseline.test_date, NaiveDate::from_ymd_opt(2025, 1, 10));
    }

    #[test]
    fn audiogram_uses_frequency_keys() {
        let json = r#"{"500": {"left": 10, "right": "15"}, "4000": {"left": 35, "right": 40}}"#;
        let audiogram: AudiogramData = serde_json::from_str(json).expect("audiogram parses");
        assert_eq!(audiogram.threshold(Frequency::Hz500, Ear::Right), 15.0);
        assert_eq!(audiogram.threshold(Frequency::Hz4000, Ear::Left), 35.0);
        assert_eq!(audiogram.threshold(Frequency::Hz8000, Ear::Left), 0.0);
    }

    #[test]
    fn employee_latest_test_prefers_periodic() {
        let baseline = AudiometryTest {
            test_type: Some(TestType::Baseline),
            test_date: NaiveDate::from_ymd_opt(2023, 1, 5),
            audiogram: AudiogramData::flat(10.0),
            tester_name: String::new(),
            tester_qualification: String::new(),
            calibration_date: None,
        };
        let mut employee = Employee::new("e1", "Thandi", "Nkosi");
        assert!(employee.latest_test().is_none());

        employee.baseline_test = Some(baseline.clone());
        assert_eq!(employee.latest_test(), Some(&baseline));

        let annual = AudiometryTest {
            test_type: Some(TestType::Annual),
            test_date: NaiveDate::from_ymd_opt(2024, 1, 8),
            ..baseline
        };
        employee.periodic_tests.push(annual.clone());
        assert_eq!(employee.latest_test(), Some(&annual));
        assert_eq!(employee.display_name(), "Thandi Nkosi");
    }
}
