//! Audiometric surveillance: threshold shift detection, hearing loss grading,
//! and the per-employee surveillance summary.

use super::domain::{
    AudiogramData, AudiometryTest, Ear, Employee, Frequency, Gender, StatusSeverity, TestType,
};
use super::values::round1;
use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Band used for standard threshold shift detection.
pub const STS_FREQUENCIES: [Frequency; 3] = [Frequency::Hz2000, Frequency::Hz3000, Frequency::Hz4000];
pub const PTA_FREQUENCIES: [Frequency; 4] = [
    Frequency::Hz500,
    Frequency::Hz1000,
    Frequency::Hz2000,
    Frequency::Hz4000,
];
pub const STS_THRESHOLD_DB: f64 = 10.0;
pub const MIN_THRESHOLD_DB: f64 = -10.0;
pub const MAX_THRESHOLD_DB: f64 = 120.0;

/// Mean hearing threshold over `frequencies` for one ear, dB HL, rounded to
/// 0.1 dB for display.
pub fn hta(audiogram: &AudiogramData, frequencies: &[Frequency], ear: Ear) -> f64 {
    round1(mean_threshold(audiogram, frequencies, ear))
}

fn mean_threshold(audiogram: &AudiogramData, frequencies: &[Frequency], ear: Ear) -> f64 {
    if frequencies.is_empty() {
        return 0.0;
    }
    let total: f64 = frequencies
        .iter()
        .map(|frequency| audiogram.threshold(*frequency, ear))
        .sum();
    total / frequencies.len() as f64
}

fn sts_shift(baseline: &AudiogramData, current: &AudiogramData, ear: Ear) -> f64 {
    mean_threshold(current, &STS_FREQUENCIES, ear)
        - mean_threshold(baseline, &STS_FREQUENCIES, ear)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StsSeverity {
    None,
    Mild,
    Moderate,
    Severe,
}

impl StsSeverity {
    pub fn from_shift(shift: f64) -> Self {
        if shift >= 25.0 {
            Self::Severe
        } else if shift >= 20.0 {
            Self::Moderate
        } else if shift >= STS_THRESHOLD_DB {
            Self::Mild
        } else {
            Self::None
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::None => "None",
            Self::Mild => "Mild",
            Self::Moderate => "Moderate",
            Self::Severe => "Severe",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AffectedEar {
    None,
    Left,
    Right,
    Both,
}

impl AffectedEar {
    pub const fn label(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Left => "left",
            Self::Right => "right",
            Self::Both => "both",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StsResult {
    pub has_sts: bool,
    /// Shifts are rounded to 0.1 dB; detection uses the unrounded values.
    pub left_shift: f64,
    pub right_shift: f64,
    pub affected_ear: AffectedEar,
    pub severity: StsSeverity,
    pub message: String,
}

impl StsResult {
    fn from_shifts(left_shift: f64, right_shift: f64) -> Self {
        let left = left_shift >= STS_THRESHOLD_DB;
        let right = right_shift >= STS_THRESHOLD_DB;
        let affected_ear = match (left, right) {
            (true, true) => AffectedEar::Both,
            (true, false) => AffectedEar::Left,
            (false, true) => AffectedEar::Right,
            (false, false) => AffectedEar::None,
        };
        let has_sts = left || right;
        let severity = StsSeverity::from_shift(left_shift.max(right_shift));
        let left_shift = round1(left_shift);
        let right_shift = round1(right_shift);
        let message = if has_sts {
            format!(
                "{} standard threshold shift in {} ear(s): left {left_shift:.1} dB, right {right_shift:.1} dB",
                severity.label(),
                affected_ear.label()
            )
        } else {
            format!(
                "No standard threshold shift: left {left_shift:.1} dB, right {right_shift:.1} dB"
            )
        };

        Self {
            has_sts,
            left_shift,
            right_shift,
            affected_ear,
            severity,
            message,
        }
    }
}

/// Either ear shifting by 10 dB or more at 2/3/4 kHz is a standard threshold
/// shift. Ears are never averaged together.
pub fn detect_sts(baseline: &AudiogramData, current: &AudiogramData) -> StsResult {
    StsResult::from_shifts(
        sts_shift(baseline, current, Ear::Left),
        sts_shift(baseline, current, Ear::Right),
    )
}

/// Approximate age-related threshold increase in dB per year above 20.
fn presbycusis_rate(frequency: Frequency) -> f64 {
    match frequency {
        Frequency::Hz500 => 0.05,
        Frequency::Hz1000 => 0.07,
        Frequency::Hz2000 => 0.12,
        Frequency::Hz3000 => 0.2,
        Frequency::Hz4000 => 0.3,
        Frequency::Hz6000 => 0.4,
        Frequency::Hz8000 => 0.5,
    }
}

/// Linear approximation of the ISO 1999 Annex B age correction. Non-decreasing
/// in both age and frequency; zero below 18.
pub fn age_correction(age: u32, frequency: Frequency, gender: Gender) -> f64 {
    if age < 18 {
        return 0.0;
    }
    let years_above_20 = f64::from(age.saturating_sub(20));
    let gender_factor = match gender {
        Gender::Male => 1.2,
        Gender::Female | Gender::Other => 1.0,
    };
    round1(years_above_20 * presbycusis_rate(frequency) * gender_factor)
}

/// Threshold shift with the expected age-related change between the two tests
/// removed. Informational only; `detect_sts` drives the employee STS flag.
pub fn detect_sts_age_adjusted(
    baseline: &AudiogramData,
    current: &AudiogramData,
    baseline_age: u32,
    current_age: u32,
    gender: Gender,
) -> StsResult {
    let allowance: f64 = STS_FREQUENCIES
        .iter()
        .map(|frequency| {
            age_correction(current_age, *frequency, gender)
                - age_correction(baseline_age, *frequency, gender)
        })
        .sum::<f64>()
        / STS_FREQUENCIES.len() as f64;

    StsResult::from_shifts(
        sts_shift(baseline, current, Ear::Left) - allowance,
        sts_shift(baseline, current, Ear::Right) - allowance,
    )
}

/// Whole years between `date_of_birth` and `on`; `None` when `on` precedes birth.
pub fn age_at(date_of_birth: NaiveDate, on: NaiveDate) -> Option<u32> {
    let mut years = on.year() - date_of_birth.year();
    if (on.month(), on.day()) < (date_of_birth.month(), date_of_birth.day()) {
        years -= 1;
    }
    u32::try_from(years).ok()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HearingLossGrade {
    Normal,
    Mild,
    Moderate,
    Severe,
    Profound,
}

impl HearingLossGrade {
    /// WHO grades on the pure-tone average.
    pub fn from_pta(pta: f64) -> Self {
        if pta <= 25.0 {
            Self::Normal
        } else if pta <= 40.0 {
            Self::Mild
        } else if pta <= 60.0 {
            Self::Moderate
        } else if pta <= 80.0 {
            Self::Severe
        } else {
            Self::Profound
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Normal => "Normal",
            Self::Mild => "Mild",
            Self::Moderate => "Moderate",
            Self::Severe => "Severe",
            Self::Profound => "Profound",
        }
    }

    pub const fn severity(self) -> StatusSeverity {
        match self {
            Self::Normal => StatusSeverity::Success,
            Self::Mild => StatusSeverity::Info,
            Self::Moderate => StatusSeverity::Warning,
            Self::Severe | Self::Profound => StatusSeverity::Error,
        }
    }

    fn actions(self) -> &'static [&'static str] {
        match self {
            Self::Normal => &[],
            Self::Mild => &["Monitor closely at the next annual test"],
            Self::Moderate => &[
                "Refer for audiological evaluation",
                "Review hearing protection suitability",
            ],
            Self::Severe | Self::Profound => &[
                "Refer to an ENT specialist",
                "Assess fitness for work in noise zones",
            ],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HearingLossClassification {
    pub ear: Ear,
    pub pta: f64,
    pub classification: HearingLossGrade,
    pub message: String,
    pub severity: StatusSeverity,
}

pub fn classify_hearing_loss(audiogram: &AudiogramData, ear: Ear) -> HearingLossClassification {
    let classification =
        HearingLossGrade::from_pta(mean_threshold(audiogram, &PTA_FREQUENCIES, ear));
    let pta = hta(audiogram, &PTA_FREQUENCIES, ear);
    HearingLossClassification {
        ear,
        pta,
        classification,
        message: format!(
            "{} hearing in the {} ear (PTA {pta:.1} dB HL)",
            classification.label(),
            ear.label()
        ),
        severity: classification.severity(),
    }
}

/// One message per threshold outside the audiometer's -10..=120 dB HL range.
pub fn validate_audiogram(audiogram: &AudiogramData) -> Vec<String> {
    let mut errors = Vec::new();
    for frequency in Frequency::ALL {
        for ear in [Ear::Left, Ear::Right] {
            let value = audiogram.threshold(frequency, ear);
            if !(MIN_THRESHOLD_DB..=MAX_THRESHOLD_DB).contains(&value) {
                errors.push(format!(
                    "{} Hz {} ear: {value} dB HL is outside the {MIN_THRESHOLD_DB} to {MAX_THRESHOLD_DB} dB HL range",
                    frequency.hz(),
                    ear.label()
                ));
            }
        }
    }
    errors
}

/// Record a new test against an employee.
///
/// The first Baseline test becomes the baseline; anything else is appended to
/// the periodic tests and compared against the baseline. Once an STS has been
/// detected the flag stays set, and its date and details describe the first
/// detection.
pub fn apply_new_test(mut employee: Employee, test: AudiometryTest) -> Employee {
    if test.test_type == Some(TestType::Baseline) && employee.baseline_test.is_none() {
        employee.baseline_test = Some(test);
        return employee;
    }

    let sts = employee
        .baseline_test
        .as_ref()
        .map(|baseline| detect_sts(&baseline.audiogram, &test.audiogram));

    if let Some(sts) = sts.filter(|result| result.has_sts) {
        if !employee.has_sts {
            debug!(
                employee = %employee.id,
                severity = sts.severity.label(),
                "standard threshold shift detected"
            );
            employee.has_sts = true;
            employee.sts_date = test.test_date;
            employee.sts_details = Some(sts.message);
        }
    }

    employee.periodic_tests.push(test);
    employee
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudiometrySummary {
    pub employee_id: String,
    pub employee_name: String,
    pub has_baseline: bool,
    pub latest_test_type: Option<TestType>,
    pub latest_test_date: Option<NaiveDate>,
    pub sts: Option<StsResult>,
    pub left_ear: Option<HearingLossClassification>,
    pub right_ear: Option<HearingLossClassification>,
    pub next_test_due: Option<NaiveDate>,
    pub retest_overdue: bool,
    pub recommendations: Vec<String>,
}

fn sts_actions(severity: StsSeverity) -> &'static [&'static str] {
    match severity {
        StsSeverity::Severe => &[
            "Urgent referral to an occupational medical practitioner",
            "Remove from noise exposure pending medical review",
            "Investigate noise exposure and hearing protection use in the work area",
        ],
        StsSeverity::Moderate => &[
            "Refer for medical evaluation within 30 days",
            "Retest within 30 days to confirm the shift",
            "Review hearing protection fit and suitability",
        ],
        StsSeverity::Mild => &[
            "Retest within 30 days to confirm the shift",
            "Reinforce hearing protection use and training",
        ],
        StsSeverity::None => &[],
    }
}

/// Surveillance status of one employee as of `today`.
pub fn get_audiometry_summary(employee: &Employee, today: NaiveDate) -> AudiometrySummary {
    let Some(baseline) = employee.baseline_test.as_ref() else {
        return AudiometrySummary {
            employee_id: employee.id.clone(),
            employee_name: employee.display_name(),
            has_baseline: false,
            latest_test_type: None,
            latest_test_date: None,
            sts: None,
            left_ear: None,
            right_ear: None,
            next_test_due: None,
            retest_overdue: false,
            recommendations: vec![
                "Baseline audiometric test required before further surveillance".to_string(),
            ],
        };
    };

    let latest = employee.latest_test().unwrap_or(baseline);
    let sts = employee
        .periodic_tests
        .last()
        .map(|current| detect_sts(&baseline.audiogram, &current.audiogram));
    let left = classify_hearing_loss(&latest.audiogram, Ear::Left);
    let right = classify_hearing_loss(&latest.audiogram, Ear::Right);

    let next_test_due = latest
        .test_date
        .and_then(|date| date.checked_add_months(Months::new(12)));
    let retest_overdue = next_test_due.is_some_and(|due| due < today);

    let mut recommendations: Vec<String> = Vec::new();
    let sts_firing = sts.as_ref().is_some_and(|result| result.has_sts);
    if let Some(result) = sts.as_ref().filter(|result| result.has_sts) {
        recommendations.extend(sts_actions(result.severity).iter().map(|item| item.to_string()));
    }
    if !sts_firing {
        let worst = left.classification.max(right.classification);
        recommendations.extend(worst.actions().iter().map(|item| item.to_string()));
    }
    if retest_overdue {
        if let Some(due) = next_test_due {
            recommendations.push(format!("Annual audiometric test overdue since {due}"));
        }
    }
    if recommendations.is_empty() {
        recommendations.push("Continue annual audiometric monitoring".to_string());
    }

    AudiometrySummary {
        employee_id: employee.id.clone(),
        employee_name: employee.display_name(),
        has_baseline: true,
        latest_test_type: latest.test_type,
        latest_test_date: latest.test_date,
        sts,
        left_ear: Some(left),
        right_ear: Some(right),
        next_test_due,
        retest_overdue,
        recommendations,
    }
}
