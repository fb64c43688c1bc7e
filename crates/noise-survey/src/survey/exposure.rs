//! Noise exposure calculations (SANS 10083).
//!
//! Decibel levels are always combined in the power domain, and the dose model
//! uses a 3 dB exchange rate around an 85 dB(A) / 8 hour criterion.

use super::domain::{Measurement, StatusSeverity};
use super::values::{number_or_zero, parse_readings, round1};
use serde::{Deserialize, Serialize};

/// Reference duration for LEX,8h normalisation (hours).
pub const REFERENCE_HOURS: f64 = 8.0;
/// Action level and dose criterion, dB(A).
pub const ACTION_LEVEL: f64 = 85.0;
/// Exposure limit, dB(A).
pub const LIMIT_LEVEL: f64 = 87.0;
/// Exchange rate for the dose model, dB.
pub const EXCHANGE_RATE: f64 = 3.0;

/// Energetic average: `10·log10(mean(10^(L/10)))`, one decimal.
///
/// Non-finite readings are ignored; an empty set averages to 0.
pub fn average_laeq(readings: &[f64]) -> f64 {
    let finite: Vec<f64> = readings
        .iter()
        .copied()
        .filter(|level| level.is_finite())
        .collect();
    if finite.is_empty() {
        return 0.0;
    }

    let mean_power =
        finite.iter().map(|level| 10f64.powf(level / 10.0)).sum::<f64>() / finite.len() as f64;
    round1(10.0 * mean_power.log10())
}

/// Normalise an exposure to the 8 hour reference: `LAeq + 10·log10(T/8)`.
pub fn lex_8h(laeq: f64, exposure_hours: f64) -> f64 {
    if exposure_hours.is_nan() || exposure_hours <= 0.0 {
        return 0.0;
    }
    laeq + 10.0 * (exposure_hours / REFERENCE_HOURS).log10()
}

/// Hours allowed at `laeq` before the daily dose reaches 100%.
pub fn permitted_exposure_time(laeq: f64) -> f64 {
    if laeq < ACTION_LEVEL {
        return REFERENCE_HOURS;
    }
    REFERENCE_HOURS * 2f64.powf((ACTION_LEVEL - laeq) / EXCHANGE_RATE)
}

/// Daily noise dose in percent. Exposure below 85 dB(A) costs no dose.
pub fn noise_dose(laeq: f64, exposure_hours: f64) -> f64 {
    if laeq < ACTION_LEVEL || exposure_hours.is_nan() || exposure_hours <= 0.0 {
        return 0.0;
    }
    round1(100.0 * exposure_hours / permitted_exposure_time(laeq))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Zone {
    Green,
    Orange,
    Red,
}

impl Zone {
    pub fn from_lex8h(lex8h: f64) -> Self {
        if lex8h >= LIMIT_LEVEL {
            Self::Red
        } else if lex8h >= ACTION_LEVEL {
            Self::Orange
        } else {
            Self::Green
        }
    }

    pub const fn ordered() -> [Self; 3] {
        [Self::Green, Self::Orange, Self::Red]
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Green => "Green",
            Self::Orange => "Orange",
            Self::Red => "Red",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Green => "Green (below 85 dB(A))",
            Self::Orange => "Orange (85 to 87 dB(A))",
            Self::Red => "Red (87 dB(A) and above)",
        }
    }

    pub const fn requirements(self) -> &'static [&'static str] {
        match self {
            Self::Green => &[
                "No specific hearing conservation measures required",
                "Maintain existing noise control measures",
                "Re-survey when processes or equipment change",
            ],
            Self::Orange => &[
                "Investigate practicable noise reduction measures",
                "Make hearing protection available to exposed employees",
                "Inform employees of the noise exposure and its risks",
                "Consider enrolling exposed employees in audiometric surveillance",
            ],
            Self::Red => &[
                "Demarcate the area as a noise zone with warning signs",
                "Hearing protection is mandatory for everyone entering the zone",
                "Baseline and annual audiometry for all exposed employees",
                "Implement engineering and administrative noise controls",
                "Maintain a documented hearing conservation programme",
            ],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneClassification {
    pub zone: Zone,
    pub label: String,
    pub requirements: Vec<String>,
}

pub fn classify_zone(lex8h: f64) -> ZoneClassification {
    let zone = Zone::from_lex8h(lex8h);
    ZoneClassification {
        zone,
        label: zone.label().to_string(),
        requirements: zone
            .requirements()
            .iter()
            .map(|req| req.to_string())
            .collect(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ComplianceLevel {
    Safe,
    Action,
    LimitExceeded,
}

impl ComplianceLevel {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Safe => "Below action level",
            Self::Action => "Action level reached",
            Self::LimitExceeded => "Exposure limit exceeded",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplianceResult {
    pub is_compliant: bool,
    pub level: ComplianceLevel,
    pub action_required: Vec<String>,
    pub severity: StatusSeverity,
}

const LIMIT_ACTIONS: &[&str] = &[
    "Reduce exposure below 87 dB(A) through engineering controls",
    "Enforce mandatory hearing protection in the zone",
    "Enrol all exposed employees in audiometric testing",
    "Limit time spent in the zone through administrative controls",
];

const ACTION_LEVEL_ACTIONS: &[&str] = &[
    "Provide hearing protection and training on its use",
    "Assess feasibility of noise reduction at source",
    "Monitor exposure for changes",
];

const SAFE_ACTIONS: &[&str] = &["No action required"];

/// Action level exposure is compliant but flagged; the limit level is not.
pub fn check_compliance(lex8h: f64) -> ComplianceResult {
    let (level, severity, actions) = if lex8h >= LIMIT_LEVEL {
        (
            ComplianceLevel::LimitExceeded,
            StatusSeverity::Error,
            LIMIT_ACTIONS,
        )
    } else if lex8h >= ACTION_LEVEL {
        (
            ComplianceLevel::Action,
            StatusSeverity::Warning,
            ACTION_LEVEL_ACTIONS,
        )
    } else {
        (ComplianceLevel::Safe, StatusSeverity::Success, SAFE_ACTIONS)
    };

    ComplianceResult {
        is_compliant: lex8h < LIMIT_LEVEL,
        level,
        action_required: actions.iter().map(|action| action.to_string()).collect(),
        severity,
    }
}

/// Everything the exposure screens show for one set of inputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExposureSummary {
    pub laeq: f64,
    pub lex8h: f64,
    pub dose: f64,
    pub exposure_hours: f64,
    pub shift_hours: f64,
    pub permitted_time: f64,
    pub exceeds_limit: bool,
    pub zone: ZoneClassification,
    pub compliance: ComplianceResult,
}

pub fn get_exposure_summary(laeq: f64, exposure_hours: f64, shift_hours: f64) -> ExposureSummary {
    let lex8h = lex_8h(laeq, exposure_hours);
    let permitted_time = permitted_exposure_time(laeq);

    ExposureSummary {
        laeq,
        lex8h,
        dose: noise_dose(laeq, exposure_hours),
        exposure_hours,
        shift_hours,
        permitted_time,
        exceeds_limit: exposure_hours > permitted_time && laeq >= ACTION_LEVEL,
        zone: classify_zone(lex8h),
        compliance: check_compliance(lex8h),
    }
}

impl ExposureSummary {
    pub fn from_measurement(measurement: &Measurement) -> Self {
        let laeq = average_laeq(&parse_readings(&measurement.readings));
        get_exposure_summary(
            laeq,
            number_or_zero(&measurement.exposure_time),
            number_or_zero(&measurement.shift_duration),
        )
    }
}

/// Measurement with the highest LEX,8h; the first one wins a tie.
pub fn worst_case_exposure(measurements: &[Measurement]) -> Option<ExposureSummary> {
    measurements
        .iter()
        .map(ExposureSummary::from_measurement)
        .fold(None, |worst: Option<ExposureSummary>, candidate| match worst {
            Some(current) if current.lex8h >= candidate.lex8h => Some(current),
            _ => Some(candidate),
        })
}
