//! Hearing protection adequacy.
//!
//! Manufacturer ratings are derated before use: SNR loses 4 dB, NRR is
//! converted with `(NRR - 7) / 2`. The protected level never drops below the
//! 40 dB(A) ambient floor. Levels are kept unrounded here so band edges are
//! judged on the real value; rounding happens where they are displayed.

use super::domain::{DeviceCondition, HearingProtectionDevice, RatingType, StatusSeverity};
use super::values::{number_or_zero, round1};
use serde::{Deserialize, Serialize};

pub const AMBIENT_FLOOR: f64 = 40.0;
/// Attenuation beyond this isolates the wearer from warning signals.
pub const OVER_PROTECTION_DB: f64 = 25.0;
/// Protected level aimed for when no device gets below 85 dB(A).
pub const TARGET_PROTECTED_LEVEL: f64 = 80.0;

pub fn effective_attenuation(rating: RatingType, value: f64) -> f64 {
    match rating {
        RatingType::Snr => (value - 4.0).max(0.0),
        RatingType::Nrr => ((value - 7.0) / 2.0).max(0.0),
    }
}

pub fn protected_exposure(actual_lex8h: f64, rating: RatingType, value: f64) -> f64 {
    floored(actual_lex8h - effective_attenuation(rating, value))
}

fn floored(level: f64) -> f64 {
    level.max(AMBIENT_FLOOR)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AdequacyLevel {
    OverProtected,
    Excellent,
    Good,
    Acceptable,
    Marginal,
    Inadequate,
}

impl AdequacyLevel {
    pub const fn label(self) -> &'static str {
        match self {
            Self::OverProtected => "Over-protected",
            Self::Excellent => "Excellent",
            Self::Good => "Good",
            Self::Acceptable => "Acceptable",
            Self::Marginal => "Marginal",
            Self::Inadequate => "Inadequate",
        }
    }

    pub const fn is_adequate(self) -> bool {
        !matches!(self, Self::Marginal | Self::Inadequate)
    }

    pub const fn severity(self) -> StatusSeverity {
        match self {
            Self::OverProtected | Self::Marginal => StatusSeverity::Warning,
            Self::Excellent | Self::Good => StatusSeverity::Success,
            Self::Acceptable => StatusSeverity::Info,
            Self::Inadequate => StatusSeverity::Error,
        }
    }

    fn message(self) -> &'static str {
        match self {
            Self::OverProtected => {
                "Attenuation exceeds 25 dB; the wearer may not hear warning signals or speech"
            }
            Self::Excellent => "Protected exposure is well below 75 dB(A)",
            Self::Good => "Protected exposure is below 80 dB(A)",
            Self::Acceptable => "Protected exposure is below the 85 dB(A) action level",
            Self::Marginal => "Protected exposure remains at the 85 dB(A) action level",
            Self::Inadequate => "Protected exposure remains at or above the 87 dB(A) limit",
        }
    }

    fn recommendations(self) -> &'static [&'static str] {
        match self {
            Self::OverProtected => &[
                "Select a device with lower attenuation",
                "Confirm warning signals and alarms remain audible",
            ],
            Self::Excellent | Self::Good => &["Maintain current hearing protection programme"],
            Self::Acceptable => &[
                "Verify correct fitting during use",
                "Reassess if noise levels increase",
            ],
            Self::Marginal => &[
                "Select a device with higher attenuation",
                "Check fit and wearing time",
                "Reduce noise at source where practicable",
            ],
            Self::Inadequate => &[
                "Replace with higher-rated protection immediately",
                "Consider dual protection (plugs and muffs)",
                "Restrict time in the zone until exposure is controlled",
            ],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdequacyAssessment {
    pub level: AdequacyLevel,
    pub is_adequate: bool,
    /// Rounded to 0.1 dB for display.
    pub reduction: f64,
    pub protected_lex8h: f64,
    pub severity: StatusSeverity,
    pub message: String,
    pub recommendations: Vec<String>,
}

/// Bands are checked in order; over-protection wins over the absolute levels.
pub fn assess_adequacy(actual_lex8h: f64, protected_lex8h: f64) -> AdequacyAssessment {
    let reduction = actual_lex8h - protected_lex8h;
    let level = if reduction > OVER_PROTECTION_DB {
        AdequacyLevel::OverProtected
    } else if protected_lex8h < 75.0 {
        AdequacyLevel::Excellent
    } else if protected_lex8h < 80.0 {
        AdequacyLevel::Good
    } else if protected_lex8h < 85.0 {
        AdequacyLevel::Acceptable
    } else if protected_lex8h < 87.0 {
        AdequacyLevel::Marginal
    } else {
        AdequacyLevel::Inadequate
    };

    AdequacyAssessment {
        level,
        is_adequate: level.is_adequate(),
        reduction: round1(reduction),
        protected_lex8h,
        severity: level.severity(),
        message: level.message().to_string(),
        recommendations: level
            .recommendations()
            .iter()
            .map(|item| item.to_string())
            .collect(),
    }
}

impl HearingProtectionDevice {
    pub fn rating_value(&self) -> f64 {
        number_or_zero(&self.snr_value)
    }

    /// No rating type selected means no credited attenuation.
    pub fn attenuation(&self) -> f64 {
        self.snr_or_nrr
            .map_or(0.0, |rating| effective_attenuation(rating, self.rating_value()))
    }

    pub fn protected_level(&self, actual_lex8h: f64) -> f64 {
        floored(actual_lex8h - self.attenuation())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceRecommendation {
    /// Index into the device list that was passed in.
    pub index: usize,
    pub protected_lex8h: f64,
    pub is_adequate: bool,
    pub reason: String,
}

/// Choose the device to issue for an exposure.
///
/// Among good-condition devices reaching below 85 dB(A), the one with the least
/// attenuation wins; otherwise the one closest to 80 dB(A). The first device
/// wins any tie.
pub fn recommend_best_device(
    devices: &[HearingProtectionDevice],
    actual_lex8h: f64,
) -> Option<DeviceRecommendation> {
    let first = devices.first()?;

    let good: Vec<(usize, &HearingProtectionDevice)> = devices
        .iter()
        .enumerate()
        .filter(|(_, device)| device.condition == DeviceCondition::Good)
        .collect();

    if good.is_empty() {
        let protected_lex8h = first.protected_level(actual_lex8h);
        return Some(DeviceRecommendation {
            index: 0,
            protected_lex8h,
            is_adequate: false,
            reason: "No devices in good condition; all hearing protection needs replacement"
                .to_string(),
        });
    }

    let mut adequate: Option<(usize, f64, f64)> = None;
    for (index, device) in &good {
        let protected = device.protected_level(actual_lex8h);
        if protected >= 85.0 {
            continue;
        }
        let attenuation = device.attenuation();
        match adequate {
            Some((_, best_attenuation, _)) if best_attenuation <= attenuation => {}
            _ => adequate = Some((*index, attenuation, protected)),
        }
    }

    if let Some((index, attenuation, protected_lex8h)) = adequate {
        return Some(DeviceRecommendation {
            index,
            protected_lex8h,
            is_adequate: true,
            reason: format!(
                "Lowest attenuation ({attenuation:.1} dB) that brings exposure below 85 dB(A)"
            ),
        });
    }

    let mut closest: Option<(usize, f64, f64)> = None;
    for (index, device) in &good {
        let protected = device.protected_level(actual_lex8h);
        let distance = (protected - TARGET_PROTECTED_LEVEL).abs();
        match closest {
            Some((_, best_distance, _)) if best_distance <= distance => {}
            _ => closest = Some((*index, distance, protected)),
        }
    }

    closest.map(|(index, _, protected_lex8h)| DeviceRecommendation {
        index,
        protected_lex8h,
        is_adequate: false,
        reason: format!(
            "No available device reaches 85 dB(A); closest protected level is {protected_lex8h:.1} dB(A)"
        ),
    })
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProtectionSummary {
    pub device_index: usize,
    pub device_type: String,
    pub rating_type: Option<RatingType>,
    pub rating_value: f64,
    pub effective_attenuation: f64,
    pub actual_lex8h: f64,
    pub protected_lex8h: f64,
    pub assessment: AdequacyAssessment,
}

/// Assessment for the device in use: the first good-condition device, or the
/// first device when none are in good condition.
///
/// `None` means there is nothing to assess (no devices, or no exposure data).
pub fn get_protection_summary(
    actual_lex8h: Option<f64>,
    devices: &[HearingProtectionDevice],
) -> Option<ProtectionSummary> {
    let actual = actual_lex8h.filter(|level| level.is_finite() && *level > 0.0)?;
    let (device_index, device) = devices
        .iter()
        .enumerate()
        .find(|(_, device)| device.condition == DeviceCondition::Good)
        .or_else(|| devices.first().map(|device| (0, device)))?;

    let protected_lex8h = device.protected_level(actual);
    Some(ProtectionSummary {
        device_index,
        device_type: device.device_type.clone(),
        rating_type: device.snr_or_nrr,
        rating_value: device.rating_value(),
        effective_attenuation: device.attenuation(),
        actual_lex8h: actual,
        protected_lex8h,
        assessment: assess_adequacy(actual, protected_lex8h),
    })
}
