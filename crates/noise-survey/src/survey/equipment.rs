use super::domain::{Equipment, EquipmentKind, StatusSeverity};
use super::values::{parse_number, round1};
use chrono::NaiveDate;
use serde::Serialize;

/// Pre/post calibration drift beyond this invalidates the measurements, dB.
pub const DRIFT_LIMIT_DB: f64 = 1.0;
pub const DRIFT_WARNING_DB: f64 = 0.5;
/// Calibration certificates are valid for one year.
pub const CERTIFICATE_VALID_DAYS: i64 = 365;
pub const CERTIFICATE_WARNING_DAYS: i64 = 30;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalibrationCheck {
    pub status: StatusSeverity,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub drift_db: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub certificate_age_days: Option<i64>,
}

impl CalibrationCheck {
    fn drift(status: StatusSeverity, drift: f64, message: String) -> Self {
        Self {
            status,
            message,
            drift_db: Some(drift),
            certificate_age_days: None,
        }
    }

    fn certificate(status: StatusSeverity, age: Option<i64>, message: String) -> Self {
        Self {
            status,
            message,
            drift_db: None,
            certificate_age_days: age,
        }
    }
}

/// Field check of a sound level meter's pre/post calibration readings.
pub fn check_calibration_drift(pre: &str, post: &str) -> CalibrationCheck {
    let (Some(pre), Some(post)) = (parse_number(pre), parse_number(post)) else {
        return CalibrationCheck {
            status: StatusSeverity::Warning,
            message: "Pre and post calibration readings are incomplete".to_string(),
            drift_db: None,
            certificate_age_days: None,
        };
    };

    let drift = round1((post - pre).abs());
    if drift > DRIFT_LIMIT_DB {
        CalibrationCheck::drift(
            StatusSeverity::Error,
            drift,
            format!("Calibration drift of {drift:.1} dB exceeds the 1.0 dB limit; measurements are invalid"),
        )
    } else if drift > DRIFT_WARNING_DB {
        CalibrationCheck::drift(
            StatusSeverity::Warning,
            drift,
            format!("Calibration drift of {drift:.1} dB is approaching the 1.0 dB limit"),
        )
    } else {
        CalibrationCheck::drift(
            StatusSeverity::Success,
            drift,
            format!("Calibration drift of {drift:.1} dB is within tolerance"),
        )
    }
}

pub fn check_certificate(calibration_date: Option<NaiveDate>, today: NaiveDate) -> CalibrationCheck {
    let Some(date) = calibration_date else {
        return CalibrationCheck::certificate(
            StatusSeverity::Warning,
            None,
            "No calibration certificate date recorded".to_string(),
        );
    };

    let age = (today - date).num_days();
    if age > CERTIFICATE_VALID_DAYS {
        CalibrationCheck::certificate(
            StatusSeverity::Error,
            Some(age),
            format!("Calibration certificate dated {date} has expired ({age} days old)"),
        )
    } else if age > CERTIFICATE_VALID_DAYS - CERTIFICATE_WARNING_DAYS {
        let remaining = CERTIFICATE_VALID_DAYS - age;
        CalibrationCheck::certificate(
            StatusSeverity::Warning,
            Some(age),
            format!("Calibration certificate dated {date} expires in {remaining} days"),
        )
    } else {
        CalibrationCheck::certificate(
            StatusSeverity::Success,
            Some(age),
            format!("Calibration certificate dated {date} is current"),
        )
    }
}

/// The audit-critical check for this kind of equipment.
pub fn check_equipment(equipment: &Equipment, today: NaiveDate) -> CalibrationCheck {
    match equipment.kind {
        Some(EquipmentKind::SoundLevelMeter) => {
            check_calibration_drift(&equipment.pre_calibration, &equipment.post_calibration)
        }
        Some(EquipmentKind::Calibrator) => check_certificate(equipment.calibration_date, today),
        None => CalibrationCheck {
            status: StatusSeverity::Warning,
            message: "Equipment type not recorded; calibration cannot be checked".to_string(),
            drift_db: None,
            certificate_age_days: None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 1).expect("valid date")
    }

    #[test]
    fn drift_bands() {
        assert_eq!(check_calibration_drift("94.0", "94.3").status, StatusSeverity::Success);
        assert_eq!(check_calibration_drift("94.0", "94.5").status, StatusSeverity::Success);
        assert_eq!(check_calibration_drift("94.0", "94.6").status, StatusSeverity::Warning);
        assert_eq!(check_calibration_drift("94.0", "95.0").status, StatusSeverity::Warning);

        let failed = check_calibration_drift("94.0", "92.8");
        assert_eq!(failed.status, StatusSeverity::Error);
        assert_eq!(failed.drift_db, Some(1.2));
    }

    #[test]
    fn drift_requires_both_readings() {
        let check = check_calibration_drift("94.0", "");
        assert_eq!(check.status, StatusSeverity::Warning);
        assert!(check.drift_db.is_none());
    }

    #[test]
    fn certificate_age_bands() {
        let today = today();
        let fresh = check_certificate(NaiveDate::from_ymd_opt(2025, 1, 10), today);
        assert_eq!(fresh.status, StatusSeverity::Success);

        let near = check_certificate(NaiveDate::from_ymd_opt(2024, 6, 20), today);
        assert_eq!(near.status, StatusSeverity::Warning);
        assert!(near.message.contains("expires in"));

        let expired = check_certificate(NaiveDate::from_ymd_opt(2024, 5, 1), today);
        assert_eq!(expired.status, StatusSeverity::Error);
        assert_eq!(expired.certificate_age_days, Some(396));

        assert_eq!(check_certificate(None, today).status, StatusSeverity::Warning);
    }

    #[test]
    fn untyped_equipment_is_flagged() {
        let equipment = Equipment {
            id: "x-1".to_string(),
            kind: None,
            name: String::new(),
            serial: String::new(),
            weighting: String::new(),
            response_mode: String::new(),
            pre_calibration: "94.0".to_string(),
            during_calibration: String::new(),
            post_calibration: "94.0".to_string(),
            calibration_date: None,
            area_ref: None,
        };
        let check = check_equipment(&equipment, today());
        assert_eq!(check.status, StatusSeverity::Warning);
        assert!(check.message.contains("type not recorded"));
    }
}
