use super::{IssueCategory, IssueSeverity, ValidationIssue};
use crate::survey::area::{AreaPath, LeafArea};
use crate::survey::audiometry::{get_audiometry_summary, StsSeverity};
use crate::survey::domain::{
    DeviceCondition, Employee, EquipmentKind, StatusSeverity, SurveyData, YesNo,
};
use crate::survey::equipment::check_equipment as check_calibration;
use crate::survey::exposure::{worst_case_exposure, ExposureSummary, Zone};
use crate::survey::protection::{get_protection_summary, AdequacyLevel};
use crate::survey::values::{parse_number, parse_readings};
use chrono::{Months, NaiveDate};

fn one_year_after(date: NaiveDate) -> Option<NaiveDate> {
    date.checked_add_months(Months::new(12))
}

fn worst_case(data: &SurveyData, path: &AreaPath) -> Option<ExposureSummary> {
    worst_case_exposure(data.measurements_at(path))
}

fn kind_label(kind: Option<EquipmentKind>) -> &'static str {
    kind.map_or("Equipment", EquipmentKind::label)
}

fn area_label(data: &SurveyData, path: &AreaPath) -> String {
    path.display_name(&data.areas)
        .unwrap_or_else(|| path.key().to_string())
}

pub(crate) fn check_equipment(data: &SurveyData, today: NaiveDate) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    let category = IssueCategory::Equipment;

    let has_kind = |kind: EquipmentKind| data.equipment.iter().any(|item| item.kind == Some(kind));
    if !has_kind(EquipmentKind::SoundLevelMeter) {
        issues.push(ValidationIssue::new(
            IssueSeverity::Critical,
            category,
            "No sound level meter registered",
            "Register the sound level meter used for the survey",
        ));
    }
    if !has_kind(EquipmentKind::Calibrator) {
        issues.push(ValidationIssue::new(
            IssueSeverity::Critical,
            category,
            "No acoustic calibrator registered",
            "Register the field calibrator and its certificate date",
        ));
    }

    for item in &data.equipment {
        let check = check_calibration(item, today);
        let severity = match check.status {
            StatusSeverity::Error => IssueSeverity::Critical,
            StatusSeverity::Warning => IssueSeverity::Warning,
            StatusSeverity::Success | StatusSeverity::Info => continue,
        };
        let name = if item.name.trim().is_empty() {
            item.id.as_str()
        } else {
            item.name.as_str()
        };
        let recommendation = match item.kind {
            Some(EquipmentKind::SoundLevelMeter) => {
                "Record pre and post calibration readings and repeat measurements if drift exceeds 1 dB"
            }
            Some(EquipmentKind::Calibrator) => "Send the calibrator for accredited recalibration",
            None => "Record whether this instrument is a sound level meter or a calibrator",
        };
        issues.push(ValidationIssue::new(
            severity,
            category,
            format!("{} '{name}': {}", kind_label(item.kind), check.message),
            recommendation,
        ));
    }

    issues
}

pub(crate) fn check_references(data: &SurveyData) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    let category = IssueCategory::References;

    for (key, measurements) in &data.measurements_by_area {
        let area = area_label(data, &key.path());
        for (index, measurement) in measurements.iter().enumerate() {
            let number = index + 1;
            for (id, expected) in [
                (&measurement.slm_id, EquipmentKind::SoundLevelMeter),
                (&measurement.calibrator_id, EquipmentKind::Calibrator),
            ] {
                if id.trim().is_empty() {
                    issues.push(
                        ValidationIssue::new(
                            IssueSeverity::Warning,
                            category,
                            format!("Measurement {number} has no {} assigned", expected.label()),
                            format!("Select the {} used for this measurement", expected.label()),
                        )
                        .in_area(area.clone()),
                    );
                    continue;
                }

                match data.equipment_by_id(id) {
                    None => issues.push(
                        ValidationIssue::new(
                            IssueSeverity::Critical,
                            category,
                            format!("Measurement {number} references unknown equipment '{id}'"),
                            "Register the equipment or correct the measurement's equipment reference",
                        )
                        .in_area(area.clone()),
                    ),
                    Some(item) if item.kind != Some(expected) => issues.push(
                        ValidationIssue::new(
                            IssueSeverity::Warning,
                            category,
                            format!(
                                "Measurement {number} lists '{id}' as {} but it is registered as {}",
                                expected.label(),
                                item.kind.map_or("an untyped instrument", EquipmentKind::label)
                            ),
                            "Check which instrument was used for this measurement",
                        )
                        .in_area(area.clone()),
                    ),
                    Some(_) => {}
                }
            }
        }
    }

    for key in data.orphaned_keys() {
        issues.push(ValidationIssue::new(
            IssueSeverity::Critical,
            category,
            format!("Survey data is recorded against {key}, which is not an area in the survey"),
            "Re-enter the data under an existing area or restore the deleted area",
        ));
    }

    issues
}

pub(crate) fn check_measurements(data: &SurveyData, leaves: &[LeafArea<'_>]) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    let category = IssueCategory::Measurements;

    if leaves.is_empty() {
        issues.push(ValidationIssue::new(
            IssueSeverity::Critical,
            category,
            "No survey areas defined",
            "Add the areas surveyed before recording measurements",
        ));
        return issues;
    }

    let any_measured = leaves
        .iter()
        .any(|leaf| !data.measurements_at(&leaf.path).is_empty());
    if !any_measured {
        issues.push(ValidationIssue::new(
            IssueSeverity::Critical,
            category,
            "No measurements recorded in any area",
            "Record sound level measurements for each surveyed area",
        ));
        return issues;
    }

    for leaf in leaves {
        let measurements = data.measurements_at(&leaf.path);
        if measurements.is_empty() {
            issues.push(
                ValidationIssue::new(
                    IssueSeverity::Warning,
                    category,
                    "No measurements recorded",
                    "Record at least one measurement for this area",
                )
                .in_area(leaf.name.clone()),
            );
            continue;
        }

        for (index, measurement) in measurements.iter().enumerate() {
            let number = index + 1;
            if parse_readings(&measurement.readings).is_empty() {
                issues.push(
                    ValidationIssue::new(
                        IssueSeverity::Warning,
                        category,
                        format!("Measurement {number} has no valid readings"),
                        "Enter the LAeq readings taken for this measurement",
                    )
                    .in_area(leaf.name.clone()),
                );
            }

            let exposure = parse_number(&measurement.exposure_time);
            let shift = parse_number(&measurement.shift_duration);
            if let (Some(exposure), Some(shift)) = (exposure, shift) {
                if exposure > shift {
                    issues.push(
                        ValidationIssue::new(
                            IssueSeverity::Warning,
                            category,
                            format!(
                                "Measurement {number} exposure time ({exposure} h) exceeds the shift duration ({shift} h)"
                            ),
                            "Correct the exposure time or shift duration",
                        )
                        .in_area(leaf.name.clone()),
                    );
                }
            }
        }
    }

    issues
}

pub(crate) fn check_controls(data: &SurveyData, leaves: &[LeafArea<'_>]) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    for leaf in leaves {
        let Some(exposure) = worst_case(data, &leaf.path) else {
            continue;
        };
        let zone = exposure.zone.zone;
        let severity = match zone {
            Zone::Red => IssueSeverity::Critical,
            Zone::Orange => IssueSeverity::Warning,
            Zone::Green => continue,
        };

        let controls = data.controls_at(&leaf.path);
        let mut missing = Vec::new();
        if !controls.is_some_and(|c| c.has_engineering()) {
            missing.push("engineering");
        }
        if !controls.is_some_and(|c| c.has_administrative()) {
            missing.push("administrative");
        }
        if missing.is_empty() {
            continue;
        }

        issues.push(
            ValidationIssue::new(
                severity,
                IssueCategory::Controls,
                format!(
                    "{} zone (LEX,8h {:.1} dB(A)) without documented {} controls",
                    zone.name(),
                    exposure.lex8h,
                    missing.join(" and ")
                ),
                "Document the engineering and administrative noise controls in place",
            )
            .in_area(leaf.name.clone()),
        );
    }

    issues
}

pub(crate) fn check_hearing_protection(
    data: &SurveyData,
    leaves: &[LeafArea<'_>],
) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    let category = IssueCategory::HearingProtection;

    for leaf in leaves {
        let devices = data.devices_at(&leaf.path);
        let exposure = worst_case(data, &leaf.path);
        let zone = exposure.as_ref().map(|summary| summary.zone.zone);
        let not_issued = devices.is_empty() || data.issued_status_at(&leaf.path) == Some(YesNo::No);

        match zone {
            Some(Zone::Red) if not_issued => issues.push(
                ValidationIssue::new(
                    IssueSeverity::Critical,
                    category,
                    "No hearing protection issued in a red zone",
                    "Issue hearing protection rated for the measured exposure",
                )
                .in_area(leaf.name.clone()),
            ),
            Some(Zone::Orange) if devices.is_empty() => issues.push(
                ValidationIssue::new(
                    IssueSeverity::Warning,
                    category,
                    "No hearing protection recorded in an orange zone",
                    "Make hearing protection available to employees in this area",
                )
                .in_area(leaf.name.clone()),
            ),
            _ => {}
        }

        if matches!(zone, Some(Zone::Red) | Some(Zone::Orange)) && !devices.is_empty() {
            let actual = exposure.as_ref().map(|summary| summary.lex8h);
            if let Some(summary) = get_protection_summary(actual, devices) {
                let assessment = &summary.assessment;
                let issue = match assessment.level {
                    AdequacyLevel::Inadequate => Some(ValidationIssue::new(
                        IssueSeverity::Critical,
                        category,
                        format!(
                            "Hearing protection inadequate: protected exposure {:.1} dB(A) remains in the red zone",
                            summary.protected_lex8h
                        ),
                        "Replace with higher-rated protection or use dual protection",
                    )),
                    AdequacyLevel::Marginal if zone == Some(Zone::Red) => {
                        Some(ValidationIssue::new(
                            IssueSeverity::Critical,
                            category,
                            format!(
                                "Hearing protection marginal: protected exposure {:.1} dB(A) is still above the action level",
                                summary.protected_lex8h
                            ),
                            "Select a device with higher attenuation",
                        ))
                    }
                    AdequacyLevel::Marginal => Some(ValidationIssue::new(
                        IssueSeverity::Warning,
                        category,
                        format!(
                            "Hearing protection marginal: protected exposure {:.1} dB(A)",
                            summary.protected_lex8h
                        ),
                        "Select a device with higher attenuation",
                    )),
                    AdequacyLevel::OverProtected => Some(ValidationIssue::new(
                        IssueSeverity::Warning,
                        category,
                        format!(
                            "Hearing protection over-attenuates by {:.1} dB",
                            assessment.reduction
                        ),
                        "Select a device with lower attenuation so warning signals stay audible",
                    )),
                    AdequacyLevel::Excellent | AdequacyLevel::Good | AdequacyLevel::Acceptable => {
                        None
                    }
                };
                if let Some(issue) = issue {
                    issues.push(issue.in_area(leaf.name.clone()));
                }
            }
        }

        for device in devices {
            let name = format!("{} {}", device.manufacturer, device.device_type);
            let name = name.trim();
            if device.snr_or_nrr.is_none() {
                issues.push(
                    ValidationIssue::new(
                        IssueSeverity::Warning,
                        category,
                        format!("Hearing protection '{name}' has no SNR or NRR rating type selected"),
                        "Record the rating type so the device's attenuation can be credited",
                    )
                    .in_area(leaf.name.clone()),
                );
            }
            if device.condition == DeviceCondition::Poor {
                issues.push(
                    ValidationIssue::new(
                        IssueSeverity::Warning,
                        category,
                        format!("Hearing protection '{name}' is in poor condition"),
                        "Replace worn or damaged hearing protection",
                    )
                    .in_area(leaf.name.clone()),
                );
            }
            if !device.training.is_yes() {
                issues.push(
                    ValidationIssue::new(
                        IssueSeverity::Warning,
                        category,
                        format!("No training recorded for hearing protection '{name}'"),
                        "Train employees in the correct use and fitting of their hearing protection",
                    )
                    .in_area(leaf.name.clone()),
                );
            }
        }
    }

    issues
}

fn sts_issue(employee: &Employee, today: NaiveDate) -> ValidationIssue {
    let summary = get_audiometry_summary(employee, today);
    let name = employee.display_name();
    let current = summary.sts.filter(|result| result.has_sts);

    let Some(sts) = current else {
        let since = employee
            .sts_date
            .map(|date| format!(" on {date}"))
            .unwrap_or_default();
        return ValidationIssue::new(
            IssueSeverity::Info,
            IssueCategory::Audiometry,
            format!("{name}: standard threshold shift recorded{since}; latest test shows no current shift"),
            "Keep the employee on the follow-up surveillance schedule",
        );
    };

    let (severity, recommendation) = match sts.severity {
        StsSeverity::Severe => (
            IssueSeverity::Critical,
            "Refer to an occupational medical practitioner urgently",
        ),
        StsSeverity::Moderate => (
            IssueSeverity::Warning,
            "Refer for medical evaluation and retest within 30 days",
        ),
        StsSeverity::Mild | StsSeverity::None => (
            IssueSeverity::Info,
            "Retest within 30 days to confirm the shift",
        ),
    };
    ValidationIssue::new(
        severity,
        IssueCategory::Audiometry,
        format!("{name}: {}", sts.message),
        recommendation,
    )
}

pub(crate) fn check_audiometry(
    data: &SurveyData,
    leaves: &[LeafArea<'_>],
    today: NaiveDate,
) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    let category = IssueCategory::Audiometry;

    for leaf in leaves {
        let employees = data.employees_at(&leaf.path);
        let zone = worst_case(data, &leaf.path).map(|summary| summary.zone.zone);

        match zone {
            Some(Zone::Red) if employees.is_empty() => issues.push(
                ValidationIssue::new(
                    IssueSeverity::Warning,
                    category,
                    "No employees enrolled in audiometric surveillance for a red zone",
                    "Enrol every employee working in this area",
                )
                .in_area(leaf.name.clone()),
            ),
            Some(Zone::Red) => {
                for employee in employees {
                    let name = employee.display_name();
                    match &employee.baseline_test {
                        None => issues.push(
                            ValidationIssue::new(
                                IssueSeverity::Critical,
                                category,
                                format!("{name} has no baseline audiogram"),
                                "Conduct a baseline audiometric test",
                            )
                            .in_area(leaf.name.clone()),
                        ),
                        Some(baseline) if employee.periodic_tests.is_empty() => {
                            let due = baseline.test_date.and_then(one_year_after);
                            if let Some(due) = due.filter(|due| *due < today) {
                                issues.push(
                                    ValidationIssue::new(
                                        IssueSeverity::Warning,
                                        category,
                                        format!("{name} has had no annual test since the baseline (due {due})"),
                                        "Schedule the annual audiometric test",
                                    )
                                    .in_area(leaf.name.clone()),
                                );
                            }
                        }
                        Some(_) => {}
                    }
                }
            }
            Some(Zone::Orange) if employees.is_empty() => issues.push(
                ValidationIssue::new(
                    IssueSeverity::Warning,
                    category,
                    "No employees enrolled in audiometric surveillance for an orange zone",
                    "Consider enrolling employees as a preventive measure",
                )
                .in_area(leaf.name.clone()),
            ),
            _ => {}
        }

        for employee in employees {
            if employee.has_sts {
                issues.push(sts_issue(employee, today).in_area(leaf.name.clone()));
            }

            let untyped = employee
                .baseline_test
                .iter()
                .chain(&employee.periodic_tests)
                .filter(|test| test.test_type.is_none())
                .count();
            if untyped > 0 {
                issues.push(
                    ValidationIssue::new(
                        IssueSeverity::Warning,
                        category,
                        format!(
                            "{} has {untyped} audiometric test(s) with no test type recorded",
                            employee.display_name()
                        ),
                        "Record whether each test is a baseline, annual, exit or follow-up test",
                    )
                    .in_area(leaf.name.clone()),
                );
            }

            let overdue = employee
                .periodic_tests
                .last()
                .and_then(|test| test.test_date)
                .and_then(one_year_after)
                .filter(|due| *due < today);
            if let Some(due) = overdue {
                issues.push(
                    ValidationIssue::new(
                        IssueSeverity::Warning,
                        category,
                        format!(
                            "{}'s latest audiometric test is more than a year old (due {due})",
                            employee.display_name()
                        ),
                        "Schedule the annual audiometric test",
                    )
                    .in_area(leaf.name.clone()),
                );
            }
        }
    }

    issues
}
