use super::views::{
    AreaRowView, CompletionProgress, SurveyReportView, ValidationCounts, ZoneTallyEntry,
};
use crate::survey::area::{leaf_areas, AreaPath};
use crate::survey::domain::{SurveyData, SurveyMetadata};
use crate::survey::exposure::{worst_case_exposure, ExposureSummary, Zone};
use crate::survey::protection::{get_protection_summary, ProtectionSummary};
use crate::survey::validation::{validate_survey, ValidationResult};
use crate::survey::values::round1;
use chrono::NaiveDate;
use std::collections::HashMap;

/// Computed results for one leaf area.
#[derive(Debug, Clone)]
pub struct AreaResult {
    pub path: AreaPath,
    pub name: String,
    pub measurement_count: usize,
    pub exposure: Option<ExposureSummary>,
    pub protection: Option<ProtectionSummary>,
    pub employee_count: usize,
    pub sts_count: usize,
    pub details_completed: bool,
}

impl AreaResult {
    pub fn zone(&self) -> Option<Zone> {
        self.exposure.as_ref().map(|summary| summary.zone.zone)
    }

    pub fn to_view(&self) -> AreaRowView {
        let exposure = self.exposure.as_ref();
        let adequacy = self
            .protection
            .as_ref()
            .map(|summary| summary.assessment.level);

        AreaRowView {
            area_key: self.path.key().encode(),
            area_name: self.name.clone(),
            measurement_count: self.measurement_count,
            laeq: exposure.map(|summary| summary.laeq),
            lex8h: exposure.map(|summary| summary.lex8h),
            dose: exposure.map(|summary| summary.dose),
            permitted_time: exposure.map(|summary| summary.permitted_time),
            zone: self.zone(),
            zone_label: self.zone().map(Zone::label),
            protected_lex8h: self
                .protection
                .as_ref()
                .map(|summary| round1(summary.protected_lex8h)),
            adequacy,
            adequacy_label: adequacy.map(|level| level.label()),
            employee_count: self.employee_count,
            sts_count: self.sts_count,
            details_completed: self.details_completed,
        }
    }
}

/// Everything the exporter needs for one survey, computed against `today`.
#[derive(Debug, Clone)]
pub struct SurveyReport {
    pub metadata: SurveyMetadata,
    pub generated_on: NaiveDate,
    pub areas: Vec<AreaResult>,
    pub validation: ValidationResult,
}

impl SurveyReport {
    pub fn build(data: &SurveyData, today: NaiveDate) -> Self {
        let areas = leaf_areas(&data.areas)
            .into_iter()
            .map(|leaf| {
                let measurements = data.measurements_at(&leaf.path);
                let exposure = worst_case_exposure(measurements);
                let protection = get_protection_summary(
                    exposure.as_ref().map(|summary| summary.lex8h),
                    data.devices_at(&leaf.path),
                );
                let employees = data.employees_at(&leaf.path);

                AreaResult {
                    path: leaf.path,
                    name: leaf.name,
                    measurement_count: measurements.len(),
                    exposure,
                    protection,
                    employee_count: employees.len(),
                    sts_count: employees.iter().filter(|employee| employee.has_sts).count(),
                    details_completed: leaf.area.details_completed,
                }
            })
            .collect();

        Self {
            metadata: data.metadata.clone(),
            generated_on: today,
            areas,
            validation: validate_survey(data, today),
        }
    }

    pub fn zone_tally(&self) -> HashMap<Zone, usize> {
        let mut tally = HashMap::new();
        for zone in self.areas.iter().filter_map(AreaResult::zone) {
            *tally.entry(zone).or_insert(0) += 1;
        }
        tally
    }

    pub fn completion(&self) -> CompletionProgress {
        CompletionProgress {
            completed: self
                .areas
                .iter()
                .filter(|area| area.details_completed)
                .count(),
            total: self.areas.len(),
        }
    }

    /// Valid surveys with every leaf area's details completed can be signed.
    pub fn ready_for_sign_off(&self) -> bool {
        let completion = self.completion();
        self.validation.is_valid && completion.completed == completion.total
    }

    pub fn summary(&self) -> SurveyReportView {
        let tally = self.zone_tally();
        let zone_tally = Zone::ordered()
            .into_iter()
            .map(|zone| ZoneTallyEntry {
                zone,
                zone_label: zone.label(),
                areas: tally.get(&zone).copied().unwrap_or(0),
            })
            .collect();

        SurveyReportView {
            client_name: self.metadata.client_name.clone(),
            site_name: self.metadata.site_name.clone(),
            report_number: self.metadata.report_number.clone(),
            survey_date: self.metadata.survey_date,
            surveyor_name: self.metadata.surveyor_name.clone(),
            generated_on: self.generated_on,
            areas: self.areas.iter().map(AreaResult::to_view).collect(),
            zone_tally,
            unmeasured_areas: self
                .areas
                .iter()
                .filter(|area| area.measurement_count == 0)
                .count(),
            completion: self.completion(),
            validation: ValidationCounts {
                is_valid: self.validation.is_valid,
                critical: self.validation.critical_count,
                warnings: self.validation.warning_count,
                info: self.validation.info_count,
            },
            ready_for_sign_off: self.ready_for_sign_off(),
        }
    }
}
