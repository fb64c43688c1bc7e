//! Cross-survey validation.
//!
//! Walks every leaf area and checks the survey graph for regulatory
//! completeness. Nothing here fails: inconsistencies come back as
//! [`ValidationIssue`]s, and the severity of an issue is the only error
//! channel.

mod rules;

#[cfg(test)]
mod tests;

use super::area::leaf_areas;
use super::domain::SurveyData;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueSeverity {
    Critical,
    Warning,
    Info,
}

impl IssueSeverity {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Critical => "Critical",
            Self::Warning => "Warning",
            Self::Info => "Info",
        }
    }
}

/// Check categories, in display priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueCategory {
    Equipment,
    References,
    Measurements,
    Controls,
    HearingProtection,
    Audiometry,
}

impl IssueCategory {
    pub const fn ordered() -> [Self; 6] {
        [
            Self::Equipment,
            Self::References,
            Self::Measurements,
            Self::Controls,
            Self::HearingProtection,
            Self::Audiometry,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Equipment => "Equipment",
            Self::References => "Equipment References",
            Self::Measurements => "Measurements",
            Self::Controls => "Controls",
            Self::HearingProtection => "Hearing Protection",
            Self::Audiometry => "Audiometry",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub severity: IssueSeverity,
    pub category: IssueCategory,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub area_name: Option<String>,
    pub recommendation: String,
}

impl ValidationIssue {
    pub(crate) fn new(
        severity: IssueSeverity,
        category: IssueCategory,
        message: impl Into<String>,
        recommendation: impl Into<String>,
    ) -> Self {
        Self {
            severity,
            category,
            message: message.into(),
            area_name: None,
            recommendation: recommendation.into(),
        }
    }

    pub(crate) fn in_area(mut self, area_name: impl Into<String>) -> Self {
        self.area_name = Some(area_name.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub critical_count: usize,
    pub warning_count: usize,
    pub info_count: usize,
    pub critical: Vec<ValidationIssue>,
    pub warnings: Vec<ValidationIssue>,
    pub info: Vec<ValidationIssue>,
}

impl ValidationResult {
    /// Partition issues by severity, keeping category order within each bucket.
    pub fn from_issues(issues: Vec<ValidationIssue>) -> Self {
        let mut critical = Vec::new();
        let mut warnings = Vec::new();
        let mut info = Vec::new();
        for issue in issues {
            match issue.severity {
                IssueSeverity::Critical => critical.push(issue),
                IssueSeverity::Warning => warnings.push(issue),
                IssueSeverity::Info => info.push(issue),
            }
        }

        Self {
            is_valid: critical.is_empty(),
            critical_count: critical.len(),
            warning_count: warnings.len(),
            info_count: info.len(),
            critical,
            warnings,
            info,
        }
    }

    pub fn total(&self) -> usize {
        self.critical_count + self.warning_count + self.info_count
    }

    pub fn issues(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.critical.iter().chain(&self.warnings).chain(&self.info)
    }

    pub fn in_category(&self, category: IssueCategory) -> impl Iterator<Item = &ValidationIssue> {
        self.issues().filter(move |issue| issue.category == category)
    }
}

/// Validate a survey snapshot as of `today`.
pub fn validate_survey(data: &SurveyData, today: NaiveDate) -> ValidationResult {
    let leaves = leaf_areas(&data.areas);
    let mut issues = Vec::new();

    for category in IssueCategory::ordered() {
        let found = match category {
            IssueCategory::Equipment => rules::check_equipment(data, today),
            IssueCategory::References => rules::check_references(data),
            IssueCategory::Measurements => rules::check_measurements(data, &leaves),
            IssueCategory::Controls => rules::check_controls(data, &leaves),
            IssueCategory::HearingProtection => rules::check_hearing_protection(data, &leaves),
            IssueCategory::Audiometry => rules::check_audiometry(data, &leaves, today),
        };
        debug!(
            category = category.label(),
            issues = found.len(),
            "validation check finished"
        );
        issues.extend(found);
    }

    let result = ValidationResult::from_issues(issues);
    info!(
        leaves = leaves.len(),
        critical = result.critical_count,
        warnings = result.warning_count,
        info = result.info_count,
        "survey validation complete"
    );
    result
}
