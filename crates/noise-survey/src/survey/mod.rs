//! SANS 10083 noise survey rules.
//!
//! The engines are pure functions over a [`SurveyData`] snapshot (or slices of
//! one) and never mutate their input. Date-dependent checks take `today`
//! explicitly.

pub mod area;
pub mod audiometry;
pub mod domain;
pub mod equipment;
pub mod exposure;
pub mod import;
pub mod protection;
pub mod report;
pub mod router;
pub mod validation;
pub mod values;

pub use area::{leaf_areas, AreaError, AreaKey, AreaMap, AreaPath, LeafArea};
pub use audiometry::{
    apply_new_test, detect_sts, get_audiometry_summary, validate_audiogram, AudiometrySummary,
    StsResult,
};
pub use domain::{
    Area, AreaControls, AudiogramData, AudiometryTest, Employee, Equipment, EquipmentKind,
    HearingProtectionDevice, Measurement, StatusSeverity, SurveyData, SurveyMetadata,
};
pub use exposure::{get_exposure_summary, worst_case_exposure, ExposureSummary, Zone};
pub use import::{LoggedReadings, LoggerImportError, LoggerImporter};
pub use protection::{get_protection_summary, recommend_best_device, ProtectionSummary};
pub use report::views::SurveyReportView;
pub use report::SurveyReport;
pub use router::survey_router;
pub use validation::{
    validate_survey, IssueCategory, IssueSeverity, ValidationIssue, ValidationResult,
};
