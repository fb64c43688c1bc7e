use crate::infra::load_survey;
use crate::sample::sample_survey;
use chrono::{Local, NaiveDate};
use clap::Args;
use noise_survey::error::AppError;
use noise_survey::survey::area::leaf_areas;
use noise_survey::survey::audiometry::get_audiometry_summary;
use noise_survey::survey::exposure::{average_laeq, get_exposure_summary, ExposureSummary};
use noise_survey::survey::validation::{validate_survey, ValidationIssue, ValidationResult};
use noise_survey::survey::values::parse_readings;
use noise_survey::survey::{AreaPath, LoggerImporter, SurveyData, SurveyReport, SurveyReportView};
use std::path::PathBuf;

#[derive(Args, Debug)]
pub(crate) struct SurveyValidateArgs {
    /// Survey snapshot exported as JSON
    #[arg(long)]
    pub(crate) input: PathBuf,
    /// Evaluation date for date-based checks (defaults to today)
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) today: Option<NaiveDate>,
}

#[derive(Args, Debug)]
pub(crate) struct SurveyReportArgs {
    /// Survey snapshot exported as JSON
    #[arg(long)]
    pub(crate) input: PathBuf,
    /// Evaluation date for date-based checks (defaults to today)
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) today: Option<NaiveDate>,
    /// Print the report view as JSON instead of text
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug)]
pub(crate) struct ExposureArgs {
    /// A single LAeq reading in dB(A); repeat for each reading
    #[arg(
        long = "reading",
        conflicts_with = "csv",
        required_unless_present = "csv"
    )]
    pub(crate) readings: Vec<String>,
    /// Sound level logger CSV export to read LAeq values from
    #[arg(long)]
    pub(crate) csv: Option<PathBuf>,
    /// Hours exposed per shift
    #[arg(long)]
    pub(crate) hours: f64,
    /// Shift length in hours
    #[arg(long, default_value_t = 8.0)]
    pub(crate) shift: f64,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Override the evaluation date (defaults to today)
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) today: Option<NaiveDate>,
    /// Print the report view as JSON after the text walkthrough
    #[arg(long)]
    pub(crate) json: bool,
}

fn today_or_local(today: Option<NaiveDate>) -> NaiveDate {
    today.unwrap_or_else(|| Local::now().date_naive())
}

pub(crate) fn run_survey_validate(args: SurveyValidateArgs) -> Result<(), AppError> {
    let data = load_survey(&args.input)?;
    let result = validate_survey(&data, today_or_local(args.today));
    render_validation(&result);
    Ok(())
}

pub(crate) fn run_survey_report(args: SurveyReportArgs) -> Result<(), AppError> {
    let data = load_survey(&args.input)?;
    let report = SurveyReport::build(&data, today_or_local(args.today));
    let view = report.summary();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&view)?);
    } else {
        render_report(&view);
        render_validation(&report.validation);
    }
    Ok(())
}

pub(crate) fn run_exposure(args: ExposureArgs) -> Result<(), AppError> {
    let readings = match args.csv {
        Some(path) => {
            let logged = LoggerImporter::from_path(&path)?;
            println!(
                "Read {} readings from {} ({} rows skipped)",
                logged.readings.len(),
                path.display(),
                logged.skipped_rows
            );
            logged.readings
        }
        None => args.readings,
    };

    let laeq = average_laeq(&parse_readings(&readings));
    let summary = get_exposure_summary(laeq, args.hours, args.shift);
    render_exposure(&summary);
    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let today = today_or_local(args.today);
    let data = sample_survey(today);

    println!("Noise survey demo");
    let report = SurveyReport::build(&data, today);
    let view = report.summary();
    render_report(&view);
    render_validation(&report.validation);
    render_audiometry(&data, today);

    let screening = AreaPath::sub(0, 1);
    let name = screening
        .display_name(&data.areas)
        .unwrap_or_else(|| "Screening Deck".to_string());
    let trimmed = data.remove_area(&screening)?;
    let after = validate_survey(&trimmed, today);
    println!("\nAfter removing {name}");
    println!(
        "  Leaf areas: {} | critical {} | warnings {} | info {}",
        leaf_areas(&trimmed.areas).len(),
        after.critical_count,
        after.warning_count,
        after.info_count
    );
    println!(
        "  Ready for sign-off: {}",
        if after.is_valid { "yes" } else { "no" }
    );

    if args.json {
        println!("\nReport payload:\n{}", serde_json::to_string_pretty(&view)?);
    }
    Ok(())
}

fn render_report(view: &SurveyReportView) {
    println!(
        "{} | {} | report {}",
        view.client_name, view.site_name, view.report_number
    );
    match view.survey_date {
        Some(date) => println!("Surveyed {} by {}", date, view.surveyor_name),
        None => println!("Survey date not recorded (surveyor {})", view.surveyor_name),
    }
    println!("Evaluated on {}", view.generated_on);

    println!("\nAreas");
    for row in &view.areas {
        match (row.laeq, row.lex8h, row.zone_label) {
            (Some(laeq), Some(lex8h), Some(zone)) => println!(
                "- {}: LAeq {:.1} dB(A), LEX,8h {:.1} dB(A), {}",
                row.area_name, laeq, lex8h, zone
            ),
            _ => println!("- {}: no valid measurements", row.area_name),
        }
        if let (Some(protected), Some(adequacy)) = (row.protected_lex8h, row.adequacy_label) {
            println!(
                "    Protected exposure {:.1} dB(A) ({})",
                protected, adequacy
            );
        }
        if row.employee_count > 0 {
            println!(
                "    Employees monitored: {} ({} with a threshold shift)",
                row.employee_count, row.sts_count
            );
        }
    }

    println!("\nZone tally");
    for entry in &view.zone_tally {
        println!("- {}: {}", entry.zone_label, entry.areas);
    }
    if view.unmeasured_areas > 0 {
        println!("- Unmeasured: {}", view.unmeasured_areas);
    }
    println!(
        "Area details completed: {}/{}",
        view.completion.completed, view.completion.total
    );
    println!(
        "Ready for sign-off: {}",
        if view.ready_for_sign_off { "yes" } else { "no" }
    );
}

fn render_validation(result: &ValidationResult) {
    println!(
        "\nValidation: {} critical, {} warnings, {} info",
        result.critical_count, result.warning_count, result.info_count
    );
    render_issues("Critical", &result.critical);
    render_issues("Warnings", &result.warnings);
    render_issues("Info", &result.info);
}

fn render_issues(heading: &str, issues: &[ValidationIssue]) {
    if issues.is_empty() {
        return;
    }
    println!("\n{heading}");
    for issue in issues {
        match &issue.area_name {
            Some(area) => println!("- [{}] {}: {}", issue.category.label(), area, issue.message),
            None => println!("- [{}] {}", issue.category.label(), issue.message),
        }
        println!("    {}", issue.recommendation);
    }
}

fn render_exposure(summary: &ExposureSummary) {
    println!("LAeq: {:.1} dB(A)", summary.laeq);
    println!(
        "LEX,8h: {:.1} dB(A) over {} of {} hours",
        summary.lex8h, summary.exposure_hours, summary.shift_hours
    );
    println!("Noise dose: {:.1}%", summary.dose);
    println!("Permitted time: {:.1} hours", summary.permitted_time);
    println!("Zone: {}", summary.zone.label);
    for requirement in &summary.zone.requirements {
        println!("- {requirement}");
    }
    println!("Compliance: {}", summary.compliance.level.label());
    for action in &summary.compliance.action_required {
        println!("- {action}");
    }
}

fn render_audiometry(data: &SurveyData, today: NaiveDate) {
    println!("\nAudiometry");
    for leaf in leaf_areas(&data.areas) {
        for employee in data.employees_at(&leaf.path) {
            let summary = get_audiometry_summary(employee, today);
            println!("- {} ({})", summary.employee_name, leaf.name);
            if let Some(sts) = &summary.sts {
                println!("    {}", sts.message);
            }
            for ear in [&summary.left_ear, &summary.right_ear].into_iter().flatten() {
                println!("    {}", ear.message);
            }
            if let Some(due) = summary.next_test_due {
                println!(
                    "    Next test due {}{}",
                    due,
                    if summary.retest_overdue { " (overdue)" } else { "" }
                );
            }
            for recommendation in &summary.recommendations {
                println!("    * {recommendation}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use noise_survey::survey::LoggerImportError;

    fn today() -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(2025, 6, 1)
    }

    #[test]
    fn demo_runs_end_to_end() {
        run_demo(DemoArgs {
            today: today(),
            json: true,
        })
        .expect("demo completes");
    }

    #[test]
    fn exposure_from_readings() {
        run_exposure(ExposureArgs {
            readings: vec!["90".to_string(), "92".to_string(), "88".to_string()],
            csv: None,
            hours: 8.0,
            shift: 8.0,
        })
        .expect("exposure summary renders");
    }

    #[test]
    fn exposure_from_missing_csv_is_import_error() {
        let result = run_exposure(ExposureArgs {
            readings: Vec::new(),
            csv: Some(PathBuf::from("./no-such-logger-export.csv")),
            hours: 8.0,
            shift: 8.0,
        });
        match result {
            Err(AppError::Import(LoggerImportError::Io(_))) => {}
            other => panic!("expected import error, got {other:?}"),
        }
    }

    #[test]
    fn survey_commands_read_exported_snapshots() {
        let path = std::env::temp_dir().join("noise-survey-cli-snapshot.json");
        let today = today().expect("valid date");
        let snapshot = serde_json::to_string(&sample_survey(today)).expect("serializes");
        std::fs::write(&path, snapshot).expect("write temp file");

        let validated = run_survey_validate(SurveyValidateArgs {
            input: path.clone(),
            today: Some(today),
        });
        let reported = run_survey_report(SurveyReportArgs {
            input: path.clone(),
            today: Some(today),
            json: true,
        });
        std::fs::remove_file(&path).ok();

        validated.expect("validate runs");
        reported.expect("report runs");
    }
}
