use crate::demo::{
    run_demo, run_exposure, run_survey_report, run_survey_validate, DemoArgs, ExposureArgs,
    SurveyReportArgs, SurveyValidateArgs,
};
use crate::server;
use clap::{Args, Parser, Subcommand};
use noise_survey::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "noise-survey",
    about = "Evaluate SANS 10083 noise surveys from the command line or over HTTP",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Validate or report on an exported survey snapshot
    Survey {
        #[command(subcommand)]
        command: SurveyCommand,
    },
    /// Compute an exposure summary from readings or a logger export
    Exposure(ExposureArgs),
    /// Walk through validation and reporting for a built-in sample survey
    Demo(DemoArgs),
}

#[derive(Subcommand, Debug)]
enum SurveyCommand {
    /// List validation issues grouped by severity
    Validate(SurveyValidateArgs),
    /// Print the per-area report summary
    Report(SurveyReportArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Survey {
            command: SurveyCommand::Validate(args),
        } => run_survey_validate(args),
        Command::Survey {
            command: SurveyCommand::Report(args),
        } => run_survey_report(args),
        Command::Exposure(args) => run_exposure(args),
        Command::Demo(args) => run_demo(args),
    }
}
