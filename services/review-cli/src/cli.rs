use crate::commands::{run_progress, run_score, run_validate, ProgressArgs, ScoreArgs, ValidateArgs};
use clap::{Parser, Subcommand};
use perf_review::config::AppConfig;
use perf_review::error::AppError;
use perf_review::telemetry;

#[derive(Parser, Debug)]
#[command(
    name = "perf-review",
    about = "Score goals and aggregate team progress for a review cycle",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Score one employee, or every reviewable employee in the bundle
    Score(ScoreArgs),
    /// Blend individual and team progress for one manager or all of them
    Progress(ProgressArgs),
    /// Report configuration defects, hierarchy problems and goal pre-flight issues
    Validate(ValidateArgs),
}

pub(crate) fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    match cli.command {
        Command::Score(args) => run_score(args, &config.review),
        Command::Progress(args) => run_progress(args, &config.review),
        Command::Validate(args) => run_validate(args, &config.review),
    }
}
