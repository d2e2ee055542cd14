mod cli;
mod commands;
mod infra;

use perf_review::error::AppError;

pub fn run() -> Result<(), AppError> {
    cli::run()
}
