mod cli;
mod demo;
mod infra;
mod routes;
mod sample;
mod server;

use noise_survey::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
