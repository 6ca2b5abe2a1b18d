mod analyze;
mod cli;
mod infra;
mod routes;
mod server;

use insurcap::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
