mod cli;
mod infra;
mod render;
mod reports;
mod routes;
mod server;

use offer_insights::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
