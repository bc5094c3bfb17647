mod check;
mod cli;
mod status;

use vacancy_watch::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
