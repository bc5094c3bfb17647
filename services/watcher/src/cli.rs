use crate::check::{run_check, CheckArgs};
use crate::status::{run_status, StatusArgs};
use clap::{Parser, Subcommand};
use vacancy_watch::error::AppError;
use vacancy_watch::workflows::vacancy::RunMode;

#[derive(Parser, Debug)]
#[command(
    name = "vacancy-watch",
    about = "Watch rental listings and alert when a property becomes available",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch every listing once, record the results and send alerts (default command)
    Check(CheckArgs),
    /// Print the recorded status of every tracked property without fetching
    Status(StatusArgs),
}

pub(crate) fn parse_mode(value: &str) -> Result<RunMode, String> {
    RunMode::parse(value).ok_or_else(|| format!("expected 'scheduled' or 'manual', got '{value}'"))
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Check(CheckArgs::default()));

    match command {
        Command::Check(args) => run_check(args).await,
        Command::Status(args) => run_status(args),
    }
}
