use crate::cli::parse_mode;
use clap::Args;
use std::path::PathBuf;
use tracing::{info, warn};
use vacancy_watch::config::{AppConfig, RunConfig};
use vacancy_watch::error::AppError;
use vacancy_watch::telemetry;
use vacancy_watch::workflows::vacancy::notify::ConfiguredNotifier;
use vacancy_watch::workflows::vacancy::probe::{HttpPageFetcher, UrListingClassifier, VacancyProbe};
use vacancy_watch::workflows::vacancy::{
    DetectionPolicy, JsonFileStatusStore, PropertyCatalog, RunMode, RunOptions, RunSummary, Status,
    VacancyWatch,
};

#[derive(Args, Debug, Default)]
pub(crate) struct CheckArgs {
    /// Run mode: `scheduled` alerts on new vacancies, `manual` reports every current one
    #[arg(long, value_parser = parse_mode)]
    pub(crate) mode: Option<RunMode>,
    /// Override the configured status file (STATUS_FILE)
    #[arg(long)]
    pub(crate) status_file: Option<PathBuf>,
    /// Override the configured property list (PROPERTIES_FILE)
    #[arg(long)]
    pub(crate) properties: Option<PathBuf>,
    /// Log alerts instead of sending them and leave the status file untouched
    #[arg(long)]
    pub(crate) dry_run: bool,
}

impl CheckArgs {
    fn apply(&self, run: &mut RunConfig) {
        if let Some(mode) = self.mode {
            run.mode = mode;
        }
        if let Some(path) = &self.status_file {
            run.status_file = path.clone();
        }
        if let Some(path) = &self.properties {
            run.properties_file = path.clone();
        }
    }
}

pub(crate) async fn run_check(args: CheckArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;
    args.apply(&mut config.run);

    let catalog = PropertyCatalog::from_path(&config.run.properties_file)?;
    let report_offset = config.run.report_offset()?;
    let fetcher = HttpPageFetcher::from_config(&config.fetch)?;
    let notifier = ConfiguredNotifier::from_config(&config.notify, &config.fetch, args.dry_run)?;

    info!(
        mode = config.run.mode.as_str(),
        properties = catalog.len(),
        status_file = %config.run.status_file.display(),
        channel = notifier.channel(),
        dry_run = args.dry_run,
        "starting vacancy check"
    );

    let watch = VacancyWatch::new(
        VacancyProbe::new(fetcher, UrListingClassifier::default()),
        JsonFileStatusStore::new(&config.run.status_file),
        notifier,
        DetectionPolicy {
            notify_on_first_observation: config.run.notify_on_first_observation,
        },
    )
    .with_report_offset(report_offset);

    let summary = watch
        .run(
            &catalog,
            RunOptions {
                mode: config.run.mode,
                persist: !args.dry_run,
            },
        )
        .await?;

    log_summary(&summary);
    Ok(())
}

fn log_summary(summary: &RunSummary) {
    for outcome in summary.outcomes.iter().filter(|o| o.first_registration) {
        info!(property = %outcome.property.id, status = %outcome.status, "first registration");
    }

    info!(
        mode = summary.mode.as_str(),
        available = summary.count(Status::Available),
        not_available = summary.count(Status::NotAvailable),
        unknown = summary.count(Status::Unknown),
        alerts_delivered = summary.alerts_delivered,
        alerts_failed = summary.alert_failures.len(),
        persisted = summary.persisted,
        "{}",
        summary.headline()
    );

    if !summary.alert_failures.is_empty() {
        warn!(
            failed = summary.alert_failures.len(),
            attempted = summary.alerts_attempted,
            "some alerts were not delivered; state was still recorded"
        );
    }
}
