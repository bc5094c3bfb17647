use clap::Args;
use std::path::PathBuf;
use vacancy_watch::config::AppConfig;
use vacancy_watch::error::AppError;
use vacancy_watch::workflows::vacancy::{
    status_rows, JsonFileStatusStore, PropertyCatalog, StatusRow, StatusStore,
};

#[derive(Args, Debug, Default)]
pub(crate) struct StatusArgs {
    /// Override the configured status file (STATUS_FILE)
    #[arg(long)]
    pub(crate) status_file: Option<PathBuf>,
    /// Override the configured property list (PROPERTIES_FILE)
    #[arg(long)]
    pub(crate) properties: Option<PathBuf>,
    /// Emit JSON instead of a text table
    #[arg(long)]
    pub(crate) json: bool,
}

pub(crate) fn run_status(args: StatusArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let status_file = args.status_file.unwrap_or(config.run.status_file);
    let properties_file = args.properties.unwrap_or(config.run.properties_file);

    let catalog = PropertyCatalog::from_path(&properties_file)?;
    let record = JsonFileStatusStore::new(&status_file).load(&catalog);
    let rows = status_rows(&catalog, &record);

    if args.json {
        match serde_json::to_string_pretty(&rows) {
            Ok(json) => println!("{json}"),
            Err(err) => eprintln!("Failed to serialize status rows: {err}"),
        }
    } else {
        println!("Status file: {}", status_file.display());
        print!("{}", render_rows(&rows));
    }

    Ok(())
}

fn render_rows(rows: &[StatusRow]) -> String {
    let mut output = String::new();
    for row in rows {
        let marker = if row.recorded { "" } else { " (not yet recorded)" };
        output.push_str(&format!(
            "- {}: {}{}\n  {}\n",
            row.property, row.status_label, marker, row.url
        ));
    }
    output
}
