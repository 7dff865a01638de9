//! Outage Watch CLI
//!
//! Local execution entry point. For AWS Lambda, use `outage-watch-lambda`.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use outage_watch::{
    config::load_config,
    error::{AppError, Result},
    models::Config,
    pipeline::{self, canonicalize},
    services::{DocumentFetcher, Extractor, HttpFetcher, notifier},
    storage::{LocalStorage, ReportStore},
    utils::{http, log as console},
};

/// Outage Watch - district water outage notifier
#[derive(Parser, Debug)]
#[command(
    name = "outage-watch",
    version,
    about = "Watches water outage announcements for one district"
)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "outage-watch.toml")]
    config: PathBuf,

    /// Override the state directory from the configuration
    #[arg(short, long)]
    storage_dir: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check every category once: notify and persist on change
    Check,

    /// Print one category's canonical report without notifying or persisting
    Extract {
        /// Category key
        #[arg(long)]
        category: String,

        /// Read the document from a file instead of fetching it
        #[arg(long)]
        file: Option<PathBuf>,
    },

    /// Show the persisted state of every category
    Show,

    /// Validate configuration and extraction selectors
    Validate,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    log::info!("Outage watch starting...");

    let config = load_config(&cli.config)?;
    let storage_dir = cli
        .storage_dir
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.storage.dir));
    let storage = LocalStorage::new(&storage_dir);

    match cli.command {
        Command::Check => {
            console::header(&format!("Checking outages for {}", config.watch.district));

            let client = http::create_async_client(&config.http)?;
            let fetcher = HttpFetcher::new(client.clone());
            let notifier = notifier::from_config(&config.notify, client);

            let summary = pipeline::run_watch(&config, &fetcher, &storage, notifier.as_ref()).await?;
            console::summary(&summary);
            log::info!("Run complete: {}", summary.summary_line());
        }

        Command::Extract { category, file } => {
            run_extract(&config, &category, file).await?;
        }

        Command::Show => {
            log::info!("Storage directory: {}", storage.root_dir().display());
            for category in &config.categories {
                match storage.get(&category.key).await? {
                    Some(state) => {
                        console::sub_item(&format!(
                            "{}: {} (updated {})",
                            category.key,
                            state.digest,
                            state.updated_at.to_rfc3339()
                        ));
                    }
                    None => console::sub_item(&format!("{}: no state yet", category.key)),
                }
            }
        }

        Command::Validate => {
            log::info!("Validating configuration...");
            Extractor::new(&config.watch.district, &config.extract)?;
            log::info!(
                "✓ Config OK ({} categories, district '{}')",
                config.categories.len(),
                config.watch.district
            );
            log::info!("All validations passed!");
        }
    }

    log::info!("Done!");

    Ok(())
}

/// Print a category's canonical report from a live fetch or a saved page.
async fn run_extract(config: &Config, key: &str, file: Option<PathBuf>) -> Result<()> {
    let category = config
        .category(key)
        .ok_or_else(|| AppError::config(format!("Unknown category '{key}'")))?;

    let document = match file {
        Some(path) => std::fs::read_to_string(path)?,
        None => {
            let client = http::create_async_client(&config.http)?;
            let url = category.source_url(&config.watch.district);
            HttpFetcher::new(client).fetch(&url).await?
        }
    };

    let extractor = Extractor::new(&config.watch.district, &config.extract)?;
    let records = extractor.extract(&document, category.strategy)?;
    let report = canonicalize(&records);

    if report.is_empty() {
        log::info!("[{}] No outages listed for '{}'", key, config.watch.district);
    } else {
        log::info!("[{}] {} records, digest {}", key, records.len(), report.digest());
        println!("{}", pipeline::compose_message(category, &report));
    }
    Ok(())
}
