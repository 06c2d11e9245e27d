//! Job Crawler CLI
//!
//! Runs the crawl-and-persist pipeline against the configured recruitment page.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use job_crawler::{
    error::Result,
    models::Config,
    pipeline,
    storage::SnapshotMetadata,
};

/// job-crawler - Recruitment Posting Harvester
#[derive(Parser, Debug)]
#[command(
    name = "job-crawler",
    version,
    about = "Harvests recruitment postings into a sealed SQLite snapshot"
)]

struct Cli {
    /// Directory holding config.toml, the store and published files
    #[arg(short, long, default_value = "storage")]
    storage_dir: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch the target page and publish a new snapshot
    Crawl {
        /// Override the target URL (http(s) or file://)
        #[arg(long)]
        target: Option<String>,

        /// Route every request through this relay
        #[arg(long)]
        proxy: Option<String>,

        /// Skip the raw jobs.json export
        #[arg(long)]
        no_export: bool,
    },

    /// Validate configuration files
    Validate,

    /// Show the published snapshot and verify its checksum
    Info,
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

    log::info!("Job crawler starting...");

    let config_path = cli.storage_dir.join("config.toml");
    let mut config = Config::load_or_default(&config_path);
    config.apply_env();

    let result = execute(cli.command, &mut config, &cli.storage_dir).await;
    if let Err(e) = &result {
        log::error!("Run failed: {}", e);
    }
    result
}

async fn execute(command: Command, config: &mut Config, storage_dir: &Path) -> Result<()> {
    match command {
        Command::Crawl {
            target,
            proxy,
            no_export,
        } => {
            if let Some(target) = target {
                config.site.target_url = target;
            }
            if let Some(proxy) = proxy {
                config.proxy.override_url(&proxy);
            }
            if no_export {
                config.paths.export_jobs = false;
            }
            config.validate()?;

            let summary = pipeline::run_crawler(config, storage_dir).await?;

            log::info!(
                "Processed {} postings ({} candidates, {} upsert failures)",
                summary.processed,
                summary.candidate_count,
                summary.upsert_failures
            );
            log::info!("Checksum: {}", summary.metadata.checksum);
            if let Some(path) = &summary.jobs_export {
                log::info!("Raw export: {}", path.display());
            }
            log::info!("Crawl complete!");
        }

        Command::Validate => {
            log::info!("Validating configuration...");

            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }
            log::info!("✓ Config OK (target {})", config.site.target_url);
        }

        Command::Info => {
            let db_path = config.paths.database_path(storage_dir);
            let metadata_path = config.paths.metadata_path(storage_dir);

            log::info!("Storage directory: {}", storage_dir.display());
            log::info!(
                "Store: {}",
                if db_path.exists() { "exists" } else { "not found" }
            );

            if !metadata_path.exists() {
                log::info!("No snapshot published yet.");
                return Ok(());
            }

            let metadata = SnapshotMetadata::load(&metadata_path)?;
            log::info!("Last updated: {}", metadata.last_updated);
            log::info!("Job count: {}", metadata.job_count);
            log::info!("Checksum: {}", metadata.checksum);

            if db_path.exists() {
                if metadata.verify(&db_path)? {
                    log::info!("✓ Store matches published checksum");
                } else {
                    log::warn!("Store has changed since the snapshot was published");
                }
            }
        }
    }

    Ok(())
}
