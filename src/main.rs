use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use job_ingestor::config::{AppConfig, LogFormat, Settings};
use job_ingestor::scheduler::start_scheduler;
use job_ingestor::{build_store, Extractor, Ingestor};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "job-ingestor")]
#[command(about = "Scrape job listings and store new postings")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// YAML settings file; defaults apply when it does not exist
    #[arg(long, global = true, default_value = "config.yaml")]
    config: PathBuf,
}

#[derive(Subcommand)]
enum Command {
    /// Run the pipeline once and exit
    Run {
        /// Scrape this page instead of the configured target
        #[arg(long)]
        url: Option<String>,
    },
    /// Run on the configured schedule until interrupted
    Schedule {
        /// Do not run immediately at start-up
        #[arg(long)]
        skip_initial_run: bool,
    },
}

fn init_logging(settings: &Settings) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.log_level))
        .with_context(|| format!("Invalid log level: {}", settings.log_level))?;

    let registry = tracing_subscriber::registry().with(filter);

    match settings.log_format {
        LogFormat::Json => registry
            .with(
                fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_span_list(false),
            )
            .try_init()?,
        LogFormat::Pretty => registry.with(fmt::layer().with_target(false)).try_init()?,
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = AppConfig::load(&cli.config)?;
    init_logging(&config.settings)?;

    info!(
        "Loaded configuration for environment: {} (storage: {:?})",
        config.environment, config.settings.storage.backend
    );

    let extractor = Extractor::new(&config)?;
    let store = build_store(&config).await?;
    let ingestor = Ingestor::new(extractor, store, config.settings.target_url.clone());

    match cli.command {
        Command::Run { url } => {
            let outcome = match url {
                Some(url) => ingestor.run_for(&url).await,
                None => ingestor.run().await,
            };
            info!("Run finished: {:?}", outcome);
        }
        Command::Schedule { skip_initial_run } => {
            let ingestor = Arc::new(ingestor);
            let mut scheduler = start_scheduler(
                ingestor.clone(),
                &config.settings.schedule.cron,
                config.timezone()?,
            )
            .await?;

            if !skip_initial_run {
                ingestor.run().await;
            }

            tokio::signal::ctrl_c()
                .await
                .context("Failed to listen for shutdown signal")?;

            info!("Shutting down scheduler");
            scheduler
                .shutdown()
                .await
                .context("Failed to shut down scheduler")?;
        }
    }

    Ok(())
}
