// src/scheduler.rs
//! Recurring trigger for the ingest pipeline using tokio-cron-scheduler.

use anyhow::{Context, Result};
use chrono_tz::Tz;
use std::sync::Arc;
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{debug, info};

use crate::ingestor::Ingestor;

/// Register the daily run and start the scheduler.
///
/// The returned handle must be kept alive; shutting it down stops the runs.
pub async fn start_scheduler(
    ingestor: Arc<Ingestor>,
    cron: &str,
    timezone: Tz,
) -> Result<JobScheduler> {
    let scheduler = JobScheduler::new()
        .await
        .context("Failed to create job scheduler")?;

    let job = Job::new_async_tz(cron, timezone, move |_uuid, _lock| {
        let ingestor = ingestor.clone();
        Box::pin(async move {
            let outcome = ingestor.run().await;
            debug!(?outcome, "Scheduled run finished");
        })
    })
    .with_context(|| format!("Invalid cron expression: {}", cron))?;

    scheduler
        .add(job)
        .await
        .context("Failed to register scheduled run")?;
    scheduler
        .start()
        .await
        .context("Failed to start job scheduler")?;

    info!("Daily job scraping scheduled ({} in {})", cron, timezone);
    Ok(scheduler)
}
