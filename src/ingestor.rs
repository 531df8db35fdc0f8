// src/ingestor.rs
//! One pipeline run: scrape, map to rows, bulk insert.

use chrono::Utc;
use tracing::{error, info, info_span, Instrument};

use crate::job::JobRow;
use crate::scraping::Extractor;
use crate::storage::JobStore;

/// How a run ended. Every variant is a normal completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    NoJobs,
    Inserted(usize),
    Duplicate,
    StorageFailed,
}

pub struct Ingestor {
    extractor: Extractor,
    store: Box<dyn JobStore>,
    target_url: String,
}

impl Ingestor {
    pub fn new(extractor: Extractor, store: Box<dyn JobStore>, target_url: String) -> Self {
        Self {
            extractor,
            store,
            target_url,
        }
    }

    /// Run against the configured target URL
    pub async fn run(&self) -> RunOutcome {
        self.run_for(&self.target_url).await
    }

    pub async fn run_for(&self, target_url: &str) -> RunOutcome {
        let run_id = Utc::now().format("%Y%m%dT%H%M%S%.3fZ").to_string();
        let span = info_span!("ingest_run", run_id = %run_id);

        async move {
            info!("Starting scraping job...");

            let jobs = self.extractor.fetch(target_url).await;
            if jobs.is_empty() {
                info!("No jobs found");
                return RunOutcome::NoJobs;
            }

            info!("Found {} jobs", jobs.len());

            let rows: Vec<JobRow> = jobs.iter().map(JobRow::from).collect();

            match self.store.insert_jobs(&rows).await {
                Ok(_) => {
                    info!("Successfully inserted {} jobs", jobs.len());
                    RunOutcome::Inserted(jobs.len())
                }
                Err(e) if e.is_unique_violation() => {
                    info!("Some jobs were already in the database (duplicate entries)");
                    RunOutcome::Duplicate
                }
                Err(e) => {
                    error!(backend = self.store.name(), "Database error: {}", e);
                    RunOutcome::StorageFailed
                }
            }
        }
        .instrument(span)
        .await
    }
}
