//! Scheduled job-listing ingestion: scrape a search-results page through a
//! remote headless browser, normalize the postings and store the new ones.

pub mod config;
pub mod ingestor;
pub mod job;
pub mod scheduler;
pub mod scraping;
pub mod storage;

pub use config::AppConfig;
pub use ingestor::{Ingestor, RunOutcome};
pub use job::{JobPosting, JobRow};
pub use scraping::Extractor;
pub use storage::{build_store, JobStore, StorageError};
