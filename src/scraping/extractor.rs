// src/scraping/extractor.rs
use super::types::{ScrapeRequest, SelectorSpec};
use crate::config::AppConfig;
use crate::job::{normalize, JobPosting, Normalized, RawJob};
use anyhow::{Context, Result};
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, error, info, warn};
use url::Url;

const USER_AGENT: &str = concat!("job-ingestor/", env!("CARGO_PKG_VERSION"));

/// Pulls job listings through the remote headless-browser scrape endpoint.
pub struct Extractor {
    client: Client,
    endpoint: String,
    token: String,
    base_origin: Url,
    elements: Vec<SelectorSpec>,
}

impl Extractor {
    /// Fails when the scraping token is not configured.
    pub fn new(config: &AppConfig) -> Result<Self> {
        let token = config
            .credentials
            .browserless_token
            .clone()
            .context("BROWSERLESS_API_KEY is not set")?;

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            endpoint: config.settings.scrape.endpoint.clone(),
            token,
            base_origin: config.base_url()?,
            elements: config.settings.scrape.elements.clone(),
        })
    }

    /// Scrape `target_url` and return the valid postings found there.
    ///
    /// Never fails: transport, status and decoding errors are logged and
    /// produce an empty list.
    pub async fn fetch(&self, target_url: &str) -> Vec<JobPosting> {
        info!("Scraping job listings from {}", target_url);

        let raw_jobs = match self.request_results(target_url).await {
            Ok(raw_jobs) => raw_jobs,
            Err(e) => {
                error!("Scraping error: {:#}", e);
                return Vec::new();
            }
        };

        let received = raw_jobs.len();
        let jobs: Vec<JobPosting> = raw_jobs
            .iter()
            .filter_map(|raw| self.accept(raw))
            .collect();

        info!(
            received,
            kept = jobs.len(),
            "Normalized scraped results from {}",
            target_url
        );
        jobs
    }

    fn accept(&self, raw: &RawJob) -> Option<JobPosting> {
        match normalize(raw, &self.base_origin) {
            Normalized::Valid(job) => Some(job),
            Normalized::MissingTitle => {
                debug!("Discarding result without a title");
                None
            }
            Normalized::MissingUrl { title } => {
                debug!(title = %title, "Discarding result without a posting link");
                None
            }
            Normalized::UnresolvableUrl { title, raw, error } => {
                warn!(
                    title = %title,
                    href = %raw,
                    "Discarding result with unresolvable link: {}",
                    error
                );
                None
            }
        }
    }

    async fn request_results(&self, target_url: &str) -> Result<Vec<RawJob>> {
        let request = ScrapeRequest {
            url: target_url,
            elements: &self.elements,
        };

        // reqwest errors embed the request URL, which carries the token
        let response = self
            .client
            .post(&self.endpoint)
            .query(&[("token", self.token.as_str())])
            .json(&request)
            .send()
            .await
            .map_err(|e| e.without_url())
            .context("Failed to reach scraping service")?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            anyhow::bail!("HTTP error! status: {} body: {}", status, error_text);
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| e.without_url())
            .context("Failed to parse scraping service response")?;

        let results = extract_results(body);
        debug!("Scraping service returned {} raw results", results.len());
        Ok(results)
    }
}

/// Read `data[0].results`; any missing level yields no results.
pub fn extract_results(body: Value) -> Vec<RawJob> {
    let mut body = body;
    match body.pointer_mut("/data/0/results").map(Value::take) {
        Some(Value::Array(items)) => items.into_iter().map(RawJob::from_value).collect(),
        _ => Vec::new(),
    }
}
