// src/config.rs
//! Process configuration: non-secret settings from an optional YAML file,
//! credentials from the environment.

use anyhow::{Context, Result};
use chrono_tz::Tz;
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use url::Url;

use crate::scraping::types::{default_job_card_selectors, SelectorSpec};

pub const DEFAULT_TARGET_URL: &str = "https://jp.indeed.com/jobs?q=python&l=東京";
pub const DEFAULT_BASE_ORIGIN: &str = "https://jp.indeed.com";
pub const DEFAULT_SCRAPE_ENDPOINT: &str = "https://chrome.browserless.io/scrape";
pub const DEFAULT_CRON: &str = "0 0 9 * * *";
pub const DEFAULT_TIMEZONE: &str = "Asia/Tokyo";
pub const DEFAULT_TABLE: &str = "jobs";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Supabase,
    Sqlite,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Search-results page to scrape on every run
    pub target_url: String,
    /// Origin relative posting links are resolved against
    pub base_origin: String,
    pub log_level: String,
    pub log_format: LogFormat,
    pub scrape: ScrapeSettings,
    pub schedule: ScheduleSettings,
    pub storage: StorageSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            target_url: DEFAULT_TARGET_URL.to_string(),
            base_origin: DEFAULT_BASE_ORIGIN.to_string(),
            log_level: "info".to_string(),
            log_format: LogFormat::default(),
            scrape: ScrapeSettings::default(),
            schedule: ScheduleSettings::default(),
            storage: StorageSettings::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScrapeSettings {
    pub endpoint: String,
    pub elements: Vec<SelectorSpec>,
}

impl Default for ScrapeSettings {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_SCRAPE_ENDPOINT.to_string(),
            elements: default_job_card_selectors(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScheduleSettings {
    /// Six-field cron expression (seconds first)
    pub cron: String,
    /// IANA time zone name the cron expression is evaluated in
    pub timezone: String,
}

impl Default for ScheduleSettings {
    fn default() -> Self {
        Self {
            cron: DEFAULT_CRON.to_string(),
            timezone: DEFAULT_TIMEZONE.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    pub backend: StorageBackend,
    pub table: String,
    pub sqlite_path: PathBuf,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            table: DEFAULT_TABLE.to_string(),
            sqlite_path: PathBuf::from("data/jobs.db"),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    local: Settings,
    #[serde(default)]
    production: Settings,
}

impl Settings {
    /// Parse a sectioned config file and pick the section for `environment`
    pub fn from_yaml(content: &str, environment: &str) -> Result<Self> {
        let config_file: ConfigFile =
            serde_yaml::from_str(content).context("Failed to parse config file")?;

        Ok(match environment {
            "production" => config_file.production,
            _ => config_file.local,
        })
    }

    /// Missing file means defaults; an unreadable or invalid file is an error
    pub fn load_from_file(path: &Path, environment: &str) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;

        Self::from_yaml(&content, environment)
            .with_context(|| format!("Invalid configuration in {}", path.display()))
    }
}

/// Secrets read from the environment. Blank values count as absent.
#[derive(Clone, Default)]
pub struct Credentials {
    pub supabase_url: Option<String>,
    pub supabase_key: Option<String>,
    pub browserless_token: Option<String>,
}

impl Credentials {
    pub fn from_env() -> Self {
        Self {
            supabase_url: env_secret("SUPABASE_URL"),
            supabase_key: env_secret("SUPABASE_KEY"),
            browserless_token: env_secret("BROWSERLESS_API_KEY"),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redact = |value: &Option<String>| value.as_ref().map(|_| "<redacted>");
        f.debug_struct("Credentials")
            .field("supabase_url", &self.supabase_url)
            .field("supabase_key", &redact(&self.supabase_key))
            .field("browserless_token", &redact(&self.browserless_token))
            .finish()
    }
}

fn env_secret(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: String,
    pub settings: Settings,
    pub credentials: Credentials,
}

impl AppConfig {
    /// Load `.env`, the config file and credentials, then validate
    pub fn load(config_path: &Path) -> Result<Self> {
        dotenvy::dotenv().ok();

        let environment = Self::get_environment();
        let settings = Settings::load_from_file(config_path, &environment)?;

        Self::new(environment, settings, Credentials::from_env())
    }

    pub fn new(environment: String, settings: Settings, credentials: Credentials) -> Result<Self> {
        let config = Self {
            environment,
            settings,
            credentials,
        };
        config.validate()?;
        Ok(config)
    }

    fn get_environment() -> String {
        std::env::var("JOB_INGESTOR_ENV")
            .or_else(|_| std::env::var("ENVIRONMENT"))
            .unwrap_or_else(|_| "local".to_string())
    }

    fn validate(&self) -> Result<()> {
        self.base_url()?;
        Url::parse(&self.settings.target_url)
            .with_context(|| format!("Invalid target_url: {}", self.settings.target_url))?;
        self.timezone()?;

        if self.settings.scrape.elements.is_empty() {
            anyhow::bail!("scrape.elements must contain at least one selector");
        }

        if self.settings.storage.backend == StorageBackend::Supabase
            && (self.credentials.supabase_url.is_none() || self.credentials.supabase_key.is_none())
        {
            anyhow::bail!("Supabase credentials are not set (SUPABASE_URL, SUPABASE_KEY)");
        }

        Ok(())
    }

    pub fn base_url(&self) -> Result<Url> {
        let url = Url::parse(&self.settings.base_origin)
            .with_context(|| format!("Invalid base_origin: {}", self.settings.base_origin))?;
        if url.cannot_be_a_base() {
            anyhow::bail!("base_origin cannot be used as a base URL: {}", url);
        }
        Ok(url)
    }

    pub fn timezone(&self) -> Result<Tz> {
        let name = &self.settings.schedule.timezone;
        name.parse::<Tz>()
            .map_err(|e| anyhow::anyhow!("Unknown time zone '{}': {}", name, e))
    }
}
