#![allow(dead_code)]

use job_ingestor::config::{AppConfig, Credentials, Settings, StorageBackend};
use serde_json::{json, Value};
use std::io;
use std::sync::{Arc, Mutex};
use tracing::subscriber::DefaultGuard;

pub const TARGET_URL: &str = "https://jp.indeed.com/jobs?q=python&l=東京";
pub const TOKEN: &str = "test-token";
pub const SUPABASE_KEY: &str = "service-role-key";

/// Settings pointing the scrape endpoint at `server_uri`.
pub fn settings(server_uri: &str, backend: StorageBackend) -> Settings {
    let mut settings = Settings::default();
    settings.target_url = TARGET_URL.to_string();
    settings.scrape.endpoint = format!("{}/scrape", server_uri);
    settings.storage.backend = backend;
    settings
}

/// Config using the mock server for both scraping and PostgREST.
pub fn supabase_config(server_uri: &str) -> AppConfig {
    AppConfig::new(
        "test".into(),
        settings(server_uri, StorageBackend::Supabase),
        Credentials {
            supabase_url: Some(server_uri.to_string()),
            supabase_key: Some(SUPABASE_KEY.into()),
            browserless_token: Some(TOKEN.into()),
        },
    )
    .expect("valid test config")
}

pub fn sqlite_config(server_uri: &str) -> AppConfig {
    AppConfig::new(
        "test".into(),
        settings(server_uri, StorageBackend::Sqlite),
        Credentials {
            browserless_token: Some(TOKEN.into()),
            ..Credentials::default()
        },
    )
    .expect("valid test config")
}

/// Scrape response wrapping `results` at `data[0].results`.
pub fn scrape_body(results: Value) -> Value {
    json!({
        "data": [{
            "selector": "div.job_seen_beacon",
            "results": results
        }]
    })
}

pub fn two_listings() -> Value {
    json!([
        {
            "title": "Python Engineer",
            "companyName": "Acme",
            "location": "東京都 港区",
            "salary": "年収 600万円",
            "sourceUrl": "/viewjob?jk=abc"
        },
        {
            "title": "Data Engineer",
            "companyName": "Globex",
            "sourceUrl": "/viewjob?jk=def"
        }
    ])
}

/// Collects formatted log output written while its guard is installed.
#[derive(Clone, Default)]
pub struct LogCapture(Arc<Mutex<Vec<u8>>>);

impl LogCapture {
    /// Route this thread's tracing output into the buffer until the guard drops
    pub fn install(&self) -> DefaultGuard {
        let writer = self.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::DEBUG)
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    pub fn contents(&self) -> String {
        let buffer = self.0.lock().expect("log buffer poisoned");
        String::from_utf8_lossy(&buffer).into_owned()
    }
}

impl io::Write for LogCapture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0
            .lock()
            .expect("log buffer poisoned")
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
