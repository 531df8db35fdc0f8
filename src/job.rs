// src/job.rs
//! Job postings and the boundary that turns loosely-typed scrape results into them.

use serde::Serialize;
use serde_json::{Map, Value};
use url::Url;

pub const FIELD_TITLE: &str = "title";
pub const FIELD_COMPANY: &str = "companyName";
pub const FIELD_LOCATION: &str = "location";
pub const FIELD_SALARY: &str = "salary";
pub const FIELD_SOURCE_URL: &str = "sourceUrl";

/// A validated posting. `title` and `source_url` are non-empty and
/// `source_url` is absolute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobPosting {
    pub title: String,
    pub company_name: String,
    pub location: String,
    pub salary: String,
    pub source_url: String,
}

/// Row shape of the `jobs` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobRow {
    pub title: String,
    pub company_name: String,
    pub location: String,
    pub salary: String,
    pub source_url: String,
}

impl From<&JobPosting> for JobRow {
    fn from(job: &JobPosting) -> Self {
        Self {
            title: job.title.clone(),
            company_name: job.company_name.clone(),
            location: job.location.clone(),
            salary: job.salary.clone(),
            source_url: job.source_url.clone(),
        }
    }
}

/// One result object as returned by the scraping service.
#[derive(Debug, Clone, Default)]
pub struct RawJob(Map<String, Value>);

impl RawJob {
    /// Non-object values become an empty record
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(map) => Self(map),
            _ => Self::default(),
        }
    }

    /// Trimmed string value of `key`; absent, null or non-string values give ""
    pub fn text(&self, key: &str) -> String {
        self.0
            .get(key)
            .and_then(Value::as_str)
            .map(|s| s.trim().to_string())
            .unwrap_or_default()
    }
}

/// Result of mapping one raw record.
#[derive(Debug, Clone, PartialEq)]
pub enum Normalized {
    Valid(JobPosting),
    MissingTitle,
    MissingUrl { title: String },
    UnresolvableUrl {
        title: String,
        raw: String,
        error: url::ParseError,
    },
}

/// Join `raw` against `base` the way a browser resolves an href.
pub fn resolve_source_url(raw: &str, base: &Url) -> Result<String, url::ParseError> {
    base.join(raw).map(String::from)
}

pub fn normalize(raw: &RawJob, base: &Url) -> Normalized {
    let title = raw.text(FIELD_TITLE);
    if title.is_empty() {
        return Normalized::MissingTitle;
    }

    let href = raw.text(FIELD_SOURCE_URL);
    if href.is_empty() {
        return Normalized::MissingUrl { title };
    }

    let source_url = match resolve_source_url(&href, base) {
        Ok(url) => url,
        Err(error) => {
            return Normalized::UnresolvableUrl {
                title,
                raw: href,
                error,
            }
        }
    };

    Normalized::Valid(JobPosting {
        title,
        company_name: raw.text(FIELD_COMPANY),
        location: raw.text(FIELD_LOCATION),
        salary: raw.text(FIELD_SALARY),
        source_url,
    })
}
