// src/scraping/types.rs
use serde::{Deserialize, Serialize};

/// One node of the declarative selector tree sent to the scraping service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectorSpec {
    pub selector: String,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub multiple: bool,
    /// Name the matched value is reported under
    #[serde(rename = "as", default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    /// Read this attribute instead of the element text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attribute: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub elements: Vec<SelectorSpec>,
}

impl SelectorSpec {
    pub fn field(selector: &str, alias: &str) -> Self {
        Self {
            selector: selector.to_string(),
            multiple: false,
            alias: Some(alias.to_string()),
            attribute: None,
            elements: Vec::new(),
        }
    }

    pub fn with_attribute(mut self, attribute: &str) -> Self {
        self.attribute = Some(attribute.to_string());
        self
    }

    /// A container matched once per listing card
    pub fn repeated(selector: &str, elements: Vec<SelectorSpec>) -> Self {
        Self {
            selector: selector.to_string(),
            multiple: true,
            alias: None,
            attribute: None,
            elements,
        }
    }
}

/// Selector tree for an Indeed search-results page.
pub fn default_job_card_selectors() -> Vec<SelectorSpec> {
    vec![SelectorSpec::repeated(
        "div.job_seen_beacon",
        vec![
            SelectorSpec::field("h2.jobTitle span[title]", "title"),
            SelectorSpec::field("span.companyName", "companyName"),
            SelectorSpec::field("div.companyLocation", "location"),
            SelectorSpec::field("div.salary-snippet-container", "salary"),
            SelectorSpec::field("h2.jobTitle a", "sourceUrl").with_attribute("href"),
        ],
    )]
}

/// Request body for `POST /scrape`.
#[derive(Debug, Serialize)]
pub struct ScrapeRequest<'a> {
    pub url: &'a str,
    pub elements: &'a [SelectorSpec],
}
