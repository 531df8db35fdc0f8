// src/scraping/mod.rs
pub mod extractor;
pub mod types;

pub use extractor::Extractor;
pub use types::{default_job_card_selectors, ScrapeRequest, SelectorSpec};
