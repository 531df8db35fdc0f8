// src/storage/mod.rs
//! Storage backends for scraped postings

pub mod sqlite;
pub mod supabase;

pub use sqlite::SqliteStore;
pub use supabase::SupabaseStore;

use anyhow::{Context, Result};
use async_trait::async_trait;
use thiserror::Error;

use crate::config::{AppConfig, StorageBackend};
use crate::job::JobRow;

/// Postgres `unique_violation`, reported by PostgREST.
pub const POSTGRES_UNIQUE_VIOLATION: &str = "23505";
/// SQLite extended codes `SQLITE_CONSTRAINT_UNIQUE` and `SQLITE_CONSTRAINT_PRIMARYKEY`.
pub const SQLITE_UNIQUE_VIOLATION: &str = "2067";
pub const SQLITE_PRIMARY_KEY_VIOLATION: &str = "1555";

#[derive(Debug, Error)]
pub enum StorageError {
    /// The database rejected the insert
    #[error(
        "{message} (code: {code:?}){}{}",
        labelled("details", .details),
        labelled("hint", .hint)
    )]
    Backend {
        code: Option<String>,
        message: String,
        details: Option<String>,
        hint: Option<String>,
    },
    /// The database could not be reached or its reply could not be read
    #[error("storage transport error: {0}")]
    Transport(String),
}

fn labelled(label: &str, value: &Option<String>) -> String {
    match value.as_deref() {
        Some(value) if !value.is_empty() => format!(", {}: {}", label, value),
        _ => String::new(),
    }
}

impl StorageError {
    pub fn code(&self) -> Option<&str> {
        match self {
            StorageError::Backend { code, .. } => code.as_deref(),
            StorageError::Transport(_) => None,
        }
    }

    pub fn is_unique_violation(&self) -> bool {
        matches!(
            self.code(),
            Some(POSTGRES_UNIQUE_VIOLATION | SQLITE_UNIQUE_VIOLATION | SQLITE_PRIMARY_KEY_VIOLATION)
        )
    }
}

#[async_trait]
pub trait JobStore: Send + Sync {
    /// Human-readable backend name for logs
    fn name(&self) -> &str;

    /// Insert all rows in one call and return how many were written.
    async fn insert_jobs(&self, rows: &[JobRow]) -> Result<usize, StorageError>;
}

/// Build the configured backend.
pub async fn build_store(config: &AppConfig) -> Result<Box<dyn JobStore>> {
    let table = &config.settings.storage.table;

    match config.settings.storage.backend {
        StorageBackend::Supabase => {
            let url = config
                .credentials
                .supabase_url
                .as_deref()
                .context("SUPABASE_URL is not set")?;
            let key = config
                .credentials
                .supabase_key
                .as_deref()
                .context("SUPABASE_KEY is not set")?;
            Ok(Box::new(SupabaseStore::new(url, key, table)?))
        }
        StorageBackend::Sqlite => Ok(Box::new(
            SqliteStore::connect(&config.settings.storage.sqlite_path, table).await?,
        )),
    }
}
