// src/storage/supabase.rs
//! Inserts through the Supabase REST (PostgREST) interface

use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use super::{JobStore, StorageError};
use crate::job::JobRow;

/// Error body returned by PostgREST on a failed request.
#[derive(Debug, Default, Deserialize)]
struct PostgrestError {
    code: Option<String>,
    message: Option<String>,
    details: Option<String>,
    hint: Option<String>,
}

pub struct SupabaseStore {
    client: Client,
    rest_url: String,
    key: String,
    table: String,
}

impl SupabaseStore {
    pub fn new(base_url: &str, key: &str, table: &str) -> Result<Self> {
        if base_url.trim().is_empty() || key.trim().is_empty() {
            anyhow::bail!("Supabase credentials are not set");
        }

        Ok(Self {
            client: Client::new(),
            rest_url: format!("{}/rest/v1", base_url.trim_end_matches('/')),
            key: key.to_string(),
            table: table.to_string(),
        })
    }

    fn table_url(&self) -> String {
        format!("{}/{}", self.rest_url, self.table)
    }
}

#[async_trait]
impl JobStore for SupabaseStore {
    fn name(&self) -> &str {
        "supabase"
    }

    async fn insert_jobs(&self, rows: &[JobRow]) -> Result<usize, StorageError> {
        if rows.is_empty() {
            return Ok(0);
        }

        let url = self.table_url();
        debug!("Inserting {} rows into {}", rows.len(), url);

        let response = self
            .client
            .post(&url)
            .header("apikey", &self.key)
            .bearer_auth(&self.key)
            .header("Prefer", "return=minimal")
            .json(rows)
            .send()
            .await
            .map_err(|e| StorageError::Transport(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(rows.len());
        }

        let error_text = response.text().await.unwrap_or_default();
        let body: PostgrestError = serde_json::from_str(&error_text).unwrap_or_default();

        debug!(status = %status, "Supabase insert rejected");

        Err(StorageError::Backend {
            code: body.code,
            message: body
                .message
                .unwrap_or_else(|| format!("HTTP {}: {}", status, error_text)),
            details: body.details,
            hint: body.hint,
        })
    }
}
