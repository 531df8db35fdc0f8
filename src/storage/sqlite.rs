// src/storage/sqlite.rs
//! Local SQLite store. The jobs table is expected to exist already.

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use std::path::Path;
use tracing::info;

use super::{JobStore, StorageError, SQLITE_PRIMARY_KEY_VIOLATION, SQLITE_UNIQUE_VIOLATION};
use crate::job::JobRow;

pub struct SqliteStore {
    pool: SqlitePool,
    table: String,
}

impl SqliteStore {
    /// Open (or create) the database file at `database_path`
    pub async fn connect(database_path: &Path, table: &str) -> Result<Self> {
        if let Some(parent) = database_path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        let database_url = format!("sqlite:{}?mode=rwc", database_path.display());
        let pool = SqlitePool::connect(&database_url).await.with_context(|| {
            format!("Failed to connect to database: {}", database_path.display())
        })?;

        info!("Database connection established: {}", database_path.display());
        Self::from_pool(pool, table)
    }

    pub fn from_pool(pool: SqlitePool, table: &str) -> Result<Self> {
        if table.is_empty() || !table.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            anyhow::bail!("Invalid table name: {}", table);
        }

        Ok(Self {
            pool,
            table: table.to_string(),
        })
    }
}

impl From<sqlx::Error> for StorageError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(db) => {
                let mut code = db.code().map(|code| code.into_owned());
                // Report the extended code even if the driver only gave SQLITE_CONSTRAINT
                if db.is_unique_violation()
                    && !matches!(
                        code.as_deref(),
                        Some(SQLITE_UNIQUE_VIOLATION | SQLITE_PRIMARY_KEY_VIOLATION)
                    )
                {
                    code = Some(SQLITE_UNIQUE_VIOLATION.to_string());
                }
                StorageError::Backend {
                    code,
                    message: db.message().to_string(),
                    details: None,
                    hint: None,
                }
            }
            other => StorageError::Transport(other.to_string()),
        }
    }
}

#[async_trait]
impl JobStore for SqliteStore {
    fn name(&self) -> &str {
        "sqlite"
    }

    async fn insert_jobs(&self, rows: &[JobRow]) -> Result<usize, StorageError> {
        if rows.is_empty() {
            return Ok(0);
        }

        // One conflicting row rejects the whole batch
        let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(format!(
            "INSERT INTO {} (title, company_name, location, salary, source_url) ",
            self.table
        ));
        builder.push_values(rows, |mut values, row| {
            values
                .push_bind(row.title.clone())
                .push_bind(row.company_name.clone())
                .push_bind(row.location.clone())
                .push_bind(row.salary.clone())
                .push_bind(row.source_url.clone());
        });

        let mut tx = self.pool.begin().await?;
        let result = builder.build().execute(&mut *tx).await?;
        tx.commit().await?;
        Ok(result.rows_affected() as usize)
    }
}
