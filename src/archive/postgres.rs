// src/archive/postgres.rs
// =============================================================================
// PostgreSQL-backed archive sink.
//
// Every run starts from a clean table: connect() creates the table if it does
// not exist and then deletes all rows left over from the previous run.
//
// The pool is created lazily by deadpool, so building a PostgresArchive never
// touches the network. The first real connection happens in connect().
// =============================================================================

use anyhow::{Context, Result};
use async_trait::async_trait;
use deadpool_postgres::{Config as PgConfig, Pool, Runtime};
use tokio_postgres::NoTls;

use super::sink::{ArchiveSink, PageSummary};

const CREATE_TABLE_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS archived_pages (
  id           bigserial PRIMARY KEY,
  url          text NOT NULL,
  title        text NOT NULL,
  content      text NOT NULL,
  archived_at  timestamptz NOT NULL DEFAULT now()
);
"#;

const CLEAR_SQL: &str = "DELETE FROM archived_pages";

const INSERT_SQL: &str = "INSERT INTO archived_pages (url, title, content) VALUES ($1, $2, $3)";

pub struct PostgresArchive {
    pool: Pool,
}

impl PostgresArchive {
    pub fn new(database_url: &str) -> Result<Self> {
        let mut cfg = PgConfig::new();
        cfg.url = Some(database_url.to_string());

        let pool = cfg
            .create_pool(Some(Runtime::Tokio1), NoTls)
            .context("failed to create archive connection pool")?;
        Ok(Self { pool })
    }
}

#[async_trait]
impl ArchiveSink for PostgresArchive {
    async fn connect(&self) -> Result<()> {
        let conn = self
            .pool
            .get()
            .await
            .context("failed to connect to the archive database")?;
        conn.batch_execute(CREATE_TABLE_SQL)
            .await
            .context("failed to create archived_pages")?;
        let cleared = conn
            .execute(CLEAR_SQL, &[])
            .await
            .context("failed to clear archived_pages")?;

        tracing::info!(cleared, "archive connected");
        Ok(())
    }

    async fn insert(&self, summary: &PageSummary) -> Result<()> {
        let conn = self.pool.get().await?;
        conn.execute(INSERT_SQL, &[&summary.url, &summary.title, &summary.content])
            .await
            .with_context(|| format!("failed to archive {}", summary.url))?;
        Ok(())
    }

    async fn disconnect(&self) {
        self.pool.close();
        tracing::info!("archive disconnected");
    }
}
