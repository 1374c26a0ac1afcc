use std::str::FromStr;
use std::time::Duration;

use chrono::Utc;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use tracing::info;

use crate::error::{AppError, AppResult};
use crate::extractor::ValidatedUrl;
use crate::models::{LinkMetadata, LinkRecord, SaveOutcome};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS links (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    url         TEXT NOT NULL UNIQUE,
    title       TEXT NOT NULL,
    description TEXT NOT NULL,
    image       TEXT NOT NULL,
    added_at    TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_links_added_at ON links (added_at);
";

/// Saved links, keyed by URL.
///
/// Duplicate saves are rejected: the first record for a URL is kept and later
/// saves report [`SaveOutcome::AlreadyExists`].
#[derive(Clone, Debug)]
pub struct LinkStore {
    pool: SqlitePool,
}

impl LinkStore {
    /// Open (creating if missing) the SQLite database at `database_url` and
    /// make sure the schema exists.
    pub async fn open(database_url: &str) -> AppResult<Self> {
        info!("🔌 Opening link database...");

        let options = SqliteConnectOptions::from_str(database_url)
            .map_err(|e| {
                tracing::error!("Invalid database URL {}: {:?}", database_url, e);
                AppError::Database(e)
            })?
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(5))
            .connect_with(options)
            .await
            .map_err(|e| {
                tracing::error!("Failed to open database: {:?}", e);
                AppError::Database(e)
            })?;

        let store = LinkStore { pool };
        store.ensure_schema().await?;

        info!("✅ Link database ready");
        Ok(store)
    }

    /// A private in-memory database. Pinned to one long-lived connection,
    /// since every SQLite memory connection is its own database.
    pub async fn in_memory() -> AppResult<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?;
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        let store = LinkStore { pool };
        store.ensure_schema().await?;
        Ok(store)
    }

    /// Create the `links` table and its index if absent. Safe to call any
    /// number of times.
    pub async fn ensure_schema(&self) -> AppResult<()> {
        sqlx::raw_sql(SCHEMA).execute(&self.pool).await?;
        Ok(())
    }

    /// Insert a link unless its URL is already stored. Check and insert are a
    /// single statement, so concurrent saves of one URL yield one row.
    pub async fn save(&self, url: &ValidatedUrl, metadata: &LinkMetadata) -> AppResult<SaveOutcome> {
        let inserted = sqlx::query_as::<_, LinkRecord>(
            "INSERT INTO links (url, title, description, image, added_at)
             VALUES (?, ?, ?, ?, ?)
             ON CONFLICT (url) DO NOTHING
             RETURNING id, url, title, description, image, added_at",
        )
        .bind(url.as_str())
        .bind(&metadata.title)
        .bind(&metadata.description)
        .bind(&metadata.image)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        match inserted {
            Some(record) => {
                info!(url = %url, id = record.id, "Link saved");
                Ok(SaveOutcome::Saved(record))
            }
            None => {
                info!(url = %url, "Link already exists");
                Ok(SaveOutcome::AlreadyExists)
            }
        }
    }

    /// All saved links, most recently added first.
    pub async fn get_all(&self) -> AppResult<Vec<LinkRecord>> {
        let links = sqlx::query_as::<_, LinkRecord>(
            "SELECT id, url, title, description, image, added_at
             FROM links
             ORDER BY added_at DESC, id DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(links)
    }

    pub async fn get(&self, url: &str) -> AppResult<Option<LinkRecord>> {
        let link = sqlx::query_as::<_, LinkRecord>(
            "SELECT id, url, title, description, image, added_at
             FROM links
             WHERE url = ?",
        )
        .bind(url)
        .fetch_optional(&self.pool)
        .await?;

        Ok(link)
    }

    pub async fn contains(&self, url: &str) -> AppResult<bool> {
        let matches: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM links WHERE url = ?")
            .bind(url)
            .fetch_one(&self.pool)
            .await?;

        Ok(matches > 0)
    }

    pub async fn count(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM links")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    pub async fn health_check(&self) -> AppResult<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;

        Ok(())
    }

    /// Close the pool, waiting for in-flight queries to finish.
    pub async fn close(self) {
        self.pool.close().await;
        info!("🔒 Link database closed");
    }
}
