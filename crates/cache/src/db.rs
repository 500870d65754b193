//! SQLite pool behind the video store.

use exn::ResultExt;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteSynchronous};
use std::path::Path;
use std::time::Duration;
use tracing::instrument;

use crate::error::{ErrorKind, Result};

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");
// One writer behind the store's gate, the rest for observers and one-shot reads.
const MAX_CONNECTIONS: u32 = 4;
const BUSY_TIMEOUT: Duration = Duration::from_millis(1500);

/// Connection pool for the `videos` table.
///
/// Opening a [`Database`] always brings the schema up to date. Wrap it in a
/// [`VideoStore`](crate::VideoStore) to read and write videos.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open the cache file at `path`, creating it if needed.
    ///
    /// The parent directory must already exist.
    pub async fn connect(path: impl AsRef<Path>) -> Result<Self> {
        let options = connect_options().filename(path.as_ref()).create_if_missing(true);
        Self::open(SqlitePoolOptions::new().max_connections(MAX_CONNECTIONS), options).await
    }

    /// A private cache that lives only as long as this pool.
    ///
    /// Not gated on `cfg(test)`: other crates build stores on it in their tests.
    pub async fn connect_in_memory() -> Result<Self> {
        // Each ":memory:" connection is its own empty database, so the pool
        // keeps exactly one and never recycles it.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None);
        Self::open(pool, connect_options().filename(":memory:")).await
    }

    #[instrument("opening video cache", skip_all)]
    async fn open(pool: SqlitePoolOptions, options: SqliteConnectOptions) -> Result<Self> {
        let pool = pool.connect_with(options).await.or_raise(|| ErrorKind::Database)?;
        MIGRATOR.run(&pool).await.or_raise(|| ErrorKind::Migration)?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Wait for checked-out connections to come back, then close them all.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

fn connect_options() -> SqliteConnectOptions {
    SqliteConnectOptions::new()
        // Observers keep reading while a batch commits.
        .journal_mode(SqliteJournalMode::Wal)
        .synchronous(SqliteSynchronous::Normal)
        .busy_timeout(BUSY_TIMEOUT)
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn upsert(db: &Database, url: &str, title: &str) -> sqlx::Result<()> {
        sqlx::query(include_str!("../queries/upsert_video.sql"))
            .bind(url)
            .bind(title)
            .bind("description")
            .bind("2018-06-07T17:09:43+00:00")
            .bind("thumbnail.jpg")
            .execute(db.pool())
            .await
            .map(|_| ())
    }

    async fn rows(db: &Database) -> Vec<(String, String)> {
        sqlx::query_as("SELECT url, title FROM videos ORDER BY rowid").fetch_all(db.pool()).await.unwrap()
    }

    #[tokio::test]
    async fn test_url_is_the_row_identity() {
        let db = Database::connect_in_memory().await.unwrap();
        sqlx::query("INSERT INTO videos VALUES ('a', 'A', '', '', '')").execute(db.pool()).await.unwrap();
        let err = sqlx::query("INSERT INTO videos VALUES ('a', 'A again', '', '', '')")
            .execute(db.pool())
            .await
            .unwrap_err();
        assert_eq!(ErrorKind::classify(&err), ErrorKind::Constraint);
        assert_eq!(rows(&db).await, vec![("a".to_string(), "A".to_string())]);
    }

    #[tokio::test]
    async fn test_empty_url_is_rejected() {
        let db = Database::connect_in_memory().await.unwrap();
        let err = upsert(&db, "", "nameless").await.unwrap_err();
        assert_eq!(ErrorKind::classify(&err), ErrorKind::Constraint);
        assert!(rows(&db).await.is_empty());
    }

    #[tokio::test]
    async fn test_conflict_update_keeps_rowid_order() {
        let db = Database::connect_in_memory().await.unwrap();
        upsert(&db, "a", "A").await.unwrap();
        upsert(&db, "b", "B").await.unwrap();
        upsert(&db, "a", "A2").await.unwrap();
        let rows = rows(&db).await;
        assert_eq!(rows, vec![("a".to_string(), "A2".to_string()), ("b".to_string(), "B".to_string())]);
    }

    #[tokio::test]
    async fn test_file_cache_survives_reopening() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("videos.db");
        let db = Database::connect(&path).await.unwrap();
        assert!(path.exists());
        let (mode,): (String,) = sqlx::query_as("PRAGMA journal_mode").fetch_one(db.pool()).await.unwrap();
        assert_eq!(mode, "wal");
        upsert(&db, "a", "A").await.unwrap();
        db.close().await;
        assert!(db.pool().is_closed());

        let db = Database::connect(&path).await.unwrap();
        assert_eq!(rows(&db).await, vec![("a".to_string(), "A".to_string())]);
        db.close().await;
    }

    #[tokio::test]
    async fn test_connect_into_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = Database::connect(dir.path().join("missing").join("videos.db")).await.unwrap_err();
        assert_eq!(*err, ErrorKind::Database);
    }
}
