//! Live video store.
//!
//! Writes happen in whole batches. After a batch commits, the complete
//! contents of the `videos` table are pushed to every observer, so an
//! observer only ever sees committed, complete states and sees them in the
//! order they were committed.

use crate::Database;
use crate::error::{ErrorKind, Result};
use crate::models::VideoRecord;
use async_stream::stream;
use exn::ResultExt;
use futures::Stream;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::{Mutex, OnceCell, watch};
use tracing::{Instrument, instrument};

/// Every cached record at one point in time, in the order each `url` was
/// first stored.
pub type Snapshot = Arc<[VideoRecord]>;

static INSTANCE: OnceCell<VideoStore> = OnceCell::const_new();

/// Store of cached video records with a push-based read path.
///
/// Cloning is cheap and every clone shares the same pool, write gate and
/// observers.
///
/// # Examples
///
/// ```no_run
/// use devbytes_cache::{VideoRecord, VideoStore};
/// use futures::StreamExt;
///
/// # async fn example() -> devbytes_cache::error::Result<()> {
/// let store = VideoStore::get_instance("/var/cache/devbytes/videos.db").await?;
/// let mut videos = Box::pin(store.observe_all());
/// store.upsert_all(vec![VideoRecord {
///     url: "https://youtu.be/abc".to_string(),
///     title: "Kotlin Coroutines".to_string(),
///     description: "Structured concurrency".to_string(),
///     updated: "2019-05-01T00:00:00.000Z".to_string(),
///     thumbnail: "https://i.ytimg.com/vi/abc/hqdefault.jpg".to_string(),
/// }]).await?;
/// while let Some(snapshot) = videos.next().await {
///     println!("{} cached videos", snapshot.len());
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct VideoStore {
    db: Database,
    writer: Arc<Mutex<()>>,
    latest: Arc<watch::Sender<Snapshot>>,
}

impl VideoStore {
    /// The process-wide store, opened on first use.
    ///
    /// Only the first successful call opens the database at `path`; every
    /// later call (concurrent or not) returns the same instance and ignores
    /// its argument. If opening fails, the error is returned to that caller
    /// and the next call tries again.
    pub async fn get_instance(path: impl AsRef<Path>) -> Result<&'static VideoStore> {
        let path = path.as_ref();
        INSTANCE
            .get_or_try_init(|| async {
                tracing::debug!(path = %path.display(), "Opening video store");
                Self::open(Database::connect(path).await?).await
            })
            .await
    }

    /// Wrap an already connected database, loading its current contents as
    /// the first snapshot.
    pub async fn open(db: Database) -> Result<Self> {
        let initial = select_all(db.pool()).await?;
        let (latest, _) = watch::channel(initial);
        Ok(Self {
            db,
            writer: Arc::default(),
            latest: Arc::new(latest),
        })
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Insert or replace every record in one transaction.
    ///
    /// Records whose `url` is already cached overwrite that row in place;
    /// rows not mentioned in `records` are left alone. Either the whole batch
    /// commits and observers receive the new snapshot, or nothing is written
    /// and nothing is emitted.
    ///
    /// The write runs on its own task: dropping the returned future does not
    /// abort a batch halfway, it only stops waiting for the result.
    #[instrument(skip_all, fields(count = records.len()))]
    pub async fn upsert_all(&self, records: Vec<VideoRecord>) -> Result<()> {
        let store = self.clone();
        let write = async move { store.write_batch(records).await };
        tokio::spawn(write.in_current_span()).await.or_raise(|| ErrorKind::Interrupted)?
    }

    async fn write_batch(&self, records: Vec<VideoRecord>) -> Result<()> {
        // Held until observers have the new snapshot, so snapshots are
        // published in commit order.
        let _gate = self.writer.lock().await;
        let mut tx = self.db.pool().begin().await.or_raise(|| ErrorKind::Database)?;
        for record in &records {
            let result = sqlx::query(include_str!("../queries/upsert_video.sql"))
                .bind(&record.url)
                .bind(&record.title)
                .bind(&record.description)
                .bind(&record.updated)
                .bind(&record.thumbnail)
                .execute(&mut *tx)
                .await;
            if let Err(err) = result {
                let kind = ErrorKind::classify(&err);
                tracing::warn!(url = %record.url, error = %err, "Rejected video batch");
                // Dropping the transaction rolls back the rows already written.
                return Err(err).or_raise(|| kind);
            }
        }
        let snapshot = select_all(&mut *tx).await?;
        tx.commit().await.or_raise(|| ErrorKind::Database)?;
        tracing::debug!(written = records.len(), total = snapshot.len(), "Committed video batch");
        self.latest.send_replace(snapshot);
        Ok(())
    }

    /// Live view of the whole table.
    ///
    /// Yields the current snapshot immediately, then a new snapshot after
    /// every committed [`upsert_all`](Self::upsert_all). A slow consumer may
    /// skip intermediate snapshots but never receives an older one after a
    /// newer one. Dropping the stream unsubscribes.
    pub fn observe_all(&self) -> impl Stream<Item = Snapshot> + Send + 'static {
        let mut receiver = self.latest.subscribe();
        stream! {
            loop {
                let snapshot = receiver.borrow_and_update().clone();
                yield snapshot;
                if receiver.changed().await.is_err() {
                    break;
                }
            }
        }
    }

    /// The last committed snapshot, without subscribing.
    pub fn snapshot(&self) -> Snapshot {
        self.latest.borrow().clone()
    }

    /// Read every cached record straight from the database.
    pub async fn list_all(&self) -> Result<Vec<VideoRecord>> {
        Ok(select_all(self.db.pool()).await?.to_vec())
    }
}

async fn select_all<'e, E>(executor: E) -> Result<Snapshot>
where
    E: sqlx::SqliteExecutor<'e>,
{
    let rows: Vec<VideoRecord> = sqlx::query_as(include_str!("../queries/list_videos.sql"))
        .fetch_all(executor)
        .await
        .or_raise(|| ErrorKind::Database)?;
    Ok(rows.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::{FutureExt, StreamExt};

    fn video(url: &str, title: &str) -> VideoRecord {
        VideoRecord {
            url: url.to_string(),
            title: title.to_string(),
            description: format!("About {title}"),
            updated: "2018-06-07T17:09:43+00:00".to_string(),
            thumbnail: format!("https://i.ytimg.com/vi/{url}/hqdefault.jpg"),
        }
    }

    fn titles(snapshot: &Snapshot) -> Vec<&str> {
        snapshot.iter().map(|r| r.title.as_str()).collect()
    }

    async fn store() -> VideoStore {
        VideoStore::open(Database::connect_in_memory().await.unwrap()).await.unwrap()
    }

    #[tokio::test]
    async fn test_upsert_and_list() {
        let store = store().await;
        store.upsert_all(vec![video("a", "A"), video("b", "B")]).await.unwrap();
        let all = store.list_all().await.unwrap();
        assert_eq!(all, vec![video("a", "A"), video("b", "B")]);
    }

    #[tokio::test]
    async fn test_conflicting_url_is_replaced_in_place() {
        let store = store().await;
        store.upsert_all(vec![video("a", "A"), video("b", "B")]).await.unwrap();
        store.upsert_all(vec![video("a", "A2")]).await.unwrap();
        let all = store.list_all().await.unwrap();
        // Stale "b" is kept and "a" keeps its original position.
        assert_eq!(all, vec![video("a", "A2"), video("b", "B")]);
    }

    #[tokio::test]
    async fn test_duplicate_url_within_batch_keeps_last() {
        let store = store().await;
        store.upsert_all(vec![video("a", "first"), video("a", "second")]).await.unwrap();
        let all = store.list_all().await.unwrap();
        assert_eq!(all, vec![video("a", "second")]);
    }

    #[tokio::test]
    async fn test_empty_batch_is_noop_write() {
        let store = store().await;
        store.upsert_all(vec![video("a", "A")]).await.unwrap();
        store.upsert_all(Vec::new()).await.unwrap();
        assert_eq!(store.list_all().await.unwrap(), vec![video("a", "A")]);
    }

    #[tokio::test]
    async fn test_failed_batch_writes_nothing() {
        let store = store().await;
        store.upsert_all(vec![video("a", "A")]).await.unwrap();
        let mut observer = Box::pin(store.observe_all());
        assert_eq!(titles(&observer.next().await.unwrap()), vec!["A"]);

        let err = store.upsert_all(vec![video("b", "B"), video("", "no identity")]).await.unwrap_err();
        assert_eq!(*err, ErrorKind::Constraint);
        assert_eq!(store.list_all().await.unwrap(), vec![video("a", "A")]);
        // No snapshot is published for the rejected batch.
        assert!(observer.next().now_or_never().is_none());
    }

    #[tokio::test]
    async fn test_observer_receives_current_then_updates() {
        let store = store().await;
        let mut observer = Box::pin(store.observe_all());
        assert!(observer.next().await.unwrap().is_empty());

        store.upsert_all(vec![video("a", "A"), video("b", "B")]).await.unwrap();
        assert_eq!(titles(&observer.next().await.unwrap()), vec!["A", "B"]);

        store.upsert_all(vec![video("a", "A2")]).await.unwrap();
        assert_eq!(titles(&observer.next().await.unwrap()), vec!["A2", "B"]);
    }

    #[tokio::test]
    async fn test_late_observer_starts_from_latest() {
        let store = store().await;
        store.upsert_all(vec![video("a", "A")]).await.unwrap();
        let mut observer = Box::pin(store.clone().observe_all());
        assert_eq!(titles(&observer.next().await.unwrap()), vec!["A"]);
        assert!(observer.next().now_or_never().is_none());
    }

    #[tokio::test]
    async fn test_open_loads_existing_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("videos.db");
        let first = VideoStore::open(Database::connect(&path).await.unwrap()).await.unwrap();
        first.upsert_all(vec![video("a", "A")]).await.unwrap();
        first.database().close().await;

        let second = VideoStore::open(Database::connect(&path).await.unwrap()).await.unwrap();
        assert_eq!(titles(&second.snapshot()), vec!["A"]);
        second.database().close().await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_batches_never_interleave() {
        let dir = tempfile::tempdir().unwrap();
        let store = VideoStore::open(Database::connect(dir.path().join("videos.db")).await.unwrap()).await.unwrap();
        let batch = |title: &str| (0..50).map(|i| video(&i.to_string(), title)).collect::<Vec<_>>();
        store.upsert_all(batch("old")).await.unwrap();

        let reader = {
            let store = store.clone();
            tokio::spawn(async move {
                for _ in 0..100 {
                    let all = store.list_all().await.unwrap();
                    assert_eq!(all.len(), 50);
                    assert!(all.iter().all(|r| r.title == all[0].title), "read a half-written batch");
                }
            })
        };
        let writers: Vec<_> = (0..10)
            .map(|i| {
                let store = store.clone();
                let titles = if i % 2 == 0 { batch("new") } else { batch("old") };
                tokio::spawn(async move { store.upsert_all(titles).await })
            })
            .collect();
        for writer in writers {
            writer.await.unwrap().unwrap();
        }
        reader.await.unwrap();

        let snapshot = store.snapshot();
        assert_eq!(snapshot.len(), 50);
        assert!(snapshot.iter().all(|r| r.title == snapshot[0].title));
        // The published snapshot matches what was committed last.
        assert_eq!(snapshot.to_vec(), store.list_all().await.unwrap());
        store.database().close().await;
    }
}
