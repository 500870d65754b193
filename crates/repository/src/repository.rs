use crate::domain::DevByteVideo;
use crate::error::{ErrorKind, Result};
use crate::mapper;
use devbytes_cache::VideoStore;
use devbytes_network::SourceHandle;
use futures::{Stream, StreamExt};
use tokio::task::JoinHandle;
use tracing::{Instrument, instrument};

/// Keeps the offline cache in step with the remote playlist.
///
/// The repository holds no state of its own: everything it knows lives in
/// the [`VideoStore`]. Cloning is cheap.
///
/// # Examples
///
/// ```no_run
/// use devbytes_cache::VideoStore;
/// use devbytes_network::source::HttpPlaylistSource;
/// use devbytes_repository::VideosRepository;
/// use devbytes_repository::error::{ErrorKind, Result};
/// use futures::StreamExt;
/// use std::sync::Arc;
/// use std::time::Duration;
///
/// # async fn example() -> Result<()> {
/// let source = HttpPlaylistSource::new(
///     devbytes_network::DEFAULT_ENDPOINT,
///     Duration::from_secs(30),
///     Duration::from_secs(10),
/// )
/// .map_err(ErrorKind::network)?;
/// let store = VideoStore::get_instance("videos.db").await.map_err(ErrorKind::storage)?;
/// let repository = VideosRepository::new(Arc::new(source), store.clone());
///
/// let mut videos = Box::pin(repository.videos());
/// repository.spawn_refresh();
/// while let Some(videos) = videos.next().await {
///     println!("{} videos", videos.len());
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct VideosRepository {
    source: SourceHandle,
    store: VideoStore,
}

impl VideosRepository {
    pub fn new(source: SourceHandle, store: VideoStore) -> Self {
        Self { source, store }
    }

    pub fn store(&self) -> &VideoStore {
        &self.store
    }

    /// Fetch the playlist and write all of it to the cache.
    ///
    /// On success every fetched video is cached, overwriting cached videos
    /// with the same URL; cached videos missing from the playlist are kept.
    /// On failure the cache is left exactly as it was and the error from the
    /// failing step is returned. No retries are attempted.
    #[instrument(skip(self), fields(source = self.source.name()))]
    pub async fn refresh(&self) -> Result<()> {
        tracing::debug!("Refreshing videos");
        let playlist = self.source.fetch_playlist().await.map_err(ErrorKind::network)?;
        let records = mapper::descriptors_to_records(playlist);
        let count = records.len();
        self.store.upsert_all(records).await.map_err(ErrorKind::storage)?;
        tracing::info!(count, "Refreshed videos");
        Ok(())
    }

    /// Run [`refresh`](Self::refresh) on the runtime without waiting for it.
    ///
    /// Observers of [`videos`](Self::videos) see the result once it commits;
    /// await the handle to learn whether it failed.
    pub fn spawn_refresh(&self) -> JoinHandle<Result<()>> {
        let repository = self.clone();
        tokio::spawn(async move { repository.refresh().await }.in_current_span())
    }

    /// Live view of the cached playlist.
    ///
    /// Emits once with the current cache contents and then again after every
    /// committed refresh. Each emission is mapped afresh from the cache.
    pub fn videos(&self) -> impl Stream<Item = Vec<DevByteVideo>> + Send + 'static {
        self.store.observe_all().map(|snapshot| mapper::records_to_domain(snapshot.iter()))
    }
}
