//! Playlist source trait and implementations.

mod http;
#[cfg(feature = "mock")]
mod mock;

pub use self::http::HttpPlaylistSource;
#[cfg(feature = "mock")]
pub use self::mock::MockSource;
use crate::error::Result;
use crate::models::NetworkVideo;
use async_trait::async_trait;

/// Somewhere the current playlist can be fetched from.
///
/// # Examples
///
/// ```no_run
/// use devbytes_network::PlaylistSource;
/// # use devbytes_network::error::Result;
/// # async fn example(source: &dyn PlaylistSource) -> Result<()> {
/// for video in source.fetch_playlist().await? {
///     println!("{}: {}", video.title, video.url);
/// }
/// # Ok(())
/// # }
/// ```
#[async_trait]
pub trait PlaylistSource: Send + Sync {
    /// Name of the source, used for logging only.
    fn name(&self) -> &str;

    /// Fetch the whole playlist, in the order the source lists it.
    ///
    /// Makes a single attempt. Fails with [`Network`](crate::error::ErrorKind::Network)
    /// or [`Status`](crate::error::ErrorKind::Status) when the request does
    /// not succeed, and with [`Decode`](crate::error::ErrorKind::Decode) when
    /// the body is not a playlist.
    async fn fetch_playlist(&self) -> Result<Vec<NetworkVideo>>;
}
