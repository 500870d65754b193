//! Playlist source backed by an HTTP endpoint.

use crate::error::{ErrorKind, Result};
use crate::models::{NetworkVideo, NetworkVideoContainer};
use crate::source::PlaylistSource;
use async_trait::async_trait;
use exn::ResultExt;
use reqwest::header::ACCEPT;
use reqwest::{Client, Url};
use std::time::Duration;
use tracing::instrument;

const USER_AGENT: &str = concat!("devbytes/", env!("CARGO_PKG_VERSION"));

/// Fetches the playlist with a single GET request.
///
/// # Examples
///
/// ```no_run
/// use devbytes_network::source::HttpPlaylistSource;
/// use std::time::Duration;
///
/// # fn example() -> devbytes_network::error::Result<()> {
/// let source = HttpPlaylistSource::new(
///     devbytes_network::DEFAULT_ENDPOINT,
///     Duration::from_secs(30),
///     Duration::from_secs(10),
/// )?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct HttpPlaylistSource {
    client: Client,
    endpoint: Url,
}

impl HttpPlaylistSource {
    /// Create a source for `endpoint`.
    ///
    /// `timeout` bounds the whole request (including reading the body) and
    /// `connect_timeout` bounds establishing the connection.
    pub fn new(endpoint: impl AsRef<str>, timeout: Duration, connect_timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(connect_timeout)
            .user_agent(USER_AGENT)
            .build()
            .or_raise(|| ErrorKind::Network)?;
        Self::with_client(client, endpoint)
    }

    /// Create a source that shares an existing client.
    pub fn with_client(client: Client, endpoint: impl AsRef<str>) -> Result<Self> {
        let endpoint = parse_endpoint(endpoint.as_ref())?;
        Ok(Self { client, endpoint })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

fn parse_endpoint(endpoint: &str) -> Result<Url> {
    let url = Url::parse(endpoint).or_raise(|| ErrorKind::InvalidEndpoint(endpoint.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        exn::bail!(ErrorKind::InvalidEndpoint(endpoint.to_string()));
    }
    Ok(url)
}

#[async_trait]
impl PlaylistSource for HttpPlaylistSource {
    fn name(&self) -> &str {
        self.endpoint.as_str()
    }

    #[instrument(skip(self), fields(endpoint = %self.endpoint))]
    async fn fetch_playlist(&self) -> Result<Vec<NetworkVideo>> {
        let response = self
            .client
            .get(self.endpoint.clone())
            .header(ACCEPT, "application/json")
            .send()
            .await
            .or_raise(|| ErrorKind::Network)?;
        let status = response.status();
        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), "Playlist request was not successful");
            exn::bail!(ErrorKind::Status(status.as_u16()));
        }
        let body = response.bytes().await.or_raise(|| ErrorKind::Network)?;
        let container: NetworkVideoContainer = serde_json::from_slice(&body).or_raise(|| ErrorKind::Decode)?;
        tracing::debug!(count = container.videos.len(), bytes = body.len(), "Fetched playlist");
        Ok(container.videos)
    }
}
