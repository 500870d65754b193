//! Scripted playlist source for testing.

use crate::error::{ErrorKind, Result};
use crate::models::NetworkVideo;
use crate::source::PlaylistSource;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

enum Scripted {
    Fail(ErrorKind),
    Hang,
}

/// In-memory playlist source for testing.
///
/// Serves the current playlist on every call, unless a failure or a hang has
/// been queued for the next call. Everything sits behind a [`Mutex`], so all
/// methods work on `&self` and the source can be shared with the code under
/// test.
///
/// # Examples
///
/// ```
/// use devbytes_network::error::ErrorKind;
/// use devbytes_network::source::MockSource;
/// use devbytes_network::PlaylistSource;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let source = MockSource::default();
/// source.fail_next(ErrorKind::Status(503));
/// assert!(source.fetch_playlist().await.is_err());
/// assert!(source.fetch_playlist().await.unwrap().is_empty());
/// assert_eq!(source.calls(), 2);
/// # }
/// ```
#[derive(Default)]
pub struct MockSource {
    playlist: Mutex<Vec<NetworkVideo>>,
    script: Mutex<VecDeque<Scripted>>,
    calls: AtomicUsize,
}

impl MockSource {
    pub fn with_playlist(videos: impl IntoIterator<Item = NetworkVideo>) -> Self {
        let source = Self::default();
        source.set_playlist(videos);
        source
    }

    /// Replace the playlist served from now on.
    pub fn set_playlist(&self, videos: impl IntoIterator<Item = NetworkVideo>) {
        *self.playlist.lock().unwrap_or_else(|e| e.into_inner()) = videos.into_iter().collect();
    }

    /// Make the next call fail with `kind`.
    pub fn fail_next(&self, kind: ErrorKind) {
        self.push(Scripted::Fail(kind));
    }

    /// Make the next call never complete, as if the connection stalled.
    pub fn hang_next(&self) {
        self.push(Scripted::Hang);
    }

    /// Number of fetches attempted so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn push(&self, scripted: Scripted) {
        self.script.lock().unwrap_or_else(|e| e.into_inner()).push_back(scripted);
    }
}

#[async_trait]
impl PlaylistSource for MockSource {
    fn name(&self) -> &str {
        "mock"
    }

    async fn fetch_playlist(&self) -> Result<Vec<NetworkVideo>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let next = self.script.lock().unwrap_or_else(|e| e.into_inner()).pop_front();
        match next {
            Some(Scripted::Fail(kind)) => Err(exn::Exn::from(kind)),
            Some(Scripted::Hang) => std::future::pending().await,
            None => Ok(self.playlist.lock().unwrap_or_else(|e| e.into_inner()).clone()),
        }
    }
}
