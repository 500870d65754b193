//! Remote playlist source for the DevBytes offline cache.
//!
//! A [`PlaylistSource`] makes exactly one attempt per call to fetch the
//! current playlist. It keeps no state and no cache of its own; retrying and
//! persisting are the caller's business.

pub mod error;
mod models;
pub mod source;

pub use crate::models::{NetworkVideo, NetworkVideoContainer};
pub use crate::source::PlaylistSource;
use std::sync::Arc;

/// Default playlist endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://android-kotlin-fun-mars-server.appspot.com/devbytes";

pub type SourceHandle = Arc<dyn PlaylistSource + Send + Sync>;
