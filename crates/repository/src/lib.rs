//! Refresh-and-cache coordination for the DevBytes video playlist.
//!
//! [`VideosRepository`] is the only thing presentation code needs: it pulls
//! the playlist from a [`PlaylistSource`](devbytes_network::PlaylistSource),
//! writes it to the [`VideoStore`](devbytes_cache::VideoStore), and exposes
//! the cached playlist as a live stream of [`DevByteVideo`]s. The write path
//! and the read path only meet inside the store.

mod domain;
pub mod error;
pub mod mapper;
mod repository;

pub use crate::domain::DevByteVideo;
pub use crate::repository::VideosRepository;
