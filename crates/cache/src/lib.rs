//! SQLite offline cache for the DevBytes video playlist.
//!
//! The cache holds the last successfully fetched playlist so that it can be
//! shown without a network connection. The remote endpoint is the source of
//! truth: if the database is deleted, the next refresh rebuilds it.
//!
//! # Architecture
//! - [`Database`] owns the connection pool and applies migrations.
//! - [`VideoStore`] writes whole batches of [`VideoRecord`]s atomically and
//!   pushes the complete table contents to every live observer after each
//!   committed batch.
//! - [`VideoStore::get_instance`] hands out the single process-wide store.

mod db;
pub mod error;
mod models;
mod store;

pub use crate::db::Database;
pub use crate::models::VideoRecord;
pub use crate::store::{Snapshot, VideoStore};
