//! Network Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};

/// A playlist fetch error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for playlist fetch operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The configured endpoint is not an absolute http(s) URL.
    #[display("invalid playlist endpoint: {_0}")]
    InvalidEndpoint(#[error(not(source))] String),
    /// Connection failure, timeout, or the body could not be read.
    #[display("network error")]
    Network,
    /// The server answered with a non-success status code.
    #[display("playlist request failed with HTTP status {_0}")]
    Status(#[error(not(source))] u16),
    /// The response body is not a playlist.
    #[display("malformed playlist response")]
    Decode,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Network => true,
            Self::Status(status) => *status >= 500 || *status == 408 || *status == 429,
            Self::InvalidEndpoint(_) | Self::Decode => false,
        }
    }

    /// Returns `true` if the response arrived but could not be understood.
    pub fn is_decode(&self) -> bool {
        matches!(self, Self::Decode)
    }
}
