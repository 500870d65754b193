//! Repository Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};
use devbytes_cache::error::Error as CacheError;
use devbytes_network::error::Error as NetworkError;

/// A refresh error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for repository operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Why a refresh failed. The original error is kept as the child frame.
#[derive(Debug, Display, Error, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The playlist could not be fetched (connection, timeout or HTTP status).
    #[display("could not fetch the playlist")]
    Network {
        #[error(not(source))]
        retryable: bool,
    },
    /// The playlist was fetched but could not be understood.
    #[display("could not decode the playlist")]
    Decode,
    /// The playlist could not be written to the offline cache.
    #[display("could not update the offline cache")]
    Storage {
        #[error(not(source))]
        retryable: bool,
    },
}

impl ErrorKind {
    /// Convert a fetch error into a refresh error, preserving the network
    /// crate's `Exn` frame as a child in the error tree.
    #[track_caller]
    pub fn network(err: NetworkError) -> Error {
        let kind = match err.is_decode() {
            true => Self::Decode,
            false => Self::Network { retryable: err.is_retryable() },
        };
        err.raise(kind)
    }

    /// Convert a cache error into a refresh error, preserving the cache
    /// crate's `Exn` frame as a child in the error tree.
    #[track_caller]
    pub fn storage(err: CacheError) -> Error {
        let kind = Self::Storage { retryable: err.is_retryable() };
        err.raise(kind)
    }

    /// Returns `true` if the refresh failed before anything reached the cache
    /// because the remote source did not deliver a usable playlist.
    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Network { .. } | Self::Decode)
    }

    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Network { retryable } | Self::Storage { retryable } => *retryable,
            Self::Decode => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use devbytes_cache::error::ErrorKind as CacheErrorKind;
    use devbytes_network::error::ErrorKind as NetworkErrorKind;
    use rstest::rstest;

    #[rstest]
    #[case(NetworkErrorKind::Network, ErrorKind::Network { retryable: true })]
    #[case(NetworkErrorKind::Status(500), ErrorKind::Network { retryable: true })]
    #[case(NetworkErrorKind::Status(404), ErrorKind::Network { retryable: false })]
    #[case(NetworkErrorKind::InvalidEndpoint("file:///".to_string()), ErrorKind::Network { retryable: false })]
    #[case(NetworkErrorKind::Decode, ErrorKind::Decode)]
    fn test_network_classification(#[case] child: NetworkErrorKind, #[case] expected: ErrorKind) {
        let err = ErrorKind::network(exn::Exn::from(child));
        assert_eq!(*err, expected);
        assert!(err.is_remote());
    }

    #[rstest]
    #[case(CacheErrorKind::Database, ErrorKind::Storage { retryable: true })]
    #[case(CacheErrorKind::Constraint, ErrorKind::Storage { retryable: false })]
    fn test_storage_classification(#[case] child: CacheErrorKind, #[case] expected: ErrorKind) {
        let err = ErrorKind::storage(exn::Exn::from(child));
        assert_eq!(*err, expected);
        assert!(!err.is_remote());
    }
}
