//! Cache Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};

/// A cache error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for cache operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    #[display("database error")]
    Database,
    #[display("database migration error")]
    Migration,
    /// A record in the batch violated a table constraint; nothing was written.
    #[display("record violates a cache constraint")]
    Constraint,
    /// The background write task panicked or was aborted by the runtime.
    #[display("cache write was interrupted")]
    Interrupted,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Database | Self::Interrupted)
    }

    pub(crate) fn classify(err: &sqlx::Error) -> Self {
        match err.as_database_error().map(|db| db.kind()) {
            Some(sqlx::error::ErrorKind::Other) | None => Self::Database,
            Some(_) => Self::Constraint,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(ErrorKind::Database, true)]
    #[case(ErrorKind::Migration, false)]
    #[case(ErrorKind::Constraint, false)]
    #[case(ErrorKind::Interrupted, true)]
    fn test_is_retryable(#[case] kind: ErrorKind, #[case] expected: bool) {
        assert_eq!(kind.is_retryable(), expected);
    }

    #[test]
    fn test_classify_non_database_error() {
        assert_eq!(ErrorKind::classify(&sqlx::Error::RowNotFound), ErrorKind::Database);
    }
}
