//! Cache Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};
use std::path::PathBuf;

/// A cache error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for cache operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The downloaded payload is not a readable zip archive.
    #[display("invalid extraction archive")]
    ArchiveDecode,
    /// An archive entry would not land directly inside the cache directory.
    #[display("invalid archive entry name: {_0}")]
    InvalidEntryName(#[error(not(source))] String),
    #[display("could not decode table: {}", _0.display())]
    TableDecode(#[error(not(source))] PathBuf),
    #[display("could not encode table")]
    TableEncode,
    /// Filesystem failure while writing or reading the cache directory.
    #[display("could not persist cache: {}", _0.display())]
    CachePersist(#[error(not(source))] PathBuf),
    /// The fetch callback failed; the dispatcher error is the child.
    #[display("could not fetch extraction archive")]
    Fetch,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Fetch | Self::CachePersist(_))
    }
}
