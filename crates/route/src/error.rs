//! Route Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};

/// A route error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for route operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// A verb was requested before any segment was appended. Append at least
    /// one segment (the verb itself) before invoking.
    #[display("no segments accumulated; the last segment is the HTTP verb")]
    EmptySegments,
    /// The last segment does not name an HTTP verb the dispatcher exposes.
    #[display("unknown HTTP verb: {_0}")]
    UnknownVerb(#[error(not(source))] String),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        // Building a route is pure; the same input fails the same way.
        false
    }
}
