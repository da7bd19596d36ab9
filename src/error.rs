//! Client Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction. Errors from the lower crates are kept
//! as children, so the original dispatcher or cache failure is never lost.

use derive_more::{Display, Error};
use std::path::PathBuf;

/// A client error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for client operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// No verb was appended, or it is not one the back end understands.
    #[display("invalid route")]
    Route,
    #[display("request failed")]
    Dispatch,
    #[display("extraction cache error")]
    Cache,
    #[display("configuration error")]
    Config,
    #[display("unknown instance: {_0}")]
    UnknownInstance(#[error(not(source))] String),
    /// A local file to upload could not be read.
    #[display("could not read {}", _0.display())]
    Io(#[error(not(source))] PathBuf),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Dispatch | Self::Io(_))
    }
}
