//! Dispatch Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};

/// A dispatch error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for dispatch operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The request never produced a response (connection, DNS, timeout).
    #[display("transport error")]
    Transport,
    /// The compiled route is not a URL the transport accepts.
    #[display("invalid URL: {_0}")]
    InvalidUrl(#[error(not(source))] String),
    /// The back end answered with a non-success status. Only raised when the
    /// caller asks for it via [`Response::error_for_status`](crate::Response::error_for_status).
    #[display("unexpected status: {_0}")]
    Status(#[error(not(source))] u16),
    /// The response body could not be read or decoded.
    #[display("invalid response body")]
    Body,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport => true,
            Self::Status(status) => *status >= 500,
            Self::InvalidUrl(_) | Self::Body => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn error_kind_display() {
        assert_eq!(ErrorKind::Transport.to_string(), "transport error");
        assert_eq!(ErrorKind::InvalidUrl("nope".to_string()).to_string(), "invalid URL: nope");
        assert_eq!(ErrorKind::Status(404).to_string(), "unexpected status: 404");
    }

    #[rstest]
    #[case(ErrorKind::Transport, true)]
    #[case(ErrorKind::Status(503), true)]
    #[case(ErrorKind::Status(404), false)]
    #[case(ErrorKind::InvalidUrl(String::new()), false)]
    #[case(ErrorKind::Body, false)]
    fn error_kind_retryable(#[case] kind: ErrorKind, #[case] expected: bool) {
        assert_eq!(kind.is_retryable(), expected);
    }
}
