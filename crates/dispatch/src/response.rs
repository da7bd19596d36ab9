use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;

/// A fully buffered response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    /// Header names are lowercase.
    pub headers: BTreeMap<String, String>,
    pub content: Vec<u8>,
}

impl Response {
    pub fn new(status: u16, content: impl Into<Vec<u8>>) -> Self {
        Self { status, headers: BTreeMap::new(), content: content.into() }
    }

    /// A `200 OK` response with the given body.
    pub fn ok(content: impl Into<Vec<u8>>) -> Self {
        Self::new(200, content)
    }

    pub fn with_header(mut self, name: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.headers.insert(name.as_ref().to_lowercase(), value.into());
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_lowercase()).map(String::as_str)
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Turn a non-2xx response into a [`Status`](ErrorKind::Status) error.
    pub fn error_for_status(self) -> Result<Self> {
        if !self.is_success() {
            exn::bail!(ErrorKind::Status(self.status));
        }
        Ok(self)
    }

    pub fn text(&self) -> Result<&str> {
        std::str::from_utf8(&self.content).or_raise(|| ErrorKind::Body)
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_slice(&self.content).or_raise(|| ErrorKind::Body)
    }

    pub fn into_content(self) -> Vec<u8> {
        self.content
    }
}
