//! Out-of-band request configuration.

use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt::{Debug, Formatter, Result as FmtResult};

/// Credentials attached to a request.
#[derive(Clone, PartialEq, Eq)]
pub enum Auth {
    /// HTTP basic authentication.
    Basic { username: String, password: Option<String> },
    /// `Authorization: Bearer <token>`.
    Bearer(String),
}
impl Auth {
    pub fn basic(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self::Basic { username: username.into(), password: Some(password.into()) }
    }

    pub fn bearer(token: impl Into<String>) -> Self {
        Self::Bearer(token.into())
    }
}
// Keep secrets out of logs and panic messages.
impl Debug for Auth {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Basic { username, .. } => f.debug_struct("Basic").field("username", username).finish_non_exhaustive(),
            Self::Bearer(_) => f.write_str("Bearer(..)"),
        }
    }
}

/// A file sent as one part of a multipart body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePart {
    /// Multipart field name (`file` for every upload the back end accepts).
    pub field: String,
    /// File name reported to the back end.
    pub file_name: String,
    pub content: Vec<u8>,
}
impl FilePart {
    pub fn new(field: impl Into<String>, file_name: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        Self {
            field: field.into(),
            file_name: file_name.into(),
            content: content.into(),
        }
    }
}

/// The option bag handed to a [`Dispatcher`](crate::Dispatcher) alongside
/// the URL.
///
/// Options accumulate: nothing in this crate ever clears them, so a
/// requester that keeps one bag for its lifetime sends the same headers,
/// credentials and bodies with every call until the caller changes them.
///
/// Transports interpret the typed fields. `extra` holds any other keyword
/// configuration a caller wants to carry; the HTTP transport ignores it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestOptions {
    pub headers: BTreeMap<String, String>,
    pub auth: Option<Auth>,
    pub json: Option<Value>,
    pub body: Option<Vec<u8>>,
    /// Form fields. Sent URL-encoded, or as text parts when `files` is set.
    pub form: BTreeMap<String, String>,
    pub files: Vec<FilePart>,
    pub extra: BTreeMap<String, Value>,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn with_auth(mut self, auth: impl Into<Option<Auth>>) -> Self {
        self.auth = auth.into();
        self
    }

    pub fn with_json(mut self, json: Value) -> Self {
        self.json = Some(json);
        self
    }

    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn with_form(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.form.insert(name.into(), value.into());
        self
    }

    pub fn with_file(mut self, file: FilePart) -> Self {
        self.files.push(file);
        self
    }

    /// Record an arbitrary keyword option, replacing any previous value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// A fresh bag that carries only the credentials of this one.
    pub fn auth_only(&self) -> Self {
        Self { auth: self.auth.clone(), ..Self::default() }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
