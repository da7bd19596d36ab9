//! HTTP dispatcher.
//!
//! Sends requests with a blocking [`reqwest`] client. The calling thread is
//! blocked for the duration of each request; callers needing parallelism run
//! separate requesters on their own threads.

use crate::error::{ErrorKind, Result};
use crate::{Auth, Dispatcher, RequestOptions, Response};
use exn::ResultExt;
use reqwest::Method;
use reqwest::blocking::multipart::{Form, Part};
use reqwest::blocking::{Client, RequestBuilder};
use reqwest::header::HeaderMap;
use std::collections::BTreeMap;
use tracing::instrument;

/// Dispatcher backed by a blocking [`reqwest::blocking::Client`].
///
/// # Examples
///
/// ```no_run
/// use toucan_dispatch::{Dispatcher, HttpDispatcher, RequestOptions};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let dispatcher = HttpDispatcher::new();
/// let response = dispatcher.get("https://api.example.com/app/config/etl", &RequestOptions::new())?;
/// println!("{}", response.status);
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug, Default)]
pub struct HttpDispatcher {
    client: Client,
}

impl HttpDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a preconfigured client (timeouts, proxies, default headers).
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    fn request(&self, method: Method, url: &str, options: &RequestOptions) -> Result<RequestBuilder> {
        let parsed = reqwest::Url::parse(url).or_raise(|| ErrorKind::InvalidUrl(url.to_string()))?;
        let mut request = self.client.request(method, parsed);
        for (name, value) in &options.headers {
            request = request.header(name.as_str(), value.as_str());
        }
        request = match &options.auth {
            Some(Auth::Basic { username, password }) => request.basic_auth(username, password.as_ref()),
            Some(Auth::Bearer(token)) => request.bearer_auth(token),
            None => request,
        };
        if !options.files.is_empty() {
            let mut form = Form::new();
            for (name, value) in &options.form {
                form = form.text(name.clone(), value.clone());
            }
            for file in &options.files {
                let part = Part::bytes(file.content.clone()).file_name(file.file_name.clone());
                form = form.part(file.field.clone(), part);
            }
            request = request.multipart(form);
        } else if !options.form.is_empty() {
            request = request.form(&options.form);
        }
        if let Some(json) = &options.json {
            request = request.json(json);
        }
        if let Some(body) = &options.body {
            request = request.body(body.clone());
        }
        if !options.extra.is_empty() {
            tracing::trace!(keys = ?options.extra.keys().collect::<Vec<_>>(), "Ignoring options the HTTP transport has no use for");
        }
        Ok(request)
    }

    #[instrument(skip(self, options), fields(status))]
    fn send(&self, method: Method, url: &str, options: &RequestOptions) -> Result<Response> {
        let response = self.request(method, url, options)?.send().or_raise(|| ErrorKind::Transport)?;
        let status = response.status().as_u16();
        tracing::Span::current().record("status", status);
        let headers = Self::headers(response.headers());
        let content = response.bytes().or_raise(|| ErrorKind::Body)?.to_vec();
        Ok(Response { status, headers, content })
    }

    fn headers(map: &HeaderMap) -> BTreeMap<String, String> {
        map.iter()
            .filter_map(|(name, value)| Some((name.as_str().to_lowercase(), value.to_str().ok()?.to_string())))
            .collect()
    }
}

impl Dispatcher for HttpDispatcher {
    fn name(&self) -> &str {
        "http"
    }

    fn get(&self, url: &str, options: &RequestOptions) -> Result<Response> {
        self.send(Method::GET, url, options)
    }

    fn post(&self, url: &str, options: &RequestOptions) -> Result<Response> {
        self.send(Method::POST, url, options)
    }

    fn put(&self, url: &str, options: &RequestOptions) -> Result<Response> {
        self.send(Method::PUT, url, options)
    }

    fn delete(&self, url: &str, options: &RequestOptions) -> Result<Response> {
        self.send(Method::DELETE, url, options)
    }
}
