//! Dispatcher trait and implementations.
//!
//! This module defines the [`Dispatcher`] trait, the narrow interface the
//! requester uses to perform network calls. The core never implements
//! transport itself; it hands a verb, a URL and an option bag to whichever
//! dispatcher it was built with.

#[cfg(feature = "http")]
mod http;
#[cfg(feature = "mock")]
mod mock;

#[cfg(feature = "http")]
pub use self::http::HttpDispatcher;
#[cfg(feature = "mock")]
pub use self::mock::{Call, MockDispatcher};
use crate::error::Result;
use crate::{RequestOptions, Response};
use toucan_route::Verb;

/// Unified interface for request dispatchers.
///
/// One method per verb, each taking the compiled URL and the caller's
/// accumulated options. Errors are dispatcher-defined and are propagated
/// by callers without being reinterpreted.
///
/// # Examples
///
/// ```
/// use toucan_dispatch::{Dispatcher, RequestOptions, error::Result};
/// use toucan_route::Verb;
///
/// fn fetch_etl_config(dispatcher: &dyn Dispatcher, base: &str) -> Result<Vec<u8>> {
///     let url = format!("{base}/config/etl");
///     let response = dispatcher.dispatch(Verb::Get, &url, &RequestOptions::new())?;
///     Ok(response.error_for_status()?.into_content())
/// }
/// ```
pub trait Dispatcher: Send + Sync {
    /// Name of the dispatcher (used for logging only).
    fn name(&self) -> &str;

    fn get(&self, url: &str, options: &RequestOptions) -> Result<Response>;

    fn post(&self, url: &str, options: &RequestOptions) -> Result<Response>;

    fn put(&self, url: &str, options: &RequestOptions) -> Result<Response>;

    fn delete(&self, url: &str, options: &RequestOptions) -> Result<Response>;

    /// Look up the operation matching `verb` and call it.
    fn dispatch(&self, verb: Verb, url: &str, options: &RequestOptions) -> Result<Response> {
        tracing::debug!(dispatcher = self.name(), verb = %verb, url, "Dispatching request");
        match verb {
            Verb::Get => self.get(url, options),
            Verb::Post => self.post(url, options),
            Verb::Put => self.put(url, options),
            Verb::Delete => self.delete(url, options),
        }
    }
}
