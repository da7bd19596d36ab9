//! Request dispatchers for small-app back ends.
//!
//! The requester never talks to the network itself. It compiles a verb and
//! a URL, then hands them to a [`Dispatcher`] together with its
//! [`RequestOptions`]:
//!
//! - [`HttpDispatcher`] sends real requests with a blocking `reqwest` client
//!   (feature `http`),
//! - [`MockDispatcher`] records calls and replays canned responses (feature
//!   `mock`, meant for dev-dependencies).

pub mod backend;
pub mod error;
mod options;
mod response;

pub use crate::backend::Dispatcher;
#[cfg(feature = "http")]
pub use crate::backend::HttpDispatcher;
#[cfg(feature = "mock")]
pub use crate::backend::{Call, MockDispatcher};
pub use crate::options::{Auth, FilePart, RequestOptions};
pub use crate::response::Response;
use std::sync::Arc;

pub type DispatcherHandle = Arc<dyn Dispatcher>;
