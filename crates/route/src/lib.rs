//! Fluent route building for small-app back ends.
//!
//! A [`RouteBuilder`] records path segments as they are referenced and turns
//! them into an HTTP [`Verb`] plus a URL:
//!
//! - every segment but the last becomes a path component under the base,
//! - the last segment is the verb,
//! - a configured stage is appended as `?stage=<value>`,
//! - compiling consumes the segments, so one builder serves many calls.

mod builder;
pub mod error;
mod verb;

pub use crate::builder::RouteBuilder;
pub use crate::verb::Verb;
