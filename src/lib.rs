//! Client for Toucan Toco small-app back ends.
//!
//! A project hosts several small apps ("instances"), each exposing REST
//! resources under `<project>/<instance>/...`. [`ToucanClient`] keeps one
//! [`SmallAppRequester`] per instance; a requester builds routes fluently and
//! hands them to a dispatcher:
//!
//! ```no_run
//! use toucan_client::ToucanClient;
//!
//! # fn main() -> toucan_client::error::Result<()> {
//! let mut client = ToucanClient::builder("https://api.example.com/my-project")
//!     .instance("demo")
//!     .token("s3cr3t")
//!     .stage("staging")
//!     .build();
//! let demo = client.instance("demo")?;
//! // GET https://api.example.com/my-project/demo/config/etl?stage=staging
//! let etl = demo.config().etl().get()?;
//! // Every table of the app, downloaded once and cached on disk.
//! let tables = demo.dfs()?;
//! # Ok(())
//! # }
//! ```
//!
//! The crates underneath can be used on their own: `toucan-route` for the
//! route builder, `toucan-dispatch` for transports, `toucan-cache` for the
//! extraction cache and `toucan-config` for layered configuration.

mod client;
pub mod error;
mod requester;
pub mod upload;

pub use crate::client::{ToucanClient, ToucanClientBuilder};
pub use crate::requester::SmallAppRequester;
pub use toucan_cache::{Table, Tables};
pub use toucan_config::Config;
pub use toucan_dispatch::{Auth, RequestOptions, Response};
