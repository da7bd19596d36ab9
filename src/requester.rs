use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::path::PathBuf;

use exn::ResultExt;
use serde_json::Value;
use toucan_cache::{ExtractionCache, Tables};
use toucan_dispatch::{DispatcherHandle, RequestOptions, Response};
use toucan_route::{RouteBuilder, Verb};
use tracing::instrument;

use crate::error::{ErrorKind, Result};

/// Fluent requester for one small app.
///
/// Segments are appended one call at a time and the last one names the
/// verb. Invoking compiles the route, clears the segments, and dispatches
/// with the requester's option bag:
///
/// ```
/// use std::sync::Arc;
/// use toucan_client::SmallAppRequester;
/// use toucan_dispatch::HttpDispatcher;
///
/// let mut requester = SmallAppRequester::new("https://api.example.com/my-app", Arc::new(HttpDispatcher::new()));
/// requester.set_stage("staging");
/// requester.config().etl();
/// assert_eq!(requester.route().segments(), ["config", "etl"]);
/// ```
pub struct SmallAppRequester {
    route: RouteBuilder,
    options: RequestOptions,
    cache: ExtractionCache,
    dispatcher: DispatcherHandle,
}

impl Debug for SmallAppRequester {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("SmallAppRequester")
            .field("route", &self.route)
            .field("options", &self.options)
            .field("cache", &self.cache)
            .field("dispatcher", &self.dispatcher.name())
            .finish()
    }
}

impl SmallAppRequester {
    /// Creates a requester rooted at `base`, caching extractions under the
    /// default directory.
    pub fn new(base: impl Into<String>, dispatcher: DispatcherHandle) -> Self {
        Self {
            route: RouteBuilder::new(base),
            options: RequestOptions::default(),
            cache: ExtractionCache::default(),
            dispatcher,
        }
    }

    pub fn with_cache_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.cache = ExtractionCache::new(path);
        self
    }

    pub fn with_options(mut self, options: RequestOptions) -> Self {
        self.options = options;
        self
    }

    pub fn base(&self) -> &str {
        self.route.base()
    }

    pub fn route(&self) -> &RouteBuilder {
        &self.route
    }

    pub fn dispatcher(&self) -> &DispatcherHandle {
        &self.dispatcher
    }

    pub fn segment(&mut self, name: impl Into<String>) -> &mut Self {
        self.route.append(name);
        self
    }

    /// Appends every non-empty `/`-separated component of `path`.
    pub fn path(&mut self, path: &str) -> &mut Self {
        for segment in path.split('/').filter(|segment| !segment.is_empty()) {
            self.route.append(segment);
        }
        self
    }

    /// Dispatches the accumulated route. The last segment is the verb.
    ///
    /// The response is returned whatever its status. The option bag is kept
    /// for the next call.
    #[instrument(level = "debug", skip(self), fields(base = %self.route.base()))]
    pub fn call(&mut self) -> Result<Response> {
        let (verb, url) = self.route.take().or_raise(|| ErrorKind::Route)?;
        self.dispatcher.dispatch(verb, &url, &self.options).or_raise(|| ErrorKind::Dispatch)
    }

    fn call_with(&mut self, verb: Verb) -> Result<Response> {
        self.route.append(verb.as_str());
        self.call()
    }

    pub fn get(&mut self) -> Result<Response> {
        self.call_with(Verb::Get)
    }

    pub fn post(&mut self) -> Result<Response> {
        self.call_with(Verb::Post)
    }

    pub fn put(&mut self) -> Result<Response> {
        self.call_with(Verb::Put)
    }

    pub fn delete(&mut self) -> Result<Response> {
        self.call_with(Verb::Delete)
    }

    pub fn stage(&self) -> Option<&str> {
        self.route.stage()
    }

    /// Sets the stage sent with every following request.
    pub fn set_stage(&mut self, stage: impl Into<String>) -> &mut Self {
        self.route.set_stage(stage);
        self
    }

    pub fn clear_stage(&mut self) -> &mut Self {
        self.route.clear_stage();
        self
    }

    pub fn options(&self) -> &RequestOptions {
        &self.options
    }

    pub fn options_mut(&mut self) -> &mut RequestOptions {
        &mut self.options
    }

    /// Stores a free-form keyword option in the bag.
    pub fn set_option(&mut self, key: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.options.set(key, value);
        self
    }

    /// Builds `<base>/<path>` with the stage and `options` as query, without
    /// touching the accumulated segments.
    pub fn relative(&self, path: &str, options: &[&str]) -> String {
        self.route.relative(path, options)
    }

    pub fn cache(&self) -> &ExtractionCache {
        &self.cache
    }

    /// All tables of the small app, from memory, the cache directory, or a
    /// single `GET <base>/sdk` when the directory does not exist yet.
    pub fn dfs(&mut self) -> Result<&Tables> {
        let url = self.route.relative("sdk", &[]);
        let dispatcher = &self.dispatcher;
        let options = &self.options;
        self.cache
            .load(|| Ok(dispatcher.get(&url, options)?.error_for_status()?.into_content()))
            .or_raise(|| ErrorKind::Cache)
    }

    /// Persists an already downloaded extraction archive and loads it.
    pub fn cache_dfs(&mut self, archive: &[u8]) -> Result<&Tables> {
        self.cache.populate(archive).or_raise(|| ErrorKind::Cache)
    }

    /// Forgets the loaded tables; the next [`dfs`](Self::dfs) rereads the
    /// cache directory.
    pub fn invalidate_cache(&mut self) {
        self.cache.invalidate();
    }

    /// Forgets the loaded tables and deletes the cache directory.
    pub fn purge_cache(&mut self) -> Result<()> {
        self.cache.purge().or_raise(|| ErrorKind::Cache)
    }
}

/// Generates one appending method per resource the back end exposes.
macro_rules! resources {
    ($($name:ident),* $(,)?) => {
        impl SmallAppRequester {
            $(
                #[doc = concat!("Appends the `", stringify!($name), "` segment.")]
                pub fn $name(&mut self) -> &mut Self {
                    self.segment(stringify!($name))
                }
            )*
        }
    };
}

resources!(
    augment,
    config,
    data,
    etl,
    notifications_handlers,
    permissions,
    preprocess_validation,
    sdk,
    sources,
    templates,
);

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};
    use std::sync::Arc;
    use toucan_dispatch::MockDispatcher;

    const BASE_ROUTE: &str = "fake.route/my-small-app";

    #[fixture]
    fn mock() -> Arc<MockDispatcher> {
        Arc::new(MockDispatcher::default())
    }

    fn requester(mock: &Arc<MockDispatcher>) -> SmallAppRequester {
        SmallAppRequester::new(BASE_ROUTE, mock.clone())
    }

    #[rstest]
    fn test_typed_segments(mock: Arc<MockDispatcher>) {
        let mut requester = requester(&mock);
        requester.config().etl().get().unwrap();
        let call = mock.last_call().unwrap();
        assert_eq!(call.verb, Verb::Get);
        assert_eq!(call.url, "fake.route/my-small-app/config/etl");
    }

    #[rstest]
    fn test_path_skips_empty_components(mock: Arc<MockDispatcher>) {
        let mut requester = requester(&mock);
        requester.path("/data//sources/").segment("put").call().unwrap();
        let call = mock.last_call().unwrap();
        assert_eq!(call.verb, Verb::Put);
        assert_eq!(call.url, "fake.route/my-small-app/data/sources");
    }

    #[rstest]
    fn test_call_without_verb(mock: Arc<MockDispatcher>) {
        let err = requester(&mock).call().unwrap_err();
        assert_eq!(*err, ErrorKind::Route);
        assert!(mock.calls().is_empty());
    }

    #[rstest]
    fn test_unknown_verb_consumes_segments(mock: Arc<MockDispatcher>) {
        let mut requester = requester(&mock);
        let err = requester.config().segment("patch").call().unwrap_err();
        assert_eq!(*err, ErrorKind::Route);
        assert!(requester.route().segments().is_empty());
        assert!(mock.calls().is_empty());
    }

    #[rstest]
    fn test_set_option_is_kept_across_calls(mock: Arc<MockDispatcher>) {
        let mut requester = requester(&mock);
        requester.set_option("timeout", 5);
        requester.config().get().unwrap();
        requester.etl().get().unwrap();
        for call in mock.calls() {
            assert_eq!(call.options.extra.get("timeout"), Some(&Value::from(5)));
        }
        assert_eq!(mock.call_count(Verb::Get), 2);
    }

    #[rstest]
    fn test_debug_shows_dispatcher_name(mock: Arc<MockDispatcher>) {
        let requester = requester(&mock);
        assert!(format!("{requester:?}").contains("dispatcher: \"mock\""));
    }
}
