//! Segment accumulation and route compilation.

use crate::Verb;
use crate::error::{ErrorKind, Result};
use exn::OptionExt;
use tracing::instrument;

/// Accumulates path segments and compiles them into a route.
///
/// Segments are appended one at a time; the last one doubles as the HTTP
/// verb. Compiling a route consumes the accumulated segments, so the same
/// builder can be reused for the next call straight away. The stage is a
/// property of the builder and applies to every route it compiles.
///
/// # Examples
///
/// ```
/// use toucan_route::{RouteBuilder, Verb};
///
/// let mut route = RouteBuilder::new("https://api.example.com/my-small-app/");
/// route.set_stage("staging");
/// route.append("config").append("etl").append("get");
/// let (verb, url) = route.take().unwrap();
/// assert_eq!(verb, Verb::Get);
/// assert_eq!(url, "https://api.example.com/my-small-app/config/etl?stage=staging");
/// // Segments were consumed; the stage was not.
/// assert_eq!(route.compile(), "https://api.example.com/my-small-app?stage=staging");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteBuilder {
    base: String,
    segments: Vec<String>,
    stage: String,
}

impl RouteBuilder {
    /// Create a builder for `base`, dropping a single trailing `/`.
    pub fn new(base: impl Into<String>) -> Self {
        let mut base = base.into();
        if base.ends_with('/') {
            base.pop();
        }
        Self { base, segments: Vec::new(), stage: String::new() }
    }

    /// The base route, without its trailing slash.
    pub fn base(&self) -> &str {
        &self.base
    }

    /// Segments accumulated since the last compile.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Append a segment. No validation is performed on its content.
    pub fn append(&mut self, segment: impl Into<String>) -> &mut Self {
        self.segments.push(segment.into());
        self
    }

    /// The last appended segment, which names the verb of the pending call.
    ///
    /// Does not consume anything. Fails with
    /// [`EmptySegments`](ErrorKind::EmptySegments) when nothing was appended,
    /// which is not the same as having appended an empty segment.
    pub fn verb(&self) -> Result<&str> {
        self.segments.last().map(String::as_str).ok_or_raise(|| ErrorKind::EmptySegments)
    }

    pub fn stage(&self) -> Option<&str> {
        match self.stage.is_empty() {
            true => None,
            false => Some(self.stage.as_str()),
        }
    }

    /// Set the stage appended as `?stage=<value>` to every compiled route.
    /// An empty value disables the query parameter.
    pub fn set_stage(&mut self, stage: impl Into<String>) -> &mut Self {
        self.stage = stage.into();
        self
    }

    pub fn clear_stage(&mut self) -> &mut Self {
        self.stage.clear();
        self
    }

    /// Compile the accumulated segments, minus the verb, into a route and
    /// clear them.
    ///
    /// With nothing accumulated the route is the bare base (plus the stage
    /// query), so compiling twice in a row is harmless.
    #[instrument(level = "debug", skip(self), fields(base = %self.base, segments = self.segments.len()))]
    pub fn compile(&mut self) -> String {
        let segments = std::mem::take(&mut self.segments);
        let path = match segments.split_last() {
            Some((_verb, path)) => path,
            None => &[],
        };
        let mut route = self.base.clone();
        for segment in path {
            route.push('/');
            route.push_str(segment);
        }
        if !self.stage.is_empty() {
            route.push_str("?stage=");
            route.push_str(&self.stage);
        }
        tracing::debug!(route = %route, "Route compiled");
        route
    }

    /// Read the verb, then compile the route.
    ///
    /// The verb is captured before the compile clears the segments. When
    /// the verb is missing nothing is consumed; when it is unknown the
    /// segments are still consumed so the next call starts clean.
    pub fn take(&mut self) -> Result<(Verb, String)> {
        let verb = self.verb()?.to_string();
        let route = self.compile();
        Ok((verb.parse()?, route))
    }

    /// Build a fixed route relative to the base, with extra query options.
    ///
    /// The stage (when set) comes first, followed by `options` in order;
    /// empty options are skipped. Accumulated segments are left untouched.
    ///
    /// ```
    /// use toucan_route::RouteBuilder;
    ///
    /// let mut route = RouteBuilder::new("https://api.example.com/app");
    /// assert_eq!(route.relative("config/etl", &["format=cson"]), "https://api.example.com/app/config/etl?format=cson");
    /// route.set_stage("staging");
    /// assert_eq!(route.relative("data/sources", &[]), "https://api.example.com/app/data/sources?stage=staging");
    /// ```
    pub fn relative(&self, path: &str, options: &[&str]) -> String {
        let stage = (!self.stage.is_empty()).then(|| format!("stage={}", self.stage));
        let query = stage
            .iter()
            .map(String::as_str)
            .chain(options.iter().copied())
            .filter(|option| !option.is_empty())
            .collect::<Vec<_>>()
            .join("&");
        match query.is_empty() {
            true => format!("{}/{}", self.base, path),
            false => format!("{}/{}?{}", self.base, path, query),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    const BASE_ROUTE: &str = "fake.route/my-small-app";

    #[fixture]
    fn route() -> RouteBuilder {
        RouteBuilder::new(BASE_ROUTE)
    }

    #[rstest]
    fn test_simple_get(mut route: RouteBuilder) {
        route.append("config").append("etl").append("get");
        assert_eq!(route.verb().unwrap(), "get");
        assert_eq!(route.compile(), "fake.route/my-small-app/config/etl");
    }

    #[rstest]
    #[case("fake.route/my-small-app")]
    #[case("fake.route/my-small-app/")]
    fn test_trailing_slash_is_stripped(#[case] base: &str) {
        let mut route = RouteBuilder::new(base);
        assert_eq!(route.base(), BASE_ROUTE);
        route.append("config").append("etl").append("get");
        assert_eq!(route.compile(), "fake.route/my-small-app/config/etl");
    }

    #[test]
    fn test_only_one_trailing_slash_is_stripped() {
        assert_eq!(RouteBuilder::new("a//").base(), "a/");
    }

    #[rstest]
    fn test_simple_get_with_stage(mut route: RouteBuilder) {
        route.set_stage("staging");
        route.append("config").append("etl").append("get");
        assert_eq!(route.verb().unwrap(), "get");
        assert_eq!(route.compile(), "fake.route/my-small-app/config/etl?stage=staging");
    }

    #[rstest]
    fn test_verb_does_not_consume(mut route: RouteBuilder) {
        route.append("config").append("put");
        assert_eq!(route.verb().unwrap(), "put");
        assert_eq!(route.verb().unwrap(), "put");
        assert_eq!(route.segments(), ["config", "put"]);
    }

    #[rstest]
    fn test_verb_without_segments(route: RouteBuilder) {
        let err = route.verb().unwrap_err();
        assert_eq!(*err, ErrorKind::EmptySegments);
    }

    #[rstest]
    fn test_empty_segment_is_not_missing(mut route: RouteBuilder) {
        route.append("");
        assert_eq!(route.verb().unwrap(), "");
    }

    #[rstest]
    fn test_compile_resets(mut route: RouteBuilder) {
        route.set_stage("staging");
        route.append("config").append("etl").append("get");
        assert_eq!(route.compile(), "fake.route/my-small-app/config/etl?stage=staging");
        assert!(route.segments().is_empty());
        // Compiling again without new segments is not an error.
        assert_eq!(route.compile(), "fake.route/my-small-app?stage=staging");
        assert_eq!(route.compile(), "fake.route/my-small-app?stage=staging");
    }

    #[rstest]
    fn test_compile_without_segments(mut route: RouteBuilder) {
        assert_eq!(route.compile(), BASE_ROUTE);
    }

    #[rstest]
    fn test_stage_persists_across_routes(mut route: RouteBuilder) {
        route.set_stage("staging");
        route.append("config").append("get");
        assert_eq!(route.compile(), "fake.route/my-small-app/config?stage=staging");
        route.append("data").append("sources").append("post");
        assert_eq!(route.compile(), "fake.route/my-small-app/data/sources?stage=staging");
        assert_eq!(route.stage(), Some("staging"));
        route.clear_stage();
        assert_eq!(route.stage(), None);
        route.append("data").append("get");
        assert_eq!(route.compile(), "fake.route/my-small-app/data");
    }

    #[rstest]
    #[case(&["get"], "fake.route/my-small-app")]
    #[case(&["sdk", "get"], "fake.route/my-small-app/sdk")]
    #[case(&["config", "etl", "put"], "fake.route/my-small-app/config/etl")]
    #[case(&["a", "b", "c", "d", "delete"], "fake.route/my-small-app/a/b/c/d")]
    fn test_route_excludes_last_segment(mut route: RouteBuilder, #[case] segments: &[&str], #[case] expected: &str) {
        for segment in segments {
            route.append(*segment);
        }
        let verb = route.verb().unwrap().to_string();
        assert_eq!(route.compile(), expected);
        assert_eq!(Some(verb.as_str()), segments.last().copied());
    }

    #[rstest]
    fn test_take(mut route: RouteBuilder) {
        route.append("config").append("etl").append("delete");
        let (verb, url) = route.take().unwrap();
        assert_eq!(verb, Verb::Delete);
        assert_eq!(url, "fake.route/my-small-app/config/etl");
        assert!(route.segments().is_empty());
    }

    #[rstest]
    fn test_take_without_segments(mut route: RouteBuilder) {
        assert_eq!(*route.take().unwrap_err(), ErrorKind::EmptySegments);
    }

    #[rstest]
    fn test_take_unknown_verb_still_resets(mut route: RouteBuilder) {
        route.append("config").append("etl");
        assert_eq!(*route.take().unwrap_err(), ErrorKind::UnknownVerb("etl".to_string()));
        assert!(route.segments().is_empty());
    }

    #[rstest]
    fn test_relative(mut route: RouteBuilder) {
        assert_eq!(route.relative("bla", &[]), "fake.route/my-small-app/bla");
        route.set_stage("staging");
        assert_eq!(
            route.relative("bla", &["format=json", "", "python=love"]),
            "fake.route/my-small-app/bla?stage=staging&format=json&python=love"
        );
    }

    #[rstest]
    fn test_relative_leaves_segments(mut route: RouteBuilder) {
        route.append("config");
        let _ = route.relative("data/sources", &[]);
        assert_eq!(route.segments(), ["config"]);
    }
}
