//! In-memory dispatcher for testing.

use crate::error::{ErrorKind, Result};
use crate::{Dispatcher, RequestOptions, Response};
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};
use toucan_route::Verb;

/// A request recorded by [`MockDispatcher`].
#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub verb: Verb,
    pub url: String,
    pub options: RequestOptions,
}

#[derive(Default)]
struct State {
    calls: Vec<Call>,
    queued: VecDeque<Response>,
    failing: bool,
}

/// In-memory dispatcher for testing.
///
/// Records every call and answers with queued responses in order, falling
/// back to a fixed response once the queue is empty. State sits behind a
/// [`Mutex`], so all trait methods operate on `&self` and the dispatcher can
/// be shared through an [`Arc`](std::sync::Arc) with the code under test.
///
/// # Examples
///
/// ```
/// use toucan_dispatch::{Dispatcher, MockDispatcher, RequestOptions, Response};
/// use toucan_route::Verb;
///
/// let dispatcher = MockDispatcher::default().with_response(Response::ok("zip bytes"));
/// let response = dispatcher.get("fake.route/app/sdk", &RequestOptions::new()).unwrap();
/// assert_eq!(response.content, b"zip bytes");
/// assert_eq!(dispatcher.call_count(Verb::Get), 1);
/// assert_eq!(dispatcher.last_call().unwrap().url, "fake.route/app/sdk");
/// ```
pub struct MockDispatcher {
    name: String,
    fallback: Response,
    state: Mutex<State>,
}

impl MockDispatcher {
    /// Answer every call with `fallback` unless a queued response is pending.
    pub fn new(fallback: Response) -> Self {
        Self {
            name: "mock".to_string(),
            fallback,
            state: Mutex::new(State::default()),
        }
    }

    /// Change the name of the mock dispatcher.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Queue a response for the next call.
    pub fn with_response(self, response: Response) -> Self {
        self.push_response(response);
        self
    }

    pub fn push_response(&self, response: Response) {
        self.state().queued.push_back(response);
    }

    /// Make every subsequent call fail with a transport error, as an
    /// unreachable back end would.
    pub fn set_failing(&self, failing: bool) {
        self.state().failing = failing;
    }

    /// Every call recorded so far, oldest first.
    pub fn calls(&self) -> Vec<Call> {
        self.state().calls.clone()
    }

    pub fn last_call(&self) -> Option<Call> {
        self.state().calls.last().cloned()
    }

    pub fn call_count(&self, verb: Verb) -> usize {
        self.state().calls.iter().filter(|call| call.verb == verb).count()
    }

    /// Forget recorded calls. Queued responses are kept.
    pub fn reset_calls(&self) {
        self.state().calls.clear();
    }

    fn state(&self) -> MutexGuard<'_, State> {
        // A panicking test thread must not hide the calls from the others.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn record(&self, verb: Verb, url: &str, options: &RequestOptions) -> Result<Response> {
        let mut state = self.state();
        state.calls.push(Call {
            verb,
            url: url.to_string(),
            options: options.clone(),
        });
        if state.failing {
            exn::bail!(ErrorKind::Transport);
        }
        Ok(state.queued.pop_front().unwrap_or_else(|| self.fallback.clone()))
    }
}

impl Default for MockDispatcher {
    fn default() -> Self {
        Self::new(Response::ok(Vec::new()))
    }
}

impl Dispatcher for MockDispatcher {
    fn name(&self) -> &str {
        &self.name
    }

    fn get(&self, url: &str, options: &RequestOptions) -> Result<Response> {
        self.record(Verb::Get, url, options)
    }

    fn post(&self, url: &str, options: &RequestOptions) -> Result<Response> {
        self.record(Verb::Post, url, options)
    }

    fn put(&self, url: &str, options: &RequestOptions) -> Result<Response> {
        self.record(Verb::Put, url, options)
    }

    fn delete(&self, url: &str, options: &RequestOptions) -> Result<Response> {
        self.record(Verb::Delete, url, options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queued_then_fallback() {
        let dispatcher = MockDispatcher::new(Response::new(204, Vec::new()))
            .with_response(Response::ok("first"))
            .with_response(Response::ok("second"));
        let options = RequestOptions::new();
        assert_eq!(dispatcher.get("a", &options).unwrap().content, b"first");
        assert_eq!(dispatcher.post("b", &options).unwrap().content, b"second");
        assert_eq!(dispatcher.put("c", &options).unwrap().status, 204);
        assert_eq!(dispatcher.calls().len(), 3);
    }

    #[test]
    fn test_dispatch_routes_by_verb() {
        let dispatcher = MockDispatcher::default();
        let options = RequestOptions::new();
        for verb in Verb::ALL {
            dispatcher.dispatch(verb, "fake.route", &options).unwrap();
        }
        let verbs: Vec<Verb> = dispatcher.calls().into_iter().map(|call| call.verb).collect();
        assert_eq!(verbs, Verb::ALL);
    }

    #[test]
    fn test_failing_records_call() {
        let dispatcher = MockDispatcher::default();
        dispatcher.set_failing(true);
        let err = dispatcher.delete("fake.route", &RequestOptions::new()).unwrap_err();
        assert_eq!(*err, ErrorKind::Transport);
        assert_eq!(dispatcher.call_count(Verb::Delete), 1);
        dispatcher.set_failing(false);
        dispatcher.reset_calls();
        assert!(dispatcher.get("fake.route", &RequestOptions::new()).is_ok());
        assert_eq!(dispatcher.calls().len(), 1);
    }
}
