//! In-memory transport for unit tests: canned responses keyed by path and query.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use super::{build_url, Response, Transport};
use crate::error::ApiError;

const BASE: &str = "http://fake.test";

type Canned = Result<String, u32>;

/// Each route answers with its queued responses in order; the last one repeats.
#[derive(Default)]
pub(crate) struct FakeTransport {
    routes: Mutex<HashMap<String, VecDeque<Canned>>>,
    calls: Mutex<Vec<String>>,
    puts: Mutex<Vec<serde_json::Value>>,
}

impl FakeTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Serve `body` for `GET path?query` (or for `PUT path`).
    pub(crate) fn route(self, path: &str, query: &[(&str, String)], body: impl Into<String>) -> Self {
        self.push(url_for(path, query), Ok(body.into()))
    }

    /// Answer `path?query` with an HTTP error status.
    pub(crate) fn fail(self, path: &str, query: &[(&str, String)], status: u32) -> Self {
        self.push(url_for(path, query), Err(status))
    }

    fn push(self, url: String, canned: Canned) -> Self {
        self.routes
            .lock()
            .unwrap()
            .entry(url)
            .or_default()
            .push_back(canned);
        self
    }

    /// URLs requested so far, in call order.
    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn put_bodies(&self) -> Vec<serde_json::Value> {
        self.puts.lock().unwrap().clone()
    }

    fn respond(&self, url: String) -> Result<Response, ApiError> {
        self.calls.lock().unwrap().push(url.clone());
        let canned = {
            let mut routes = self.routes.lock().unwrap();
            match routes.get_mut(&url) {
                Some(queue) if queue.len() > 1 => queue.pop_front(),
                Some(queue) => queue.front().cloned(),
                None => None,
            }
        };
        match canned {
            Some(Ok(body)) => Ok(Response {
                url,
                body: body.into_bytes(),
            }),
            Some(Err(status)) => Err(ApiError::Http { url, status }),
            None => Err(ApiError::Http { url, status: 404 }),
        }
    }
}

pub(crate) fn url_for(path: &str, query: &[(&str, String)]) -> String {
    build_url(BASE, path, query).unwrap()
}

impl Transport for FakeTransport {
    fn get(&self, path: &str, query: &[(&str, String)]) -> Result<Response, ApiError> {
        self.respond(url_for(path, query))
    }

    fn put_json(&self, path: &str, body: &serde_json::Value) -> Result<Response, ApiError> {
        self.puts.lock().unwrap().push(body.clone());
        self.respond(url_for(path, &[]))
    }
}
