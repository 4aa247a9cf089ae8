//! In-memory transport for unit tests.

use std::cell::RefCell;
use std::collections::HashMap;

use serde_json::Value;
use url::Url;

use crate::error::BoxError;
use crate::transport::{Request, Response, Transport};

pub(crate) fn url(s: &str) -> Url {
    Url::parse(s).expect("test URL")
}

/// Serves canned JSON bodies keyed by request URL and records every request.
#[derive(Default)]
pub(crate) struct FakeTransport {
    routes: HashMap<String, (Url, Vec<u8>)>,
    log: RefCell<Vec<Request>>,
}

impl FakeTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn serve(self, at: &str, body: Value) -> Self {
        self.redirect(at, at, body)
    }

    /// Serve `body` for `at`, reporting `effective` as the final URL.
    pub(crate) fn redirect(mut self, at: &str, effective: &str, body: Value) -> Self {
        let bytes = serde_json::to_vec(&body).expect("serialise fixture");
        self.routes.insert(url(at).to_string(), (url(effective), bytes));
        self
    }

    pub(crate) fn serve_raw(mut self, at: &str, body: &[u8]) -> Self {
        self.routes
            .insert(url(at).to_string(), (url(at), body.to_vec()));
        self
    }

    pub(crate) fn requests(&self) -> Vec<Request> {
        self.log.borrow().clone()
    }

    pub(crate) fn count(&self) -> usize {
        self.log.borrow().len()
    }
}

impl Transport for FakeTransport {
    fn send(&self, request: Request) -> Result<Response, BoxError> {
        let key = request.url.to_string();
        self.log.borrow_mut().push(request);
        match self.routes.get(&key) {
            Some((effective, content)) => Ok(Response {
                url: effective.clone(),
                content: content.clone(),
            }),
            None => Err(format!("no route for {key}").into()),
        }
    }
}
