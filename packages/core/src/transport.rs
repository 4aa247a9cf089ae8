//! The seam between the document model and whatever moves bytes over the wire.
//!
//! The core never talks to the network itself. Links, lists, and forms hand a
//! [`Request`] to a [`Transport`] and decode the [`Response`] it returns,
//! using the response's effective URL as the base for relative references.

use url::Url;

use crate::decode::decode;
use crate::error::{BoxError, Error, Result};
use crate::node::Node;

/// A single outbound request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    /// HTTP method, upper-case (e.g. `"GET"`, `"POST"`).
    pub method: String,
    pub url: Url,
    /// Query parameters, in order. Repeated keys are allowed.
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    pub body: Option<Vec<u8>>,
}

impl Request {
    /// A request with no query, headers, or body.
    pub fn new(method: impl Into<String>, url: Url) -> Self {
        Self {
            method: method.into(),
            url,
            query: Vec::new(),
            headers: Vec::new(),
            body: None,
        }
    }

    /// A plain `GET` of `url`.
    pub fn get(url: Url) -> Self {
        Self::new("GET", url)
    }

    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// What a transport hands back: the URL the content was finally served from
/// (after redirects) and the raw body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub url: Url,
    pub content: Vec<u8>,
}

/// Something that can perform a blocking request.
///
/// Implementations own every transport concern: TLS, redirects, timeouts,
/// status handling. Whatever error they return reaches the caller of
/// [`Link::invoke`](crate::Link::invoke) and friends unchanged, wrapped only
/// in [`Error::Transport`].
pub trait Transport {
    fn send(&self, request: Request) -> std::result::Result<Response, BoxError>;

    /// `GET url` with no extras.
    fn get(&self, url: &Url) -> std::result::Result<Response, BoxError> {
        self.send(Request::get(url.clone()))
    }
}

impl<T: Transport + ?Sized> Transport for &T {
    fn send(&self, request: Request) -> std::result::Result<Response, BoxError> {
        (**self).send(request)
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn send(&self, request: Request) -> std::result::Result<Response, BoxError> {
        (**self).send(request)
    }
}

/// Send `request` and decode the response body as a document.
pub fn load<T: Transport + ?Sized>(transport: &T, request: Request) -> Result<Node> {
    let method = request.method.clone();
    let target = request.url.clone();
    let response = transport.send(request).map_err(Error::Transport)?;
    decode_response(&method, &target, response)
}

/// Fetch and decode the document at `url`.
pub fn get<T: Transport + ?Sized>(transport: &T, url: &Url) -> Result<Node> {
    let response = transport.get(url).map_err(Error::Transport)?;
    decode_response("GET", url, response)
}

/// Decode a response body against its effective URL. A list fetched with
/// `GET` remembers where it came from as an already fetched page.
fn decode_response(method: &str, target: &Url, response: Response) -> Result<Node> {
    tracing::debug!(
        %method,
        url = %target,
        effective_url = %response.url,
        bytes = response.content.len(),
        "fetched document"
    );
    let node = decode(&response.content, &response.url)?;
    if let (Node::List(list), "GET") = (&node, method) {
        list.mark_fetched(target.clone());
        list.mark_fetched(response.url);
    }
    Ok(node)
}

/// Send an arbitrary request and decode the response.
pub fn request<T: Transport + ?Sized>(
    transport: &T,
    method: &str,
    url: &Url,
    query: &[(&str, &str)],
    body: Option<Vec<u8>>,
    headers: &[(&str, &str)],
) -> Result<Node> {
    let mut req = Request::new(method.to_ascii_uppercase(), url.clone());
    for (k, v) in query {
        req = req.with_query(*k, *v);
    }
    for (k, v) in headers {
        req = req.with_header(*k, *v);
    }
    req.body = body;
    load(transport, req)
}

// --- tests -------------------------------------------------------------------
