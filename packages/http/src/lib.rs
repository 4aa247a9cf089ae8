//! Blocking HTTP transport for [`docjson`].
//!
//! [`HttpTransport`] wraps a [`reqwest::blocking::Client`]. It follows
//! redirects and reports the final URL so relative references in the
//! response resolve against where the document actually came from. It does
//! not retry, authenticate, or cache.

mod config;

pub use config::HttpConfig;

use docjson::{BoxError, Request, Response, Transport};
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::Method;

/// Errors raised by [`HttpTransport`]. They reach callers boxed inside
/// [`docjson::Error::Transport`].
#[derive(Debug, thiserror::Error)]
pub enum HttpError {
    /// The request could not be sent or the body could not be read.
    #[error("HTTP error: {0}")]
    Request(#[from] reqwest::Error),

    /// The server answered with a non-2xx status.
    #[error("{url} returned status {status}")]
    Status { status: u16, url: String },

    /// The document asked for a method that is not a valid HTTP token.
    #[error("invalid HTTP method {0:?}")]
    InvalidMethod(String),

    /// A configured header value is not valid.
    #[error("invalid header value for {0}")]
    InvalidHeader(String),
}

/// A [`Transport`] backed by a blocking `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Build a transport from `config`.
    ///
    /// Must not be called from inside an async runtime; the blocking client
    /// spins up its own.
    pub fn new(config: HttpConfig) -> Result<Self, HttpError> {
        let mut headers = HeaderMap::new();
        let accept = HeaderValue::from_str(&config.accept)
            .map_err(|_| HttpError::InvalidHeader("accept".into()))?;
        headers.insert(ACCEPT, accept);

        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .default_headers(headers)
            .build()?;
        Ok(Self { client })
    }

    /// Use an already configured client.
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    fn execute(&self, request: Request) -> Result<Response, HttpError> {
        let method = parse_method(&request.method)?;
        let mut builder = self.client.request(method, request.url.as_str());
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send()?;
        let status = response.status();
        let url = response.url().clone();
        if !status.is_success() {
            tracing::debug!(%url, status = status.as_u16(), "request failed");
            return Err(HttpError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        let content = response.bytes()?.to_vec();
        Ok(Response { url, content })
    }
}

impl Transport for HttpTransport {
    fn send(&self, request: Request) -> Result<Response, BoxError> {
        self.execute(request).map_err(BoxError::from)
    }
}

fn parse_method(method: &str) -> Result<Method, HttpError> {
    Method::from_bytes(method.to_ascii_uppercase().as_bytes())
        .map_err(|_| HttpError::InvalidMethod(method.to_string()))
}
