//! Error taxonomy for decoding and traversing DocJSON documents.
//!
//! Every failure is returned to the caller as it happens. Nothing in this
//! crate retries; transport errors pass through [`Error::Transport`]
//! untouched so callers can downcast them to whatever their transport raised.

use thiserror::Error;

/// Boxed error produced by a [`Transport`](crate::Transport) implementation.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Crate-wide result alias.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors returned while decoding or traversing a document.
#[derive(Debug, Error)]
pub enum Error {
    /// A required key is absent or has the wrong shape.
    #[error("malformed document: {0}")]
    MalformedDocument(String),

    /// The response body is not valid JSON.
    #[error("invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// An `href` or `next` value could not be joined onto its base URL.
    #[error("cannot resolve {reference:?} against base URL: {source}")]
    InvalidUrl {
        reference: String,
        #[source]
        source: url::ParseError,
    },

    /// Form arguments did not match the form's fields.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A list was indexed with a negative index.
    #[error("negative indexing not supported (got {0})")]
    NegativeIndex(isize),

    /// The list ran out of pages before reaching the index.
    #[error("list index {0} out of range")]
    OutOfRange(usize),

    /// A list cursor led to a document that is not itself a list.
    #[error("expected a list when following {url}, found {found}")]
    MismatchedPageType { url: String, found: &'static str },

    /// A plain document has no attribute with this name.
    #[error("attribute {0:?} not found")]
    AttributeNotFound(String),

    /// Failure raised by the transport, passed through unchanged.
    #[error(transparent)]
    Transport(BoxError),
}

/// Form arguments rejected before any request is sent.
///
/// Unknown names are reported ahead of missing ones; each kind is its own
/// error value.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Unknown {}", describe(.0))]
    Unexpected(Vec<String>),

    #[error("Missing required {}", describe(.0))]
    Missing(Vec<String>),
}

impl ValidationError {
    /// The offending parameter names.
    pub fn names(&self) -> &[String] {
        match self {
            ValidationError::Unexpected(names) | ValidationError::Missing(names) => names,
        }
    }
}

// --- helpers -----------------------------------------------------------------

/// `parameter 'x'` or `parameters 'x', 'y'`.
fn describe(names: &[String]) -> String {
    let noun = if names.len() == 1 { "parameter" } else { "parameters" };
    let quoted: Vec<String> = names.iter().map(|n| format!("'{n}'")).collect();
    format!("{noun} {}", quoted.join(", "))
}

// --- tests -------------------------------------------------------------------
