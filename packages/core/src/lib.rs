//! Client-side decoder and traversal library for DocJSON hypermedia documents.
//!
//! DocJSON is plain JSON in which some objects carry a `_type` discriminator
//! marking them as a link to follow, a paginated list, or a form to invoke.
//! This crate decodes such documents into a typed [`Node`] tree and lets a
//! client navigate it: following links, indexing into lists (fetching pages
//! lazily), and invoking forms with validated arguments.
//!
//! The network is somebody else's problem. Everything that needs to fetch
//! takes a [`Transport`]; the `docjson-http` crate provides a blocking
//! `reqwest` implementation.
//!
//! # Crate layout
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`node`] | The decoded tree: [`Node`], [`Link`], [`Document`], [`FieldSpec`] |
//! | [`decode`] | JSON → [`Node`], with base-URL resolution |
//! | [`list`] | [`PaginatedList`] and its lazy page fetching |
//! | [`form`] | [`Form`] argument validation and invocation |
//! | [`render`] | Indented plain-text rendering |
//! | [`transport`] | The [`Transport`] seam and fetch-and-decode helpers |
//!
//! # Quick start
//!
//! ```rust,ignore
//! use docjson::{Node, Transport};
//!
//! let root = docjson::get(&transport, &"http://api.example.com/".parse()?)?;
//! let todos = root.as_document().unwrap().get("todos")?;
//!
//! // Index 40 may live three pages away; only those pages are fetched.
//! let item = todos.as_list().unwrap().get(&transport, 40)?;
//! println!("{item}");
//! ```

pub mod decode;
pub mod error;
pub mod form;
pub mod list;
pub mod node;
pub mod render;
pub mod transport;

#[cfg(test)]
mod testing;

pub use decode::{decode, decode_value, decode_with, resolve};
pub use error::{BoxError, Error, Result, ValidationError};
pub use form::Form;
pub use list::PaginatedList;
pub use node::{Document, FieldSpec, Link, Node, TYPE_KEY};
pub use render::render;
pub use transport::{get, load, request, Request, Response, Transport};
pub use url::Url;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
