//! The decoded document tree.
//!
//! A [`Node`] is one of the DocJSON variants (link, list, form, plain
//! document) or a JSON array/scalar passed through as-is. Dispatch on the
//! `_type` discriminator happens once, in [`decode`](crate::decode); after
//! that every consumer matches on the closed enum.

use indexmap::IndexMap;
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use serde_json::Number;
use url::Url;

use crate::error::{Error, Result};
use crate::form::Form;
use crate::list::PaginatedList;
use crate::transport::{self, Transport};

/// The discriminator key on the wire.
pub const TYPE_KEY: &str = "_type";

/// Any decoded unit of a document.
///
/// Cloning is cheap for lists: clones share pagination state, so pages
/// fetched through one handle are visible through every other.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    /// A JSON array that is not wrapped in a `list` object. Never paginates.
    Array(Vec<Node>),
    Document(Document),
    Link(Link),
    List(PaginatedList),
    Form(Form),
}

impl Node {
    /// Short lowercase name of the variant, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Node::Null => "null",
            Node::Bool(_) => "bool",
            Node::Number(_) => "number",
            Node::String(_) => "string",
            Node::Array(_) => "array",
            Node::Document(_) => "document",
            Node::Link(_) => "link",
            Node::List(_) => "list",
            Node::Form(_) => "form",
        }
    }

    pub fn as_document(&self) -> Option<&Document> {
        match self {
            Node::Document(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_link(&self) -> Option<&Link> {
        match self {
            Node::Link(l) => Some(l),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&PaginatedList> {
        match self {
            Node::List(l) => Some(l),
            _ => None,
        }
    }

    pub fn as_form(&self) -> Option<&Form> {
        match self {
            Node::Form(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Node]> {
        match self {
            Node::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Node::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Node::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<&Number> {
        match self {
            Node::Number(n) => Some(n),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Node::Null)
    }
}

impl From<&str> for Node {
    fn from(s: &str) -> Self {
        Node::String(s.to_string())
    }
}

impl From<String> for Node {
    fn from(s: String) -> Self {
        Node::String(s)
    }
}

/// Renders the node as an indented tree. See [`render`](crate::render).
impl std::fmt::Display for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&crate::render::render(self))
    }
}

/// Serialises back to the DocJSON wire format.
///
/// Lists are written with the items fetched so far and their current cursor,
/// so a partially paginated list serialises as a valid first page.
impl Serialize for Node {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Node::Null => serializer.serialize_unit(),
            Node::Bool(b) => serializer.serialize_bool(*b),
            Node::Number(n) => n.serialize(serializer),
            Node::String(s) => serializer.serialize_str(s),
            Node::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Node::Document(doc) => {
                let mut map = serializer.serialize_map(Some(doc.len()))?;
                for (k, v) in doc.iter() {
                    map.serialize_entry(k, v)?;
                }
                map.end()
            }
            Node::Link(link) => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry(TYPE_KEY, "link")?;
                map.serialize_entry("href", link.href().as_str())?;
                map.end()
            }
            Node::List(list) => {
                let (items, cursor) = list.snapshot();
                let mut map = serializer.serialize_map(None)?;
                map.serialize_entry(TYPE_KEY, "list")?;
                map.serialize_entry("items", &items)?;
                if let Some(next) = cursor {
                    map.serialize_entry("next", next.as_str())?;
                }
                map.end()
            }
            Node::Form(form) => {
                let mut map = serializer.serialize_map(Some(4))?;
                map.serialize_entry(TYPE_KEY, "form")?;
                map.serialize_entry("href", form.href().as_str())?;
                map.serialize_entry("method", form.method())?;
                map.serialize_entry("fields", form.fields())?;
                map.end()
            }
        }
    }
}

// --- Link --------------------------------------------------------------------

/// A reference to another document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    href: Url,
}

impl Link {
    pub fn new(href: Url) -> Self {
        Self { href }
    }

    /// The absolute target URL.
    pub fn href(&self) -> &Url {
        &self.href
    }

    /// `GET` the target and decode it against the response's effective URL.
    pub fn invoke<T: Transport + ?Sized>(&self, transport: &T) -> Result<Node> {
        transport::get(transport, &self.href)
    }
}

// --- Document ----------------------------------------------------------------

/// A JSON object without a recognised discriminator: an ordered, read-only
/// bag of attributes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    attributes: IndexMap<String, Node>,
}

impl Document {
    pub fn new(attributes: IndexMap<String, Node>) -> Self {
        Self { attributes }
    }

    /// Look up an attribute, failing with [`Error::AttributeNotFound`].
    pub fn get(&self, attr: &str) -> Result<&Node> {
        self.attributes
            .get(attr)
            .ok_or_else(|| Error::AttributeNotFound(attr.to_string()))
    }

    pub fn has(&self, attr: &str) -> bool {
        self.attributes.contains_key(attr)
    }

    /// Attribute names in the order they appeared in the source object.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.attributes.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Node)> {
        self.attributes.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }
}

// --- FieldSpec ---------------------------------------------------------------

/// One parameter accepted by a [`Form`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldSpec {
    pub name: String,
    /// Absent on the wire means `false`.
    pub required: bool,
}

impl FieldSpec {
    pub fn new(name: impl Into<String>, required: bool) -> Self {
        Self {
            name: name.into(),
            required,
        }
    }
}

// --- tests -------------------------------------------------------------------
