//! JSON → [`Node`] decoding.
//!
//! Decoding is bottom-up: every child value is turned into a [`Node`] before
//! the object containing it is handed to the dispatch hook, so the hook only
//! ever sees decoded children. [`decode_with`] exposes that walk with a
//! caller-supplied hook; [`decode`] plugs in the DocJSON discriminator
//! dispatch.

use indexmap::IndexMap;
use serde_json::Value;
use url::Url;

use crate::error::{Error, Result};
use crate::form::Form;
use crate::list::PaginatedList;
use crate::node::{Document, FieldSpec, Link, Node, TYPE_KEY};

/// Parse `raw` as JSON and decode it, resolving references against `base`.
pub fn decode(raw: &[u8], base: &Url) -> Result<Node> {
    let value: Value = serde_json::from_slice(raw)?;
    decode_value(value, base)
}

/// Decode an already-parsed JSON value.
pub fn decode_value(value: Value, base: &Url) -> Result<Node> {
    decode_with(value, &mut |attrs| dispatch(attrs, base))
}

/// Walk `value` bottom-up, calling `hook` once per JSON object with its
/// decoded attributes. Arrays become [`Node::Array`]; scalars pass through.
pub fn decode_with<F>(value: Value, hook: &mut F) -> Result<Node>
where
    F: FnMut(IndexMap<String, Node>) -> Result<Node>,
{
    match value {
        Value::Null => Ok(Node::Null),
        Value::Bool(b) => Ok(Node::Bool(b)),
        Value::Number(n) => Ok(Node::Number(n)),
        Value::String(s) => Ok(Node::String(s)),
        Value::Array(values) => {
            let mut items = Vec::with_capacity(values.len());
            for v in values {
                items.push(decode_with(v, hook)?);
            }
            Ok(Node::Array(items))
        }
        Value::Object(map) => {
            let mut attrs = IndexMap::with_capacity(map.len());
            for (k, v) in map {
                let node = decode_with(v, hook)?;
                attrs.insert(k, node);
            }
            hook(attrs)
        }
    }
}

/// Join a possibly-relative reference onto `base`.
pub fn resolve(base: &Url, reference: &str) -> Result<Url> {
    base.join(reference).map_err(|source| Error::InvalidUrl {
        reference: reference.to_string(),
        source,
    })
}

// --- dispatch ----------------------------------------------------------------

fn dispatch(attrs: IndexMap<String, Node>, base: &Url) -> Result<Node> {
    let kind = attrs
        .get(TYPE_KEY)
        .and_then(Node::as_str)
        .map(str::to_owned);
    match kind.as_deref() {
        Some("link") => decode_link(&attrs, base).map(Node::Link),
        Some("list") => decode_list(attrs, base).map(Node::List),
        Some("form") => decode_form(attrs, base).map(Node::Form),
        _ => Ok(Node::Document(Document::new(attrs))),
    }
}

fn decode_link(attrs: &IndexMap<String, Node>, base: &Url) -> Result<Link> {
    let href = required_str(attrs, "link", "href")?;
    Ok(Link::new(resolve(base, href)?))
}

fn decode_list(mut attrs: IndexMap<String, Node>, base: &Url) -> Result<PaginatedList> {
    let items = match attrs.shift_remove("items") {
        Some(Node::Array(items)) => items,
        Some(_) => return Err(malformed("list 'items' must be an array")),
        None => return Err(malformed("list missing 'items' key")),
    };
    let cursor = match attrs.get("next") {
        None | Some(Node::Null) => None,
        Some(Node::String(next)) => Some(resolve(base, next)?),
        Some(_) => return Err(malformed("list 'next' must be a string")),
    };
    Ok(PaginatedList::new(items, cursor))
}

fn decode_form(mut attrs: IndexMap<String, Node>, base: &Url) -> Result<Form> {
    let href = resolve(base, required_str(&attrs, "form", "href")?)?;
    let method = required_str(&attrs, "form", "method")?.to_string();
    let fields = match attrs.shift_remove("fields") {
        None => Vec::new(),
        Some(Node::Array(fields)) => fields
            .iter()
            .map(decode_field)
            .collect::<Result<Vec<_>>>()?,
        Some(_) => return Err(malformed("form 'fields' must be an array")),
    };
    Ok(Form::new(href, method, fields))
}

fn decode_field(node: &Node) -> Result<FieldSpec> {
    let Node::Document(field) = node else {
        return Err(malformed("form field must be an object"));
    };
    let name = match field.get("name") {
        Ok(Node::String(name)) if !name.is_empty() => name.clone(),
        Ok(_) => return Err(malformed("form field 'name' must be a non-empty string")),
        Err(_) => return Err(malformed("form field missing 'name' key")),
    };
    let required = match field.get("required") {
        Err(_) | Ok(Node::Null) => false,
        Ok(Node::Bool(required)) => *required,
        Ok(_) => return Err(malformed("form field 'required' must be a boolean")),
    };
    Ok(FieldSpec { name, required })
}

// --- helpers -----------------------------------------------------------------

fn required_str<'a>(
    attrs: &'a IndexMap<String, Node>,
    what: &str,
    key: &str,
) -> Result<&'a str> {
    match attrs.get(key) {
        Some(Node::String(s)) => Ok(s),
        Some(_) => Err(malformed(format!("{what} '{key}' must be a string"))),
        None => Err(malformed(format!("{what} missing '{key}' key"))),
    }
}

fn malformed(msg: impl Into<String>) -> Error {
    Error::MalformedDocument(msg.into())
}

// --- tests -------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::url;
    use serde_json::json;

    fn base() -> Url {
        url("http://api.example.com/root/")
    }

    fn malformed_message(value: Value) -> String {
        match decode_value(value, &base()) {
            Err(Error::MalformedDocument(msg)) => msg,
            other => panic!("expected MalformedDocument, got {other:?}"),
        }
    }

    #[test]
    fn absolute_path_link_replaces_base_path() {
        let node = decode_value(json!({"_type": "link", "href": "/items"}), &base()).unwrap();
        assert_eq!(
            node.as_link().unwrap().href().as_str(),
            "http://api.example.com/items"
        );
    }

    #[test]
    fn relative_link_merges_with_base_path() {
        let node = decode_value(json!({"_type": "link", "href": "items?page=2"}), &base()).unwrap();
        assert_eq!(
            node.as_link().unwrap().href().as_str(),
            "http://api.example.com/root/items?page=2"
        );
    }

    #[test]
    fn absolute_link_overrides_base() {
        let node =
            decode_value(json!({"_type": "link", "href": "https://other.example/x"}), &base())
                .unwrap();
        assert_eq!(node.as_link().unwrap().href().as_str(), "https://other.example/x");
    }

    #[test]
    fn link_without_href_is_malformed() {
        assert_eq!(malformed_message(json!({"_type": "link"})), "link missing 'href' key");
    }

    #[test]
    fn list_cursor_is_resolved() {
        let node = decode_value(
            json!({"_type": "list", "items": [1, 2], "next": "?page=2"}),
            &base(),
        )
        .unwrap();
        let list = node.as_list().unwrap();
        assert_eq!(list.fetched_len(), 2);
        assert_eq!(
            list.cursor().unwrap().as_str(),
            "http://api.example.com/root/?page=2"
        );
    }

    #[test]
    fn list_null_next_means_no_cursor() {
        let node = decode_value(json!({"_type": "list", "items": [], "next": null}), &base())
            .unwrap();
        assert!(node.as_list().unwrap().is_exhausted());
    }

    #[test]
    fn list_without_items_is_malformed() {
        assert_eq!(malformed_message(json!({"_type": "list"})), "list missing 'items' key");
        assert_eq!(
            malformed_message(json!({"_type": "list", "items": {}})),
            "list 'items' must be an array"
        );
    }

    #[test]
    fn form_decodes_fields_in_order() {
        let node = decode_value(
            json!({
                "_type": "form",
                "href": "todos",
                "method": "post",
                "fields": [{"name": "text", "required": true}, {"name": "done"}]
            }),
            &base(),
        )
        .unwrap();
        let form = node.as_form().unwrap();
        assert_eq!(form.href().as_str(), "http://api.example.com/root/todos");
        assert_eq!(form.method(), "post");
        assert_eq!(
            form.fields().to_vec(),
            vec![FieldSpec::new("text", true), FieldSpec::new("done", false)]
        );
    }

    #[test]
    fn form_fields_default_to_empty() {
        let node =
            decode_value(json!({"_type": "form", "href": "/x", "method": "GET"}), &base()).unwrap();
        assert!(node.as_form().unwrap().fields().is_empty());
    }

    #[test]
    fn form_shape_errors() {
        assert_eq!(
            malformed_message(json!({"_type": "form", "method": "GET"})),
            "form missing 'href' key"
        );
        assert_eq!(
            malformed_message(json!({"_type": "form", "href": "/x"})),
            "form missing 'method' key"
        );
        assert_eq!(
            malformed_message(json!({"_type": "form", "href": "/x", "method": "GET", "fields": {}})),
            "form 'fields' must be an array"
        );
        assert_eq!(
            malformed_message(
                json!({"_type": "form", "href": "/x", "method": "GET", "fields": [{"required": true}]})
            ),
            "form field missing 'name' key"
        );
        assert_eq!(
            malformed_message(
                json!({"_type": "form", "href": "/x", "method": "GET", "fields": [{"name": ""}]})
            ),
            "form field 'name' must be a non-empty string"
        );
        assert_eq!(
            malformed_message(
                json!({"_type": "form", "href": "/x", "method": "GET", "fields": [{"name": "a", "required": "yes"}]})
            ),
            "form field 'required' must be a boolean"
        );
    }

    #[test]
    fn unknown_type_is_plain_document() {
        let node = decode_value(json!({"_type": "widget", "size": 3}), &base()).unwrap();
        let doc = node.as_document().unwrap();
        assert_eq!(doc.get("_type").unwrap().as_str(), Some("widget"));
        assert!(doc.has("size"));
    }

    #[test]
    fn bare_arrays_do_not_paginate() {
        let node = decode_value(json!([{"_type": "link", "href": "a"}, 2]), &base()).unwrap();
        let items = node.as_array().unwrap();
        assert!(items[0].as_link().is_some());
        assert_eq!(items[1].as_number().and_then(|n| n.as_i64()), Some(2));
    }

    #[test]
    fn nested_errors_abort_decode() {
        let err = decode_value(json!({"outer": {"inner": {"_type": "link"}}}), &base()).unwrap_err();
        assert!(matches!(err, Error::MalformedDocument(_)));
    }

    #[test]
    fn hook_sees_decoded_children() {
        let mut seen = Vec::new();
        let value = json!({"a": {"b": 1}});
        decode_with(value, &mut |attrs: IndexMap<String, Node>| {
            seen.push(attrs.keys().cloned().collect::<Vec<_>>());
            Ok(Node::Document(Document::new(attrs)))
        })
        .unwrap();
        assert_eq!(seen, vec![vec!["b".to_string()], vec!["a".to_string()]]);
    }

    #[test]
    fn invalid_json_is_reported() {
        assert!(matches!(decode(b"{not json", &base()), Err(Error::InvalidJson(_))));
    }
}
