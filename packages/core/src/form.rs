//! Invocable forms.
//!
//! A form names a target URL, an HTTP method, and the parameters it accepts.
//! Arguments are checked against the field list before anything is sent, so
//! a rejected invocation has no side effects.

use serde_json::{Map, Value};
use url::Url;

use crate::error::{Result, ValidationError};
use crate::node::{FieldSpec, Node};
use crate::transport::{self, Request, Transport};

/// An action the client can perform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Form {
    href: Url,
    method: String,
    fields: Vec<FieldSpec>,
}

impl Form {
    pub fn new(href: Url, method: impl Into<String>, fields: Vec<FieldSpec>) -> Self {
        Self {
            href,
            method: method.into(),
            fields,
        }
    }

    pub fn href(&self) -> &Url {
        &self.href
    }

    /// The method exactly as the document spelled it.
    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    /// Check `args` against the field list.
    ///
    /// Names the form does not declare are reported first, in argument
    /// order; then required names that were not supplied, in field order.
    pub fn validate(&self, args: &Map<String, Value>) -> std::result::Result<(), ValidationError> {
        let unexpected: Vec<String> = args
            .keys()
            .filter(|name| !self.fields.iter().any(|f| &f.name == *name))
            .cloned()
            .collect();
        if !unexpected.is_empty() {
            return Err(ValidationError::Unexpected(unexpected));
        }

        let mut missing: Vec<String> = Vec::new();
        for field in self.fields.iter().filter(|f| f.required) {
            if !args.contains_key(&field.name) && !missing.contains(&field.name) {
                missing.push(field.name.clone());
            }
        }
        if !missing.is_empty() {
            return Err(ValidationError::Missing(missing));
        }

        Ok(())
    }

    /// The request this form would send for `args`. Does not validate.
    ///
    /// `GET` forms carry the arguments as query parameters; every other
    /// method sends them as a JSON body.
    pub fn build_request(&self, args: &Map<String, Value>) -> Result<Request> {
        if self.method.eq_ignore_ascii_case("get") {
            let mut req = Request::get(self.href.clone());
            for (name, value) in args {
                for v in query_values(value) {
                    req = req.with_query(name.as_str(), v);
                }
            }
            return Ok(req);
        }

        let body = serde_json::to_vec(args)?;
        Ok(Request::new(self.method.to_ascii_uppercase(), self.href.clone())
            .with_header("content-type", "application/json")
            .with_body(body))
    }

    /// Validate `args`, send the request, and decode the response.
    pub fn invoke<T: Transport + ?Sized>(
        &self,
        transport: &T,
        args: &Map<String, Value>,
    ) -> Result<Node> {
        self.validate(args)?;
        let request = self.build_request(args)?;
        transport::load(transport, request)
    }

    /// Field names with optional ones bracketed, e.g. `text, [completed]`.
    pub fn signature(&self) -> String {
        self.fields
            .iter()
            .map(|f| {
                if f.required {
                    f.name.clone()
                } else {
                    format!("[{}]", f.name)
                }
            })
            .collect::<Vec<_>>()
            .join(", ")
    }
}

// --- helpers -----------------------------------------------------------------

/// Query-string values for one argument. `null` is dropped and arrays
/// repeat the key once per element.
fn query_values(value: &Value) -> Vec<String> {
    match value {
        Value::Null => vec![],
        Value::String(s) => vec![s.clone()],
        Value::Array(items) => items.iter().flat_map(query_values).collect(),
        other => vec![other.to_string()],
    }
}

// --- tests -------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::testing::{url, FakeTransport};
    use serde_json::json;

    const TARGET: &str = "http://api.example.com/todos";

    fn todo_form(method: &str) -> Form {
        Form::new(
            url(TARGET),
            method,
            vec![FieldSpec::new("text", true), FieldSpec::new("done", false)],
        )
    }

    fn args(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("args must be an object"),
        }
    }

    fn created() -> FakeTransport {
        FakeTransport::new().serve(TARGET, json!({"created": true}))
    }

    #[test]
    fn missing_required_field() {
        let t = created();
        let err = todo_form("POST").invoke(&t, &Map::new()).unwrap_err();
        match err {
            Error::Validation(v) => {
                assert_eq!(v, ValidationError::Missing(vec!["text".into()]));
                assert_eq!(v.to_string(), "Missing required parameter 'text'");
            }
            other => panic!("expected validation error, got {other:?}"),
        }
        assert_eq!(t.count(), 0);
    }

    #[test]
    fn unexpected_field() {
        let t = created();
        let err = todo_form("POST")
            .invoke(&t, &args(json!({"text": "x", "extra": "y"})))
            .unwrap_err();
        assert_eq!(err.to_string(), "Unknown parameter 'extra'");
        assert_eq!(t.count(), 0);
    }

    #[test]
    fn unexpected_is_reported_before_missing() {
        let err = todo_form("POST")
            .validate(&args(json!({"extra": 1, "other": 2})))
            .unwrap_err();
        assert_eq!(
            err,
            ValidationError::Unexpected(vec!["extra".into(), "other".into()])
        );
        assert_eq!(err.to_string(), "Unknown parameters 'extra', 'other'");
    }

    #[test]
    fn several_missing_use_plural() {
        let form = Form::new(
            url(TARGET),
            "POST",
            vec![FieldSpec::new("a", true), FieldSpec::new("b", true)],
        );
        let err = form.validate(&Map::new()).unwrap_err();
        assert_eq!(err.to_string(), "Missing required parameters 'a', 'b'");
    }

    #[test]
    fn post_sends_json_body() {
        let t = created();
        let result = todo_form("post")
            .invoke(&t, &args(json!({"text": "x"})))
            .unwrap();
        assert_eq!(
            result.as_document().unwrap().get("created").unwrap().as_bool(),
            Some(true)
        );

        let sent = &t.requests()[0];
        assert_eq!(sent.method, "POST");
        assert_eq!(sent.header("content-type"), Some("application/json"));
        assert!(sent.query.is_empty());
        let body: Value = serde_json::from_slice(sent.body.as_deref().unwrap()).unwrap();
        assert_eq!(body, json!({"text": "x"}));
    }

    #[test]
    fn get_sends_query_parameters() {
        let t = created();
        todo_form("Get")
            .invoke(&t, &args(json!({"text": "x", "done": true})))
            .unwrap();

        let sent = &t.requests()[0];
        assert_eq!(sent.method, "GET");
        assert!(sent.body.is_none());
        assert_eq!(sent.header("content-type"), None);
        assert_eq!(
            sent.query,
            vec![
                ("text".to_string(), "x".to_string()),
                ("done".to_string(), "true".to_string())
            ]
        );
    }

    #[test]
    fn query_values_flatten_arrays_and_drop_nulls() {
        assert_eq!(query_values(&json!(["a", 2])), vec!["a", "2"]);
        assert!(query_values(&Value::Null).is_empty());
    }

    #[test]
    fn signature_brackets_optional_fields() {
        assert_eq!(todo_form("POST").signature(), "text, [done]");
        assert_eq!(Form::new(url(TARGET), "GET", vec![]).signature(), "");
    }
}
