//! Dot-path navigation through a decoded document.
//!
//! `todos.3.title` reads attribute `todos`, takes item 3 of the resulting
//! list or array, then reads `title`. A link met before the path is done is
//! followed. Numeric segments index; everything else is an attribute name.

use docjson::{Node, Transport};

#[derive(Debug, thiserror::Error)]
pub enum NavError {
    #[error(transparent)]
    Doc(#[from] docjson::Error),

    #[error("cannot apply {segment:?} to a {kind}")]
    Unsupported { segment: String, kind: &'static str },
}

/// Walk `path` from `root`. An empty path returns `root` unchanged.
pub fn navigate<T: Transport + ?Sized>(
    transport: &T,
    root: Node,
    path: &str,
) -> Result<Node, NavError> {
    let mut node = root;
    for segment in path.split('.').filter(|s| !s.is_empty()) {
        while let Node::Link(link) = &node {
            tracing::debug!(href = %link.href(), "following link");
            node = link.invoke(transport)?;
        }
        node = step(transport, &node, segment)?;
    }
    Ok(node)
}

fn step<T: Transport + ?Sized>(
    transport: &T,
    node: &Node,
    segment: &str,
) -> Result<Node, NavError> {
    let index = segment.parse::<isize>().ok();
    match (node, index) {
        (Node::List(list), Some(i)) => Ok(list.get(transport, i)?),
        (Node::Array(items), Some(i)) => {
            let i = usize::try_from(i).map_err(|_| docjson::Error::NegativeIndex(i))?;
            items
                .get(i)
                .cloned()
                .ok_or(NavError::Doc(docjson::Error::OutOfRange(i)))
        }
        (Node::Document(doc), _) => Ok(doc.get(segment)?.clone()),
        _ => Err(NavError::Unsupported {
            segment: segment.to_string(),
            kind: node.kind(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docjson::{decode_value, BoxError, Request, Response, Url};
    use serde_json::json;
    use std::cell::Cell;

    /// Serves one fixed document for any request and counts calls.
    struct OneDoc {
        body: serde_json::Value,
        calls: Cell<usize>,
    }

    impl Transport for OneDoc {
        fn send(&self, request: Request) -> Result<Response, BoxError> {
            self.calls.set(self.calls.get() + 1);
            Ok(Response {
                url: request.url,
                content: serde_json::to_vec(&self.body)?,
            })
        }
    }

    fn base() -> Url {
        Url::parse("http://api.example.com/").unwrap()
    }

    #[test]
    fn walks_attributes_and_indices() {
        let t = OneDoc {
            body: json!(null),
            calls: Cell::new(0),
        };
        let root = decode_value(
            json!({"todos": {"_type": "list", "items": [{"title": "a"}, {"title": "b"}]}}),
            &base(),
        )
        .unwrap();
        let node = navigate(&t, root, "todos.1.title").unwrap();
        assert_eq!(node.as_str(), Some("b"));
        assert_eq!(t.calls.get(), 0);
    }

    #[test]
    fn follows_links_mid_path() {
        let t = OneDoc {
            body: json!({"name": "remote"}),
            calls: Cell::new(0),
        };
        let root = decode_value(json!({"next": {"_type": "link", "href": "/n"}}), &base()).unwrap();
        let node = navigate(&t, root, "next.name").unwrap();
        assert_eq!(node.as_str(), Some("remote"));
        assert_eq!(t.calls.get(), 1);
    }

    #[test]
    fn final_link_is_not_followed() {
        let t = OneDoc {
            body: json!({}),
            calls: Cell::new(0),
        };
        let root = decode_value(json!({"next": {"_type": "link", "href": "/n"}}), &base()).unwrap();
        assert!(navigate(&t, root, "next").unwrap().as_link().is_some());
        assert_eq!(t.calls.get(), 0);
    }

    #[test]
    fn reports_bad_segments() {
        let t = OneDoc {
            body: json!({}),
            calls: Cell::new(0),
        };
        let root = decode_value(json!({"n": 1, "xs": [1]}), &base()).unwrap();
        assert!(matches!(
            navigate(&t, root.clone(), "n.x"),
            Err(NavError::Unsupported { kind: "number", .. })
        ));
        assert!(matches!(
            navigate(&t, root.clone(), "xs.5"),
            Err(NavError::Doc(docjson::Error::OutOfRange(5)))
        ));
        assert!(matches!(
            navigate(&t, root, "missing"),
            Err(NavError::Doc(docjson::Error::AttributeNotFound(_)))
        ));
    }
}
