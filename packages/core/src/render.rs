//! Human-readable rendering of decoded documents.
//!
//! The output is meant for terminals and logs, not for machines. Only the
//! JSON wire format is normative.
//!
//! ```text
//! {
//!     title: "Todo",
//!     items: [
//!         "first",
//!         "second"
//!         ...
//!     ],
//!     add: form(text, [done]),
//!     home: link -> http://api.example.com/
//! }
//! ```
//!
//! Lists show only what has been fetched so far; a trailing `...` means
//! more pages remain. Rendering never touches the network.

use serde_json::Value;

use crate::node::Node;

const INDENT: &str = "    ";

/// Render `node` as an indented tree.
pub fn render(node: &Node) -> String {
    let mut out = String::new();
    write_node(&mut out, node, 0);
    out
}

fn write_node(out: &mut String, node: &Node, depth: usize) {
    match node {
        Node::Null => out.push_str("null"),
        Node::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Node::Number(n) => out.push_str(&n.to_string()),
        Node::String(s) => out.push_str(&Value::String(s.clone()).to_string()),
        Node::Link(link) => {
            out.push_str("link -> ");
            out.push_str(link.href().as_str());
        }
        Node::Form(form) => {
            out.push_str("form(");
            out.push_str(&form.signature());
            out.push(')');
        }
        Node::Document(doc) => {
            if doc.is_empty() {
                out.push_str("{}");
                return;
            }
            out.push_str("{\n");
            let last = doc.len() - 1;
            for (i, (key, value)) in doc.iter().enumerate() {
                pad(out, depth + 1);
                out.push_str(key);
                out.push_str(": ");
                write_node(out, value, depth + 1);
                out.push_str(if i == last { "\n" } else { ",\n" });
            }
            pad(out, depth);
            out.push('}');
        }
        Node::Array(items) => write_seq(out, items, false, depth),
        Node::List(list) => {
            let (items, cursor) = list.snapshot();
            write_seq(out, &items, cursor.is_some(), depth);
        }
    }
}

fn write_seq(out: &mut String, items: &[Node], more: bool, depth: usize) {
    if items.is_empty() && !more {
        out.push_str("[]");
        return;
    }
    out.push_str("[\n");
    for (i, item) in items.iter().enumerate() {
        pad(out, depth + 1);
        write_node(out, item, depth + 1);
        out.push_str(if i + 1 == items.len() { "\n" } else { ",\n" });
    }
    if more {
        pad(out, depth + 1);
        out.push_str("...\n");
    }
    pad(out, depth);
    out.push(']');
}

fn pad(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push_str(INDENT);
    }
}

// --- tests -------------------------------------------------------------------
