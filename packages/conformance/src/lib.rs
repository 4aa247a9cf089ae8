//! Fixture server for the docjson end-to-end tests.
//!
//! [`spawn_server`] binds an ephemeral port on `127.0.0.1` and serves a small
//! todo API written in DocJSON: a root document with links and forms, a
//! two-page list, a redirect, and a list whose cursor leads to a plain
//! document. Every request is recorded in a [`RequestLog`] so tests can
//! count round trips.
//!
//! The server runs on its own thread with its own tokio runtime, which lets
//! tests drive it with the blocking `HttpTransport` from plain `#[test]`
//! functions.

use std::sync::{mpsc, Arc, Mutex};

use axum::extract::{Query, Request, State};
use axum::http::StatusCode;
use axum::middleware::{self, Next};
use axum::response::{Redirect, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};

/// Every request the fixture server has seen, as `"METHOD /path?query"`.
#[derive(Debug, Clone, Default)]
pub struct RequestLog {
    entries: Arc<Mutex<Vec<String>>>,
}

impl RequestLog {
    pub fn entries(&self) -> Vec<String> {
        self.entries.lock().map(|e| e.clone()).unwrap_or_default()
    }

    /// Number of requests whose path starts with `prefix`.
    pub fn count(&self, prefix: &str) -> usize {
        self.entries()
            .iter()
            .filter(|e| e.split_once(' ').is_some_and(|(_, p)| p.starts_with(prefix)))
            .count()
    }

    fn push(&self, entry: String) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.push(entry);
        }
    }
}

/// Start the fixture server and return `(base_url, log)`.
///
/// The base URL ends with `/`, e.g. `http://127.0.0.1:51234/`.
///
/// # Panics
///
/// Panics if the runtime cannot be built or the port cannot be bound.
pub fn spawn_server() -> (String, RequestLog) {
    let log = RequestLog::default();
    let app = router(log.clone());
    let (tx, rx) = mpsc::channel();

    std::thread::spawn(move || {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .expect("build fixture runtime");
        runtime.block_on(async move {
            let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
                .await
                .expect("bind ephemeral port");
            let addr = listener.local_addr().expect("get local addr");
            tx.send(addr).expect("report fixture address");
            axum::serve(listener, app).await.expect("fixture server error");
        });
    });

    let addr = rx.recv().expect("fixture server did not start");
    (format!("http://{addr}/"), log)
}

fn router(log: RequestLog) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/todos", get(todos).post(create_todo))
        .route("/search", get(search))
        .route("/old", get(|| async { Redirect::temporary("/moved/") }))
        .route("/moved/", get(moved))
        .route("/broken-list", get(broken_list))
        .route("/not-a-list", get(|| async { Json(json!({"plain": true})) }))
        .layer(middleware::from_fn_with_state(log, record))
}

async fn record(State(log): State<RequestLog>, req: Request, next: Next) -> Response {
    let target = req
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| "/".into());
    log.push(format!("{} {}", req.method(), target));
    next.run(req).await
}

// --- handlers ----------------------------------------------------------------

async fn root() -> Json<Value> {
    Json(json!({
        "title": "Todo",
        "todos": {"_type": "link", "href": "todos"},
        "add": {
            "_type": "form",
            "href": "todos",
            "method": "POST",
            "fields": [
                {"name": "text", "required": true},
                {"name": "done", "required": false}
            ]
        },
        "search": {
            "_type": "form",
            "href": "/search",
            "method": "GET",
            "fields": [{"name": "q", "required": true}]
        },
        "old": {"_type": "link", "href": "old"},
        "broken": {"_type": "link", "href": "broken-list"},
        "gone": {"_type": "link", "href": "gone"}
    }))
}

#[derive(Deserialize)]
struct PageQuery {
    page: Option<u32>,
}

async fn todos(Query(q): Query<PageQuery>) -> Json<Value> {
    match q.page.unwrap_or(1) {
        1 => Json(json!({
            "_type": "list",
            "items": ["a", "b"],
            "next": "todos?page=2"
        })),
        _ => Json(json!({
            "_type": "list",
            "items": ["c"],
            "next": null
        })),
    }
}

async fn create_todo(Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    (
        StatusCode::CREATED,
        Json(json!({
            "created": body,
            "list": {"_type": "link", "href": "/todos"}
        })),
    )
}

#[derive(Deserialize)]
struct SearchQuery {
    q: String,
}

async fn search(Query(q): Query<SearchQuery>) -> Json<Value> {
    Json(json!({"query": q.q}))
}

async fn moved() -> Json<Value> {
    Json(json!({"child": {"_type": "link", "href": "child"}}))
}

async fn broken_list() -> Json<Value> {
    Json(json!({"_type": "list", "items": [1], "next": "not-a-list"}))
}
