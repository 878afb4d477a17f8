#![allow(dead_code)]

//! Scripted in-process HTTP server for integration tests.
//!
//! An axum router with a single fallback handler runs on a tokio runtime
//! owned by [`MockServer`]. Routes are matched on method + path. Each route
//! holds a queue of responses served once each in order; when the queue is
//! empty the last response served repeats. Every request is recorded for
//! later assertions.

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    Router,
};
use serde_json::{json, Value as JsonValue};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use tokio::runtime::Runtime;

use mindsdb_link::{Transport, TransportBuilder};

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    /// Lowercased header names
    pub headers: HashMap<String, String>,
    pub body: Vec<u8>,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_ascii_lowercase()).map(String::as_str)
    }

    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn json(&self) -> JsonValue {
        serde_json::from_slice(&self.body).expect("request body is not JSON")
    }
}

#[derive(Debug, Clone)]
pub struct MockResponse {
    pub status: u16,
    pub body: String,
    pub headers: Vec<(String, String)>,
}

impl MockResponse {
    pub fn json(status: u16, body: JsonValue) -> Self {
        Self {
            status,
            body: body.to_string(),
            headers: vec![("Content-Type".into(), "application/json".into())],
        }
    }

    pub fn text(status: u16, body: &str) -> Self {
        Self {
            status,
            body: body.to_string(),
            headers: vec![("Content-Type".into(), "text/plain".into())],
        }
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// `/api/sql/query` answer with rows
    pub fn table(columns: &[&str], rows: JsonValue) -> Self {
        Self::json(
            200,
            json!({"type": "table", "column_names": columns, "data": rows}),
        )
    }

    /// `/api/sql/query` answer without rows
    pub fn ok() -> Self {
        Self::json(200, json!({"type": "ok"}))
    }

    pub fn query_error(message: &str) -> Self {
        Self::json(
            200,
            json!({"type": "error", "error_code": 0, "error_message": message}),
        )
    }
}

#[derive(Default)]
struct Route {
    queue: VecDeque<MockResponse>,
    last: Option<MockResponse>,
}

impl Route {
    fn next(&mut self) -> Option<MockResponse> {
        if let Some(response) = self.queue.pop_front() {
            self.last = Some(response);
        }
        self.last.clone()
    }
}

type Routes = HashMap<(String, String), Route>;

#[derive(Clone, Default)]
struct MockState {
    routes: Arc<Mutex<Routes>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

pub struct MockServer {
    url: String,
    state: MockState,
    // Dropping the runtime stops the server
    _runtime: Runtime,
}

impl MockServer {
    pub fn start() -> Self {
        init_logging();

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()
            .expect("build mock server runtime");
        let state = MockState::default();

        let listener = runtime
            .block_on(tokio::net::TcpListener::bind("127.0.0.1:0"))
            .expect("bind mock server");
        let url = format!("http://{}", listener.local_addr().expect("local addr"));

        let app = Router::new().fallback(answer).with_state(state.clone());
        runtime.spawn(async move {
            axum::serve(listener, app).await.expect("mock server failed");
        });

        Self {
            url,
            state,
            _runtime: runtime,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Queue `response` for `method path`
    pub fn on(&self, method: &str, path: &str, response: MockResponse) -> &Self {
        self.state
            .routes
            .lock()
            .unwrap()
            .entry((method.to_string(), path.to_string()))
            .or_default()
            .queue
            .push_back(response);
        self
    }

    /// Queue a response for the SQL endpoint
    pub fn on_query(&self, response: MockResponse) -> &Self {
        self.on("POST", "/api/sql/query", response)
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().unwrap().clone()
    }

    pub fn requests_to(&self, method: &str, path: &str) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.method == method && r.path == path)
            .collect()
    }

    /// SQL text of every statement sent, in order
    pub fn queries(&self) -> Vec<String> {
        self.requests_to("POST", "/api/sql/query")
            .iter()
            .map(|r| r.json()["query"].as_str().unwrap_or_default().to_string())
            .collect()
    }

    pub fn transport(&self) -> TransportBuilder {
        Transport::builder().base_url(self.url.clone())
    }
}

/// Record the request, then answer from the route's queue (404 when unscripted)
async fn answer(
    State(state): State<MockState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let request = RecordedRequest {
        method: method.as_str().to_string(),
        path: uri.path().to_string(),
        headers: headers
            .iter()
            .filter_map(|(name, value)| {
                let value = value.to_str().ok()?;
                Some((name.as_str().to_ascii_lowercase(), value.to_string()))
            })
            .collect(),
        body: body.to_vec(),
    };
    let key = (request.method.clone(), request.path.clone());
    state.requests.lock().unwrap().push(request);

    let scripted = state
        .routes
        .lock()
        .unwrap()
        .get_mut(&key)
        .and_then(Route::next)
        .unwrap_or_else(|| MockResponse::text(404, "no route"));

    into_http(scripted)
}

fn into_http(scripted: MockResponse) -> Response {
    let status = StatusCode::from_u16(scripted.status).expect("valid mock status");
    let mut response = (status, scripted.body).into_response();
    for (name, value) in &scripted.headers {
        let name = HeaderName::from_bytes(name.as_bytes()).expect("valid mock header name");
        let value = HeaderValue::from_str(value).expect("valid mock header value");
        if name == axum::http::header::CONTENT_TYPE {
            response.headers_mut().insert(name, value);
        } else {
            response.headers_mut().append(name, value);
        }
    }
    response
}
