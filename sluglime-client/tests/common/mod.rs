//! In-process stand-in for the Sluglime backend, served by axum on an
//! ephemeral port.

#![allow(dead_code)]

use axum::extract::{DefaultBodyLimit, Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use sluglime_client::ClientConfig;

#[derive(Debug, Clone)]
pub struct Upload {
    pub field: String,
    pub file_name: String,
    pub content_type: String,
    pub size: usize,
}

struct StoredMessage {
    author: &'static str,
    body: String,
    created_at: String,
}

struct StoredReport {
    ticket: String,
    code: String,
    title: String,
    body: String,
    category: Option<String>,
    created_at: String,
    messages: Vec<StoredMessage>,
}

impl StoredReport {
    fn to_json(&self) -> Value {
        let messages: Vec<Value> = self
            .messages
            .iter()
            .enumerate()
            .map(|(i, m)| {
                json!({
                    "id": i + 1,
                    "author": m.author,
                    "body": m.body,
                    "created_at": m.created_at,
                })
            })
            .collect();
        json!({
            "ticket": self.ticket,
            "title": self.title,
            "body": self.body,
            "category": self.category,
            "status": "open",
            "created_at": self.created_at,
            "messages": messages,
        })
    }
}

#[derive(Default)]
pub struct FakeBackend {
    reports: Mutex<Vec<StoredReport>>,
    uploads: Mutex<Vec<Upload>>,
    fail_next: Mutex<Option<(StatusCode, Value)>>,
    delay: Mutex<Option<Duration>>,
    hits: AtomicUsize,
}

impl FakeBackend {
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    pub fn uploads(&self) -> Vec<Upload> {
        self.uploads.lock().unwrap().clone()
    }

    /// Answer the next request with `status` and `body` instead of handling it.
    pub fn fail_next(&self, status: StatusCode, body: Value) {
        *self.fail_next.lock().unwrap() = Some((status, body));
    }

    pub fn delay_responses(&self, delay: Duration) {
        *self.delay.lock().unwrap() = Some(delay);
    }

    pub fn reply_as_moderator(&self, ticket: &str, body: &str) {
        let mut reports = self.reports.lock().unwrap();
        let report = reports.iter_mut().find(|r| r.ticket == ticket).unwrap();
        report.messages.push(StoredMessage {
            author: "staff",
            body: body.to_string(),
            created_at: naive_now(),
        });
    }

    async fn enter(&self) -> Option<Response> {
        self.hits.fetch_add(1, Ordering::SeqCst);
        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let failure = self.fail_next.lock().unwrap().take();
        failure.map(|(status, body)| (status, Json(body)).into_response())
    }
}

pub struct TestServer {
    pub base_url: String,
    pub backend: Arc<FakeBackend>,
}

impl TestServer {
    pub fn config(&self) -> ClientConfig {
        ClientConfig::default().with_api_url(&self.base_url)
    }
}

/// Bind to `localhost:0` and serve the fake until the test runtime ends.
pub async fn spawn() -> TestServer {
    let backend = Arc::new(FakeBackend::default());

    let app = Router::new()
        .route("/api/v1/reports", post(create_report))
        .route("/api/v1/reports/public", get(list_public))
        .route("/api/v1/reports/:ticket", get(fetch_report))
        .route("/api/v1/reports/:ticket/messages", post(post_message))
        .layer(DefaultBodyLimit::max(64 * 1024 * 1024))
        .with_state(backend.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    TestServer {
        base_url: format!("http://localhost:{port}"),
        backend,
    }
}

fn naive_now() -> String {
    chrono::Utc::now()
        .naive_utc()
        .format("%Y-%m-%dT%H:%M:%S%.6f")
        .to_string()
}

fn random_string(len: usize, uppercase: bool) -> String {
    let raw: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect();
    if uppercase {
        raw.to_uppercase()
    } else {
        raw
    }
}

#[derive(Deserialize)]
struct CodeQuery {
    code: Option<String>,
}

fn not_found() -> Response {
    (StatusCode::NOT_FOUND, Json(json!({ "error": "Not found" }))).into_response()
}

fn forbidden() -> Response {
    (StatusCode::FORBIDDEN, Json(json!({ "error": "Forbidden" }))).into_response()
}

async fn create_report(State(backend): State<Arc<FakeBackend>>, mut multipart: Multipart) -> Response {
    if let Some(failure) = backend.enter().await {
        return failure;
    }

    let mut title = None;
    let mut body = None;
    let mut category = None;
    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "title" => title = field.text().await.ok(),
            "body" => body = field.text().await.ok(),
            "category" => category = field.text().await.ok(),
            _ if name.starts_with("file_") => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let content_type = field.content_type().unwrap_or("application/octet-stream").to_string();
                let size = field.bytes().await.map(|b| b.len()).unwrap_or(0);
                backend.uploads.lock().unwrap().push(Upload {
                    field: name,
                    file_name,
                    content_type,
                    size,
                });
            }
            _ => {}
        }
    }

    let (Some(title), Some(body)) = (title, body) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "errors": { "title": ["Missing data for required field."] } })),
        )
            .into_response();
    };

    let ticket = random_string(12, true);
    let code = random_string(20, false);
    backend.reports.lock().unwrap().push(StoredReport {
        ticket: ticket.clone(),
        code: code.clone(),
        title,
        body,
        category,
        created_at: naive_now(),
        messages: Vec::new(),
    });

    (
        StatusCode::CREATED,
        Json(json!({
            "ticket": ticket,
            "access_code": code,
            "message": "Report submitted successfully",
        })),
    )
        .into_response()
}

async fn fetch_report(
    State(backend): State<Arc<FakeBackend>>,
    Path(ticket): Path<String>,
    Query(query): Query<CodeQuery>,
) -> Response {
    if let Some(failure) = backend.enter().await {
        return failure;
    }

    let reports = backend.reports.lock().unwrap();
    let Some(report) = reports.iter().find(|r| r.ticket == ticket) else {
        return not_found();
    };
    if query.code.as_deref() != Some(report.code.as_str()) {
        return forbidden();
    }
    Json(report.to_json()).into_response()
}

#[derive(Deserialize)]
struct NewMessage {
    body: String,
}

async fn post_message(
    State(backend): State<Arc<FakeBackend>>,
    Path(ticket): Path<String>,
    Query(query): Query<CodeQuery>,
    Json(message): Json<NewMessage>,
) -> Response {
    if let Some(failure) = backend.enter().await {
        return failure;
    }

    let mut reports = backend.reports.lock().unwrap();
    let Some(report) = reports.iter_mut().find(|r| r.ticket == ticket) else {
        return not_found();
    };
    if query.code.as_deref() != Some(report.code.as_str()) {
        return forbidden();
    }

    let created_at = naive_now();
    report.messages.push(StoredMessage {
        author: "user",
        body: message.body.clone(),
        created_at: created_at.clone(),
    });
    (
        StatusCode::CREATED,
        Json(json!({
            "id": report.messages.len(),
            "author": "user",
            "body": message.body,
            "created_at": created_at,
        })),
    )
        .into_response()
}

async fn list_public(State(backend): State<Arc<FakeBackend>>) -> Response {
    if let Some(failure) = backend.enter().await {
        return failure;
    }

    let reports = backend.reports.lock().unwrap();
    let listed: Vec<Value> = reports
        .iter()
        .rev()
        .map(|r| {
            json!({
                "id": r.ticket.to_lowercase(),
                "ticket": r.ticket,
                "title": r.title,
                "body": r.body,
                "category": r.category,
                "status": "open",
                "created_at": r.created_at,
                "comment_count": r.messages.len(),
                "like_count": 0,
            })
        })
        .collect();
    Json(json!({ "reports": listed })).into_response()
}
