//! A local stand-in for the Sheets API and Google's token endpoint.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::{Json, Router};
use axum::extract::{Path, State};
use axum::http::{HeaderMap, Method, StatusCode, Uri, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use serde_json::{Value, json};

/// Test service-account key (generated for these tests only).
pub const TEST_PRIVATE_KEY: &str = include_str!("../fixtures/test_service_account.pem");

/// Access token handed out by the fake token endpoint.
pub const FAKE_ACCESS_TOKEN: &str = "fake-access-token";

/// One request received by the fake values endpoint.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: Method,
    pub target: String,
    pub query: String,
    pub authorization: Option<String>,
    pub body: String,
}

/// Shared state of the fake API.
#[derive(Default)]
pub struct FakeSheets {
    /// Rows returned by `values.get`; empty means the `values` key is omitted.
    pub values: Mutex<Vec<Vec<Value>>>,
    /// Every values request, in arrival order.
    pub requests: Mutex<Vec<Recorded>>,
    /// Raw bodies posted to the token endpoint.
    pub token_bodies: Mutex<Vec<String>>,
    /// Number of token exchanges.
    pub token_requests: AtomicUsize,
    /// Answer every values/metadata request with this status instead.
    pub fail_status: Mutex<Option<u16>>,
    /// Answer reads with a body that is not JSON.
    pub garbage: AtomicBool,
}

impl FakeSheets {
    pub fn with_values(values: Vec<Vec<Value>>) -> Arc<Self> {
        let fake = Self::default();
        *fake.values.lock().unwrap() = values;
        Arc::new(fake)
    }

    pub fn fail_with(&self, status: u16) {
        *self.fail_status.lock().unwrap() = Some(status);
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }

    pub fn token_requests(&self) -> usize {
        self.token_requests.load(Ordering::SeqCst)
    }

    fn failure(&self) -> Option<Response> {
        let status = (*self.fail_status.lock().unwrap())?;
        let status = StatusCode::from_u16(status).unwrap();
        Some((status, Json(json!({"error": {"code": status.as_u16()}}))).into_response())
    }
}

/// Serve the fake API on an ephemeral port and return its base URL.
pub async fn spawn(fake: Arc<FakeSheets>) -> String {
    let app = Router::new()
        .route("/v4/spreadsheets/{id}", get(metadata))
        .route(
            "/v4/spreadsheets/{id}/values/{target}",
            get(values).post(values).put(values),
        )
        .route("/token", post(token))
        .with_state(fake);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

async fn metadata(State(fake): State<Arc<FakeSheets>>, Path(id): Path<String>) -> Response {
    if let Some(failure) = fake.failure() {
        return failure;
    }
    Json(json!({ "spreadsheetId": id })).into_response()
}

async fn values(
    State(fake): State<Arc<FakeSheets>>,
    method: Method,
    Path((_id, target)): Path<(String, String)>,
    uri: Uri,
    headers: HeaderMap,
    body: String,
) -> Response {
    fake.requests.lock().unwrap().push(Recorded {
        method: method.clone(),
        target: target.clone(),
        query: uri.query().unwrap_or_default().to_string(),
        authorization: headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
        body,
    });

    if let Some(failure) = fake.failure() {
        return failure;
    }

    if method == Method::GET {
        if fake.garbage.load(Ordering::SeqCst) {
            return (StatusCode::OK, "<html>not json</html>").into_response();
        }
        let values = fake.values.lock().unwrap().clone();
        if values.is_empty() {
            return Json(json!({ "range": target, "majorDimension": "ROWS" })).into_response();
        }
        return Json(json!({ "range": target, "majorDimension": "ROWS", "values": values }))
            .into_response();
    }

    if method == Method::POST {
        let range = target.strip_suffix(":append").unwrap_or(&target);
        let sheet = range.rsplit_once('!').map_or(range, |(sheet, _)| sheet);
        return Json(json!({
            "spreadsheetId": "sheet-123",
            "updates": { "updatedRange": format!("{sheet}!A2:E2"), "updatedRows": 1 }
        }))
        .into_response();
    }

    Json(json!({ "spreadsheetId": "sheet-123" })).into_response()
}

async fn token(State(fake): State<Arc<FakeSheets>>, body: String) -> Response {
    fake.token_requests.fetch_add(1, Ordering::SeqCst);
    fake.token_bodies.lock().unwrap().push(body);
    Json(json!({
        "access_token": FAKE_ACCESS_TOKEN,
        "expires_in": 3599,
        "token_type": "Bearer",
    }))
    .into_response()
}
