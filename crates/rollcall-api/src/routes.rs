//! HTTP routes.
//!
//! | method | path | handler |
//! |--------|------|---------|
//! | `POST` | `/api/contacts` | [`create_contact`] |
//! | `GET` | `/api/contacts/count` | [`count_contacts`] |
//! | `GET` | `/api/contacts/sheet-url` | [`sheet_url`] |
//! | `GET` | `/health` | [`health`] |
//!
//! Anything else answers 404 with the standard error envelope.

use std::sync::Arc;

use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{SecondsFormat, Utc};
use rollcall_core::{Contact, ContactInput};
use rollcall_service::RegistrationService;
use serde::Serialize;

use crate::error::{ApiError, Result};

/// Message returned by `/health`.
pub const HEALTH_MESSAGE: &str = "Rollcall API is running";

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    /// Registration service backing every route.
    pub service: Arc<RegistrationService>,
}

impl AppState {
    /// Wraps a service.
    pub fn new(service: RegistrationService) -> Self {
        Self {
            service: Arc::new(service),
        }
    }
}

/// Body of a successful create.
#[derive(Debug, Serialize)]
pub struct CreatedResponse {
    /// Always `true`.
    pub success: bool,
    /// `Contact saved successfully`.
    pub message: &'static str,
    /// The stored record.
    pub data: Contact,
}

/// Body of `/api/contacts/count`.
#[derive(Debug, Serialize)]
pub struct CountResponse {
    /// Always `true`.
    pub success: bool,
    /// Registered contacts, excluding the header row.
    pub count: u64,
}

/// Body of `/api/contacts/sheet-url`.
#[derive(Debug, Serialize)]
pub struct SheetUrlResponse {
    /// Always `true`.
    pub success: bool,
    /// Link to the spreadsheet.
    pub url: String,
}

/// Body of `/health`.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// `OK`.
    pub status: &'static str,
    /// Service banner.
    pub message: &'static str,
    /// Current time, RFC 3339.
    pub timestamp: String,
}

/// Builds the router without middleware.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/contacts", post(create_contact))
        .route("/api/contacts/count", get(count_contacts))
        .route("/api/contacts/sheet-url", get(sheet_url))
        .route("/health", get(health))
        .fallback(not_found)
        .with_state(state)
}

/// `POST /api/contacts`
pub async fn create_contact(
    State(state): State<AppState>,
    payload: std::result::Result<Json<ContactInput>, JsonRejection>,
) -> Result<(StatusCode, Json<CreatedResponse>)> {
    let Json(input) = payload?;
    let contact = state.service.create(&input).await?;
    Ok((
        StatusCode::CREATED,
        Json(CreatedResponse {
            success: true,
            message: "Contact saved successfully",
            data: contact,
        }),
    ))
}

/// `GET /api/contacts/count`
///
/// A backend failure is reported as a count of zero.
pub async fn count_contacts(State(state): State<AppState>) -> Json<CountResponse> {
    let count = state.service.count().await;
    if let Some(reason) = count.reason() {
        tracing::debug!(reason, "Serving fallback count");
    }
    Json(CountResponse {
        success: true,
        count: count.into_value(),
    })
}

/// `GET /api/contacts/sheet-url`
pub async fn sheet_url(State(state): State<AppState>) -> Json<SheetUrlResponse> {
    Json(SheetUrlResponse {
        success: true,
        url: state.service.sheet_url(),
    })
}

/// `GET /health`
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "OK",
        message: HEALTH_MESSAGE,
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    })
}

async fn not_found() -> ApiError {
    ApiError::NotFound
}
