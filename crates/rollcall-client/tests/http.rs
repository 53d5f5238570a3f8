//! `RollcallClient` against a live server backed by an in-memory store.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use rollcall_api::{AppState, routes};
use rollcall_client::{
    ContactForm, ContactsApi, Error, FormController, Outcome, RollcallClient, Submission,
};
use rollcall_core::{ContactInput, DuplicateField, HEADER_ROW};
use rollcall_service::RegistrationService;
use rollcall_sheets::MemorySheetStore;
use tokio::net::TcpListener;

const SHEET: &str = "Invitees";

async fn spawn_server(store: Arc<MemorySheetStore>) -> String {
    let service = RegistrationService::new(store, "sheet-123", SHEET);
    let app = routes::router(AppState::new(service));
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

fn store() -> Arc<MemorySheetStore> {
    let header = HEADER_ROW.iter().map(|h| h.to_string()).collect();
    Arc::new(MemorySheetStore::new().with_rows(SHEET, vec![header]))
}

/// A base URL nothing listens on.
async fn dead_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

#[tokio::test]
async fn test_submit_created_then_duplicate() {
    let client = RollcallClient::new(&spawn_server(store()).await).unwrap();

    let first = client
        .submit(&ContactInput::new("John Doe", "JOHN@Example.com", "080-123-4567 "))
        .await
        .unwrap();
    match first {
        Submission::Created(contact) => assert_eq!(contact.email, "john@example.com"),
        other => unreachable!("expected created, got {other:?}"),
    }

    let second = client
        .submit(&ContactInput::new("Jane", "jane@example.com", "(080) 123 4567"))
        .await
        .unwrap();
    assert_eq!(
        second,
        Submission::Duplicate {
            field: Some(DuplicateField::Phone),
            message: Some("This phone number is already registered".to_string()),
        }
    );
}

#[tokio::test]
async fn test_submit_invalid_is_rejected_with_message() {
    let client = RollcallClient::new(&spawn_server(store()).await).unwrap();

    let reply = client
        .submit(&ContactInput::new("Ada", "ada@example.com", "123"))
        .await
        .unwrap();

    assert_eq!(
        reply,
        Submission::Rejected {
            status: 400,
            message: Some("Phone number must be at least 10 digits".to_string()),
        }
    );
}

#[tokio::test]
async fn test_count_sheet_url_and_health() {
    let store = store();
    let client = RollcallClient::new(&spawn_server(store.clone()).await).unwrap();

    assert_eq!(client.count().await.unwrap(), 0);
    client
        .submit(&ContactInput::new("Ada", "ada@example.com", "0801234567"))
        .await
        .unwrap();
    assert_eq!(client.count().await.unwrap(), 1);

    assert_eq!(
        client.sheet_url().await.unwrap(),
        "https://docs.google.com/spreadsheets/d/sheet-123"
    );

    let health = client.health().await.unwrap();
    assert_eq!(health.status, "OK");
    assert_eq!(health.message, "Rollcall API is running");
}

#[tokio::test]
async fn test_unreachable_server_is_network_error() {
    let client = RollcallClient::new(&dead_url().await).unwrap();

    let err = client.count().await.unwrap_err();

    assert!(matches!(err, Error::Http(_)));
    assert!(err.is_network());
}

#[tokio::test]
async fn test_form_round_trip_over_http() {
    let client = RollcallClient::new(&spawn_server(store()).await).unwrap();
    let mut form = FormController::new(Arc::new(client));

    *form.form_mut() = ContactForm::new("John Doe", "john@example.com", "0801234567");
    assert!(form.submit().await.unwrap().is_success());
    assert_eq!(form.total_count(), Some(1));

    *form.form_mut() = ContactForm::new("John", "JOHN@example.com", "0800000000");
    assert_eq!(
        form.submit().await.unwrap(),
        Outcome::Duplicate {
            field: Some(DuplicateField::Email),
            message: "This email address is already registered".to_string(),
        }
    );
}

#[tokio::test]
async fn test_form_reports_unreachable_server() {
    let client = RollcallClient::new(&dead_url().await).unwrap();
    let mut form = FormController::new(Arc::new(client));
    *form.form_mut() = ContactForm::new("Ada", "ada@example.com", "0801234567");

    let outcome = form.submit().await.unwrap();

    assert_eq!(
        outcome.message(),
        "Unable to connect to the server. Please try again."
    );
}
