//! Integration tests for the registration service over an in-memory store.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

mod common;

use std::time::Duration;

use rollcall_core::{ContactField, ContactInput, DuplicateField, Error};
use rollcall_service::HeaderStatus;

use common::{TestHarness, header, record};

fn john() -> ContactInput {
    ContactInput::new("John Doe", "JOHN@Example.com", "080-123-4567 ")
}

// ============================================================================
// create
// ============================================================================

#[tokio::test]
async fn test_create_appends_normalized_row() {
    let harness = TestHarness::with_header();

    let contact = harness.service.create(&john()).await.unwrap();

    assert_eq!(contact.name, "John Doe");
    assert_eq!(contact.email, "john@example.com");
    assert_eq!(contact.phone, "0801234567");

    let grid = harness.grid();
    assert_eq!(grid.len(), 2);
    assert_eq!(grid[0], header());
    assert_eq!(grid[1], contact.to_row());
}

#[tokio::test]
async fn test_create_on_empty_sheet() {
    let harness = TestHarness::empty();
    harness.service.create(&john()).await.unwrap();
    assert_eq!(harness.grid().len(), 1);
}

#[tokio::test]
async fn test_resubmitting_same_email_is_duplicate_email() {
    let harness = TestHarness::with_header();
    harness.service.create(&john()).await.unwrap();

    let err = harness
        .service
        .create(&ContactInput::new("Jane", "john@example.com", "0809999999"))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        Error::Duplicate {
            field: DuplicateField::Email
        }
    ));
    assert_eq!(harness.grid().len(), 2, "duplicate must not be appended");
}

#[tokio::test]
async fn test_resubmitting_same_phone_is_duplicate_phone() {
    let harness = TestHarness::with_header();
    harness.service.create(&john()).await.unwrap();

    let err = harness
        .service
        .create(&ContactInput::new("Jane", "jane@example.com", "(080) 123 4567"))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        Error::Duplicate {
            field: DuplicateField::Phone
        }
    ));
}

#[tokio::test]
async fn test_existing_rows_are_scanned_in_store_order() {
    let harness = TestHarness::with_rows(vec![
        record("1", "Bob", "bob@example.com", "0801234567"),
        record("2", "Ada", "ada@example.com", "0805555555"),
    ]);

    let err = harness
        .service
        .create(&ContactInput::new("Ada", "ada@example.com", "0801234567"))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        Error::Duplicate {
            field: DuplicateField::Phone
        }
    ));
}

#[tokio::test]
async fn test_short_phone_is_rejected_without_touching_the_store() {
    let harness = TestHarness::with_header();

    let err = harness
        .service
        .create(&ContactInput::new("John", "john@example.com", "080-123-456"))
        .await
        .unwrap_err();

    match err {
        Error::Validation { field, message } => {
            assert_eq!(field, ContactField::Phone);
            assert_eq!(message, "Phone number must be at least 10 digits");
        }
        other => unreachable!("expected validation error, got {other:?}"),
    }
    assert_eq!(harness.store.read_count(), 0);
    assert_eq!(harness.store.append_count(), 0);
}

#[tokio::test]
async fn test_failed_duplicate_check_allows_insert() {
    let harness = TestHarness::with_rows(vec![record("1", "John", "john@example.com", "0801234567")]);
    harness.store.fail_reads(true);

    let contact = harness.service.create(&john()).await.unwrap();

    assert_eq!(contact.email, "john@example.com");
    assert_eq!(harness.grid().len(), 3, "availability wins over uniqueness");
}

#[tokio::test]
async fn test_check_duplicate_reports_fallback() {
    let harness = TestHarness::with_header();
    harness.store.fail_reads(true);

    let contact = john().validate().unwrap();
    let check = harness.service.check_duplicate(&contact).await;

    assert!(check.is_fallback());
    assert_eq!(*check.value(), None);
    assert!(check.reason().unwrap().contains("read failure injected"));
}

#[tokio::test]
async fn test_failed_append_is_backend_error() {
    let harness = TestHarness::with_header();
    harness.store.fail_writes(true);

    let err = harness.service.create(&john()).await.unwrap_err();

    assert!(matches!(err, Error::Backend { .. }));
    assert!(err.to_string().contains("Failed to add contact"));
    assert_eq!(harness.store.append_count(), 1, "no internal retry");
}

// ============================================================================
// count
// ============================================================================

#[tokio::test]
async fn test_count_of_empty_store_is_zero() {
    let harness = TestHarness::empty();
    let count = harness.service.count().await;
    assert_eq!(count.into_value(), 0);
}

#[tokio::test]
async fn test_count_of_header_only_is_zero() {
    let harness = TestHarness::with_header();
    let count = harness.service.count().await;
    assert!(!count.is_fallback());
    assert_eq!(*count.value(), 0);
}

#[tokio::test]
async fn test_count_excludes_header() {
    let harness = TestHarness::with_rows(vec![
        record("1", "A", "a@example.com", "0800000001"),
        record("2", "B", "b@example.com", "0800000002"),
        record("3", "C", "c@example.com", "0800000003"),
    ]);
    assert_eq!(harness.service.count().await.into_value(), 3);
}

#[tokio::test]
async fn test_count_falls_back_to_zero() {
    let harness = TestHarness::with_rows(vec![record("1", "A", "a@example.com", "0800000001")]);
    harness.store.fail_reads(true);

    let count = harness.service.count().await;

    assert!(count.is_fallback());
    assert_eq!(count.into_value(), 0);
}

#[tokio::test]
async fn test_count_tracks_creates() {
    let harness = TestHarness::with_header();
    harness.service.create(&john()).await.unwrap();
    harness
        .service
        .create(&ContactInput::new("Jane", "jane@example.com", "0807654321"))
        .await
        .unwrap();
    assert_eq!(harness.service.count().await.into_value(), 2);
}

// ============================================================================
// ensure_headers
// ============================================================================

#[tokio::test]
async fn test_ensure_headers_writes_once() {
    let harness = TestHarness::empty();

    assert_eq!(harness.service.ensure_headers().await, HeaderStatus::Written);
    assert_eq!(harness.grid(), vec![header()]);

    assert_eq!(
        harness.service.ensure_headers().await,
        HeaderStatus::AlreadyPresent
    );
    assert_eq!(harness.grid(), vec![header()]);
}

#[tokio::test]
async fn test_ensure_headers_leaves_existing_first_row_alone() {
    let harness = TestHarness::with_store(
        rollcall_sheets::MemorySheetStore::new()
            .with_rows(common::SHEET, vec![vec!["custom".to_string()]]),
    );
    assert_eq!(
        harness.service.ensure_headers().await,
        HeaderStatus::AlreadyPresent
    );
    assert_eq!(harness.grid(), vec![vec!["custom".to_string()]]);
}

#[tokio::test]
async fn test_ensure_headers_never_fails() {
    let harness = TestHarness::empty();
    harness.store.fail_reads(true);
    assert!(matches!(
        harness.service.ensure_headers().await,
        HeaderStatus::Skipped { .. }
    ));

    harness.store.fail_reads(false);
    harness.store.fail_writes(true);
    assert!(matches!(
        harness.service.ensure_headers().await,
        HeaderStatus::Skipped { .. }
    ));
    assert!(harness.grid().is_empty());
}

#[tokio::test]
async fn test_ensure_headers_then_create_lands_on_row_two() {
    let harness = TestHarness::empty();
    harness.service.ensure_headers().await;
    let contact = harness.service.create(&john()).await.unwrap();
    assert_eq!(harness.grid(), vec![header(), contact.to_row()]);
}

// ============================================================================
// sheet_url
// ============================================================================

#[test]
fn test_sheet_url() {
    let harness = TestHarness::empty();
    assert_eq!(
        harness.service.sheet_url(),
        "https://docs.google.com/spreadsheets/d/sheet-123"
    );
}

// ============================================================================
// Duplicate-check race
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_concurrent_creates_can_both_pass_duplicate_check() {
    let harness = TestHarness::with_read_delay(Duration::from_millis(100));
    let first_input = john();
    let second_input = ContactInput::new("John D.", "john@example.com", "0801234567");

    let (first, second) = tokio::join!(
        harness.service.create(&first_input),
        harness.service.create(&second_input),
    );

    assert!(first.is_ok(), "first create failed: {first:?}");
    assert!(second.is_ok(), "second create failed: {second:?}");
    let grid = harness.grid();
    assert_eq!(grid.len(), 3, "both rows were appended");
    assert_eq!(grid[1][2], grid[2][2]);
}

#[tokio::test(start_paused = true)]
async fn test_serialized_writes_close_the_race() {
    let harness = TestHarness::with_read_delay(Duration::from_millis(100)).serialized();
    let first_input = john();
    let second_input = ContactInput::new("John D.", "john@example.com", "0801234567");

    let (first, second) = tokio::join!(
        harness.service.create(&first_input),
        harness.service.create(&second_input),
    );

    assert!(first.is_ok(), "first create failed: {first:?}");
    assert!(
        matches!(
            second,
            Err(Error::Duplicate {
                field: DuplicateField::Email
            })
        ),
        "second create should be a duplicate, got {second:?}"
    );
    assert_eq!(harness.grid().len(), 2);
}
