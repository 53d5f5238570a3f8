//! Common test utilities for registration service integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use rollcall_core::HEADER_ROW;
use rollcall_service::RegistrationService;
use rollcall_sheets::{MemorySheetStore, Rows};

/// Tab used by every test.
pub const SHEET: &str = "Invitees";

/// Test harness for integration tests.
///
/// Holds the in-memory store alongside the service so tests can inspect
/// the grid and inject failures.
pub struct TestHarness {
    /// Backing store
    pub store: Arc<MemorySheetStore>,
    /// Service under test
    pub service: RegistrationService,
}

impl TestHarness {
    /// A store whose contacts tab is completely empty.
    pub fn empty() -> Self {
        Self::with_store(MemorySheetStore::new().with_sheet(SHEET))
    }

    /// A store whose contacts tab holds only the header row.
    pub fn with_header() -> Self {
        Self::with_rows(Vec::new())
    }

    /// A store holding the header row followed by `rows`.
    pub fn with_rows(rows: Rows) -> Self {
        let mut grid = vec![header()];
        grid.extend(rows);
        Self::with_store(MemorySheetStore::new().with_rows(SHEET, grid))
    }

    /// A header-only store whose reads take `delay`.
    pub fn with_read_delay(delay: Duration) -> Self {
        Self::with_store(
            MemorySheetStore::new()
                .with_rows(SHEET, vec![header()])
                .with_read_delay(delay),
        )
    }

    /// Wrap an already configured store.
    pub fn with_store(store: MemorySheetStore) -> Self {
        let store = Arc::new(store);
        let service = RegistrationService::new(store.clone(), "sheet-123", SHEET);
        Self { store, service }
    }

    /// Serialize check-then-append on the harness's service.
    pub fn serialized(self) -> Self {
        Self {
            service: self.service.with_serialized_writes(true),
            store: self.store,
        }
    }

    /// Current grid of the contacts tab.
    pub fn grid(&self) -> Rows {
        self.store.rows(SHEET).unwrap_or_default()
    }
}

/// The header row as stored.
pub fn header() -> Vec<String> {
    HEADER_ROW.iter().map(|h| h.to_string()).collect()
}

/// A stored data row with the given email and phone.
pub fn record(id: &str, name: &str, email: &str, phone: &str) -> Vec<String> {
    vec![
        id.to_string(),
        name.to_string(),
        email.to_string(),
        phone.to_string(),
        "01/11/2026, 10:30:00 AM".to_string(),
    ]
}
