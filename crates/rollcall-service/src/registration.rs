//! Validate → dedupe → append.

use std::sync::Arc;

use rollcall_core::ids::timestamp_now;
use rollcall_core::{
    BestEffort, Contact, ContactId, ContactInput, DuplicateField, Error, HEADER_ROW, NewContact,
    Result,
};
use rollcall_sheets::{Rows, SheetRange, SheetStore};
use tokio::sync::Mutex;

/// Default name of the tab holding contacts.
pub const DEFAULT_SHEET_NAME: &str = "Invitees";

const ID_COLUMN: u32 = 0;
const EMAIL_COLUMN: u32 = 2;
const PHONE_COLUMN: u32 = 3;
const LAST_COLUMN: u32 = HEADER_ROW.len() as u32 - 1;

/// Outcome of [`RegistrationService::ensure_headers`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderStatus {
    /// The first row already had content.
    AlreadyPresent,
    /// The header labels were written.
    Written,
    /// The backend failed; nothing was changed.
    Skipped {
        /// Backend error message
        reason: String,
    },
}

/// Registers contacts into one tab of a spreadsheet.
///
/// The duplicate check and the append are separate backend calls. Without
/// [`with_serialized_writes`](Self::with_serialized_writes), two concurrent
/// registrations of the same email or phone can both pass the check.
pub struct RegistrationService {
    store: Arc<dyn SheetStore>,
    spreadsheet_id: String,
    sheet: String,
    write_lock: Option<Mutex<()>>,
}

impl RegistrationService {
    /// Creates a service writing to `sheet` through `store`.
    pub fn new(
        store: Arc<dyn SheetStore>,
        spreadsheet_id: impl Into<String>,
        sheet: impl Into<String>,
    ) -> Self {
        Self {
            store,
            spreadsheet_id: spreadsheet_id.into(),
            sheet: sheet.into(),
            write_lock: None,
        }
    }

    /// Run each check-then-append under a service-wide lock.
    pub fn with_serialized_writes(mut self, enabled: bool) -> Self {
        self.write_lock = enabled.then(|| Mutex::new(()));
        self
    }

    /// Name of the contacts tab.
    pub fn sheet(&self) -> &str {
        &self.sheet
    }

    /// Validates, dedupes, and appends a contact.
    pub async fn create(&self, input: &ContactInput) -> Result<Contact> {
        let contact = input.validate().inspect_err(|e| {
            tracing::info!(error = %e, "Rejected registration");
        })?;

        let _guard = match &self.write_lock {
            Some(lock) => Some(lock.lock().await),
            None => None,
        };

        if let Some(field) = *self.check_duplicate(&contact).await.value() {
            tracing::info!(field = %field, "Duplicate registration");
            return Err(Error::duplicate(field));
        }

        let record = Contact {
            id: ContactId::generate(),
            name: contact.name,
            email: contact.email,
            phone: contact.phone,
            timestamp: timestamp_now(),
        };

        self.store
            .append_rows(&self.record_range(), vec![record.to_row()])
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Error adding contact to spreadsheet");
                Error::backend_with_source(format!("Failed to add contact: {e}"), e)
            })?;

        tracing::info!(
            id = %record.id,
            email = %record.email,
            phone = %record.phone,
            "Contact added"
        );
        Ok(record)
    }

    /// Looks for an existing record with the same email or phone.
    ///
    /// Falls back to "no duplicate" when the backend cannot be read.
    pub async fn check_duplicate(&self, contact: &NewContact) -> BestEffort<Option<DuplicateField>> {
        let range = SheetRange::columns(&self.sheet, EMAIL_COLUMN, PHONE_COLUMN);
        match self.store.read_range(&range).await {
            Ok(rows) => BestEffort::Live(find_duplicate(&rows, contact)),
            Err(e) => {
                tracing::warn!(error = %e, "Duplicate check failed, allowing insert");
                BestEffort::fallback(None, e)
            }
        }
    }

    /// Number of data rows (excluding the header).
    ///
    /// Falls back to zero when the backend cannot be read.
    pub async fn count(&self) -> BestEffort<u64> {
        let range = SheetRange::columns(&self.sheet, ID_COLUMN, ID_COLUMN);
        match self.store.read_range(&range).await {
            Ok(rows) => BestEffort::Live(rows.len().saturating_sub(1) as u64),
            Err(e) => {
                tracing::warn!(error = %e, "Error getting contact count");
                BestEffort::fallback(0, e)
            }
        }
    }

    /// Writes the header row unless the first row already has content.
    ///
    /// Never fails; backend errors are logged and reported as
    /// [`HeaderStatus::Skipped`].
    pub async fn ensure_headers(&self) -> HeaderStatus {
        let range = SheetRange::row(&self.sheet, 1, ID_COLUMN, LAST_COLUMN);

        let existing = match self.store.read_range(&range).await {
            Ok(rows) => rows,
            Err(e) => return skipped(e),
        };
        if !existing.is_empty() {
            tracing::info!(sheet = %self.sheet, "Spreadsheet headers already exist");
            return HeaderStatus::AlreadyPresent;
        }

        let headers: Rows = vec![HEADER_ROW.iter().map(|h| h.to_string()).collect()];
        match self.store.update_range(&range, headers).await {
            Ok(()) => {
                tracing::info!(sheet = %self.sheet, "Spreadsheet initialized with headers");
                HeaderStatus::Written
            }
            Err(e) => skipped(e),
        }
    }

    /// Link to the spreadsheet in the Google Sheets UI.
    pub fn sheet_url(&self) -> String {
        format!(
            "https://docs.google.com/spreadsheets/d/{}",
            self.spreadsheet_id
        )
    }

    fn record_range(&self) -> SheetRange {
        SheetRange::columns(&self.sheet, ID_COLUMN, LAST_COLUMN)
    }
}

fn skipped(e: impl std::fmt::Display) -> HeaderStatus {
    tracing::error!(error = %e, "Error initializing spreadsheet");
    HeaderStatus::Skipped {
        reason: e.to_string(),
    }
}

/// Scans `[email, phone]` rows (header first) in store order.
///
/// Email is compared case-insensitively after trimming; phone must match the
/// normalized value exactly. The first matching row decides the field.
pub fn find_duplicate(rows: &[Vec<String>], contact: &NewContact) -> Option<DuplicateField> {
    rows.iter().skip(1).find_map(|row| {
        let email = row.first().map(String::as_str).unwrap_or_default();
        let phone = row.get(1).map(String::as_str).unwrap_or_default();
        if !email.is_empty() && email.trim().to_lowercase() == contact.email {
            Some(DuplicateField::Email)
        } else if !phone.is_empty() && phone == contact.phone {
            Some(DuplicateField::Phone)
        } else {
            None
        }
    })
}
