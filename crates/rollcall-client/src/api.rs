//! The operations a form needs from the Rollcall API.

use async_trait::async_trait;
use rollcall_core::{Contact, ContactInput, DuplicateField};
use serde::{Deserialize, Serialize};

use crate::Result;

/// Server answer to a registration attempt.
///
/// Only transport failures are errors; every HTTP response maps to a variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    /// 2xx with `success: true`.
    Created(Contact),
    /// 409 with `duplicate: true`.
    Duplicate {
        /// Colliding field, when the server named one.
        field: Option<DuplicateField>,
        /// Server message, if any.
        message: Option<String>,
    },
    /// Any other response.
    Rejected {
        /// HTTP status code.
        status: u16,
        /// Server message, if any.
        message: Option<String>,
    },
}

/// Body of `/health`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Health {
    /// `OK` when the server is up.
    pub status: String,
    /// Service banner.
    pub message: String,
    /// Server time, RFC 3339.
    pub timestamp: String,
}

/// Remote contact registration.
#[async_trait]
pub trait ContactsApi: Send + Sync {
    /// Submits a registration.
    async fn submit(&self, input: &ContactInput) -> Result<Submission>;

    /// Number of registered contacts.
    async fn count(&self) -> Result<u64>;

    /// Link to the backing spreadsheet.
    async fn sheet_url(&self) -> Result<String>;

    /// Server liveness.
    async fn health(&self) -> Result<Health>;
}
