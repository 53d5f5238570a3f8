#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! Rollcall Registration Service
//!
//! Validates submissions, checks the spreadsheet for an existing email or
//! phone, and appends new contacts. The spreadsheet store is passed in at
//! construction, so tests run against [`rollcall_sheets::MemorySheetStore`].

pub mod registration;

pub use registration::{DEFAULT_SHEET_NAME, HeaderStatus, RegistrationService, find_duplicate};

// Re-export core types
pub use rollcall_core::{Error, Result};
