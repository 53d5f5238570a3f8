//! Spreadsheet storage for Rollcall.
//!
//! Provides:
//! - [`SheetStore`]: async range read / append / update, the only contract
//!   the registration service relies on
//! - [`SheetRange`]: A1-notation ranges
//! - [`GoogleSheetsStore`]: Sheets API v4 over `reqwest`
//! - [`MemorySheetStore`]: in-process store with injectable latency and failures
//! - [`Credentials`]: service account or API key authorization

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod auth;
pub mod error;
pub mod google;
pub mod memory;
pub mod range;
pub mod store;

pub use auth::{Credentials, ServiceAccountKey, TokenSource};
pub use error::{Result, SheetError};
pub use google::GoogleSheetsStore;
pub use memory::MemorySheetStore;
pub use range::SheetRange;
pub use store::{Rows, SheetStore};
