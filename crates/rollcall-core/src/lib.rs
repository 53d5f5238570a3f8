#![doc = include_str!("../README.md")]
#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! Rollcall Core Library
//!
//! Contact types, normalization, and validation shared by the registration
//! service, the HTTP API, and the form client.

pub mod best_effort;
pub mod contact;
pub mod error;
pub mod ids;
pub mod normalize;
pub mod validation;

mod proptests;

// Re-exports for convenience
pub use best_effort::BestEffort;
pub use contact::{Contact, ContactField, DuplicateField, HEADER_ROW};
pub use error::{Error, Result};
pub use ids::ContactId;
pub use normalize::{is_valid_email, normalize_email, normalize_phone};
pub use validation::{ContactInput, NewContact};
