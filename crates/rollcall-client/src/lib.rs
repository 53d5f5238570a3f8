//! # rollcall-client
//!
//! Client side of Rollcall.
//!
//! - [`RollcallClient`]: `reqwest` client for the HTTP API
//! - [`ContactsApi`]: the operations a form needs, implemented by the client
//!   and by test doubles
//! - [`FormController`]: the registration form's submit state machine
//! - [`spawn_count_poller`]: keeps a running total fresh in the background

#![warn(missing_docs)]
#![warn(clippy::all)]
#![forbid(unsafe_code)]

pub mod api;
pub mod client;
pub mod error;
pub mod form;

pub use api::{ContactsApi, Health, Submission};
pub use client::{DEFAULT_API_URL, RollcallClient};
pub use error::{Error, Result};
pub use form::{
    ContactForm, CountPoller, FieldError, FormController, FormState, Outcome, spawn_count_poller,
};
