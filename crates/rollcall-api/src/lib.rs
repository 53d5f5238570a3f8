//! # rollcall-api
//!
//! HTTP API server for Rollcall.
//!
//! This crate provides:
//! - JSON routes for registering contacts, counting them, and linking the sheet
//! - Error envelopes mapping validation, duplicate, and backend failures
//! - Layered server configuration (TOML file, environment, flags)
//! - CORS and request tracing middleware

#![warn(missing_docs)]
#![warn(clippy::all)]
#![forbid(unsafe_code)]

pub mod config;
pub mod cors;
pub mod error;
pub mod routes;
pub mod server;

pub use config::{Backend, GoogleConfig, ServerConfig};
pub use cors::OriginRule;
pub use error::{ApiError, Result};
pub use routes::AppState;
pub use server::Server;
