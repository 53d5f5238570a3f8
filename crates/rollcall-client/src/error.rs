//! Error types for rollcall-client

use thiserror::Error;

/// Result type alias for rollcall-client operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in rollcall-client
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// The server could not be reached
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success status
    #[error("Server returned {status}: {message}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Server message, or the status reason
        message: String,
    },

    /// The response body did not have the expected shape
    #[error("Unexpected response: {0}")]
    Decode(String),

    /// The base URL could not be used
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl Error {
    /// Whether the request never produced an HTTP response.
    pub fn is_network(&self) -> bool {
        match self {
            Error::Http(e) => !e.is_status() && !e.is_decode(),
            _ => false,
        }
    }
}
