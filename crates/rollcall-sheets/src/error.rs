//! Spreadsheet backend error types.

/// Result type alias for spreadsheet store operations.
pub type Result<T> = std::result::Result<T, SheetError>;

/// Errors that can occur talking to a spreadsheet store.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum SheetError {
    /// Transport-level failure (DNS, TLS, connection reset, body decode).
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The Sheets API answered with a non-success status.
    #[error("Sheets API returned HTTP {status}: {body}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body, as returned
        body: String,
    },

    /// The response body did not have the expected shape.
    #[error("malformed response: {0}")]
    Malformed(String),

    /// A range was not valid A1 notation.
    #[error("invalid range '{0}'")]
    InvalidRange(String),

    /// The range names a tab the store does not have.
    #[error("unknown sheet '{0}'")]
    UnknownSheet(String),

    /// Credentials are missing or unusable.
    #[error("credentials error: {0}")]
    Credentials(String),

    /// The OAuth token exchange failed.
    #[error("token exchange failed: {0}")]
    Token(String),

    /// The store refused the operation (used by the in-memory store).
    #[error("backend unavailable: {0}")]
    Unavailable(String),
}

impl From<SheetError> for rollcall_core::Error {
    fn from(err: SheetError) -> Self {
        rollcall_core::Error::backend_with_source(err.to_string(), err)
    }
}
