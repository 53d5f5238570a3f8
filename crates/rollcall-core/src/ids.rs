//! Contact identifiers and record timestamps.

use chrono::{DateTime, Local, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Display format for the `timestamp` column, e.g. `01/11/2026, 10:30:00 AM`.
pub const TIMESTAMP_FORMAT: &str = "%m/%d/%Y, %I:%M:%S %p";

/// Opaque identifier of a contact record.
///
/// Derived from the wall-clock time in milliseconds at write time. Two
/// records written in the same millisecond share an id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContactId(String);

impl ContactId {
    /// Creates an id from the current time.
    pub fn generate() -> Self {
        Self::from_millis(Utc::now().timestamp_millis())
    }

    /// Creates an id from a Unix timestamp in milliseconds.
    pub fn from_millis(millis: i64) -> Self {
        Self(millis.to_string())
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for ContactId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Formats a point in time for the `timestamp` column.
pub fn format_timestamp<Tz: TimeZone>(at: &DateTime<Tz>) -> String
where
    Tz::Offset: fmt::Display,
{
    at.format(TIMESTAMP_FORMAT).to_string()
}

/// The current local time, formatted for the `timestamp` column.
pub fn timestamp_now() -> String {
    format_timestamp(&Local::now())
}
