//! The contact record and the field enums used to report on it.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::ids::ContactId;

/// Header labels written to the first row of the contacts tab, in column order.
pub const HEADER_ROW: [&str; 5] = ["ID", "Name", "Email", "Phone Number", "Date & Time"];

/// A submitted field of the registration form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContactField {
    /// Registrant's full name.
    Name,
    /// Registrant's email address.
    Email,
    /// Registrant's phone number.
    Phone,
}

impl ContactField {
    /// Returns the wire name of the field.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Email => "email",
            Self::Phone => "phone",
        }
    }
}

impl fmt::Display for ContactField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The field that matched an existing record during the duplicate scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DuplicateField {
    /// Normalized email matched.
    Email,
    /// Normalized phone matched.
    Phone,
}

impl DuplicateField {
    /// Message reported to the registrant for this collision.
    pub fn message(&self) -> &'static str {
        match self {
            Self::Email => "This email address is already registered",
            Self::Phone => "This phone number is already registered",
        }
    }

    /// Returns the wire name of the field.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::Phone => "phone",
        }
    }
}

impl fmt::Display for DuplicateField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<DuplicateField> for ContactField {
    fn from(field: DuplicateField) -> Self {
        match field {
            DuplicateField::Email => ContactField::Email,
            DuplicateField::Phone => ContactField::Phone,
        }
    }
}

/// A contact record as stored in the spreadsheet.
///
/// Records are immutable once written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    /// Opaque identifier generated at write time.
    pub id: ContactId,
    /// Trimmed name.
    pub name: String,
    /// Trimmed, lower-cased email.
    pub email: String,
    /// Phone with separators stripped.
    pub phone: String,
    /// Human-readable creation time.
    pub timestamp: String,
}

impl Contact {
    /// Returns the record as a spreadsheet row in [`HEADER_ROW`] column order.
    pub fn to_row(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.name.clone(),
            self.email.clone(),
            self.phone.clone(),
            self.timestamp.clone(),
        ]
    }
}
