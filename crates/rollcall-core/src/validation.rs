//! Server-side validation of submitted contact fields.

use serde::{Deserialize, Deserializer, Serialize};

use crate::contact::ContactField;
use crate::normalize::{MIN_PHONE_LEN, is_valid_email, normalize_email, normalize_phone};
use crate::{Error, Result};

/// Raw fields as submitted by a registrant.
///
/// Missing and `null` fields deserialize as empty strings so they fail
/// validation with the same message as blank ones.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactInput {
    /// Full name.
    #[serde(deserialize_with = "null_as_empty")]
    pub name: String,
    /// Email address.
    #[serde(deserialize_with = "null_as_empty")]
    pub email: String,
    /// Phone number.
    #[serde(deserialize_with = "null_as_empty")]
    pub phone: String,
}

fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

impl ContactInput {
    /// Creates an input from the three form fields.
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        phone: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            phone: phone.into(),
        }
    }

    /// Validates the input and returns its normalized form.
    ///
    /// Checks run in field order and the first failure is returned.
    pub fn validate(&self) -> Result<NewContact> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(Error::validation_field(
                ContactField::Name,
                "Name is required",
            ));
        }

        if self.email.trim().is_empty() {
            return Err(Error::validation_field(
                ContactField::Email,
                "Email address is required",
            ));
        }
        if !is_valid_email(&self.email) {
            return Err(Error::validation_field(
                ContactField::Email,
                "Invalid email address",
            ));
        }

        if self.phone.trim().is_empty() {
            return Err(Error::validation_field(
                ContactField::Phone,
                "Phone number is required",
            ));
        }
        let phone = normalize_phone(&self.phone);
        if phone.chars().count() < MIN_PHONE_LEN {
            return Err(Error::validation_field(
                ContactField::Phone,
                "Phone number must be at least 10 digits",
            ));
        }

        Ok(NewContact {
            name: name.to_string(),
            email: normalize_email(&self.email),
            phone,
        })
    }
}

/// A validated, normalized contact that has not been written yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewContact {
    /// Trimmed name.
    pub name: String,
    /// Normalized email.
    pub email: String,
    /// Normalized phone.
    pub phone: String,
}
