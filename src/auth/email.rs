use std::fmt::Display;

use serde::Serialize;

use crate::Error;

/// A normalised email address: trimmed and lowercase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Email(String);

impl Email {
    /// Create and validate an email address.
    ///
    /// # Errors
    ///
    /// Returns [Error::InvalidEmail] if `raw_email` does not have a non-empty
    /// part on each side of a single `@`.
    pub fn new(raw_email: &str) -> Result<Self, Error> {
        let email = raw_email.trim().to_lowercase();

        match email.split_once('@') {
            Some((local, domain))
                if !local.is_empty() && !domain.is_empty() && !domain.contains('@') =>
            {
                Ok(Self(email))
            }
            _ => Err(Error::InvalidEmail(raw_email.to_owned())),
        }
    }

    /// Create a new `Email` without any validation.
    ///
    /// Use for values read back from the database, never for user input.
    pub fn new_unchecked(raw_email: String) -> Self {
        Self(raw_email)
    }

    /// The email address as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for Email {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
