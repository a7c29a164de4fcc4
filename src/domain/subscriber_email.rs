use serde::Serialize;
use validator::ValidateEmail;

use super::ValidationError;

/// An email address collected at the first step of the signup form. Can only
/// be obtained through `parse`, so holding one means the address already has a
/// valid shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubscriberEmail(String);

impl SubscriberEmail {
    /// Surrounding whitespace is dropped before validation; the address itself
    /// is kept as typed (no case folding, the backend owns normalisation).
    pub fn parse(email: &str) -> Result<Self, ValidationError> {
        let email = email.trim().to_owned();
        // `ValidateEmail` already rejects addresses without `@`, the explicit
        // check just keeps the cheap case cheap
        match email.contains('@') && ValidateEmail::validate_email(&email) {
            true => Ok(Self(email)),
            false => Err(ValidationError::InvalidEmail),
        }
    }
}

impl AsRef<str> for SubscriberEmail {
    fn as_ref(&self) -> &str { &self.0 }
}

impl std::fmt::Display for SubscriberEmail {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        self.0.fmt(f)
    }
}
