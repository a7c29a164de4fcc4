use serde::Serialize;

use super::ValidationError;

/// The name collected at the second step of the signup form.
///
/// Must be instantiated with `SubscriberName::parse`, which trims the input and
/// rejects what is left if it is empty. The field is left private, to prevent
/// bypassing of `parse`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubscriberName(String);

impl SubscriberName {
    pub fn parse(name: &str) -> Result<Self, ValidationError> {
        let name = name.trim();
        match name.is_empty() {
            false => Ok(Self(name.to_owned())),
            true => Err(ValidationError::MissingName),
        }
    }
}

impl AsRef<str> for SubscriberName {
    fn as_ref(&self) -> &str { &self.0 }
}

impl std::fmt::Display for SubscriberName {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        self.0.fmt(f)
    }
}
