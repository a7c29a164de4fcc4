use serde::Serialize;

use super::SignupDraft;
use super::SubscriberEmail;
use super::SubscriberName;
use super::ValidationError;

/// The payload sent to the subscription endpoint. Both fields are parsed, so
/// a `NewSubscriber` can never be built from a half-filled draft.
///
/// Serializes to `{"name": ..., "email": ...}`; the newtypes serialize as their
/// inner string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewSubscriber {
    pub name: SubscriberName,
    pub email: SubscriberEmail,
}

// same idea as parsing a submitted form: unstructured strings go in, a struct
// that is correct by construction comes out
impl TryFrom<&SignupDraft> for NewSubscriber {
    type Error = ValidationError;
    fn try_from(draft: &SignupDraft) -> Result<Self, Self::Error> {
        let email = SubscriberEmail::parse(draft.email())?;
        let name = SubscriberName::parse(draft.name())?;
        Ok(Self { name, email })
    }
}
