/// What the form has collected so far. Filled one field per step, and only
/// with values that passed that step's validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignupDraft {
    email: String,
    name: String,
}

impl SignupDraft {
    pub fn email(&self) -> &str { &self.email }

    pub fn name(&self) -> &str { &self.name }

    pub fn set_email(
        &mut self,
        email: &str,
    ) {
        self.email = email.to_owned();
    }

    pub fn set_name(
        &mut self,
        name: &str,
    ) {
        self.name = name.to_owned();
    }

    pub fn is_empty(&self) -> bool { self.email.is_empty() && self.name.is_empty() }

    pub fn clear(&mut self) { *self = Self::default(); }
}
