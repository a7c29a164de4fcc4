/// Local, per-step validation failure. Never leaves the device; the `Display`
/// text is shown inline under the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Please enter a valid email address")]
    InvalidEmail,
    #[error("Please enter your name")]
    MissingName,
}
