mod new_subscriber;
mod signup_draft;
mod subscriber_email;
mod subscriber_name;
mod validation_error;
// allow external `use` statements to skip `new_subscriber` etc
pub use new_subscriber::NewSubscriber;
pub use signup_draft::SignupDraft;
pub use subscriber_email::SubscriberEmail;
pub use subscriber_name::SubscriberName;
pub use validation_error::ValidationError;
