use std::pin::Pin;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::Sleep;
use tracing::Instrument;
use uuid::Uuid;

use crate::domain::NewSubscriber;
use crate::domain::SignupDraft;
use crate::domain::SubscriberEmail;
use crate::domain::SubscriberName;
use crate::domain::ValidationError;
use crate::subscription_client::SubmissionError;
use crate::subscription_client::SubmissionResult;
use crate::subscription_client::SubscriptionClient;
use crate::subscription_client::DEFAULT_SUCCESS_MESSAGE;

/// Shown instead of the backend's message when the address was already on the
/// list. Not an error: the flow still completes.
pub const ALREADY_SIGNED_UP_MESSAGE: &str = "You have already signed up for the waiting list!";

/// Which field the form is currently collecting. Always advances in the same
/// order: `Email -> Name -> Submitted -> Email`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowState {
    Email,
    Name,
    /// Signup went through; input stays disabled until the reset timer fires
    Submitted,
}

impl FlowState {
    pub fn placeholder(self) -> Option<&'static str> {
        match self {
            FlowState::Email => Some("Enter your email"),
            FlowState::Name => Some("What's your name?"),
            FlowState::Submitted => None,
        }
    }

    pub fn submit_label(self) -> &'static str {
        match self {
            FlowState::Email => "Next",
            FlowState::Name => "Join Waitlist",
            FlowState::Submitted => "Joined!",
        }
    }

    pub fn hint(self) -> Option<&'static str> {
        match self {
            FlowState::Email => Some("Join the waitlist"),
            _ => None,
        }
    }
}

/// The inline message under the input. At most one is shown at a time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormMessage {
    Error(String),
    Info(String),
    Success(String),
}

impl FormMessage {
    pub fn text(&self) -> &str {
        match self {
            FormMessage::Error(s) | FormMessage::Info(s) | FormMessage::Success(s) => s,
        }
    }

    pub fn is_error(&self) -> bool { matches!(self, FormMessage::Error(_)) }
}

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum FormError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("The form is not accepting input right now")]
    InputDisabled,
    #[error("There is no signup to retry")]
    NothingToRetry,
}

/// Everything a host needs to draw the form, borrowed from the form itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormView<'a> {
    pub step: FlowState,
    pub placeholder: Option<&'static str>,
    pub submit_label: &'static str,
    pub input_disabled: bool,
    pub message: Option<&'a FormMessage>,
    pub hint: Option<&'static str>,
}

type Submission = JoinHandle<Result<SubmissionResult, SubmissionError>>;

/// A single waitlist signup form: collects an email, then a name, then submits
/// both and shows the outcome.
///
/// The form never blocks. `submit` validates and, on the last step, spawns the
/// network call as a task; `next_update` is where the host waits for that task
/// (or the reset timer) and lets the form apply the result. A host typically
/// runs both inside a `tokio::select!` loop together with its input source.
///
/// Ownership is the lifetime: the reset timer lives inside the form and dies
/// with it, and an in-flight submission is detached on drop, so its outcome is
/// discarded rather than applied to a form that no longer exists.
#[derive(Debug)]
pub struct SignupForm {
    id: Uuid,
    client: SubscriptionClient,
    reset_delay: Duration,
    step: FlowState,
    draft: SignupDraft,
    message: Option<FormMessage>,
    submission: Option<Submission>,
    reset_timer: Option<Pin<Box<Sleep>>>,
}

impl SignupForm {
    pub fn new(
        client: SubscriptionClient,
        reset_delay: Duration,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            client,
            reset_delay,
            step: FlowState::Email,
            draft: SignupDraft::default(),
            message: None,
            submission: None,
            reset_timer: None,
        }
    }

    pub fn id(&self) -> Uuid { self.id }

    pub fn step(&self) -> FlowState { self.step }

    pub fn draft(&self) -> &SignupDraft { &self.draft }

    pub fn message(&self) -> Option<&FormMessage> { self.message.as_ref() }

    pub fn is_submitting(&self) -> bool { self.submission.is_some() }

    pub fn is_input_disabled(&self) -> bool {
        self.is_submitting() || self.step == FlowState::Submitted
    }

    pub fn view(&self) -> FormView<'_> {
        FormView {
            step: self.step,
            placeholder: self.step.placeholder(),
            submit_label: match self.is_submitting() {
                true => "Submitting...",
                false => self.step.submit_label(),
            },
            input_disabled: self.is_input_disabled(),
            message: self.message.as_ref(),
            hint: self.step.hint(),
        }
    }

    /// Submit `input` for the current step.
    ///
    /// - `Email`: a valid address is stored and the form moves to `Name`.
    /// - `Name`: a non-blank name is stored and the submission is started; the
    ///   step only changes once `next_update` sees the outcome.
    ///
    /// Invalid input leaves the step alone and sets an error message. While a
    /// submission is in flight, or after a successful one, input is refused
    /// with `FormError::InputDisabled`.
    ///
    /// # Panics
    ///
    /// A valid name spawns the submission onto the current Tokio runtime, so on
    /// the `Name` step this must be called from within one. The `Email` step
    /// never touches the runtime.
    #[tracing::instrument(
        name = "Submitting signup form step",
        skip(self, input),
        fields(form_id = %self.id, step = ?self.step)
    )]
    pub fn submit(
        &mut self,
        input: &str,
    ) -> Result<FlowState, FormError> {
        if self.is_input_disabled() {
            return Err(FormError::InputDisabled);
        }
        self.message = None;

        let parsed = match self.step {
            FlowState::Email => SubscriberEmail::parse(input).map(|email| self.accept_email(email)),
            FlowState::Name => {
                SubscriberName::parse(input).and_then(|name| self.start_submission(name))
            }
            FlowState::Submitted => return Err(FormError::InputDisabled),
        };

        if let Err(e) = parsed {
            tracing::info!(reason = %e, "input rejected");
            self.message = Some(FormMessage::Error(e.to_string()));
            return Err(e.into());
        }
        Ok(self.step)
    }

    /// Resubmit the name kept from a failed attempt, without typing it again.
    ///
    /// # Panics
    ///
    /// Like `submit` on the `Name` step, when called outside a Tokio runtime.
    pub fn retry(&mut self) -> Result<FlowState, FormError> {
        if self.is_input_disabled() {
            return Err(FormError::InputDisabled);
        }
        if self.step != FlowState::Name || self.draft.name().is_empty() {
            return Err(FormError::NothingToRetry);
        }
        let name = self.draft.name().to_owned();
        self.submit(&name)
    }

    /// Go back to an empty `Email` step, cancelling the reset timer if it is
    /// armed. Has no effect while a submission is in flight.
    pub fn reset(&mut self) {
        if self.is_submitting() {
            tracing::debug!(form_id = %self.id, "ignoring reset while submitting");
            return;
        }
        self.reset_timer = None;
        self.step = FlowState::Email;
        self.draft.clear();
        self.message = None;
    }

    /// Wait for the in-flight submission, or failing that the reset timer, and
    /// apply it. Returns the step afterwards, or `None` straight away if there
    /// is nothing to wait for.
    ///
    /// Cancel safe: if the returned future is dropped before it completes, the
    /// pending event stays pending.
    pub async fn next_update(&mut self) -> Option<FlowState> {
        if let Some(submission) = self.submission.as_mut() {
            let outcome = match submission.await {
                Ok(outcome) => outcome,
                Err(e) => Err(SubmissionError::Unexpected(
                    anyhow::Error::new(e).context("submission task did not complete"),
                )),
            };
            self.submission = None;
            self.finish_submission(outcome);
            return Some(self.step);
        }

        if let Some(timer) = self.reset_timer.as_mut() {
            timer.await;
            tracing::info!(form_id = %self.id, "resetting form");
            self.reset();
            return Some(self.step);
        }

        None
    }

    fn accept_email(
        &mut self,
        email: SubscriberEmail,
    ) {
        self.draft.set_email(email.as_ref());
        self.step = FlowState::Name;
    }

    fn start_submission(
        &mut self,
        name: SubscriberName,
    ) -> Result<(), ValidationError> {
        self.draft.set_name(name.as_ref());
        // the email was parsed at the previous step, so only the name can still
        // be missing here
        let new_sub = NewSubscriber::try_from(&self.draft)?;
        let client = self.client.clone();
        self.submission = Some(tokio::spawn(
            async move { client.submit(&new_sub).await }.instrument(tracing::Span::current()),
        ));
        Ok(())
    }

    fn finish_submission(
        &mut self,
        outcome: Result<SubmissionResult, SubmissionError>,
    ) {
        match outcome {
            Ok(result) => {
                tracing::info!(
                    form_id = %self.id,
                    is_existing = result.is_existing,
                    "signup accepted"
                );
                self.message = Some(match result.is_existing {
                    true => FormMessage::Info(ALREADY_SIGNED_UP_MESSAGE.to_string()),
                    false if result.message.trim().is_empty() => {
                        FormMessage::Success(DEFAULT_SUCCESS_MESSAGE.to_string())
                    }
                    false => FormMessage::Success(result.message),
                });
                self.step = FlowState::Submitted;
                self.draft.clear();
                self.reset_timer = Some(Box::pin(tokio::time::sleep(self.reset_delay)));
            }
            // draft is kept, so `retry` (or a fresh name) can go again
            Err(e) => {
                tracing::warn!(
                    form_id = %self.id,
                    error.cause_chain = ?e,
                    error.message = %e,
                    "signup failed"
                );
                self.message = Some(FormMessage::Error(e.to_string()));
            }
        }
    }
}

impl Drop for SignupForm {
    fn drop(&mut self) {
        if self.is_submitting() {
            tracing::debug!(form_id = %self.id, "form dropped mid-submission, outcome will be discarded");
        }
    }
}
