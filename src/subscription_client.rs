use std::fmt::Debug;

use reqwest::header::CACHE_CONTROL;
use reqwest::Client;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::Value;

use crate::domain::NewSubscriber;
use crate::utils::error_chain_fmt;

/// Shown whenever the backend gives us nothing better to say.
pub const GENERIC_FAILURE_MESSAGE: &str =
    "Something went wrong while subscribing. Please try again later.";

/// Used when the backend accepts the signup but sends back an empty body.
pub const DEFAULT_SUCCESS_MESSAGE: &str = "You are on the waitlist!";

/// Normalised outcome of a successful subscription call. Any 2xx response is
/// a success, whatever its body says about `success`; missing fields take
/// their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SubmissionResult {
    #[serde(default = "default_success")]
    pub success: bool,
    #[serde(default)]
    pub message: String,
    /// Set by the backend when the address was already on the list
    #[serde(default)]
    pub is_existing: bool,
}

fn default_success() -> bool { true }

impl SubmissionResult {
    fn accepted(message: String) -> Self {
        Self {
            success: true,
            message,
            is_existing: false,
        }
    }
}

/// Every variant displays as the message to put in front of the user; the
/// underlying cause (if any) is only reachable through `source`.
#[derive(thiserror::Error)]
pub enum SubmissionError {
    /// Non-2xx response. `detail` is extracted from the body, or the generic
    /// message if there was nothing usable.
    #[error("{detail}")]
    Rejected { status: StatusCode, detail: String },
    /// Request could not be sent, or the response could not be read
    #[error("{}", GENERIC_FAILURE_MESSAGE)]
    Transport(#[source] reqwest::Error),
    #[error("{}", GENERIC_FAILURE_MESSAGE)]
    Unexpected(#[from] anyhow::Error),
}

impl Debug for SubmissionError {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        if let Self::Rejected { status, .. } = self {
            writeln!(f, "Rejected with HTTP {status}")?;
        }
        error_chain_fmt(self, f)
    }
}

/// HTTP client for the backend's subscribe endpoint.
///
/// `reqwest::Client` keeps a connection pool behind an `Arc`, so cloning a
/// `SubscriptionClient` (e.g. into a spawned task) reuses connections instead
/// of opening new ones.
#[derive(Clone, Debug)]
pub struct SubscriptionClient {
    http_client: Client,
    endpoint: String,
}

impl SubscriptionClient {
    pub fn new(
        base_url: &str,
        subscribe_path: &str,
    ) -> Self {
        let base_url = base_url.trim_end_matches('/');
        let subscribe_path = subscribe_path.trim_start_matches('/');
        Self {
            http_client: Client::new(),
            endpoint: format!("{base_url}/{subscribe_path}"),
        }
    }

    pub fn endpoint(&self) -> &str { &self.endpoint }

    /// `POST` the new subscriber as JSON. A single round trip: no retries, no
    /// timeout.
    ///
    /// # Request example
    ///
    /// ```sh
    ///     curl -v -H 'Content-Type: application/json' -H 'Cache-Control: no-store' \
    ///         --data '{"name":"Ada Lovelace","email":"ada@example.com"}' \
    ///         http://127.0.0.1:8000/contact/subscribe
    /// ```
    #[tracing::instrument(
        name = "Submitting waitlist signup",
        skip(self, new_sub),
        fields(
            subscriber_email = %new_sub.email,
            subscriber_name = %new_sub.name,
            endpoint = %self.endpoint,
        ),
        err(Debug)
    )]
    pub async fn submit(
        &self,
        new_sub: &NewSubscriber,
    ) -> Result<SubmissionResult, SubmissionError> {
        let resp = self
            .http_client
            .post(&self.endpoint)
            .header(CACHE_CONTROL, "no-store")
            // also sets `Content-Type: application/json`
            .json(new_sub)
            .send()
            .await
            .map_err(SubmissionError::Transport)?;

        let status = resp.status();
        if !status.is_success() {
            // a body that can't even be read is no worse than a missing one
            let body = resp.bytes().await.unwrap_or_default();
            return Err(SubmissionError::Rejected {
                status,
                detail: error_detail(&body),
            });
        }

        let text = resp.text().await.map_err(SubmissionError::Transport)?;
        Ok(parse_success_body(text))
    }
}

/// Empty body -> default message; a body that isn't a JSON object (or whose
/// fields have the wrong types) is passed through as the message.
fn parse_success_body(text: String) -> SubmissionResult {
    if text.trim().is_empty() {
        return SubmissionResult::accepted(DEFAULT_SUCCESS_MESSAGE.to_string());
    }
    match serde_json::from_str::<SubmissionResult>(&text) {
        Ok(result) => result,
        Err(e) => {
            tracing::debug!(error.message = %e, "response body is not a submission result");
            SubmissionResult::accepted(text)
        }
    }
}

/// Pull a human-readable message out of an error response body shaped like
/// `{"detail": ...}`.
fn error_detail(body: &[u8]) -> String {
    let detail = match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(mut map)) => map.remove("detail"),
        _ => None,
    };
    detail
        .and_then(describe_detail)
        .unwrap_or_else(|| GENERIC_FAILURE_MESSAGE.to_string())
}

fn describe_detail(detail: Value) -> Option<String> {
    match detail {
        Value::Null => None,
        Value::String(s) if s.trim().is_empty() => None,
        Value::String(s) => Some(s),
        // validation errors, e.g. `[{"loc": ["body", "email"], "msg": "...", "type": "..."}]`
        Value::Array(items) => {
            let msgs: Vec<&str> = items
                .iter()
                .filter_map(|item| {
                    item.get("msg")
                        .and_then(Value::as_str)
                        .or_else(|| item.as_str())
                })
                .filter(|msg| !msg.trim().is_empty())
                .collect();
            match msgs.is_empty() {
                true => None,
                false => Some(msgs.join("; ")),
            }
        }
        other => Some(other.to_string()),
    }
}
