use std::time::Duration;

use claims::assert_ok;
use once_cell::sync::Lazy;
use waitlist_signup::configuration::get_configuration;
use waitlist_signup::signup_form::FlowState;
use waitlist_signup::signup_form::SignupForm;
use waitlist_signup::telemetry::get_subscriber;
use waitlist_signup::telemetry::init_subscriber;
use wiremock::matchers::method;
use wiremock::matchers::path;
use wiremock::Mock;
use wiremock::MockBuilder;
use wiremock::MockServer;

/// Init the tracing subscriber once for the whole test binary.
///
/// To opt in to verbose logging, use the env var `TEST_LOG`:
///
/// ```sh
///      TEST_LOG=true cargo test [test_name] | bunyan
/// ```
static TRACING: Lazy<()> = Lazy::new(|| {
    // the two sinks are different types, hence the duplicated match arms
    let outcome = match std::env::var("TEST_LOG") {
        Ok(_) => init_subscriber(get_subscriber("test", "debug", std::io::stdout)),
        Err(_) => init_subscriber(get_subscriber("test", "debug", std::io::sink)),
    };
    outcome.expect("install test subscriber");
});

/// Much shorter than the configured 3 s, so that the reset can be awaited
pub const RESET_DELAY: Duration = Duration::from_millis(200);

/// Upper bound on any single wait, so that a broken form fails the test
/// instead of hanging it
const UPDATE_TIMEOUT: Duration = Duration::from_secs(5);

pub struct TestForm {
    pub form: SignupForm,
    /// Stands in for the subscription backend
    pub backend: MockServer,
    pub subscribe_path: String,
}

impl TestForm {
    /// Matches a `POST` to the subscribe endpoint. Still needs a response, and
    /// has to be mounted (normally with an `expect`).
    pub fn subscribe_mock(&self) -> MockBuilder {
        Mock::given(method("POST")).and(path(self.subscribe_path.as_str()))
    }

    /// Go through both steps; the submission is in flight afterwards.
    pub fn fill(
        &mut self,
        email: &str,
        name: &str,
    ) {
        assert_eq!(assert_ok!(self.form.submit(email)), FlowState::Name);
        assert_ok!(self.form.submit(name));
        assert!(self.form.is_submitting());
    }

    pub async fn next_update(&mut self) -> Option<FlowState> {
        tokio::time::timeout(UPDATE_TIMEOUT, self.form.next_update())
            .await
            .expect("form update timed out")
    }

    pub async fn received_requests(&self) -> usize {
        self.backend
            .received_requests()
            .await
            .expect("request recording is on by default")
            .len()
    }
}

/// Build a form from the default configuration, pointed at a fresh mock
/// backend.
pub async fn spawn_form() -> TestForm {
    Lazy::force(&TRACING);

    let backend = MockServer::start().await;

    let cfg = {
        let mut cfg = get_configuration().expect("read configuration/");
        cfg.backend.base_url = backend.uri();
        cfg.form.reset_delay_milliseconds = RESET_DELAY.as_millis() as u64;
        cfg
    };

    TestForm {
        form: SignupForm::new(cfg.backend.client(), cfg.form.reset_delay()),
        backend,
        subscribe_path: cfg.backend.subscribe_path,
    }
}
