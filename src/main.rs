use std::io::Write;

use tokio::io::AsyncBufReadExt;
use tokio::io::BufReader;
use waitlist_signup::configuration::get_configuration;
use waitlist_signup::signup_form::FormError;
use waitlist_signup::signup_form::FormView;
use waitlist_signup::signup_form::SignupForm;
use waitlist_signup::telemetry::get_subscriber;
use waitlist_signup::telemetry::init_subscriber;

/// Redraw the form: message first, then the hint, then the input prompt.
fn render(view: &FormView<'_>) -> std::io::Result<()> {
    let mut out = std::io::stdout().lock();
    if let Some(message) = view.message {
        let marker = match message.is_error() {
            true => "!",
            false => "*",
        };
        writeln!(out, "{marker} {}", message.text())?;
    }
    if let Some(hint) = view.hint {
        writeln!(out, "  {hint}")?;
    }
    match (view.input_disabled, view.placeholder) {
        (true, _) | (false, None) => writeln!(out, "[{}]", view.submit_label)?,
        (false, Some(placeholder)) => write!(out, "{placeholder} [{}] > ", view.submit_label)?,
    }
    out.flush()
}

/// One line from the terminal is one press of the submit button, except for
/// the `:retry` and `:reset` commands.
fn handle_line(
    form: &mut SignupForm,
    line: &str,
) {
    let outcome = match line.trim() {
        ":retry" => form.retry(),
        ":reset" => {
            form.reset();
            Ok(form.step())
        }
        _ => form.submit(line),
    };
    // validation errors are already part of the view
    if let Err(e @ (FormError::InputDisabled | FormError::NothingToRetry)) = outcome {
        println!("{e}");
    }
}

/// Initialise telemetry, load config, and host a single signup form on the
/// terminal until stdin is closed.
#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    // stdout belongs to the form, so logs go to stderr
    let subscriber = get_subscriber("waitlist-signup", "info", std::io::stderr);
    init_subscriber(subscriber)?;

    let cfg = get_configuration()?;
    tracing::info!(
        backend = %cfg.backend.base_url,
        path = %cfg.backend.subscribe_path,
        reset_delay_ms = cfg.form.reset_delay_milliseconds,
        "starting signup form"
    );

    let mut form = SignupForm::new(cfg.backend.client(), cfg.form.reset_delay());
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    render(&form.view())?;
    loop {
        // both futures are dropped before either handler runs, so each handler
        // is free to borrow `form` mutably
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                handle_line(&mut form, &line);
                render(&form.view())?;
            }
            // disabled for this iteration when there is nothing to wait for
            Some(_) = form.next_update() => render(&form.view())?,
        }
    }

    tracing::info!(form_id = %form.id(), "stdin closed, exiting");
    Ok(())
}
