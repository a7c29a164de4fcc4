use std::env;
use std::env::current_dir;
use std::fmt::Display;
use std::time::Duration;

use config::Config;
use config::ConfigError;
use serde::Deserialize;
use serde_aux::field_attributes::deserialize_number_from_string;

use crate::subscription_client::SubscriptionClient;

/// Fallback backend address, also the value shipped in `base.yaml`.
pub const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:8000";

/// Name of the env var that, when set, overrides whatever base url the
/// configuration files declare.
pub const BACKEND_URL_OVERRIDE: &str = "BACKEND_URL";

/// Global configuration, loaded from the yaml files in `configuration/`. See
/// `get_configuration`.
#[derive(Deserialize, Clone, Debug)]
pub struct Settings {
    pub backend: BackendSettings,
    pub form: FormSettings,
}

/// Where signups are sent
#[derive(Deserialize, Clone, Debug)]
pub struct BackendSettings {
    /// Scheme, host and port, e.g. `http://127.0.0.1:8000`. A trailing slash is
    /// tolerated.
    pub base_url: String,

    /// Path of the subscribe endpoint, relative to `base_url`
    pub subscribe_path: String,
}

impl BackendSettings {
    pub fn client(&self) -> SubscriptionClient {
        SubscriptionClient::new(&self.base_url, &self.subscribe_path)
    }
}

/// Behaviour of the signup form itself
#[derive(Deserialize, Clone, Debug)]
pub struct FormSettings {
    /// How long the form stays in the "joined" state before it resets itself.
    /// 3000 in `base.yaml`.
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub reset_delay_milliseconds: u64,
}

impl FormSettings {
    pub fn reset_delay(&self) -> Duration { Duration::from_millis(self.reset_delay_milliseconds) }
}

#[derive(Debug)]
pub enum Environment {
    Local,
    Production,
}

impl Display for Environment {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Environment::Local => "local",
                Environment::Production => "production",
            }
        )
    }
}

impl TryFrom<String> for Environment {
    type Error = String;
    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "production" => Ok(Self::Production),
            e => Err(format!("Invalid environment: {e}")),
        }
    }
}

/// Pick the backend base url: a non-blank override wins, otherwise the
/// configured value, otherwise `DEFAULT_BACKEND_URL`. The result never ends in
/// `/`.
pub fn resolve_backend_url(
    override_url: Option<&str>,
    configured: &str,
) -> String {
    [override_url.unwrap_or_default(), configured]
        .into_iter()
        .map(|url| url.trim().trim_end_matches('/'))
        .find(|url| !url.is_empty())
        .unwrap_or(DEFAULT_BACKEND_URL)
        .to_string()
}

/// Load yaml configuration files at `<project_root>/configuration`.
///
/// Sources, lowest precedence first:
///
/// 1. `base.yaml`
/// 2. `local.yaml` or `production.yaml`, picked by `APP_ENVIRONMENT` (default
///    `local`)
/// 3. `APP_`-prefixed env vars, e.g. `APP_FORM__RESET_DELAY_MILLISECONDS=500`
/// 4. `BACKEND_URL`, which only replaces `backend.base_url`
pub fn get_configuration() -> Result<Settings, ConfigError> {
    let cfg_dir = current_dir()
        .map_err(|e| ConfigError::Foreign(Box::new(e)))?
        .join("configuration");

    let env: Environment = env::var("APP_ENVIRONMENT")
        .unwrap_or("local".to_string())
        .try_into()
        .map_err(ConfigError::Message)?;

    tracing::debug!("loading config for {env} env");

    let settings = Config::builder()
        .add_source(config::File::from(cfg_dir.join("base.yaml")))
        .add_source(config::File::from(cfg_dir.join(format!("{env}.yaml"))))
        .add_source(
            // env vars are -always- parsed as String, `serde-aux` is required to parse other
            // types.
            //
            // `APP_BACKEND__BASE_URL=http://api:8000` -> `Settings.backend.base_url`
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;

    let mut settings = settings.try_deserialize::<Settings>()?;
    settings.backend.base_url = resolve_backend_url(
        env::var(BACKEND_URL_OVERRIDE).ok().as_deref(),
        &settings.backend.base_url,
    );
    Ok(settings)
}
