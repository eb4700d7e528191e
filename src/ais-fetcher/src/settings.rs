use std::path::PathBuf;

use config::{Config, File};
use kystdata_core::Credentials;
use kystdatahuset_rs::{DEFAULT_BASE_URL, EmptyResultPolicy, FetchOptions};
use serde::Deserialize;
use snafu::ResultExt;
use strum::{AsRefStr, EnumString};

use crate::{
    Result,
    error::error::{ConfigSnafu, DurationSnafu, InvalidArgumentSnafu},
};

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub log_level: LogLevel,
    pub environment: Environment,
    pub api: ApiSettings,
    pub credentials: Option<CredentialSettings>,
    pub fetch: FetchSettings,
    /// Where the last used MMSI is remembered between runs.
    pub state_file: PathBuf,
    /// Layers are written here as GeoJSON when set.
    pub output_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiSettings {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(with = "humantime_serde")]
    pub request_timeout: std::time::Duration,
    pub max_retries: u32,
}

#[derive(Clone, Deserialize)]
pub struct CredentialSettings {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FetchSettings {
    #[serde(with = "humantime_serde")]
    pub max_window: std::time::Duration,
    /// Length of the range fetched when no start is given.
    #[serde(with = "humantime_serde")]
    pub default_range: std::time::Duration,
    #[serde(default)]
    pub empty_result_policy: EmptyResultPolicy,
    pub min_speed: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, EnumString, AsRefStr)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Environment {
    Local,
    Development,
    Production,
    Test,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, AsRefStr)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl Settings {
    /// Loads `config/<environment>.yml`, then the optional `.secret` file next to it, then
    /// `KYSTDATA_AIS__*` environment variables. The environment is read from `APP_ENVIRONMENT`
    /// and defaults to `local`.
    pub fn new() -> Result<Self> {
        let environment = std::env::var("APP_ENVIRONMENT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(Environment::Local);

        Self::for_environment(environment)
    }

    pub fn for_environment(environment: Environment) -> Result<Self> {
        let environment = environment.as_ref();

        Config::builder()
            .add_source(File::with_name(&format!("config/{environment}")).required(true))
            .add_source(File::with_name(&format!("config/{environment}.secret")).required(false))
            .add_source(
                config::Environment::with_prefix("KYSTDATA_AIS")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .set_override("environment", environment)
            .and_then(|b| b.build())
            .and_then(|c| c.try_deserialize())
            .context(ConfigSnafu)
    }

    pub fn credentials(&self) -> Option<Credentials> {
        self.credentials
            .as_ref()
            .map(|c| Credentials::new(&c.username, &c.password))
    }
}

impl FetchSettings {
    /// Window bounds go over the wire at minute precision, so `max_window` must be a positive
    /// whole number of minutes.
    pub fn options(&self) -> Result<FetchOptions> {
        if self.max_window.is_zero()
            || self.max_window.subsec_nanos() != 0
            || self.max_window.as_secs() % 60 != 0
        {
            return InvalidArgumentSnafu {
                msg: format!(
                    "fetch.max_window must be a positive whole number of minutes, got {:?}",
                    self.max_window
                ),
            }
            .fail();
        }

        Ok(FetchOptions {
            max_window: chrono::Duration::from_std(self.max_window).context(DurationSnafu)?,
            empty_result_policy: self.empty_result_policy,
            min_speed: self.min_speed,
            cancellation: None,
        })
    }

    pub fn default_range(&self) -> Result<chrono::Duration> {
        chrono::Duration::from_std(self.default_range).context(DurationSnafu)
    }
}

impl std::fmt::Debug for CredentialSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialSettings")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}
