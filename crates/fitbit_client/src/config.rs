use crate::FitbitError;
use secrecy::SecretString;
use std::time::Duration;

pub const DEFAULT_API_BASE_URL: &str = "https://api.fitbit.com";
pub const DEFAULT_AUTHORIZE_URL: &str = "https://www.fitbit.com/oauth2/authorize";
pub const DEFAULT_CALL_INTERVAL: Duration = Duration::from_secs(1);
pub const DEFAULT_AUTH_TIMEOUT: Duration = Duration::from_secs(120);
pub const DEFAULT_MAX_REFRESH_RETRIES: u32 = 5;

#[derive(Clone, Debug)]
pub struct Config {
    pub client_id: String,
    pub client_secret: SecretString,
    pub callback_url: String,
    /// Courtesy delay slept before every resource call.
    pub call_interval: Duration,
    pub max_refresh_retries: u32,
    pub auth_timeout: Duration,
    pub api_base_url: String,
    pub authorize_url: String,
}

impl Config {
    /// Config with provider defaults for everything but the app credentials.
    pub fn new(
        client_id: impl Into<String>,
        client_secret: SecretString,
        callback_url: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret,
            callback_url: callback_url.into(),
            call_interval: DEFAULT_CALL_INTERVAL,
            max_refresh_retries: DEFAULT_MAX_REFRESH_RETRIES,
            auth_timeout: DEFAULT_AUTH_TIMEOUT,
            api_base_url: DEFAULT_API_BASE_URL.into(),
            authorize_url: DEFAULT_AUTHORIZE_URL.into(),
        }
    }

    pub fn from_env() -> Result<Self, FitbitError> {
        Self::from_env_with(|k| std::env::var(k).ok())
    }

    /// Testable helper that reads configuration values using the provided
    /// function, so tests never touch the process environment.
    pub fn from_env_with<F>(mut get: F) -> Result<Self, FitbitError>
    where
        F: FnMut(&str) -> Option<String>,
    {
        let client_id = get("FITBIT_CLIENT_ID")
            .ok_or_else(|| FitbitError::Config("FITBIT_CLIENT_ID missing".into()))?;
        let secret = get("FITBIT_CLIENT_SECRET")
            .ok_or_else(|| FitbitError::Config("FITBIT_CLIENT_SECRET missing".into()))?;
        let callback_url = get("FITBIT_CALLBACK_URL")
            .ok_or_else(|| FitbitError::Config("FITBIT_CALLBACK_URL missing".into()))?;

        let mut cfg = Self::new(
            client_id,
            SecretString::new(secret.trim().into()),
            callback_url,
        );
        if let Some(v) = get("FITBIT_CALL_INTERVAL_SECS") {
            cfg.call_interval = Duration::from_secs(parse_number("FITBIT_CALL_INTERVAL_SECS", &v)?);
        }
        if let Some(v) = get("FITBIT_MAX_REFRESH_RETRIES") {
            cfg.max_refresh_retries = parse_number("FITBIT_MAX_REFRESH_RETRIES", &v)?;
        }
        if let Some(v) = get("FITBIT_AUTH_TIMEOUT_SECS") {
            cfg.auth_timeout = Duration::from_secs(parse_number("FITBIT_AUTH_TIMEOUT_SECS", &v)?);
        }
        if let Some(v) = get("FITBIT_API_BASE_URL") {
            cfg.api_base_url = v.trim_end_matches('/').to_string();
        }
        if let Some(v) = get("FITBIT_AUTHORIZE_URL") {
            cfg.authorize_url = v;
        }
        Ok(cfg)
    }

    /// Token endpoint lives under the API host.
    pub fn token_url(&self) -> String {
        format!("{}/oauth2/token", self.api_base_url.trim_end_matches('/'))
    }
}

fn parse_number<T: std::str::FromStr>(name: &str, raw: &str) -> Result<T, FitbitError> {
    raw.trim()
        .parse()
        .map_err(|_| FitbitError::Config(format!("{name} must be a non-negative integer, got {raw:?}")))
}
