//! Fitbit Web API client: OAuth token lifecycle and per-day activity retrieval.

use secrecy::SecretString;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

pub mod aggregator;
pub mod auth_flow;
pub mod config;
pub mod http_client;
pub mod oauth;
pub mod observability;
pub mod record;
pub mod resources;
pub mod retry;
pub mod session;

pub use aggregator::DailyRetriever;
pub use auth_flow::{AuthorizationDriver, BrowserSession, InteractiveAuthorizer, UserLogin};
pub use config::Config;
pub use http_client::DataClient;
pub use oauth::TokenManager;
pub use record::{DailyRecord, Sample};
pub use resources::Resource;
pub use session::Session;

/// Longest slice of a response body kept inside an error.
const BODY_SNIPPET_CHARS: usize = 512;

#[derive(Debug, Error)]
pub enum FitbitError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("configuration error: {0}")]
    Config(String),
    #[error("authorization failed ({status}): {body}")]
    Authorization { status: u16, body: String },
    #[error("token still expired after {attempts} attempts")]
    RefreshExhausted { attempts: u32 },
    #[error("unhandled response ({status}): {body}")]
    UnhandledResponse { status: u16, body: String },
    #[error("no authorization code within {0:?}")]
    AuthCodeTimeout(Duration),
    #[error("callback parse error: {0}")]
    Parse(String),
    #[error("decoding response: {0}")]
    Decode(String),
    #[error("browser session error: {0}")]
    Browser(String),
}

impl FitbitError {
    /// HTTP status attached to the error, if the provider answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            FitbitError::Authorization { status, .. }
            | FitbitError::UnhandledResponse { status, .. } => Some(*status),
            FitbitError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

pub(crate) fn body_snippet(body: &str) -> String {
    body.chars().take(BODY_SNIPPET_CHARS).collect()
}

/// Tokens returned by the provider's token endpoint.
///
/// A refresh produces a whole new set; the previous one must not be reused.
#[derive(Clone, Debug)]
pub struct TokenSet {
    pub access_token: SecretString,
    pub refresh_token: SecretString,
    pub user_id: String,
    pub expires_in: Option<u64>,
    pub scope: Option<String>,
}

impl TokenSet {
    pub fn new(
        access_token: impl Into<String>,
        refresh_token: impl Into<String>,
        user_id: impl Into<String>,
    ) -> Self {
        Self {
            access_token: SecretString::new(access_token.into().into()),
            refresh_token: SecretString::new(refresh_token.into().into()),
            user_id: user_id.into(),
            expires_in: None,
            scope: None,
        }
    }
}

#[derive(Deserialize)]
pub(crate) struct TokenResponse {
    access_token: String,
    refresh_token: String,
    user_id: String,
    #[serde(default)]
    expires_in: Option<u64>,
    #[serde(default)]
    scope: Option<String>,
}

impl From<TokenResponse> for TokenSet {
    fn from(raw: TokenResponse) -> Self {
        let mut tokens = TokenSet::new(raw.access_token, raw.refresh_token, raw.user_id);
        tokens.expires_in = raw.expires_in;
        tokens.scope = raw.scope;
        tokens
    }
}
