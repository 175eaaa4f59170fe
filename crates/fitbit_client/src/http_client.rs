//! Authenticated GETs against Fitbit resource endpoints.
//!
//! Every call waits the configured courtesy interval first. An expired
//! access token is refreshed through the [`Session`] and the same URL is
//! retried with the new token, up to the policy's retry bound.

use crate::retry::RetryPolicy;
use crate::{FitbitError, Resource, Session, TokenManager, body_snippet, observability};
use chrono::NaiveDate;
use secrecy::ExposeSecret;
use serde_json::Value;
use tracing::{debug, warn};

/// `errorType` the provider reports for an expired access token.
const EXPIRED_TOKEN: &str = "expired_token";

/// Client for the Fitbit resource API using reqwest.
#[derive(Clone, Debug)]
pub struct DataClient {
    base_url: String,
    http: reqwest::Client,
    manager: TokenManager,
    policy: RetryPolicy,
}

impl DataClient {
    /// # Arguments
    /// * `base_url` - API root, e.g. "https://api.fitbit.com"
    /// * `manager` - token endpoint client used for refreshes
    /// * `policy` - courtesy delay and expired-token retry bound
    pub fn new(
        base_url: &str,
        http: reqwest::Client,
        manager: TokenManager,
        policy: RetryPolicy,
    ) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
            manager,
            policy,
        }
    }

    pub fn from_config(cfg: &crate::Config, http: reqwest::Client) -> Self {
        let manager = TokenManager::new(cfg, http.clone());
        Self::new(&cfg.api_base_url, http, manager, RetryPolicy::from_config(cfg))
    }

    pub fn token_manager(&self) -> &TokenManager {
        &self.manager
    }

    pub fn resource_url(&self, user_id: &str, resource: Resource, date: NaiveDate) -> String {
        format!("{}{}", self.base_url, resource.endpoint(user_id, date))
    }

    /// GET `url` as the session's user and return the JSON body.
    pub async fn fetch(&self, url: &str, session: &Session) -> Result<Value, FitbitError> {
        let mut attempts = 0u32;
        loop {
            attempts += 1;
            self.policy.pace().await;

            let access = session.access_token().await;
            debug!(url, attempts, "GET");
            let resp = self
                .http
                .get(url)
                .bearer_auth(access.expose_secret())
                .send()
                .await?;

            let status = resp.status().as_u16();
            observability::record_api_request(status);
            let body = resp.text().await?;

            match status {
                200 => {
                    return serde_json::from_str(&body).map_err(|e| {
                        FitbitError::Decode(format!("{} - body: {}", e, body_snippet(&body)))
                    });
                }
                401 if is_expired_token(&body) => {
                    if !self.policy.allows_retry(attempts) {
                        warn!(url, attempts, "token still expired; giving up");
                        return Err(FitbitError::RefreshExhausted { attempts });
                    }
                    warn!(url, attempts, "access token expired; refreshing");
                    session.refresh_after_expiry(&self.manager, &access).await?;
                }
                _ => {
                    return Err(FitbitError::UnhandledResponse {
                        status,
                        body: body_snippet(&body),
                    });
                }
            }
        }
    }
}

/// True when the error body lists an `expired_token` entry.
fn is_expired_token(body: &str) -> bool {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("errors").and_then(Value::as_array).cloned())
        .is_some_and(|errors| {
            errors
                .iter()
                .any(|e| e.get("errorType").and_then(Value::as_str) == Some(EXPIRED_TOKEN))
        })
}
