//! Token endpoint calls: authorization-code exchange and refresh.

use crate::{Config, FitbitError, TokenResponse, TokenSet, body_snippet};
use base64::{Engine as _, engine::general_purpose::STANDARD};
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, info};

/// Scopes requested on the authorize screen.
pub const OAUTH_SCOPES: [&str; 4] = ["activity", "heartrate", "profile", "sleep"];

/// Client for the provider's OAuth2 token endpoint.
#[derive(Clone, Debug)]
pub struct TokenManager {
    client_id: String,
    client_secret: SecretString,
    callback_url: String,
    authorize_base: String,
    token_url: String,
    http: reqwest::Client,
}

impl TokenManager {
    pub fn new(cfg: &Config, http: reqwest::Client) -> Self {
        Self {
            client_id: cfg.client_id.clone(),
            client_secret: cfg.client_secret.clone(),
            callback_url: cfg.callback_url.clone(),
            authorize_base: cfg.authorize_url.clone(),
            token_url: cfg.token_url(),
            http,
        }
    }

    pub fn callback_url(&self) -> &str {
        &self.callback_url
    }

    /// `Basic base64(client_id:client_secret)`.
    pub fn basic_auth_header(&self) -> String {
        let pair = format!("{}:{}", self.client_id, self.client_secret.expose_secret());
        format!("Basic {}", STANDARD.encode(pair))
    }

    /// URL the user signs in at to grant access.
    pub fn authorize_url(&self) -> String {
        format!(
            "{}?response_type=code&client_id={}&redirect_uri={}&scope={}",
            self.authorize_base,
            urlencoding::encode(&self.client_id),
            urlencoding::encode(&self.callback_url),
            urlencoding::encode(&OAUTH_SCOPES.join(" ")),
        )
    }

    pub async fn exchange_code(&self, code: &str) -> Result<TokenSet, FitbitError> {
        let form = [
            ("client_id", self.client_id.as_str()),
            ("grant_type", "authorization_code"),
            ("redirect_uri", self.callback_url.as_str()),
            ("code", code),
        ];
        let tokens = self.request_tokens(&form).await?;
        info!(user_id = %tokens.user_id, "authorization code exchanged");
        Ok(tokens)
    }

    /// Trade a refresh token for a whole new token set. The returned set
    /// replaces the old one; the old refresh token is spent.
    pub async fn refresh(&self, refresh_token: &SecretString) -> Result<TokenSet, FitbitError> {
        let form = [
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token.expose_secret()),
        ];
        let tokens = self.request_tokens(&form).await?;
        info!(user_id = %tokens.user_id, "access token refreshed");
        Ok(tokens)
    }

    async fn request_tokens(&self, form: &[(&str, &str)]) -> Result<TokenSet, FitbitError> {
        debug!(url = %self.token_url, "requesting tokens");
        let resp = self
            .http
            .post(&self.token_url)
            .header(reqwest::header::AUTHORIZATION, self.basic_auth_header())
            .form(form)
            .send()
            .await?;

        let status = resp.status().as_u16();
        let body = resp.text().await?;
        if status != 200 {
            return Err(FitbitError::Authorization {
                status,
                body: body_snippet(&body),
            });
        }

        serde_json::from_str::<TokenResponse>(&body)
            .map(TokenSet::from)
            .map_err(|e| FitbitError::Decode(format!("token response: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager() -> TokenManager {
        let cfg = Config::new(
            "22ABCD",
            SecretString::new("s3cr3t".into()),
            "http://localhost:8189/callback",
        );
        TokenManager::new(&cfg, reqwest::Client::new())
    }

    #[test]
    fn basic_auth_header_encodes_id_and_secret() {
        let header = manager().basic_auth_header();
        let encoded = header.strip_prefix("Basic ").expect("basic prefix");
        let decoded = STANDARD.decode(encoded).expect("base64");
        assert_eq!(decoded, b"22ABCD:s3cr3t");
    }

    #[test]
    fn authorize_url_carries_code_flow_parameters() {
        let url = manager().authorize_url();
        assert!(url.starts_with("https://www.fitbit.com/oauth2/authorize?"));
        assert!(url.contains("response_type=code"));
        assert!(url.contains("client_id=22ABCD"));
        assert!(url.contains("redirect_uri=http%3A%2F%2Flocalhost%3A8189%2Fcallback"));
        assert!(url.contains("scope=activity%20heartrate%20profile%20sleep"));
    }

    #[test]
    fn token_url_is_under_api_base() {
        assert_eq!(manager().token_url, "https://api.fitbit.com/oauth2/token");
    }
}
