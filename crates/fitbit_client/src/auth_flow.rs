//! Obtaining an authorization code.
//!
//! [`AuthorizationDriver`] is the capability the rest of the crate relies on.
//! [`InteractiveAuthorizer`] implements it on top of any [`BrowserSession`]:
//! it signs in, then polls until the browser either lands on the callback
//! URI or shows the scope-selection screen, which it approves.

use crate::{FitbitError, TokenManager};
use async_trait::async_trait;
use secrecy::SecretString;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, info};

const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);
const DEFAULT_MAX_CONSENT_ROUNDS: u32 = 3;

/// Account credentials typed into the provider's sign-in form.
#[derive(Clone, Debug)]
pub struct UserLogin {
    pub email: String,
    pub password: SecretString,
}

/// Anything that can produce an authorization code for the configured app.
///
/// Takes no arguments: implementations that sign in on the user's behalf get
/// the [`UserLogin`] when they are built (see [`InteractiveAuthorizer::new`]),
/// and ones where the user signs in themselves need none.
#[async_trait]
pub trait AuthorizationDriver: Send + Sync {
    async fn obtain_authorization_code(&self) -> Result<String, FitbitError>;
}

/// Browser mechanics the interactive flow needs.
#[async_trait]
pub trait BrowserSession: Send {
    async fn navigate(&mut self, url: &str) -> Result<(), FitbitError>;
    async fn submit_sign_in(
        &mut self,
        email: &str,
        password: &SecretString,
    ) -> Result<(), FitbitError>;
    async fn current_url(&mut self) -> Result<String, FitbitError>;
    async fn has_scope_selection(&mut self) -> Result<bool, FitbitError>;
    /// Tick every scope and confirm.
    async fn approve_all_scopes(&mut self) -> Result<(), FitbitError>;
}

enum Screen {
    Redirected(String),
    ScopeSelection,
}

pub struct InteractiveAuthorizer<S> {
    session: Mutex<S>,
    login: UserLogin,
    authorize_url: String,
    callback_url: String,
    timeout: Duration,
    poll_interval: Duration,
    max_consent_rounds: u32,
}

impl<S: BrowserSession> InteractiveAuthorizer<S> {
    pub fn new(session: S, login: UserLogin, manager: &TokenManager, timeout: Duration) -> Self {
        Self {
            session: Mutex::new(session),
            login,
            authorize_url: manager.authorize_url(),
            callback_url: manager.callback_url().to_string(),
            timeout,
            poll_interval: DEFAULT_POLL_INTERVAL,
            max_consent_rounds: DEFAULT_MAX_CONSENT_ROUNDS,
        }
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn with_max_consent_rounds(mut self, rounds: u32) -> Self {
        self.max_consent_rounds = rounds;
        self
    }

    pub fn into_session(self) -> S {
        self.session.into_inner()
    }

    async fn wait_for_screen(&self, session: &mut S) -> Result<Screen, FitbitError> {
        let deadline = Instant::now() + self.timeout;
        loop {
            let url = session.current_url().await?;
            if url.starts_with(&self.callback_url) {
                return Ok(Screen::Redirected(url));
            }
            if session.has_scope_selection().await? {
                return Ok(Screen::ScopeSelection);
            }
            if Instant::now() >= deadline {
                return Err(FitbitError::AuthCodeTimeout(self.timeout));
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }
}

#[async_trait]
impl<S: BrowserSession + 'static> AuthorizationDriver for InteractiveAuthorizer<S> {
    async fn obtain_authorization_code(&self) -> Result<String, FitbitError> {
        let mut session = self.session.lock().await;
        session.navigate(&self.authorize_url).await?;
        session
            .submit_sign_in(&self.login.email, &self.login.password)
            .await?;
        info!(email = %self.login.email, "submitted sign-in form");

        let mut approvals = 0u32;
        loop {
            match self.wait_for_screen(&mut session).await? {
                Screen::Redirected(url) => {
                    let code = extract_authorization_code(&url)?;
                    info!("authorization code received");
                    return Ok(code);
                }
                Screen::ScopeSelection => {
                    if approvals == self.max_consent_rounds {
                        return Err(FitbitError::Browser(format!(
                            "scope selection still shown after {approvals} approvals"
                        )));
                    }
                    approvals += 1;
                    debug!(approvals, "approving all scopes");
                    session.approve_all_scopes().await?;
                }
            }
        }
    }
}

/// Pull the `code` parameter out of a callback URL. Repeated codes: the
/// last one wins.
pub fn extract_authorization_code(callback_url: &str) -> Result<String, FitbitError> {
    let query = callback_url
        .split_once('?')
        .map(|(_, q)| q)
        .unwrap_or_default();
    let query = query.split_once('#').map(|(q, _)| q).unwrap_or(query);

    parse_query_strict(query)?
        .into_iter()
        .rev()
        .find(|(name, _)| name == "code")
        .map(|(_, value)| value)
        .ok_or_else(|| FitbitError::Parse("callback has no code parameter".into()))
}

/// Strict `application/x-www-form-urlencoded` parse: every `&`-separated
/// field must be `name=value`, every `%` must start a two-digit hex escape and
/// the result must be UTF-8. Blank values are dropped.
pub fn parse_query_strict(query: &str) -> Result<Vec<(String, String)>, FitbitError> {
    let mut pairs = Vec::new();
    if query.is_empty() {
        return Ok(pairs);
    }
    for field in query.split('&') {
        let Some((name, value)) = field.split_once('=') else {
            return Err(FitbitError::Parse(format!("bad query field: {field:?}")));
        };
        let value = decode_component(value)?;
        if value.is_empty() {
            continue;
        }
        pairs.push((decode_component(name)?, value));
    }
    Ok(pairs)
}

fn decode_component(raw: &str) -> Result<String, FitbitError> {
    // `urlencoding` passes malformed escapes through untouched.
    let bytes = raw.as_bytes();
    for (i, _) in raw.match_indices('%') {
        let escape = bytes.get(i + 1..i + 3);
        if !escape.is_some_and(|hex| hex.iter().all(u8::is_ascii_hexdigit)) {
            return Err(FitbitError::Parse(format!("malformed percent escape in {raw:?}")));
        }
    }
    urlencoding::decode(&raw.replace('+', " "))
        .map(|decoded| decoded.into_owned())
        .map_err(|e| FitbitError::Parse(format!("invalid encoding in {raw:?}: {e}")))
}
