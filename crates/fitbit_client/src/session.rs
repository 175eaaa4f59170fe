//! In-memory owner of the current token set.

use crate::{FitbitError, TokenManager, TokenSet, observability};
use secrecy::{ExposeSecret, SecretString};
use std::sync::atomic::{AtomicU32, Ordering};
use tokio::sync::{Mutex, RwLock};
use tracing::debug;

/// Holds the live tokens for one user.
///
/// A refresh replaces the whole token set. Refreshes are serialized: a caller
/// whose stale access token was already replaced while it waited for the gate
/// reuses the new set instead of refreshing again.
#[derive(Debug)]
pub struct Session {
    tokens: RwLock<TokenSet>,
    refresh_gate: Mutex<()>,
    refreshes: AtomicU32,
}

impl Session {
    pub fn new(tokens: TokenSet) -> Self {
        Self {
            tokens: RwLock::new(tokens),
            refresh_gate: Mutex::new(()),
            refreshes: AtomicU32::new(0),
        }
    }

    /// Copy of the current token set.
    pub async fn tokens(&self) -> TokenSet {
        self.tokens.read().await.clone()
    }

    pub async fn user_id(&self) -> String {
        self.tokens.read().await.user_id.clone()
    }

    pub(crate) async fn access_token(&self) -> SecretString {
        self.tokens.read().await.access_token.clone()
    }

    /// Number of refreshes this session has performed.
    pub fn refresh_count(&self) -> u32 {
        self.refreshes.load(Ordering::SeqCst)
    }

    /// Refresh after `stale` was rejected as expired.
    pub async fn refresh_after_expiry(
        &self,
        manager: &TokenManager,
        stale: &SecretString,
    ) -> Result<(), FitbitError> {
        let _gate = self.refresh_gate.lock().await;

        let refresh_token = {
            let current = self.tokens.read().await;
            if current.access_token.expose_secret() != stale.expose_secret() {
                debug!("token set already replaced; skipping refresh");
                return Ok(());
            }
            current.refresh_token.clone()
        };

        let fresh = manager.refresh(&refresh_token).await;
        observability::record_refresh(fresh.is_ok());
        *self.tokens.write().await = fresh?;
        self.refreshes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Config;

    #[tokio::test]
    async fn refresh_is_skipped_when_token_already_replaced() {
        let session = Session::new(TokenSet::new("new-access", "R", "U"));
        let cfg = Config::new("id", SecretString::new("secret".into()), "http://cb");
        // Token URL is never contacted: the stale token differs from the live one.
        let manager = TokenManager::new(&cfg, reqwest::Client::new());
        let stale = SecretString::new("old-access".into());
        session
            .refresh_after_expiry(&manager, &stale)
            .await
            .expect("no refresh needed");
        assert_eq!(session.refresh_count(), 0);
        assert_eq!(
            session.tokens().await.access_token.expose_secret(),
            "new-access"
        );
    }

    #[tokio::test]
    async fn user_id_reads_current_tokens() {
        let session = Session::new(TokenSet::new("A", "R", "U42"));
        assert_eq!(session.user_id().await, "U42");
    }
}
