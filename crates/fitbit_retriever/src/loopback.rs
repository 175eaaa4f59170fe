//! Authorization code capture on the local callback address.
//!
//! The user signs in with their own browser; the provider then redirects to
//! the callback URI, which this listener serves.

use async_trait::async_trait;
use axum::{
    Router,
    extract::{RawQuery, State},
    response::Html,
    routing::get,
};
use fitbit_client::auth_flow::extract_authorization_code;
use fitbit_client::{AuthorizationDriver, FitbitError, TokenManager};
use std::future::IntoFuture;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::{Mutex, oneshot};
use tracing::{debug, info};

const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

const RECEIVED_PAGE: &str =
    "<html><body><p>Authorization received. You can close this window.</p></body></html>";

#[derive(Clone)]
struct CallbackState {
    /// Callback URI without query; the received query is appended to it.
    base: String,
    tx: Arc<Mutex<Option<oneshot::Sender<String>>>>,
}

async fn callback(
    State(state): State<CallbackState>,
    RawQuery(query): RawQuery,
) -> Html<&'static str> {
    let url = match query {
        Some(q) => format!("{}?{}", state.base, q),
        None => state.base.clone(),
    };
    if let Some(tx) = state.tx.lock().await.take() {
        let _ = tx.send(url);
    }
    Html(RECEIVED_PAGE)
}

pub struct LoopbackAuthorizer {
    authorize_url: String,
    callback: reqwest::Url,
    timeout: Duration,
}

impl LoopbackAuthorizer {
    pub fn new(
        authorize_url: impl Into<String>,
        callback_url: &str,
        timeout: Duration,
    ) -> Result<Self, FitbitError> {
        let callback = reqwest::Url::parse(callback_url)
            .map_err(|e| FitbitError::Config(format!("invalid callback URL {callback_url}: {e}")))?;
        Ok(Self {
            authorize_url: authorize_url.into(),
            callback,
            timeout,
        })
    }

    pub fn from_manager(manager: &TokenManager, timeout: Duration) -> Result<Self, FitbitError> {
        Self::new(manager.authorize_url(), manager.callback_url(), timeout)
    }

    pub fn authorize_url(&self) -> &str {
        &self.authorize_url
    }

    /// Bind the host and port named by the callback URI.
    pub async fn bind(&self) -> Result<TcpListener, FitbitError> {
        let host = self
            .callback
            .host_str()
            .ok_or_else(|| FitbitError::Config("callback URL has no host".into()))?;
        let port = self
            .callback
            .port_or_known_default()
            .ok_or_else(|| FitbitError::Config("callback URL has no port".into()))?;
        TcpListener::bind((host, port))
            .await
            .map_err(|e| FitbitError::Browser(format!("binding {host}:{port}: {e}")))
    }

    /// Serve the callback path on `listener` until one redirect arrives or
    /// the timeout passes.
    pub async fn serve(&self, listener: TcpListener) -> Result<String, FitbitError> {
        let (tx, rx) = oneshot::channel();
        let mut base = self.callback.clone();
        base.set_query(None);
        base.set_fragment(None);
        let state = CallbackState {
            base: base.to_string(),
            tx: Arc::new(Mutex::new(Some(tx))),
        };
        let app = Router::new()
            .route(self.callback.path(), get(callback))
            .with_state(state);

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let mut server = tokio::spawn(
            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    let _ = shutdown_rx.await;
                })
                .into_future(),
        );

        let received = tokio::time::timeout(self.timeout, rx).await;
        let _ = shutdown_tx.send(());
        // In-flight responses get a short grace period to reach the browser.
        if tokio::time::timeout(SHUTDOWN_GRACE, &mut server).await.is_err() {
            debug!("callback listener did not stop in time; aborting");
            server.abort();
        }

        match received {
            Err(_) => Err(FitbitError::AuthCodeTimeout(self.timeout)),
            Ok(Err(_)) => Err(FitbitError::Browser("callback listener stopped".into())),
            Ok(Ok(url)) => extract_authorization_code(&url),
        }
    }
}

#[async_trait]
impl AuthorizationDriver for LoopbackAuthorizer {
    async fn obtain_authorization_code(&self) -> Result<String, FitbitError> {
        let listener = self.bind().await?;
        info!(callback = %self.callback, "waiting for authorization redirect");
        let code = self.serve(listener).await?;
        info!("authorization code received");
        Ok(code)
    }
}
