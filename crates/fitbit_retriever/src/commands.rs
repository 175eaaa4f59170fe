//! Command runners. Results go to `out` as JSON; messages meant for the
//! user rather than for a pipe go to `diag`.

use crate::cli::{Command, RetrieveArgs};
use crate::error::AppResult;
use crate::loopback::LoopbackAuthorizer;
use fitbit_client::{AuthorizationDriver, Config, DailyRetriever, DataClient, Session, TokenSet};
use secrecy::ExposeSecret;
use serde_json::{Value, json};
use std::io::Write;
use std::time::Duration;
use tracing::{info, warn};

/// Token set as printable JSON. Secrets are exposed on purpose: this is
/// the only place the caller receives them.
pub fn tokens_json(tokens: &TokenSet) -> Value {
    json!({
        "access_token": tokens.access_token.expose_secret(),
        "refresh_token": tokens.refresh_token.expose_secret(),
        "user_id": tokens.user_id,
        "expires_in": tokens.expires_in,
        "scope": tokens.scope,
    })
}

pub fn http_client() -> AppResult<reqwest::Client> {
    let client = reqwest::Client::builder()
        .user_agent(concat!("fitbit-retriever/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(fitbit_client::FitbitError::from)?;
    Ok(client)
}

pub async fn run<W, D>(command: Command, cfg: Config, out: &mut W, diag: &mut D) -> AppResult<()>
where
    W: Write + Send,
    D: Write + Send,
{
    let client = DataClient::from_config(&cfg, http_client()?);
    match command {
        Command::AuthorizeUrl => {
            writeln!(out, "{}", client.token_manager().authorize_url())?;
        }
        Command::Authorize { timeout } => {
            let timeout = timeout.map(Duration::from_secs).unwrap_or(cfg.auth_timeout);
            let driver = LoopbackAuthorizer::from_manager(client.token_manager(), timeout)?;
            writeln!(
                diag,
                "Open this URL in a browser and grant access:\n{}",
                driver.authorize_url()
            )?;
            let code = driver.obtain_authorization_code().await?;
            let tokens = client.token_manager().exchange_code(&code).await?;
            writeln!(out, "{}", serde_json::to_string(&tokens_json(&tokens))?)?;
        }
        Command::Exchange { code } => {
            let tokens = client.token_manager().exchange_code(&code).await?;
            writeln!(out, "{}", serde_json::to_string(&tokens_json(&tokens))?)?;
        }
        Command::Retrieve(args) => retrieve(&args, client, out, diag).await?,
    }
    Ok(())
}

/// Streams one JSON line per day. A refreshed token set is written to `diag`
/// whether or not the walk finished, since the old refresh token is spent.
async fn retrieve<W, D>(
    args: &RetrieveArgs,
    client: DataClient,
    out: &mut W,
    diag: &mut D,
) -> AppResult<()>
where
    W: Write + Send,
    D: Write + Send,
{
    let (from, to) = args.date_range()?;
    let session = Session::new(TokenSet::new(
        args.access_token.clone(),
        args.refresh_token.clone(),
        args.user_id.clone(),
    ));
    let retriever = DailyRetriever::new(client);

    info!(%from, %to, "retrieving daily records");
    let walked = retriever
        .retrieve_range(&session, from, to, |record| -> AppResult<()> {
            writeln!(out, "{}", serde_json::to_string(&record)?)?;
            Ok(())
        })
        .await;

    if session.refresh_count() > 0 {
        warn!(
            refreshes = session.refresh_count(),
            "tokens were refreshed; the previous refresh token is no longer valid"
        );
        let tokens = session.tokens().await;
        writeln!(diag, "{}", serde_json::to_string(&tokens_json(&tokens))?)?;
    }
    walked
}
