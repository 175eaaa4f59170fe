#![allow(dead_code)]

use fitbit_client::resources::Resource;
use fitbit_client::{Config, DataClient, DailyRetriever, Session, TokenSet};
use secrecy::SecretString;
use serde_json::{Value, json};
use std::time::Duration;
use wiremock::MockServer;

pub const CALLBACK: &str = "http://localhost:8189/callback";

pub fn config_for(server: &MockServer) -> Config {
    let mut cfg = Config::new("22ABCD", SecretString::new("s3cr3t".into()), CALLBACK);
    cfg.api_base_url = server.uri();
    cfg.call_interval = Duration::ZERO;
    cfg
}

pub fn client_for(server: &MockServer) -> DataClient {
    DataClient::from_config(&config_for(server), reqwest::Client::new())
}

pub fn retriever_for(server: &MockServer) -> DailyRetriever {
    DailyRetriever::new(client_for(server))
}

pub fn session() -> Session {
    Session::new(TokenSet::new("A", "R", "U"))
}

pub fn expired_body() -> Value {
    json!({
        "errors": [{"errorType": "expired_token", "message": "Access token expired: A"}],
        "success": false
    })
}

pub fn token_body(access: &str, refresh: &str) -> Value {
    json!({
        "access_token": access,
        "refresh_token": refresh,
        "user_id": "U",
        "expires_in": 28800,
        "scope": "activity heartrate profile sleep",
        "token_type": "Bearer"
    })
}

/// A well-formed response for `resource`, with `seed` baked into every value.
pub fn resource_body(resource: Resource, date: &str, seed: u32) -> Value {
    let mut body = serde_json::Map::new();
    body.insert(
        resource.summary_key().to_string(),
        json!([
            {"dateTime": "2000-01-01", "value": "stale"},
            {"dateTime": date, "value": seed.to_string()}
        ]),
    );
    if let Some(key) = resource.intraday_key() {
        body.insert(
            key.to_string(),
            json!({
                "dataset": [
                    {"time": "00:00:00", "value": seed},
                    {"time": "00:01:00", "value": seed + 1}
                ],
                "datasetInterval": 1,
                "datasetType": "minute"
            }),
        );
    }
    Value::Object(body)
}
