use chrono::NaiveDate;
use fitbit_client::Config;
use fitbit_client::resources::Resource;
use fitbit_retriever::cli::{Command, RetrieveArgs};
use fitbit_retriever::commands::run;
use secrecy::SecretString;
use serde_json::{Value, json};
use std::io;
use std::time::Duration;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config_for(server: &MockServer) -> Config {
    let mut cfg = Config::new(
        "22ABCD",
        SecretString::new("s3cr3t".into()),
        "http://localhost:8189/callback",
    );
    cfg.api_base_url = server.uri();
    cfg.call_interval = Duration::ZERO;
    cfg
}

fn retrieve_args(from: &str, to: &str) -> RetrieveArgs {
    RetrieveArgs {
        user_id: "U".into(),
        access_token: "A".into(),
        refresh_token: "R".into(),
        date: None,
        from: Some(from.parse().unwrap()),
        to: Some(to.parse().unwrap()),
    }
}

#[tokio::test]
async fn authorize_url_prints_provider_url() {
    let server = MockServer::start().await;
    let mut out = Vec::new();
    run(Command::AuthorizeUrl, config_for(&server), &mut out, &mut io::sink())
        .await
        .expect("run");
    let printed = String::from_utf8(out).unwrap();
    assert!(printed.starts_with("https://www.fitbit.com/oauth2/authorize?response_type=code"));
    assert!(printed.ends_with('\n'));
}

#[tokio::test]
async fn exchange_prints_token_json() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth2/token"))
        .and(body_string_contains("code=C0DE"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "A",
            "refresh_token": "R",
            "user_id": "U",
            "expires_in": 28800
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut out = Vec::new();
    run(
        Command::Exchange { code: "C0DE".into() },
        config_for(&server),
        &mut out,
        &mut io::sink(),
    )
    .await
    .expect("run");
    let printed: Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(printed["access_token"], "A");
    assert_eq!(printed["refresh_token"], "R");
    assert_eq!(printed["user_id"], "U");
    assert_eq!(printed["expires_in"], 28800);
}

#[tokio::test]
async fn retrieve_prints_one_json_line_per_day() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(header("authorization", "Bearer A"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "activities-steps": [{"value": "5000"}]
        })))
        .expect(Resource::ALL.len() as u64 * 2)
        .mount(&server)
        .await;

    let mut out = Vec::new();
    run(
        Command::Retrieve(retrieve_args("2024-03-01", "2024-03-02")),
        config_for(&server),
        &mut out,
        &mut io::sink(),
    )
    .await
    .expect("run");

    let lines: Vec<Value> = String::from_utf8(out)
        .unwrap()
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0]["date"], "2024-03-01");
    assert_eq!(lines[1]["date"], "2024-03-02");
    assert_eq!(lines[0]["steps"], "5000");
    assert_eq!(lines[0]["minutesSedentary"], "-");
    assert_eq!(lines[0]["heart-intraday"], json!([]));
    assert_eq!(
        NaiveDate::parse_from_str(lines[1]["date"].as_str().unwrap(), "%Y-%m-%d").unwrap(),
        NaiveDate::from_ymd_opt(2024, 3, 2).unwrap()
    );
}

#[tokio::test]
async fn retrieve_failure_stops_output() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503).set_body_string("unavailable"))
        .expect(1)
        .mount(&server)
        .await;

    let mut out = Vec::new();
    let mut diag = Vec::new();
    let res = run(
        Command::Retrieve(retrieve_args("2024-03-01", "2024-03-03")),
        config_for(&server),
        &mut out,
        &mut diag,
    )
    .await;
    assert!(res.is_err());
    assert!(out.is_empty());
    // No refresh happened, so there is nothing to hand back.
    assert!(diag.is_empty());
}

#[tokio::test]
async fn refreshed_tokens_are_reported_when_retrieve_fails() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(header("authorization", "Bearer A"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "errors": [{"errorType": "expired_token"}],
            "success": false
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/oauth2/token"))
        .and(body_string_contains("refresh_token=R"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "A2",
            "refresh_token": "R2",
            "user_id": "U"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(header("authorization", "Bearer A2"))
        .respond_with(ResponseTemplate::new(503).set_body_string("down"))
        .expect(1)
        .mount(&server)
        .await;

    let mut out = Vec::new();
    let mut diag = Vec::new();
    let res = run(
        Command::Retrieve(retrieve_args("2024-03-01", "2024-03-01")),
        config_for(&server),
        &mut out,
        &mut diag,
    )
    .await;

    assert!(res.is_err());
    assert!(out.is_empty());
    let reported: Value = serde_json::from_slice(&diag).expect("token json on diag");
    assert_eq!(reported["access_token"], "A2");
    assert_eq!(reported["refresh_token"], "R2");
    assert_eq!(reported["user_id"], "U");
}

#[tokio::test]
async fn refreshed_tokens_are_reported_after_success() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(header("authorization", "Bearer A"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "errors": [{"errorType": "expired_token"}]
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/oauth2/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "A2",
            "refresh_token": "R2",
            "user_id": "U"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(header("authorization", "Bearer A2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(Resource::ALL.len() as u64)
        .mount(&server)
        .await;

    let mut out = Vec::new();
    let mut diag = Vec::new();
    run(
        Command::Retrieve(retrieve_args("2024-03-01", "2024-03-01")),
        config_for(&server),
        &mut out,
        &mut diag,
    )
    .await
    .expect("run");

    assert_eq!(String::from_utf8(out).unwrap().lines().count(), 1);
    let reported: Value = serde_json::from_slice(&diag).expect("token json on diag");
    assert_eq!(reported["refresh_token"], "R2");
}
