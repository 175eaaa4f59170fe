//! Command line front end for `fitbit_client`.

pub mod cli;
pub mod commands;
pub mod error;
pub mod loopback;

use tracing_subscriber::EnvFilter;

/// Per-target overrides keeping HTTP internals quiet by default.
const QUIET_TARGETS: &str = "hyper=warn,hyper_util=warn,reqwest=warn";

/// Log filter from `FITBIT_LOG_LEVEL`, falling back to `RUST_LOG`, default `info`.
pub fn log_filter_with<F>(mut get: F) -> (String, EnvFilter)
where
    F: FnMut(&str) -> Option<String>,
{
    let log_env = get("FITBIT_LOG_LEVEL")
        .or_else(|| get("RUST_LOG"))
        .unwrap_or_else(|| "info".to_string());
    let combined = format!("{log_env},{QUIET_TARGETS}");
    let filter = EnvFilter::try_new(combined)
        .unwrap_or_else(|_| EnvFilter::new(format!("info,{QUIET_TARGETS}")));
    (log_env, filter)
}

pub fn init_logging() {
    let (log_env, filter) = log_filter_with(|k| std::env::var(k).ok());
    tracing_subscriber::fmt()
        .compact()
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(false)
        .with_env_filter(filter)
        .init();
    tracing::debug!("fitbit-retriever: log filter: {}", log_env);
}
