use anyhow::Context;
use clap::Parser;
use fitbit_client::Config;
use fitbit_retriever::cli::Cli;
use std::time::Duration;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    fitbit_retriever::init_logging();

    let mut cfg = Config::from_env().context("loading FITBIT_* configuration")?;
    if let Some(secs) = cli.call_interval {
        cfg.call_interval = Duration::from_secs(secs);
    }

    fitbit_retriever::commands::run(
        cli.command,
        cfg,
        &mut std::io::stdout(),
        &mut std::io::stderr(),
    )
    .await?;
    Ok(())
}
