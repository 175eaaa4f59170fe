//! Command line surface.

use crate::error::{AppError, AppResult};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "fitbit-retriever",
    about = "Fetch daily Fitbit activity records as JSON lines"
)]
pub struct Cli {
    /// Seconds to wait before every API call. Overrides FITBIT_CALL_INTERVAL_SECS.
    #[arg(long, global = true)]
    pub call_interval: Option<u64>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the URL to open in a browser to grant access.
    AuthorizeUrl,
    /// Listen on the callback address for the OAuth redirect, then exchange the code.
    Authorize {
        /// Seconds to wait for the redirect. Overrides FITBIT_AUTH_TIMEOUT_SECS.
        #[arg(long)]
        timeout: Option<u64>,
    },
    /// Exchange an authorization code obtained elsewhere.
    Exchange {
        #[arg(long)]
        code: String,
    },
    /// Retrieve one record per day.
    Retrieve(RetrieveArgs),
}

#[derive(Args, Debug)]
pub struct RetrieveArgs {
    #[arg(long, env = "FITBIT_USER_ID")]
    pub user_id: String,

    #[arg(long, env = "FITBIT_ACCESS_TOKEN", hide_env_values = true)]
    pub access_token: String,

    #[arg(long, env = "FITBIT_REFRESH_TOKEN", hide_env_values = true)]
    pub refresh_token: String,

    /// Single day (YYYY-MM-DD).
    #[arg(long, conflicts_with_all = ["from", "to"])]
    pub date: Option<NaiveDate>,

    /// First day of an inclusive range (YYYY-MM-DD).
    #[arg(long, requires = "to")]
    pub from: Option<NaiveDate>,

    /// Last day of an inclusive range (YYYY-MM-DD).
    #[arg(long, requires = "from")]
    pub to: Option<NaiveDate>,
}

impl RetrieveArgs {
    /// Inclusive `(first, last)` days to fetch.
    pub fn date_range(&self) -> AppResult<(NaiveDate, NaiveDate)> {
        match (self.date, self.from, self.to) {
            (Some(day), _, _) => Ok((day, day)),
            (None, Some(from), Some(to)) if from <= to => Ok((from, to)),
            (None, Some(from), Some(to)) => Err(AppError::Usage(format!(
                "--from {from} is after --to {to}"
            ))),
            _ => Err(AppError::Usage(
                "either --date or both --from and --to are required".into(),
            )),
        }
    }
}
