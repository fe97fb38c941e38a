//! Implementation of the `pollwise sweep` command.

use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use clap::Args;

use crate::cli::context::AppContext;
use crate::cli::output::{output, CommandOutput};
use crate::domain::models::Config;

#[derive(Args, Debug)]
pub struct SweepArgs {
    /// Evaluate as of this date (YYYY-MM-DD) instead of today
    #[arg(long)]
    pub today: Option<NaiveDate>,
}

#[derive(Debug, serde::Serialize)]
pub struct SweepOutput {
    pub evaluated_on: NaiveDate,
    pub closed: usize,
}

impl CommandOutput for SweepOutput {
    fn to_human(&self) -> String {
        format!("Closed {} vote(s) as of {}", self.closed, self.evaluated_on)
    }
}

pub async fn execute(args: SweepArgs, config: Config, json_mode: bool) -> Result<()> {
    let ctx = AppContext::build(config, false).await?;
    let today = args.today.unwrap_or_else(|| Utc::now().date_naive());

    let closed = ctx.evaluator.sweep_at(today).await.context("Sweep failed")?;

    output(&SweepOutput { evaluated_on: today, closed }, json_mode);
    Ok(())
}
