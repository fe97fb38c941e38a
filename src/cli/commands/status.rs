//! Implementation of the `pollwise status` command.

use anyhow::Result;
use chrono::NaiveDate;
use clap::Args;
use uuid::Uuid;

use crate::cli::context::AppContext;
use crate::cli::output::{output, CommandOutput, TableFormatter};
use crate::domain::models::Config;
use crate::services::ClosureStatus;

#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Vote ID
    pub vote_id: Uuid,

    /// Evaluate as of this date (YYYY-MM-DD) instead of today
    #[arg(long)]
    pub today: Option<NaiveDate>,
}

#[derive(Debug, serde::Serialize)]
#[serde(transparent)]
pub struct StatusOutput(pub ClosureStatus);

impl CommandOutput for StatusOutput {
    fn to_human(&self) -> String {
        TableFormatter::new().format_closure_status(&self.0)
    }
}

pub async fn execute(args: StatusArgs, config: Config, json_mode: bool) -> Result<()> {
    let ctx = AppContext::build(config, false).await?;
    let status = match args.today {
        Some(today) => ctx.evaluator.status_at(args.vote_id, today).await?,
        None => ctx.evaluator.status(args.vote_id).await?,
    };

    output(&StatusOutput(status), json_mode);
    Ok(())
}
