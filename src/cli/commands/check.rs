//! Implementation of the `pollwise check` command.

use anyhow::Result;
use clap::Args;
use uuid::Uuid;

use crate::cli::context::AppContext;
use crate::cli::output::{output, CommandOutput};
use crate::domain::models::Config;

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Vote ID
    pub vote_id: Uuid,
}

#[derive(Debug, serde::Serialize)]
pub struct CheckOutput {
    pub vote_id: Uuid,
    pub closed: bool,
}

impl CommandOutput for CheckOutput {
    fn to_human(&self) -> String {
        if self.closed {
            format!("Vote {} reached its threshold and was closed", self.vote_id)
        } else {
            format!("Vote {} was not closed", self.vote_id)
        }
    }
}

pub async fn execute(args: CheckArgs, config: Config, json_mode: bool) -> Result<()> {
    let ctx = AppContext::build(config, false).await?;
    let closed = ctx.evaluator.check_single(args.vote_id).await?;

    output(&CheckOutput { vote_id: args.vote_id, closed }, json_mode);
    Ok(())
}
