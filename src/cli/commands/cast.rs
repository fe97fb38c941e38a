//! Implementation of the `pollwise cast` command.

use anyhow::Result;
use clap::Args;
use uuid::Uuid;

use crate::cli::context::AppContext;
use crate::cli::output::{output, CommandOutput};
use crate::domain::models::Config;

#[derive(Args, Debug)]
pub struct CastArgs {
    /// Vote ID
    pub vote_id: Uuid,

    /// Option ID
    pub option_id: Uuid,

    /// Responding user
    #[arg(long, short)]
    pub user: String,
}

#[derive(Debug, serde::Serialize)]
pub struct CastOutput {
    pub response_id: Uuid,
    pub vote_id: Uuid,
    pub option_id: Uuid,
    pub user_id: String,
    pub closed: bool,
}

impl CommandOutput for CastOutput {
    fn to_human(&self) -> String {
        let mut line = format!("Recorded response {} from {}", self.response_id, self.user_id);
        if self.closed {
            line.push_str("; vote reached its threshold and is now closed");
        }
        line
    }
}

pub async fn execute(args: CastArgs, config: Config, json_mode: bool) -> Result<()> {
    let ctx = AppContext::build(config, false).await?;
    let outcome = ctx.ballots.cast(args.vote_id, args.option_id, &args.user).await?;

    output(
        &CastOutput {
            response_id: outcome.response.id,
            vote_id: outcome.response.vote_id,
            option_id: outcome.response.option_id,
            user_id: outcome.response.user_id,
            closed: outcome.closed,
        },
        json_mode,
    );
    Ok(())
}
