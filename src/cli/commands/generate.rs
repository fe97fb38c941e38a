//! Implementation of the `pollwise generate` command.

use anyhow::{Context, Result};
use clap::Args;
use uuid::Uuid;

use crate::cli::context::AppContext;
use crate::cli::output::{output, CommandOutput, TableFormatter};
use crate::domain::errors::DomainError;
use crate::domain::models::{Category, Config, Guide};

#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Vote ID
    pub vote_id: Uuid,

    /// Guide type (travel, food, fashion, lifestyle, hobby, general);
    /// defaults to the vote's category
    #[arg(long)]
    pub guide_type: Option<String>,
}

#[derive(Debug, serde::Serialize)]
#[serde(transparent)]
pub struct GenerateOutput(pub Guide);

impl CommandOutput for GenerateOutput {
    fn to_human(&self) -> String {
        TableFormatter::new().format_guide(&self.0)
    }
}

pub async fn execute(args: GenerateArgs, config: Config, json_mode: bool) -> Result<()> {
    let ctx = AppContext::build(config, false).await?;

    let guide_type = match args.guide_type.as_deref() {
        Some(raw) => Category::from_str(raw).with_context(|| format!("Unknown guide type: {raw}"))?,
        None => {
            ctx.votes
                .get(args.vote_id)
                .await?
                .ok_or(DomainError::VoteNotFound(args.vote_id))?
                .category
        }
    };

    let guide = ctx.pipeline.generate(args.vote_id, guide_type).await?;

    output(&GenerateOutput(guide), json_mode);
    Ok(())
}
