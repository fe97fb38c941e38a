//! Wiring of repositories and services for CLI commands.

use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;

use crate::adapters::completion::build_completion_client;
use crate::adapters::sqlite::{
    initialize_database, SqliteGuideRepository, SqliteResponseRepository, SqliteTailRepository,
    SqliteVoteRepository,
};
use crate::domain::models::Config;
use crate::domain::ports::{GuideRepository, ResponseRepository, TailRepository, VoteRepository};
use crate::infrastructure::config::ConfigLoader;
use crate::services::{BallotService, ClosureEvaluator, GuidePipeline, RequestRegistry};

/// Load config from `path` when given, otherwise from the project directory.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => ConfigLoader::load_from_file(path),
        None => ConfigLoader::load(),
    }
}

/// Everything a command needs, built once per invocation.
pub struct AppContext {
    pub config: Config,
    pub votes: Arc<dyn VoteRepository>,
    pub registry: Arc<RequestRegistry>,
    pub pipeline: Arc<GuidePipeline>,
    pub evaluator: Arc<ClosureEvaluator>,
    pub ballots: BallotService,
}

impl AppContext {
    /// Open the database and build the service graph.
    ///
    /// One-shot commands pass `detach_generation = false` so the process does
    /// not exit while a post-closure generation is still running.
    pub async fn build(config: Config, detach_generation: bool) -> Result<Self> {
        let pool = initialize_database(&config.database)
            .await
            .with_context(|| format!("Failed to open database at {}", config.database.path))?;

        let votes: Arc<dyn VoteRepository> = Arc::new(SqliteVoteRepository::new(pool.clone()));
        let responses: Arc<dyn ResponseRepository> = Arc::new(SqliteResponseRepository::new(pool.clone()));
        let tails: Arc<dyn TailRepository> = Arc::new(SqliteTailRepository::new(pool.clone()));
        let guides: Arc<dyn GuideRepository> = Arc::new(SqliteGuideRepository::new(pool));
        let completion = build_completion_client(&config.completion)
            .context("Failed to build completion client")?;

        let registry = Arc::new(RequestRegistry::new());
        let pipeline = Arc::new(GuidePipeline::new(
            votes.clone(),
            responses.clone(),
            tails,
            guides,
            completion,
            registry.clone(),
        ));
        let evaluator = Arc::new(
            ClosureEvaluator::new(votes.clone(), responses.clone(), pipeline.clone())
                .with_detached_generation(detach_generation),
        );
        let ballots = BallotService::new(votes.clone(), responses.clone(), evaluator.clone());

        Ok(Self {
            config,
            votes,
            registry,
            pipeline,
            evaluator,
            ballots,
        })
    }
}
