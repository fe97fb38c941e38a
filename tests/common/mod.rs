//! Common test utilities for integration tests
//!
//! Provides a fully wired service graph over a real SQLite database and a
//! scripted completion client.

#![allow(dead_code)]

use chrono::NaiveDate;
use sqlx::SqlitePool;
use std::sync::Arc;
use tempfile::TempDir;
use uuid::Uuid;

use pollwise::adapters::completion::MockCompletionClient;
use pollwise::adapters::sqlite::{
    create_migrated_test_pool, initialize_database, SqliteGuideRepository,
    SqliteResponseRepository, SqliteTailRepository, SqliteVoteRepository,
};
use pollwise::domain::models::DatabaseConfig;
use pollwise::{
    BallotService, Category, ClosureEvaluator, GuidePipeline, RequestRegistry, Tail, TailRepository,
    TailResponse, Vote, VoteOption, VoteRepository,
};

/// Setup test logging
///
/// Initializes tracing subscriber for test output.
/// Call this at the beginning of tests that need logging.
pub fn setup_test_logging() {
    use tracing_subscriber::fmt;

    let _ = fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

pub fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Services wired the way the CLI wires them.
pub struct Harness {
    pub votes: Arc<SqliteVoteRepository>,
    pub responses: Arc<SqliteResponseRepository>,
    pub tails: Arc<SqliteTailRepository>,
    pub guides: Arc<SqliteGuideRepository>,
    pub completion: Arc<MockCompletionClient>,
    pub registry: Arc<RequestRegistry>,
    pub pipeline: Arc<GuidePipeline>,
    pub evaluator: Arc<ClosureEvaluator>,
    pub ballots: Arc<BallotService>,
    _dir: Option<TempDir>,
}

impl Harness {
    /// In-memory database, single connection.
    pub async fn in_memory(completion: MockCompletionClient) -> Self {
        let pool = create_migrated_test_pool().await.unwrap();
        Self::wire(pool, completion, None)
    }

    /// File-backed database with a real connection pool, for tests that need
    /// writers on several connections at once.
    pub async fn on_disk(completion: MockCompletionClient) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let config = DatabaseConfig {
            path: dir.path().join("pollwise.db").display().to_string(),
            max_connections: 8,
        };
        let pool = initialize_database(&config).await.unwrap();
        Self::wire(pool, completion, Some(dir))
    }

    fn wire(pool: SqlitePool, completion: MockCompletionClient, dir: Option<TempDir>) -> Self {
        let votes = Arc::new(SqliteVoteRepository::new(pool.clone()));
        let responses = Arc::new(SqliteResponseRepository::new(pool.clone()));
        let tails = Arc::new(SqliteTailRepository::new(pool.clone()));
        let guides = Arc::new(SqliteGuideRepository::new(pool));
        let completion = Arc::new(completion);
        let registry = Arc::new(RequestRegistry::new());

        let pipeline = Arc::new(GuidePipeline::new(
            votes.clone(),
            responses.clone(),
            tails.clone(),
            guides.clone(),
            completion.clone(),
            registry.clone(),
        ));
        let evaluator = Arc::new(ClosureEvaluator::new(votes.clone(), responses.clone(), pipeline.clone()));
        let ballots = Arc::new(BallotService::new(votes.clone(), responses.clone(), evaluator.clone()));

        Self {
            votes,
            responses,
            tails,
            guides,
            completion,
            registry,
            pipeline,
            evaluator,
            ballots,
            _dir: dir,
        }
    }

    /// Store `vote` with the given option names and a follow-up question
    /// carrying `answers`.
    pub async fn seed(&self, vote: Vote, options: &[&str], answers: &[&str]) -> (Vote, Vec<VoteOption>) {
        self.votes.create(&vote).await.unwrap();
        let mut stored = Vec::new();
        for (i, content) in options.iter().enumerate() {
            let option = VoteOption::new(vote.id, *content, u32::try_from(i).unwrap());
            self.votes.add_option(&option).await.unwrap();
            stored.push(option);
        }

        let tail = Tail::new(vote.id, "What made you choose it?");
        self.tails.create(&tail).await.unwrap();
        for (i, answer) in answers.iter().enumerate() {
            self.tails
                .add_answer(&TailResponse::new(tail.id, format!("tail-user-{i}"), *answer))
                .await
                .unwrap();
        }

        (vote, stored)
    }

    pub async fn status_of(&self, vote_id: Uuid) -> pollwise::VoteStatus {
        self.votes.get(vote_id).await.unwrap().unwrap().status
    }
}

pub fn threshold_vote(category: Category, threshold: u32) -> Vote {
    Vote::new("Where should we go next?", category, day(2099, 12, 31)).with_participant_threshold(threshold)
}
