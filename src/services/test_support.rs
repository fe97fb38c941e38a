//! Shared fixtures for service unit tests.

use chrono::NaiveDate;
use std::sync::Arc;
use uuid::Uuid;

use crate::adapters::completion::MockCompletionClient;
use crate::adapters::sqlite::{
    create_migrated_test_pool, SqliteGuideRepository, SqliteResponseRepository,
    SqliteTailRepository, SqliteVoteRepository,
};
use crate::domain::models::{Category, Tail, TailResponse, Vote, VoteOption, VoteResponse};
use crate::domain::ports::{ResponseRepository, TailRepository, VoteRepository};
use crate::services::{GuidePipeline, RequestRegistry};

pub fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub struct Fixture {
    pub votes: Arc<SqliteVoteRepository>,
    pub responses: Arc<SqliteResponseRepository>,
    pub tails: Arc<SqliteTailRepository>,
    pub guides: Arc<SqliteGuideRepository>,
    pub completion: Arc<MockCompletionClient>,
    pub registry: Arc<RequestRegistry>,
}

impl Fixture {
    pub async fn new() -> Self {
        Self::with_completion(MockCompletionClient::new()).await
    }

    pub async fn with_completion(completion: MockCompletionClient) -> Self {
        let pool = create_migrated_test_pool().await.unwrap();
        Self {
            votes: Arc::new(SqliteVoteRepository::new(pool.clone())),
            responses: Arc::new(SqliteResponseRepository::new(pool.clone())),
            tails: Arc::new(SqliteTailRepository::new(pool.clone())),
            guides: Arc::new(SqliteGuideRepository::new(pool)),
            completion: Arc::new(completion),
            registry: Arc::new(RequestRegistry::new()),
        }
    }

    pub fn pipeline(&self) -> Arc<GuidePipeline> {
        Arc::new(GuidePipeline::new(
            self.votes.clone(),
            self.responses.clone(),
            self.tails.clone(),
            self.guides.clone(),
            self.completion.clone(),
            self.registry.clone(),
        ))
    }

    /// Store a vote with options named `options`, in order.
    pub async fn seed_vote(&self, vote: Vote, options: &[&str]) -> (Vote, Vec<VoteOption>) {
        self.votes.create(&vote).await.unwrap();
        let mut stored = Vec::new();
        for (i, content) in options.iter().enumerate() {
            let option = VoteOption::new(vote.id, *content, u32::try_from(i).unwrap());
            self.votes.add_option(&option).await.unwrap();
            stored.push(option);
        }
        (vote, stored)
    }

    pub async fn seed_open_vote(&self, category: Category, finished_at: NaiveDate) -> (Vote, Vec<VoteOption>) {
        self.seed_vote(Vote::new("Which one?", category, finished_at), &["A", "B"]).await
    }

    pub async fn add_tail(&self, vote_id: Uuid, answers: &[&str]) -> Tail {
        let tail = Tail::new(vote_id, "Why did you pick it?");
        self.tails.create(&tail).await.unwrap();
        for (i, answer) in answers.iter().enumerate() {
            self.tails
                .add_answer(&TailResponse::new(tail.id, format!("user-{i}"), *answer))
                .await
                .unwrap();
        }
        tail
    }

    pub async fn respond(&self, vote_id: Uuid, option_id: Uuid, user_id: &str) {
        self.responses
            .record(&VoteResponse::new(vote_id, option_id, user_id))
            .await
            .unwrap();
    }
}
