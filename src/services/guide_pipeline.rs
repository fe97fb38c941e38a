//! Guide synthesis pipeline.
//!
//! Builds a prompt from a vote's results and its follow-up answers, calls the
//! completion backend under [`RequestRegistry`] supervision, parses the reply
//! and persists a [`Guide`].
//!
//! Only the newest generation per (vote, guide type) may produce side effects.
//! Registry checkpoints sit right before the completion call, right after it,
//! and right before the guide is stored.

use std::sync::Arc;
use uuid::Uuid;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{Category, Guide};
use crate::domain::ports::{
    CompletionClient, GuideRepository, ResponseRepository, TailRepository, VoteRepository,
};
use crate::services::guide_prompt::{parse_reply, render_prompt, strip_reasoning, tally, PromptInput};
use crate::services::request_registry::{RequestKey, RequestRegistry, RequestTicket};

pub struct GuidePipeline {
    votes: Arc<dyn VoteRepository>,
    responses: Arc<dyn ResponseRepository>,
    tails: Arc<dyn TailRepository>,
    guides: Arc<dyn GuideRepository>,
    completion: Arc<dyn CompletionClient>,
    registry: Arc<RequestRegistry>,
}

impl GuidePipeline {
    pub fn new(
        votes: Arc<dyn VoteRepository>,
        responses: Arc<dyn ResponseRepository>,
        tails: Arc<dyn TailRepository>,
        guides: Arc<dyn GuideRepository>,
        completion: Arc<dyn CompletionClient>,
        registry: Arc<RequestRegistry>,
    ) -> Self {
        Self {
            votes,
            responses,
            tails,
            guides,
            completion,
            registry,
        }
    }

    pub fn registry(&self) -> &Arc<RequestRegistry> {
        &self.registry
    }

    /// Generate and store a guide for `vote_id`.
    ///
    /// Supersedes any generation already running for the same vote and guide
    /// type. A superseded call returns `DomainError::Cancelled` to its own
    /// caller and stores nothing after its next checkpoint.
    #[tracing::instrument(skip(self), fields(vote_id = %vote_id, guide_type = %guide_type))]
    pub async fn generate(&self, vote_id: Uuid, guide_type: Category) -> DomainResult<Guide> {
        let ticket = self.registry.enter(RequestKey::new(vote_id, guide_type));
        let result = self.run(&ticket, vote_id, guide_type).await;
        drop(ticket);

        match &result {
            Ok(guide) => tracing::info!(guide_id = %guide.id, "guide generated"),
            Err(DomainError::Cancelled(reason)) => {
                tracing::info!(%reason, "guide generation abandoned");
            }
            Err(e) => tracing::warn!(error = %e, "guide generation failed"),
        }
        result
    }

    async fn run(
        &self,
        ticket: &RequestTicket,
        vote_id: Uuid,
        guide_type: Category,
    ) -> DomainResult<Guide> {
        let vote = self
            .votes
            .get(vote_id)
            .await?
            .ok_or(DomainError::VoteNotFound(vote_id))?;
        let options = self.votes.list_options(vote_id).await?;
        if options.is_empty() {
            return Err(DomainError::OptionsNotFound(vote_id));
        }
        let tail = self
            .tails
            .find_first_by_vote(vote_id)
            .await?
            .ok_or(DomainError::TailNotFound(vote_id))?;
        let answers = self.tails.list_answers(tail.id).await?;
        let counts = self.responses.count_by_option(vote_id).await?;

        let tallies = tally(&options, &counts);
        let prompt = render_prompt(&PromptInput {
            vote: &vote,
            tallies: &tallies,
            tail: &tail,
            answers: &answers,
            guide_type,
        });

        self.registry.check(ticket)?;
        tracing::debug!(client = self.completion.name(), prompt_chars = prompt.len(), "requesting completion");
        let raw = self.completion.complete(&prompt).await?;
        self.registry.check(ticket)?;

        let parsed = parse_reply(&strip_reasoning(&raw))?;
        self.registry.check(ticket)?;

        let guide = Guide::new(vote.id, parsed.title, parsed.content, vote.category, guide_type);
        self.guides.save(&guide).await?;
        Ok(guide)
    }
}
