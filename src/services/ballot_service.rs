//! Vote-cast path: record a response, then run the real-time closure check.

use std::sync::Arc;
use uuid::Uuid;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::VoteResponse;
use crate::domain::ports::{ResponseRepository, VoteRepository};
use crate::services::closure_evaluator::ClosureEvaluator;

/// Result of a successful cast.
#[derive(Debug, Clone)]
pub struct CastOutcome {
    pub response: VoteResponse,
    /// Whether this cast pushed the vote over its threshold and closed it.
    pub closed: bool,
}

pub struct BallotService {
    votes: Arc<dyn VoteRepository>,
    responses: Arc<dyn ResponseRepository>,
    evaluator: Arc<ClosureEvaluator>,
}

impl BallotService {
    pub fn new(
        votes: Arc<dyn VoteRepository>,
        responses: Arc<dyn ResponseRepository>,
        evaluator: Arc<ClosureEvaluator>,
    ) -> Self {
        Self {
            votes,
            responses,
            evaluator,
        }
    }

    #[tracing::instrument(skip(self), fields(vote_id = %vote_id, user_id = %user_id))]
    pub async fn cast(&self, vote_id: Uuid, option_id: Uuid, user_id: &str) -> DomainResult<CastOutcome> {
        let vote = self
            .votes
            .get(vote_id)
            .await?
            .ok_or(DomainError::VoteNotFound(vote_id))?;
        if !vote.is_open() {
            return Err(DomainError::VoteClosed(vote_id));
        }

        let options = self.votes.list_options(vote_id).await?;
        if !options.iter().any(|o| o.id == option_id) {
            return Err(DomainError::OptionNotInVote { vote_id, option_id });
        }

        let response = VoteResponse::new(vote_id, option_id, user_id);
        self.responses.record(&response).await?;
        tracing::debug!(response_id = %response.id, "response recorded");

        // the response stands even if the closure check fails
        let closed = match self.evaluator.check_single(vote_id).await {
            Ok(closed) => closed,
            Err(e) => {
                tracing::warn!(error = %e, "closure check after cast failed");
                false
            }
        };

        Ok(CastOutcome { response, closed })
    }
}
