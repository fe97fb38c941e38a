use async_trait::async_trait;
use std::collections::HashMap;
use uuid::Uuid;

use crate::domain::errors::DomainResult;
use crate::domain::models::VoteResponse;

/// Repository port for recorded vote responses.
#[async_trait]
pub trait ResponseRepository: Send + Sync {
    /// Record a response. Fails with `AlreadyResponded` on a second response
    /// from the same user to the same vote.
    async fn record(&self, response: &VoteResponse) -> DomainResult<()>;

    /// Count all responses for a vote.
    async fn count_by_vote(&self, vote_id: Uuid) -> DomainResult<u64>;

    /// Count responses per option for a vote. Options without responses are absent.
    async fn count_by_option(&self, vote_id: Uuid) -> DomainResult<HashMap<Uuid, u64>>;

    /// List a vote's responses, oldest first.
    async fn list_by_vote(&self, vote_id: Uuid) -> DomainResult<Vec<VoteResponse>>;
}
