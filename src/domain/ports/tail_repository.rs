use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::errors::DomainResult;
use crate::domain::models::{Tail, TailResponse};

/// Repository port for follow-up questions and their answers.
#[async_trait]
pub trait TailRepository: Send + Sync {
    async fn create(&self, tail: &Tail) -> DomainResult<()>;

    /// The first tail attached to a vote, if any.
    async fn find_first_by_vote(&self, vote_id: Uuid) -> DomainResult<Option<Tail>>;

    async fn add_answer(&self, answer: &TailResponse) -> DomainResult<()>;

    /// Answers for a tail, oldest first.
    async fn list_answers(&self, tail_id: Uuid) -> DomainResult<Vec<TailResponse>>;
}
