use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use crate::domain::errors::DomainResult;
use crate::domain::models::{Vote, VoteOption, VoteStatus};

/// Repository port for votes and their options.
#[async_trait]
pub trait VoteRepository: Send + Sync {
    /// Insert a new vote.
    async fn create(&self, vote: &Vote) -> DomainResult<()>;

    /// Get a vote by ID.
    async fn get(&self, id: Uuid) -> DomainResult<Option<Vote>>;

    /// List votes in the given status.
    async fn list_by_status(&self, status: VoteStatus) -> DomainResult<Vec<Vote>>;

    /// List votes in `status` whose finish date is strictly before `date`.
    async fn list_by_status_finished_before(
        &self,
        status: VoteStatus,
        date: NaiveDate,
    ) -> DomainResult<Vec<Vote>>;

    /// Persist a closed vote, guarded on the stored row still being open at
    /// `vote.version - 1`.
    ///
    /// Returns `ConcurrencyConflict` when another writer got there first.
    async fn save_closed(&self, vote: &Vote) -> DomainResult<()>;

    /// Insert an option for a vote.
    async fn add_option(&self, option: &VoteOption) -> DomainResult<()>;

    /// List a vote's options in display order.
    async fn list_options(&self, vote_id: Uuid) -> DomainResult<Vec<VoteOption>>;
}
