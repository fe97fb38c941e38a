use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::errors::DomainResult;
use crate::domain::models::Guide;

/// Repository port for synthesized guides.
#[async_trait]
pub trait GuideRepository: Send + Sync {
    async fn save(&self, guide: &Guide) -> DomainResult<()>;

    async fn get(&self, id: Uuid) -> DomainResult<Option<Guide>>;

    /// Guides generated for a vote, newest first.
    async fn list_by_vote(&self, vote_id: Uuid) -> DomainResult<Vec<Guide>>;
}
